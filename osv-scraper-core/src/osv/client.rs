//! Rate-limited OSV API client with 429 retry

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::StatusCode;
use tokio::time::Instant;

use crate::osv::types::Vulnerability;
use crate::{Error, Result};

/// Total attempts per request; only 429 responses are retried.
const MAX_RETRIES: usize = 3;

/// Capability interface for request pacing.
///
/// The client blocks on `acquire` before every request. Substituting
/// an implementation lets tests run without real pacing. Cancelling
/// the surrounding future aborts the wait.
#[async_trait]
pub trait RateLimit: Send + Sync {
    async fn acquire(&self);
}

/// Token bucket with burst 1: requests are spaced `1/rate` apart.
pub struct TokenBucket {
    interval: Duration,
    next_slot: tokio::sync::Mutex<Option<Instant>>,
}

impl TokenBucket {
    pub fn new(rate_per_second: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / rate_per_second),
            next_slot: tokio::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl RateLimit for TokenBucket {
    async fn acquire(&self) {
        // Reserve a slot under the lock, sleep outside it so waiters
        // queue up without serializing their sleeps.
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

/// Interface the scraper uses to fetch a single vulnerability.
#[async_trait]
pub trait VulnerabilityApi: Send + Sync {
    async fn get_vulnerability(&self, id: &str) -> Result<Vulnerability>;
}

/// HTTP client for the OSV API
pub struct Client {
    base_url: String,
    http: reqwest::Client,
    limiter: Arc<dyn RateLimit>,
}

impl Client {
    /// Create a client with a token-bucket limiter of `rate_per_second`
    /// and the given per-request timeout.
    pub fn new(base_url: impl Into<String>, rate_per_second: f64, timeout: Duration) -> Result<Self> {
        Self::with_limiter(base_url, Arc::new(TokenBucket::new(rate_per_second)), timeout)
    }

    /// Create a client with a custom limiter implementation.
    pub fn with_limiter(
        base_url: impl Into<String>,
        limiter: Arc<dyn RateLimit>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
            limiter,
        })
    }

    /// Fetch a vulnerability by id, retrying 429 responses with a
    /// 1s/2s backoff. Other failures surface immediately.
    pub async fn get_vulnerability(&self, id: &str) -> Result<Vulnerability> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_secs(1))
            .with_factor(2.0)
            .with_max_times(MAX_RETRIES - 1);

        (|| self.get_vulnerability_once(id))
            .retry(backoff)
            .when(|err| matches!(err, Error::TooManyRequests))
            .await
    }

    async fn get_vulnerability_once(&self, id: &str) -> Result<Vulnerability> {
        self.limiter.acquire().await;

        let url = format!("{}/v1/vulns/{}", self.base_url, id);
        let response = self.http.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(Error::NotFound(id.to_string())),
            StatusCode::BAD_REQUEST => Err(Error::BadRequest(id.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(Error::TooManyRequests),
            status => Err(Error::UnexpectedStatus(status.as_u16())),
        }
    }
}

#[async_trait]
impl VulnerabilityApi for Client {
    async fn get_vulnerability(&self, id: &str) -> Result<Vulnerability> {
        Client::get_vulnerability(self, id).await
    }
}
