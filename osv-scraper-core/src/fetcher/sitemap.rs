//! OSV sitemap download and parsing

use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use xmltree::Element;

use crate::osv::Entry;
use crate::{Error, Result};

/// Timeout for sitemap downloads, independent of the API client's.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

static VULN_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/vulnerability/([A-Za-z0-9]+-[A-Za-z0-9-]+)").expect("invalid vulnerability id regex")
});

/// Fetches the vulnerability list from an OSV sitemap.
///
/// When a cursor is set, only entries with `lastmod` strictly after it
/// are returned. Entries with unparseable timestamps or locs that do
/// not contain a vulnerability id are skipped.
pub struct SitemapFetcher {
    url: String,
    http: reqwest::Client,
    cursor: Option<DateTime<Utc>>,
}

impl SitemapFetcher {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            url: url.into(),
            http,
            cursor: None,
        })
    }

    pub fn with_cursor(mut self, cursor: Option<DateTime<Utc>>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Download and parse the sitemap into entries in document order.
    pub async fn fetch(&self) -> Result<Vec<Entry>> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Sitemap(format!(
                "unexpected status code {} from {}",
                status.as_u16(),
                self.url
            )));
        }

        let body = response.bytes().await?;
        parse_sitemap(&body, self.cursor)
    }
}

/// Parse a `<urlset>` document into discovery entries.
pub fn parse_sitemap(xml: &[u8], cursor: Option<DateTime<Utc>>) -> Result<Vec<Entry>> {
    let urlset =
        Element::parse(xml).map_err(|e| Error::Sitemap(format!("unmarshal sitemap: {e}")))?;

    let mut entries = Vec::new();
    for node in &urlset.children {
        let Some(url) = node.as_element().filter(|el| el.name == "url") else {
            continue;
        };

        let lastmod = match child_text(url, "lastmod")
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        {
            Some(dt) => dt.with_timezone(&Utc),
            None => continue,
        };

        if let Some(cursor) = cursor {
            if lastmod <= cursor {
                continue;
            }
        }

        let Some(loc) = child_text(url, "loc") else {
            continue;
        };
        let Some(id) = VULN_ID_RE
            .captures(&loc)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        entries.push(Entry { id, modified: lastmod });
    }

    Ok(entries)
}

fn child_text(parent: &Element, name: &str) -> Option<String> {
    parent
        .get_child(name)
        .and_then(|el| el.get_text())
        .map(|text| text.into_owned())
}
