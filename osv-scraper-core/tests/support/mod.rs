//! Shared fixtures for integration tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Minimal HTTP responder: one canned response per path, anything else
/// is a 404. Counts hits per path.
pub struct TestServer {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(routes: HashMap<String, (u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
        let addr = listener.local_addr().expect("local addr");
        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::new(Mutex::new(HashMap::new()));
        let routes = Arc::new(routes);

        let counter = hits.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let routes = routes.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let Ok(n) = socket.read(&mut buf).await else {
                        return;
                    };
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();
                    let path = request
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string();
                    *counter.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

                    let (status, body) = match routes.get(&path) {
                        Some((status, body)) => (*status, body.clone()),
                        None => (404, "{}".to_string()),
                    };
                    let reason = match status {
                        200 => "OK",
                        400 => "Bad Request",
                        404 => "Not Found",
                        429 => "Too Many Requests",
                        _ => "Error",
                    };
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
            handle,
        }
    }

    pub fn hits(&self, path: &str) -> usize {
        *self.hits.lock().unwrap().get(path).unwrap_or(&0)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build a sitemap urlset for (id, lastmod) pairs in the given order.
pub fn sitemap_xml(entries: &[(&str, DateTime<Utc>)]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for (id, lastmod) in entries {
        xml.push_str(&format!(
            "  <url>\n    <loc>https://osv.dev/vulnerability/{id}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
            rfc3339(*lastmod)
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Minimal OSV vulnerability JSON with no affected packages.
pub fn vuln_json(id: &str, modified: DateTime<Utc>) -> String {
    format!(
        r#"{{"id":"{id}","modified":"{}","summary":"test vulnerability {id}"}}"#,
        rfc3339(modified)
    )
}
