//! Cookie jar: reads `Set-Cookie` from responses, replays stored cookies as
//! a `Cookie` request header. Scoped per host, matching how a browser-style
//! jar partitions storage.

use crate::error::ClientError;
use crate::pipeline::{PolicyChain, RequestPolicy};
use crate::request_builder::Request;
use crate::response::RawResponse;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub trait CookieJar: Send + Sync {
    fn cookies_for(&self, host: &str) -> Vec<(String, String)>;
    fn store(&self, host: &str, set_cookie_header: &str);
}

#[derive(Default)]
pub struct InMemoryCookieJar {
    // host -> (name -> value)
    store: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryCookieJar {
    pub fn new() -> Self { InMemoryCookieJar::default() }
}

impl CookieJar for InMemoryCookieJar {
    fn cookies_for(&self, host: &str) -> Vec<(String, String)> {
        self.store
            .lock()
            .expect("cookie jar lock poisoned")
            .get(host)
            .map(|cookies| cookies.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Our header model joins multiple `Set-Cookie` values with `,`, so a
    /// response with several cookies arrives as one comma-joined
    /// string; each segment's `name=value` pair (before its first `;`) is
    /// extracted independently. This misparses a cookie whose own value
    /// contains a literal comma (e.g. an `Expires` attribute), which a real
    /// multi-valued header representation would avoid.
    fn store(&self, host: &str, set_cookie_header: &str) {
        let mut guard = self.store.lock().expect("cookie jar lock poisoned");
        let entry = guard.entry(host.to_owned()).or_default();
        for segment in set_cookie_header.split(',') {
            let pair = segment.split(';').next().unwrap_or("").trim();
            if let Some((name, value)) = pair.split_once('=') {
                entry.insert(name.trim().to_owned(), value.trim().to_owned());
            }
        }
    }
}

pub struct CookiePolicy {
    jar: std::sync::Arc<dyn CookieJar>,
}

impl CookiePolicy {
    pub fn new(jar: std::sync::Arc<dyn CookieJar>) -> Self { CookiePolicy { jar } }
}

#[async_trait]
impl RequestPolicy for CookiePolicy {
    async fn handle(&self, mut request: Request, next: &dyn PolicyChain) -> Result<RawResponse, ClientError> {
        let host = request.url.host_str().unwrap_or_default().to_owned();
        let stored = self.jar.cookies_for(&host);
        if !stored.is_empty() {
            let cookie_header = stored
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            request.headers.set("cookie", cookie_header);
        }

        let response = next.proceed(request).await?;
        if let Some(set_cookie) = response.headers.get("set-cookie") {
            self.jar.store(&host, set_cookie);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_replays_simple_cookie() {
        let jar = InMemoryCookieJar::new();
        jar.store("example.com", "session=abc123; Path=/");
        let cookies = jar.cookies_for("example.com");
        assert_eq!(cookies, vec![("session".to_owned(), "abc123".to_owned())]);
    }

    #[test]
    fn scopes_cookies_per_host() {
        let jar = InMemoryCookieJar::new();
        jar.store("a.example.com", "x=1");
        assert!(jar.cookies_for("b.example.com").is_empty());
    }
}
