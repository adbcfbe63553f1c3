//! Conditional-GET bookkeeping on top of a `CacheStore`.
//!
//! Two associations are kept:
//! - `etag:<digest>` → serialized [`CachedResponse`]
//! - `req:<request id>` → etag
//!
//! The response is always written before the request→etag pointer, so a
//! concurrent reader that sees a new etag can always resolve it.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::cache::{CacheError, SharedCache};
use crate::http::request::RequestId;
use crate::http::response::Response;
use crate::observability::metrics;

/// Serializable snapshot of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub payload: Option<Value>,
    pub parsed: bool,
}

impl From<&Response> for CachedResponse {
    fn from(response: &Response) -> Self {
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        Self {
            status: response.status(),
            headers,
            body: response.body().to_vec(),
            payload: response.payload().cloned(),
            parsed: response.parsed(),
        }
    }
}

impl From<CachedResponse> for Response {
    fn from(cached: CachedResponse) -> Self {
        let mut headers = HeaderMap::new();
        for (k, v) in &cached.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::try_from(k.as_str()), HeaderValue::from_str(v)) {
                headers.append(name, value);
            }
        }
        Response::from_parts(cached.status, headers, cached.body, cached.payload, cached.parsed)
    }
}

/// ETag view over a shared cache store.
#[derive(Debug, Clone)]
pub struct EtagCache {
    store: SharedCache,
}

impl EtagCache {
    pub fn new(store: SharedCache) -> Self {
        Self { store }
    }

    fn etag_key(etag: &str) -> String {
        format!("etag:{}", hex::encode(Sha256::digest(etag.as_bytes())))
    }

    fn request_key(id: &RequestId) -> String {
        format!("req:{id}")
    }

    /// Remember `response` under `etag` and point `id` at it.
    pub async fn record(&self, id: &RequestId, etag: &str, response: &Response) -> Result<(), CacheError> {
        let value = serde_json::to_vec(&CachedResponse::from(response))?;
        self.store.set(&Self::etag_key(etag), value).await?;
        self.store
            .set(&Self::request_key(id), etag.as_bytes().to_vec())
            .await?;
        tracing::info!(request_id = %id, etag, "Cached response by etag");
        Ok(())
    }

    /// Last etag seen for this request identity.
    pub async fn lookup_etag(&self, id: &RequestId) -> Result<Option<String>, CacheError> {
        let etag = self
            .store
            .get(&Self::request_key(id))
            .await?
            .and_then(|raw| String::from_utf8(raw).ok())
            .filter(|e| !e.is_empty());
        metrics::record_cache_lookup(etag.is_some());
        Ok(etag)
    }

    /// Cached response for an etag.
    pub async fn lookup_response(&self, etag: &str) -> Result<Option<CachedResponse>, CacheError> {
        match self.store.get(&Self::etag_key(etag)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }
}
