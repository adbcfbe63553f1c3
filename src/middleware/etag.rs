//! Conditional-GET middleware.
//!
//! # Responsibilities
//! - pre: attach `If-None-Match` with the last etag seen for this request,
//!   only while the response stored under that etag is still resolvable
//! - post: record 2xx responses carrying an `ETag`
//! - post: on 304, substitute the cached representation
//!
//! # Design Decisions
//! - Only GET requests participate
//! - A 304 whose etag is no longer in the cache is passed through as-is

use async_trait::async_trait;
use reqwest::header::IF_NONE_MATCH;

use crate::cache::{EtagCache, SharedCache};
use crate::error::ClientResult;
use crate::http::{Method, Request, Response};
use crate::middleware::Middleware;

#[derive(Debug, Default, Clone, Copy)]
pub struct EtagMiddleware;

impl EtagMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for EtagMiddleware {
    fn name(&self) -> &'static str {
        "etag"
    }

    async fn pre(&self, cache: &SharedCache, request: &mut Request) -> ClientResult<()> {
        if request.method() != Method::Get {
            return Ok(());
        }
        let cache = EtagCache::new(cache.clone());
        let Some(etag) = cache.lookup_etag(request.id()).await? else {
            return Ok(());
        };
        // An expiring store can drop the response while keeping the pointer;
        // a 304 for it would leave nothing to substitute.
        if cache.lookup_response(&etag).await?.is_none() {
            tracing::debug!(request_id = %request.id(), etag = %etag, "Cached response gone, sending unconditional request");
            return Ok(());
        }
        tracing::debug!(request_id = %request.id(), etag = %etag, "Sending conditional request");
        request.set_header(IF_NONE_MATCH.as_str(), &etag)?;
        Ok(())
    }

    async fn post(
        &self,
        cache: &SharedCache,
        request: &Request,
        response: &mut Response,
    ) -> ClientResult<()> {
        if request.method() != Method::Get {
            return Ok(());
        }
        let cache = EtagCache::new(cache.clone());

        if response.transport_status() == 304 {
            let Some(sent) = request.header(IF_NONE_MATCH.as_str()) else {
                return Ok(());
            };
            match cache.lookup_response(sent).await? {
                Some(cached) => {
                    tracing::info!(request_id = %request.id(), etag = sent, "Returning cached response for 304");
                    response.substitute(cached.into());
                }
                None => {
                    tracing::warn!(request_id = %request.id(), etag = sent, "304 for an etag missing from cache");
                }
            }
            return Ok(());
        }

        if !response.is_success() {
            return Ok(());
        }
        match response.etag() {
            Some(etag) => cache.record(request.id(), etag, response).await?,
            None => tracing::debug!(request_id = %request.id(), "No etag to cache on"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, CacheStore, MemoryStore};
    use crate::http::{ParserRegistry, Reply, StatusTable};
    use crate::pool::Server;
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde_json::json;
    use std::sync::Arc;

    const BODY: &str = r#"{"hello":"world"}"#;

    fn request(method: Method) -> Request {
        Request::new(Server::parse("http://f.c").unwrap(), method, "/sample.json").unwrap()
    }

    fn response(status: u16, etag: Option<&str>, body: &str) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("content-length", HeaderValue::from(body.len()));
        if let Some(etag) = etag {
            headers.insert("etag", HeaderValue::from_str(etag).unwrap());
        }
        Response::classify(
            Reply {
                status,
                headers,
                body: body.as_bytes().to_vec(),
            },
            &ParserRegistry::default(),
            &StatusTable::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_round_trip() {
        let cache: SharedCache = Arc::new(MemoryStore::new());
        let mw = EtagMiddleware::new();

        // First call: nothing cached yet.
        let mut first = request(Method::Get);
        mw.pre(&cache, &mut first).await.unwrap();
        assert!(first.header("if-none-match").is_none());
        let mut fresh = response(200, Some("\"v1\""), BODY);
        mw.post(&cache, &first, &mut fresh).await.unwrap();

        // Second call: conditional header attached, 304 substituted.
        let mut second = request(Method::Get);
        mw.pre(&cache, &mut second).await.unwrap();
        assert_eq!(second.header("if-none-match"), Some("\"v1\""));
        let mut revalidated = response(304, Some("\"v1\""), "");
        mw.post(&cache, &second, &mut revalidated).await.unwrap();

        assert_eq!(revalidated.transport_status(), 304);
        assert_eq!(revalidated.status(), 200);
        assert_eq!(revalidated.payload(), Some(&json!({"hello": "world"})));
        assert_eq!(revalidated.payload(), fresh.payload());
        assert!(revalidated.from_cache());
    }

    #[tokio::test]
    async fn test_no_etag_no_cache() {
        let cache: SharedCache = Arc::new(MemoryStore::new());
        let mw = EtagMiddleware::new();

        let req = request(Method::Get);
        let mut res = response(200, None, BODY);
        mw.post(&cache, &req, &mut res).await.unwrap();

        let mut next = request(Method::Get);
        mw.pre(&cache, &mut next).await.unwrap();
        assert!(next.header("if-none-match").is_none());
        assert!(EtagCache::new(cache).lookup_etag(req.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_get_is_ignored() {
        let cache: SharedCache = Arc::new(MemoryStore::new());
        let mw = EtagMiddleware::new();

        let req = request(Method::Put);
        let mut res = response(200, Some("\"v1\""), BODY);
        mw.post(&cache, &req, &mut res).await.unwrap();
        assert!(EtagCache::new(cache).lookup_etag(req.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_status_not_cached() {
        let cache: SharedCache = Arc::new(MemoryStore::new());
        let mw = EtagMiddleware::new();

        let req = request(Method::Get);
        let mut res = response(500, Some("\"oops\""), BODY);
        mw.post(&cache, &req, &mut res).await.unwrap();
        assert!(EtagCache::new(cache).lookup_etag(req.id()).await.unwrap().is_none());
    }

    /// Store that keeps request pointers but loses every stored response,
    /// as an expiring or evicting backend can.
    #[derive(Debug, Default)]
    struct ForgetfulStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl CacheStore for ForgetfulStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
            if key.starts_with("etag:") {
                return Ok(());
            }
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn test_no_conditional_header_when_response_is_gone() {
        let cache: SharedCache = Arc::new(ForgetfulStore::default());
        let mw = EtagMiddleware::new();

        let first = request(Method::Get);
        let mut fresh = response(200, Some("\"v1\""), BODY);
        mw.post(&cache, &first, &mut fresh).await.unwrap();
        assert_eq!(
            EtagCache::new(cache.clone()).lookup_etag(first.id()).await.unwrap().as_deref(),
            Some("\"v1\"")
        );

        let mut second = request(Method::Get);
        mw.pre(&cache, &mut second).await.unwrap();
        assert!(second.header("if-none-match").is_none());
    }

    #[tokio::test]
    async fn test_304_with_unknown_etag_passes_through() {
        let cache: SharedCache = Arc::new(MemoryStore::new());
        let mw = EtagMiddleware::new();

        let mut req = request(Method::Get);
        req.set_header("if-none-match", "\"gone\"").unwrap();
        let mut res = response(304, None, "");
        mw.post(&cache, &req, &mut res).await.unwrap();
        assert_eq!(res.status(), 304);
        assert!(!res.from_cache());
    }
}
