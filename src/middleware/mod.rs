//! Middleware pipeline.
//!
//! # Data Flow
//! ```text
//! Request built
//!     → pre(cache, &mut request) for each stage, in configured order
//!     → transport round-trip + classification
//!     → post(cache, &request, &mut response) for each stage, in order
//! ```
//!
//! # Design Decisions
//! - Both hooks default to no-ops; a stage overrides only what it needs
//! - Stages see the in-flight request/response by reference, so their
//!   mutations are visible to later stages and to the caller
//! - The first failing stage aborts the rest of the pipeline and the call

use async_trait::async_trait;
use std::sync::Arc;

use crate::cache::SharedCache;
use crate::error::ClientResult;
use crate::http::{Request, Response};

pub mod etag;
pub mod request_id;

pub use etag::EtagMiddleware;
pub use request_id::RequestIdMiddleware;

/// A pipeline stage with optional hooks around the network call.
#[async_trait]
pub trait Middleware: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    async fn pre(&self, _cache: &SharedCache, _request: &mut Request) -> ClientResult<()> {
        Ok(())
    }

    async fn post(
        &self,
        _cache: &SharedCache,
        _request: &Request,
        _response: &mut Response,
    ) -> ClientResult<()> {
        Ok(())
    }
}

/// Ordered list of middleware stages.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Middleware>>) -> Self {
        Self { stages }
    }

    pub fn push(&mut self, stage: Arc<dyn Middleware>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn run_pre(&self, cache: &SharedCache, request: &mut Request) -> ClientResult<()> {
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), "Running pre hook");
            stage.pre(cache, request).await?;
        }
        Ok(())
    }

    pub async fn run_post(
        &self,
        cache: &SharedCache,
        request: &Request,
        response: &mut Response,
    ) -> ClientResult<()> {
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), "Running post hook");
            stage.post(cache, request, response).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::error::ClientError;
    use crate::http::Method;
    use crate::pool::Server;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail_pre: bool,
    }

    #[async_trait]
    impl Middleware for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn pre(&self, _cache: &SharedCache, request: &mut Request) -> ClientResult<()> {
            self.log.lock().unwrap().push(format!("pre:{}", self.label));
            if self.fail_pre {
                return Err(ClientError::Configuration(format!("{} broke", self.label)));
            }
            request.set_header("x-stage", self.label)
        }
    }

    /// Only implements `name`; both hooks fall back to the defaults.
    #[derive(Debug)]
    struct Inert;

    impl Middleware for Inert {
        fn name(&self) -> &'static str {
            "inert"
        }
    }

    fn request() -> Request {
        Request::new(Server::parse("http://f.c").unwrap(), Method::Get, "/x").unwrap()
    }

    fn cache() -> SharedCache {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_runs_in_order_and_mutations_are_visible() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(vec![
            Arc::new(Recorder { label: "a", log: log.clone(), fail_pre: false }),
            Arc::new(Inert),
            Arc::new(Recorder { label: "b", log: log.clone(), fail_pre: false }),
        ]);
        let mut req = request();
        pipeline.run_pre(&cache(), &mut req).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["pre:a", "pre:b"]);
        assert_eq!(req.header("x-stage"), Some("b"));
        assert_eq!(pipeline.names(), vec!["a", "inert", "b"]);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_stages() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(vec![
            Arc::new(Recorder { label: "a", log: log.clone(), fail_pre: true }),
            Arc::new(Recorder { label: "b", log: log.clone(), fail_pre: false }),
        ]);
        let err = pipeline.run_pre(&cache(), &mut request()).await.unwrap_err();
        assert!(err.to_string().contains("a broke"));
        assert_eq!(*log.lock().unwrap(), vec!["pre:a"]);
    }
}
