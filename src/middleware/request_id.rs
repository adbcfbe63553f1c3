//! Request ID propagation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::cache::SharedCache;
use crate::error::ClientResult;
use crate::http::Request;
use crate::middleware::Middleware;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Tags every outgoing request with a UUID v4 `x-request-id`, keeping one
/// the caller already set.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestIdMiddleware;

impl RequestIdMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    async fn pre(&self, _cache: &SharedCache, request: &mut Request) -> ClientResult<()> {
        if request.header(X_REQUEST_ID).is_none() {
            request.set_header(X_REQUEST_ID, &Uuid::new_v4().to_string())?;
        }
        Ok(())
    }
}
