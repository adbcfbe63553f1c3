//! HTTP transport collaborator.
//!
//! # Responsibilities
//! - Execute a built `Request` on the network
//! - Buffer the reply into a `Reply` for classification
//!
//! # Design Decisions
//! - TLS, connection pooling and redirects belong to `reqwest`
//! - Errors are returned unchanged; deadlines are enforced by the caller

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ClientResult;
use crate::http::request::Request;
use crate::http::response::Reply;

/// Performs the network round-trip for a request.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: &Request) -> ClientResult<Reply>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with the given connect timeout and user agent.
    pub fn with_settings(connect_timeout: Duration, user_agent: &str) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(user_agent.to_string())
            .build()?;
        Ok(Self::new(client))
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &Request) -> ClientResult<Reply> {
        let mut builder = self
            .client
            .request(request.method().to_reqwest(), request.url().clone())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(Reply {
            status,
            headers,
            body,
        })
    }
}
