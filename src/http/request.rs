//! Request construction and identity.
//!
//! # Responsibilities
//! - Enumerate supported HTTP verbs
//! - Build the effective URL from server + call-site URL
//! - Derive the request identity used as cache key
//!
//! # Design Decisions
//! - Identity is a SHA-256 of the serialized URL; `url` has already
//!   percent-encoded / punycoded it, so the bytes are canonical ASCII
//! - Headers are the only mutable part, and only middleware pre-hooks touch them

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::http::url::merge;
use crate::pool::Server;

/// Supported HTTP verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Patch,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Patch,
        Method::Post,
        Method::Put,
        Method::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Patch => "PATCH",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Patch => reqwest::Method::PATCH,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for Method {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::UnsupportedMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-addressed identifier of an effective URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn of(url: &Url) -> Self {
        let digest = Sha256::digest(url.as_str().as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    server: Server,
    url: Url,
    id: RequestId,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Build a request for `reference` against `server`.
    pub fn new(server: Server, method: Method, reference: &str) -> ClientResult<Self> {
        let url = merge(&server, reference)?;
        let id = RequestId::of(&url);
        Ok(Self {
            method,
            server,
            url,
            id,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set (replace) an outgoing header.
    pub fn set_header(&mut self, name: &str, value: &str) -> ClientResult<()> {
        let name = HeaderName::from_str(name)
            .map_err(|e| ClientError::Configuration(format!("Invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ClientError::Configuration(format!("Invalid value for header {name}: {e}"))
        })?;
        self.headers.insert(name, value);
        Ok(())
    }
}
