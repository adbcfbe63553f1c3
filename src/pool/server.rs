//! Server abstraction.
//!
//! # Responsibilities
//! - Represent a single base server (scheme, authority, base path)
//! - Reject servers without scheme or authority at construction time
//! - Provide the identity used for pool membership (normalized URL)

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::ClientError;

/// A configured base server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Server {
    url: Url,
}

impl Server {
    /// Parse a server from a URL string.
    pub fn parse(input: &str) -> Result<Self, ClientError> {
        let url = Url::parse(input.trim()).map_err(|e| {
            ClientError::Configuration(format!(
                "Server must specify a scheme and authority: {input:?} ({e})"
            ))
        })?;
        Self::from_url(url)
    }

    /// Wrap an already parsed URL.
    pub fn from_url(url: Url) -> Result<Self, ClientError> {
        if url.scheme().is_empty() || url.cannot_be_a_base() || !url.has_host() {
            return Err(ClientError::Configuration(format!(
                "Server must specify a scheme and authority: {url}"
            )));
        }
        if url.host_str().is_some_and(str::is_empty) {
            return Err(ClientError::Configuration(format!(
                "Server must specify a non-empty host: {url}"
            )));
        }
        Ok(Self { url })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// `[userinfo@]host[:port]`.
    pub fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        let mut authority = String::new();
        if !self.url.username().is_empty() {
            authority.push_str(self.url.username());
            if let Some(password) = self.url.password() {
                authority.push(':');
                authority.push_str(password);
            }
            authority.push('@');
        }
        authority.push_str(host);
        if let Some(port) = self.url.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        authority
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl FromStr for Server {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
