//! Response classification.
//!
//! # Responsibilities
//! - Decide whether a reply body should be decoded at all
//! - Select a decoder from the parser registry
//! - Dispatch on status code (exact code first, then status class)
//!
//! # Design Decisions
//! - 1xx, 204, 304 and empty/absent `Content-Length` never decode
//! - A non-numeric `Content-Length` is an error, never a silent default
//! - Unknown content types decode to nothing (`parsed = false`)
//! - Transport status is kept separately from the effective status so a
//!   cache substitution after 304 stays visible in diagnostics

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, ETAG};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{ClientError, ClientResult};
use crate::http::parser::ParserRegistry;

/// A raw reply as returned by the transport.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Key into the status handler table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKey {
    /// Exact code, e.g. `200`.
    Exact(u16),
    /// Status class, e.g. `Class(2)` for `2xx`.
    Class(u16),
}

/// What a status handler does with the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    /// Run the selected decoder.
    Decode,
    /// Leave the payload empty.
    Ignore,
}

/// Per-status handler table.
#[derive(Debug, Clone)]
pub struct StatusTable {
    handlers: HashMap<StatusKey, StatusAction>,
}

impl StatusTable {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: StatusKey, action: StatusAction) -> Self {
        self.handlers.insert(key, action);
        self
    }

    /// Handler for `status`: exact code first, then its class.
    pub fn lookup(&self, status: u16) -> Option<StatusAction> {
        self.handlers
            .get(&StatusKey::Exact(status))
            .or_else(|| self.handlers.get(&StatusKey::Class(status / 100)))
            .copied()
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self::empty()
            .with(StatusKey::Exact(200), StatusAction::Decode)
            .with(StatusKey::Exact(204), StatusAction::Ignore)
            .with(StatusKey::Class(2), StatusAction::Ignore)
    }
}

/// A classified response.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    transport_status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
    payload: Option<Value>,
    parsed: bool,
    decoder: &'static str,
    from_cache: bool,
}

impl Response {
    /// Classify a transport reply and decode its body where appropriate.
    pub fn classify(
        reply: Reply,
        parsers: &ParserRegistry,
        statuses: &StatusTable,
    ) -> ClientResult<Self> {
        let Reply {
            status,
            headers,
            body,
        } = reply;

        let decoder = if should_decode(status, &headers)? {
            parsers.find(header_str(&headers, CONTENT_TYPE.as_str()))
        } else {
            tracing::debug!(status, "Reply carries no decodable body, using null decoder");
            parsers.fallback()
        };

        let mut response = Self {
            status,
            transport_status: status,
            headers,
            body,
            payload: None,
            parsed: false,
            decoder: decoder.name(),
            from_cache: false,
        };

        match statuses.lookup(status) {
            Some(StatusAction::Decode) => {
                response.payload = decoder.decode(&response.body).map_err(|reason| {
                    ClientError::Decode {
                        content_type: response
                            .header(CONTENT_TYPE.as_str())
                            .unwrap_or("unknown")
                            .to_string(),
                        reason,
                    }
                })?;
                response.parsed = response.payload.is_some();
            }
            Some(StatusAction::Ignore) => {}
            None => tracing::debug!(status, "No status handler registered"),
        }

        tracing::debug!(
            status,
            decoder = response.decoder,
            parsed = response.parsed,
            "Response classified"
        );
        Ok(response)
    }

    /// Rebuild a response from stored parts.
    pub(crate) fn from_parts(
        status: u16,
        headers: HeaderMap,
        body: Vec<u8>,
        payload: Option<Value>,
        parsed: bool,
    ) -> Self {
        Self {
            status,
            transport_status: status,
            headers,
            body,
            payload,
            parsed,
            decoder: if parsed { "cached" } else { "null" },
            from_cache: false,
        }
    }

    /// Replace the observable result with a cached one, keeping the
    /// transport status of the reply actually received.
    pub fn substitute(&mut self, cached: Response) {
        let transport_status = self.transport_status;
        *self = Self {
            transport_status,
            from_cache: true,
            ..cached
        };
    }

    /// Effective status (the cached one after a 304 substitution).
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status of the reply on the wire.
    pub fn transport_status(&self) -> u16 {
        self.transport_status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_str(&self.headers, name)
    }

    pub fn etag(&self) -> Option<&str> {
        self.header(ETAG.as_str()).filter(|e| !e.is_empty())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn parsed(&self) -> bool {
        self.parsed
    }

    pub fn decoder(&self) -> &'static str {
        self.decoder
    }

    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// `Ok(None)` when absent or empty, error when present but not an integer.
fn content_length(headers: &HeaderMap) -> ClientResult<Option<u64>> {
    let Some(raw) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };
    let text = raw
        .to_str()
        .map_err(|_| ClientError::Parse(String::from_utf8_lossy(raw.as_bytes()).into_owned()))?
        .trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u64>().map(Some).map_err(|_| {
        tracing::info!(content_length = text, "Content-Length is not an integer");
        ClientError::Parse(text.to_string())
    })
}

fn should_decode(status: u16, headers: &HeaderMap) -> ClientResult<bool> {
    match content_length(headers)? {
        None | Some(0) => return Ok(false),
        Some(_) => {}
    }
    Ok(!((100..200).contains(&status) || status == 204 || status == 304))
}
