//! Content-type to decoder registry.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Decodes a response body into a structured payload.
///
/// `Ok(None)` means "nothing to decode"; an `Err` carries the reason a body
/// that should have been decodable was rejected.
pub trait Decoder: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;
    fn decode(&self, body: &[u8]) -> Result<Option<Value>, String>;
}

/// Decoder that never produces a payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDecoder;

impl Decoder for NullDecoder {
    fn name(&self) -> &'static str {
        "null"
    }

    fn decode(&self, _body: &[u8]) -> Result<Option<Value>, String> {
        Ok(None)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decode(&self, body: &[u8]) -> Result<Option<Value>, String> {
        serde_json::from_slice(body).map(Some).map_err(|e| e.to_string())
    }
}

/// Maps `Content-Type` values to decoders.
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    decoders: HashMap<String, Arc<dyn Decoder>>,
    fallback: Arc<dyn Decoder>,
}

impl ParserRegistry {
    /// Registry with no decoders; everything falls back to [`NullDecoder`].
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
            fallback: Arc::new(NullDecoder),
        }
    }

    #[must_use]
    pub fn with(mut self, content_type: &str, decoder: Arc<dyn Decoder>) -> Self {
        self.register(content_type, decoder);
        self
    }

    pub fn register(&mut self, content_type: &str, decoder: Arc<dyn Decoder>) {
        self.decoders
            .insert(content_type.trim().to_ascii_lowercase(), decoder);
    }

    pub fn fallback(&self) -> Arc<dyn Decoder> {
        self.fallback.clone()
    }

    /// Decoder for a `Content-Type` header value. Tries the full value, then
    /// the media type without parameters.
    pub fn find(&self, content_type: Option<&str>) -> Arc<dyn Decoder> {
        let Some(content_type) = content_type else {
            return self.fallback();
        };
        let full = content_type.trim().to_ascii_lowercase();
        if let Some(decoder) = self.decoders.get(&full) {
            return decoder.clone();
        }
        let essence = full.split(';').next().unwrap_or_default().trim();
        self.decoders
            .get(essence)
            .cloned()
            .unwrap_or_else(|| self.fallback())
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::empty().with("application/json", Arc::new(JsonDecoder))
    }
}
