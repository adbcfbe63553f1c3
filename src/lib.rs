//! REST client toolkit.
//!
//! Issues HTTP requests against a pool of base servers, classifies and
//! decodes responses, and revalidates repeated GETs with ETags.
//!
//! ```text
//! Resource ──▶ ServerPool ──▶ Request ──▶ Pipeline::pre ──▶ Transport
//!    ▲                                                         │
//!    └──── Pipeline::post ◀──── Response::classify ◀───────────┘
//!                 │
//!                 ▼
//!            CacheStore (memory | memcached)
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod pool;
pub mod resource;

pub use cache::{CacheStore, MemcachedStore, MemoryStore, SharedCache};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use health::HealthEvent;
pub use http::{Method, Request, Response};
pub use lifecycle::Shutdown;
pub use middleware::{EtagMiddleware, Middleware, RequestIdMiddleware};
pub use pool::{Server, ServerPool};
pub use resource::{Resource, ResourceBuilder};
