//! HTTP request/response pipeline.
//!
//! # Data Flow
//! ```text
//! Server + call-site URL
//!     → url.rs (component-wise merge)
//!     → request.rs (method, effective URL, request identity)
//!     → transport.rs (network round-trip via reqwest)
//!     → response.rs (should-decode decision, status dispatch)
//!     → parser.rs (content-type → decoder)
//! ```

pub mod parser;
pub mod request;
pub mod response;
pub mod transport;
pub mod url;

pub use parser::{Decoder, JsonDecoder, NullDecoder, ParserRegistry};
pub use request::{Method, Request, RequestId};
pub use response::{Reply, Response, StatusAction, StatusKey, StatusTable};
pub use transport::{ReqwestTransport, Transport};
