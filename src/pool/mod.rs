//! Server pool subsystem.
//!
//! # Data Flow
//! ```text
//! Configured server URLs
//!     → server.rs (parse & validate scheme/authority)
//!     → pool.rs (deduplicate, all servers start active)
//!     → round_robin.rs (rotation cursor over the active set)
//!     → Resource asks pool.next() per call
//!
//! Health signals (health subsystem):
//!     disable(server) → active → inactive
//!     enable(server)  → inactive → active
//! ```
//!
//! # Design Decisions
//! - One mutex guards membership and cursor; operations are O(servers)
//! - The lock is released before any network I/O
//! - The pool reports health, it does not implement retry policy

#[allow(clippy::module_inception)]
pub mod pool;
pub mod round_robin;
pub mod server;

pub use pool::{PoolSnapshot, ServerPool};
pub use server::Server;
