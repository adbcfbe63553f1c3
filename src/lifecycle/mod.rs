//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Resource::spawn_health_policy
//!     → background tasks subscribe to Shutdown
//!
//! Ctrl-C or Shutdown::trigger
//!     → every subscribed loop exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
