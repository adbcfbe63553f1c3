//! Health policy subsystem.
//!
//! # Data Flow
//! ```text
//! Passive (passive.rs):
//!     Resource call outcome
//!     → HealthEvent on the resource's broadcast channel
//!     → consecutive failure count per server
//!     → ServerPool::disable when the threshold is reached
//!
//! Active recovery (active.rs):
//!     Periodic timer
//!     → probe each inactive server
//!     → ServerPool::enable after enough consecutive successes
//! ```
//!
//! # Design Decisions
//! - The pool only knows disable/enable; all counting lives here
//! - Active probing only touches disabled servers, live traffic covers the rest
//! - Both loops exit on the shutdown broadcast

use crate::pool::Server;

pub mod active;
pub mod passive;

pub use active::RecoveryProber;
pub use passive::PassiveHealthMonitor;

/// Outcome of one call, as seen by the health policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Transport failure or timeout talking to `server`.
    Failure { server: Server, reason: String },
    /// `server` answered (any status).
    Success { server: Server },
}

impl HealthEvent {
    pub fn server(&self) -> &Server {
        match self {
            HealthEvent::Failure { server, .. } | HealthEvent::Success { server } => server,
        }
    }
}
