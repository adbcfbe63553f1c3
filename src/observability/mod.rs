//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline, pool, cache and health subsystems produce:
//!     → logging.rs (structured `tracing` events)
//!     → metrics.rs (counters, gauges, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → the embedding application's subscriber / metrics recorder
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing a subscriber or recorder is the
//!   binary's job
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
