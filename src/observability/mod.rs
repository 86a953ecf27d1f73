//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Navigator produces:
//!     → logging.rs (structured log events, one span per navigation)
//!     → metrics.rs (outcome counters, duration histogram)
//!
//! Consumers:
//!     → Log output (stdout, pretty or JSON)
//!     → Whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Every navigation carries a UUID correlation id in its span
//! - Metrics are cheap (no-op without a recorder)

pub mod logging;
pub mod metrics;
