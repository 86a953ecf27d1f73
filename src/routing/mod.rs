//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteDefinition[]
//!     → pattern.rs (compile segments, collect parameter names)
//!     → table.rs (reject duplicates, freeze in registration order)
//!
//! Resolution (per navigation):
//!     requested path
//!     → matcher.rs (normalize, decode, split query)
//!     → first compiled route that matches structurally
//!     → Return: ResolvedRoute or NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in the hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod matcher;
pub mod pattern;
pub mod table;

pub use matcher::{PathMatcher, Resolution, ResolvedRoute};
pub use pattern::CompiledRoute;
pub use table::{RouteDefinition, RouteTable};
