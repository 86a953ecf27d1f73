//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → RouteTable + NavigationConfig + history adapter
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the route table it produces is frozen
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{build_route_table, load_config, parse_config, ConfigError};
pub use schema::{
    HistoryConfig, HistoryMode, LogFormat, NavigationConfig, ObservabilityConfig, RouteConfig,
    RouterConfig,
};
pub use validation::ValidationError;
