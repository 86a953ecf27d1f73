//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::RouteDefinition;

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Matching and navigation behaviour.
    pub navigation: NavigationConfig,

    /// History environment.
    pub history: HistoryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, in precedence order.
    pub routes: Vec<RouteConfig>,
}

impl RouterConfig {
    /// Route definitions whose view handle is the configured view name.
    pub fn route_definitions(&self) -> Vec<RouteDefinition<String>> {
        self.routes
            .iter()
            .map(|r| RouteDefinition::new(r.id.clone(), r.path.clone(), r.view.clone()))
            .collect()
    }
}

/// Navigation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Treat a trailing slash as significant when matching.
    pub strict_trailing_slash: bool,

    /// Maximum redirects followed by one navigation.
    pub redirect_depth_limit: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            strict_trailing_slash: false,
            redirect_depth_limit: 10,
        }
    }
}

/// Which history adapter backs the navigator.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// In-memory stack (tests, non-browser hosts).
    #[default]
    Memory,
    /// Paths written into the address path.
    Browser,
    /// Paths written into the address fragment.
    Hash,
}

/// History configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub mode: HistoryMode,

    /// Base address for `browser` and `hash` modes.
    pub base: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            mode: HistoryMode::Memory,
            base: "http://localhost/".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// A route declared in configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route identifier.
    pub id: String,

    /// Path pattern (e.g. `/users/:id`).
    pub path: String,

    /// Name of the view the host renders for this route.
    pub view: String,
}
