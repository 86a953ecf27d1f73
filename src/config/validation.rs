//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route ids and patterns (well-formed, unique)
//! - Validate value ranges and the history base address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

use crate::config::schema::{HistoryMode, RouterConfig};
use crate::error::PatternError;
use crate::routing::CompiledRoute;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty id")]
    EmptyRouteId { index: usize },

    #[error("route `{id}` has an empty view")]
    EmptyView { id: String },

    #[error("route `{id}`: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: PatternError,
    },

    #[error("route id `{id}` is declared more than once")]
    DuplicateRouteId { id: String },

    #[error("routes `{first}` and `{second}` have identical patterns")]
    DuplicatePattern { first: String, second: String },

    #[error("route `{second}` differs from `{first}` only by a trailing slash and can never match without strict_trailing_slash")]
    ShadowedPattern { first: String, second: String },

    #[error("navigation.redirect_depth_limit must be at least 1")]
    ZeroRedirectLimit,

    #[error("history.base `{base}` is not a usable base address: {reason}")]
    InvalidBase { base: String, reason: String },

    #[error("observability.log_level `{0}` is not a known level")]
    UnknownLogLevel(String),
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut ids: HashMap<&str, usize> = HashMap::new();
    let mut shapes: HashMap<String, &str> = HashMap::new();
    let mut loose_shapes: HashMap<String, &str> = HashMap::new();
    let lenient = !config.navigation.strict_trailing_slash;

    for (index, route) in config.routes.iter().enumerate() {
        if route.id.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteId { index });
            continue;
        }
        if ids.insert(route.id.as_str(), index).is_some() {
            errors.push(ValidationError::DuplicateRouteId { id: route.id.clone() });
        }
        if route.view.trim().is_empty() {
            errors.push(ValidationError::EmptyView { id: route.id.clone() });
        }

        match CompiledRoute::compile(&route.path) {
            Ok(compiled) => {
                if let Some(first) = shapes.insert(compiled.shape(), route.id.as_str()) {
                    errors.push(ValidationError::DuplicatePattern {
                        first: first.to_string(),
                        second: route.id.clone(),
                    });
                } else if let Some(first) = loose_shapes.get(&compiled.loose_shape()) {
                    if lenient {
                        errors.push(ValidationError::ShadowedPattern {
                            first: first.to_string(),
                            second: route.id.clone(),
                        });
                    }
                }
                loose_shapes
                    .entry(compiled.loose_shape())
                    .or_insert(route.id.as_str());
            }
            Err(source) => errors.push(ValidationError::InvalidPattern {
                id: route.id.clone(),
                source,
            }),
        }
    }

    if config.navigation.redirect_depth_limit == 0 {
        errors.push(ValidationError::ZeroRedirectLimit);
    }

    if config.history.mode != HistoryMode::Memory {
        match Url::parse(&config.history.base) {
            Ok(url) if url.cannot_be_a_base() => errors.push(ValidationError::InvalidBase {
                base: config.history.base.clone(),
                reason: "cannot carry a path".to_string(),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidBase {
                base: config.history.base.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(id: &str, path: &str) -> RouteConfig {
        RouteConfig {
            id: id.into(),
            path: path.into(),
            view: id.into(),
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = RouterConfig::default();
        config.routes = vec![route("TaskList", "/"), route("UserList", "/users")];
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.routes = vec![
            route("UserList", "/users"),
            route("UserList", "/people"),
            route("Again", "/users/"),
            route("Twin", "//users"),
            route("Bad", "users"),
        ];
        config.navigation.redirect_depth_limit = 0;
        config.history.mode = HistoryMode::Browser;
        config.history.base = "not a url".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateRouteId { id: "UserList".into() }));
        assert!(errors.contains(&ValidationError::DuplicatePattern {
            first: "UserList".into(),
            second: "Twin".into(),
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidPattern { id, .. } if id == "Bad")));
        assert!(errors.contains(&ValidationError::ZeroRedirectLimit));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidBase { .. })));
        assert!(errors.contains(&ValidationError::UnknownLogLevel("loud".into())));
        assert!(errors.contains(&ValidationError::ShadowedPattern {
            first: "UserList".into(),
            second: "Again".into(),
        }));
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn test_trailing_slash_twin_allowed_only_when_strict() {
        let mut config = RouterConfig::default();
        config.routes = vec![route("UserList", "/users"), route("UserListSlash", "/users/")];
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ShadowedPattern {
                first: "UserList".into(),
                second: "UserListSlash".into(),
            }])
        );

        config.navigation.strict_trailing_slash = true;
        assert_eq!(validate_config(&config), Ok(()));
    }
}
