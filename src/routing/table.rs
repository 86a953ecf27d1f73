//! Route table.
//!
//! # Responsibilities
//! - Hold route definitions in registration order
//! - Reject duplicate ids and structurally identical patterns
//! - Cache each definition's compiled pattern
//!
//! # Design Decisions
//! - Built once through `register`; there is no mutating API afterwards
//! - Registration order is precedence order for the matcher

use std::collections::HashMap;

use crate::error::RouteTableError;
use crate::routing::pattern::CompiledRoute;

/// A route declared by the hosting application.
///
/// `V` is the opaque view handle; the router hands it back but never
/// inspects it.
#[derive(Debug, Clone)]
pub struct RouteDefinition<V> {
    id: String,
    pattern: String,
    param_names: Vec<String>,
    view: V,
}

impl<V> RouteDefinition<V> {
    /// Declare a route. Parameter names are filled in at registration.
    pub fn new(id: impl Into<String>, pattern: impl Into<String>, view: V) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            param_names: Vec::new(),
            view,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parameter names in pattern order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The bound view handle.
    pub fn view(&self) -> &V {
        &self.view
    }
}

#[derive(Debug)]
struct RegisteredRoute<V> {
    definition: RouteDefinition<V>,
    compiled: CompiledRoute,
}

/// Frozen, ordered collection of routes.
#[derive(Debug)]
pub struct RouteTable<V> {
    routes: Vec<RegisteredRoute<V>>,
    by_id: HashMap<String, usize>,
}

impl<V> RouteTable<V> {
    /// Validate and freeze a set of definitions.
    pub fn register(
        definitions: impl IntoIterator<Item = RouteDefinition<V>>,
    ) -> Result<Self, RouteTableError> {
        let mut routes = Vec::new();
        let mut by_id = HashMap::new();
        let mut shapes: HashMap<String, String> = HashMap::new();

        for mut definition in definitions {
            if by_id.contains_key(&definition.id) {
                return Err(RouteTableError::DuplicateId { id: definition.id });
            }

            let compiled = CompiledRoute::compile(&definition.pattern).map_err(|source| {
                RouteTableError::InvalidPattern {
                    id: definition.id.clone(),
                    source,
                }
            })?;

            if let Some(existing) = shapes.get(&compiled.shape()) {
                return Err(RouteTableError::DuplicatePattern {
                    pattern: definition.pattern,
                    existing: existing.clone(),
                    duplicate: definition.id,
                });
            }
            shapes.insert(compiled.shape(), definition.id.clone());

            definition.param_names = compiled.param_names();
            by_id.insert(definition.id.clone(), routes.len());
            tracing::debug!(
                id = %definition.id,
                pattern = %definition.pattern,
                params = ?definition.param_names,
                "Route registered"
            );
            routes.push(RegisteredRoute {
                definition,
                compiled,
            });
        }

        tracing::info!(routes = routes.len(), "Route table frozen");
        Ok(Self { routes, by_id })
    }

    /// Look up a definition by id.
    pub fn lookup(&self, id: &str) -> Option<&RouteDefinition<V>> {
        self.by_id.get(id).map(|&i| &self.routes[i].definition)
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition<V>> {
        self.routes.iter().map(|r| &r.definition)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn compiled(&self) -> impl Iterator<Item = (&RouteDefinition<V>, &CompiledRoute)> {
        self.routes.iter().map(|r| (&r.definition, &r.compiled))
    }

    pub(crate) fn compiled_for(&self, id: &str) -> Option<&CompiledRoute> {
        self.by_id.get(id).map(|&i| &self.routes[i].compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let table = RouteTable::register(vec![
            RouteDefinition::new("TaskList", "/", "TaskList"),
            RouteDefinition::new("UserList", "/users", "UserList"),
            RouteDefinition::new("User", "/users/:id", "UserDetail"),
        ])
        .unwrap();

        assert_eq!(table.len(), 3);
        let user = table.lookup("User").unwrap();
        assert_eq!(user.pattern(), "/users/:id");
        assert_eq!(user.param_names(), &["id".to_string()]);
        assert_eq!(*user.view(), "UserDetail");
        assert!(table.lookup("Missing").is_none());

        let ids: Vec<_> = table.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["TaskList", "UserList", "User"]);
    }

    #[test]
    fn test_duplicate_id() {
        let err = RouteTable::register(vec![
            RouteDefinition::new("UserList", "/users", ()),
            RouteDefinition::new("UserList", "/people", ()),
        ])
        .unwrap_err();
        assert_eq!(err, RouteTableError::DuplicateId { id: "UserList".into() });
    }

    #[test]
    fn test_duplicate_pattern() {
        let err = RouteTable::register(vec![
            RouteDefinition::new("A", "/users/:id", ()),
            RouteDefinition::new("B", "/users/:uid", ()),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            RouteTableError::DuplicatePattern {
                pattern: "/users/:uid".into(),
                existing: "A".into(),
                duplicate: "B".into(),
            }
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RouteTable::register(vec![RouteDefinition::new("Bad", "users", ())]).unwrap_err();
        assert!(matches!(err, RouteTableError::InvalidPattern { ref id, .. } if id == "Bad"));
    }
}
