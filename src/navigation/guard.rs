//! Navigation guards and the not-found handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GuardError;
use crate::routing::ResolvedRoute;

/// What a guard decides about a pending navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the navigation continue to the next guard.
    Allow,
    /// Abandon this target and navigate to another path instead.
    Redirect(String),
    /// Reject the navigation; current state is kept.
    Deny,
}

/// A check consulted before a navigation commits.
///
/// Guards run in registration order. The first non-`Allow` decision
/// short-circuits the rest.
#[async_trait]
pub trait NavigationGuard: Send + Sync {
    async fn decide(
        &self,
        from: Option<&ResolvedRoute>,
        to: &ResolvedRoute,
    ) -> Result<GuardDecision, GuardError>;
}

/// Shared guard handle.
pub type BoxedGuard = Arc<dyn NavigationGuard>;

/// Guard backed by a synchronous closure.
pub struct FnGuard<F>(F);

/// Wrap a closure as a guard.
pub fn guard_fn<F>(f: F) -> FnGuard<F>
where
    F: Fn(Option<&ResolvedRoute>, &ResolvedRoute) -> GuardDecision + Send + Sync,
{
    FnGuard(f)
}

#[async_trait]
impl<F> NavigationGuard for FnGuard<F>
where
    F: Fn(Option<&ResolvedRoute>, &ResolvedRoute) -> GuardDecision + Send + Sync,
{
    async fn decide(
        &self,
        from: Option<&ResolvedRoute>,
        to: &ResolvedRoute,
    ) -> Result<GuardDecision, GuardError> {
        Ok((self.0)(from, to))
    }
}

/// What to do with a path that matched no route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundAction {
    Reject,
    /// Counts against the redirect depth limit.
    Redirect(String),
}

/// Called with the unmatched path.
pub type NotFoundHandler = Arc<dyn Fn(&str) -> NotFoundAction + Send + Sync>;

pub(crate) fn default_not_found() -> NotFoundHandler {
    Arc::new(|path: &str| {
        tracing::warn!(path = %path, "No route matched");
        NotFoundAction::Reject
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn route(path: &str) -> ResolvedRoute {
        ResolvedRoute {
            route_id: "Any".into(),
            params: BTreeMap::new(),
            path: path.into(),
            query: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_fn_guard() {
        let guard = guard_fn(|from, to| match (from, to.path.as_str()) {
            (None, _) => GuardDecision::Allow,
            (Some(_), "/admin") => GuardDecision::Redirect("/login".into()),
            _ => GuardDecision::Deny,
        });

        assert_eq!(guard.decide(None, &route("/admin")).await.unwrap(), GuardDecision::Allow);
        let from = route("/");
        assert_eq!(
            guard.decide(Some(&from), &route("/admin")).await.unwrap(),
            GuardDecision::Redirect("/login".into())
        );
        assert_eq!(guard.decide(Some(&from), &route("/x")).await.unwrap(), GuardDecision::Deny);
    }
}
