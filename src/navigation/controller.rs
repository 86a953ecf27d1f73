//! Navigation controller.
//!
//! # Responsibilities
//! - Assign each navigation a sequence number
//! - Resolve the target, run guards, follow redirects
//! - Commit state and history together, then notify subscribers
//! - Re-enter navigation for history pop events
//!
//! # Design Decisions
//! - Last caller wins: a navigation whose sequence is no longer the latest
//!   is discarded at its next checkpoint (around each guard, before commit)
//! - Redirects reuse the sequence number and are capped by
//!   `redirect_depth_limit`
//! - Commits are serialized by a lock; the staleness check happens under it,
//!   so a started commit always completes before the next one begins
//! - State is written only after the history write succeeds

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwap;
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::NavigationConfig;
use crate::error::{NavigationError, NavigationResult};
use crate::history::{HistoryAdapter, HistoryEntry, MemoryHistory, PopEvent};
use crate::navigation::guard::{
    default_not_found, BoxedGuard, GuardDecision, NavigationGuard, NotFoundAction, NotFoundHandler,
};
use crate::navigation::state::{NavigateOptions, NavigationOutcome, NavigationPhase, NavigationState};
use crate::navigation::subscribers::{SubscriberRegistry, Subscription};
use crate::observability::metrics;
use crate::routing::{PathMatcher, Resolution, ResolvedRoute, RouteTable};

/// Builder for a `Navigator`.
pub struct NavigatorBuilder<V> {
    table: Arc<RouteTable<V>>,
    config: NavigationConfig,
    guards: Vec<BoxedGuard>,
    history: Option<Arc<dyn HistoryAdapter>>,
    not_found: Option<NotFoundHandler>,
}

impl<V> NavigatorBuilder<V> {
    pub fn config(mut self, config: NavigationConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a guard; guards run in the order they are added.
    pub fn guard(mut self, guard: impl NavigationGuard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Use a specific history adapter (defaults to `MemoryHistory`).
    pub fn history(mut self, history: Arc<dyn HistoryAdapter>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> NotFoundAction + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Navigator<V> {
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(MemoryHistory::new()));

        let (pop_tx, pop_rx) = mpsc::unbounded_channel();
        history.on_pop_event(Arc::new(move |event| {
            let _ = pop_tx.send(event);
        }));

        tracing::debug!(
            routes = self.table.len(),
            guards = self.guards.len(),
            strict_trailing_slash = self.config.strict_trailing_slash,
            redirect_depth_limit = self.config.redirect_depth_limit,
            "Navigator built"
        );

        Navigator {
            inner: Arc::new(Inner {
                matcher: PathMatcher::new(self.table, self.config.strict_trailing_slash),
                config: self.config,
                guards: self.guards,
                history,
                subscribers: SubscriberRegistry::new(),
                not_found: self.not_found.unwrap_or_else(default_not_found),
                sequence: AtomicU64::new(0),
                state: ArcSwap::from_pointee(NavigationState::default()),
                phase: AtomicU8::new(NavigationPhase::Idle as u8),
                commit_lock: tokio::sync::Mutex::new(()),
                pop_events: Mutex::new(Some(pop_rx)),
            }),
        }
    }
}

struct Inner<V> {
    matcher: PathMatcher<V>,
    config: NavigationConfig,
    guards: Vec<BoxedGuard>,
    history: Arc<dyn HistoryAdapter>,
    subscribers: SubscriberRegistry,
    not_found: NotFoundHandler,
    /// Latest sequence handed out.
    sequence: AtomicU64,
    state: ArcSwap<NavigationState>,
    phase: AtomicU8,
    commit_lock: tokio::sync::Mutex<()>,
    pop_events: Mutex<Option<mpsc::UnboundedReceiver<PopEvent>>>,
}

/// Orchestrates navigations end to end. Cheap to clone.
pub struct Navigator<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for Navigator<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> std::fmt::Debug for Navigator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("sequence", &self.latest_sequence())
            .field("phase", &self.phase())
            .field("current", &self.inner.state.load().current)
            .field("history", &self.inner.history)
            .finish()
    }
}

impl<V> Navigator<V> {
    /// Start building a navigator over a frozen route table.
    pub fn builder(table: Arc<RouteTable<V>>) -> NavigatorBuilder<V> {
        NavigatorBuilder {
            table,
            config: NavigationConfig::default(),
            guards: Vec::new(),
            history: None,
            not_found: None,
        }
    }

    /// Snapshot of the committed state.
    pub fn state(&self) -> Arc<NavigationState> {
        self.inner.state.load_full()
    }

    /// The committed route, if any.
    pub fn current(&self) -> Option<Arc<ResolvedRoute>> {
        self.inner.state.load().current.clone()
    }

    /// Phase of the most recent navigation.
    pub fn phase(&self) -> NavigationPhase {
        NavigationPhase::from(self.inner.phase.load(Ordering::SeqCst))
    }

    /// Highest sequence number handed out so far.
    pub fn latest_sequence(&self) -> u64 {
        self.inner.sequence.load(Ordering::SeqCst)
    }

    pub fn table(&self) -> &Arc<RouteTable<V>> {
        self.inner.matcher.table()
    }

    pub fn history(&self) -> &Arc<dyn HistoryAdapter> {
        &self.inner.history
    }

    /// Resolve without navigating.
    pub fn resolve(&self, path: &str) -> Resolution {
        self.inner.matcher.resolve(path)
    }

    /// Build a path for a route id.
    pub fn href(
        &self,
        route_id: &str,
        params: &std::collections::BTreeMap<String, String>,
    ) -> Option<String> {
        self.inner.matcher.href(route_id, params)
    }

    /// The view bound to a resolved route.
    pub fn view(&self, route: &ResolvedRoute) -> Option<&V> {
        self.table().lookup(&route.route_id).map(|d| d.view())
    }

    /// Observe committed routes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ResolvedRoute) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(listener)
    }

    /// Navigate to `path`.
    pub async fn navigate(
        &self,
        path: &str,
        options: NavigateOptions,
    ) -> NavigationResult<NavigationOutcome> {
        self.dispatch(self.next_sequence(), path.to_string(), options, None)
            .await
    }

    /// Navigate, pushing a history entry.
    pub async fn push(&self, path: &str) -> NavigationResult<NavigationOutcome> {
        self.navigate(path, NavigateOptions::default()).await
    }

    /// Navigate, replacing the current history entry.
    pub async fn replace(&self, path: &str) -> NavigationResult<NavigationOutcome> {
        self.navigate(path, NavigateOptions::replace()).await
    }

    /// Initial navigation to wherever the history currently points.
    pub async fn start(&self) -> NavigationResult<NavigationOutcome> {
        let path = self
            .inner
            .history
            .current()
            .map(|entry| entry.path)
            .unwrap_or_else(|| "/".to_string());
        tracing::info!(path = %path, "Starting navigator");
        self.replace(&path).await
    }

    /// React to a back/forward traversal.
    ///
    /// Runs as a replacing navigation. If it does not commit and no newer
    /// navigation has committed either, the history cursor is moved back so
    /// the address matches the committed route.
    pub async fn handle_pop(&self, event: PopEvent) -> NavigationResult<NavigationOutcome> {
        metrics::record_pop_event();
        let delta = event.delta;
        let sequence = self.next_sequence();
        let result = self
            .dispatch(sequence, event.entry.path, NavigateOptions::replace(), Some(delta))
            .await;

        let settled = matches!(
            result,
            Ok(NavigationOutcome::Committed(_)) | Ok(NavigationOutcome::Duplicated(_))
        );
        if !settled {
            self.restore_position(sequence, delta).await;
        }
        result
    }

    /// Undo a traversal that never committed.
    ///
    /// Held under the commit lock: a navigation newer than the pop that has
    /// already committed wrote history from the popped position, so the
    /// cursor is left alone.
    async fn restore_position(&self, sequence: u64, delta: isize) {
        let _commit = self.inner.commit_lock.lock().await;
        let committed = self.inner.state.load().sequence;
        if committed > sequence {
            tracing::debug!(committed, pop = sequence, "Newer navigation owns history position");
            return;
        }
        if let Err(e) = self.inner.history.go(-delta, false).await {
            tracing::warn!(error = %e, delta, "Failed to restore history position after rejected pop");
        } else {
            tracing::debug!(delta = -delta, "History position restored");
        }
    }

    /// Handle every pop event queued so far. Returns how many were handled.
    pub async fn process_pop_events(&self) -> usize {
        let pending: Vec<PopEvent> = {
            let mut slot = self
                .inner
                .pop_events
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.as_mut() {
                Some(rx) => std::iter::from_fn(|| rx.try_recv().ok()).collect(),
                None => Vec::new(),
            }
        };

        let count = pending.len();
        for event in pending {
            if let Err(e) = self.handle_pop(event).await {
                tracing::error!(error = %e, "Pop navigation failed");
            }
        }
        count
    }

    /// Handle pop events until the history adapter goes away.
    ///
    /// Takes ownership of the event queue; `process_pop_events` returns 0
    /// while this runs.
    pub async fn listen(&self) {
        let rx = self
            .inner
            .pop_events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut rx) = rx else {
            tracing::warn!("Pop event listener already running");
            return;
        };

        tracing::info!("Listening for history pop events");
        while let Some(event) = rx.recv().await {
            if let Err(e) = self.handle_pop(event).await {
                tracing::error!(error = %e, "Pop navigation failed");
            }
        }
        tracing::info!("History pop event stream closed");
    }

    /// Claim the next sequence number; every older navigation becomes stale.
    fn next_sequence(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn dispatch(
        &self,
        sequence: u64,
        path: String,
        options: NavigateOptions,
        pop_delta: Option<isize>,
    ) -> NavigationResult<NavigationOutcome> {
        let span = tracing::info_span!(
            "navigation",
            id = %Uuid::new_v4(),
            sequence,
            path = %path,
            replace = options.replace,
            pop = ?pop_delta,
        );

        let started = Instant::now();
        let result = self.run(path, options, sequence).instrument(span).await;
        metrics::record_navigation(&result, started);

        if !self.is_stale(sequence) {
            self.enter(sequence, NavigationPhase::Idle);
        }
        result
    }

    async fn run(
        &self,
        path: String,
        options: NavigateOptions,
        sequence: u64,
    ) -> NavigationResult<NavigationOutcome> {
        let mut target = path;
        let mut redirects = 0usize;

        loop {
            self.enter(sequence, NavigationPhase::Resolving);
            let from = self.current();

            let to = match self.inner.matcher.resolve(&target) {
                Resolution::Matched(route) => Arc::new(route),
                Resolution::NoMatch => match (self.inner.not_found)(&target) {
                    NotFoundAction::Reject => {
                        self.enter(sequence, NavigationPhase::Rejected);
                        tracing::info!(path = %target, "Navigation rejected: not found");
                        return Ok(NavigationOutcome::NotFound { path: target });
                    }
                    NotFoundAction::Redirect(next) => {
                        target = self.follow_redirect(next, &mut redirects)?;
                        continue;
                    }
                },
            };

            if from.as_ref().is_some_and(|f| f.full_path() == to.full_path()) {
                // An older commit may still be writing history; wait it out
                // and compare against what actually landed.
                let _settled = self.inner.commit_lock.lock().await;
                if self.is_stale(sequence) {
                    return Ok(self.superseded(sequence));
                }
                if self.current().is_some_and(|c| c.full_path() == to.full_path()) {
                    tracing::debug!(route = %to.route_id, "Already at target");
                    return Ok(NavigationOutcome::Duplicated(to));
                }
                continue;
            }

            self.enter(sequence, NavigationPhase::Guarding);
            match self.run_guards(from.as_deref(), &to, sequence).await? {
                None => return Ok(self.superseded(sequence)),
                Some(GuardDecision::Allow) => return self.commit(to, options, sequence).await,
                Some(GuardDecision::Deny) => {
                    self.enter(sequence, NavigationPhase::Rejected);
                    tracing::info!(route = %to.route_id, "Navigation rejected by guard");
                    return Ok(NavigationOutcome::Denied {
                        path: to.full_path(),
                    });
                }
                Some(GuardDecision::Redirect(next)) => {
                    target = self.follow_redirect(next, &mut redirects)?;
                }
            }
        }
    }

    /// Run guards in order. `None` means the navigation went stale.
    async fn run_guards(
        &self,
        from: Option<&ResolvedRoute>,
        to: &ResolvedRoute,
        sequence: u64,
    ) -> NavigationResult<Option<GuardDecision>> {
        for (index, guard) in self.inner.guards.iter().enumerate() {
            if self.is_stale(sequence) {
                return Ok(None);
            }
            let decision = guard.decide(from, to).await;
            if self.is_stale(sequence) {
                return Ok(None);
            }

            match decision {
                Ok(GuardDecision::Allow) => continue,
                Ok(decision) => {
                    tracing::debug!(guard = index, decision = ?decision, "Guard short-circuited");
                    return Ok(Some(decision));
                }
                Err(e) => {
                    tracing::warn!(guard = index, error = %e, "Guard failed; navigation aborted");
                    return Err(NavigationError::Guard(e));
                }
            }
        }
        Ok(Some(GuardDecision::Allow))
    }

    fn follow_redirect(&self, next: String, redirects: &mut usize) -> NavigationResult<String> {
        *redirects += 1;
        let limit = self.inner.config.redirect_depth_limit;
        if *redirects > limit {
            tracing::warn!(limit, path = %next, "Redirect limit exceeded");
            return Err(NavigationError::RedirectLoop { limit, path: next });
        }
        metrics::record_redirect();
        tracing::debug!(to = %next, depth = *redirects, "Redirecting");
        Ok(next)
    }

    async fn commit(
        &self,
        to: Arc<ResolvedRoute>,
        options: NavigateOptions,
        sequence: u64,
    ) -> NavigationResult<NavigationOutcome> {
        let _commit = self.inner.commit_lock.lock().await;
        if self.is_stale(sequence) {
            return Ok(self.superseded(sequence));
        }
        self.enter(sequence, NavigationPhase::Committing);

        let entry = HistoryEntry {
            path: to.full_path(),
            navigation_sequence: sequence,
        };
        let written = if options.replace {
            self.inner.history.replace(entry).await
        } else {
            self.inner.history.push(entry).await
        };
        if let Err(e) = written {
            tracing::error!(error = %e, route = %to.route_id, "History write failed; nothing committed");
            return Err(NavigationError::History(e));
        }

        self.inner.state.store(Arc::new(NavigationState {
            current: Some(to.clone()),
            sequence,
        }));
        tracing::info!(route = %to.route_id, path = %to.full_path(), "Navigation committed");
        self.inner.subscribers.notify(&to);

        Ok(NavigationOutcome::Committed(to))
    }

    fn superseded(&self, sequence: u64) -> NavigationOutcome {
        tracing::info!(latest = self.latest_sequence(), "Navigation superseded");
        NavigationOutcome::Superseded { sequence }
    }

    fn is_stale(&self, sequence: u64) -> bool {
        self.inner.sequence.load(Ordering::SeqCst) != sequence
    }

    fn enter(&self, sequence: u64, phase: NavigationPhase) {
        if self.is_stale(sequence) {
            return;
        }
        self.inner.phase.store(phase as u8, Ordering::SeqCst);
        tracing::debug!(phase = ?phase, "Phase entered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;
    use crate::navigation::guard::guard_fn;
    use crate::routing::RouteDefinition;

    fn table() -> Arc<RouteTable<&'static str>> {
        Arc::new(
            RouteTable::register(vec![
                RouteDefinition::new("TaskList", "/", "TaskList"),
                RouteDefinition::new("UserList", "/users", "UserList"),
                RouteDefinition::new("User", "/users/:id", "UserDetail"),
                RouteDefinition::new("Login", "/login", "Login"),
            ])
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_navigate_commits() {
        let nav = Navigator::builder(table()).build();
        let outcome = nav.push("/users/7").await.unwrap();

        let route = outcome.route().unwrap();
        assert!(outcome.is_committed());
        assert_eq!(route.route_id, "User");
        assert_eq!(route.params["id"], "7");
        assert_eq!(nav.view(route), Some(&"UserDetail"));
        assert_eq!(nav.state().sequence, 1);
        assert_eq!(nav.phase(), NavigationPhase::Idle);
        assert_eq!(nav.history().current().unwrap().path, "/users/7");
    }

    #[tokio::test]
    async fn test_not_found_rejects() {
        let nav = Navigator::builder(table()).build();
        nav.push("/").await.unwrap();

        let outcome = nav.push("/nowhere").await.unwrap();
        assert_eq!(outcome, NavigationOutcome::NotFound { path: "/nowhere".into() });
        assert_eq!(nav.current().unwrap().route_id, "TaskList");
    }

    #[tokio::test]
    async fn test_not_found_redirect() {
        let nav = Navigator::builder(table())
            .not_found(|_| NotFoundAction::Redirect("/".into()))
            .build();
        let outcome = nav.push("/nowhere").await.unwrap();
        assert_eq!(outcome.route().unwrap().route_id, "TaskList");
    }

    #[tokio::test]
    async fn test_guard_redirect_and_deny() {
        let nav = Navigator::builder(table())
            .guard(guard_fn(|_, to| match to.route_id.as_str() {
                "User" => GuardDecision::Redirect("/login".into()),
                "UserList" => GuardDecision::Deny,
                _ => GuardDecision::Allow,
            }))
            .build();

        let outcome = nav.push("/users/1").await.unwrap();
        assert_eq!(outcome.route().unwrap().route_id, "Login");

        let outcome = nav.push("/users").await.unwrap();
        assert_eq!(outcome, NavigationOutcome::Denied { path: "/users".into() });
        assert_eq!(nav.current().unwrap().route_id, "Login");
        assert_eq!(nav.phase(), NavigationPhase::Idle);
    }

    #[tokio::test]
    async fn test_guards_short_circuit_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (c1, c2) = (calls.clone(), calls.clone());
        let nav = Navigator::builder(table())
            .guard(guard_fn(move |_, _| {
                c1.lock().unwrap().push("first");
                GuardDecision::Deny
            }))
            .guard(guard_fn(move |_, _| {
                c2.lock().unwrap().push("second");
                GuardDecision::Allow
            }))
            .build();

        nav.push("/users").await.unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["first"]);
    }

    struct FailingGuard;

    #[async_trait::async_trait]
    impl NavigationGuard for FailingGuard {
        async fn decide(
            &self,
            _from: Option<&ResolvedRoute>,
            _to: &ResolvedRoute,
        ) -> Result<GuardDecision, GuardError> {
            Err(GuardError::new("session lookup failed"))
        }
    }

    #[tokio::test]
    async fn test_guard_error_leaves_state() {
        let nav = Navigator::builder(table()).guard(FailingGuard).build();
        let err = nav.push("/users").await.unwrap_err();
        assert!(matches!(err, NavigationError::Guard(_)));
        assert!(nav.current().is_none());
        assert_eq!(nav.phase(), NavigationPhase::Idle);
    }
}
