//! Shared fixtures for navigation integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use spa_router::error::{GuardError, HistoryError};
use spa_router::history::{HistoryAdapter, HistoryEntry, MemoryHistory, PopListener};
use spa_router::navigation::{GuardDecision, NavigationGuard, Navigator, Subscription};
use spa_router::routing::{ResolvedRoute, RouteDefinition, RouteTable};

/// The application's two routes plus a few dynamic ones.
pub fn app_table() -> Arc<RouteTable<&'static str>> {
    Arc::new(
        RouteTable::register(vec![
            RouteDefinition::new("TaskList", "/", "TaskList"),
            RouteDefinition::new("UserList", "/users", "UserList"),
            RouteDefinition::new("User", "/users/:id", "UserDetail"),
            RouteDefinition::new("A", "/a", "A"),
            RouteDefinition::new("B", "/b", "B"),
            RouteDefinition::new("Hop", "/r/:n", "Hop"),
        ])
        .unwrap(),
    )
}

/// Collects every committed route.
#[derive(Clone, Default)]
pub struct Recorder {
    routes: Arc<Mutex<Vec<ResolvedRoute>>>,
}

impl Recorder {
    pub fn attach<V>(&self, navigator: &Navigator<V>) -> Subscription {
        let routes = self.routes.clone();
        navigator.subscribe(move |route| routes.lock().unwrap().push(route.clone()))
    }

    pub fn ids(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.route_id.clone())
            .collect()
    }

    pub fn paths(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.full_path())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.lock().unwrap().len()
    }
}

/// Suspends navigations to one path until released.
pub struct GateGuard {
    pub path: &'static str,
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
    pub decision: GuardDecision,
}

impl GateGuard {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            decision: GuardDecision::Allow,
        }
    }
}

#[async_trait]
impl NavigationGuard for GateGuard {
    async fn decide(
        &self,
        _from: Option<&ResolvedRoute>,
        to: &ResolvedRoute,
    ) -> Result<GuardDecision, GuardError> {
        if to.path == self.path {
            self.entered.notify_one();
            self.release.notified().await;
            return Ok(self.decision.clone());
        }
        Ok(GuardDecision::Allow)
    }
}

/// Redirects `/r/<n>` to `/r/<n + 1>` until `n` reaches `stop`.
pub struct HopGuard {
    pub stop: u32,
}

#[async_trait]
impl NavigationGuard for HopGuard {
    async fn decide(
        &self,
        _from: Option<&ResolvedRoute>,
        to: &ResolvedRoute,
    ) -> Result<GuardDecision, GuardError> {
        if to.route_id != "Hop" {
            return Ok(GuardDecision::Allow);
        }
        let n: u32 = to.params["n"]
            .parse()
            .map_err(|e| GuardError::with_source("bad hop", e))?;
        if n < self.stop {
            Ok(GuardDecision::Redirect(format!("/r/{}", n + 1)))
        } else {
            Ok(GuardDecision::Allow)
        }
    }
}

/// Memory history whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyHistory {
    pub inner: MemoryHistory,
    pub failing: AtomicBool,
}

impl FlakyHistory {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), HistoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HistoryError::Write("address bar unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryAdapter for FlakyHistory {
    async fn push(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.check()?;
        self.inner.push(entry).await
    }

    async fn replace(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.check()?;
        self.inner.replace(entry).await
    }

    fn current(&self) -> Option<HistoryEntry> {
        self.inner.current()
    }

    fn on_pop_event(&self, listener: PopListener) {
        self.inner.on_pop_event(listener);
    }

    async fn go(&self, delta: isize, notify: bool) -> Result<(), HistoryError> {
        self.inner.go(delta, notify).await
    }
}

/// Memory history whose write of one path suspends until released.
#[derive(Debug)]
pub struct GatedHistory {
    pub inner: MemoryHistory,
    pub path: &'static str,
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedHistory {
    pub fn new(path: &'static str) -> Self {
        Self {
            inner: MemoryHistory::new(),
            path,
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    async fn gate(&self, entry: &HistoryEntry) {
        if entry.path == self.path {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl HistoryAdapter for GatedHistory {
    async fn push(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.gate(&entry).await;
        self.inner.push(entry).await
    }

    async fn replace(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.gate(&entry).await;
        self.inner.replace(entry).await
    }

    fn current(&self) -> Option<HistoryEntry> {
        self.inner.current()
    }

    fn on_pop_event(&self, listener: PopListener) {
        self.inner.on_pop_event(listener);
    }

    async fn go(&self, delta: isize, notify: bool) -> Result<(), HistoryError> {
        self.inner.go(delta, notify).await
    }
}

/// Fails every navigation to one route id.
pub struct FailOn(pub &'static str);

#[async_trait]
impl NavigationGuard for FailOn {
    async fn decide(
        &self,
        _from: Option<&ResolvedRoute>,
        to: &ResolvedRoute,
    ) -> Result<GuardDecision, GuardError> {
        if to.route_id == self.0 {
            return Err(GuardError::new("permission service unavailable"));
        }
        Ok(GuardDecision::Allow)
    }
}

/// Record `path` in history without navigating, as if it were visited
/// before the navigator started.
pub async fn visited(history: &dyn HistoryAdapter, path: &str) {
    history
        .push(HistoryEntry {
            path: path.to_string(),
            navigation_sequence: 0,
        })
        .await
        .unwrap();
}
