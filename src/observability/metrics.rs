//! Navigation metrics.
//!
//! # Metrics
//! - `router_navigations_total` (counter): navigations by outcome
//! - `router_navigation_duration_seconds` (histogram): time from request to outcome
//! - `router_redirects_total` (counter): redirects followed
//! - `router_pop_events_total` (counter): back/forward traversals handled
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host installs a recorder
//! - Without a recorder every call is a no-op

use std::time::Instant;

use crate::error::{NavigationError, NavigationResult};
use crate::navigation::NavigationOutcome;

/// Record the result of a navigation.
pub fn record_navigation(result: &NavigationResult<NavigationOutcome>, started: Instant) {
    let outcome = match result {
        Ok(outcome) => outcome.label(),
        Err(NavigationError::RedirectLoop { .. }) => "redirect_loop",
        Err(NavigationError::Guard(_)) => "guard_error",
        Err(NavigationError::History(_)) => "history_error",
    };

    metrics::counter!("router_navigations_total", "outcome" => outcome).increment(1);
    metrics::histogram!("router_navigation_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

/// Record a followed redirect.
pub fn record_redirect() {
    metrics::counter!("router_redirects_total").increment(1);
}

/// Record a handled pop event.
pub fn record_pop_event() {
    metrics::counter!("router_pop_events_total").increment(1);
}
