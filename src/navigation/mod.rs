//! Navigation subsystem.
//!
//! # Data Flow
//! ```text
//! navigate(path) / history pop event
//!     → controller.rs (sequence number, span)
//!     → PathMatcher::resolve → NoMatch → not-found handler
//!     → guard.rs (ordered guards: allow | redirect | deny)
//!     → commit: HistoryAdapter write → NavigationState swap
//!     → subscribers.rs (committed route, in commit order)
//! ```

pub mod controller;
pub mod guard;
pub mod state;
pub mod subscribers;

pub use controller::{Navigator, NavigatorBuilder};
pub use guard::{guard_fn, BoxedGuard, GuardDecision, NavigationGuard, NotFoundAction, NotFoundHandler};
pub use state::{NavigateOptions, NavigationOutcome, NavigationPhase, NavigationState};
pub use subscribers::{SubscriberRegistry, Subscription};
