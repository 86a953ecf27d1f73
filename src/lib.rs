//! Single-page application router.
//!
//! Path matching, guarded navigation and history synchronization for a
//! route table that maps URL paths to named views.

pub mod config;
pub mod error;
pub mod history;
pub mod navigation;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use error::{NavigationError, RouteTableError};
pub use history::{HistoryAdapter, HistoryEntry, MemoryHistory, UrlHistory};
pub use navigation::{GuardDecision, NavigateOptions, NavigationOutcome, Navigator};
pub use routing::{PathMatcher, ResolvedRoute, RouteDefinition, RouteTable};
