//! Path resolution.
//!
//! # Responsibilities
//! - Normalize a requested path (collapse separators, decode escapes)
//! - Split off and parse the query string
//! - Test compiled routes in registration order
//! - Return the first structural match, or an explicit `NoMatch`
//!
//! # Design Decisions
//! - First match wins; no specificity scoring
//! - Decoding happens per segment, after splitting, so an encoded `/`
//!   never creates a separator
//! - Literal matching is case-sensitive
//! - Trailing slash is ignored unless the matcher is strict

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use url::form_urlencoded;

use crate::routing::table::RouteTable;

/// A path after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedPath {
    /// Decoded, non-empty segments.
    pub segments: Vec<String>,
    /// Whether the original path ended with a separator (never true for `/`).
    pub trailing_slash: bool,
    /// Parsed query parameters (last value wins).
    pub query: BTreeMap<String, String>,
}

impl NormalizedPath {
    /// Canonical, percent-encoded path without query.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(&encode_segment(segment));
        }
        if out.is_empty() || self.trailing_slash {
            out.push('/');
        }
        out
    }
}

/// Normalize a raw path string.
///
/// The fragment is dropped, the query is parsed, duplicate separators are
/// collapsed and each segment is percent-decoded.
pub fn normalize(raw: &str) -> NormalizedPath {
    let without_fragment = raw.split_once('#').map_or(raw, |(path, _)| path);
    let (path, query) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    };

    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(decode_segment)
        .collect();

    let query = query
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    NormalizedPath {
        trailing_slash: !segments.is_empty() && path.ends_with('/'),
        segments,
        query,
    }
}

/// Percent-decode one path segment.
///
/// Malformed escapes are kept as written; decoded bytes that are not valid
/// UTF-8 become U+FFFD without affecting the escapes around them.
pub fn decode_segment(segment: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned()
}

/// Percent-encode one path segment (everything but unreserved characters).
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// A path resolved against the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    /// Id of the matched definition.
    pub route_id: String,
    /// Bound path parameters (decoded).
    pub params: BTreeMap<String, String>,
    /// Canonical path (percent-encoded, no query).
    pub path: String,
    /// Parsed query parameters.
    pub query: BTreeMap<String, String>,
}

impl ResolvedRoute {
    /// Path plus canonical query string; this is what history records.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(ResolvedRoute),
    NoMatch,
}

impl Resolution {
    pub fn matched(self) -> Option<ResolvedRoute> {
        match self {
            Resolution::Matched(route) => Some(route),
            Resolution::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }
}

/// Resolves concrete paths against a frozen route table.
#[derive(Debug)]
pub struct PathMatcher<V> {
    table: Arc<RouteTable<V>>,
    strict: bool,
}

impl<V> Clone for PathMatcher<V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            strict: self.strict,
        }
    }
}

impl<V> PathMatcher<V> {
    /// Create a matcher. `strict` makes trailing slashes significant.
    pub fn new(table: Arc<RouteTable<V>>, strict: bool) -> Self {
        let matcher = Self { table, strict };
        for (winner, shadowed) in matcher.shadowed_routes() {
            tracing::warn!(
                route = %shadowed,
                shadowed_by = %winner,
                "Route differs only by a trailing slash and can never match"
            );
        }
        matcher
    }

    /// Pairs of (earlier, unreachable) route ids that differ only by a
    /// trailing slash. Always empty for a strict matcher.
    pub fn shadowed_routes(&self) -> Vec<(String, String)> {
        if self.strict {
            return Vec::new();
        }
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut shadowed = Vec::new();
        for (definition, compiled) in self.table.compiled() {
            match seen.get(&compiled.loose_shape()) {
                Some(winner) => shadowed.push((winner.to_string(), definition.id().to_string())),
                None => {
                    seen.insert(compiled.loose_shape(), definition.id());
                }
            }
        }
        shadowed
    }

    pub fn table(&self) -> &Arc<RouteTable<V>> {
        &self.table
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Resolve a path; the first route in registration order wins.
    pub fn resolve(&self, path: &str) -> Resolution {
        let normalized = normalize(path);

        for (definition, compiled) in self.table.compiled() {
            if let Some(params) = compiled.match_path(&normalized, self.strict) {
                tracing::trace!(path = %path, route = %definition.id(), "Path resolved");
                return Resolution::Matched(ResolvedRoute {
                    route_id: definition.id().to_string(),
                    params,
                    path: normalized.canonical(),
                    query: normalized.query,
                });
            }
        }

        tracing::trace!(path = %path, "No route matched");
        Resolution::NoMatch
    }

    /// Build the path for a route from parameter values.
    pub fn href(&self, route_id: &str, params: &BTreeMap<String, String>) -> Option<String> {
        self.table.compiled_for(route_id)?.build(params)
    }
}
