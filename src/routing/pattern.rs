//! Route pattern compilation.
//!
//! A pattern such as `/users/:id/files/*rest` compiles into a segment list:
//! literals match exactly, `:name` binds one segment, and a terminal `*name`
//! binds every remaining segment joined by `/`.

use std::collections::{BTreeMap, HashSet};

use crate::error::PatternError;
use crate::routing::matcher::{decode_segment, encode_segment, NormalizedPath};

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this (decoded) text.
    Literal(String),
    /// Matches any single segment and binds it by name.
    Param(String),
    /// Matches one or more trailing segments and binds them by name.
    CatchAll(String),
}

/// Cached, match-ready form of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    segments: Vec<Segment>,
    trailing_slash: bool,
}

impl CompiledRoute {
    /// Compile a pattern string.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolute(pattern.to_string()));
        }

        let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());
        let mut seen = HashSet::new();

        for (index, part) in raw.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if index + 1 != raw.len() {
                    return Err(PatternError::CatchAllNotLast {
                        pattern: pattern.to_string(),
                    });
                }
                Segment::CatchAll(name.to_string())
            } else {
                Segment::Literal(decode_segment(part))
            };

            if let Segment::Param(name) | Segment::CatchAll(name) = &segment {
                if name.is_empty() {
                    return Err(PatternError::EmptyParameter {
                        pattern: pattern.to_string(),
                        index,
                    });
                }
                if !seen.insert(name.clone()) {
                    return Err(PatternError::DuplicateParameter {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            trailing_slash: !segments.is_empty() && pattern.ends_with('/'),
            segments,
        })
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) | Segment::CatchAll(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// The compiled segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the pattern has no parameters.
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Canonical structure with parameter names erased.
    ///
    /// Two patterns with the same shape match exactly the same paths.
    pub fn shape(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(text) => out.push_str(&encode_segment(text)),
                Segment::Param(_) => out.push(':'),
                Segment::CatchAll(_) => out.push('*'),
            }
        }
        if out.is_empty() || self.trailing_slash {
            out.push('/');
        }
        out
    }

    /// Shape with the trailing slash dropped. Routes that share a loose
    /// shape are indistinguishable when trailing slashes are ignored.
    pub fn loose_shape(&self) -> String {
        let shape = self.shape();
        match shape.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
            _ => shape,
        }
    }

    /// Structural match against a normalized path.
    ///
    /// Returns the bound parameters (decoded) on success.
    pub(crate) fn match_path(
        &self,
        path: &NormalizedPath,
        strict: bool,
    ) -> Option<BTreeMap<String, String>> {
        if strict && self.trailing_slash != path.trailing_slash {
            return None;
        }

        let mut params = BTreeMap::new();
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => {
                    if path.segments.get(index)? != text {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), path.segments.get(index)?.clone());
                }
                Segment::CatchAll(name) => {
                    let rest = path.segments.get(index..)?;
                    if rest.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), rest.join("/"));
                    return Some(params);
                }
            }
        }

        (path.segments.len() == self.segments.len()).then_some(params)
    }

    /// Build a concrete path from parameter values.
    ///
    /// Returns `None` when a parameter is missing or empty.
    pub fn build(&self, params: &BTreeMap<String, String>) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    out.push('/');
                    out.push_str(&encode_segment(text));
                }
                Segment::Param(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty())?;
                    out.push('/');
                    out.push_str(&encode_segment(value));
                }
                Segment::CatchAll(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty())?;
                    for part in value.split('/').filter(|p| !p.is_empty()) {
                        out.push('/');
                        out.push_str(&encode_segment(part));
                    }
                }
            }
        }
        if out.is_empty() || self.trailing_slash {
            out.push('/');
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::normalize;

    #[test]
    fn test_compile_segments() {
        let route = CompiledRoute::compile("/users/:id/files/*rest").unwrap();
        assert_eq!(
            route.segments(),
            &[
                Segment::Literal("users".into()),
                Segment::Param("id".into()),
                Segment::Literal("files".into()),
                Segment::CatchAll("rest".into()),
            ]
        );
        assert_eq!(route.param_names(), vec!["id".to_string(), "rest".to_string()]);
        assert!(!route.is_static());
        assert!(CompiledRoute::compile("/users").unwrap().is_static());
    }

    #[test]
    fn test_compile_rejects_malformed() {
        assert_eq!(
            CompiledRoute::compile("users"),
            Err(PatternError::NotAbsolute("users".into()))
        );
        assert!(matches!(
            CompiledRoute::compile("/users/:"),
            Err(PatternError::EmptyParameter { index: 1, .. })
        ));
        assert!(matches!(
            CompiledRoute::compile("/a/:id/b/:id"),
            Err(PatternError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            CompiledRoute::compile("/files/*rest/edit"),
            Err(PatternError::CatchAllNotLast { .. })
        ));
    }

    #[test]
    fn test_shape_erases_names() {
        let a = CompiledRoute::compile("/users/:id").unwrap();
        let b = CompiledRoute::compile("//users/:uid").unwrap();
        let c = CompiledRoute::compile("/users/:id/").unwrap();
        assert_eq!(a.shape(), "/users/:");
        assert_eq!(a.shape(), b.shape());
        assert_ne!(a.shape(), c.shape());
        assert_eq!(CompiledRoute::compile("/").unwrap().shape(), "/");
    }

    #[test]
    fn test_match_params_and_catch_all() {
        let route = CompiledRoute::compile("/docs/*page").unwrap();
        let params = route.match_path(&normalize("/docs/guide/intro"), false).unwrap();
        assert_eq!(params["page"], "guide/intro");
        assert!(route.match_path(&normalize("/docs"), false).is_none());

        let route = CompiledRoute::compile("/users/:id").unwrap();
        assert!(route.match_path(&normalize("/users"), false).is_none());
        assert!(route.match_path(&normalize("/users/1/edit"), false).is_none());
    }

    #[test]
    fn test_trailing_slash_strictness() {
        let route = CompiledRoute::compile("/users").unwrap();
        assert!(route.match_path(&normalize("/users/"), false).is_some());
        assert!(route.match_path(&normalize("/users/"), true).is_none());
        assert!(route.match_path(&normalize("/users"), true).is_some());
    }

    #[test]
    fn test_loose_shape_ignores_trailing_slash() {
        let plain = CompiledRoute::compile("/users/:id").unwrap();
        let slashed = CompiledRoute::compile("/users/:uid/").unwrap();
        assert_ne!(plain.shape(), slashed.shape());
        assert_eq!(plain.loose_shape(), slashed.loose_shape());
        assert_eq!(CompiledRoute::compile("/").unwrap().loose_shape(), "/");
    }

    #[test]
    fn test_build() {
        let route = CompiledRoute::compile("/users/:id").unwrap();
        let mut params = BTreeMap::new();
        assert_eq!(route.build(&params), None);

        params.insert("id".to_string(), "a b".to_string());
        assert_eq!(route.build(&params).as_deref(), Some("/users/a%20b"));
        assert_eq!(
            CompiledRoute::compile("/").unwrap().build(&BTreeMap::new()).as_deref(),
            Some("/")
        );
    }
}
