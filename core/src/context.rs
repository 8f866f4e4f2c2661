//! Per-call bookkeeping threaded through recursive validation.

use serde_json::Value;

use crate::error::PathSegment;

/// Path, current value and root value for one point in a validation walk.
///
/// A fresh context is built for every top-level parse. Descending into an
/// object key or array index produces a new context with an appended path;
/// sibling branches never share one.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    /// Segments from the root to the current value.
    pub path: Vec<PathSegment>,
    /// The value being validated at this point (`None` when missing).
    pub data: Option<&'a Value>,
    /// The top-level input of the parse call.
    pub root: Option<&'a Value>,
}

impl<'a> ValidationContext<'a> {
    /// Creates the root context for a parse call.
    pub fn new(path: Vec<PathSegment>, value: Option<&'a Value>) -> Self {
        Self {
            path,
            data: value,
            root: value,
        }
    }

    /// Creates the context for a nested value, keeping the same root.
    pub fn child(&self, segment: impl Into<PathSegment>, data: Option<&'a Value>) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend(self.path.iter().cloned());
        path.push(segment.into());
        Self {
            path,
            data,
            root: self.root,
        }
    }
}

/// Splits a dot-separated path into key segments.
///
/// An empty string yields the root path. Every segment is a key, including
/// numeric ones.
///
/// # Examples
///
/// ```
/// use valguard_core::{PathSegment, split_dotted_path};
///
/// assert!(split_dotted_path("").is_empty());
/// assert_eq!(
///     split_dotted_path("invoice.items"),
///     vec![PathSegment::from("invoice"), PathSegment::from("items")]
/// );
/// ```
pub fn split_dotted_path(path: &str) -> Vec<PathSegment> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.').map(PathSegment::from).collect()
}
