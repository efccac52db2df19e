//! Namespace chains that resolve to remote method paths.
//!
//! # Design
//! A `Namespace` is one segment of a method address. `child` borrows the
//! parent node, so a chain such as
//!
//! ```text
//! api.namespace("Users").child("Profile").invoke("get", args)
//! ```
//!
//! lives exactly as long as the expression that builds it and no node owns
//! another. Every node carries the same `&dyn Dispatcher`, injected once at
//! the `Api` root. Nodes are immutable: the depth limit is only checked when
//! a terminal call resolves its path.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::error::{ApiError, Result};
use crate::types::CallArgs;

/// Maximum number of segments in a resolved path, terminal method included.
pub const MAX_NAMESPACE_DEPTH: usize = 10;

/// Entry point of every namespace chain.
///
/// Holds nothing but the shared dispatcher handle, which stays owned by the
/// caller.
#[derive(Clone, Copy)]
pub struct Api<'d> {
    dispatcher: &'d dyn Dispatcher,
}

impl<'d> Api<'d> {
    pub fn new(dispatcher: &'d dyn Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Start a chain at the top-level namespace `name`.
    pub fn namespace(&self, name: impl Into<String>) -> Namespace<'d> {
        Namespace {
            name: name.into(),
            parent: None,
            dispatcher: self.dispatcher,
        }
    }

    /// Call the top-level method `/name`.
    pub fn invoke(&self, name: &str, args: impl Into<CallArgs>) -> Result<Value> {
        let (payload, kind) = args.into().into_call()?;
        validate_segment(name)?;
        let path = format!("/{name}");
        debug!(%path, %kind, "invoking remote method");
        self.dispatcher.call_method(&path, payload, kind)
    }

    pub fn set_property(&self, name: &str, _value: Value) -> Result<()> {
        Err(ApiError::InvalidAction {
            name: name.to_string(),
        })
    }

    /// Every name is a valid namespace, so this is always `true`.
    pub fn has_property(&self, _name: &str) -> bool {
        true
    }
}

impl fmt::Debug for Api<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}

/// One segment of a remote method path.
#[derive(Clone)]
pub struct Namespace<'a> {
    name: String,
    parent: Option<&'a Namespace<'a>>,
    dispatcher: &'a dyn Dispatcher,
}

impl<'a> Namespace<'a> {
    /// A root node (no parent) bound to `dispatcher`.
    pub fn new(name: impl Into<String>, dispatcher: &'a dyn Dispatcher) -> Self {
        Self {
            name: name.into(),
            parent: None,
            dispatcher,
        }
    }

    /// A new node one level below `self`. Never fails, whatever the depth.
    pub fn child(&self, name: impl Into<String>) -> Namespace<'_> {
        Namespace {
            name: name.into(),
            parent: Some(self),
            dispatcher: self.dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Namespace<'a>> {
        self.parent
    }

    /// Number of nodes from the root down to `self`, both included.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// `self` followed by each ancestor, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Namespace<'a>> {
        std::iter::successors(Some(self), |node| node.parent)
    }

    /// The `/root/.../self` prefix of this node, without the depth check.
    pub fn path(&self) -> String {
        let mut segments: Vec<&str> = self.ancestors().map(Namespace::name).collect();
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Nodes are read-only views over a path; assignment always fails.
    pub fn set_property(&self, name: &str, _value: Value) -> Result<()> {
        Err(ApiError::InvalidAction {
            name: name.to_string(),
        })
    }

    /// Always `true`: any name is accepted as a child namespace, so this
    /// says nothing about whether the remote method exists.
    pub fn has_property(&self, _name: &str) -> bool {
        true
    }

    /// Full path of the terminal method `name` called on this node.
    ///
    /// Fails with `NamespaceDepthExceeded` as soon as the walk up the parent
    /// links passes `MAX_NAMESPACE_DEPTH` segments, and with `InvalidSegment`
    /// for an empty name or one containing `/`.
    pub fn resolve_path(&self, name: &str) -> Result<String> {
        validate_segment(name)?;
        validate_segment(&self.name)?;
        let mut segments = vec![name, self.name.as_str()];
        let mut depth = 2;
        let mut current = self.parent;
        while let Some(node) = current {
            depth += 1;
            if depth > MAX_NAMESPACE_DEPTH {
                return Err(ApiError::NamespaceDepthExceeded {
                    depth,
                    max: MAX_NAMESPACE_DEPTH,
                });
            }
            validate_segment(&node.name)?;
            segments.push(node.name.as_str());
            current = node.parent;
        }
        segments.reverse();
        Ok(format!("/{}", segments.join("/")))
    }

    /// Call the remote method `name` below this namespace.
    ///
    /// `method_type` picks the request kind (GET by default) and is never
    /// forwarded. The dispatcher result and errors are returned unchanged.
    pub fn invoke(&self, name: &str, args: impl Into<CallArgs>) -> Result<Value> {
        let (payload, kind) = args.into().into_call()?;
        let path = self.resolve_path(name)?;
        debug!(%path, %kind, "invoking remote method");
        self.dispatcher.call_method(&path, payload, kind)
    }
}

/// A segment must be a non-empty label. `/` would add segments the depth
/// check never saw and dot segments would remove them.
fn validate_segment(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "segment is empty"
    } else if name.contains('/') {
        "segment contains `/`"
    } else if name == "." || name == ".." {
        "dot segments are not allowed"
    } else {
        return Ok(());
    };
    Err(ApiError::InvalidSegment {
        segment: name.to_string(),
        reason,
    })
}

impl fmt::Display for Namespace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl fmt::Debug for Namespace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}
