// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-type node behavior.
//!
//! A node's concrete type is a [`NodeKind`] trait object created by the
//! [`NodeRegistry`](crate::registry::NodeRegistry). The tree never needs to
//! know the concrete type: kinds declare their property schema, re-derive
//! cached state when properties change, and report their bounds to the
//! rendering consumer.

use alloc::string::String;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;

use kurbo::Rect;

use crate::props::{PropertySchema, PropsContainer};

/// The immutable type tag of a node, e.g. `"Circle"`.
///
/// Cheap to clone; all nodes of one type share the registry's allocation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    /// Creates a tag.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(Arc::from(tag))
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({:?})", &*self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Behavior of one node type.
///
/// All methods have defaults: a kind that overrides nothing has an open
/// schema, ignores property changes and has no bounds.
pub trait NodeKind: fmt::Debug + Send + Sync {
    /// Declares the property slots of this kind.
    ///
    /// Called exactly once per node, right before its first property batch
    /// is applied.
    fn define_properties(&self, schema: &mut PropertySchema) {
        _ = schema;
    }

    /// Called after a property batch has been merged into `props`.
    ///
    /// Runs after every accepted batch, including batches that changed
    /// nothing, so kinds can derive their state from schema defaults.
    /// `changed` lists the keys whose materialized value changed.
    fn props_changed(&mut self, props: &PropsContainer, changed: &[String]) {
        _ = (props, changed);
    }

    /// Returns the local bounds of what this node draws, if anything.
    fn bounds(&self) -> Option<Rect> {
        None
    }
}
