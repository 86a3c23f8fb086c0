// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for tree commands.
//!
//! Every failing command reports exactly one [`TreeError`]. The variants
//! follow the taxonomy the reconciler cares about:
//!
//! - [`StructuralError`]: a node is not where the command expects it.
//! - [`SchemaError`]: a property batch does not fit the node's schema, or
//!   the schema was defined twice.
//! - [`LifecycleError`]: the handle is stale, the node is disposed, or a
//!   dispose callback is registered twice.
//! - [`RegistryError`]: constructor registration or lookup failed.
//!
//! A failed command leaves the topology, the properties and the lifecycle
//! state of existing nodes as they were. A failed `create` is the one
//! command with side effects: the node it allocated is disposed (running any
//! coordinator callback) and released, so the next flush reports its slot
//! as both created and released. Disposal never fails.

use alloc::string::String;
use core::fmt;

use crate::kind::TypeTag;
use crate::node::NodeId;
use crate::props::PropKind;

/// A node was not found where a structural command expected it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructuralError {
    /// `child` is not currently a child of `parent`.
    NotAChild {
        /// The parent named by the command.
        parent: NodeId,
        /// The node that was expected among its children.
        child: NodeId,
    },
    /// `child` already belongs to a different parent.
    AlreadyAttached {
        /// The node being attached.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },
    /// Attaching `child` under `parent` would make a node its own ancestor.
    WouldCycle {
        /// The prospective parent.
        parent: NodeId,
        /// The node being attached.
        child: NodeId,
    },
    /// The node is a designated root and cannot be attached elsewhere.
    IsRoot(NodeId),
    /// The node is not a designated root.
    NotARoot(NodeId),
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of {parent}")
            }
            Self::AlreadyAttached { child, parent } => {
                write!(f, "node {child} is already attached to {parent}")
            }
            Self::WouldCycle { parent, child } => {
                write!(f, "attaching {child} under {parent} would create a cycle")
            }
            Self::IsRoot(id) => write!(f, "node {id} is a root"),
            Self::NotARoot(id) => write!(f, "node {id} is not a root"),
        }
    }
}

impl core::error::Error for StructuralError {}

/// A property batch or schema definition was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// The container's schema has already been defined.
    AlreadyDefined,
    /// The key is not declared and the schema rejects unknown keys.
    UnknownProperty(String),
    /// The value's kind does not match the declared slot.
    TypeMismatch {
        /// Property name.
        name: String,
        /// Declared kind.
        expected: PropKind,
        /// Kind of the supplied value.
        found: PropKind,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyDefined => f.write_str("property schema is already defined"),
            Self::UnknownProperty(name) => write!(f, "unknown property `{name}`"),
            Self::TypeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "property `{name}` expects {expected:?}, got {found:?}"
            ),
        }
    }
}

impl core::error::Error for SchemaError {}

/// A command was issued against a node in the wrong lifecycle state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleError {
    /// The handle refers to a released slot.
    StaleHandle(NodeId),
    /// The node has been disposed.
    Disposed(NodeId),
    /// The node must be disposed before it can be released.
    NotDisposed(NodeId),
    /// A dispose callback is already registered for the node.
    CallbackAlreadySet(NodeId),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle(id) => write!(f, "stale node handle {id:?}"),
            Self::Disposed(id) => write!(f, "node {id} has been disposed"),
            Self::NotDisposed(id) => write!(f, "node {id} is still live"),
            Self::CallbackAlreadySet(id) => {
                write!(f, "node {id} already has a dispose callback")
            }
        }
    }
}

impl core::error::Error for LifecycleError {}

/// Constructor registration or lookup failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A constructor is already registered for the tag.
    DuplicateType(TypeTag),
    /// No constructor is registered for the tag.
    UnknownType(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateType(tag) => write!(f, "node type `{tag}` is already registered"),
            Self::UnknownType(tag) => write!(f, "unknown node type `{tag}`"),
        }
    }
}

impl core::error::Error for RegistryError {}

/// Any error a tree command can report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// See [`StructuralError`].
    Structural(StructuralError),
    /// See [`SchemaError`].
    Schema(SchemaError),
    /// See [`LifecycleError`].
    Lifecycle(LifecycleError),
    /// See [`RegistryError`].
    Registry(RegistryError),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural(e) => write!(f, "structural error: {e}"),
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::Lifecycle(e) => write!(f, "lifecycle error: {e}"),
            Self::Registry(e) => write!(f, "registry error: {e}"),
        }
    }
}

impl core::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Structural(e) => Some(e),
            Self::Schema(e) => Some(e),
            Self::Lifecycle(e) => Some(e),
            Self::Registry(e) => Some(e),
        }
    }
}

impl From<StructuralError> for TreeError {
    fn from(e: StructuralError) -> Self {
        Self::Structural(e)
    }
}

impl From<SchemaError> for TreeError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

impl From<LifecycleError> for TreeError {
    fn from(e: LifecycleError) -> Self {
        Self::Lifecycle(e)
    }
}

impl From<RegistryError> for TreeError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_names_the_nodes() {
        let parent = NodeId {
            idx: 1,
            generation: 0,
        };
        let child = NodeId {
            idx: 4,
            generation: 2,
        };
        let err = TreeError::from(StructuralError::NotAChild { parent, child });
        assert_eq!(
            err.to_string(),
            "structural error: node #4.2 is not a child of #1.0"
        );
    }

    #[test]
    fn source_exposes_inner_error() {
        use core::error::Error as _;

        let err = TreeError::from(SchemaError::UnknownProperty("fill".into()));
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("unknown property `fill`"));
    }
}
