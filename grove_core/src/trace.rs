// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the command stream.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`NodeTree::apply`](crate::tree::NodeTree::apply) and friends call as
//! commands execute. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).

use crate::command::CommandKind;
use crate::error::TreeError;
use crate::kind::TypeTag;
use crate::node::{NodeId, TreeChanges};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a node has been created and initialized.
#[derive(Clone, Debug)]
pub struct NodeCreatedEvent {
    /// The new node.
    pub id: NodeId,
    /// Its type tag.
    pub tag: TypeTag,
}

/// Emitted after a property batch has been merged.
#[derive(Clone, Copy, Debug)]
pub struct PropsAppliedEvent {
    /// The node.
    pub id: NodeId,
    /// Number of keys in the batch.
    pub batch_len: usize,
    /// Number of keys whose materialized value changed.
    pub changed: usize,
}

/// Emitted after a child was attached or moved.
#[derive(Clone, Copy, Debug)]
pub struct ChildAttachedEvent {
    /// The parent.
    pub parent: NodeId,
    /// The attached child.
    pub child: NodeId,
    /// The sibling it was inserted before, or `None` when appended.
    pub before: Option<NodeId>,
}

/// Emitted after a child was removed (and disposed).
#[derive(Clone, Copy, Debug)]
pub struct ChildRemovedEvent {
    /// The former parent.
    pub parent: NodeId,
    /// The removed child.
    pub child: NodeId,
}

/// Emitted when an explicit dispose command runs.
#[derive(Clone, Copy, Debug)]
pub struct NodeDisposedEvent {
    /// The node.
    pub id: NodeId,
    /// Whether this command performed the disposal (`false` for repeats).
    pub first: bool,
}

/// Emitted after a slot was released.
#[derive(Clone, Copy, Debug)]
pub struct NodeReleasedEvent {
    /// The handle that just became stale.
    pub id: NodeId,
}

/// Emitted when the set of designated roots changes.
#[derive(Clone, Copy, Debug)]
pub struct RootChangedEvent {
    /// The root.
    pub id: NodeId,
    /// `true` if added, `false` if removed.
    pub added: bool,
}

/// Emitted when a command fails.
#[derive(Clone, Debug)]
pub struct CommandRejectedEvent {
    /// Which command failed.
    pub command: CommandKind,
    /// Why.
    pub error: TreeError,
}

/// Per-flush change counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlushEvent {
    /// Nodes whose properties changed.
    pub props: usize,
    /// Parents whose children changed.
    pub topology: usize,
    /// Nodes created.
    pub created: usize,
    /// Nodes disposed.
    pub disposed: usize,
    /// Slots released.
    pub released: usize,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

impl From<&TreeChanges> for FlushEvent {
    fn from(changes: &TreeChanges) -> Self {
        Self {
            props: changes.props.len(),
            topology: changes.topology.len(),
            created: changes.created.len(),
            disposed: changes.disposed.len(),
            released: changes.released.len(),
            topology_changed: changes.topology_changed,
        }
    }
}

/// Emitted after a full teardown.
#[derive(Clone, Copy, Debug)]
pub struct TeardownEvent {
    /// Number of nodes disposed by the teardown.
    pub disposed: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the command stream.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a node is created.
    fn on_node_created(&mut self, e: &NodeCreatedEvent) {
        _ = e;
    }

    /// Called after a property batch is merged.
    fn on_props_applied(&mut self, e: &PropsAppliedEvent) {
        _ = e;
    }

    /// Called after a child is attached or moved.
    fn on_child_attached(&mut self, e: &ChildAttachedEvent) {
        _ = e;
    }

    /// Called after a child is removed.
    fn on_child_removed(&mut self, e: &ChildRemovedEvent) {
        _ = e;
    }

    /// Called when a dispose command runs.
    fn on_node_disposed(&mut self, e: &NodeDisposedEvent) {
        _ = e;
    }

    /// Called after a slot is released.
    fn on_node_released(&mut self, e: &NodeReleasedEvent) {
        _ = e;
    }

    /// Called when a root is added or removed.
    fn on_root_changed(&mut self, e: &RootChangedEvent) {
        _ = e;
    }

    /// Called when a command fails.
    fn on_command_rejected(&mut self, e: &CommandRejectedEvent) {
        _ = e;
    }

    /// Called after a flush.
    fn on_flush(&mut self, e: &FlushEvent) {
        _ = e;
    }

    /// Called after a teardown.
    fn on_teardown(&mut self, e: &TeardownEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Expands to a `Tracer` method that forwards one event to the sink.
macro_rules! emit {
    ($(#[$doc:meta])* $name:ident, $event:ty, $hook:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    emit!(
        /// Emits a [`NodeCreatedEvent`].
        node_created, NodeCreatedEvent, on_node_created
    );
    emit!(
        /// Emits a [`PropsAppliedEvent`].
        props_applied, PropsAppliedEvent, on_props_applied
    );
    emit!(
        /// Emits a [`ChildAttachedEvent`].
        child_attached, ChildAttachedEvent, on_child_attached
    );
    emit!(
        /// Emits a [`ChildRemovedEvent`].
        child_removed, ChildRemovedEvent, on_child_removed
    );
    emit!(
        /// Emits a [`NodeDisposedEvent`].
        node_disposed, NodeDisposedEvent, on_node_disposed
    );
    emit!(
        /// Emits a [`NodeReleasedEvent`].
        node_released, NodeReleasedEvent, on_node_released
    );
    emit!(
        /// Emits a [`RootChangedEvent`].
        root_changed, RootChangedEvent, on_root_changed
    );
    emit!(
        /// Emits a [`CommandRejectedEvent`].
        command_rejected, CommandRejectedEvent, on_command_rejected
    );
    emit!(
        /// Emits a [`FlushEvent`].
        flush, FlushEvent, on_flush
    );
    emit!(
        /// Emits a [`TeardownEvent`].
        teardown, TeardownEvent, on_teardown
    );
}
