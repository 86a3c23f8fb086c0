// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciler's command stream.
//!
//! [`Command`] mirrors the tree-edit vocabulary a reconciler emits. Commands
//! can be applied one at a time with [`NodeTree::apply`] or in order with
//! [`NodeTree::apply_all`], which stops at the first failure. Every command
//! reports to a [`Tracer`].

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::TreeError;
use crate::node::NodeId;
use crate::props::PropBatch;
use crate::trace::{
    ChildAttachedEvent, ChildRemovedEvent, CommandRejectedEvent, NodeDisposedEvent,
    NodeReleasedEvent, PropsAppliedEvent, RootChangedEvent, Tracer,
};
use crate::tree::NodeTree;

/// One tree-edit command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Create and initialize a node of type `tag`.
    Create {
        /// Registered type tag.
        tag: String,
        /// Initial properties.
        props: PropBatch,
    },
    /// Merge a property batch into a node.
    SetProperties {
        /// The node.
        id: NodeId,
        /// The batch.
        props: PropBatch,
    },
    /// Append a child.
    AddChild {
        /// The parent.
        parent: NodeId,
        /// The child.
        child: NodeId,
    },
    /// Insert a child before a sibling.
    InsertChildBefore {
        /// The parent.
        parent: NodeId,
        /// The child.
        child: NodeId,
        /// The sibling to insert before.
        before: NodeId,
    },
    /// Remove and dispose a child.
    RemoveChild {
        /// The parent.
        parent: NodeId,
        /// The child.
        child: NodeId,
    },
    /// Dispose a node.
    Dispose(NodeId),
    /// Release a disposed, detached node.
    Release(NodeId),
    /// Designate a root.
    AddRoot(NodeId),
    /// Remove and dispose a root.
    RemoveRoot(NodeId),
}

/// The discriminant of a [`Command`], for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// [`Command::Create`].
    Create,
    /// [`Command::SetProperties`].
    SetProperties,
    /// [`Command::AddChild`].
    AddChild,
    /// [`Command::InsertChildBefore`].
    InsertChildBefore,
    /// [`Command::RemoveChild`].
    RemoveChild,
    /// [`Command::Dispose`].
    Dispose,
    /// [`Command::Release`].
    Release,
    /// [`Command::AddRoot`].
    AddRoot,
    /// [`Command::RemoveRoot`].
    RemoveRoot,
}

impl Command {
    /// Returns the command's kind.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Create { .. } => CommandKind::Create,
            Self::SetProperties { .. } => CommandKind::SetProperties,
            Self::AddChild { .. } => CommandKind::AddChild,
            Self::InsertChildBefore { .. } => CommandKind::InsertChildBefore,
            Self::RemoveChild { .. } => CommandKind::RemoveChild,
            Self::Dispose(_) => CommandKind::Dispose,
            Self::Release(_) => CommandKind::Release,
            Self::AddRoot(_) => CommandKind::AddRoot,
            Self::RemoveRoot(_) => CommandKind::RemoveRoot,
        }
    }
}

/// The outcome of a successful command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// A node was created.
    Created(NodeId),
    /// The command took effect.
    Done,
}

impl Applied {
    /// Returns the created node, if any.
    #[must_use]
    pub fn created(self) -> Option<NodeId> {
        match self {
            Self::Created(id) => Some(id),
            Self::Done => None,
        }
    }
}

/// A command batch stopped at a failing command.
///
/// Commands before `index` have been applied; commands after it have not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchError {
    /// Position of the failing command.
    pub index: usize,
    /// Why it failed.
    pub error: TreeError,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command {} failed: {}", self.index, self.error)
    }
}

impl core::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl NodeTree {
    /// Applies one command.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation and traces a
    /// [`CommandRejectedEvent`]. Existing nodes are left as they were; a
    /// rejected [`Command::Create`] disposes and releases the node it
    /// allocated (see [`NodeTree::create`]).
    pub fn apply(&mut self, cmd: Command, tracer: &mut Tracer<'_>) -> Result<Applied, TreeError> {
        let kind = cmd.kind();
        let result = self.apply_inner(cmd, tracer);
        if let Err(error) = &result {
            tracer.command_rejected(&CommandRejectedEvent {
                command: kind,
                error: error.clone(),
            });
        }
        result
    }

    /// Applies commands in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns a [`BatchError`] naming the failing command.
    pub fn apply_all(
        &mut self,
        cmds: impl IntoIterator<Item = Command>,
        tracer: &mut Tracer<'_>,
    ) -> Result<Vec<Applied>, BatchError> {
        let mut applied = Vec::new();
        for (index, cmd) in cmds.into_iter().enumerate() {
            match self.apply(cmd, tracer) {
                Ok(a) => applied.push(a),
                Err(error) => return Err(BatchError { index, error }),
            }
        }
        Ok(applied)
    }

    fn apply_inner(&mut self, cmd: Command, tracer: &mut Tracer<'_>) -> Result<Applied, TreeError> {
        match cmd {
            Command::Create { tag, props } => {
                return self.create_traced(&tag, &props, tracer).map(Applied::Created);
            }
            Command::SetProperties { id, props } => {
                let changed = self.set_properties(id, &props)?;
                tracer.props_applied(&PropsAppliedEvent {
                    id,
                    batch_len: props.len(),
                    changed,
                });
            }
            Command::AddChild { parent, child } => {
                self.add_child(parent, child)?;
                tracer.child_attached(&ChildAttachedEvent {
                    parent,
                    child,
                    before: None,
                });
            }
            Command::InsertChildBefore {
                parent,
                child,
                before,
            } => {
                self.insert_child_before(parent, child, before)?;
                tracer.child_attached(&ChildAttachedEvent {
                    parent,
                    child,
                    before: Some(before),
                });
            }
            Command::RemoveChild { parent, child } => {
                self.remove_child(parent, child)?;
                tracer.child_removed(&ChildRemovedEvent { parent, child });
            }
            Command::Dispose(id) => {
                let first = self.dispose(id);
                tracer.node_disposed(&NodeDisposedEvent { id, first });
            }
            Command::Release(id) => {
                self.release(id)?;
                tracer.node_released(&NodeReleasedEvent { id });
            }
            Command::AddRoot(id) => {
                self.add_root(id)?;
                tracer.root_changed(&RootChangedEvent { id, added: true });
            }
            Command::RemoveRoot(id) => {
                self.remove_root(id)?;
                tracer.root_changed(&RootChangedEvent { id, added: false });
            }
        }
        Ok(Applied::Done)
    }
}
