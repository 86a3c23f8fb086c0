// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node tree data model.
//!
//! A *node* is one element of the retained tree. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is released, so use-after-release is caught at the API level.
//! - Topology: parent, first-child and sibling links forming an ordered tree.
//!   Child order is significant.
//! - A type tag and a [`NodeKind`](crate::kind::NodeKind) supplying the
//!   type-specific behavior.
//! - A lazily created [`PropsContainer`](crate::props::PropsContainer).
//! - An optional [`DisposeCallback`] that runs exactly once.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//!
//! # Lifecycle
//!
//! `Live → Disposed → released`. Disposal runs the callback and is
//! idempotent; disposed nodes reject further commands. Release reclaims the
//! slot and makes the handle stale.
//!
//! # Dirty tracking
//!
//! Property batches mark the **PROPS** channel on the node; structural edits
//! mark **TOPOLOGY** on the parent (see [`dirty`](crate::dirty)).
//! [`NodeStore::flush`] drains both into [`TreeChanges`].

mod dispose;
mod flush;
mod id;
mod store;
mod traverse;
mod view;

pub use dispose::DisposeCallback;
pub use flush::TreeChanges;
pub use id::{INVALID, NodeId, NodeState};
pub use store::NodeStore;
pub use traverse::Children;
pub use view::NodeView;
