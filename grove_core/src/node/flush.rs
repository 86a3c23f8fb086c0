// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change collection for the rendering consumer.
//!
//! A flush drains both dirty channels and the lifecycle lists accumulated
//! since the previous flush:
//!
//! 1. **Traversal**: if the topology changed, rebuild the depth-first
//!    pre-order over the designated roots.
//! 2. **PROPS**: nodes whose materialized properties changed.
//! 3. **TOPOLOGY**: parents whose children list changed.
//! 4. **Lifecycle**: nodes created, disposed and released.
//!
//! [`TreeChanges`] uses raw slot indices (`u32`) rather than [`NodeId`]
//! handles so that consumers can index directly through the `*_at()`
//! accessors (e.g. [`props_at`](super::NodeStore::props_at)). A slot listed
//! in `released` may already have been reused by a node listed in `created`.
//!
//! [`NodeId`]: super::NodeId

use alloc::vec::Vec;

use super::id::NodeState;
use super::store::NodeStore;
use crate::dirty;

/// The set of changes produced by a single [`NodeStore::flush`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeChanges {
    /// Nodes whose materialized properties changed.
    pub props: Vec<u32>,
    /// Nodes whose children list changed.
    pub topology: Vec<u32>,
    /// Nodes created since the last flush.
    pub created: Vec<u32>,
    /// Nodes disposed since the last flush.
    pub disposed: Vec<u32>,
    /// Slots released since the last flush.
    pub released: Vec<u32>,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

impl TreeChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.props.clear();
        self.topology.clear();
        self.created.clear();
        self.disposed.clear();
        self.released.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
            && self.topology.is_empty()
            && self.created.is_empty()
            && self.disposed.is_empty()
            && self.released.is_empty()
            && !self.topology_changed
    }
}

impl NodeStore {
    /// Collects every change since the previous flush.
    pub fn flush(&mut self) -> TreeChanges {
        let mut changes = TreeChanges::default();
        self.flush_into(&mut changes);
        changes
    }

    /// Like [`flush`](Self::flush), but reuses a caller-provided buffer.
    pub fn flush_into(&mut self, changes: &mut TreeChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        changes.props = self
            .dirty
            .drain(dirty::PROPS)
            .deterministic()
            .run()
            .collect();
        changes.topology = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_created, &mut changes.created);
        core::mem::swap(&mut self.pending_disposed, &mut changes.disposed);
        core::mem::swap(&mut self.pending_released, &mut changes.released);
    }

    /// Returns the depth-first pre-order of the visible tree (every node
    /// reachable from a designated root, roots in insertion order).
    ///
    /// Only current as of the last [`flush`](Self::flush).
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        let mut order = core::mem::take(&mut self.traversal_order);
        order.clear();
        for &root in &self.roots {
            if self.state[root as usize] != NodeState::Free {
                self.collect_preorder(root, &mut order);
            }
        }
        self.traversal_order = order;
    }
}
