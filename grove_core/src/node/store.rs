// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, property and
//! disposal management.

use alloc::boxed::Box;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::dispose::DisposeCallback;
use super::id::{INVALID, NodeId, NodeState};
use super::traverse::Children;
use crate::dirty;
use crate::error::{LifecycleError, StructuralError, TreeError};
use crate::kind::{NodeKind, TypeTag};
use crate::props::{PropBatch, PropsContainer};

/// Placeholder kind held by free slots.
#[derive(Debug)]
struct Vacant;

impl NodeKind for Vacant {}

/// Struct-of-arrays storage for all nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays. Released nodes are recycled via a free list, and
/// generation counters make their old handles stale.
///
/// Children are kept as an ordered sibling list per parent; order is
/// significant (it is the drawing order).
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) is_root: Vec<bool>,
    pub(crate) roots: Vec<u32>,

    // -- Per-node data --
    pub(crate) type_tag: Vec<TypeTag>,
    pub(crate) kind: Vec<Box<dyn NodeKind>>,
    pub(crate) props: Vec<Option<PropsContainer>>,
    pub(crate) dispose_callback: Vec<Option<DisposeCallback>>,
    pub(crate) state: Vec<NodeState>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_created: Vec<u32>,
    pub(crate) pending_disposed: Vec<u32>,
    pub(crate) pending_released: Vec<u32>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty node store with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: Vec::with_capacity(capacity),
            first_child: Vec::with_capacity(capacity),
            next_sibling: Vec::with_capacity(capacity),
            prev_sibling: Vec::with_capacity(capacity),
            is_root: Vec::with_capacity(capacity),
            roots: Vec::new(),
            type_tag: Vec::with_capacity(capacity),
            kind: Vec::with_capacity(capacity),
            props: Vec::with_capacity(capacity),
            dispose_callback: Vec::with_capacity(capacity),
            state: Vec::with_capacity(capacity),
            generation: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_created: Vec::new(),
            pending_disposed: Vec::new(),
            pending_released: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new live node and returns its handle.
    ///
    /// The node starts with no parent, no children, no properties container
    /// and no dispose callback.
    pub fn create_node(&mut self, type_tag: TypeTag, kind: Box<dyn NodeKind>) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. Its generation was bumped on release.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.is_root[i] = false;
            self.type_tag[i] = type_tag;
            self.kind[i] = kind;
            self.props[i] = None;
            self.dispose_callback[i] = None;
            self.state[i] = NodeState::Live;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.is_root.push(false);
            self.type_tag.push(type_tag);
            self.kind.push(kind);
            self.props.push(None);
            self.dispose_callback.push(None);
            self.state.push(NodeState::Live);
            self.generation.push(0);
            idx
        };

        self.pending_created.push(idx);
        self.id_at_unchecked(idx)
    }

    /// Releases a disposed, detached node, freeing its slot for reuse.
    ///
    /// The node's own children are detached and stay live. Afterwards the
    /// handle is stale.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::StaleHandle`] if the handle is stale.
    /// - [`LifecycleError::NotDisposed`] if the node is still live.
    /// - [`StructuralError::AlreadyAttached`] if the node still has a parent.
    /// - [`StructuralError::IsRoot`] if the node is a designated root.
    pub fn release(&mut self, id: NodeId) -> Result<(), TreeError> {
        let idx = self.resolve(id)?;
        let i = idx as usize;
        if self.state[i] == NodeState::Live {
            return Err(LifecycleError::NotDisposed(id).into());
        }
        if self.is_root[i] {
            return Err(StructuralError::IsRoot(id).into());
        }
        if self.parent[i] != INVALID {
            return Err(StructuralError::AlreadyAttached {
                child: id,
                parent: self.id_at_unchecked(self.parent[i]),
            }
            .into());
        }

        while self.first_child[i] != INVALID {
            self.unlink_from_parent(self.first_child[i]);
        }
        self.free_slot(idx);
        Ok(())
    }

    /// Returns whether the handle refers to an occupied slot (live or
    /// disposed).
    #[must_use]
    pub fn is_valid(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.state[id.idx as usize] != NodeState::Free
    }

    /// Returns the lifecycle state of a node, or `None` for a stale handle.
    #[must_use]
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.is_valid(id).then(|| self.state[id.idx as usize])
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Property API --

    /// Merges a property batch into the node's container.
    ///
    /// On the node's first batch the container is created and the kind's
    /// [`define_properties`](NodeKind::define_properties) hook fills in the
    /// schema. After every accepted batch the kind's
    /// [`props_changed`](NodeKind::props_changed) hook runs, and the PROPS
    /// channel is marked if anything changed. Property batches never touch
    /// the children list.
    ///
    /// Returns the number of keys whose materialized value changed.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError`] if the handle is stale or the node disposed.
    /// - [`SchemaError`](crate::error::SchemaError) if the batch does not fit
    ///   the schema; nothing is applied in that case.
    pub fn set_properties(&mut self, id: NodeId, batch: &PropBatch) -> Result<usize, TreeError> {
        let idx = self.resolve_live(id)?;
        let i = idx as usize;

        let container = self.props[i].get_or_insert_with(PropsContainer::new);
        if !container.is_defined() {
            let kind = &self.kind[i];
            container.define_schema(|schema| kind.define_properties(schema))?;
        }
        let changed = container.set_props(batch)?;
        self.kind[i].props_changed(container, &changed);

        if !changed.is_empty() {
            self.dirty.mark(idx, dirty::PROPS);
        }
        Ok(changed.len())
    }

    // -- Topology API --

    /// Appends `child` to the children of `parent`.
    ///
    /// If `child` is already a child of `parent` it moves to the end.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError`] if either handle is stale or either node disposed.
    /// - [`StructuralError::AlreadyAttached`] if `child` has another parent.
    /// - [`StructuralError::IsRoot`] if `child` is a designated root.
    /// - [`StructuralError::WouldCycle`] if `child` is `parent` or one of its
    ///   ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let p = self.resolve_live(parent)?;
        let c = self.resolve_live(child)?;
        self.check_attach(p, c)?;

        if self.parent[c as usize] == p {
            self.unlink_from_parent(c);
        }
        self.link_last(p, c);
        self.mark_topology(p);
        Ok(())
    }

    /// Inserts `child` immediately before `before` in the children of
    /// `parent`.
    ///
    /// If `child` is already a child of `parent` it is moved. Inserting a node
    /// before itself does nothing.
    ///
    /// # Errors
    ///
    /// - [`StructuralError::NotAChild`] if `before` is not a child of
    ///   `parent`; the tree is unchanged.
    /// - Otherwise the same errors as [`add_child`](Self::add_child).
    pub fn insert_child_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), TreeError> {
        let p = self.resolve_live(parent)?;
        let c = self.resolve_live(child)?;
        let b = self.resolve(before)?;
        if self.parent[b as usize] != p {
            return Err(StructuralError::NotAChild {
                parent,
                child: before,
            }
            .into());
        }
        if c == b {
            return Ok(());
        }
        self.check_attach(p, c)?;

        if self.parent[c as usize] == p {
            self.unlink_from_parent(c);
        }
        self.link_before(c, b);
        self.mark_topology(p);
        Ok(())
    }

    /// Removes `child` from the children of `parent` and disposes it.
    ///
    /// Only `child` itself is disposed; its own children stay attached to it.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::StaleHandle`] if either handle is stale.
    /// - [`StructuralError::NotAChild`] if `child` is not a child of
    ///   `parent`. Nothing is disposed in that case.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let p = self.resolve(parent)?;
        let c = self.resolve(child)?;
        if self.parent[c as usize] != p {
            return Err(StructuralError::NotAChild { parent, child }.into());
        }

        self.unlink_from_parent(c);
        self.mark_topology(p);
        self.dispose_slot(c);
        Ok(())
    }

    /// Designates a live, parentless node as a root of the visible tree.
    ///
    /// Adding a node that is already a root does nothing.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError`] if the handle is stale or the node disposed.
    /// - [`StructuralError::AlreadyAttached`] if the node has a parent.
    pub fn add_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        let idx = self.resolve_live(id)?;
        let i = idx as usize;
        if self.parent[i] != INVALID {
            return Err(StructuralError::AlreadyAttached {
                child: id,
                parent: self.id_at_unchecked(self.parent[i]),
            }
            .into());
        }
        if !self.is_root[i] {
            self.is_root[i] = true;
            self.roots.push(idx);
            self.traversal_dirty = true;
        }
        Ok(())
    }

    /// Removes a root and disposes it, like
    /// [`remove_child`](Self::remove_child) does for children.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::StaleHandle`] if the handle is stale.
    /// - [`StructuralError::NotARoot`] if the node is not a root.
    pub fn remove_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        let idx = self.resolve(id)?;
        if !self.is_root[idx as usize] {
            return Err(StructuralError::NotARoot(id).into());
        }
        self.is_root[idx as usize] = false;
        self.roots.retain(|&r| r != idx);
        self.traversal_dirty = true;
        self.dispose_slot(idx);
        Ok(())
    }

    /// Returns the designated roots in the order they were added.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .map(|&idx| self.id_at_unchecked(idx))
            .collect()
    }

    /// Returns whether the node is a designated root.
    #[must_use]
    pub fn is_root(&self, id: NodeId) -> bool {
        self.validate(id);
        self.is_root[id.idx as usize]
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at_unchecked(p))
    }

    /// Returns a snapshot of the children of a node, in order.
    ///
    /// Later mutations do not affect the returned vector.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.iter_children(id).collect()
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn iter_children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the number of direct children of a node.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.iter_children(id).count()
    }

    // -- Per-node getters --

    /// Returns the type tag of a node.
    #[must_use]
    pub fn type_tag(&self, id: NodeId) -> &TypeTag {
        self.validate(id);
        &self.type_tag[id.idx as usize]
    }

    /// Returns the properties container, or `None` before the first batch.
    #[must_use]
    pub fn props(&self, id: NodeId) -> Option<&PropsContainer> {
        self.validate(id);
        self.props[id.idx as usize].as_ref()
    }

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &dyn NodeKind {
        self.validate(id);
        &*self.kind[id.idx as usize]
    }

    /// Returns whether the node has been disposed.
    #[must_use]
    pub fn is_disposed(&self, id: NodeId) -> bool {
        self.validate(id);
        self.state[id.idx as usize] == NodeState::Disposed
    }

    /// Returns whether a dispose callback is registered and has not run.
    #[must_use]
    pub fn has_dispose_callback(&self, id: NodeId) -> bool {
        self.validate(id);
        self.dispose_callback[id.idx as usize].is_some()
    }

    // -- Disposal API --

    /// Registers the node's dispose callback.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError`] if the handle is stale or the node disposed.
    /// - [`LifecycleError::CallbackAlreadySet`] if a callback is already
    ///   registered; the existing callback is kept.
    pub fn set_dispose_callback(
        &mut self,
        id: NodeId,
        callback: DisposeCallback,
    ) -> Result<(), TreeError> {
        let idx = self.resolve_live(id)?;
        let slot = &mut self.dispose_callback[idx as usize];
        if slot.is_some() {
            return Err(LifecycleError::CallbackAlreadySet(id).into());
        }
        *slot = Some(callback);
        Ok(())
    }

    /// Disposes a node: runs its callback once and marks it disposed.
    ///
    /// Idempotent and infallible. Stale handles and already-disposed nodes
    /// are ignored. Children are not disposed.
    ///
    /// Returns whether this call performed the disposal.
    pub fn dispose(&mut self, id: NodeId) -> bool {
        self.is_valid(id) && self.dispose_slot(id.idx)
    }

    /// Disposes a node and all of its descendants, descendants first.
    ///
    /// Returns the number of nodes this call disposed.
    pub fn dispose_subtree(&mut self, id: NodeId) -> usize {
        if !self.is_valid(id) {
            return 0;
        }
        self.dispose_subtree_at(id.idx)
    }

    /// Disposes every live node exactly once and releases every slot.
    ///
    /// Root subtrees go first, then the subtrees of detached nodes in slot
    /// order. Within a subtree, descendants are disposed before their
    /// ancestors. All handles are stale afterwards.
    ///
    /// Returns the number of nodes disposed.
    pub fn teardown(&mut self) -> usize {
        let mut disposed = 0;
        // Dispose callbacks may panic; roots and `is_root` stay in step until
        // every callback has run.
        for pos in 0..self.roots.len() {
            disposed += self.dispose_subtree_at(self.roots[pos]);
        }
        for idx in 0..self.len {
            if self.state[idx as usize] != NodeState::Free && self.parent[idx as usize] == INVALID
            {
                disposed += self.dispose_subtree_at(idx);
            }
        }
        for &idx in &self.roots {
            self.is_root[idx as usize] = false;
        }
        self.roots.clear();

        for idx in 0..self.len {
            let i = idx as usize;
            if self.state[i] == NodeState::Free {
                continue;
            }
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.free_slot(idx);
        }
        disposed
    }

    // -- Raw-index accessors for consumers --
    //
    // These accept raw slot indices (as found in `TreeChanges` or
    // `traversal_order()`) rather than `NodeId` handles.

    /// Returns the current handle for raw slot `idx`, or `None` if the slot
    /// is free or out of range.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> Option<NodeId> {
        (idx < self.len && self.state[idx as usize] != NodeState::Free)
            .then(|| self.id_at_unchecked(idx))
    }

    /// Returns the type tag at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn type_tag_at(&self, idx: u32) -> &TypeTag {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        &self.type_tag[idx as usize]
    }

    /// Returns the properties container at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn props_at(&self, idx: u32) -> Option<&PropsContainer> {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.props[idx as usize].as_ref()
    }

    // -- Internal helpers --

    pub(crate) fn id_at_unchecked(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_valid(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn resolve(&self, id: NodeId) -> Result<u32, LifecycleError> {
        if self.is_valid(id) {
            Ok(id.idx)
        } else {
            Err(LifecycleError::StaleHandle(id))
        }
    }

    fn resolve_live(&self, id: NodeId) -> Result<u32, LifecycleError> {
        let idx = self.resolve(id)?;
        if self.state[idx as usize] == NodeState::Disposed {
            return Err(LifecycleError::Disposed(id));
        }
        Ok(idx)
    }

    /// Checks that `c` may become a child of `p`.
    fn check_attach(&self, p: u32, c: u32) -> Result<(), StructuralError> {
        if self.is_root[c as usize] {
            return Err(StructuralError::IsRoot(self.id_at_unchecked(c)));
        }
        let current = self.parent[c as usize];
        if current != INVALID && current != p {
            return Err(StructuralError::AlreadyAttached {
                child: self.id_at_unchecked(c),
                parent: self.id_at_unchecked(current),
            });
        }
        // `c` must not be `p` or one of its ancestors.
        let mut walk = p;
        while walk != INVALID {
            if walk == c {
                return Err(StructuralError::WouldCycle {
                    parent: self.id_at_unchecked(p),
                    child: self.id_at_unchecked(c),
                });
            }
            walk = self.parent[walk as usize];
        }
        Ok(())
    }

    /// Appends `c` to the sibling list of `p`. `c` must be unlinked.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Links `c` right before its future sibling `s`. `c` must be unlinked.
    fn link_before(&mut self, c: u32, s: u32) {
        let p = self.parent[s as usize];
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `s` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    fn mark_topology(&mut self, p: u32) {
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.traversal_dirty = true;
    }

    /// Transitions a live slot to disposed and runs its callback.
    fn dispose_slot(&mut self, idx: u32) -> bool {
        let i = idx as usize;
        if self.state[i] != NodeState::Live {
            return false;
        }
        self.state[i] = NodeState::Disposed;
        self.pending_disposed.push(idx);
        if let Some(callback) = self.dispose_callback[i].take() {
            callback.run();
        }
        true
    }

    fn dispose_subtree_at(&mut self, idx: u32) -> usize {
        let mut order = Vec::new();
        self.collect_preorder(idx, &mut order);
        // Reversed pre-order visits every descendant before its ancestors.
        order
            .into_iter()
            .rev()
            .filter(|&i| self.dispose_slot(i))
            .count()
    }

    /// Appends the subtree rooted at `idx` to `out` in pre-order.
    ///
    /// Follows the sibling and parent links instead of recursing, so depth
    /// is unbounded.
    pub(crate) fn collect_preorder(&self, idx: u32, out: &mut Vec<u32>) {
        let mut node = idx;
        loop {
            out.push(node);
            let first = self.first_child[node as usize];
            if first != INVALID {
                node = first;
                continue;
            }
            // Climb to the nearest ancestor with a next sibling, stopping at
            // the subtree root.
            loop {
                if node == idx {
                    return;
                }
                let next = self.next_sibling[node as usize];
                if next != INVALID {
                    node = next;
                    break;
                }
                node = self.parent[node as usize];
            }
        }
    }

    /// Frees a detached slot. Topology links must already be cleared.
    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.is_root[i] = false;
        self.kind[i] = Box::new(Vacant);
        self.props[i] = None;
        self.dispose_callback[i] = None;
        self.state[i] = NodeState::Free;

        // Remove dirty tracking for the slot.
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[i] = self.generation[i].wrapping_add(1);

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_released.push(idx);
    }
}
