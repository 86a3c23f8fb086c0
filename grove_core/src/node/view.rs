// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only node views for rendering consumers.

use kurbo::Rect;

use super::id::{INVALID, NodeId};
use super::store::NodeStore;
use super::traverse::Children;
use crate::kind::{NodeKind, TypeTag};
use crate::props::{PropValue, PropsContainer};

/// A borrowed, read-only view of one node.
#[derive(Clone, Copy, Debug)]
pub struct NodeView<'a> {
    store: &'a NodeStore,
    id: NodeId,
}

impl<'a> NodeView<'a> {
    /// Returns the node's handle.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's type tag.
    #[must_use]
    pub fn type_tag(&self) -> &'a TypeTag {
        &self.store.type_tag[self.id.idx as usize]
    }

    /// Returns the properties container, if the node has received a batch.
    #[must_use]
    pub fn props(&self) -> Option<&'a PropsContainer> {
        self.store.props[self.id.idx as usize].as_ref()
    }

    /// Returns the value of one property, schema defaults included.
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&'a PropValue> {
        self.props().and_then(|p| p.get(name))
    }

    /// Returns the node's kind.
    #[must_use]
    pub fn kind(&self) -> &'a dyn NodeKind {
        &*self.store.kind[self.id.idx as usize]
    }

    /// Returns the local bounds reported by the kind.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.kind().bounds()
    }

    /// Returns the parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<NodeView<'a>> {
        let p = self.store.parent[self.id.idx as usize];
        (p != INVALID).then(|| NodeView {
            store: self.store,
            id: self.store.id_at_unchecked(p),
        })
    }

    /// Iterates over the children, in order.
    #[must_use]
    pub fn children(&self) -> Children<'a> {
        Children::new(self.store, self.store.first_child[self.id.idx as usize])
    }

    /// Returns whether the node has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.store.is_disposed(self.id)
    }
}

impl NodeStore {
    /// Returns a read-only view of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn view(&self, id: NodeId) -> NodeView<'_> {
        self.validate(id);
        NodeView { store: self, id }
    }

    /// Visits the visible tree depth-first, pre-order, starting from each
    /// designated root in turn. `f` receives each node and its depth (roots
    /// are at depth 0).
    ///
    /// Unlike [`traversal_order`](Self::traversal_order), this always reflects
    /// the current topology.
    pub fn walk(&self, mut f: impl FnMut(NodeView<'_>, usize)) {
        let mut stack: alloc::vec::Vec<(u32, usize)> = self
            .roots
            .iter()
            .rev()
            .map(|&idx| (idx, 0))
            .collect();
        while let Some((idx, depth)) = stack.pop() {
            f(
                NodeView {
                    store: self,
                    id: self.id_at_unchecked(idx),
                },
                depth,
            );
            // Push children last-to-first so the first child pops next.
            let mut child = self.first_child[idx as usize];
            let mark = stack.len();
            while child != INVALID {
                stack.push((child, depth + 1));
                child = self.next_sibling[child as usize];
            }
            stack[mark..].reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::props::PropBatch;

    #[derive(Debug)]
    struct Plain;

    impl NodeKind for Plain {}

    fn plain(store: &mut NodeStore, tag: &str) -> NodeId {
        store.create_node(TypeTag::new(tag), Box::new(Plain))
    }

    #[test]
    fn view_exposes_node_data() {
        let mut store = NodeStore::new();
        let parent = plain(&mut store, "Group");
        let child = plain(&mut store, "Circle");
        store.add_child(parent, child).unwrap();
        store
            .set_properties(child, &PropBatch::new().with("r", 4.0))
            .unwrap();

        let view = store.view(child);
        assert_eq!(view.type_tag().as_str(), "Circle");
        assert_eq!(view.prop("r"), Some(&PropValue::Number(4.0)));
        assert_eq!(view.parent().map(|p| p.id()), Some(parent));
        assert!(view.bounds().is_none());
        assert!(!view.is_disposed());

        let kids: Vec<_> = store.view(parent).children().collect();
        assert_eq!(kids, vec![child]);
    }

    #[test]
    fn walk_reports_depths_in_preorder() {
        let mut store = NodeStore::new();
        let a = plain(&mut store, "A");
        let b = plain(&mut store, "B");
        let c = plain(&mut store, "C");
        let d = plain(&mut store, "D");
        let e = plain(&mut store, "E");
        store.add_child(a, b).unwrap();
        store.add_child(b, c).unwrap();
        store.add_child(a, d).unwrap();
        store.add_root(a).unwrap();
        store.add_root(e).unwrap();

        let mut seen = Vec::new();
        store.walk(|view, depth| seen.push((view.id(), depth)));
        assert_eq!(seen, vec![(a, 0), (b, 1), (c, 2), (d, 1), (e, 0)]);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn view_of_released_node_panics() {
        let mut store = NodeStore::new();
        let id = plain(&mut store, "A");
        store.teardown();
        let _ = store.view(id);
    }
}
