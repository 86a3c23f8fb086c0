// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned snapshots of the visible tree.

use alloc::string::String;
use alloc::vec::Vec;

use crate::kind::TypeTag;
use crate::node::{INVALID, NodeId, NodeStore};
use crate::props::PropValue;
use crate::tree::NodeTree;

/// One node of a [`TreeSnapshot`].
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotNode {
    /// Handle at the time of the snapshot.
    pub id: NodeId,
    /// Type tag.
    pub tag: TypeTag,
    /// Explicitly set properties, in key order.
    pub props: Vec<(String, PropValue)>,
    /// Children, in order.
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    fn leaf(store: &NodeStore, idx: u32) -> Self {
        let props = store.props[idx as usize]
            .as_ref()
            .map(|p| p.iter().map(|(k, v)| (String::from(k), v.clone())).collect())
            .unwrap_or_default();
        Self {
            id: store.id_at_unchecked(idx),
            tag: store.type_tag[idx as usize].clone(),
            props,
            children: Vec::new(),
        }
    }
}

// Dropping a deep chain with the derived glue would recurse once per level.
impl Drop for SnapshotNode {
    fn drop(&mut self) {
        let mut pending = core::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// An owned copy of every node reachable from the designated roots.
///
/// Independent of the tree once taken, so it can outlive a borrow or cross
/// a lock boundary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeSnapshot {
    /// One entry per designated root, in insertion order.
    pub roots: Vec<SnapshotNode>,
}

impl TreeSnapshot {
    /// Returns the total number of nodes in the snapshot.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&SnapshotNode> = self.roots.iter().collect();
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(&node.children);
        }
        count
    }
}

impl NodeStore {
    /// Takes an owned snapshot of the visible tree.
    #[must_use]
    pub fn snapshot(&self) -> TreeSnapshot {
        let mut roots = Vec::with_capacity(self.roots.len());
        // Each frame is a node under construction and its next unvisited
        // child.
        let mut stack: Vec<(SnapshotNode, u32)> = Vec::new();
        for &root in &self.roots {
            stack.push((SnapshotNode::leaf(self, root), self.first_child[root as usize]));
            while let Some((_, next)) = stack.last_mut() {
                let child = *next;
                if child != INVALID {
                    *next = self.next_sibling[child as usize];
                    stack.push((
                        SnapshotNode::leaf(self, child),
                        self.first_child[child as usize],
                    ));
                    continue;
                }
                let Some((done, _)) = stack.pop() else {
                    break;
                };
                match stack.last_mut() {
                    Some((parent, _)) => parent.children.push(done),
                    None => roots.push(done),
                }
            }
        }
        TreeSnapshot { roots }
    }
}

impl NodeTree {
    /// Takes an owned snapshot of the visible tree.
    #[must_use]
    pub fn snapshot(&self) -> TreeSnapshot {
        self.store().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::PropBatch;
    use crate::registry::NodeRegistry;

    #[test]
    fn snapshot_mirrors_visible_tree() {
        let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
        let root = tree.create("Group", &PropBatch::new()).unwrap();
        let circle = tree
            .create("Circle", &PropBatch::new().with("r", 2.0))
            .unwrap();
        let hidden = tree.create("Rect", &PropBatch::new()).unwrap();
        tree.add_child(root, circle).unwrap();
        tree.add_root(root).unwrap();
        let _ = hidden;

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.node_count(), 2);
        let root_node = &snapshot.roots[0];
        assert_eq!(root_node.tag.as_str(), "Group");
        assert!(root_node.props.is_empty());
        assert_eq!(root_node.children[0].id, circle);
        assert_eq!(
            root_node.children[0].props,
            [(String::from("r"), PropValue::Number(2.0))]
        );
    }

    #[test]
    fn snapshot_is_detached() {
        let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
        let root = tree.create("Group", &PropBatch::new()).unwrap();
        tree.add_root(root).unwrap();
        let before = tree.snapshot();
        tree.remove_root(root).unwrap();
        assert_eq!(before.node_count(), 1);
        assert_eq!(tree.snapshot().node_count(), 0);
    }
}
