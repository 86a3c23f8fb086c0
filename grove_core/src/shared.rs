// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tree shared between a reconciler thread and render threads.
//!
//! [`SharedTree`] puts a [`NodeTree`] behind an `Arc<RwLock<_>>`. A whole
//! command batch runs under one write lock and a whole render pass under one
//! read lock, so readers never observe a partially applied batch.
//!
//! A panic inside a locked section poisons the lock; later calls recover the
//! guard and continue, since every tree operation leaves the store
//! consistent on return.

use std::sync::{Arc, PoisonError, RwLock};
use std::vec::Vec;

use crate::command::{Applied, BatchError, Command};
use crate::snapshot::TreeSnapshot;
use crate::trace::Tracer;
use crate::tree::NodeTree;

/// A cloneable handle to a lock-protected [`NodeTree`].
#[derive(Clone, Debug)]
pub struct SharedTree {
    inner: Arc<RwLock<NodeTree>>,
}

impl SharedTree {
    /// Wraps `tree`.
    #[must_use]
    pub fn new(tree: NodeTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Runs `f` with exclusive access to the tree.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut NodeTree) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Runs `f` with shared access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&NodeTree) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Applies a command batch under a single write lock.
    ///
    /// # Errors
    ///
    /// See [`NodeTree::apply_all`].
    pub fn apply_all(
        &self,
        cmds: impl IntoIterator<Item = Command>,
    ) -> Result<Vec<Applied>, BatchError> {
        self.mutate(|tree| tree.apply_all(cmds, &mut Tracer::none()))
    }

    /// Takes a snapshot under a read lock.
    #[must_use]
    pub fn snapshot(&self) -> TreeSnapshot {
        self.read(NodeTree::snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::thread;
    use std::vec;

    use super::*;
    use crate::node::{DisposeCallback, NodeId};
    use crate::props::PropBatch;
    use crate::registry::NodeRegistry;

    fn is_send_sync<T: Send + Sync>() {}

    #[test]
    fn tree_crosses_threads() {
        is_send_sync::<NodeTree>();
        is_send_sync::<SharedTree>();
    }

    #[test]
    fn readers_never_see_half_batches() {
        let shared = SharedTree::new(NodeTree::new(NodeRegistry::with_builtin_kinds()));
        let root: NodeId = shared.mutate(|tree| {
            let root = tree.create("Group", &PropBatch::new()).unwrap();
            tree.add_root(root).unwrap();
            root
        });

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    shared.mutate(|tree| {
                        // Each batch adds a pair of children.
                        for _ in 0..2 {
                            let c = tree.create("Circle", &PropBatch::new()).unwrap();
                            tree.add_child(root, c).unwrap();
                        }
                    });
                }
            })
        };
        let reader = {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let count = shared.read(|tree| tree.children(root).len());
                    assert_eq!(count % 2, 0, "observed a half-applied batch");
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();

        assert_eq!(shared.snapshot().node_count(), 401);
    }

    #[test]
    fn panicking_callback_leaves_roots_consistent() {
        let shared = SharedTree::new(NodeTree::new(NodeRegistry::with_builtin_kinds()));
        let (first, second) = shared.mutate(|tree| {
            let first = tree.create("Group", &PropBatch::new()).unwrap();
            let second = tree.create("Group", &PropBatch::new()).unwrap();
            tree.add_root(first).unwrap();
            tree.add_root(second).unwrap();
            tree.set_dispose_callback(first, DisposeCallback::new(|| panic!("callback failed")))
                .unwrap();
            (first, second)
        });

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            shared.mutate(NodeTree::teardown);
        }));
        assert!(result.is_err(), "teardown should surface the panic");

        shared.read(|tree| {
            assert_eq!(tree.roots(), vec![first, second]);
            assert!(tree.store().is_root(first));
            assert!(tree.store().is_root(second));
        });

        assert_eq!(shared.mutate(NodeTree::teardown), 1);
        shared.read(|tree| {
            assert!(tree.roots().is_empty());
            assert_eq!(tree.node_count(), 0);
        });
    }

    #[test]
    fn apply_all_through_lock() {
        let shared = SharedTree::new(NodeTree::new(NodeRegistry::with_builtin_kinds()));
        let applied = shared
            .apply_all([Command::Create {
                tag: "Group".into(),
                props: PropBatch::new(),
            }])
            .unwrap();
        let id = applied[0].created().unwrap();
        shared.apply_all([Command::AddRoot(id)]).unwrap();
        assert_eq!(shared.read(NodeTree::roots), vec![id]);
    }
}
