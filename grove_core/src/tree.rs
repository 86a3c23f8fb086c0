// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree root and dispose coordination.
//!
//! [`NodeTree`] is the object a reconciler talks to. It owns the
//! [`NodeStore`], the [`NodeRegistry`] and a [`Coordinator`], and it
//! designates the roots of the visible tree.
//!
//! ```text
//!   reconciler ──► NodeTree::create ──► NodeRegistry::construct
//!                       │                      │
//!                       │      Coordinator::dispose_callback
//!                       ▼
//!                  NodeStore (props, topology, disposal)
//!                       │
//!                       ▼
//!                  NodeTree::flush ──► TreeChanges ──► TreeConsumer
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::consumer::TreeConsumer;
use crate::error::TreeError;
use crate::kind::TypeTag;
use crate::node::{DisposeCallback, NodeId, NodeState, NodeStore, NodeView, TreeChanges};
use crate::props::{PropBatch, PropsContainer};
use crate::registry::NodeRegistry;
use crate::trace::{FlushEvent, NodeCreatedEvent, TeardownEvent, Tracer};

/// Hands out dispose callbacks for newly created nodes.
///
/// Called exactly once per node, after the node is allocated and before its
/// initial property batch, so the callback is in place before the node can
/// be attached anywhere. This is where cross-cutting services (animation
/// drivers, resource caches) subscribe a node and arrange to unsubscribe it.
pub trait Coordinator: Send + Sync {
    /// Returns the dispose callback for the node, if any.
    fn dispose_callback(&mut self, id: NodeId, tag: &TypeTag) -> Option<DisposeCallback>;
}

impl<F> Coordinator for F
where
    F: FnMut(NodeId, &TypeTag) -> Option<DisposeCallback> + Send + Sync,
{
    fn dispose_callback(&mut self, id: NodeId, tag: &TypeTag) -> Option<DisposeCallback> {
        self(id, tag)
    }
}

/// A [`Coordinator`] that registers no callbacks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCoordinator;

impl Coordinator for NoopCoordinator {
    fn dispose_callback(&mut self, _id: NodeId, _tag: &TypeTag) -> Option<DisposeCallback> {
        None
    }
}

/// Tree construction options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Number of node slots to reserve up front.
    pub initial_capacity: usize,
    /// Whether dropping the tree runs [`NodeTree::teardown`].
    pub dispose_on_drop: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            dispose_on_drop: true,
        }
    }
}

/// The root of a retained node tree.
pub struct NodeTree {
    store: NodeStore,
    registry: NodeRegistry,
    coordinator: Box<dyn Coordinator>,
    config: TreeConfig,
}

impl fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTree")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NodeTree {
    /// Creates a tree over `registry` with no dispose coordination.
    #[must_use]
    pub fn new(registry: NodeRegistry) -> Self {
        Self::with_config(registry, Box::new(NoopCoordinator), TreeConfig::default())
    }

    /// Creates a tree whose nodes get their dispose callbacks from
    /// `coordinator`.
    #[must_use]
    pub fn with_coordinator(registry: NodeRegistry, coordinator: impl Coordinator + 'static) -> Self {
        Self::with_config(registry, Box::new(coordinator), TreeConfig::default())
    }

    /// Creates a tree with explicit options.
    #[must_use]
    pub fn with_config(
        registry: NodeRegistry,
        coordinator: Box<dyn Coordinator>,
        config: TreeConfig,
    ) -> Self {
        Self {
            store: NodeStore::with_capacity(config.initial_capacity),
            registry,
            coordinator,
            config,
        }
    }

    /// Returns the underlying store for read access.
    #[must_use]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Returns the options the tree was built with.
    #[must_use]
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    // -- Creation --

    /// Creates a node of type `tag` and initializes it with `props`.
    ///
    /// The node is returned only after its initial property batch has been
    /// applied. If that batch is rejected, the node is disposed, released and
    /// the error returned.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownType`](crate::error::RegistryError::UnknownType)
    ///   if `tag` is not registered.
    /// - [`SchemaError`](crate::error::SchemaError) if `props` does not fit
    ///   the kind's schema.
    pub fn create(&mut self, tag: &str, props: &PropBatch) -> Result<NodeId, TreeError> {
        self.create_traced(tag, props, &mut Tracer::none())
    }

    pub(crate) fn create_traced(
        &mut self,
        tag: &str,
        props: &PropBatch,
        tracer: &mut Tracer<'_>,
    ) -> Result<NodeId, TreeError> {
        let (tag, kind) = self.registry.construct(tag)?;
        let id = self.store.create_node(tag.clone(), kind);

        let init = match self.coordinator.dispose_callback(id, &tag) {
            Some(callback) => self.store.set_dispose_callback(id, callback),
            None => Ok(()),
        }
        .and_then(|()| self.store.set_properties(id, props));

        if let Err(err) = init {
            self.store.dispose(id);
            // Disposed and never attached, so release cannot fail.
            let _ = self.store.release(id);
            return Err(err);
        }
        tracer.node_created(&NodeCreatedEvent { id, tag });
        Ok(id)
    }

    // -- Node operations --

    /// See [`NodeStore::set_properties`].
    ///
    /// # Errors
    ///
    /// See [`NodeStore::set_properties`].
    pub fn set_properties(&mut self, id: NodeId, props: &PropBatch) -> Result<usize, TreeError> {
        self.store.set_properties(id, props)
    }

    /// See [`NodeStore::add_child`].
    ///
    /// # Errors
    ///
    /// See [`NodeStore::add_child`].
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.store.add_child(parent, child)
    }

    /// See [`NodeStore::insert_child_before`].
    ///
    /// # Errors
    ///
    /// See [`NodeStore::insert_child_before`].
    pub fn insert_child_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), TreeError> {
        self.store.insert_child_before(parent, child, before)
    }

    /// See [`NodeStore::remove_child`].
    ///
    /// # Errors
    ///
    /// See [`NodeStore::remove_child`].
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.store.remove_child(parent, child)
    }

    /// See [`NodeStore::dispose`].
    pub fn dispose(&mut self, id: NodeId) -> bool {
        self.store.dispose(id)
    }

    /// See [`NodeStore::set_dispose_callback`].
    ///
    /// # Errors
    ///
    /// See [`NodeStore::set_dispose_callback`].
    pub fn set_dispose_callback(
        &mut self,
        id: NodeId,
        callback: DisposeCallback,
    ) -> Result<(), TreeError> {
        self.store.set_dispose_callback(id, callback)
    }

    /// See [`NodeStore::release`].
    ///
    /// # Errors
    ///
    /// See [`NodeStore::release`].
    pub fn release(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.store.release(id)
    }

    // -- Roots --

    /// See [`NodeStore::add_root`].
    ///
    /// # Errors
    ///
    /// See [`NodeStore::add_root`].
    pub fn add_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.store.add_root(id)
    }

    /// See [`NodeStore::remove_root`].
    ///
    /// # Errors
    ///
    /// See [`NodeStore::remove_root`].
    pub fn remove_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.store.remove_root(id)
    }

    /// Returns the designated roots in insertion order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.store.roots()
    }

    // -- Reads --

    /// Returns a snapshot of a node's children.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.store.children(id)
    }

    /// Returns a node's parent.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.store.parent(id)
    }

    /// Returns a node's type tag.
    #[must_use]
    pub fn type_tag(&self, id: NodeId) -> &TypeTag {
        self.store.type_tag(id)
    }

    /// Returns a node's properties container.
    #[must_use]
    pub fn props(&self, id: NodeId) -> Option<&PropsContainer> {
        self.store.props(id)
    }

    /// Returns a node's lifecycle state, or `None` for a stale handle.
    #[must_use]
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.store.state(id)
    }

    /// Returns a read-only view of a node.
    #[must_use]
    pub fn view(&self, id: NodeId) -> NodeView<'_> {
        self.store.view(id)
    }

    /// See [`NodeStore::walk`].
    pub fn walk(&self, f: impl FnMut(NodeView<'_>, usize)) {
        self.store.walk(f);
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    // -- Disposal --

    /// See [`NodeStore::dispose_subtree`].
    pub fn dispose_subtree(&mut self, id: NodeId) -> usize {
        self.store.dispose_subtree(id)
    }

    /// Disposes every node exactly once and releases all slots.
    ///
    /// See [`NodeStore::teardown`] for the order.
    pub fn teardown(&mut self) -> usize {
        self.teardown_traced(&mut Tracer::none())
    }

    /// Like [`teardown`](Self::teardown), reporting to `tracer`.
    pub fn teardown_traced(&mut self, tracer: &mut Tracer<'_>) -> usize {
        let disposed = self.store.teardown();
        tracer.teardown(&TeardownEvent { disposed });
        disposed
    }

    // -- Change delivery --

    /// See [`NodeStore::flush`].
    pub fn flush(&mut self) -> TreeChanges {
        self.flush_traced(&mut Tracer::none())
    }

    /// Like [`flush`](Self::flush), reporting counts to `tracer`.
    pub fn flush_traced(&mut self, tracer: &mut Tracer<'_>) -> TreeChanges {
        let changes = self.store.flush();
        tracer.flush(&FlushEvent::from(&changes));
        changes
    }

    /// Flushes and hands the changes to `consumer`, returning them.
    pub fn present(&mut self, consumer: &mut dyn TreeConsumer) -> TreeChanges {
        let changes = self.flush();
        consumer.consume(self, &changes);
        changes
    }
}

impl Drop for NodeTree {
    fn drop(&mut self) {
        if self.config.dispose_on_drop {
            self.store.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::{LifecycleError, RegistryError, SchemaError, StructuralError};
    use crate::props::PropValue;

    /// Counts how many callbacks the tree's coordinator has handed out and
    /// how many of them have fired.
    #[derive(Default)]
    struct Counts {
        wired: AtomicU32,
        fired: AtomicU32,
    }

    fn counting_tree() -> (NodeTree, Arc<Counts>) {
        let counts = Arc::new(Counts::default());
        let c = Arc::clone(&counts);
        let tree = NodeTree::with_coordinator(
            NodeRegistry::with_builtin_kinds(),
            move |_id: NodeId, _tag: &TypeTag| {
                c.wired.fetch_add(1, Ordering::Relaxed);
                let c = Arc::clone(&c);
                Some(DisposeCallback::new(move || {
                    c.fired.fetch_add(1, Ordering::Relaxed);
                }))
            },
        );
        (tree, counts)
    }

    #[test]
    fn circle_props_merge() {
        let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
        let circle = tree
            .create("Circle", &PropBatch::new().with("r", 10.0))
            .unwrap();
        tree.set_properties(circle, &PropBatch::new().with("r", 20.0).with("cx", 5.0))
            .unwrap();

        let props = tree.props(circle).unwrap();
        assert_eq!(props.get("r"), Some(&PropValue::Number(20.0)));
        assert_eq!(props.get("cx"), Some(&PropValue::Number(5.0)));
        assert_eq!(props.len(), 2);
        assert_eq!(
            tree.view(circle).bounds(),
            Some(kurbo::Rect::new(-15.0, -20.0, 25.0, 20.0))
        );
    }

    #[test]
    fn insert_and_remove_scenario() {
        let (mut tree, counts) = counting_tree();
        let empty = PropBatch::new();
        let a = tree.create("Group", &empty).unwrap();
        let b = tree.create("Circle", &empty).unwrap();
        let c = tree.create("Circle", &empty).unwrap();
        let d = tree.create("Rect", &empty).unwrap();
        tree.add_child(a, b).unwrap();
        tree.add_child(a, c).unwrap();

        tree.insert_child_before(a, d, c).unwrap();
        assert_eq!(tree.children(a), vec![b, d, c]);

        tree.remove_child(a, b).unwrap();
        assert_eq!(tree.children(a), vec![d, c]);
        assert_eq!(counts.fired.load(Ordering::Relaxed), 1);
        assert_eq!(tree.state(b), Some(NodeState::Disposed));
    }

    #[test]
    fn coordinator_wires_every_node() {
        let (mut tree, counts) = counting_tree();
        for _ in 0..3 {
            tree.create("Group", &PropBatch::new()).unwrap();
        }
        assert_eq!(counts.wired.load(Ordering::Relaxed), 3);
        assert_eq!(counts.fired.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn failed_create_is_cleaned_up() {
        let (mut tree, counts) = counting_tree();
        let keep = tree.create("Group", &PropBatch::new()).unwrap();
        tree.add_root(keep).unwrap();
        tree.flush();

        let err = tree
            .create("Circle", &PropBatch::new().with("radius", 1.0))
            .unwrap_err();
        assert_eq!(err, SchemaError::UnknownProperty("radius".into()).into());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(counts.fired.load(Ordering::Relaxed), 1);
        assert_eq!(tree.roots(), vec![keep]);
        assert_eq!(tree.state(keep), Some(NodeState::Live));

        // The rejected node's slot shows up as created, disposed and released.
        let changes = tree.flush();
        assert_eq!(changes.created.len(), 1);
        assert_eq!(changes.created, changes.disposed);
        assert_eq!(changes.created, changes.released);

        // The slot is reused under a new generation.
        let next = tree.create("Circle", &PropBatch::new()).unwrap();
        assert_eq!(next.index(), changes.released[0]);
        assert_ne!(next.generation(), 0);
    }

    #[test]
    fn unknown_tag_creates_nothing() {
        let (mut tree, counts) = counting_tree();
        assert_eq!(
            tree.create("Blob", &PropBatch::new()),
            Err(RegistryError::UnknownType("Blob".into()).into())
        );
        assert_eq!(counts.wired.load(Ordering::Relaxed), 0);
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn drop_tears_down() {
        let (mut tree, counts) = counting_tree();
        let root = tree.create("Group", &PropBatch::new()).unwrap();
        let child = tree.create("Circle", &PropBatch::new()).unwrap();
        tree.add_child(root, child).unwrap();
        tree.add_root(root).unwrap();
        tree.create("Line", &PropBatch::new()).unwrap();
        drop(tree);
        assert_eq!(counts.fired.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn drop_can_skip_teardown() {
        let counts = Arc::new(Counts::default());
        let c = Arc::clone(&counts);
        let mut tree = NodeTree::with_config(
            NodeRegistry::with_builtin_kinds(),
            Box::new(move |_id: NodeId, _tag: &TypeTag| {
                let c = Arc::clone(&c);
                Some(DisposeCallback::new(move || {
                    c.fired.fetch_add(1, Ordering::Relaxed);
                }))
            }),
            TreeConfig {
                initial_capacity: 8,
                dispose_on_drop: false,
            },
        );
        tree.create("Group", &PropBatch::new()).unwrap();
        drop(tree);
        assert_eq!(counts.fired.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn teardown_then_reuse() {
        let (mut tree, counts) = counting_tree();
        let a = tree.create("Group", &PropBatch::new()).unwrap();
        tree.add_root(a).unwrap();
        assert_eq!(tree.teardown(), 1);
        assert_eq!(tree.state(a), None);
        assert_eq!(
            tree.add_root(a),
            Err(LifecycleError::StaleHandle(a).into())
        );

        let b = tree.create("Group", &PropBatch::new()).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
        assert_eq!(counts.fired.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn roots_reject_parents() {
        let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
        let a = tree.create("Group", &PropBatch::new()).unwrap();
        let b = tree.create("Group", &PropBatch::new()).unwrap();
        tree.add_child(a, b).unwrap();
        assert_eq!(
            tree.add_root(b),
            Err(StructuralError::AlreadyAttached {
                child: b,
                parent: a
            }
            .into())
        );
    }

    #[test]
    fn present_feeds_consumer() {
        struct Count(usize);
        impl TreeConsumer for Count {
            fn consume(&mut self, tree: &NodeTree, changes: &TreeChanges) {
                self.0 += changes.created.len();
                assert_eq!(tree.roots().len(), 1);
            }
        }

        let mut tree = NodeTree::new(NodeRegistry::with_builtin_kinds());
        let a = tree.create("Group", &PropBatch::new()).unwrap();
        tree.add_root(a).unwrap();
        let mut consumer = Count(0);
        let changes = tree.present(&mut consumer);
        assert_eq!(consumer.0, 1);
        assert!(changes.topology_changed);
    }
}
