// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Model-based checking for grove trees.
//!
//! [`ListModel`] is a deliberately naive simulation of a node tree: one
//! `Vec` of children per node and a parent table. [`Harness`] drives a real
//! [`NodeTree`] and the model with the same [`EditOp`]s and reports the first
//! step where they disagree, whether in the command outcome, any children
//! list, any lifecycle state or any dispose-callback count.
//!
//! Scripts are either written by hand or drawn from a seeded [`XorShift64`],
//! so every failure is reproducible from its seed.

#![no_std]

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use grove_core::error::{LifecycleError, StructuralError, TreeError};
use grove_core::kind::TypeTag;
use grove_core::node::{DisposeCallback, NodeId, NodeState};
use grove_core::props::PropBatch;
use grove_core::registry::NodeRegistry;
use grove_core::tree::NodeTree;

// ---------------------------------------------------------------------------
// Random source
// ---------------------------------------------------------------------------

/// Small deterministic PRNG (xorshift64).
#[derive(Clone, Debug)]
pub struct XorShift64(u64);

impl XorShift64 {
    /// Creates a generator. A zero seed is replaced by a fixed constant.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed })
    }

    /// Returns the next value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Returns a value in `0..n`. `n` must be non-zero.
    pub fn below(&mut self, n: usize) -> usize {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "result is below n, which fits in usize"
        )]
        let v = (self.next_u64() % n as u64) as usize;
        v
    }
}

// ---------------------------------------------------------------------------
// Operations and outcomes
// ---------------------------------------------------------------------------

/// One structural edit, naming nodes by their position in the harness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOp {
    /// `add_child(parent, child)`.
    Add {
        /// Parent label.
        parent: usize,
        /// Child label.
        child: usize,
    },
    /// `insert_child_before(parent, child, before)`.
    Insert {
        /// Parent label.
        parent: usize,
        /// Child label.
        child: usize,
        /// Marker label.
        before: usize,
    },
    /// `remove_child(parent, child)`.
    Remove {
        /// Parent label.
        parent: usize,
        /// Child label.
        child: usize,
    },
    /// `dispose(node)`.
    Dispose(usize),
}

/// Outcome class of an edit, comparable between model and tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The edit took effect.
    Applied,
    /// [`StructuralError::NotAChild`].
    NotAChild,
    /// [`StructuralError::AlreadyAttached`].
    AlreadyAttached,
    /// [`StructuralError::WouldCycle`].
    WouldCycle,
    /// [`LifecycleError::Disposed`].
    Disposed,
    /// Any other error.
    Other,
}

impl Outcome {
    /// Classifies a tree result.
    #[must_use]
    pub fn of(result: &Result<(), TreeError>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(TreeError::Structural(StructuralError::NotAChild { .. })) => Self::NotAChild,
            Err(TreeError::Structural(StructuralError::AlreadyAttached { .. })) => {
                Self::AlreadyAttached
            }
            Err(TreeError::Structural(StructuralError::WouldCycle { .. })) => Self::WouldCycle,
            Err(TreeError::Lifecycle(LifecycleError::Disposed(_))) => Self::Disposed,
            Err(_) => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// ListModel
// ---------------------------------------------------------------------------

/// Reference simulation of tree edits over `n` labeled nodes.
#[derive(Clone, Debug)]
pub struct ListModel {
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    disposed: Vec<bool>,
    dispose_count: Vec<u32>,
}

impl ListModel {
    /// Creates `n` detached, live nodes.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: vec![None; n],
            children: vec![Vec::new(); n],
            disposed: vec![false; n],
            dispose_count: vec![0; n],
        }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns whether the model has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the children of `node`, in order.
    #[must_use]
    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    /// Returns the parent of `node`.
    #[must_use]
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parent[node]
    }

    /// Returns whether `node` has been disposed.
    #[must_use]
    pub fn is_disposed(&self, node: usize) -> bool {
        self.disposed[node]
    }

    /// Returns how many times `node`'s dispose callback should have run.
    #[must_use]
    pub fn dispose_count(&self, node: usize) -> u32 {
        self.dispose_count[node]
    }

    /// Applies `op` and returns the expected outcome.
    pub fn apply(&mut self, op: EditOp) -> Outcome {
        match op {
            EditOp::Add { parent, child } => {
                if self.disposed[parent] || self.disposed[child] {
                    return Outcome::Disposed;
                }
                if let Some(rejected) = self.check_attach(parent, child) {
                    return rejected;
                }
                self.detach(child);
                self.children[parent].push(child);
                self.parent[child] = Some(parent);
                Outcome::Applied
            }
            EditOp::Insert {
                parent,
                child,
                before,
            } => {
                if self.disposed[parent] || self.disposed[child] {
                    return Outcome::Disposed;
                }
                if self.parent[before] != Some(parent) {
                    return Outcome::NotAChild;
                }
                if child == before {
                    return Outcome::Applied;
                }
                if let Some(rejected) = self.check_attach(parent, child) {
                    return rejected;
                }
                self.detach(child);
                let pos = self.children[parent]
                    .iter()
                    .position(|&c| c == before)
                    .unwrap_or(self.children[parent].len());
                self.children[parent].insert(pos, child);
                self.parent[child] = Some(parent);
                Outcome::Applied
            }
            EditOp::Remove { parent, child } => {
                if self.parent[child] != Some(parent) {
                    return Outcome::NotAChild;
                }
                self.detach(child);
                self.dispose(child);
                Outcome::Applied
            }
            EditOp::Dispose(node) => {
                self.dispose(node);
                Outcome::Applied
            }
        }
    }

    fn check_attach(&self, parent: usize, child: usize) -> Option<Outcome> {
        if self.parent[child].is_some_and(|p| p != parent) {
            return Some(Outcome::AlreadyAttached);
        }
        let mut walk = Some(parent);
        while let Some(node) = walk {
            if node == child {
                return Some(Outcome::WouldCycle);
            }
            walk = self.parent[node];
        }
        None
    }

    fn detach(&mut self, node: usize) {
        if let Some(p) = self.parent[node].take() {
            self.children[p].retain(|&c| c != node);
        }
    }

    fn dispose(&mut self, node: usize) {
        if !self.disposed[node] {
            self.disposed[node] = true;
            self.dispose_count[node] += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// The first step at which tree and model disagreed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Divergence {
    /// Step index within the run.
    pub step: usize,
    /// The edit that exposed the difference.
    pub op: EditOp,
    /// What differed.
    pub detail: String,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({:?}): {}", self.step, self.op, self.detail)
    }
}

impl core::error::Error for Divergence {}

/// Counts from a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Edits executed.
    pub steps: usize,
    /// Edits that took effect.
    pub applied: usize,
    /// Edits rejected (by both tree and model).
    pub rejected: usize,
}

/// Drives a [`NodeTree`] and a [`ListModel`] in lockstep.
#[derive(Debug)]
pub struct Harness {
    tree: NodeTree,
    ids: Vec<NodeId>,
    model: ListModel,
    fired: Arc<[AtomicU32]>,
}

impl Harness {
    /// Creates a harness over `n` `Group` nodes whose dispose callbacks are
    /// counted.
    ///
    /// # Errors
    ///
    /// Returns the error if a `Group` node cannot be created.
    pub fn new(n: usize) -> Result<Self, TreeError> {
        let fired: Arc<[AtomicU32]> = (0..n).map(|_| AtomicU32::new(0)).collect();
        let counters = Arc::clone(&fired);
        let mut tree = NodeTree::with_coordinator(
            NodeRegistry::with_builtin_kinds(),
            move |id: NodeId, _tag: &TypeTag| {
                let counters = Arc::clone(&counters);
                let slot = id.index() as usize;
                Some(DisposeCallback::new(move || {
                    if let Some(count) = counters.get(slot) {
                        count.fetch_add(1, Ordering::Relaxed);
                    }
                }))
            },
        );
        let ids = (0..n)
            .map(|_| tree.create("Group", &PropBatch::new()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            tree,
            ids,
            model: ListModel::new(n),
            fired,
        })
    }

    /// Returns the tree under test.
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> &ListModel {
        &self.model
    }

    /// Returns the handle for a label.
    #[must_use]
    pub fn id(&self, label: usize) -> NodeId {
        self.ids[label]
    }

    /// Applies one edit to both sides and compares the full state.
    ///
    /// # Errors
    ///
    /// Returns a [`Divergence`] (with `step` 0) on the first mismatch.
    pub fn apply(&mut self, op: EditOp) -> Result<Outcome, Divergence> {
        let id = |label: usize| self.ids[label];
        let result = match op {
            EditOp::Add { parent, child } => self.tree.add_child(id(parent), id(child)),
            EditOp::Insert {
                parent,
                child,
                before,
            } => self
                .tree
                .insert_child_before(id(parent), id(child), id(before)),
            EditOp::Remove { parent, child } => self.tree.remove_child(id(parent), id(child)),
            EditOp::Dispose(node) => {
                self.tree.dispose(id(node));
                Ok(())
            }
        };
        let actual = Outcome::of(&result);
        let expected = self.model.apply(op);
        let diverge = |detail: String| Divergence {
            step: 0,
            op,
            detail,
        };
        if actual != expected {
            return Err(diverge(format!(
                "tree returned {actual:?} ({result:?}), model expected {expected:?}"
            )));
        }
        self.compare().map_err(diverge)?;
        Ok(actual)
    }

    /// Runs a script, stopping at the first divergence.
    ///
    /// # Errors
    ///
    /// Returns the first [`Divergence`], with its step index.
    pub fn run_script(&mut self, ops: &[EditOp]) -> Result<RunReport, Divergence> {
        let mut report = RunReport::default();
        for (step, &op) in ops.iter().enumerate() {
            let outcome = self.apply(op).map_err(|d| Divergence { step, ..d })?;
            report.steps += 1;
            if outcome == Outcome::Applied {
                report.applied += 1;
            } else {
                report.rejected += 1;
            }
        }
        Ok(report)
    }

    /// Runs `steps` random edits drawn from `seed`.
    ///
    /// Edits are biased toward valid ones: markers and removed children are
    /// usually picked from the parent's current children.
    ///
    /// # Errors
    ///
    /// Returns the first [`Divergence`], with its step index.
    pub fn run_random(&mut self, seed: u64, steps: usize) -> Result<RunReport, Divergence> {
        let mut rng = XorShift64::new(seed);
        let mut report = RunReport::default();
        for step in 0..steps {
            let op = self.random_op(&mut rng);
            let outcome = self.apply(op).map_err(|d| Divergence { step, ..d })?;
            report.steps += 1;
            if outcome == Outcome::Applied {
                report.applied += 1;
            } else {
                report.rejected += 1;
            }
        }
        Ok(report)
    }

    fn random_op(&self, rng: &mut XorShift64) -> EditOp {
        let n = self.model.len();
        let parent = rng.below(n);
        let child = rng.below(n);
        let pick_child = |rng: &mut XorShift64| {
            let kids = self.model.children(parent);
            if !kids.is_empty() && rng.below(5) != 0 {
                kids[rng.below(kids.len())]
            } else {
                rng.below(n)
            }
        };
        match rng.below(100) {
            0..45 => EditOp::Add { parent, child },
            45..75 => EditOp::Insert {
                parent,
                child,
                before: pick_child(rng),
            },
            75..95 => EditOp::Remove {
                parent,
                child: pick_child(rng),
            },
            _ => EditOp::Dispose(child),
        }
    }

    fn compare(&self) -> Result<(), String> {
        for (label, &id) in self.ids.iter().enumerate() {
            let actual: Vec<usize> = self
                .tree
                .children(id)
                .iter()
                .map(|c| self.label_of(*c))
                .collect::<Option<_>>()
                .ok_or_else(|| format!("node {label} has a child outside the harness"))?;
            if actual != self.model.children(label) {
                return Err(format!(
                    "children of {label}: tree {actual:?}, model {:?}",
                    self.model.children(label)
                ));
            }

            let disposed = self.tree.state(id) == Some(NodeState::Disposed);
            if disposed != self.model.is_disposed(label) {
                return Err(format!(
                    "node {label}: tree disposed={disposed}, model disposed={}",
                    self.model.is_disposed(label)
                ));
            }

            let fired = self.fired[id.index() as usize].load(Ordering::Relaxed);
            if fired != self.model.dispose_count(label) {
                return Err(format!(
                    "node {label}: callback ran {fired} times, expected {}",
                    self.model.dispose_count(label)
                ));
            }
        }
        Ok(())
    }

    fn label_of(&self, id: NodeId) -> Option<usize> {
        self.ids.iter().position(|&x| x == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use EditOp::{Add, Dispose, Insert, Remove};

    #[test]
    fn insert_before_scenario() {
        // A[B, C]; insert D before C.
        let mut h = Harness::new(4).unwrap();
        let report = h
            .run_script(&[
                Add {
                    parent: 0,
                    child: 1,
                },
                Add {
                    parent: 0,
                    child: 2,
                },
                Insert {
                    parent: 0,
                    child: 3,
                    before: 2,
                },
            ])
            .unwrap();
        assert_eq!(report.applied, 3);
        assert_eq!(h.model().children(0), &[1, 3, 2]);
    }

    #[test]
    fn remove_scenario() {
        // A[B, C]; remove B.
        let mut h = Harness::new(3).unwrap();
        h.run_script(&[
            Add {
                parent: 0,
                child: 1,
            },
            Add {
                parent: 0,
                child: 2,
            },
            Remove {
                parent: 0,
                child: 1,
            },
        ])
        .unwrap();
        assert_eq!(h.model().children(0), &[2]);
        assert_eq!(h.model().dispose_count(1), 1);
    }

    #[test]
    fn repeated_dispose_fires_once() {
        let mut h = Harness::new(1).unwrap();
        h.run_script(&[Dispose(0), Dispose(0), Dispose(0)]).unwrap();
        assert_eq!(h.model().dispose_count(0), 1);
    }

    #[test]
    fn rejected_edits_agree() {
        let mut h = Harness::new(3).unwrap();
        let report = h
            .run_script(&[
                Add {
                    parent: 0,
                    child: 1,
                },
                // Missing marker.
                Insert {
                    parent: 0,
                    child: 2,
                    before: 2,
                },
                // Miss: nothing disposed.
                Remove {
                    parent: 0,
                    child: 2,
                },
                // Cycle.
                Add {
                    parent: 1,
                    child: 0,
                },
                // Other parent.
                Add {
                    parent: 2,
                    child: 1,
                },
            ])
            .unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.rejected, 4);
        assert_eq!(h.model().dispose_count(2), 0);
    }

    #[test]
    fn random_runs_match_model() {
        for seed in 1..=16 {
            let mut h = Harness::new(10).unwrap();
            let report = h
                .run_random(seed, 400)
                .unwrap_or_else(|d| panic!("seed {seed}: {d}"));
            assert_eq!(report.steps, 400);
            assert!(report.applied > 0, "seed {seed} applied nothing");
        }
    }

    #[test]
    fn xorshift_is_deterministic() {
        let mut a = XorShift64::new(42);
        let mut b = XorShift64::new(42);
        for _ in 0..8 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        assert_ne!(XorShift64::new(0).next_u64(), 0);
    }
}
