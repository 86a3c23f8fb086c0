// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering consumer contract.
//!
//! The tree does not draw. A renderer implements [`TreeConsumer`] and is
//! handed the flushed [`TreeChanges`] together with read access to the tree:
//!
//! ```rust,ignore
//! fn on_frame(tree: &mut NodeTree, renderer: &mut impl TreeConsumer) {
//!     // Reconcile: apply the frame's command batch.
//!     tree.apply_all(commands, &mut Tracer::none())?;
//!
//!     // Present: flush and let the renderer read what changed.
//!     tree.present(renderer);
//! }
//! ```
//!
//! Indices in [`TreeChanges`] are raw slot indices; look them up with the
//! store's `*_at()` accessors or walk the visible tree with
//! [`NodeTree::walk`].

use crate::node::TreeChanges;
use crate::tree::NodeTree;

/// Receives flushed changes and reads the tree to update a presentation.
pub trait TreeConsumer {
    /// Applies `changes` to the presentation, reading current node state
    /// from `tree` as needed.
    fn consume(&mut self, tree: &NodeTree, changes: &TreeChanges);
}
