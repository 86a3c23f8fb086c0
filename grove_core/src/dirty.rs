// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The node store uses [`understory_dirty`] to remember which nodes changed
//! since the rendering consumer last looked. Both channels are local-only:
//! a property batch on a parent says nothing about its children.
//!
//! - [`PROPS`]: a property batch changed at least one materialized value.
//! - [`TOPOLOGY`]: the node's children list changed (attach, insert,
//!   reorder, remove). Marked on the *parent*.
//!
//! [`NodeStore::flush`](crate::node::NodeStore::flush) drains both channels
//! into [`TreeChanges`](crate::node::TreeChanges).

use understory_dirty::Channel;

/// Materialized properties changed.
pub const PROPS: Channel = Channel::new(0);

/// Children list changed.
pub const TOPOLOGY: Channel = Channel::new(1);
