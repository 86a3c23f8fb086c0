// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained node tree driven by an external reconciler.
//!
//! `grove_core` mirrors a declarative UI description into a persistent tree
//! of typed nodes. A reconciler decides *what* changed and issues edit
//! commands; this crate keeps the tree shape, materializes property batches
//! against per-type schemas, and disposes nodes deterministically. It is
//! `no_std` compatible (with `alloc`) and stores nodes in struct-of-arrays
//! layout behind generational handles.
//!
//! # Architecture
//!
//! ```text
//!   Reconciler
//!       │ Command
//!       ▼
//!   NodeTree::apply ──► NodeRegistry (create) ──► Coordinator (dispose hook)
//!       │
//!       ▼
//!   NodeStore ──► PropsContainer (materialize)
//!       │
//!       ▼
//!   NodeTree::flush ──► TreeChanges ──► TreeConsumer::consume
//! ```
//!
//! **[`node`]**: struct-of-arrays node store with generational handles,
//! ordered children, disposal and release.
//!
//! **[`props`]**: property values, schemas and the per-node container.
//!
//! **[`kind`]**: the [`NodeKind`](kind::NodeKind) trait carrying per-type
//! behavior. **[`kinds`]** holds the built-in kinds.
//!
//! **[`registry`]**: type tag to constructor mapping.
//!
//! **[`tree`]**: the [`NodeTree`](tree::NodeTree) root and its
//! [`Coordinator`](tree::Coordinator).
//!
//! **[`command`]**: the command stream and batch application.
//!
//! **[`dirty`]**: dirty channels via `understory_dirty`.
//!
//! **[`consumer`]** / **[`snapshot`]**: what a renderer sees.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) events for the command
//! stream, with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   the lock-based `shared` module.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub use kurbo;

pub mod command;
pub mod consumer;
pub mod dirty;
pub mod error;
pub mod kind;
pub mod kinds;
pub mod node;
pub mod props;
pub mod registry;
#[cfg(feature = "std")]
pub mod shared;
pub mod snapshot;
pub mod trace;
pub mod tree;
