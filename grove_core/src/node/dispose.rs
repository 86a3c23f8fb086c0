// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispose callbacks.

use alloc::boxed::Box;
use core::fmt;

/// A hook run exactly once when its node is disposed.
///
/// Typically registered by a [`Coordinator`](crate::tree::Coordinator) to
/// unsubscribe the node from whatever cross-cutting state (animations,
/// resource caches) refers to it.
pub struct DisposeCallback(Box<dyn FnOnce() + Send + Sync>);

impl DisposeCallback {
    /// Wraps a closure.
    pub fn new(f: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self(Box::new(f))
    }

    pub(crate) fn run(self) {
        (self.0)();
    }
}

impl fmt::Debug for DisposeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeCallback").finish_non_exhaustive()
    }
}
