// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and JSON dumps for grove diagnostics.
//!
//! This crate provides [`TraceSink`](grove_core::trace::TraceSink)
//! implementations and tree dumps for development and tests:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: records events in memory for assertions.
//! - [`json`]: renders a [`TreeSnapshot`](grove_core::snapshot::TreeSnapshot)
//!   or a recording as `serde_json` values.

pub mod json;
pub mod pretty;
pub mod recorder;
