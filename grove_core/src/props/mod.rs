// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property schemas and materialized property containers.
//!
//! Each node owns at most one [`PropsContainer`], created on the node's first
//! property batch. The node's kind fills in a [`PropertySchema`] at that
//! moment; the schema decides which keys are recognized, what value kinds
//! they accept, and what happens to undeclared keys
//! ([`UnknownKeyPolicy`]).

mod container;
mod schema;
mod value;

pub use container::{PropBatch, PropsContainer};
pub use schema::{PropSlot, PropertySchema, UnknownKeyPolicy};
pub use value::{Color, PropKind, PropValue};
