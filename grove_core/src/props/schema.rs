// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property schemas.

use alloc::collections::BTreeMap;
use alloc::string::String;

use super::value::{PropKind, PropValue};

/// What a container does with a key its schema does not declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnknownKeyPolicy {
    /// Store the value as-is.
    #[default]
    Store,
    /// Ignore the key.
    Drop,
    /// Reject the whole batch with
    /// [`SchemaError::UnknownProperty`](crate::error::SchemaError::UnknownProperty).
    Reject,
}

/// A declared property slot.
#[derive(Clone, Debug, PartialEq)]
pub struct PropSlot {
    /// Accepted value kind.
    pub kind: PropKind,
    /// Value reported when the property has not been set.
    pub default: Option<PropValue>,
}

/// The set of property slots a node kind recognizes.
///
/// A schema is filled in once per node by
/// [`NodeKind::define_properties`](crate::kind::NodeKind::define_properties)
/// and is read-only afterwards. An empty schema with the default
/// [`UnknownKeyPolicy::Store`] accepts every key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySchema {
    slots: BTreeMap<String, PropSlot>,
    unknown: UnknownKeyPolicy,
}

impl PropertySchema {
    /// Creates an empty, open schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a slot with no default. Redeclaring a name replaces it.
    pub fn declare(&mut self, name: &str, kind: PropKind) -> &mut Self {
        self.slots.insert(
            name.into(),
            PropSlot {
                kind,
                default: None,
            },
        );
        self
    }

    /// Declares a slot whose value reads as `default` until it is set.
    pub fn declare_with_default(
        &mut self,
        name: &str,
        kind: PropKind,
        default: impl Into<PropValue>,
    ) -> &mut Self {
        self.slots.insert(
            name.into(),
            PropSlot {
                kind,
                default: Some(default.into()),
            },
        );
        self
    }

    /// Sets the policy for undeclared keys.
    pub fn set_unknown_policy(&mut self, policy: UnknownKeyPolicy) -> &mut Self {
        self.unknown = policy;
        self
    }

    /// Returns the policy for undeclared keys.
    #[must_use]
    pub fn unknown_policy(&self) -> UnknownKeyPolicy {
        self.unknown
    }

    /// Returns the slot declared for `name`.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&PropSlot> {
        self.slots.get(name)
    }

    /// Returns the default value declared for `name`.
    #[must_use]
    pub fn default_for(&self, name: &str) -> Option<&PropValue> {
        self.slots.get(name).and_then(|slot| slot.default.as_ref())
    }

    /// Iterates over declared slots in name order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &PropSlot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    /// Returns the number of declared slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether no slot is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
