// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property batches and the per-node property container.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};

use super::schema::{PropertySchema, UnknownKeyPolicy};
use super::value::{Color, PropValue};
use crate::error::SchemaError;

/// An ordered batch of property assignments from the reconciler.
///
/// Later entries for the same key win.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropBatch {
    entries: Vec<(String, PropValue)>,
}

impl PropBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Adds an assignment.
    pub fn push(&mut self, name: &str, value: impl Into<PropValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Iterates over assignments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for PropBatch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Materialized property values of one node, checked against its schema.
///
/// The schema is injected exactly once through
/// [`define_schema`](Self::define_schema). [`set_props`](Self::set_props) is
/// atomic: the whole batch is validated before any value is written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropsContainer {
    schema: Option<PropertySchema>,
    values: BTreeMap<String, PropValue>,
}

impl PropsContainer {
    /// Creates a container with no schema and no values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the schema has been defined.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.schema.is_some()
    }

    /// Defines the schema by running `define` on an empty schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AlreadyDefined`] if the schema was defined
    /// before; `define` is not called and the schema is left untouched.
    pub fn define_schema(
        &mut self,
        define: impl FnOnce(&mut PropertySchema),
    ) -> Result<(), SchemaError> {
        if self.schema.is_some() {
            return Err(SchemaError::AlreadyDefined);
        }
        let mut schema = PropertySchema::new();
        define(&mut schema);
        self.schema = Some(schema);
        Ok(())
    }

    /// Returns the schema, if defined.
    #[must_use]
    pub fn schema(&self) -> Option<&PropertySchema> {
        self.schema.as_ref()
    }

    /// Merges `batch` into the container.
    ///
    /// Keys not in the batch keep their values. A [`PropValue::Null`] entry
    /// clears the key. Returns the keys whose materialized value changed, in
    /// batch order and without duplicates.
    ///
    /// An undefined schema behaves like an empty open schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::TypeMismatch`] if a value does not fit its
    /// declared slot and [`SchemaError::UnknownProperty`] if an undeclared
    /// key meets [`UnknownKeyPolicy::Reject`]. On error nothing is applied.
    pub fn set_props(&mut self, batch: &PropBatch) -> Result<Vec<String>, SchemaError> {
        let mut accepted: Vec<(&str, &PropValue)> = Vec::with_capacity(batch.len());
        for (name, value) in batch.iter() {
            match self.schema.as_ref().and_then(|s| s.slot(name)) {
                Some(slot) => {
                    if !slot.kind.accepts(value.kind()) {
                        return Err(SchemaError::TypeMismatch {
                            name: name.into(),
                            expected: slot.kind,
                            found: value.kind(),
                        });
                    }
                    accepted.push((name, value));
                }
                None => match self.unknown_policy() {
                    UnknownKeyPolicy::Store => accepted.push((name, value)),
                    UnknownKeyPolicy::Drop => {}
                    UnknownKeyPolicy::Reject => {
                        return Err(SchemaError::UnknownProperty(name.into()));
                    }
                },
            }
        }

        // First-seen value of every touched key, in batch order.
        let mut before: Vec<(&str, Option<PropValue>)> = Vec::new();
        for (name, value) in accepted {
            if !before.iter().any(|(k, _)| *k == name) {
                before.push((name, self.values.get(name).cloned()));
            }
            if value.is_null() {
                self.values.remove(name);
            } else {
                self.values.insert(name.into(), value.clone());
            }
        }
        Ok(before
            .into_iter()
            .filter(|(name, old)| self.values.get(*name) != old.as_ref())
            .map(|(name, _)| String::from(name))
            .collect())
    }

    /// Returns the value of `name`: the materialized value if set, otherwise
    /// the schema default.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values
            .get(name)
            .or_else(|| self.schema.as_ref().and_then(|s| s.default_for(name)))
    }

    /// Returns whether `name` has a materialized value (defaults excluded).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns `name` as a number.
    #[must_use]
    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropValue::as_number)
    }

    /// Returns `name` as a boolean.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropValue::as_bool)
    }

    /// Returns `name` as a string.
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_text)
    }

    /// Returns `name` as a point.
    #[must_use]
    pub fn get_point(&self, name: &str) -> Option<Point> {
        self.get(name).and_then(PropValue::as_point)
    }

    /// Returns `name` as a vector.
    #[must_use]
    pub fn get_vec2(&self, name: &str) -> Option<Vec2> {
        self.get(name).and_then(PropValue::as_vec2)
    }

    /// Returns `name` as a rectangle.
    #[must_use]
    pub fn get_rect(&self, name: &str) -> Option<Rect> {
        self.get(name).and_then(PropValue::as_rect)
    }

    /// Returns `name` as a color.
    #[must_use]
    pub fn get_color(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(PropValue::as_color)
    }

    /// Iterates over materialized values in key order. Defaults are not
    /// included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of materialized values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no value is materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn unknown_policy(&self) -> UnknownKeyPolicy {
        self.schema
            .as_ref()
            .map_or(UnknownKeyPolicy::Store, PropertySchema::unknown_policy)
    }
}
