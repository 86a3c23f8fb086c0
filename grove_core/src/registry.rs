// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-tag to constructor registry.
//!
//! The reconciler names node types by string tag only. A [`NodeRegistry`]
//! maps each tag to a constructor producing a fresh [`NodeKind`]. The
//! registry is built up front and handed to the
//! [`NodeTree`](crate::tree::NodeTree), which owns it from then on.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::error::RegistryError;
use crate::kind::{NodeKind, TypeTag};
use crate::kinds;

/// Produces a fresh kind instance for one node.
pub type Constructor = Box<dyn Fn() -> Box<dyn NodeKind> + Send + Sync>;

/// Maps type tags to node constructors.
#[derive(Default)]
pub struct NodeRegistry {
    constructors: HashMap<TypeTag, Constructor>,
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.constructors.keys().map(TypeTag::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("NodeRegistry")
            .field("tags", &tags)
            .finish()
    }
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in kinds: `Group`, `Circle`,
    /// `Rect`, `Line` and `Paint`.
    #[must_use]
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        let results = [
            registry.register_kind::<kinds::Group>("Group"),
            registry.register_kind::<kinds::Circle>("Circle"),
            registry.register_kind::<kinds::Rect>("Rect"),
            registry.register_kind::<kinds::Line>("Line"),
            registry.register_kind::<kinds::Paint>("Paint"),
        ];
        debug_assert!(
            results.iter().all(Result::is_ok),
            "built-in tags must be distinct"
        );
        registry
    }

    /// Registers a constructor for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateType`] if `tag` is already
    /// registered; the existing constructor is kept.
    pub fn register(&mut self, tag: &str, ctor: Constructor) -> Result<(), RegistryError> {
        if let Some((existing, _)) = self.constructors.get_key_value(tag) {
            return Err(RegistryError::DuplicateType(existing.clone()));
        }
        self.constructors.insert(TypeTag::new(tag), ctor);
        Ok(())
    }

    /// Registers `K::default()` as the constructor for `tag`.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_kind<K>(&mut self, tag: &str) -> Result<(), RegistryError>
    where
        K: NodeKind + Default + 'static,
    {
        self.register(tag, Box::new(|| Box::new(K::default()) as Box<dyn NodeKind>))
    }

    /// Constructs a fresh kind for `tag`, returning the shared tag with it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownType`] if `tag` is not registered.
    pub fn construct(&self, tag: &str) -> Result<(TypeTag, Box<dyn NodeKind>), RegistryError> {
        let (tag, ctor) = self
            .constructors
            .get_key_value(tag)
            .ok_or_else(|| RegistryError::UnknownType(tag.into()))?;
        Ok((tag.clone(), ctor()))
    }

    /// Returns whether `tag` is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Returns the number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns whether no tags are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Returns the registered tags in sorted order.
    #[must_use]
    pub fn tags(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = self.constructors.keys().cloned().collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::props::{PropertySchema, PropsContainer};

    #[derive(Debug, Default)]
    struct Marker(u8);

    impl NodeKind for Marker {
        fn define_properties(&self, schema: &mut PropertySchema) {
            schema.declare("marker", crate::props::PropKind::Number);
        }

        fn props_changed(&mut self, _props: &PropsContainer, _changed: &[String]) {
            self.0 += 1;
        }
    }

    #[test]
    fn builtin_tags() {
        let registry = NodeRegistry::with_builtin_kinds();
        let tags: Vec<_> = registry.tags().iter().map(|t| String::from(t.as_str())).collect();
        assert_eq!(tags, ["Circle", "Group", "Line", "Paint", "Rect"]);
    }

    #[test]
    fn construct_returns_fresh_instances() {
        let mut registry = NodeRegistry::new();
        registry.register_kind::<Marker>("Marker").unwrap();

        let (tag, first) = registry.construct("Marker").unwrap();
        let (_, second) = registry.construct("Marker").unwrap();
        assert_eq!(tag.as_str(), "Marker");
        assert!(!core::ptr::addr_eq(&*first, &*second));
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut registry = NodeRegistry::new();
        registry.register_kind::<Marker>("Marker").unwrap();
        let err = registry
            .register(
                "Marker",
                Box::new(|| Box::new(kinds::Group::default()) as Box<dyn NodeKind>),
            )
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateType(TypeTag::new("Marker")));

        let (_, kind) = registry.construct("Marker").unwrap();
        let mut schema = PropertySchema::new();
        kind.define_properties(&mut schema);
        assert!(schema.slot("marker").is_some());
    }

    #[test]
    fn unknown_tag_is_reported() {
        let registry = NodeRegistry::with_builtin_kinds();
        assert_eq!(
            registry.construct("Blob").err(),
            Some(RegistryError::UnknownType("Blob".into()))
        );
        assert!(!registry.contains("Blob"));
    }
}
