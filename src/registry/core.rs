//! Type registry mapping element names to descriptors.

use std::collections::HashMap;

use crate::error::{BindError, Result};
use crate::event::Position;

use super::descriptor::TypeDescriptor;

/// Registry mapping element names to type descriptors.
///
/// Holds one optional default descriptor used whenever no exact match
/// exists, plus the class table resolving the runtime names used by
/// mapping directives. Entries may be inserted or replaced at any
/// time, including mid-parse; re-registration overwrites.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
    default_type: Option<TypeDescriptor>,
    classes: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor for an element name, replacing any
    /// previous registration.
    ///
    /// # Errors
    /// Returns [`BindError::Type`] for an empty element name; the
    /// registry is left unmodified on failure.
    pub fn register(&mut self, name: impl Into<String>, descriptor: TypeDescriptor) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(BindError::Type {
                name,
                message: "element name must not be empty".to_string(),
                pos: Position::default(),
            });
        }
        tracing::debug!(element = %name, ?descriptor, "registering element type");
        self.types.insert(name, descriptor);
        Ok(())
    }

    /// Register the fallback descriptor used for element names with no
    /// exact registration.
    pub fn register_default(&mut self, descriptor: TypeDescriptor) {
        tracing::debug!(?descriptor, "registering default element type");
        self.default_type = Some(descriptor);
    }

    /// Register a descriptor under the runtime class name used by
    /// mapping directives.
    ///
    /// # Errors
    /// Returns [`BindError::Type`] for an empty class name.
    pub fn register_class(
        &mut self,
        name: impl Into<String>,
        descriptor: TypeDescriptor,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(BindError::Type {
                name,
                message: "class name must not be empty".to_string(),
                pos: Position::default(),
            });
        }
        self.classes.insert(name, descriptor);
        Ok(())
    }

    /// Look up the descriptor for an element name: exact match, else
    /// the default descriptor, else `None`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name).or(self.default_type.as_ref())
    }

    /// Look up a descriptor by runtime class name.
    #[must_use]
    pub fn lookup_class(&self, name: &str) -> Option<&TypeDescriptor> {
        self.classes.get(name)
    }

    /// Whether an exact registration exists for an element name.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// The fallback descriptor, if one is set.
    #[must_use]
    pub fn default_type(&self) -> Option<&TypeDescriptor> {
        self.default_type.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Bindable;
    use crate::registry::descriptor::TypeBinding;

    #[derive(Default)]
    struct Entry;

    impl Bindable for Entry {}

    #[derive(Default)]
    struct Fallback;

    impl Bindable for Fallback {}

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry
            .register("entry", TypeBinding::<Entry>::of().into())
            .unwrap();

        assert!(registry.has_type("entry"));
        assert!(registry.lookup("entry").is_some());
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let mut registry = TypeRegistry::new();
        registry.register_default(TypeBinding::<Fallback>::of().into());

        let descriptor = registry.lookup("anything").unwrap();
        assert_eq!(
            descriptor.instance_type(),
            std::any::TypeId::of::<Fallback>()
        );
        assert!(!registry.has_type("anything"));
    }

    #[test]
    fn test_reregistration_overwrites() {
        let mut registry = TypeRegistry::new();
        registry
            .register("e", TypeBinding::<Entry>::of().into())
            .unwrap();
        registry
            .register("e", TypeBinding::<Fallback>::of().into())
            .unwrap();

        let descriptor = registry.lookup("e").unwrap();
        assert_eq!(
            descriptor.instance_type(),
            std::any::TypeId::of::<Fallback>()
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = TypeRegistry::new();
        let err = registry
            .register("", TypeBinding::<Entry>::of().into())
            .unwrap_err();
        assert!(matches!(err, BindError::Type { .. }));
        assert!(registry.lookup("").is_none());
    }

    #[test]
    fn test_class_table() {
        let mut registry = TypeRegistry::new();
        registry
            .register_class("demo.Entry", TypeBinding::<Entry>::of().into())
            .unwrap();

        assert!(registry.lookup_class("demo.Entry").is_some());
        assert!(registry.lookup_class("demo.Other").is_none());
        // class names do not shadow element names
        assert!(registry.lookup("demo.Entry").is_none());
    }
}
