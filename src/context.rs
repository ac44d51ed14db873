//! Shared parse context.
//!
//! One `Context` is owned by a binder for the duration of a parse
//! session and handed out by clone (shared reference) to every
//! constructed object that declares a context-receiving capability.
//! Objects may mutate it mid-parse; later substitutions observe the
//! mutation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::substitute::substitute;

/// Mutable string map shared between the binder and constructed objects.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: Rc<RefCell<HashMap<String, String>>>,
}

impl Context {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a property value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.borrow().get(key).cloned()
    }

    /// Insert or replace a property.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.borrow_mut().insert(key.into(), value.into());
    }

    /// Remove a property, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.vars.borrow_mut().remove(key)
    }

    /// Number of properties currently set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.borrow().len()
    }

    /// Whether the context holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.borrow().is_empty()
    }

    /// Expand `${name}` placeholders in `input` against this context.
    #[must_use]
    pub fn expand(&self, input: &str) -> String {
        substitute(input, &self.vars.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let ctx = Context::new();
        assert!(ctx.is_empty());

        ctx.set("home", "/opt/app");
        assert_eq!(ctx.get("home"), Some("/opt/app".to_string()));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let ctx = Context::new();
        let handle = ctx.clone();
        handle.set("seen", "yes");
        assert_eq!(ctx.get("seen"), Some("yes".to_string()));
    }

    #[test]
    fn test_expand() {
        let ctx = Context::new();
        ctx.set("name", "core");
        assert_eq!(ctx.expand("bundle-${name}"), "bundle-core");
        assert_eq!(ctx.expand("${other}"), "${other}");
    }
}
