//! Capability traits for bound objects.
//!
//! A capability is an optional, named operation an object may or may
//! not support; absence is not an error unless no fallback exists.
//! Types opt in by overriding the accessor for the capability they
//! implement:
//!
//! ```
//! use xml_binder::capability::{Bindable, TextBindable};
//!
//! #[derive(Default)]
//! struct Note {
//!     text: String,
//! }
//!
//! impl TextBindable for Note {
//!     fn bind_text(&mut self, text: String) {
//!         self.text = text;
//!     }
//! }
//!
//! impl Bindable for Note {
//!     fn text_bindable(&mut self) -> Option<&mut dyn TextBindable> {
//!         Some(self)
//!     }
//! }
//! ```

use std::any::Any;

use crate::context::Context;

/// Error type raised by a [`Processable::process`] implementation.
pub type ProcessError = Box<dyn std::error::Error + Send + Sync>;

/// Object-safe access to the concrete value behind a trait object.
///
/// Blanket-implemented for every `'static` type; `Bindable`
/// implementations never need to provide these methods themselves.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Base trait for every object the engine can construct and bind.
///
/// The default accessors all return `None`; a type overrides exactly
/// the ones for the capabilities it supports.
pub trait Bindable: AsAny {
    /// Receives the parent object right after construction.
    fn parent_aware(&mut self) -> Option<&mut dyn ParentAware> {
        None
    }

    /// Receives the shared parse context right after construction.
    fn context_aware(&mut self) -> Option<&mut dyn ContextAware> {
        None
    }

    /// Invoked once when the element closes.
    fn processable(&mut self) -> Option<&mut dyn Processable> {
        None
    }

    /// Receives the element's accumulated text content.
    fn text_bindable(&mut self) -> Option<&mut dyn TextBindable> {
        None
    }
}

/// The reserved text-leaf placeholder type: a plain string value bound
/// either via the reserved `value` attribute or via element text
/// content, never both.
impl Bindable for String {}

/// Receives a non-owning back-reference to the parent object.
///
/// The parse stack remains the sole owner of in-flight objects; an
/// implementation may inspect the parent and record a lookup handle,
/// but cannot keep the borrow.
pub trait ParentAware {
    fn set_parent(&mut self, parent: &dyn Bindable);
}

/// Receives the shared parse context by clone.
pub trait ContextAware {
    fn set_context(&mut self, context: Context);
}

/// Post-construction hook run when the element closes. Failures abort
/// the parse.
pub trait Processable {
    /// # Errors
    /// Any error is propagated to the caller of `parse`.
    fn process(&mut self) -> std::result::Result<(), ProcessError>;
}

/// Receives the element's substituted, trimmed text content.
pub trait TextBindable {
    fn bind_text(&mut self, text: String);
}
