//! Schema-free XML-to-object binding engine.
//!
//! `xml_binder` builds an object graph out of an XML event stream
//! without any compile-time schema. Element names are mapped to types
//! at runtime through a [`TypeRegistry`]; as elements open the engine
//! instantiates objects, binds attributes and text through a naming
//! convention (`set` + capitalized key, then `add` + capitalized key),
//! and attaches each finished child to its parent. Documents can extend
//! the registry themselves through `<?mapping …?>` processing
//! instructions, and `${name}` placeholders in attribute values and
//! text are substituted from a shared [`Context`].
//!
//! # Example
//! ```
//! use xml_binder::{text_leaf, Bindable, TypeBinding, XmlBinder};
//!
//! #[derive(Default)]
//! struct Library {
//!     name: String,
//!     books: Vec<String>,
//! }
//!
//! impl Bindable for Library {}
//!
//! let mut binder = XmlBinder::new();
//! binder.register_type(
//!     "library",
//!     TypeBinding::<Library>::of()
//!         .text_setter("name", |l, v| l.name = v)
//!         .child_adder::<String>("book", |l, v| l.books.push(v)),
//! )?;
//! binder.register_type("book", text_leaf())?;
//!
//! let root = binder.parse_str(
//!     r#"<library name="downtown">
//!          <book>Dune</book>
//!          <book value="Solaris"/>
//!        </library>"#,
//! )?;
//!
//! let library = root.downcast::<Library>().ok().ok_or("wrong root type")?;
//! assert_eq!(library.name, "downtown");
//! assert_eq!(library.books, ["Dune", "Solaris"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod capability;
pub mod context;
mod directive;
mod engine;
pub mod error;
pub mod event;
pub mod naming;
pub mod registry;
pub mod substitute;
pub mod xml;

pub use capability::{
    AsAny, Bindable, ContextAware, ParentAware, Processable, ProcessError, TextBindable,
};
pub use context::Context;
pub use engine::XmlBinder;
pub use error::{BindError, Result};
pub use event::{EventSource, Position, XmlEvent};
pub use registry::{text_leaf, FactoryError, TypeBinding, TypeDescriptor, TypeRegistry};
pub use substitute::substitute;
pub use xml::DocumentEvents;
