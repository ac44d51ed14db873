//! Parse state machine that builds an object graph from markup events.
//!
//! The engine owns the element stack and dispatches the four event
//! kinds: element open (instantiate, inject parent and context, bind
//! attributes), character data (buffer on the open frame), element
//! close (bind text, run `process()`, attach to the parent) and
//! processing instructions (mapping directives). It never knows the
//! shapes of the objects it constructs; every decision goes through
//! the type registry and the binding resolver.

use std::any::Any;
use std::collections::HashMap;

use crate::capability::Bindable;
use crate::context::Context;
use crate::directive;
use crate::error::{BindError, Result};
use crate::event::{EventSource, Position, XmlEvent};
use crate::naming::capitalize;
use crate::registry::{bind_member, BindFailure, BindValue, TypeDescriptor, TypeRegistry};
use crate::xml::DocumentEvents;

/// The reserved attribute key that carries a text-leaf's value.
const VALUE_KEY: &str = "value";

/// One live element on the parse stack. The frame owns its object
/// until attachment to the parent transfers it into the graph.
struct ElementFrame {
    name: String,
    object: Box<dyn Bindable>,
    text: String,
}

/// Schema-free binder that turns markup event streams into object
/// graphs.
///
/// Types are registered at runtime, keyed by element name; an optional
/// default type covers unregistered names, and mapping directives in
/// the document itself may add or replace registrations mid-parse.
///
/// # Example
/// ```
/// use xml_binder::{text_leaf, Bindable, TypeBinding, XmlBinder};
///
/// #[derive(Default)]
/// struct Greeting {
///     words: Vec<String>,
/// }
///
/// impl Bindable for Greeting {}
///
/// let mut binder = XmlBinder::new();
/// binder
///     .register_type(
///         "greeting",
///         TypeBinding::<Greeting>::of()
///             .child_adder::<String>("word", |g, w| g.words.push(w)),
///     )
///     .unwrap();
/// binder.register_type("word", text_leaf()).unwrap();
///
/// let root = binder
///     .parse_str("<greeting><word>hello</word><word>world</word></greeting>")
///     .unwrap();
/// let greeting = root.downcast::<Greeting>().unwrap();
/// assert_eq!(greeting.words, ["hello", "world"]);
/// ```
pub struct XmlBinder {
    registry: TypeRegistry,
    context: Context,
    pi_handlers: HashMap<String, TypeDescriptor>,
    missing_pi_fatal: bool,
    trace: bool,
    stack: Vec<ElementFrame>,
    root: Option<Box<dyn Any>>,
    pos: Position,
}

impl XmlBinder {
    /// Create a binder with an empty registry and context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            context: Context::new(),
            pi_handlers: HashMap::new(),
            missing_pi_fatal: false,
            trace: false,
            stack: Vec::new(),
            root: None,
            pos: Position::default(),
        }
    }

    /// Register a type binding for an element name, replacing any
    /// previous registration. May be called at any time, including
    /// between parses.
    ///
    /// # Errors
    /// Returns [`BindError::Type`] on validation failure; the registry
    /// is left unmodified.
    pub fn register_type(
        &mut self,
        name: impl Into<String>,
        binding: impl Into<TypeDescriptor>,
    ) -> Result<()> {
        self.registry.register(name, binding.into())
    }

    /// Register the fallback binding used for element names with no
    /// exact registration.
    pub fn register_default_type(&mut self, binding: impl Into<TypeDescriptor>) {
        self.registry.register_default(binding.into());
    }

    /// Register a binding under the runtime class name mapping
    /// directives resolve against.
    ///
    /// # Errors
    /// Returns [`BindError::Type`] for an empty class name.
    pub fn register_class(
        &mut self,
        name: impl Into<String>,
        binding: impl Into<TypeDescriptor>,
    ) -> Result<()> {
        self.registry.register_class(name, binding.into())
    }

    /// Declare a binding for a processing-instruction target.
    ///
    /// Dispatch for this table is inert: the engine records the entry
    /// and logs matching instructions, but constructs nothing.
    pub fn register_pi_handler(
        &mut self,
        target: impl Into<String>,
        binding: impl Into<TypeDescriptor>,
    ) {
        self.pi_handlers.insert(target.into(), binding.into());
    }

    /// Declare that unknown processing-instruction targets should be
    /// fatal. Like the handler table above, this flag is recorded but
    /// dispatch stays inert.
    pub fn set_missing_pi_directive_is_fatal(&mut self, fatal: bool) {
        self.missing_pi_fatal = fatal;
    }

    /// Enable debug logging of every state transition.
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// The shared context map used for placeholder substitution and
    /// handed to context-aware objects.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The underlying type registry.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Consume an event stream and return the root object.
    ///
    /// Resets the stack and any previous root, then processes events
    /// strictly sequentially. Registrations and context entries are
    /// retained across parses.
    ///
    /// # Errors
    /// Any error aborts the entire parse; there is no partial result.
    pub fn parse<S: EventSource>(&mut self, mut source: S) -> Result<Box<dyn Any>> {
        self.stack.clear();
        self.root = None;
        self.pos = Position::default();

        while let Some(event) = source.next_event()? {
            tracing::trace!(?event, depth = self.stack.len(), "dispatching event");
            match event {
                XmlEvent::StartElement {
                    name,
                    attributes,
                    pos,
                } => {
                    self.pos = pos;
                    self.start_element(&name, attributes)?;
                }
                XmlEvent::Characters { text, pos } => {
                    self.pos = pos;
                    self.characters(&text);
                }
                XmlEvent::EndElement { name, pos } => {
                    self.pos = pos;
                    self.end_element(&name)?;
                }
                XmlEvent::ProcessingInstruction { target, data, pos } => {
                    self.pos = pos;
                    self.processing_instruction(target.as_deref(), &data)?;
                }
            }
        }

        if !self.stack.is_empty() {
            return Err(BindError::Structural {
                message: format!(
                    "event stream ended with {} unclosed element(s)",
                    self.stack.len()
                ),
                pos: self.pos,
            });
        }
        self.root.take().ok_or_else(|| BindError::Structural {
            message: "no root element in event stream".to_string(),
            pos: self.pos,
        })
    }

    /// Parse an XML string through the bundled tokenizer adapter.
    ///
    /// # Errors
    /// Tokenizer failures surface as [`BindError::Xml`]; binding
    /// failures as in [`Self::parse`].
    pub fn parse_str(&mut self, xml: &str) -> Result<Box<dyn Any>> {
        let doc = roxmltree::Document::parse(xml)?;
        self.parse(DocumentEvents::new(&doc))
    }

    fn start_element(&mut self, name: &str, attributes: Vec<(String, String)>) -> Result<()> {
        if self.trace {
            tracing::debug!(element = name, pos = %self.pos, "start element");
        }

        // exactly one root per parse
        if self.stack.is_empty() && self.root.is_some() {
            return Err(BindError::Structural {
                message: format!("second top-level element <{name}> after the root closed"),
                pos: self.pos,
            });
        }

        let descriptor =
            self.registry
                .lookup(name)
                .cloned()
                .ok_or_else(|| BindError::UnknownElement {
                    element: name.to_string(),
                    pos: self.pos,
                })?;

        let mut object = descriptor
            .instantiate()
            .map_err(|e| BindError::Construction {
                element: name.to_string(),
                message: e.to_string(),
                pos: self.pos,
            })?;

        if let Some(parent) = self.stack.last() {
            if let Some(aware) = object.parent_aware() {
                aware.set_parent(parent.object.as_ref());
            }
        }
        if let Some(aware) = object.context_aware() {
            aware.set_context(self.context.clone());
        }

        for (key, raw) in attributes {
            let value = self.context.expand(&raw);
            if descriptor.is_text_leaf() {
                if key == VALUE_KEY {
                    object = Box::new(value);
                } else {
                    return Err(BindError::AttributeNotSupported {
                        element: name.to_string(),
                        attribute: key,
                        pos: self.pos,
                    });
                }
            } else {
                self.bind_attribute(object.as_mut(), &descriptor, &key, value)?;
            }
        }

        self.stack.push(ElementFrame {
            name: name.to_string(),
            object,
            text: String::new(),
        });
        Ok(())
    }

    fn bind_attribute(
        &self,
        target: &mut dyn Bindable,
        descriptor: &TypeDescriptor,
        key: &str,
        value: String,
    ) -> Result<()> {
        let bind = BindValue::Text(value);
        let shape = bind.shape();
        bind_member(target, descriptor, key, key, bind).map_err(|failure| match failure {
            BindFailure::NoMatch => BindError::UnsupportedMember {
                type_name: descriptor.instance_type_name(),
                member: key.to_string(),
                shape,
                pos: self.pos,
            },
            BindFailure::Inconsistent => self.inconsistent(descriptor, key),
        })
    }

    fn characters(&mut self, text: &str) {
        // character data outside any element is ignored
        if let Some(frame) = self.stack.last_mut() {
            frame.text.push_str(text);
        }
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        if self.trace {
            tracing::debug!(element = name, pos = %self.pos, "end element");
        }

        let Some(mut frame) = self.stack.pop() else {
            return Err(BindError::Structural {
                message: format!("end of element <{name}> with no open element"),
                pos: self.pos,
            });
        };
        if frame.name != name {
            return Err(BindError::Structural {
                message: format!(
                    "end of element <{name}> does not match open element <{}>",
                    frame.name
                ),
                pos: self.pos,
            });
        }

        // re-resolved on close: a mapping directive between open and
        // close is observed here
        let descriptor =
            self.registry
                .lookup(&frame.name)
                .cloned()
                .ok_or_else(|| BindError::Structural {
                    message: format!("type for element <{name}> disappeared during parse"),
                    pos: self.pos,
                })?;

        if !frame.text.is_empty() {
            let text = self.context.expand(&frame.text).trim().to_string();
            if let Some(bindable) = frame.object.text_bindable() {
                bindable.bind_text(text);
            } else if let Some(value) = frame.object.as_any_mut().downcast_mut::<String>() {
                if !value.is_empty() {
                    return Err(BindError::ValueConflict {
                        element: name.to_string(),
                        pos: self.pos,
                    });
                }
                *value = text;
            } else if self.trace {
                tracing::debug!(element = name, "text content dropped, no text binding");
            }
        }

        // the parent takes ownership at attachment, so process() runs
        // while the frame still owns the object
        if let Some(processable) = frame.object.processable() {
            processable.process().map_err(|source| BindError::Process {
                element: name.to_string(),
                pos: self.pos,
                source,
            })?;
        }

        let parent_name = match self.stack.last() {
            Some(parent) => parent.name.clone(),
            None => {
                // the stack just emptied; start_element rejects any
                // further top-level element
                self.root = Some(frame.object.into_any());
                return Ok(());
            }
        };

        let parent_descriptor = self
            .registry
            .lookup(&parent_name)
            .cloned()
            .ok_or_else(|| BindError::Structural {
                message: format!("type for element <{parent_name}> disappeared during parse"),
                pos: self.pos,
            })?;

        let value = descriptor
            .cast_value(frame.object)
            .ok_or_else(|| BindError::Structural {
                message: format!(
                    "value for element <{name}> does not match its registered cast type {}",
                    descriptor.cast_type_name()
                ),
                pos: self.pos,
            })?;
        let bind = BindValue::Child {
            value,
            type_name: descriptor.cast_type_name(),
        };
        let base = capitalize(name);
        let pos = self.pos;

        if let Some(parent) = self.stack.last_mut() {
            bind_member(parent.object.as_mut(), &parent_descriptor, &base, name, bind).map_err(
                |failure| match failure {
                    BindFailure::NoMatch => BindError::UnsupportedChild {
                        parent: parent_name.clone(),
                        child: name.to_string(),
                        cast_type: descriptor.cast_type_name(),
                        pos,
                    },
                    BindFailure::Inconsistent => BindError::Structural {
                        message: format!(
                            "registered member for <{name}> does not accept type {}",
                            descriptor.cast_type_name()
                        ),
                        pos,
                    },
                },
            )?;
        }
        Ok(())
    }

    fn processing_instruction(&mut self, target: Option<&str>, data: &str) -> Result<()> {
        if self.trace {
            tracing::debug!(?target, data, pos = %self.pos, "processing instruction");
        }

        if directive::is_mapping(target, data) {
            return directive::apply(&mut self.registry, data, self.pos);
        }

        // PI-to-type dispatch is declared but inert; see register_pi_handler
        if let Some(target) = target {
            if self.pi_handlers.contains_key(target) {
                tracing::debug!(target, "ignoring processing instruction with registered handler");
            } else if self.missing_pi_fatal {
                tracing::debug!(target, "no handler for processing instruction");
            }
        }
        Ok(())
    }

    fn inconsistent(&self, descriptor: &TypeDescriptor, key: &str) -> BindError {
        BindError::Structural {
            message: format!(
                "registered member for \"{key}\" does not accept type {}",
                descriptor.instance_type_name()
            ),
            pos: self.pos,
        }
    }
}

impl Default for XmlBinder {
    fn default() -> Self {
        Self::new()
    }
}
