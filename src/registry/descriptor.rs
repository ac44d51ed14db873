//! Type descriptors and their typed builder.
//!
//! A [`TypeBinding`] is built against a concrete type `T` so every
//! attach function and cast is checked by the compiler; registration
//! erases it into a [`TypeDescriptor`] the engine can look up and
//! invoke dynamically.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::capability::Bindable;
use crate::naming::{adder_of, setter_of};

/// Error type produced by instance factories.
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

type Factory = Rc<dyn Fn() -> std::result::Result<Box<dyn Bindable>, FactoryError>>;
type CastFn = Rc<dyn Fn(Box<dyn Any>) -> Option<Box<dyn Any>>>;

// Erased attach functions. They return false when the target or value
// failed to downcast, which means the registry and the stack disagree
// about a type; the resolver surfaces that as a structural error.
pub(crate) type TextAttach = Rc<dyn Fn(&mut dyn Any, String) -> bool>;
pub(crate) type KeyedTextAttach = Rc<dyn Fn(&mut dyn Any, &str, String) -> bool>;
pub(crate) type ValueAttach = Rc<dyn Fn(&mut dyn Any, Box<dyn Any>) -> bool>;
pub(crate) type KeyedValueAttach = Rc<dyn Fn(&mut dyn Any, &str, Box<dyn Any>) -> bool>;

/// One named attach operation in a member table.
#[derive(Clone)]
pub(crate) enum Member {
    /// Accepts a single string parameter.
    Text(TextAttach),
    /// Accepts a single value of the declared parameter type.
    Value { param: TypeId, attach: ValueAttach },
}

/// Optional fallback attachment operations, tried after setters and
/// adders. The two-argument forms receive the attribute key or element
/// name alongside the value and take priority over the one-argument
/// forms.
#[derive(Clone, Default)]
pub(crate) struct DefaultAttach {
    pub(crate) keyed_text: Option<KeyedTextAttach>,
    pub(crate) text: Option<TextAttach>,
    pub(crate) keyed_value: Option<(TypeId, KeyedValueAttach)>,
    pub(crate) value: Option<(TypeId, ValueAttach)>,
}

/// Registered binding of an element name to a constructible type.
///
/// Immutable once registered; looked up by element name on every
/// element open and close.
#[derive(Clone)]
pub struct TypeDescriptor {
    factory: Factory,
    instance_type: TypeId,
    instance_type_name: &'static str,
    cast_type: TypeId,
    cast_type_name: &'static str,
    cast: Option<CastFn>,
    members: HashMap<String, Member>,
    default_attach: DefaultAttach,
}

impl TypeDescriptor {
    /// The concrete type the factory produces; member names resolve
    /// against its member table.
    #[must_use]
    pub fn instance_type(&self) -> TypeId {
        self.instance_type
    }

    #[must_use]
    pub fn instance_type_name(&self) -> &'static str {
        self.instance_type_name
    }

    /// The type ancestors see this element's value as.
    #[must_use]
    pub fn cast_type(&self) -> TypeId {
        self.cast_type
    }

    #[must_use]
    pub fn cast_type_name(&self) -> &'static str {
        self.cast_type_name
    }

    /// Whether this descriptor constructs the reserved text-leaf
    /// placeholder type (a plain string instance). A type merely cast
    /// to a string for its ancestors is not a text leaf.
    #[must_use]
    pub fn is_text_leaf(&self) -> bool {
        self.instance_type == TypeId::of::<String>()
    }

    pub(crate) fn instantiate(&self) -> std::result::Result<Box<dyn Bindable>, FactoryError> {
        (self.factory)()
    }

    pub(crate) fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub(crate) fn default_attach(&self) -> &DefaultAttach {
        &self.default_attach
    }

    /// Convert an instance into the value ancestors attach. Returns
    /// `None` only if the object matches neither the cast type nor the
    /// instance type, which indicates a broken registration.
    pub(crate) fn cast_value(&self, object: Box<dyn Bindable>) -> Option<Box<dyn Any>> {
        let any = object.into_any();
        if any.as_ref().type_id() == self.cast_type {
            return Some(any);
        }
        self.cast.as_ref().and_then(|cast| cast(any))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut members: Vec<&str> = self.members.keys().map(String::as_str).collect();
        members.sort_unstable();
        f.debug_struct("TypeDescriptor")
            .field("instance_type", &self.instance_type_name)
            .field("cast_type", &self.cast_type_name)
            .field("members", &members)
            .field(
                "default_attach",
                &(self.default_attach.keyed_text.is_some()
                    || self.default_attach.text.is_some()
                    || self.default_attach.keyed_value.is_some()
                    || self.default_attach.value.is_some()),
            )
            .finish()
    }
}

/// Typed builder for a [`TypeDescriptor`].
///
/// Member names follow the binding convention: `text_setter("name")`
/// registers the member resolved for attribute `name`, and
/// `child_adder::<V>("entry")` the member resolved for child element
/// `<entry>` carrying a value of cast type `V`.
pub struct TypeBinding<T: Bindable> {
    factory: Rc<dyn Fn() -> std::result::Result<T, FactoryError>>,
    members: HashMap<String, Member>,
    default_attach: DefaultAttach,
    cast_type: TypeId,
    cast_type_name: &'static str,
    cast: Option<CastFn>,
}

impl<T: Bindable + 'static> TypeBinding<T> {
    /// Binding for a type constructed via `Default`.
    #[must_use]
    pub fn of() -> Self
    where
        T: Default,
    {
        Self::with_factory(|| Ok(T::default()))
    }

    /// Binding for a type produced by a fallible factory.
    #[must_use]
    pub fn with_factory(
        factory: impl Fn() -> std::result::Result<T, FactoryError> + 'static,
    ) -> Self {
        Self {
            factory: Rc::new(factory),
            members: HashMap::new(),
            default_attach: DefaultAttach::default(),
            cast_type: TypeId::of::<T>(),
            cast_type_name: type_name::<T>(),
            cast: None,
        }
    }

    /// Register the setter-like member for attribute or element `key`.
    #[must_use]
    pub fn text_setter(self, key: &str, f: impl Fn(&mut T, String) + 'static) -> Self {
        self.text_member(setter_of(key), f)
    }

    /// Register the adder-like member for attribute or element `key`.
    #[must_use]
    pub fn text_adder(self, key: &str, f: impl Fn(&mut T, String) + 'static) -> Self {
        self.text_member(adder_of(key), f)
    }

    /// Register the setter-like member for child element `key` carrying
    /// a value of cast type `V`.
    #[must_use]
    pub fn child_setter<V: 'static>(self, key: &str, f: impl Fn(&mut T, V) + 'static) -> Self {
        self.value_member(setter_of(key), f)
    }

    /// Register the adder-like member for child element `key` carrying
    /// a value of cast type `V`.
    #[must_use]
    pub fn child_adder<V: 'static>(self, key: &str, f: impl Fn(&mut T, V) + 'static) -> Self {
        self.value_member(adder_of(key), f)
    }

    /// Fallback for attributes no member matches: receives the
    /// attribute key and its substituted value.
    #[must_use]
    pub fn default_attach_keyed_text(
        mut self,
        f: impl Fn(&mut T, &str, String) + 'static,
    ) -> Self {
        self.default_attach.keyed_text = Some(Rc::new(move |target, key, value| {
            match target.downcast_mut::<T>() {
                Some(t) => {
                    f(t, key, value);
                    true
                }
                None => false,
            }
        }));
        self
    }

    /// Fallback for attributes no member matches: receives only the
    /// substituted value.
    #[must_use]
    pub fn default_attach_text(mut self, f: impl Fn(&mut T, String) + 'static) -> Self {
        self.default_attach.text = Some(erase_text(f));
        self
    }

    /// Fallback for children no member matches: receives the element
    /// name and the child value.
    #[must_use]
    pub fn default_attach_keyed_value<V: 'static>(
        mut self,
        f: impl Fn(&mut T, &str, V) + 'static,
    ) -> Self {
        self.default_attach.keyed_value = Some((
            TypeId::of::<V>(),
            Rc::new(move |target, key, value| {
                let Some(t) = target.downcast_mut::<T>() else {
                    return false;
                };
                match value.downcast::<V>() {
                    Ok(v) => {
                        f(t, key, *v);
                        true
                    }
                    Err(_) => false,
                }
            }),
        ));
        self
    }

    /// Fallback for children no member matches: receives only the child
    /// value.
    #[must_use]
    pub fn default_attach_value<V: 'static>(mut self, f: impl Fn(&mut T, V) + 'static) -> Self {
        self.default_attach.value = Some((TypeId::of::<V>(), erase_value(f)));
        self
    }

    /// Declare the type ancestors see this element's value as.
    ///
    /// The conversion is total, so instance-to-cast compatibility is a
    /// compile-time fact on this path.
    #[must_use]
    pub fn with_cast<U: Any>(mut self, cast: impl Fn(T) -> U + 'static) -> Self {
        self.cast_type = TypeId::of::<U>();
        self.cast_type_name = type_name::<U>();
        self.cast = Some(Rc::new(move |any| {
            any.downcast::<T>()
                .ok()
                .map(|t| Box::new(cast(*t)) as Box<dyn Any>)
        }));
        self
    }

    fn text_member(mut self, name: String, f: impl Fn(&mut T, String) + 'static) -> Self {
        self.members.insert(name, Member::Text(erase_text(f)));
        self
    }

    fn value_member<V: 'static>(mut self, name: String, f: impl Fn(&mut T, V) + 'static) -> Self {
        self.members.insert(
            name,
            Member::Value {
                param: TypeId::of::<V>(),
                attach: erase_value(f),
            },
        );
        self
    }
}

impl<T: Bindable + 'static> From<TypeBinding<T>> for TypeDescriptor {
    fn from(binding: TypeBinding<T>) -> Self {
        let factory = binding.factory;
        Self {
            factory: Rc::new(move || factory().map(|v| Box::new(v) as Box<dyn Bindable>)),
            instance_type: TypeId::of::<T>(),
            instance_type_name: type_name::<T>(),
            cast_type: binding.cast_type,
            cast_type_name: binding.cast_type_name,
            cast: binding.cast,
            members: binding.members,
            default_attach: binding.default_attach,
        }
    }
}

/// Binding for the reserved text-leaf placeholder type: a plain string
/// value bound via the `value` attribute or element text content.
#[must_use]
pub fn text_leaf() -> TypeBinding<String> {
    TypeBinding::of()
}

fn erase_text<T: 'static>(f: impl Fn(&mut T, String) + 'static) -> TextAttach {
    Rc::new(move |target, value| match target.downcast_mut::<T>() {
        Some(t) => {
            f(t, value);
            true
        }
        None => false,
    })
}

fn erase_value<T: 'static, V: 'static>(f: impl Fn(&mut T, V) + 'static) -> ValueAttach {
    Rc::new(move |target, value| {
        let Some(t) = target.downcast_mut::<T>() else {
            return false;
        };
        match value.downcast::<V>() {
            Ok(v) => {
                f(t, *v);
                true
            }
            Err(_) => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Widget {
        label: String,
    }

    impl Bindable for Widget {}

    #[test]
    fn test_descriptor_types() {
        let descriptor: TypeDescriptor = TypeBinding::<Widget>::of().into();
        assert_eq!(descriptor.instance_type(), TypeId::of::<Widget>());
        assert_eq!(descriptor.cast_type(), TypeId::of::<Widget>());
        assert!(!descriptor.is_text_leaf());
    }

    #[test]
    fn test_text_leaf_descriptor() {
        let descriptor: TypeDescriptor = text_leaf().into();
        assert!(descriptor.is_text_leaf());
        assert_eq!(descriptor.instance_type(), TypeId::of::<String>());
    }

    #[test]
    fn test_cast_to_string_is_not_a_text_leaf() {
        let descriptor: TypeDescriptor = TypeBinding::<Widget>::of()
            .with_cast::<String>(|w| w.label)
            .into();
        assert_eq!(descriptor.cast_type(), TypeId::of::<String>());
        assert!(!descriptor.is_text_leaf());
    }

    #[test]
    fn test_member_names_follow_convention() {
        let descriptor: TypeDescriptor = TypeBinding::<Widget>::of()
            .text_setter("label", |w, v| w.label = v)
            .child_adder::<Widget>("part", |_, _| {})
            .into();

        assert!(descriptor.member("setLabel").is_some());
        assert!(descriptor.member("addPart").is_some());
        assert!(descriptor.member("setPart").is_none());
    }

    #[test]
    fn test_instantiate_uses_factory() {
        let descriptor: TypeDescriptor = TypeBinding::<Widget>::with_factory(|| {
            Ok(Widget {
                label: "built".to_string(),
            })
        })
        .into();

        let object = descriptor.instantiate().unwrap();
        let widget = object.into_any().downcast::<Widget>().unwrap();
        assert_eq!(widget.label, "built");
    }

    #[test]
    fn test_failing_factory() {
        let descriptor: TypeDescriptor =
            TypeBinding::<Widget>::with_factory(|| Err("out of widgets".into())).into();
        let Err(err) = descriptor.instantiate() else {
            panic!("factory failure must propagate");
        };
        assert_eq!(err.to_string(), "out of widgets");
    }

    #[test]
    fn test_cast_value_identity() {
        let descriptor: TypeDescriptor = TypeBinding::<Widget>::of().into();
        let value = descriptor
            .cast_value(Box::new(Widget {
                label: "x".to_string(),
            }))
            .unwrap();
        assert!(value.downcast::<Widget>().is_ok());
    }

    #[test]
    fn test_cast_value_converts() {
        let descriptor: TypeDescriptor = TypeBinding::<Widget>::of()
            .with_cast::<String>(|w| w.label)
            .into();
        assert_eq!(descriptor.cast_type(), TypeId::of::<String>());

        let value = descriptor
            .cast_value(Box::new(Widget {
                label: "casted".to_string(),
            }))
            .unwrap();
        assert_eq!(*value.downcast::<String>().unwrap(), "casted");
    }

    #[test]
    fn test_cast_value_accepts_already_cast_object() {
        // a text-leaf replaced by its value attribute is already a String
        let descriptor: TypeDescriptor = text_leaf().into();
        let value = descriptor
            .cast_value(Box::new("plain".to_string()))
            .unwrap();
        assert_eq!(*value.downcast::<String>().unwrap(), "plain");
    }
}
