//! Binding resolver: picks and invokes the attach operation for a
//! member name and value shape.
//!
//! Resolution order is a design contract: setter before adder before
//! default-attach (two-argument form before one-argument form).
//! Setters taking priority keeps repeated attribute application
//! idempotent while adders remain available for accumulation.

use std::any::Any;

use crate::capability::Bindable;
use crate::naming::{adder_of, setter_of};

use super::descriptor::{
    KeyedTextAttach, KeyedValueAttach, Member, TextAttach, TypeDescriptor, ValueAttach,
};

/// The value being attached, with its shape.
pub(crate) enum BindValue {
    /// A single string parameter (substituted attribute value).
    Text(String),
    /// A single value of the child's cast type.
    Child {
        value: Box<dyn Any>,
        type_name: &'static str,
    },
}

impl BindValue {
    /// Human-readable parameter shape for error messages.
    pub(crate) fn shape(&self) -> String {
        match self {
            BindValue::Text(_) => "(String)".to_string(),
            BindValue::Child { type_name, .. } => format!("({type_name})"),
        }
    }
}

/// Why a bind attempt did not complete.
pub(crate) enum BindFailure {
    /// No member or default-attach operation matched the name and shape.
    NoMatch,
    /// A matched operation rejected the target or value type; the
    /// registry and the stack disagree about a type.
    Inconsistent,
}

enum Chosen {
    Text(TextAttach),
    KeyedText(KeyedTextAttach),
    Value(ValueAttach),
    KeyedValue(KeyedValueAttach),
}

/// Resolve the best-matching attach operation on `descriptor`'s member
/// table and invoke it against `target`.
///
/// `member_base` derives the setter/adder candidate names;
/// `attach_key` is handed to two-argument default-attach forms (the
/// attribute key, or the child's element name).
pub(crate) fn bind_member(
    target: &mut dyn Bindable,
    descriptor: &TypeDescriptor,
    member_base: &str,
    attach_key: &str,
    value: BindValue,
) -> std::result::Result<(), BindFailure> {
    let setter = setter_of(member_base);
    let adder = adder_of(member_base);

    let mut chosen: Option<Chosen> = None;
    for name in [&setter, &adder] {
        match (descriptor.member(name), &value) {
            (Some(Member::Text(attach)), BindValue::Text(_)) => {
                chosen = Some(Chosen::Text(attach.clone()));
                break;
            }
            (Some(Member::Value { param, attach }), BindValue::Child { value, .. })
                if *param == value.as_ref().type_id() =>
            {
                chosen = Some(Chosen::Value(attach.clone()));
                break;
            }
            // a member with the right name but the wrong shape is not a match
            _ => {}
        }
    }

    if chosen.is_none() {
        let defaults = descriptor.default_attach();
        chosen = match &value {
            BindValue::Text(_) => defaults
                .keyed_text
                .clone()
                .map(Chosen::KeyedText)
                .or_else(|| defaults.text.clone().map(Chosen::Text)),
            BindValue::Child { value, .. } => {
                let type_id = value.as_ref().type_id();
                defaults
                    .keyed_value
                    .as_ref()
                    .filter(|(param, _)| *param == type_id)
                    .map(|(_, attach)| Chosen::KeyedValue(attach.clone()))
                    .or_else(|| {
                        defaults
                            .value
                            .as_ref()
                            .filter(|(param, _)| *param == type_id)
                            .map(|(_, attach)| Chosen::Value(attach.clone()))
                    })
            }
        };
    }

    let Some(chosen) = chosen else {
        return Err(BindFailure::NoMatch);
    };

    let bound = match (chosen, value) {
        (Chosen::Text(attach), BindValue::Text(text)) => attach(target.as_any_mut(), text),
        (Chosen::KeyedText(attach), BindValue::Text(text)) => {
            attach(target.as_any_mut(), attach_key, text)
        }
        (Chosen::Value(attach), BindValue::Child { value, .. }) => {
            attach(target.as_any_mut(), value)
        }
        (Chosen::KeyedValue(attach), BindValue::Child { value, .. }) => {
            attach(target.as_any_mut(), attach_key, value)
        }
        _ => false,
    };

    if bound {
        Ok(())
    } else {
        Err(BindFailure::Inconsistent)
    }
}
