//! Interpreter for the one recognized processing instruction,
//! `<?mapping …?>`.
//!
//! The payload is searched by substring, not tokenized: up to four
//! quoted `name="value"` fragments are recognized. A `defaultclass`
//! fragment wins outright; otherwise `element` and `class` are
//! mandatory and `cast` is optional. Registrations only affect
//! elements parsed after the directive.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{BindError, Result};
use crate::event::Position;
use crate::registry::TypeRegistry;

const MAPPING_TARGET: &str = "mapping";

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DEFAULTCLASS_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"defaultclass="([^"]*)""#).expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ELEMENT_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"element="([^"]*)""#).expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CLASS_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class="([^"]*)""#).expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CAST_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"cast="([^"]*)""#).expect("valid regex"));

/// Whether a processing instruction is a mapping directive.
///
/// Event models that report no distinct target prefix the payload with
/// the target literal instead.
pub(crate) fn is_mapping(target: Option<&str>, data: &str) -> bool {
    match target {
        Some(target) => target == MAPPING_TARGET,
        None => data.starts_with(MAPPING_TARGET),
    }
}

/// Apply a mapping directive to the registry.
///
/// # Errors
/// - [`BindError::MalformedDirective`] for a fragment with no closing quote
/// - [`BindError::MissingAttribute`] when `element` or `class` is absent
/// - [`BindError::Type`] for a class name with no registered binding
/// - [`BindError::IncompatibleCast`] when `cast` names a type the
///   element class does not produce
pub(crate) fn apply(registry: &mut TypeRegistry, data: &str, pos: Position) -> Result<()> {
    if let Some(class) = fragment(data, "defaultclass", &DEFAULTCLASS_FRAGMENT, pos)? {
        let descriptor = registry
            .lookup_class(&class)
            .cloned()
            .ok_or_else(|| unknown_class(&class, pos))?;
        registry.register_default(descriptor);
        return Ok(());
    }

    let element = fragment(data, "element", &ELEMENT_FRAGMENT, pos)?
        .ok_or(BindError::MissingAttribute {
            attribute: "element",
            pos,
        })?;
    let class = fragment(data, "class", &CLASS_FRAGMENT, pos)?
        .ok_or(BindError::MissingAttribute {
            attribute: "class",
            pos,
        })?;
    let cast = fragment(data, "cast", &CAST_FRAGMENT, pos)?;

    let descriptor = registry
        .lookup_class(&class)
        .cloned()
        .ok_or_else(|| unknown_class(&class, pos))?;

    if let Some(cast_name) = cast {
        let cast_descriptor = registry
            .lookup_class(&cast_name)
            .cloned()
            .ok_or_else(|| unknown_class(&cast_name, pos))?;
        if cast_descriptor.instance_type() != descriptor.cast_type() {
            return Err(BindError::IncompatibleCast {
                class,
                instance_type: descriptor.instance_type_name(),
                cast_type: cast_descriptor.instance_type_name(),
                pos,
            });
        }
    }

    registry.register(element, descriptor)
}

fn fragment(data: &str, name: &str, pattern: &Regex, pos: Position) -> Result<Option<String>> {
    if let Some(caps) = pattern.captures(data) {
        return Ok(Some(caps[1].to_string()));
    }
    if data.contains(&format!("{name}=\"")) {
        return Err(BindError::MalformedDirective {
            message: format!("\"{name}\" attribute in \"mapping\" directive is not quoted"),
            pos,
        });
    }
    Ok(None)
}

fn unknown_class(class: &str, pos: Position) -> BindError {
    BindError::Type {
        name: class.to_string(),
        message: "no binding registered for class".to_string(),
        pos,
    }
}
