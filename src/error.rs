//! Error types for the binder.
//!
//! All parse-time errors carry the position (line, column) at which the
//! offending event was reported, plus the element, attribute or member
//! name involved. Registration errors abort only the registration call;
//! parse errors abort the entire parse.

use thiserror::Error;

use crate::event::Position;

/// Main error type for the binder library.
#[derive(Debug, Error)]
pub enum BindError {
    /// No type registered for an element and no default type set.
    #[error("{pos}: element <{element}> has no corresponding type")]
    UnknownElement { element: String, pos: Position },

    /// The instance factory for an element failed.
    #[error("{pos}: could not construct an instance for element <{element}>: {message}")]
    Construction {
        element: String,
        message: String,
        pos: Position,
    },

    /// A text element was given an attribute other than `value`.
    #[error("{pos}: text element <{element}> cannot have an attribute other than value (got \"{attribute}\")")]
    AttributeNotSupported {
        element: String,
        attribute: String,
        pos: Position,
    },

    /// No setter, adder or default-attach operation matched a member name
    /// and value shape.
    #[error("{pos}: type {type_name} has no member for \"{member}\" accepting {shape}")]
    UnsupportedMember {
        type_name: &'static str,
        member: String,
        shape: String,
        pos: Position,
    },

    /// A closed element could not be attached to its parent.
    #[error("{pos}: element <{parent}> cannot take child <{child}> of type {cast_type}")]
    UnsupportedChild {
        parent: String,
        child: String,
        cast_type: &'static str,
        pos: Position,
    },

    /// A text element received both a `value` attribute and text content.
    #[error("{pos}: text element <{element}> cannot have both an attribute value and text content")]
    ValueConflict { element: String, pos: Position },

    /// A registered binding does not produce values of the requested cast type.
    #[error("{pos}: class \"{class}\" produces {instance_type}, which is not usable as {cast_type}")]
    IncompatibleCast {
        class: String,
        instance_type: &'static str,
        cast_type: &'static str,
        pos: Position,
    },

    /// A mandatory attribute is absent from a mapping directive.
    #[error("{pos}: missing \"{attribute}\" attribute in \"mapping\" directive")]
    MissingAttribute {
        attribute: &'static str,
        pos: Position,
    },

    /// A mapping directive attribute has no closing quote.
    #[error("{pos}: {message}")]
    MalformedDirective { message: String, pos: Position },

    /// The event stream violated well-formed nesting, or an internal
    /// stack/registry invariant was broken.
    #[error("{pos}: {message}")]
    Structural { message: String, pos: Position },

    /// Type registration failed.
    #[error("{pos}: {name}: {message}")]
    Type {
        name: String,
        message: String,
        pos: Position,
    },

    /// A `process()` capability raised an error.
    #[error("{pos}: process failed for element <{element}>: {source}")]
    Process {
        element: String,
        pos: Position,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The underlying XML tokenizer rejected the input.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Result type alias for binder operations.
pub type Result<T> = std::result::Result<T, BindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_element_display() {
        let err = BindError::UnknownElement {
            element: "widget".to_string(),
            pos: Position { line: 3, column: 7 },
        };
        assert_eq!(
            err.to_string(),
            "3,7: element <widget> has no corresponding type"
        );
    }

    #[test]
    fn test_value_conflict_display() {
        let err = BindError::ValueConflict {
            element: "name".to_string(),
            pos: Position { line: 1, column: 1 },
        };
        assert!(err
            .to_string()
            .contains("both an attribute value and text content"));
    }

    #[test]
    fn test_unsupported_member_names_shape() {
        let err = BindError::UnsupportedMember {
            type_name: "Recipe",
            member: "flavour".to_string(),
            shape: "(String)".to_string(),
            pos: Position::default(),
        };
        assert!(err.to_string().contains("Recipe"));
        assert!(err.to_string().contains("flavour"));
        assert!(err.to_string().contains("(String)"));
    }
}
