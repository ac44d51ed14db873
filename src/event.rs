//! Markup event model consumed by the parse engine.
//!
//! The tokenizer is an external collaborator; the engine only sees the
//! four event kinds below, delivered in well-formed (properly nested)
//! order. [`crate::xml::DocumentEvents`] adapts a `roxmltree` document
//! to this model.

use std::collections::VecDeque;
use std::fmt;

use crate::error::Result;

/// Line and column of an event in the source document, 1-based where
/// the tokenizer reports positions, `0,0` otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.column)
    }
}

/// One markup parse event.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    /// An element opened, with its attributes in document order.
    StartElement {
        name: String,
        attributes: Vec<(String, String)>,
        pos: Position,
    },
    /// A chunk of character data.
    Characters { text: String, pos: Position },
    /// An element closed.
    EndElement { name: String, pos: Position },
    /// A processing instruction. Event models that report no distinct
    /// target leave `target` as `None` and prefix the payload with it.
    ProcessingInstruction {
        target: Option<String>,
        data: String,
        pos: Position,
    },
}

/// Pull source of markup events.
pub trait EventSource {
    /// Produce the next event, or `None` once the stream is exhausted.
    ///
    /// # Errors
    /// Propagates tokenizer failures as [`crate::BindError`].
    fn next_event(&mut self) -> Result<Option<XmlEvent>>;
}

/// Pre-recorded event streams, mainly useful in tests.
impl EventSource for VecDeque<XmlEvent> {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        Ok(self.pop_front())
    }
}
