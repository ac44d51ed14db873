//! Event-source adapter over `roxmltree` documents.
//!
//! The engine never touches `roxmltree` types directly; this module
//! flattens a parsed document into the [`XmlEvent`] stream, preserving
//! document order and translating byte offsets into line/column
//! positions.

use std::collections::VecDeque;

use roxmltree::{Document, Node, NodeType};

use crate::error::Result;
use crate::event::{EventSource, Position, XmlEvent};

/// Pull source of events flattened from a parsed document.
pub struct DocumentEvents {
    events: VecDeque<XmlEvent>,
}

impl DocumentEvents {
    /// Flatten `doc` into an owned event queue.
    #[must_use]
    pub fn new(doc: &Document<'_>) -> Self {
        let mut events = VecDeque::new();
        for child in doc.root().children() {
            flatten(doc, child, &mut events);
        }
        Self { events }
    }

    /// Number of events not yet consumed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether all events were consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for DocumentEvents {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        Ok(self.events.pop_front())
    }
}

fn position_at(doc: &Document<'_>, offset: usize) -> Position {
    let pos = doc.text_pos_at(offset);
    Position {
        line: pos.row,
        column: pos.col,
    }
}

fn flatten(doc: &Document<'_>, node: Node<'_, '_>, out: &mut VecDeque<XmlEvent>) {
    match node.node_type() {
        NodeType::Element => {
            out.push_back(XmlEvent::StartElement {
                name: node.tag_name().name().to_string(),
                attributes: node
                    .attributes()
                    .map(|a| (a.name().to_string(), a.value().to_string()))
                    .collect(),
                pos: position_at(doc, node.range().start),
            });
            for child in node.children() {
                flatten(doc, child, out);
            }
            out.push_back(XmlEvent::EndElement {
                name: node.tag_name().name().to_string(),
                pos: position_at(doc, node.range().end),
            });
        }
        NodeType::Text => {
            if let Some(text) = node.text() {
                out.push_back(XmlEvent::Characters {
                    text: text.to_string(),
                    pos: position_at(doc, node.range().start),
                });
            }
        }
        NodeType::PI => {
            if let Some(pi) = node.pi() {
                out.push_back(XmlEvent::ProcessingInstruction {
                    target: Some(pi.target.to_string()),
                    data: pi.value.unwrap_or_default().to_string(),
                    pos: position_at(doc, node.range().start),
                });
            }
        }
        NodeType::Root | NodeType::Comment => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events_of(xml: &str) -> Vec<XmlEvent> {
        let doc = Document::parse(xml).unwrap();
        let mut source = DocumentEvents::new(&doc);
        let mut events = Vec::new();
        while let Some(event) = source.next_event().unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_flatten_nested_elements() {
        let events = events_of("<a x=\"1\"><b>t</b></a>");
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                XmlEvent::StartElement { .. } => "start",
                XmlEvent::Characters { .. } => "chars",
                XmlEvent::EndElement { .. } => "end",
                XmlEvent::ProcessingInstruction { .. } => "pi",
            })
            .collect();
        assert_eq!(kinds, ["start", "start", "chars", "end", "end"]);

        match &events[0] {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                assert_eq!(name, "a");
                assert_eq!(attributes, &[("x".to_string(), "1".to_string())]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_attribute_document_order() {
        let events = events_of("<a first=\"1\" second=\"2\" third=\"3\"/>");
        match &events[0] {
            XmlEvent::StartElement { attributes, .. } => {
                let keys: Vec<&str> = attributes.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["first", "second", "third"]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_processing_instruction() {
        let events = events_of("<a><?mapping element=\"x\" class=\"y\"?></a>");
        match &events[1] {
            XmlEvent::ProcessingInstruction { target, data, .. } => {
                assert_eq!(target.as_deref(), Some("mapping"));
                assert_eq!(data, "element=\"x\" class=\"y\"");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_positions_are_line_and_column() {
        let events = events_of("<a>\n  <b/>\n</a>");
        match &events[1] {
            XmlEvent::StartElement { name, pos, .. } => {
                assert_eq!(name, "b");
                assert_eq!(pos.line, 2);
                assert_eq!(pos.column, 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_comments_are_dropped() {
        let events = events_of("<a><!-- note --></a>");
        assert_eq!(events.len(), 2);
    }
}
