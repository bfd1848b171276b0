//! Package relationship parsing.

use super::xml::{attribute, fragment_reader};
use crate::model::{MediaContext, Relationship, RelationshipKind};
use quick_xml::events::{BytesStart, Event};

/// Classify a relationship type URI.
pub fn classify(rel_type: &str) -> Option<RelationshipKind> {
    if rel_type.contains("/image") {
        Some(RelationshipKind::Image)
    } else if rel_type.contains("/oleObject") || rel_type.contains("/package") {
        Some(RelationshipKind::EmbeddedObject)
    } else {
        None
    }
}

/// Parse a relationships part into image and embedded-object relationships.
///
/// Entries of other types, or missing an id, target or type, are skipped.
/// Reading stops at the first malformed tag.
pub fn parse_relationships(xml: &str) -> Vec<Relationship> {
    let mut reader = fragment_reader(xml);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                relationships.extend(read_relationship(&e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Malformed relationships part: {}", e);
                break;
            }
            Ok(_) => {}
        }
    }

    relationships
}

fn read_relationship(tag: &BytesStart<'_>) -> Option<Relationship> {
    let id = attribute(tag, "Id")?;
    let target = attribute(tag, "Target")?;
    let kind = classify(&attribute(tag, "Type")?)?;
    Some(Relationship::new(id, &target, kind))
}

impl MediaContext {
    /// Create a context from a relationships part.
    pub fn from_relationships_xml(xml: &str) -> Self {
        let relationships = parse_relationships(xml);
        log::debug!("Parsed {} media relationships", relationships.len());
        MediaContext::new().with_relationships(relationships)
    }
}
