//! Fixtures: named, versioned, ordered event sequences

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::event::StreamEvent;
use crate::domain::types::{
    AuthorName, FixtureDescription, FixtureId, FixtureName, FixturePattern, FixtureVersion, Tag,
};

/// Descriptive metadata of a fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureMetadata {
    pub id: FixtureId,
    pub name: FixtureName,
    pub pattern: FixturePattern,
    pub description: FixtureDescription,
    pub event_count: usize,
    pub tags: BTreeSet<Tag>,
    pub version: FixtureVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorName>,
}

/// A named, versioned, ordered sequence of stream events
///
/// Invariants (enforced by [`crate::repository::FixtureRepository`] at
/// registration): `events.len() == metadata.event_count` and timestamps are
/// non-decreasing across the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub metadata: FixtureMetadata,
    pub events: Vec<StreamEvent>,
}

/// Optional metadata overrides for [`Fixture::create`]
#[derive(Debug, Clone, Default)]
pub struct FixtureOptions {
    pub name: Option<FixtureName>,
    pub pattern: Option<FixturePattern>,
    pub description: Option<FixtureDescription>,
    pub tags: BTreeSet<Tag>,
    pub version: Option<FixtureVersion>,
    pub author: Option<AuthorName>,
}

impl Fixture {
    /// Convenience constructor with defaults: name falls back to the
    /// id, pattern to "unknown", version to "1.0", description to the name,
    /// and the event count is taken from the sequence itself.
    pub fn create(id: FixtureId, events: Vec<StreamEvent>, options: FixtureOptions) -> Self {
        let name = options.name.unwrap_or_else(|| {
            FixtureName::try_new(id.as_ref().to_string()).expect("fixture id is non-empty")
        });
        let description = options.description.unwrap_or_else(|| {
            FixtureDescription::try_new(name.as_ref().to_string())
                .expect("fixture name is non-empty")
        });
        let metadata = FixtureMetadata {
            id,
            name,
            pattern: options.pattern.unwrap_or_else(FixturePattern::unknown),
            description,
            event_count: events.len(),
            tags: options.tags,
            version: options.version.unwrap_or_else(FixtureVersion::initial),
            author: options.author,
        };
        Self { metadata, events }
    }

    pub fn id(&self) -> &FixtureId {
        &self.metadata.id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{AnswerChunkData, EventPayload};
    use crate::domain::types::{EventId, EventTimestamp};

    fn chunk(id: &str, timestamp: f64, content: &str) -> StreamEvent {
        StreamEvent::new(
            EventId::try_new(id.to_string()).unwrap(),
            EventTimestamp::try_new(timestamp).unwrap(),
            EventPayload::AnswerChunk(AnswerChunkData {
                content: content.to_string(),
                is_final: false,
            }),
        )
    }

    #[test]
    fn create_applies_documented_defaults() {
        let id = FixtureId::try_new("greeting".to_string()).unwrap();
        let events = vec![chunk("e1", 1000.0, "hi"), chunk("e2", 1001.0, "there")];

        let fixture = Fixture::create(id, events, FixtureOptions::default());

        assert_eq!(fixture.metadata.name.as_ref(), "greeting");
        assert_eq!(fixture.metadata.pattern.as_ref(), "unknown");
        assert_eq!(fixture.metadata.version.as_ref(), "1.0");
        assert_eq!(fixture.metadata.event_count, 2);
        assert!(fixture.metadata.tags.is_empty());
        assert!(fixture.metadata.author.is_none());
    }

    #[test]
    fn create_honors_explicit_overrides() {
        let id = FixtureId::try_new("greeting".to_string()).unwrap();
        let mut tags = BTreeSet::new();
        tags.insert(Tag::try_new("demo".to_string()).unwrap());

        let fixture = Fixture::create(
            id,
            vec![chunk("e1", 1000.0, "hi")],
            FixtureOptions {
                name: Some(FixtureName::try_new("Greeting flow".to_string()).unwrap()),
                pattern: Some(FixturePattern::try_new("chat".to_string()).unwrap()),
                tags,
                ..FixtureOptions::default()
            },
        );

        assert_eq!(fixture.metadata.name.as_ref(), "Greeting flow");
        assert_eq!(fixture.metadata.pattern.as_ref(), "chat");
        assert_eq!(fixture.metadata.tags.len(), 1);
    }
}
