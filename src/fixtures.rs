//! Built-in demo fixtures
//!
//! Canned event sequences the replay binary (and tests) register out of the
//! box, covering the chat-style reasoning flow and the table streaming
//! pattern.

use std::collections::BTreeSet;

use crate::domain::event::{
    AnswerChunkData, CheckpointData, ColumnSpec, ColumnType, EventPayload, MemoryEntryData,
    MemoryKind, ReasoningPhase, ReasoningStepData, StreamEvent, TableMetaData, TableRowData,
    TableSchemaData, ValidationResultData,
};
use crate::domain::fixture::{Fixture, FixtureOptions};
use crate::domain::types::{
    Confidence, EventId, EventTimestamp, FixtureDescription, FixtureId, FixtureName,
    FixturePattern, Progress, Tag,
};
use crate::error::Result;
use crate::repository::FixtureRepository;

// All demo events share one authored epoch so replays look contemporary
const BASE_TIMESTAMP: f64 = 1_700_000_000_000.0;

fn event(id: &str, offset_ms: f64, payload: EventPayload) -> StreamEvent {
    StreamEvent::new(
        EventId::try_new(id.to_string()).expect("demo event ids are non-empty"),
        EventTimestamp::try_new(BASE_TIMESTAMP + offset_ms)
            .expect("demo timestamps are positive and finite"),
        payload,
    )
}

fn reasoning(id: &str, offset_ms: f64, phase: ReasoningPhase, content: &str, confidence: f64) -> StreamEvent {
    event(
        id,
        offset_ms,
        EventPayload::ReasoningStep(ReasoningStepData {
            phase,
            content: content.to_string(),
            confidence: Confidence::try_new(confidence)
                .expect("demo confidences are within [0, 1]"),
        }),
    )
}

fn chunk(id: &str, offset_ms: f64, content: &str, is_final: bool) -> StreamEvent {
    event(
        id,
        offset_ms,
        EventPayload::AnswerChunk(AnswerChunkData {
            content: content.to_string(),
            is_final,
        }),
    )
}

/// Chat-style flow: reasoning steps, a remembered preference, streamed
/// answer chunks, a checkpoint, and a final validation verdict
pub fn reasoning_demo() -> Fixture {
    let events = vec![
        reasoning(
            "reason-1",
            0.0,
            ReasoningPhase::Observe,
            "The user asked for a summary of quarterly revenue.",
            0.95,
        ),
        reasoning(
            "reason-2",
            400.0,
            ReasoningPhase::Plan,
            "Outline: headline number, quarter-over-quarter change, one risk.",
            0.88,
        ),
        event(
            "memory-1",
            700.0,
            EventPayload::MemoryEntry(MemoryEntryData {
                kind: MemoryKind::Preference,
                content: "User prefers numbers stated before commentary.".to_string(),
            }),
        ),
        chunk("answer-1", 1100.0, "Revenue reached $4.2M this quarter, ", false),
        chunk("answer-2", 1500.0, "up 12% over Q2. ", false),
        event(
            "checkpoint-1",
            1800.0,
            EventPayload::Checkpoint(CheckpointData {
                label: "headline delivered".to_string(),
                progress: Progress::try_new(0.6).expect("demo progress is within [0, 1]"),
            }),
        ),
        chunk(
            "answer-3",
            2200.0,
            "The main risk is churn concentration in two accounts.",
            true,
        ),
        event(
            "validation-1",
            2600.0,
            EventPayload::ValidationResult(ValidationResultData {
                target: "answer".to_string(),
                passed: true,
                messages: vec![],
            }),
        ),
    ];

    let mut tags = BTreeSet::new();
    tags.insert(Tag::try_new("demo".to_string()).expect("demo tags are valid"));
    tags.insert(Tag::try_new("chat".to_string()).expect("demo tags are valid"));

    Fixture::create(
        FixtureId::try_new("reasoning-demo".to_string()).expect("fixture ids are non-empty"),
        events,
        FixtureOptions {
            name: Some(
                FixtureName::try_new("Reasoning and answer flow".to_string())
                    .expect("fixture names are non-empty"),
            ),
            pattern: Some(
                FixturePattern::try_new("chat".to_string()).expect("patterns are non-empty"),
            ),
            description: Some(
                FixtureDescription::try_new(
                    "Chat-style replay with visible reasoning, streamed answer chunks, and a validation verdict".to_string(),
                )
                .expect("descriptions are non-empty"),
            ),
            tags,
            ..FixtureOptions::default()
        },
    )
}

/// Table streaming pattern: schema first, then rows, then a summary
pub fn table_demo() -> Fixture {
    let events = vec![
        event(
            "schema-1",
            0.0,
            EventPayload::TableSchema(TableSchemaData {
                table: "top_accounts".to_string(),
                columns: vec![
                    ColumnSpec {
                        name: "account".to_string(),
                        data_type: ColumnType::String,
                    },
                    ColumnSpec {
                        name: "arr".to_string(),
                        data_type: ColumnType::Number,
                    },
                    ColumnSpec {
                        name: "renewed".to_string(),
                        data_type: ColumnType::Boolean,
                    },
                ],
            }),
        ),
        event(
            "row-1",
            500.0,
            EventPayload::TableRow(TableRowData {
                table: "top_accounts".to_string(),
                cells: vec!["Acme Corp".into(), 1_200_000.into(), true.into()],
            }),
        ),
        event(
            "row-2",
            1000.0,
            EventPayload::TableRow(TableRowData {
                table: "top_accounts".to_string(),
                cells: vec!["Globex".into(), 860_000.into(), false.into()],
            }),
        ),
        event(
            "row-3",
            1500.0,
            EventPayload::TableRow(TableRowData {
                table: "top_accounts".to_string(),
                cells: vec!["Initech".into(), 540_000.into(), true.into()],
            }),
        ),
        event(
            "meta-1",
            2000.0,
            EventPayload::TableMeta(TableMetaData {
                table: "top_accounts".to_string(),
                row_count: 3,
                note: Some("Sorted by annual recurring revenue".to_string()),
            }),
        ),
    ];

    let mut tags = BTreeSet::new();
    tags.insert(Tag::try_new("demo".to_string()).expect("demo tags are valid"));
    tags.insert(Tag::try_new("table".to_string()).expect("demo tags are valid"));

    Fixture::create(
        FixtureId::try_new("table-demo".to_string()).expect("fixture ids are non-empty"),
        events,
        FixtureOptions {
            name: Some(
                FixtureName::try_new("Streamed table".to_string())
                    .expect("fixture names are non-empty"),
            ),
            pattern: Some(
                FixturePattern::try_new("table".to_string()).expect("patterns are non-empty"),
            ),
            tags,
            ..FixtureOptions::default()
        },
    )
}

/// Register every built-in fixture
pub fn register_demo_fixtures(repository: &mut FixtureRepository) -> Result<()> {
    repository.register(reasoning_demo())?;
    repository.register(table_demo())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_fixtures_pass_registration_validation() {
        let mut repository = FixtureRepository::new();
        register_demo_fixtures(&mut repository).unwrap();

        let stats = repository.stats();
        assert_eq!(stats.fixture_count, 2);
        assert!(stats
            .patterns
            .contains(&FixturePattern::try_new("chat".to_string()).unwrap()));
    }

    #[test]
    fn demo_fixture_timestamps_are_non_decreasing() {
        for fixture in [reasoning_demo(), table_demo()] {
            let report = FixtureRepository::validate_fixture(&fixture);
            assert!(report.is_valid(), "errors: {:?}", report.errors);
        }
    }
}
