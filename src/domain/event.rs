//! Stream event definitions
//!
//! This module defines the tagged union of event payloads a fixture may
//! contain, plus the enriched form a session emits. Fixture JSON uses the
//! wire shape `{"id", "timestamp", "sessionId"?, "type", "data"}`; the
//! payload enum is adjacently tagged to match.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{
    Confidence, EventId, EventTimestamp, Progress, SequenceNumber, SessionId,
};

/// Phase of a reasoning step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningPhase {
    Observe,
    Hypothesize,
    Plan,
    Act,
    Reflect,
}

/// Category of a memory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Fact,
    Preference,
    Context,
    Correction,
}

/// Kind of user input a stream requests or replays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Choice,
    Confirm,
}

/// Column data type in a streamed table schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Boolean,
    Date,
}

/// Operation of a JSON patch event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    Add,
    Remove,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningStepData {
    pub phase: ReasoningPhase,
    pub content: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerChunkData {
    pub content: String,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntryData {
    pub kind: MemoryKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRequestData {
    pub prompt: String,
    pub input_kind: InputKind,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSubmissionData {
    pub value: String,
    pub input_kind: InputKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointData {
    pub label: String,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResultData {
    pub target: String,
    pub passed: bool,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchemaData {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRowData {
    pub table: String,
    pub cells: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetaData {
    pub table: String,
    pub row_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffPatchData {
    pub target: String,
    pub diff: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPatchData {
    pub pointer: String,
    pub operation: PatchOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub field_type: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinitionData {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaPayloadData {
    pub schema: String,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaErrorData {
    pub schema: String,
    pub field: String,
    pub message: String,
}

/// All event payload variants a fixture may contain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    ReasoningStep(ReasoningStepData),
    AnswerChunk(AnswerChunkData),
    MemoryEntry(MemoryEntryData),
    InputRequest(InputRequestData),
    InputSubmission(InputSubmissionData),
    Checkpoint(CheckpointData),
    ValidationResult(ValidationResultData),
    TableSchema(TableSchemaData),
    TableRow(TableRowData),
    TableMeta(TableMetaData),
    DiffPatch(DiffPatchData),
    JsonPatch(JsonPatchData),
    SchemaDefinition(SchemaDefinitionData),
    SchemaPayload(SchemaPayloadData),
    SchemaError(SchemaErrorData),
}

impl EventPayload {
    /// The wire-format type tag of this payload
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::ReasoningStep(_) => "reasoning_step",
            EventPayload::AnswerChunk(_) => "answer_chunk",
            EventPayload::MemoryEntry(_) => "memory_entry",
            EventPayload::InputRequest(_) => "input_request",
            EventPayload::InputSubmission(_) => "input_submission",
            EventPayload::Checkpoint(_) => "checkpoint",
            EventPayload::ValidationResult(_) => "validation_result",
            EventPayload::TableSchema(_) => "table_schema",
            EventPayload::TableRow(_) => "table_row",
            EventPayload::TableMeta(_) => "table_meta",
            EventPayload::DiffPatch(_) => "diff_patch",
            EventPayload::JsonPatch(_) => "json_patch",
            EventPayload::SchemaDefinition(_) => "schema_definition",
            EventPayload::SchemaPayload(_) => "schema_payload",
            EventPayload::SchemaError(_) => "schema_error",
        }
    }
}

/// One event of a fixture's ordered sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub id: EventId,
    pub timestamp: EventTimestamp,
    #[serde(
        rename = "sessionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<SessionId>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl StreamEvent {
    pub fn new(id: EventId, timestamp: EventTimestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            session_id: None,
            payload,
        }
    }
}

/// Source of an emitted event; replayed streams always report `mock`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Mock,
}

/// Session-scoped metadata attached to emitted events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentMetadata {
    pub source: EventSource,
    pub session_id: SessionId,
    pub sequence_number: SequenceNumber,
}

/// The item type a session emits
///
/// `metadata` is `None` when the session was created with enrichment
/// disabled; otherwise it carries the session id and a 1-based, strictly
/// increasing sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedStreamEvent {
    #[serde(flatten)]
    pub event: StreamEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EnrichmentMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> StreamEvent {
        StreamEvent::new(
            EventId::try_new("evt-1".to_string()).unwrap(),
            EventTimestamp::try_new(1_700_000_000_000.0).unwrap(),
            EventPayload::ReasoningStep(ReasoningStepData {
                phase: ReasoningPhase::Plan,
                content: "outline the answer".to_string(),
                confidence: Confidence::try_new(0.8).unwrap(),
            }),
        )
    }

    #[test]
    fn events_serialize_to_the_wire_shape() {
        let value = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(value["id"], json!("evt-1"));
        assert_eq!(value["type"], json!("reasoning_step"));
        assert_eq!(value["data"]["phase"], json!("plan"));
        assert_eq!(value["data"]["confidence"], json!(0.8));
        assert!(value.get("sessionId").is_none());
    }

    #[test]
    fn events_round_trip_through_the_wire_shape() {
        let event = sample_event();
        let value = serde_json::to_value(&event).unwrap();
        let back: StreamEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn payload_kind_matches_serde_tag() {
        let event = sample_event();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!(event.payload.kind()));
    }

    #[test]
    fn deserialization_rejects_out_of_range_confidence() {
        let value = json!({
            "id": "evt-1",
            "timestamp": 1000.0,
            "type": "reasoning_step",
            "data": { "phase": "plan", "content": "x", "confidence": 1.5 }
        });
        assert!(serde_json::from_value::<StreamEvent>(value).is_err());
    }

    #[test]
    fn enriched_events_flatten_the_inner_event() {
        let enriched = EnrichedStreamEvent {
            event: sample_event(),
            metadata: Some(EnrichmentMetadata {
                source: EventSource::Mock,
                session_id: SessionId::try_new("mock-abc".to_string()).unwrap(),
                sequence_number: SequenceNumber::first(),
            }),
        };
        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["id"], json!("evt-1"));
        assert_eq!(value["metadata"]["source"], json!("mock"));
        assert_eq!(value["metadata"]["sequenceNumber"], json!(1));
    }
}
