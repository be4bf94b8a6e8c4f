//! Runtime validation of untyped fixture data
//!
//! Fixture JSON is not compile-time checked, so this module validates the
//! wire shape before anything crosses into the typed event model. Checks
//! aggregate every violated field with a readable reason instead of failing
//! on the first error; [`parse_event`] and [`parse_fixture`] are the only
//! doors from `serde_json::Value` into [`StreamEvent`] / [`Fixture`].

use serde_json::{Map, Value};

use crate::domain::event::StreamEvent;
use crate::domain::fixture::Fixture;
use crate::error::{Error, FieldError, Result};

const REASONING_PHASES: &[&str] = &["observe", "hypothesize", "plan", "act", "reflect"];
const MEMORY_KINDS: &[&str] = &["fact", "preference", "context", "correction"];
const INPUT_KINDS: &[&str] = &["text", "choice", "confirm"];
const COLUMN_TYPES: &[&str] = &["string", "number", "boolean", "date"];
const PATCH_OPERATIONS: &[&str] = &["add", "remove", "replace"];

const EVENT_TYPES: &[&str] = &[
    "reasoning_step",
    "answer_chunk",
    "memory_entry",
    "input_request",
    "input_submission",
    "checkpoint",
    "validation_result",
    "table_schema",
    "table_row",
    "table_meta",
    "diff_patch",
    "json_patch",
    "schema_definition",
    "schema_payload",
    "schema_error",
];

/// Aggregated outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(FieldError::new(field, reason));
    }

    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(self.errors))
        }
    }
}

fn path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn require_string<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    prefix: &str,
    report: &mut ValidationReport,
) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            report.push(path(prefix, key), "must be a string");
            None
        }
        None => {
            report.push(path(prefix, key), "is required");
            None
        }
    }
}

fn require_nonempty_string<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    prefix: &str,
    report: &mut ValidationReport,
) -> Option<&'a str> {
    let value = require_string(obj, key, prefix, report)?;
    if value.is_empty() {
        report.push(path(prefix, key), "must not be empty");
        None
    } else {
        Some(value)
    }
}

fn require_bool(obj: &Map<String, Value>, key: &str, prefix: &str, report: &mut ValidationReport) {
    match obj.get(key) {
        Some(Value::Bool(_)) => {}
        Some(_) => report.push(path(prefix, key), "must be a boolean"),
        None => report.push(path(prefix, key), "is required"),
    }
}

fn require_number(
    obj: &Map<String, Value>,
    key: &str,
    prefix: &str,
    report: &mut ValidationReport,
) -> Option<f64> {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => {
            report.push(path(prefix, key), "must be a number");
            None
        }
        None => {
            report.push(path(prefix, key), "is required");
            None
        }
    }
}

fn require_unit_interval(
    obj: &Map<String, Value>,
    key: &str,
    prefix: &str,
    report: &mut ValidationReport,
) {
    if let Some(n) = require_number(obj, key, prefix, report) {
        if !n.is_finite() || !(0.0..=1.0).contains(&n) {
            report.push(path(prefix, key), "must be a number between 0 and 1");
        }
    }
}

fn require_membership(
    obj: &Map<String, Value>,
    key: &str,
    allowed: &[&str],
    prefix: &str,
    report: &mut ValidationReport,
) {
    if let Some(value) = require_string(obj, key, prefix, report) {
        if !allowed.contains(&value) {
            report.push(
                path(prefix, key),
                format!("must be one of [{}]", allowed.join(", ")),
            );
        }
    }
}

fn require_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    prefix: &str,
    report: &mut ValidationReport,
) -> Option<&'a Vec<Value>> {
    match obj.get(key) {
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            report.push(path(prefix, key), "must be an array");
            None
        }
        None => {
            report.push(path(prefix, key), "is required");
            None
        }
    }
}

fn optional_string_array(
    obj: &Map<String, Value>,
    key: &str,
    prefix: &str,
    report: &mut ValidationReport,
) {
    if let Some(Value::Array(items)) = obj.get(key) {
        for (index, item) in items.iter().enumerate() {
            if !item.is_string() {
                report.push(
                    format!("{}[{index}]", path(prefix, key)),
                    "must be a string",
                );
            }
        }
    } else if obj.get(key).is_some() {
        report.push(path(prefix, key), "must be an array of strings");
    }
}

fn check_reasoning_step(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_membership(data, "phase", REASONING_PHASES, prefix, report);
    require_string(data, "content", prefix, report);
    require_unit_interval(data, "confidence", prefix, report);
}

fn check_answer_chunk(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_string(data, "content", prefix, report);
    require_bool(data, "isFinal", prefix, report);
}

fn check_memory_entry(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_membership(data, "kind", MEMORY_KINDS, prefix, report);
    require_string(data, "content", prefix, report);
}

fn check_input_request(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "prompt", prefix, report);
    require_membership(data, "inputKind", INPUT_KINDS, prefix, report);
    optional_string_array(data, "options", prefix, report);
}

fn check_input_submission(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_string(data, "value", prefix, report);
    require_membership(data, "inputKind", INPUT_KINDS, prefix, report);
}

fn check_checkpoint(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "label", prefix, report);
    require_unit_interval(data, "progress", prefix, report);
}

fn check_validation_result(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "target", prefix, report);
    require_bool(data, "passed", prefix, report);
    optional_string_array(data, "messages", prefix, report);
}

fn check_table_schema(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "table", prefix, report);
    if let Some(columns) = require_array(data, "columns", prefix, report) {
        for (index, column) in columns.iter().enumerate() {
            let column_prefix = format!("{}[{index}]", path(prefix, "columns"));
            match column.as_object() {
                Some(column_obj) => {
                    require_nonempty_string(column_obj, "name", &column_prefix, report);
                    require_membership(column_obj, "dataType", COLUMN_TYPES, &column_prefix, report);
                }
                None => report.push(column_prefix, "must be an object"),
            }
        }
    }
}

fn check_table_row(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "table", prefix, report);
    require_array(data, "cells", prefix, report);
}

fn check_table_meta(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "table", prefix, report);
    match data.get("rowCount") {
        Some(Value::Number(n)) if n.as_u64().is_some() => {}
        Some(_) => report.push(path(prefix, "rowCount"), "must be a non-negative integer"),
        None => report.push(path(prefix, "rowCount"), "is required"),
    }
    if let Some(note) = data.get("note") {
        if !note.is_string() && !note.is_null() {
            report.push(path(prefix, "note"), "must be a string");
        }
    }
}

fn check_diff_patch(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "target", prefix, report);
    require_string(data, "diff", prefix, report);
}

fn check_json_patch(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    if let Some(pointer) = require_string(data, "pointer", prefix, report) {
        if !pointer.starts_with('/') {
            report.push(path(prefix, "pointer"), "must start with '/'");
        }
    }
    require_membership(data, "operation", PATCH_OPERATIONS, prefix, report);
    // "value" may be any JSON value and is optional (absent for "remove")
}

fn check_schema_definition(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "name", prefix, report);
    if let Some(fields) = require_array(data, "fields", prefix, report) {
        for (index, field) in fields.iter().enumerate() {
            let field_prefix = format!("{}[{index}]", path(prefix, "fields"));
            match field.as_object() {
                Some(field_obj) => {
                    require_nonempty_string(field_obj, "name", &field_prefix, report);
                    require_nonempty_string(field_obj, "fieldType", &field_prefix, report);
                    require_bool(field_obj, "required", &field_prefix, report);
                }
                None => report.push(field_prefix, "must be an object"),
            }
        }
    }
}

fn check_schema_payload(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "schema", prefix, report);
    if !data.contains_key("payload") {
        report.push(path(prefix, "payload"), "is required");
    }
}

fn check_schema_error(data: &Map<String, Value>, prefix: &str, report: &mut ValidationReport) {
    require_nonempty_string(data, "schema", prefix, report);
    require_nonempty_string(data, "field", prefix, report);
    require_string(data, "message", prefix, report);
}

fn check_variant(
    event_type: &str,
    data: &Map<String, Value>,
    prefix: &str,
    report: &mut ValidationReport,
) {
    let data_prefix = path(prefix, "data");
    match event_type {
        "reasoning_step" => check_reasoning_step(data, &data_prefix, report),
        "answer_chunk" => check_answer_chunk(data, &data_prefix, report),
        "memory_entry" => check_memory_entry(data, &data_prefix, report),
        "input_request" => check_input_request(data, &data_prefix, report),
        "input_submission" => check_input_submission(data, &data_prefix, report),
        "checkpoint" => check_checkpoint(data, &data_prefix, report),
        "validation_result" => check_validation_result(data, &data_prefix, report),
        "table_schema" => check_table_schema(data, &data_prefix, report),
        "table_row" => check_table_row(data, &data_prefix, report),
        "table_meta" => check_table_meta(data, &data_prefix, report),
        "diff_patch" => check_diff_patch(data, &data_prefix, report),
        "json_patch" => check_json_patch(data, &data_prefix, report),
        "schema_definition" => check_schema_definition(data, &data_prefix, report),
        "schema_payload" => check_schema_payload(data, &data_prefix, report),
        "schema_error" => check_schema_error(data, &data_prefix, report),
        _ => unreachable!("variant dispatch is guarded by EVENT_TYPES membership"),
    }
}

fn validate_event_at(value: &Value, prefix: &str, report: &mut ValidationReport) {
    let Some(obj) = value.as_object() else {
        let field = if prefix.is_empty() { "event" } else { prefix };
        report.push(field, "must be an object");
        return;
    };

    require_nonempty_string(obj, "id", prefix, report);

    if let Some(timestamp) = require_number(obj, "timestamp", prefix, report) {
        if !timestamp.is_finite() || timestamp <= 0.0 {
            report.push(
                path(prefix, "timestamp"),
                "must be a positive finite number",
            );
        }
    }

    if let Some(session_id) = obj.get("sessionId") {
        match session_id {
            Value::String(s) if !s.is_empty() => {}
            _ => report.push(path(prefix, "sessionId"), "must be a non-empty string"),
        }
    }

    let Some(event_type) = require_string(obj, "type", prefix, report) else {
        return;
    };
    if !EVENT_TYPES.contains(&event_type) {
        report.push(
            path(prefix, "type"),
            format!("unknown event type \"{event_type}\""),
        );
        return;
    }

    match obj.get("data") {
        Some(Value::Object(data)) => check_variant(event_type, data, prefix, report),
        Some(_) => report.push(path(prefix, "data"), "must be an object"),
        None => report.push(path(prefix, "data"), "is required"),
    }
}

/// Validate one untyped event, collecting every violated field
pub fn validate_event(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_event_at(value, "", &mut report);
    report
}

/// True iff the value has the base fields and matches exactly one variant
pub fn is_stream_event(value: &Value) -> bool {
    validate_event(value).is_valid()
}

/// Fail with a [`Error::Validation`] listing all field/reason pairs
pub fn assert_valid_event(value: &Value) -> Result<()> {
    validate_event(value).into_result()
}

/// Validate, then deserialize into the typed event model
pub fn parse_event(value: &Value) -> Result<StreamEvent> {
    validate_event(value).into_result()?;
    Ok(serde_json::from_value(value.clone())?)
}

fn validate_metadata_value(value: &Value, report: &mut ValidationReport) {
    let Some(obj) = value.as_object() else {
        report.push("metadata", "must be an object");
        return;
    };
    for key in ["id", "name", "pattern", "description", "version"] {
        require_nonempty_string(obj, key, "metadata", report);
    }
    match obj.get("eventCount") {
        Some(Value::Number(n)) if n.as_u64().is_some() => {}
        Some(_) => report.push("metadata.eventCount", "must be a non-negative integer"),
        None => report.push("metadata.eventCount", "is required"),
    }
    optional_string_array(obj, "tags", "metadata", report);
    if obj.get("tags").is_none() {
        report.push("metadata.tags", "is required");
    }
    if let Some(author) = obj.get("author") {
        match author {
            Value::String(s) if !s.is_empty() => {}
            Value::Null => {}
            _ => report.push("metadata.author", "must be a non-empty string"),
        }
    }
}

/// Validate one untyped fixture document: metadata completeness, per-event
/// schema errors (tagged with their index), the event-count/metadata
/// mismatch, and any timestamp decrease between consecutive events. Equal
/// consecutive timestamps are allowed.
pub fn validate_fixture_value(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(obj) = value.as_object() else {
        report.push("fixture", "must be an object");
        return report;
    };

    match obj.get("metadata") {
        Some(metadata) => validate_metadata_value(metadata, &mut report),
        None => report.push("metadata", "is required"),
    }

    let events = match obj.get("events") {
        Some(Value::Array(events)) => events,
        Some(_) | None => {
            report.push("events", "must be an array");
            return report;
        }
    };

    for (index, event) in events.iter().enumerate() {
        validate_event_at(event, &format!("events[{index}]"), &mut report);
    }

    if let Some(declared) = obj
        .get("metadata")
        .and_then(|m| m.get("eventCount"))
        .and_then(Value::as_u64)
    {
        if declared as usize != events.len() {
            report.push(
                "metadata.eventCount",
                format!("declares {declared} events, found {}", events.len()),
            );
        }
    }

    let mut previous: Option<f64> = None;
    for (index, event) in events.iter().enumerate() {
        let Some(timestamp) = event.get("timestamp").and_then(Value::as_f64) else {
            continue;
        };
        if let Some(prev) = previous {
            if timestamp < prev {
                report.push(
                    format!("events[{index}].timestamp"),
                    format!("must not decrease (previous {prev}, found {timestamp})"),
                );
            }
        }
        previous = Some(timestamp);
    }

    report
}

/// Validate, then deserialize a whole fixture document
pub fn parse_fixture(value: &Value) -> Result<Fixture> {
    validate_fixture_value(value).into_result()?;
    Ok(serde_json::from_value(value.clone())?)
}
