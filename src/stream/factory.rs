//! Stream construction façade
//!
//! Public entry points gluing fixture events and playback configuration
//! into running sessions, exposed as boxed event sequences with optional
//! external control handles, plus draining utilities for tests and tooling.

use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use serde_json::Value;
use std::time::Duration;

use crate::domain::event::{EnrichedStreamEvent, StreamEvent};
use crate::domain::types::{FixtureId, SessionId};
use crate::error::{Error, FieldError, Result};
use crate::repository::FixtureRepository;
use crate::stream::session::{DelayProfile, SessionConfig, StreamHandle, StreamSession};

/// A lazily-produced, ordered sequence of enriched events.
///
/// Failures surface as a terminal `Err` item rather than a silent empty
/// stream, so a consumer always observes either events or an error.
pub type EventStream = BoxStream<'static, Result<EnrichedStreamEvent>>;

/// Options for building a stream over an explicit event sequence
#[derive(Debug, Clone)]
pub struct CreateStreamOptions {
    pub events: Vec<StreamEvent>,
    pub delay_profile: DelayProfile,
    pub session_id: Option<SessionId>,
    pub enrich_events: bool,
}

impl CreateStreamOptions {
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events,
            delay_profile: DelayProfile::default(),
            session_id: None,
            enrich_events: true,
        }
    }

    pub fn with_delay_profile(mut self, delay_profile: DelayProfile) -> Self {
        self.delay_profile = delay_profile;
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn without_enrichment(mut self) -> Self {
        self.enrich_events = false;
        self
    }
}

/// Playback configuration for repository-backed streams
#[derive(Debug, Clone, Default)]
pub struct PlaybackOptions {
    pub delay_profile: DelayProfile,
    pub session_id: Option<SessionId>,
    pub enrich_events: Option<bool>,
}

fn build_session(options: CreateStreamOptions) -> StreamSession {
    StreamSession::new(
        options.events,
        SessionConfig {
            session_id: options.session_id,
            delay_profile: options.delay_profile,
            enrich_events: options.enrich_events,
        },
    )
}

/// Build a session and return its emission sequence directly
/// (fire-and-forget consumption style)
pub fn create_stream(options: CreateStreamOptions) -> EventStream {
    let session = build_session(options);
    session.into_stream().map(Ok).boxed()
}

/// Same as [`create_stream`], but also hand back a control handle bound to
/// the same session, letting an external caller control playback
/// independently of consumption
pub fn create_stream_with_handle(options: CreateStreamOptions) -> (EventStream, StreamHandle) {
    let session = build_session(options);
    let handle = session.handle();
    (session.into_stream().map(Ok).boxed(), handle)
}

/// Fully independent sessions from a list of configs; sessions share no
/// state and never interfere with each other
pub fn create_concurrent_streams(
    configs: Vec<CreateStreamOptions>,
) -> Vec<(EventStream, StreamHandle)> {
    configs.into_iter().map(create_stream_with_handle).collect()
}

/// Stream a registered fixture.
///
/// An unknown fixture id (or an id that fails validation) yields a stream
/// whose single item is the error, so the consumer sees a visible terminal
/// failure instead of nothing.
pub fn stream_from_repository(
    repository: &FixtureRepository,
    fixture_id: &str,
    playback: PlaybackOptions,
) -> EventStream {
    match repository_stream_options(repository, fixture_id, playback) {
        Ok(options) => create_stream(options),
        Err(error) => futures_util::stream::iter(vec![Err(error)]).boxed(),
    }
}

/// Like [`stream_from_repository`], but failing eagerly and returning the
/// control handle alongside the sequence
pub fn stream_from_repository_with_handle(
    repository: &FixtureRepository,
    fixture_id: &str,
    playback: PlaybackOptions,
) -> Result<(EventStream, StreamHandle)> {
    let options = repository_stream_options(repository, fixture_id, playback)?;
    Ok(create_stream_with_handle(options))
}

fn repository_stream_options(
    repository: &FixtureRepository,
    fixture_id: &str,
    playback: PlaybackOptions,
) -> Result<CreateStreamOptions> {
    let id = FixtureId::try_new(fixture_id.to_string()).map_err(|e| {
        Error::validation(vec![FieldError::new("fixtureId", e.to_string())])
    })?;
    let events = repository.events(&id)?;
    Ok(CreateStreamOptions {
        events,
        delay_profile: playback.delay_profile,
        session_id: playback.session_id,
        enrich_events: playback.enrich_events.unwrap_or(true),
    })
}

/// Cheap pre-flight check over raw event values, distinct from full schema
/// validation: non-empty `id`/`type` strings, a non-negative numeric
/// `timestamp`, and the presence of `data`
pub fn validate_fixture_events(events: &[Value]) -> bool {
    events.iter().all(|event| {
        let Some(obj) = event.as_object() else {
            return false;
        };
        let id_ok = obj
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        let type_ok = obj
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        let timestamp_ok = obj
            .get("timestamp")
            .and_then(Value::as_f64)
            .is_some_and(|t| t >= 0.0);
        id_ok && type_ok && timestamp_ok && obj.contains_key("data")
    })
}

/// Fully drain a sequence, returning the collected events
pub async fn collect_stream_events<S>(stream: S) -> Result<Vec<EnrichedStreamEvent>>
where
    S: futures_util::Stream<Item = Result<EnrichedStreamEvent>>,
{
    stream.try_collect().await
}

/// Fully drain a sequence, returning the elapsed time
pub async fn measure_stream_timing<S>(stream: S) -> Result<Duration>
where
    S: futures_util::Stream<Item = Result<EnrichedStreamEvent>>,
{
    let start = tokio::time::Instant::now();
    futures_util::pin_mut!(stream);
    while let Some(item) = stream.next().await {
        item?;
    }
    Ok(start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{AnswerChunkData, EventPayload};
    use crate::domain::fixture::{Fixture, FixtureOptions};
    use crate::domain::types::{EventId, EventTimestamp};
    use rstest::rstest;
    use serde_json::json;

    fn chunk(id: &str, timestamp: f64) -> StreamEvent {
        StreamEvent::new(
            EventId::try_new(id.to_string()).unwrap(),
            EventTimestamp::try_new(timestamp).unwrap(),
            EventPayload::AnswerChunk(AnswerChunkData {
                content: format!("content {id}"),
                is_final: false,
            }),
        )
    }

    fn events(count: usize) -> Vec<StreamEvent> {
        (0..count)
            .map(|i| chunk(&format!("evt-{i}"), 1000.0 + i as f64))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn create_stream_emits_every_event_in_order() {
        let stream = create_stream(
            CreateStreamOptions::new(events(3)).with_delay_profile(DelayProfile::Fast),
        );
        let collected = collect_stream_events(stream).await.unwrap();
        let ids: Vec<&str> = collected.iter().map(|e| e.event.id.as_ref()).collect();
        assert_eq!(ids, vec!["evt-0", "evt-1", "evt-2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_streams_do_not_interfere() {
        let streams = create_concurrent_streams(vec![
            CreateStreamOptions::new(events(2)).with_delay_profile(DelayProfile::Fast),
            CreateStreamOptions::new(events(3)).with_delay_profile(DelayProfile::Fast),
        ]);
        assert_eq!(streams.len(), 2);

        let mut lengths = Vec::new();
        for (stream, handle) in streams {
            let collected = collect_stream_events(stream).await.unwrap();
            lengths.push(collected.len());
            assert_eq!(
                handle.statistics().events_consumed,
                collected.len()
            );
        }
        assert_eq!(lengths, vec![2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_fixture_id_yields_a_single_terminal_error() {
        let repository = FixtureRepository::new();
        let mut stream =
            stream_from_repository(&repository, "missing", PlaybackOptions::default());

        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(Error::NotFound { .. })));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn repository_backed_stream_replays_the_registered_fixture() {
        let mut repository = FixtureRepository::new();
        repository
            .register(Fixture::create(
                FixtureId::try_new("demo".to_string()).unwrap(),
                events(2),
                FixtureOptions::default(),
            ))
            .unwrap();

        let (stream, handle) = stream_from_repository_with_handle(
            &repository,
            "demo",
            PlaybackOptions {
                delay_profile: DelayProfile::Fast,
                ..PlaybackOptions::default()
            },
        )
        .unwrap();

        let collected = collect_stream_events(stream).await.unwrap();
        assert_eq!(collected.len(), 2);
        assert_eq!(handle.statistics().events_remaining, 0);
    }

    #[rstest]
    #[case(json!([{"id": "e1", "type": "answer_chunk", "timestamp": 0, "data": {}}]), true)]
    #[case(json!([]), true)]
    #[case(json!([{"id": "", "type": "answer_chunk", "timestamp": 1, "data": {}}]), false)]
    #[case(json!([{"id": "e1", "type": "", "timestamp": 1, "data": {}}]), false)]
    #[case(json!([{"id": "e1", "type": "answer_chunk", "timestamp": -1, "data": {}}]), false)]
    #[case(json!([{"id": "e1", "type": "answer_chunk", "timestamp": 1}]), false)]
    #[case(json!(["not an object"]), false)]
    fn preflight_check_matches_the_documented_rules(#[case] events: Value, #[case] expected: bool) {
        let events = events.as_array().unwrap();
        assert_eq!(validate_fixture_events(events), expected);
    }
}
