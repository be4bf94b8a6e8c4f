//! Session lifecycle and timed emission
//!
//! A [`StreamSession`] owns one cursor and drives paced, controllable
//! emission over it. The session itself is pull-based: the consumer drives
//! the loop by awaiting [`StreamSession::next_event`] (usually through the
//! stream adapter), so the idle-to-active transition genuinely happens on
//! the first pull. Control calls arrive from any task through the shared
//! control block a [`StreamHandle`] clones.

use derive_more::Display;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::domain::event::{
    EnrichedStreamEvent, EnrichmentMetadata, EventSource, StreamEvent,
};
use crate::domain::types::{EventTimestamp, SequenceNumber, SessionId};
use crate::error::{Error, Result};
use crate::stream::cursor::StreamCursor;

/// Lifecycle state of a session
///
/// `Idle → Active` is one-way and happens on the first pull;
/// `Active ⇄ Paused` is reversible; `Closed` is terminal and reachable from
/// any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[display("idle")]
    Idle,
    #[display("active")]
    Active,
    #[display("paused")]
    Paused,
    #[display("closed")]
    Closed,
}

/// Named timing preset controlling inter-event pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum DelayProfile {
    #[display("fast")]
    Fast,
    #[default]
    #[display("normal")]
    Normal,
    #[display("slow")]
    Slow,
}

impl DelayProfile {
    pub fn per_event_delay(self) -> Duration {
        match self {
            DelayProfile::Fast => Duration::from_millis(50),
            DelayProfile::Normal => Duration::from_millis(300),
            DelayProfile::Slow => Duration::from_millis(1000),
        }
    }
}

/// Read-only snapshot of a session, safe to take in any state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatistics {
    pub session_id: SessionId,
    pub state: SessionState,
    pub total_events: usize,
    pub events_consumed: usize,
    pub events_remaining: usize,
    pub cursor_position: usize,
    pub delay_profile: DelayProfile,
}

/// Configuration of one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Generated when absent
    pub session_id: Option<SessionId>,
    pub delay_profile: DelayProfile,
    pub enrich_events: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: None,
            delay_profile: DelayProfile::default(),
            enrich_events: true,
        }
    }
}

/// State shared between a session and its handles.
///
/// The resume signal uses `Notify::notify_one` permit semantics so a
/// resume/close landing between the state check and the await still wakes
/// the consumer; the wait loop re-checks state after every wakeup, so a
/// stale permit is harmless.
#[derive(Debug)]
struct SessionControl {
    session_id: SessionId,
    delay_profile: DelayProfile,
    total_events: usize,
    state: Mutex<SessionState>,
    resume: Notify,
    cursor_position: AtomicUsize,
    events_emitted: AtomicU64,
}

impl SessionControl {
    fn state(&self) -> SessionState {
        *self.state.lock()
    }

    fn begin(&self) {
        let mut state = self.state.lock();
        if *state == SessionState::Idle {
            debug!(session_id = %self.session_id, "session activated on first pull");
            *state = SessionState::Active;
        }
    }

    fn pause(&self) -> Result<()> {
        let mut state = self.state.lock();
        match *state {
            SessionState::Active => {
                *state = SessionState::Paused;
                debug!(session_id = %self.session_id, "session paused");
                Ok(())
            }
            other => Err(Error::invalid_transition(format!(
                "cannot pause session while {other}"
            ))),
        }
    }

    fn resume(&self) -> Result<()> {
        let mut state = self.state.lock();
        match *state {
            SessionState::Paused => {
                *state = SessionState::Active;
                drop(state);
                debug!(session_id = %self.session_id, "session resumed");
                self.resume.notify_one();
                Ok(())
            }
            other => Err(Error::invalid_transition(format!(
                "cannot resume session while {other}"
            ))),
        }
    }

    /// Terminal from any state; repeated calls are no-ops. Always releases
    /// a consumer suspended on the pause barrier.
    fn close(&self) {
        let mut state = self.state.lock();
        if *state != SessionState::Closed {
            debug!(session_id = %self.session_id, "session closed");
            *state = SessionState::Closed;
        }
        drop(state);
        self.resume.notify_one();
    }

    fn statistics(&self) -> SessionStatistics {
        let cursor_position = self.cursor_position.load(Ordering::Acquire);
        SessionStatistics {
            session_id: self.session_id.clone(),
            state: self.state(),
            total_events: self.total_events,
            events_consumed: self.events_emitted.load(Ordering::Acquire) as usize,
            events_remaining: self.total_events.saturating_sub(cursor_position),
            cursor_position,
            delay_profile: self.delay_profile,
        }
    }
}

/// External control surface of a running session
#[derive(Debug, Clone)]
pub struct StreamHandle {
    control: Arc<SessionControl>,
}

impl StreamHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.control.session_id
    }

    /// Halt emission; fails unless the session is active
    pub fn pause(&self) -> Result<()> {
        self.control.pause()
    }

    /// Continue from the exact next unconsumed event; fails unless paused
    pub fn resume(&self) -> Result<()> {
        self.control.resume()
    }

    /// Terminate from any state; idempotent
    pub fn close(&self) {
        self.control.close()
    }

    pub fn state(&self) -> SessionState {
        self.control.state()
    }

    pub fn statistics(&self) -> SessionStatistics {
        self.control.statistics()
    }
}

/// One run of timed emission over one fixture's events
#[derive(Debug)]
pub struct StreamSession {
    cursor: StreamCursor,
    control: Arc<SessionControl>,
    enrich_events: bool,
    last_timestamp: Option<f64>,
    sequence: u64,
}

impl StreamSession {
    pub fn new(events: Vec<StreamEvent>, config: SessionConfig) -> Self {
        let control = Arc::new(SessionControl {
            session_id: config.session_id.unwrap_or_default(),
            delay_profile: config.delay_profile,
            total_events: events.len(),
            state: Mutex::new(SessionState::Idle),
            resume: Notify::new(),
            cursor_position: AtomicUsize::new(0),
            events_emitted: AtomicU64::new(0),
        });
        Self {
            cursor: StreamCursor::new(events),
            control,
            enrich_events: config.enrich_events,
            last_timestamp: None,
            sequence: 0,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.control.session_id
    }

    pub fn state(&self) -> SessionState {
        self.control.state()
    }

    /// A control handle bound to this session
    pub fn handle(&self) -> StreamHandle {
        StreamHandle {
            control: Arc::clone(&self.control),
        }
    }

    pub fn pause(&self) -> Result<()> {
        self.control.pause()
    }

    pub fn resume(&self) -> Result<()> {
        self.control.resume()
    }

    pub fn close(&self) {
        self.control.close()
    }

    pub fn statistics(&self) -> SessionStatistics {
        self.control.statistics()
    }

    /// Pull the next emission, pacing and honoring pause/close.
    ///
    /// Returns `None` when the session is closed, either explicitly or
    /// because the cursor is exhausted (which closes the session).
    pub async fn next_event(&mut self) -> Option<EnrichedStreamEvent> {
        loop {
            match self.control.state() {
                SessionState::Closed => return None,
                SessionState::Idle => self.control.begin(),
                SessionState::Paused => {
                    if !self.wait_for_resume().await {
                        return None;
                    }
                    continue;
                }
                SessionState::Active => {}
            }

            if !self.cursor.has_next() {
                // Natural completion, the only non-error path to closed
                self.control.close();
                return None;
            }

            tokio::time::sleep(self.control.delay_profile.per_event_delay()).await;

            // A pause or close that landed during the delay must emit nothing
            match self.control.state() {
                SessionState::Closed => return None,
                SessionState::Paused => continue,
                _ => {}
            }

            let event = self.cursor.next()?;
            self.control
                .cursor_position
                .store(self.cursor.position(), Ordering::Release);

            let event = self.apply_monotonic_timestamp(event);
            let emitted = self.enrich(event);
            self.control.events_emitted.fetch_add(1, Ordering::AcqRel);
            return Some(emitted);
        }
    }

    /// Block on the pause barrier until resumed or closed.
    ///
    /// Returns `false` when the session closed while suspended.
    async fn wait_for_resume(&self) -> bool {
        loop {
            let notified = self.control.resume.notified();
            match self.control.state() {
                SessionState::Paused => notified.await,
                SessionState::Closed => return false,
                _ => return true,
            }
        }
    }

    /// Emitted timestamps must strictly increase: a non-increasing fixture
    /// timestamp is bumped to `last + 1`, then capped to wall-clock now so
    /// replayed events never sit in the future.
    fn apply_monotonic_timestamp(&mut self, mut event: StreamEvent) -> StreamEvent {
        let original = event.timestamp.into_inner();
        let mut timestamp = original;

        if let Some(last) = self.last_timestamp {
            if timestamp <= last {
                timestamp = last + 1.0;
            }
        }
        let now = chrono::Utc::now().timestamp_millis() as f64;
        if timestamp > now {
            timestamp = now;
        }

        if timestamp != original {
            warn!(
                session_id = %self.control.session_id,
                event_id = %event.id,
                original,
                corrected = timestamp,
                "corrected event timestamp"
            );
            if let Ok(corrected) = EventTimestamp::try_new(timestamp) {
                event.timestamp = corrected;
            }
        }
        self.last_timestamp = Some(event.timestamp.into_inner());
        event
    }

    fn enrich(&mut self, mut event: StreamEvent) -> EnrichedStreamEvent {
        if !self.enrich_events {
            return EnrichedStreamEvent {
                event,
                metadata: None,
            };
        }
        self.sequence += 1;
        event.session_id = Some(self.control.session_id.clone());
        EnrichedStreamEvent {
            event,
            metadata: Some(EnrichmentMetadata {
                source: EventSource::Mock,
                session_id: self.control.session_id.clone(),
                sequence_number: SequenceNumber::from(self.sequence),
            }),
        }
    }

    /// Adapt the session into a lazily-produced event sequence
    pub fn into_stream(self) -> impl futures_util::Stream<Item = EnrichedStreamEvent> + Send {
        futures_util::stream::unfold(self, |mut session| async move {
            session.next_event().await.map(|event| (event, session))
        })
    }
}
