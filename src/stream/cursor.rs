//! Ordered traversal over one fixture's event sequence

use serde::Serialize;

use crate::domain::event::StreamEvent;
use crate::error::{Error, Result};

/// Derived snapshot of a cursor's position; never independently mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    pub position: usize,
    pub total_events: usize,
    pub is_at_end: bool,
    pub is_at_start: bool,
}

/// Deterministic, bounds-safe forward iterator over an owned event array.
///
/// The cursor owns a private copy of the events for one session's lifetime;
/// it never reorders or skips, and running past the end signals exhaustion
/// instead of panicking.
#[derive(Debug, Clone)]
pub struct StreamCursor {
    events: Vec<StreamEvent>,
    position: usize,
}

impl StreamCursor {
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events,
            position: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.position < self.events.len()
    }

    /// The event at the current position, advancing by one; `None` once
    /// exhausted.
    pub fn next(&mut self) -> Option<StreamEvent> {
        let event = self.events.get(self.position)?.clone();
        self.position += 1;
        Some(event)
    }

    /// Read the upcoming event without advancing
    pub fn peek(&self) -> Option<&StreamEvent> {
        self.events.get(self.position)
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Jump directly to a position in `[0, len]`; `len` itself is the
    /// exhausted position.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.events.len() {
            return Err(Error::OutOfBounds {
                position,
                length: self.events.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn state(&self) -> CursorState {
        CursorState {
            position: self.position,
            total_events: self.events.len(),
            is_at_end: self.position >= self.events.len(),
            is_at_start: self.position == 0,
        }
    }

    /// Events not yet consumed, independent of traversal state
    pub fn remaining_events(&self) -> Vec<StreamEvent> {
        self.events[self.position..].to_vec()
    }

    /// Events already consumed, independent of traversal state
    pub fn consumed_events(&self) -> Vec<StreamEvent> {
        self.events[..self.position].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{AnswerChunkData, EventPayload};
    use crate::domain::types::{EventId, EventTimestamp};

    fn events(count: usize) -> Vec<StreamEvent> {
        (0..count)
            .map(|i| {
                StreamEvent::new(
                    EventId::try_new(format!("evt-{i}")).unwrap(),
                    EventTimestamp::try_new(1000.0 + i as f64).unwrap(),
                    EventPayload::AnswerChunk(AnswerChunkData {
                        content: format!("chunk {i}"),
                        is_final: i == count - 1,
                    }),
                )
            })
            .collect()
    }

    #[test]
    fn traverses_in_order_and_signals_exhaustion() {
        let mut cursor = StreamCursor::new(events(3));

        let mut seen = Vec::new();
        while let Some(event) = cursor.next() {
            seen.push(event.id.as_ref().to_string());
        }
        assert_eq!(seen, vec!["evt-0", "evt-1", "evt-2"]);

        assert!(!cursor.has_next());
        assert!(cursor.next().is_none());
        assert!(cursor.next().is_none());
    }

    #[test]
    fn peek_does_not_advance() {
        let mut cursor = StreamCursor::new(events(2));
        assert_eq!(cursor.peek().unwrap().id.as_ref(), "evt-0");
        assert_eq!(cursor.peek().unwrap().id.as_ref(), "evt-0");
        assert_eq!(cursor.next().unwrap().id.as_ref(), "evt-0");
        assert_eq!(cursor.peek().unwrap().id.as_ref(), "evt-1");
    }

    #[test]
    fn reset_returns_to_the_start() {
        let mut cursor = StreamCursor::new(events(2));
        cursor.next();
        cursor.next();
        assert!(!cursor.has_next());

        cursor.reset();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.next().unwrap().id.as_ref(), "evt-0");
    }

    #[test]
    fn seek_accepts_the_full_inclusive_range_and_rejects_beyond() {
        let mut cursor = StreamCursor::new(events(3));

        cursor.seek(0).unwrap();
        cursor.seek(3).unwrap();
        assert!(!cursor.has_next());

        let error = cursor.seek(4).unwrap_err();
        assert!(matches!(
            error,
            Error::OutOfBounds {
                position: 4,
                length: 3
            }
        ));
    }

    #[test]
    fn state_snapshot_tracks_bounds() {
        let mut cursor = StreamCursor::new(events(2));
        assert_eq!(
            cursor.state(),
            CursorState {
                position: 0,
                total_events: 2,
                is_at_end: false,
                is_at_start: true,
            }
        );

        cursor.next();
        cursor.next();
        let state = cursor.state();
        assert!(state.is_at_end);
        assert!(!state.is_at_start);
    }

    #[test]
    fn remaining_and_consumed_slices_do_not_disturb_traversal() {
        let mut cursor = StreamCursor::new(events(3));
        cursor.next();

        assert_eq!(cursor.consumed_events().len(), 1);
        assert_eq!(cursor.remaining_events().len(), 2);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.next().unwrap().id.as_ref(), "evt-1");
    }

    #[test]
    fn empty_cursor_is_immediately_exhausted() {
        let mut cursor = StreamCursor::new(Vec::new());
        assert!(!cursor.has_next());
        assert!(cursor.next().is_none());
        assert!(cursor.state().is_at_end);
        assert!(cursor.state().is_at_start);
    }
}
