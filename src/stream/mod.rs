//! Streaming simulation: cursor, session lifecycle, and the construction
//! façade

pub mod cursor;
pub mod factory;
pub mod session;

pub use cursor::{CursorState, StreamCursor};
pub use factory::{
    collect_stream_events, create_concurrent_streams, create_stream, create_stream_with_handle,
    measure_stream_timing, stream_from_repository, stream_from_repository_with_handle,
    validate_fixture_events, CreateStreamOptions, EventStream, PlaybackOptions,
};
pub use session::{
    DelayProfile, SessionConfig, SessionState, SessionStatistics, StreamHandle, StreamSession,
};
