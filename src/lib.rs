//! SSE Replay - a mock server-sent event stream engine
//!
//! Replays pre-authored fixture data as timed, controllable event streams
//! so UX demonstrations show realistic AI/LLM output without a real
//! backend, following type-driven development principles.

pub mod config;
pub mod domain;
pub mod error;
pub mod fixtures;
pub mod repository;
pub mod stream;

pub use error::{Error, FieldError, Result};
pub use repository::FixtureRepository;
pub use stream::{
    create_stream, create_stream_with_handle, CreateStreamOptions, DelayProfile, SessionState,
    StreamHandle, StreamSession,
};
