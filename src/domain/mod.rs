//! Domain types for fixture replay
//!
//! The typed event model, fixtures, validated newtypes, and the runtime
//! schema layer that guards the untyped fixture-ingestion boundary.

pub mod event;
pub mod fixture;
pub mod schema;
pub mod types;

pub use event::*;
pub use fixture::*;
pub use types::*;
