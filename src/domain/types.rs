//! Validated newtypes for the replay domain
//!
//! Every primitive that crosses the fixture-ingestion or session boundary
//! gets a newtype with its invariant enforced at construction, avoiding
//! primitive obsession in the rest of the crate.

use nutype::nutype;
#[allow(unused_imports)] // These are used by nutype derive macros
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a single stream event within a fixture
#[nutype(
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct EventId(String);

/// Event timestamp in epoch milliseconds
///
/// Fixture timestamps are authored as plain numbers; they must be positive
/// and finite. Ordering across a fixture is validated separately at
/// registration time.
#[nutype(
    validate(finite, greater = 0.0),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        PartialOrd,
        Serialize,
        Deserialize,
        AsRef,
        Into,
        Display
    )
)]
pub struct EventTimestamp(f64);

/// Identifier of a replay session
///
/// Fixture authors may pin one on individual events; sessions generate their
/// own when the caller does not supply one.
#[nutype(
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        // The formatted string is never empty
        Self::try_new(format!("mock-{}", Uuid::now_v7()))
            .expect("generated session id is non-empty")
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::generate()
    }
}

/// Model confidence attached to reasoning steps, in `[0, 1]`
#[nutype(
    validate(finite, greater_or_equal = 0.0, less_or_equal = 1.0),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        PartialOrd,
        Serialize,
        Deserialize,
        AsRef,
        Into,
        Display
    )
)]
pub struct Confidence(f64);

/// Completion fraction carried by checkpoint events, in `[0, 1]`
#[nutype(
    validate(finite, greater_or_equal = 0.0, less_or_equal = 1.0),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        PartialOrd,
        Serialize,
        Deserialize,
        AsRef,
        Into,
        Display
    )
)]
pub struct Progress(f64);

/// Unique identifier of a registered fixture
#[nutype(
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct FixtureId(String);

/// Human-readable fixture name
#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct FixtureName(String);

/// Interaction pattern a fixture demonstrates (e.g. "chat", "table")
#[nutype(
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct FixturePattern(String);

impl FixturePattern {
    /// Default pattern for fixtures registered without one
    pub fn unknown() -> Self {
        Self::try_new("unknown".to_string()).expect("default pattern is non-empty")
    }
}

/// Free-form fixture description
#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct FixtureDescription(String);

/// Fixture version string (free-form, defaults to "1.0")
#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct FixtureVersion(String);

impl FixtureVersion {
    pub fn initial() -> Self {
        Self::try_new("1.0".to_string()).expect("default version is non-empty")
    }
}

/// Fixture author attribution
#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct AuthorName(String);

/// A tag for categorizing fixtures
///
/// Must start with an alphanumeric character; the remainder may also use
/// `:`, `.`, `_` and `-`.
#[nutype(
    validate(predicate = |s| {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphanumeric() => {
                chars.all(|c| c.is_ascii_alphanumeric() || ":._-".contains(c))
            }
            _ => false,
        }
    }),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct Tag(String);

/// 1-based position of an event within one session's emission order
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    From,
    AsRef,
    Into,
    Display
))]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    pub fn first() -> Self {
        Self::new(1)
    }

    /// Next sequence number, saturating at the maximum value
    pub fn next(self) -> Self {
        Self::new(self.into_inner().saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_rejects_empty_strings() {
        assert!(EventId::try_new("evt-001".to_string()).is_ok());
        assert!(EventId::try_new("".to_string()).is_err());
    }

    #[test]
    fn event_timestamp_must_be_positive_and_finite() {
        assert!(EventTimestamp::try_new(1_700_000_000_000.0).is_ok());
        assert!(EventTimestamp::try_new(0.0).is_err());
        assert!(EventTimestamp::try_new(-5.0).is_err());
        assert!(EventTimestamp::try_new(f64::NAN).is_err());
        assert!(EventTimestamp::try_new(f64::INFINITY).is_err());
    }

    #[test]
    fn session_id_generation_is_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(a.as_ref().starts_with("mock-"));
    }

    #[test]
    fn confidence_is_bounded_to_unit_interval() {
        assert!(Confidence::try_new(0.0).is_ok());
        assert!(Confidence::try_new(1.0).is_ok());
        assert!(Confidence::try_new(1.01).is_err());
        assert!(Confidence::try_new(-0.01).is_err());
    }

    #[test]
    fn tag_validation() {
        assert!(Tag::try_new("demo".to_string()).is_ok());
        assert!(Tag::try_new("table:v2".to_string()).is_ok());
        assert!(Tag::try_new("input_flow-1".to_string()).is_ok());

        assert!(Tag::try_new("".to_string()).is_err());
        assert!(Tag::try_new("-leading".to_string()).is_err());
        assert!(Tag::try_new("has space".to_string()).is_err());
    }

    #[test]
    fn sequence_numbers_start_at_one_and_increment() {
        let first = SequenceNumber::first();
        assert_eq!(first.into_inner(), 1);
        assert_eq!(first.next().into_inner(), 2);
    }
}
