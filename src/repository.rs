//! In-memory fixture registry
//!
//! The single source of truth for named event sequences. Registration
//! validates the fixture invariants; reads hand out owned copies so no
//! caller can mutate stored state or observe another caller's mutation.
//! The copy boundary substitutes for locking.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use crate::domain::event::StreamEvent;
use crate::domain::fixture::{Fixture, FixtureMetadata};
use crate::domain::schema::ValidationReport;
use crate::domain::types::{FixtureId, FixturePattern, Tag};
use crate::error::{Error, Result};

/// Read options for [`FixtureRepository::get_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    /// Re-run fixture validation before returning, failing the same way
    /// registration does. Off by default; stored fixtures are immutable, so
    /// this only matters for callers that want a paranoid read.
    pub validate: bool,
}

/// Aggregate counts over the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryStats {
    pub fixture_count: usize,
    pub event_count: usize,
    pub patterns: BTreeSet<FixturePattern>,
    pub tags: BTreeSet<Tag>,
}

/// In-memory store of registered fixtures
#[derive(Debug, Default)]
pub struct FixtureRepository {
    fixtures: HashMap<FixtureId, Fixture>,
}

impl FixtureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a typed fixture against the registry invariants.
    ///
    /// Typed events already carry their field invariants, so what is left to
    /// check here is the event-count/metadata agreement and that timestamps
    /// never decrease between consecutive events (equal is allowed).
    pub fn validate_fixture(fixture: &Fixture) -> ValidationReport {
        let mut report = ValidationReport::default();

        if fixture.events.len() != fixture.metadata.event_count {
            report.push(
                "metadata.eventCount",
                format!(
                    "declares {} events, found {}",
                    fixture.metadata.event_count,
                    fixture.events.len()
                ),
            );
        }

        let mut previous: Option<f64> = None;
        for (index, event) in fixture.events.iter().enumerate() {
            let timestamp = event.timestamp.into_inner();
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

    /// Register a fixture, taking ownership of the stored copy.
    ///
    /// Fails with [`Error::Validation`] if any invariant is violated and
    /// with [`Error::DuplicateId`] if the id is already present.
    pub fn register(&mut self, fixture: Fixture) -> Result<()> {
        Self::validate_fixture(&fixture).into_result()?;

        let id = fixture.id().clone();
        if self.fixtures.contains_key(&id) {
            return Err(Error::DuplicateId { id });
        }

        info!(
            fixture_id = %id,
            event_count = fixture.events.len(),
            pattern = %fixture.metadata.pattern,
            "registered fixture"
        );
        self.fixtures.insert(id, fixture);
        Ok(())
    }

    /// Owned copy of a fixture; mutation-safe by construction
    pub fn get(&self, id: &FixtureId) -> Result<Fixture> {
        self.get_with(id, GetOptions::default())
    }

    pub fn get_with(&self, id: &FixtureId, options: GetOptions) -> Result<Fixture> {
        let fixture = self.borrow(id)?;
        if options.validate {
            Self::validate_fixture(fixture).into_result()?;
        }
        debug!(fixture_id = %id, "fixture read");
        Ok(fixture.clone())
    }

    /// Zero-copy read of the stored fixture.
    ///
    /// The borrow checker enforces what the clone-on-read boundary exists
    /// for, so this is the cheap path for callers that only need to look.
    pub fn borrow(&self, id: &FixtureId) -> Result<&Fixture> {
        self.fixtures
            .get(id)
            .ok_or_else(|| Error::NotFound { id: id.clone() })
    }

    /// Owned copy of a fixture's event sequence
    pub fn events(&self, id: &FixtureId) -> Result<Vec<StreamEvent>> {
        Ok(self.borrow(id)?.events.clone())
    }

    /// Independent copy of a fixture's metadata, tags included
    pub fn metadata(&self, id: &FixtureId) -> Result<FixtureMetadata> {
        Ok(self.borrow(id)?.metadata.clone())
    }

    pub fn has(&self, id: &FixtureId) -> bool {
        self.fixtures.contains_key(id)
    }

    /// Metadata copies of every registered fixture, ordered by id
    pub fn list(&self) -> Vec<FixtureMetadata> {
        let mut entries: Vec<FixtureMetadata> = self
            .fixtures
            .values()
            .map(|fixture| fixture.metadata.clone())
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    pub fn find_by_pattern(&self, pattern: &FixturePattern) -> Vec<Fixture> {
        let mut matches: Vec<Fixture> = self
            .fixtures
            .values()
            .filter(|fixture| &fixture.metadata.pattern == pattern)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
        matches
    }

    pub fn find_by_tag(&self, tag: &Tag) -> Vec<Fixture> {
        let mut matches: Vec<Fixture> = self
            .fixtures
            .values()
            .filter(|fixture| fixture.metadata.tags.contains(tag))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
        matches
    }

    /// Drop every registered fixture (test lifecycles)
    pub fn clear(&mut self) {
        self.fixtures.clear();
    }

    pub fn stats(&self) -> RepositoryStats {
        RepositoryStats {
            fixture_count: self.fixtures.len(),
            event_count: self.fixtures.values().map(Fixture::len).sum(),
            patterns: self
                .fixtures
                .values()
                .map(|fixture| fixture.metadata.pattern.clone())
                .collect(),
            tags: self
                .fixtures
                .values()
                .flat_map(|fixture| fixture.metadata.tags.iter().cloned())
                .collect(),
        }
    }
}
