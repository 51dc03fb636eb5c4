//! Presence store.
//!
//! # Responsibility
//! - Track, per display key, the distinct calendar dates a person was present.
//!
//! # Invariants
//! - Marking is idempotent: a (key, date) pair is stored at most once.
//! - Keys iterate in first-mark order (or document order after a load).
//! - Entries only grow; there is no per-mark removal.

use chrono::{Datelike, NaiveDate, Weekday};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

static NO_DATES: BTreeSet<NaiveDate> = BTreeSet::new();

/// Mapping from display key to the set of dates that person was present.
///
/// Serializes as `{"<key>": ["YYYY-MM-DD", ...]}` with dates ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresenceSet {
    entries: IndexMap<String, BTreeSet<NaiveDate>>,
}

impl PresenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `date` to the set for `person_key`, creating the entry if absent.
    ///
    /// Returns `true` when the mark is new. Any calendar date is accepted.
    pub fn mark_present(&mut self, person_key: &str, date: NaiveDate) -> bool {
        match self.entries.get_mut(person_key) {
            Some(dates) => dates.insert(date),
            None => {
                self.entries
                    .insert(person_key.to_string(), BTreeSet::from([date]));
                true
            }
        }
    }

    /// Dates marked for `person_key`, ascending; empty for unknown keys.
    pub fn present_dates(&self, person_key: &str) -> &BTreeSet<NaiveDate> {
        self.entries.get(person_key).unwrap_or(&NO_DATES)
    }

    pub fn is_present(&self, person_key: &str, date: NaiveDate) -> bool {
        self.present_dates(person_key).contains(&date)
    }

    /// Iterates entries in key insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<NaiveDate>)> {
        self.entries
            .iter()
            .map(|(key, dates)| (key.as_str(), dates))
    }

    /// Number of people with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of stored marks across all people.
    pub fn mark_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }
}

/// Whether `date` falls on a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
