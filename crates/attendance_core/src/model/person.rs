//! Person domain model.
//!
//! # Responsibility
//! - Define the normalized (surname, given name) identity of a roster entry.
//! - Provide the display key used to correlate roster and presence data.
//!
//! # Invariants
//! - `surname` is trimmed and uppercased.
//! - `given_name` is trimmed and title-cased.
//! - Two persons are equal iff their normalized pairs are equal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LETTER_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}+").expect("valid letter run regex"));

/// Roster column holding the surname.
pub const SURNAME_COLUMN: &str = "Nom";
/// Roster column holding the given name.
pub const GIVEN_NAME_COLUMN: &str = "Prénom";

/// One roster entry, identified by its normalized name pair.
///
/// Serialized with the roster column names so the persisted document keeps
/// the `{"Nom": ..., "Prénom": ...}` record shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "Nom")]
    pub surname: String,
    #[serde(rename = "Prénom")]
    pub given_name: String,
}

impl Person {
    /// Builds a person from raw cell values, applying name normalization.
    pub fn new(surname: &str, given_name: &str) -> Self {
        Self {
            surname: normalize_surname(surname),
            given_name: normalize_given_name(given_name),
        }
    }

    /// Returns the `"{Surname} {GivenName}"` key used by the presence store.
    pub fn display_key(&self) -> String {
        display_key(&self.surname, &self.given_name)
    }
}

/// Joins a name pair into a presence-store lookup key.
pub fn display_key(surname: &str, given_name: &str) -> String {
    format!("{surname} {given_name}")
}

/// Trims and uppercases a surname.
pub fn normalize_surname(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Trims and title-cases a given name.
///
/// Every run of letters gets an uppercase first letter and lowercase rest;
/// any non-letter (hyphen, apostrophe, digit, space) starts a new run, so
/// `"jean-pierre"` becomes `"Jean-Pierre"`.
pub fn normalize_given_name(value: &str) -> String {
    LETTER_RUN_RE
        .replace_all(value.trim(), |caps: &regex::Captures<'_>| {
            let mut chars = caps[0].chars();
            let Some(first) = chars.next() else {
                return String::new();
            };
            // Why: some letters uppercase to several chars (`ﬁ` -> `FI`); only
            // the first stays upper so the result is stable under re-import.
            let mut upper = first.to_uppercase();
            upper
                .next()
                .into_iter()
                .chain(upper.flat_map(char::to_lowercase))
                .chain(chars.flat_map(char::to_lowercase))
                .collect::<String>()
        })
        .into_owned()
}
