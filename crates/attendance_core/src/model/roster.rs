//! Roster model and import.
//!
//! # Responsibility
//! - Hold the ordered list of known people.
//! - Validate spreadsheet-shaped import input and normalize every row.
//!
//! # Invariants
//! - Import only checks that the `Nom` and `Prénom` columns exist; row
//!   contents (blank or garbled names) pass through after normalization.
//! - Row order of the input is preserved.
//! - A failed import never yields a partial roster.

use crate::model::person::{Person, GIVEN_NAME_COLUMN, SURNAME_COLUMN};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const REQUIRED_COLUMNS: [&str; 2] = [SURNAME_COLUMN, GIVEN_NAME_COLUMN];

/// Import rejected because the input schema lacks required columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterImportError {
    /// Lists the required columns absent from the input header.
    MissingColumns(Vec<&'static str>),
}

impl Display for RosterImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumns(missing) => write!(
                f,
                "the file must contain the columns '{SURNAME_COLUMN}' and '{GIVEN_NAME_COLUMN}' (missing: {})",
                missing.join(", ")
            ),
        }
    }
}

impl Error for RosterImportError {}

/// Tabular import input as produced by a spreadsheet reader.
///
/// Rows shorter than the header are padded with empty cells on read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RosterSheet {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: impl IntoIterator<Item = impl Into<String>>) {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Builds a sheet from record-shaped input.
    ///
    /// Columns are the union of record keys in first-seen order. A record
    /// without a given key contributes an empty cell. Non-string scalars are
    /// stringified and `null` becomes empty.
    pub fn from_records(records: &[IndexMap<String, serde_json::Value>]) -> Self {
        let columns: IndexSet<&str> = records
            .iter()
            .flat_map(|record| record.keys().map(String::as_str))
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(*column).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            columns: columns.into_iter().map(str::to_string).collect(),
            rows,
        }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Ordered list of people known to the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    people: Vec<Person>,
}

impl Roster {
    pub fn new(people: Vec<Person>) -> Self {
        Self { people }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Display keys in roster order; these are the selectable names.
    pub fn display_keys(&self) -> Vec<String> {
        self.people.iter().map(Person::display_key).collect()
    }

    /// Display keys shared by more than one roster entry.
    ///
    /// Presence data for colliding keys merges silently, so callers surface
    /// these as a warning.
    pub fn duplicate_display_keys(&self) -> Vec<String> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for key in self.display_keys() {
            *counts.entry(key).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, _)| key)
            .collect()
    }
}

/// Validates the sheet schema and normalizes every row into a roster.
///
/// # Errors
/// - `RosterImportError::MissingColumns` when `Nom` or `Prénom` is absent
///   from `sheet.columns`.
pub fn import_roster(sheet: &RosterSheet) -> Result<Roster, RosterImportError> {
    let surname_idx = sheet.column_index(SURNAME_COLUMN);
    let given_name_idx = sheet.column_index(GIVEN_NAME_COLUMN);

    let (surname_idx, given_name_idx) = match (surname_idx, given_name_idx) {
        (Some(surname), Some(given_name)) => (surname, given_name),
        _ => {
            let missing = REQUIRED_COLUMNS
                .iter()
                .copied()
                .filter(|column| sheet.column_index(column).is_none())
                .collect();
            return Err(RosterImportError::MissingColumns(missing));
        }
    };

    let people = sheet
        .rows
        .iter()
        .map(|row| {
            let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
            Person::new(cell(surname_idx), cell(given_name_idx))
        })
        .collect();

    Ok(Roster::new(people))
}
