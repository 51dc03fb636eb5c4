//! Presence statistics and export table.
//!
//! # Responsibility
//! - Derive one report row per person with at least one presence.
//! - Shape rows for the spreadsheet export collaborator.
//!
//! # Invariants
//! - Rows follow presence-store key order (first mark), not name order.
//! - `count` equals the number of entries in `dates`.

use crate::model::presence::PresenceSet;
use serde::Serialize;

/// Export column headers, in output order.
pub const EXPORT_COLUMNS: [&str; 3] = ["Personne", "Nombre de présences", "Dates de présence"];

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
const DATE_SEPARATOR: &str = ", ";

/// One report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticsRow {
    #[serde(rename = "Personne")]
    pub person: String,
    #[serde(rename = "Nombre de présences")]
    pub count: usize,
    /// Ascending `DD/MM/YYYY` dates joined by `", "`.
    #[serde(rename = "Dates de présence")]
    pub dates: String,
}

impl StatisticsRow {
    /// Cell values in `EXPORT_COLUMNS` order.
    pub fn to_export_record(&self) -> [String; 3] {
        [self.person.clone(), self.count.to_string(), self.dates.clone()]
    }
}

/// Builds the report from the presence store. Pure; empty store, empty report.
pub fn compute_statistics(presence: &PresenceSet) -> Vec<StatisticsRow> {
    presence
        .iter()
        .filter(|(_, dates)| !dates.is_empty())
        .map(|(person, dates)| StatisticsRow {
            person: person.to_string(),
            count: dates.len(),
            dates: dates
                .iter()
                .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
                .collect::<Vec<_>>()
                .join(DATE_SEPARATOR),
        })
        .collect()
}

/// Header plus string records, ready for a spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub columns: [&'static str; 3],
    pub records: Vec<[String; 3]>,
}

pub fn export_table(rows: &[StatisticsRow]) -> ExportTable {
    ExportTable {
        columns: EXPORT_COLUMNS,
        records: rows.iter().map(StatisticsRow::to_export_record).collect(),
    }
}
