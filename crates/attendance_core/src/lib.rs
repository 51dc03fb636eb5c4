//! Core domain logic for the attendance tracker.
//! This crate owns roster import, presence marking, statistics and the
//! persisted document; hosting layers only call into it.

pub mod auth;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use auth::verify_admin;
pub use config::AttendanceConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{display_key, Person};
pub use model::presence::{is_weekend, PresenceSet};
pub use model::roster::{import_roster, Roster, RosterImportError, RosterSheet};
pub use repo::snapshot_repo::{
    AttendanceSnapshot, JsonFileRepository, RepoError, RepoResult, SnapshotRepository,
};
pub use service::attendance_service::{
    AttendanceService, MarkOutcome, ServiceError, ServiceResult,
};
pub use stats::{compute_statistics, export_table, ExportTable, StatisticsRow, EXPORT_COLUMNS};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
