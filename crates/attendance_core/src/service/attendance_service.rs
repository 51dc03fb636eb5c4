//! Attendance use-case service.
//!
//! # Responsibility
//! - Own the in-memory roster + presence state for one session.
//! - Apply user actions (import, mark, reset) and persist after each one.
//! - Expose statistics on demand.
//!
//! # Invariants
//! - Every mutating call ends with a `save` before returning `Ok`.
//! - A rejected import or reset leaves state and storage untouched.
//! - The hosting layer confines one service to one session, or wraps it in
//!   a single writer lock.

use crate::auth::verify_admin;
use crate::model::presence::{is_weekend, PresenceSet};
use crate::model::roster::{import_roster, Roster, RosterImportError, RosterSheet};
use crate::repo::snapshot_repo::{AttendanceSnapshot, RepoError, SnapshotRepository};
use crate::stats::{compute_statistics, StatisticsRow};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure surfaced to the hosting layer.
#[derive(Debug)]
pub enum ServiceError {
    /// Roster input lacks required columns.
    Import(RosterImportError),
    /// Persisting state failed.
    Repo(RepoError),
    /// Administrator credentials did not match.
    Unauthorized,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Unauthorized => write!(f, "invalid administrator credentials"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Import(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Unauthorized => None,
        }
    }
}

impl From<RosterImportError> for ServiceError {
    fn from(value: RosterImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of one bulk marking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    /// Marks that did not exist before.
    pub newly_marked: usize,
    /// Marks that were already stored for that date.
    pub already_present: usize,
    /// The date is a Saturday or Sunday; hosts may warn, nothing is rejected.
    pub weekend: bool,
}

/// Session-scoped attendance state plus its backing repository.
pub struct AttendanceService<R: SnapshotRepository> {
    repo: R,
    roster: Option<Roster>,
    presence: PresenceSet,
}

impl<R: SnapshotRepository> AttendanceService<R> {
    /// Restores state from `repo`, degrading to empty state on any failure.
    pub fn open(repo: R) -> Self {
        let AttendanceSnapshot { roster, presence } = repo.load();
        Self {
            repo,
            roster,
            presence,
        }
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    pub fn presence(&self) -> &PresenceSet {
        &self.presence
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Replaces the roster from sheet input and persists.
    ///
    /// Existing presence data is kept. Returns the imported roster size.
    pub fn import_roster(&mut self, sheet: &RosterSheet) -> ServiceResult<usize> {
        let roster = match import_roster(sheet) {
            Ok(roster) => roster,
            Err(err) => {
                warn!(
                    "event=roster_import module=service status=rejected error_code=missing_columns"
                );
                return Err(err.into());
            }
        };

        let duplicates = roster.duplicate_display_keys();
        if !duplicates.is_empty() {
            warn!(
                "event=roster_import module=service status=duplicate_keys duplicate_count={}",
                duplicates.len()
            );
        }

        let size = roster.len();
        self.repo.save(Some(&roster), &self.presence)?;
        self.roster = Some(roster);
        info!(
            "event=roster_import module=service status=ok roster_size={}",
            size
        );
        Ok(size)
    }

    /// Marks every key in `person_keys` present on `date` and persists once.
    pub fn mark_present<K: AsRef<str>>(
        &mut self,
        person_keys: &[K],
        date: NaiveDate,
    ) -> ServiceResult<MarkOutcome> {
        let mut next = self.presence.clone();
        let mut newly_marked = 0;
        for key in person_keys {
            if next.mark_present(key.as_ref(), date) {
                newly_marked += 1;
            }
        }

        self.repo.save(self.roster.as_ref(), &next)?;
        self.presence = next;

        let outcome = MarkOutcome {
            newly_marked,
            already_present: person_keys.len() - newly_marked,
            weekend: is_weekend(date),
        };
        info!(
            "event=presence_mark module=service status=ok selected={} new={} weekend={}",
            person_keys.len(),
            outcome.newly_marked,
            outcome.weekend
        );
        Ok(outcome)
    }

    /// Dates marked for one display key, ascending.
    pub fn present_dates(&self, person_key: &str) -> &BTreeSet<NaiveDate> {
        self.presence.present_dates(person_key)
    }

    /// Current statistics report, in first-mark order.
    pub fn statistics(&self) -> Vec<StatisticsRow> {
        compute_statistics(&self.presence)
    }

    /// Removes all roster and presence data after an administrator check.
    pub fn reset(&mut self, username: &str, password: &str) -> ServiceResult<()> {
        if !verify_admin(username, password) {
            warn!("event=data_reset module=service status=unauthorized");
            return Err(ServiceError::Unauthorized);
        }

        let AttendanceSnapshot { roster, presence } = self.repo.clear()?;
        self.roster = roster;
        self.presence = presence;
        info!("event=data_reset module=service status=ok");
        Ok(())
    }
}
