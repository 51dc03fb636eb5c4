//! Snapshot repository contract and JSON file implementation.
//!
//! # Responsibility
//! - Persist roster + presence as one JSON document and read it back.
//! - Reset durable state by removing the document.
//!
//! # Invariants
//! - Writes go to a sibling temp file that is renamed over the target, so a
//!   reader sees either the old or the new document, never a partial one.
//! - Writes and deletes for one path are serialized by a process-wide lock.
//! - `load` never fails: absent or malformed documents yield empty state.

use crate::model::presence::PresenceSet;
use crate::model::roster::Roster;
use log::{error, info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Instant;
use tempfile::NamedTempFile;

static PATH_LOCKS: Lazy<Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure.
#[derive(Debug)]
pub enum RepoError {
    /// Write, rename or delete failed.
    Io(std::io::Error),
    /// In-memory state could not be encoded.
    Serialize(serde_json::Error),
    /// The persisted document exists but cannot be decoded. Carries only
    /// the error category and position, never document content.
    Corrupted(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "attendance document I/O failed: {err}"),
            Self::Serialize(err) => write!(f, "failed to encode attendance document: {err}"),
            Self::Corrupted(message) => write!(f, "corrupted attendance document: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Corrupted(_) => None,
        }
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// In-memory state restored from, or reset by, the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AttendanceSnapshot {
    /// `null` in the document when no roster was imported. The key itself
    /// is required.
    #[serde(rename = "personnel", deserialize_with = "Option::deserialize")]
    pub roster: Option<Roster>,
    pub presence: PresenceSet,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    personnel: Option<&'a Roster>,
    presence: &'a PresenceSet,
}

/// Durable storage for the attendance snapshot.
pub trait SnapshotRepository {
    /// Overwrites the stored snapshot.
    fn save(&self, roster: Option<&Roster>, presence: &PresenceSet) -> RepoResult<()>;

    /// Strict read: `Ok(None)` when nothing is stored, `Corrupted` when the
    /// stored document cannot be decoded.
    fn try_load(&self) -> RepoResult<Option<AttendanceSnapshot>>;

    /// Removes stored data and returns the empty state. No-op when absent.
    fn clear(&self) -> RepoResult<AttendanceSnapshot>;

    /// Lenient read: every failure degrades to the empty state.
    ///
    /// Corruption is only visible in the `warn` log; callers that must not
    /// lose data silently use `try_load`.
    fn load(&self) -> AttendanceSnapshot {
        match self.try_load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => AttendanceSnapshot::default(),
            Err(err) => {
                warn!(
                    "event=snapshot_load module=repo status=degraded fallback=empty error={}",
                    err
                );
                AttendanceSnapshot::default()
            }
        }
    }
}

/// Snapshot repository backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock shared by every repository pointing at the same file.
    ///
    /// Entries are weak, so locks for paths no longer in use are dropped.
    fn write_lock(&self) -> Arc<Mutex<()>> {
        let key = std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone());
        let mut locks = PATH_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| lock.strong_count() > 0);
        if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
            return lock;
        }
        let lock = Arc::new(Mutex::new(()));
        locks.insert(key, Arc::downgrade(&lock));
        lock
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn write_atomic(&self, bytes: &[u8]) -> RepoResult<()> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(dir)?;
        // Why: rename is only atomic within one filesystem, so the temp file
        // is created next to the target.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| RepoError::Io(err.error))?;
        Ok(())
    }
}

impl SnapshotRepository for JsonFileRepository {
    fn save(&self, roster: Option<&Roster>, presence: &PresenceSet) -> RepoResult<()> {
        let started_at = Instant::now();
        let document = DocumentRef {
            personnel: roster,
            presence,
        };
        let bytes = serde_json::to_vec_pretty(&document).map_err(RepoError::Serialize)?;

        let lock = self.write_lock();
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.write_atomic(&bytes) {
            Ok(()) => {
                info!(
                    "event=snapshot_save module=repo status=ok duration_ms={} roster_size={} people_marked={} marks={}",
                    started_at.elapsed().as_millis(),
                    roster.map_or(0, Roster::len),
                    presence.len(),
                    presence.mark_count()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=snapshot_save module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn try_load(&self) -> RepoResult<Option<AttendanceSnapshot>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("event=snapshot_load module=repo status=absent");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let snapshot: AttendanceSnapshot = serde_json::from_slice(&bytes)
            .map_err(|err| RepoError::Corrupted(corruption_summary(&err)))?;
        info!(
            "event=snapshot_load module=repo status=ok roster_size={} people_marked={}",
            snapshot.roster.as_ref().map_or(0, Roster::len),
            snapshot.presence.len()
        );
        Ok(Some(snapshot))
    }

    fn clear(&self) -> RepoResult<AttendanceSnapshot> {
        let lock = self.write_lock();
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("event=snapshot_clear module=repo status=ok"),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("event=snapshot_clear module=repo status=absent");
            }
            Err(err) => {
                error!(
                    "event=snapshot_clear module=repo status=error error={}",
                    err
                );
                return Err(err.into());
            }
        }
        Ok(AttendanceSnapshot::default())
    }
}

/// Describes a decode failure by kind and position only; serde messages
/// quote the offending value, which may be a person's name.
fn corruption_summary(err: &serde_json::Error) -> String {
    let kind = match err.classify() {
        Category::Io => "io",
        Category::Syntax => "syntax",
        Category::Data => "unexpected data",
        Category::Eof => "truncated document",
    };
    format!("{kind} at line {} column {}", err.line(), err.column())
}
