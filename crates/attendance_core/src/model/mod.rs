//! Attendance domain model.
//!
//! # Responsibility
//! - Define the roster, person identity and presence structures used by
//!   the statistics and persistence layers.
//!
//! # Invariants
//! - Presence is keyed by the person display key, not by roster position;
//!   replacing the roster leaves presence data untouched.

pub mod person;
pub mod presence;
pub mod roster;
