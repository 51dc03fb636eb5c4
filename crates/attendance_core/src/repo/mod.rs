//! Persistence layer.
//!
//! # Responsibility
//! - Define the durable storage contract for roster + presence state.
//! - Keep file format and write strategy out of the service layer.
//!
//! # Invariants
//! - Persistence is always an explicit call; model mutations never write.
//! - The persisted document shape is
//!   `{"personnel": [{"Nom", "Prénom"}] | null, "presence": {key: [date]}}`.

pub mod snapshot_repo;
