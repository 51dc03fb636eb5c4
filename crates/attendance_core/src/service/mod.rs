//! Core use-case services.
//!
//! # Responsibility
//! - Thread explicit session state through roster, presence and storage.
//! - Keep hosting layers (CLI, web) decoupled from file format details.

pub mod attendance_service;
