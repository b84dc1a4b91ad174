//! Domain model for the note storage subsystem.
//!
//! # Responsibility
//! - Define the persisted note record and the in-memory note aggregate.
//! - Keep content loading state explicit instead of access-triggered.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - A record's `file_path` is derived from the id once and never changes.

pub mod note;
