//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record-store contract for note metadata.
//! - Isolate SQLite query details from the directory façade.
//!
//! # Invariants
//! - Repository APIs return semantic results (`Option` for point lookups,
//!   `NotFound` for failed updates) in addition to DB transport errors.

pub mod note_repo;
