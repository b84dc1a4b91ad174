//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record-store and content-store calls into the directory
//!   façade observed by presentation layers.
//! - Keep callers decoupled from storage details.

pub mod note_directory;
