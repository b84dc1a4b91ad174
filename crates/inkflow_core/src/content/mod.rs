//! File-backed note content storage.
//!
//! # Responsibility
//! - Map note ids to deterministic content file paths.
//! - Perform whole-file text read/write/delete with atomic replacement.
//! - Derive plain-text summaries from markdown content.
//!
//! # Invariants
//! - A content file holds raw UTF-8 text; reads never return partial content.
//! - Missing files are not-found results, not errors.

pub mod store;
pub mod summary;
