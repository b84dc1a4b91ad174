//! Process-start initialization flow.
//!
//! # Responsibility
//! - Track first-launch / data-version / sample-data flags in a small JSON
//!   file outside the notes table.
//! - Run first-run setup, the version-migration hook and maintenance tasks
//!   (orphan cleanup, storage statistics) once per process start.
//!
//! # Invariants
//! - Sample notes are seeded at most once, and only into an empty directory.
//! - Flags are rewritten with the current data version after every run.

use crate::model::note::{now_epoch_seconds, NoteDraft};
use crate::repo::note_repo::NoteRepository;
use crate::service::note_directory::{DirectoryError, NoteDirectory};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Data version written to the flags file by this binary.
pub const CURRENT_DATA_VERSION: &str = "1.0";

const SECONDS_PER_DAY: f64 = 86_400.0;

pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[derive(Debug)]
pub enum BootstrapError {
    Directory(DirectoryError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "flags file I/O failed at `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "flags file is not valid JSON: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Directory(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<DirectoryError> for BootstrapError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

impl From<serde_json::Error> for BootstrapError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Process-wide initialization state, persisted outside the notes table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitFlags {
    pub has_initialized: bool,
    pub data_version: Option<String>,
    pub sample_data_loaded: bool,
}

impl InitFlags {
    /// Loads flags from `path`; a missing file yields defaults.
    ///
    /// A corrupt file is logged and treated as defaults rather than blocking
    /// startup.
    pub fn load(path: &Path) -> BootstrapResult<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(BootstrapError::Io {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        };

        match serde_json::from_str(&raw) {
            Ok(flags) => Ok(flags),
            Err(err) => {
                warn!(
                    "event=flags_load module=bootstrap status=corrupt path={} error={err}",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Writes flags to `path` as JSON.
    pub fn store(&self, path: &Path) -> BootstrapResult<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).map_err(|err| BootstrapError::Io {
            path: path.to_path_buf(),
            source: err,
        })
    }
}

/// Runs the process-start initialization sequence.
///
/// Loads the current notes, performs first-launch setup or the version
/// migration hook, seeds sample notes into an empty directory (once), runs
/// maintenance, and persists the updated flags.
pub fn initialize<R: NoteRepository>(
    directory: &mut NoteDirectory<R>,
    flags_path: &Path,
) -> BootstrapResult<InitFlags> {
    let mut flags = InitFlags::load(flags_path)?;

    directory.load_all()?;

    if !flags.has_initialized {
        info!("event=first_launch module=bootstrap status=start");
    } else if flags.data_version.as_deref() != Some(CURRENT_DATA_VERSION) {
        migrate_data(&flags);
    }

    if directory.notes().is_empty() && !flags.sample_data_loaded {
        seed_sample_notes(directory)?;
        flags.sample_data_loaded = true;
    }

    run_maintenance(directory);

    flags.has_initialized = true;
    flags.data_version = Some(CURRENT_DATA_VERSION.to_string());
    flags.store(flags_path)?;
    info!(
        "event=bootstrap module=bootstrap status=ok version={CURRENT_DATA_VERSION} notes={}",
        directory.notes().len()
    );
    Ok(flags)
}

/// Version-migration hook. Currently only version 1.0 data exists, so this
/// logs and leaves the data untouched.
fn migrate_data(flags: &InitFlags) {
    info!(
        "event=data_migration module=bootstrap status=noop from={}",
        flags.data_version.as_deref().unwrap_or("unversioned")
    );
}

fn seed_sample_notes<R: NoteRepository>(
    directory: &mut NoteDirectory<R>,
) -> BootstrapResult<()> {
    let now = now_epoch_seconds();
    let samples: &[(&str, &str, f64, f64, &str)] = &[
        (
            "📝",
            "Team meeting notes",
            now - 3_600.0,
            now - 1_800.0,
            "# Team meeting\nDiscussed overall project progress and the next development phase.",
        ),
        (
            "💡",
            "Product idea",
            now - 1_800.0,
            now - 900.0,
            "A feature idea from brainstorming: help users organize notes and thoughts better.",
        ),
        (
            "📚",
            "Study plan",
            now - SECONDS_PER_DAY - 7_200.0,
            now - SECONDS_PER_DAY - 5_400.0,
            "## Study plan\nTopics: architecture patterns, performance tuning, design principles.",
        ),
        (
            "🛒",
            "Shopping list",
            now - 2.0 * SECONDS_PER_DAY - 5_400.0,
            now - 2.0 * SECONDS_PER_DAY - 3_600.0,
            "Things to buy: books, office supplies, workout gear.",
        ),
    ];

    for (emoji, title, start, end, content) in samples {
        let draft = NoteDraft::new(*emoji, *title, *start, *end);
        directory.save(draft, content)?;
    }

    info!(
        "event=sample_seed module=bootstrap status=ok count={}",
        samples.len()
    );
    Ok(())
}

/// Maintenance pass: orphan cleanup plus a storage-statistics log line.
/// Failures here degrade to a warning; they never block startup.
fn run_maintenance<R: NoteRepository>(directory: &NoteDirectory<R>) {
    match directory.cleanup_orphans() {
        Ok(deleted) => {
            if !deleted.is_empty() {
                info!(
                    "event=maintenance module=bootstrap status=ok orphans_deleted={}",
                    deleted.len()
                );
            }
        }
        Err(err) => warn!("event=maintenance module=bootstrap status=cleanup_error error={err}"),
    }

    match directory.storage_stats() {
        Ok(stats) => info!(
            "event=storage_stats module=bootstrap status=ok notes={} bytes={}",
            stats.note_count, stats.total_file_size
        ),
        Err(err) => warn!("event=maintenance module=bootstrap status=stats_error error={err}"),
    }
}
