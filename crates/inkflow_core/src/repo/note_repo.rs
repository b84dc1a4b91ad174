//! Note record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable CRUD APIs over the single `notes` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `insert` has upsert semantics: an existing id falls back to the update
//!   path instead of failing.
//! - `update` only touches mutable fields; `file_path` and `created_at` are
//!   immutable after the first insert.
//! - `get_all` returns rows ordered by `start_time DESC` (newest first).
//! - `delete` is idempotent; deleting an absent id succeeds.

use crate::db::DbError;
use crate::model::note::{now_epoch_seconds, NoteId, NoteRecord};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    emoji,
    title,
    summary,
    file_path,
    start_time,
    end_time,
    created_at,
    updated_at
FROM notes";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "emoji",
    "title",
    "summary",
    "file_path",
    "start_time",
    "end_time",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Record-store error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record-store interface for note metadata.
///
/// `created_at` and `updated_at` on incoming records are informational only:
/// the store assigns both on insert and bumps `updated_at` on every update.
pub trait NoteRepository {
    /// Inserts the record; falls back to `update` when the id already exists.
    fn insert(&self, record: &NoteRecord) -> RepoResult<()>;
    /// Overwrites mutable fields keyed by id. `NotFound` when no row matches.
    fn update(&self, record: &NoteRecord) -> RepoResult<()>;
    /// Removes the row; absent ids are not an error.
    fn delete(&self, id: NoteId) -> RepoResult<()>;
    /// All records ordered by start time, descending.
    fn get_all(&self) -> RepoResult<Vec<NoteRecord>>;
    /// Point lookup; `None` when absent.
    fn get_one(&self, id: NoteId) -> RepoResult<Option<NoteRecord>>;
}

/// SQLite-backed note record store.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert(&self, record: &NoteRecord) -> RepoResult<()> {
        if self.get_one(record.id)?.is_some() {
            log::info!(
                "event=note_insert module=repo status=fallback_update id={}",
                record.id
            );
            return self.update(record);
        }

        let now = now_epoch_seconds();
        self.conn.execute(
            "INSERT INTO notes (
                id,
                emoji,
                title,
                summary,
                file_path,
                start_time,
                end_time,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                record.id.to_string(),
                record.emoji.as_str(),
                record.title.as_str(),
                record.summary.as_str(),
                record.file_path.as_str(),
                record.start_time,
                record.end_time,
                now,
                now,
            ],
        )?;

        Ok(())
    }

    fn update(&self, record: &NoteRecord) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                emoji = ?1,
                title = ?2,
                summary = ?3,
                start_time = ?4,
                end_time = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                record.emoji.as_str(),
                record.title.as_str(),
                record.summary.as_str(),
                record.start_time,
                record.end_time,
                now_epoch_seconds(),
                record.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }

        Ok(())
    }

    fn delete(&self, id: NoteId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        Ok(())
    }

    fn get_all(&self) -> RepoResult<Vec<NoteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY start_time DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_note_row(row)?);
        }
        Ok(records)
    }

    fn get_one(&self, id: NoteId) -> RepoResult<Option<NoteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<NoteRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id")))?;

    Ok(NoteRecord {
        id,
        emoji: row.get("emoji")?,
        title: row.get("title")?,
        summary: row.get("summary")?,
        file_path: row.get("file_path")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected = crate::db::migrations::latest_version();
    let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual != expected {
        return Err(RepoError::UninitializedConnection {
            expected_version: expected,
            actual_version: actual,
        });
    }

    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    for column in REQUIRED_COLUMNS.iter().copied() {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
