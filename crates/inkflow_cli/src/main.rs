//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `inkflow_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use inkflow_core::db::open_db_in_memory;
use inkflow_core::SqliteNoteRepository;

fn main() {
    println!("inkflow_core version={}", inkflow_core::core_version());

    match open_db_in_memory() {
        Ok(conn) => match SqliteNoteRepository::try_new(&conn) {
            Ok(repo) => {
                use inkflow_core::NoteRepository;
                let count = repo.get_all().map(|records| records.len()).unwrap_or(0);
                println!("inkflow_core storage=ok notes={count}");
            }
            Err(err) => eprintln!("inkflow_core storage=error error={err}"),
        },
        Err(err) => eprintln!("inkflow_core db=error error={err}"),
    }
}
