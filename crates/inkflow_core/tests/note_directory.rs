use inkflow_core::db::open_db_in_memory;
use inkflow_core::{
    ContentStore, DirectoryError, NoteDirectory, NoteDraft, NoteRecord, NoteRepository, RepoError,
    SqliteNoteRepository,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// 2024-01-01T10:00:00Z and friends
const DAY1_10H: f64 = 1_704_103_200.0;
const DAY2_10H: f64 = DAY1_10H + 86_400.0;
const DAY3_10H: f64 = DAY2_10H + 86_400.0;
const DAY3_11H: f64 = DAY3_10H + 3_600.0;

fn draft(emoji: &str, title: &str, start: f64) -> NoteDraft {
    NoteDraft::new(emoji, title, start, start + 60.0)
}

#[test]
fn save_then_list_matches_saved_fields() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    let saved = directory
        .save(draft("📝", "Meeting", DAY1_10H), "# Meeting\nNotes here")
        .unwrap();

    assert_eq!(saved.record.title, "Meeting");
    assert_eq!(saved.record.summary, "Meeting", "heading marker stripped");
    assert!(saved.record.updated_at >= saved.record.created_at);
    assert_eq!(
        saved.content.text(),
        Some("# Meeting\nNotes here"),
        "fresh save keeps content loaded"
    );

    // durable: visible through a fresh repository on the same connection
    let reader = SqliteNoteRepository::try_new(&conn).unwrap();
    let record = reader.get_one(saved.id()).unwrap().unwrap();
    assert_eq!(record.title, "Meeting");
    assert_eq!(record.summary, "Meeting");

    // file content preserved verbatim
    let text = directory
        .files()
        .read(Path::new(&record.file_path))
        .unwrap()
        .unwrap();
    assert_eq!(text, "# Meeting\nNotes here");
}

#[test]
fn load_all_is_an_idempotent_full_refresh() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    directory.save(draft("📝", "one", DAY1_10H), "one").unwrap();
    directory.save(draft("📝", "two", DAY2_10H), "two").unwrap();

    directory.load_all().unwrap();
    directory.load_all().unwrap();

    assert_eq!(directory.notes().len(), 2);
    assert_eq!(directory.notes()[0].record.title, "two", "newest first");
    assert!(
        directory.notes().iter().all(|n| !n.content.is_loaded()),
        "refresh does not eagerly load content"
    );
}

#[test]
fn update_with_new_content_rewrites_file_and_summary() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    let saved = directory
        .save(draft("📝", "Meeting", DAY1_10H), "# Meeting\nNotes here")
        .unwrap();

    let updated = directory
        .update(&saved, Some("# Retro\nWhat went well"))
        .unwrap();
    assert_eq!(updated.record.summary, "Retro");
    assert_eq!(updated.content.text(), Some("# Retro\nWhat went well"));

    let text = directory
        .files()
        .read(Path::new(&updated.record.file_path))
        .unwrap()
        .unwrap();
    assert_eq!(text, "# Retro\nWhat went well");

    assert_eq!(directory.notes().len(), 1);
    assert_eq!(directory.notes()[0].record.summary, "Retro");
}

#[test]
fn update_without_content_keeps_file_untouched() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    let saved = directory
        .save(draft("📝", "Meeting", DAY1_10H), "body text")
        .unwrap();

    let mut renamed = saved.clone();
    renamed.record.title = "Renamed".to_string();
    let updated = directory.update(&renamed, None).unwrap();

    assert_eq!(updated.record.title, "Renamed");
    let text = directory
        .files()
        .read(Path::new(&updated.record.file_path))
        .unwrap()
        .unwrap();
    assert_eq!(text, "body text");
}

#[test]
fn delete_removes_record_file_and_list_entry() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    let saved = directory
        .save(draft("📝", "Meeting", DAY1_10H), "body")
        .unwrap();
    let file_path = saved.record.file_path.clone();

    directory.delete(&saved).unwrap();

    assert!(directory.notes().is_empty());
    let reader = SqliteNoteRepository::try_new(&conn).unwrap();
    assert!(reader.get_one(saved.id()).unwrap().is_none());
    assert!(directory.files().read(Path::new(&file_path)).unwrap().is_none());
}

#[test]
fn load_content_returns_detached_loaded_copy() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    directory
        .save(draft("📝", "Meeting", DAY1_10H), "lazy body")
        .unwrap();
    directory.load_all().unwrap();

    let listed = directory.notes()[0].clone();
    assert!(!listed.content.is_loaded());

    let loaded = directory.load_content(&listed).unwrap().unwrap();
    assert_eq!(loaded.content.text(), Some("lazy body"));
    // the listed entry itself stays unloaded
    assert!(!directory.notes()[0].content.is_loaded());
}

#[test]
fn load_content_of_orphaned_record_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    let saved = directory
        .save(draft("📝", "Meeting", DAY1_10H), "body")
        .unwrap();
    std::fs::remove_file(&saved.record.file_path).unwrap();
    directory.load_all().unwrap();

    let listed = directory.notes()[0].clone();
    assert!(directory.load_content(&listed).unwrap().is_none());
}

#[test]
fn search_matches_title_summary_and_emoji_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    directory
        .save(draft("📝", "Weekly Meeting", DAY1_10H), "agenda items")
        .unwrap();
    directory
        .save(draft("🎯", "Goals", DAY2_10H), "quarterly planning")
        .unwrap();

    let by_title = directory.search("meeting");
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].record.title, "Weekly Meeting");

    let by_summary = directory.search("PLANNING");
    assert_eq!(by_summary.len(), 1);
    assert_eq!(by_summary[0].record.title, "Goals");

    let by_emoji = directory.search("🎯");
    assert_eq!(by_emoji.len(), 1);

    assert!(directory.search("absent").is_empty());
}

#[test]
fn group_by_date_partitions_three_days_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    directory.save(draft("📝", "d1", DAY1_10H), "a").unwrap();
    directory.save(draft("📝", "d2", DAY2_10H), "b").unwrap();
    directory.save(draft("📝", "d3-early", DAY3_10H), "c").unwrap();
    directory.save(draft("📝", "d3-late", DAY3_11H), "d").unwrap();

    let groups = directory.group_by_date();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].day, "2024-01-03");
    assert_eq!(groups[1].day, "2024-01-02");
    assert_eq!(groups[2].day, "2024-01-01");

    let day3_titles: Vec<&str> = groups[0]
        .notes
        .iter()
        .map(|n| n.record.title.as_str())
        .collect();
    assert_eq!(day3_titles, vec!["d3-late", "d3-early"]);
}

#[test]
fn group_by_date_over_two_days_returns_two_groups() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    directory.save(draft("📝", "old", DAY1_10H), "a").unwrap();
    directory.save(draft("📝", "new", DAY2_10H), "b").unwrap();

    let groups = directory.group_by_date();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].day, "2024-01-02");
    assert_eq!(groups[1].day, "2024-01-01");
}

#[test]
fn cleanup_orphans_deletes_only_unreferenced_files() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    let kept = directory
        .save(draft("📝", "kept", DAY1_10H), "kept body")
        .unwrap();

    let stray = directory.files().path_for(Uuid::new_v4());
    directory.files().write(&stray, "orphaned body").unwrap();

    let deleted = directory.cleanup_orphans().unwrap();
    assert_eq!(deleted, vec![stray.clone()]);
    assert!(directory.files().read(&stray).unwrap().is_none());
    assert!(directory
        .files()
        .read(Path::new(&kept.record.file_path))
        .unwrap()
        .is_some());
}

#[test]
fn storage_stats_counts_notes_and_bytes() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    directory.save(draft("📝", "a", DAY1_10H), "12345").unwrap();
    directory.save(draft("📝", "b", DAY2_10H), "1234567890").unwrap();

    let stats = directory.storage_stats().unwrap();
    assert_eq!(stats.note_count, 2);
    assert_eq!(stats.total_file_size, 15);
}

#[test]
fn version_bumps_and_listeners_fire_on_every_mutation() {
    let conn = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let mut directory = NoteDirectory::new(repo, files);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    directory.subscribe(Box::new(move |version| {
        sink.lock().unwrap().push(version);
    }));

    assert_eq!(directory.version(), 0);
    let saved = directory.save(draft("📝", "a", DAY1_10H), "a").unwrap();
    directory.update(&saved, None).unwrap();
    directory.delete(&saved).unwrap();
    directory.load_all().unwrap();

    assert_eq!(directory.version(), 4);
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn failed_record_write_rolls_back_the_content_file() {
    let dir = tempfile::tempdir().unwrap();
    let files = ContentStore::new(dir.path().join("notes")).unwrap();
    let mut directory = NoteDirectory::new(RejectingRepository, files);

    let err = directory
        .save(draft("📝", "doomed", DAY1_10H), "never persisted")
        .unwrap_err();
    assert!(matches!(err, DirectoryError::Repo(_)));

    assert!(
        directory.files().list_files().unwrap().is_empty(),
        "compensating rollback removed the just-written file"
    );
    assert!(directory.notes().is_empty());
    assert_eq!(directory.version(), 0, "failed save notifies nobody");
}

/// Record store double whose writes always fail.
struct RejectingRepository;

impl NoteRepository for RejectingRepository {
    fn insert(&self, record: &NoteRecord) -> Result<(), RepoError> {
        Err(RepoError::InvalidData(format!(
            "simulated insert failure for {}",
            record.id
        )))
    }

    fn update(&self, record: &NoteRecord) -> Result<(), RepoError> {
        Err(RepoError::NotFound(record.id))
    }

    fn delete(&self, _id: inkflow_core::NoteId) -> Result<(), RepoError> {
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<NoteRecord>, RepoError> {
        Ok(Vec::new())
    }

    fn get_one(&self, _id: inkflow_core::NoteId) -> Result<Option<NoteRecord>, RepoError> {
        Ok(None)
    }
}
