use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::entity::{Note, NotePayload};
use crate::error::{QuickNotesError, Result};

pub const NOTES_DB: &str = "notes.db";

/// SQLite-backed note table.
///
/// Every mutation is a single-row statement, so a failed call never leaves a
/// partially written note behind.
pub struct NoteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl NoteStore {
    /// Open or create the database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_notes_created_at ON notes(created_at)",
            [],
        )?;

        Ok(())
    }

    /// All notes, newest first.
    pub fn list(&self) -> Result<Vec<Note>> {
        // Fixed-width RFC 3339 text sorts chronologically; rowid breaks ties.
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, created_at, updated_at
             FROM notes
             ORDER BY created_at DESC, rowid DESC",
        )?;

        let notes = stmt
            .query_map([], note_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Look a note up by id.
    pub fn find(&self, id: &Uuid) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                "SELECT id, title, content, created_at, updated_at
                 FROM notes WHERE id = ?1",
                [id.to_string()],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }

    /// Like [`find`](Self::find) but absence is an error.
    pub fn get(&self, id: &Uuid) -> Result<Note> {
        self.find(id)?
            .ok_or_else(|| QuickNotesError::NotFound(id.to_string()))
    }

    /// Validate and insert a new note.
    pub fn create(&self, payload: &NotePayload) -> Result<Note> {
        let input = payload.validate().map_err(QuickNotesError::Validation)?;
        let note = Note::new(input);

        self.conn.execute(
            "INSERT INTO notes (id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.id.to_string(),
                note.title,
                note.content,
                format_timestamp(&note.created_at),
                format_timestamp(&note.updated_at),
            ],
        )?;

        Ok(note)
    }

    /// Replace title and content of an existing note.
    ///
    /// Existence is checked before validation, so an unknown id is always
    /// reported as not found.
    pub fn update(&self, id: &Uuid, payload: &NotePayload) -> Result<Note> {
        let mut note = self.get(id)?;
        let input = payload.validate().map_err(QuickNotesError::Validation)?;
        note.replace(input);

        let changed = self.conn.execute(
            "UPDATE notes SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                note.title,
                note.content,
                format_timestamp(&note.updated_at),
                note.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(QuickNotesError::NotFound(id.to_string()));
        }

        Ok(note)
    }

    /// Permanently remove a note.
    pub fn delete(&self, id: &Uuid) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", [id.to_string()])?;
        if changed == 0 {
            return Err(QuickNotesError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;

    Ok(Note {
        id,
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: parse_timestamp(3, &created_at)?,
        updated_at: parse_timestamp(4, &updated_at)?,
    })
}

impl From<rusqlite::Error> for QuickNotesError {
    fn from(e: rusqlite::Error) -> Self {
        QuickNotesError::Storage(format!("SQLite error: {}", e))
    }
}
