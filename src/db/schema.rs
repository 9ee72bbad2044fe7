use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use std::path::Path;
use std::sync::Mutex;

use super::models::{Note, Section, BUILTIN_SECTIONS};
use crate::utils::now_ms;

pub struct Database {
    conn: Mutex<Connection>,
    path: String,
}

impl Database {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn = Connection::open(&path)?;
        let db = Database { conn: Mutex::new(conn), path: path_str };
        db.init()?;
        Ok(db)
    }

    pub fn get_path(&self) -> String {
        self.path.clone()
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn: Mutex::new(conn), path: ":memory:".to_string() };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS sections (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                tags TEXT,
                description TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                is_bookmarked INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                section_id TEXT NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                tags TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_notes_section ON notes(section_id);
            CREATE INDEX IF NOT EXISTS idx_notes_updated ON notes(updated_at);
            ",
        )?;

        // Built-in sections are seeded once; re-running init never clobbers
        // user edits to their names or descriptions.
        let now = now_ms();
        for (id, name) in BUILTIN_SECTIONS {
            conn.execute(
                "INSERT OR IGNORE INTO sections (id, name, created_at, updated_at, is_bookmarked)
                 VALUES (?1, ?2, ?3, ?3, 0)",
                params![id, name, now],
            )?;
        }

        Ok(())
    }

    // ==================== Sections ====================

    pub fn create_section(&self, section: &Section) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sections (id, name, tags, description, created_at, updated_at, is_bookmarked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                section.id,
                section.name,
                tags_to_json(&section.tags),
                section.description,
                section.created_at,
                section.updated_at,
                section.is_bookmarked as i32,
            ],
        )?;
        Ok(())
    }

    pub fn get_section(&self, id: &str) -> Result<Option<Section>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, name, tags, description, created_at, updated_at, is_bookmarked
             FROM sections WHERE id = ?1",
            params![id],
            row_to_section,
        )
        .optional()
    }

    pub fn get_sections(&self) -> Result<Vec<Section>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, tags, description, created_at, updated_at, is_bookmarked
             FROM sections ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map([], row_to_section)?;
        rows.collect()
    }

    /// Case-insensitive exact name lookup, matching the comparison the
    /// command parser uses for `@Section` mentions.
    pub fn find_section_by_name(&self, name: &str) -> Result<Option<Section>> {
        let wanted = name.to_lowercase();
        Ok(self
            .get_sections()?
            .into_iter()
            .find(|s| s.name.to_lowercase() == wanted))
    }

    pub fn rename_section(&self, id: &str, name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE sections SET name = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, name, now_ms()],
        )?;
        Ok(())
    }

    /// Description write-back. Concurrent writers race last-write-wins;
    /// callers accept that (descriptions are regenerated on the next edit).
    pub fn set_section_description(&self, id: &str, description: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE sections SET description = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, description, now_ms()],
        )?;
        Ok(())
    }

    pub fn set_section_bookmarked(&self, id: &str, bookmarked: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE sections SET is_bookmarked = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, bookmarked as i32, now_ms()],
        )?;
        Ok(())
    }

    /// Deletes the section and, through the foreign key, every note in it.
    pub fn delete_section(&self, id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM sections WHERE id = ?1", params![id])
    }

    // ==================== Notes ====================

    pub fn create_note(&self, note: &Note) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO notes (id, text, section_id, created_at, updated_at, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note.id,
                note.text,
                note.section_id,
                note.created_at,
                note.updated_at,
                tags_to_json(&note.tags),
            ],
        )?;
        Ok(())
    }

    pub fn get_note(&self, id: &str) -> Result<Option<Note>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, text, section_id, created_at, updated_at, tags
             FROM notes WHERE id = ?1",
            params![id],
            row_to_note,
        )
        .optional()
    }

    pub fn get_all_notes(&self) -> Result<Vec<Note>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, text, section_id, created_at, updated_at, tags
             FROM notes ORDER BY updated_at DESC, id ASC",
        )?;
        let rows = stmt.query_map([], row_to_note)?;
        rows.collect()
    }

    pub fn get_notes_for_section(&self, section_id: &str) -> Result<Vec<Note>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, text, section_id, created_at, updated_at, tags
             FROM notes WHERE section_id = ?1 ORDER BY updated_at DESC, id ASC",
        )?;
        let rows = stmt.query_map(params![section_id], row_to_note)?;
        rows.collect()
    }

    pub fn recent_notes_for_section(&self, section_id: &str, limit: usize) -> Result<Vec<Note>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, text, section_id, created_at, updated_at, tags
             FROM notes WHERE section_id = ?1 ORDER BY updated_at DESC, id ASC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![section_id, limit as i64], row_to_note)?;
        rows.collect()
    }

    pub fn update_note_text(&self, id: &str, text: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE notes SET text = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, text, now_ms()],
        )?;
        Ok(())
    }

    pub fn move_note(&self, id: &str, section_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE notes SET section_id = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, section_id, now_ms()],
        )?;
        Ok(())
    }

    pub fn delete_note(&self, id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM notes WHERE id = ?1", params![id])
    }
}

fn row_to_section(row: &Row) -> Result<Section> {
    let tags_json: Option<String> = row.get(2)?;
    Ok(Section {
        id: row.get(0)?,
        name: row.get(1)?,
        tags: tags_from_json(tags_json),
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        is_bookmarked: row.get::<_, i32>(6)? != 0,
    })
}

fn row_to_note(row: &Row) -> Result<Note> {
    let tags_json: Option<String> = row.get(5)?;
    Ok(Note {
        id: row.get(0)?,
        text: row.get(1)?,
        section_id: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        tags: tags_from_json(tags_json),
    })
}

fn tags_to_json(tags: &Option<Vec<String>>) -> Option<String> {
    tags.as_ref().and_then(|t| serde_json::to_string(t).ok())
}

fn tags_from_json(json: Option<String>) -> Option<Vec<String>> {
    json.and_then(|t| serde_json::from_str(&t).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sections_seeded() {
        let db = Database::in_memory().unwrap();
        let sections = db.get_sections().unwrap();
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        for (id, _) in BUILTIN_SECTIONS {
            assert!(ids.contains(id), "missing builtin section {}", id);
        }
    }

    #[test]
    fn test_note_crud_and_ordering() {
        let db = Database::in_memory().unwrap();

        let mut first = Note::new("buy milk", "tasks");
        first.updated_at = 1000;
        let mut second = Note::new("call dentist", "tasks");
        second.updated_at = 2000;
        db.create_note(&first).unwrap();
        db.create_note(&second).unwrap();

        let notes = db.get_notes_for_section("tasks").unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].text, "call dentist");

        let recent = db.recent_notes_for_section("tasks", 1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].text, "call dentist");

        db.delete_note(&first.id).unwrap();
        assert!(db.get_note(&first.id).unwrap().is_none());
    }

    #[test]
    fn test_note_requires_existing_section() {
        let db = Database::in_memory().unwrap();
        let note = Note::new("orphan", "no-such-section");
        assert!(db.create_note(&note).is_err());
    }

    #[test]
    fn test_delete_section_cascades_to_notes() {
        let db = Database::in_memory().unwrap();
        let section = Section::new("Recipes");
        db.create_section(&section).unwrap();

        let note = Note::new("pasta carbonara", &section.id);
        db.create_note(&note).unwrap();

        db.delete_section(&section.id).unwrap();
        assert!(db.get_section(&section.id).unwrap().is_none());
        assert!(db.get_note(&note.id).unwrap().is_none());
    }

    #[test]
    fn test_find_section_by_name_is_case_insensitive() {
        let db = Database::in_memory().unwrap();
        let section = Section::new("Recipes");
        db.create_section(&section).unwrap();

        let found = db.find_section_by_name("recipes").unwrap().unwrap();
        assert_eq!(found.id, section.id);
        assert!(db.find_section_by_name("missing").unwrap().is_none());
    }

    #[test]
    fn test_section_tags_round_trip() {
        let db = Database::in_memory().unwrap();
        let mut section = Section::new("Trips");
        section.tags = Some(vec!["travel".to_string(), "planning".to_string()]);
        db.create_section(&section).unwrap();

        let loaded = db.get_section(&section.id).unwrap().unwrap();
        assert_eq!(loaded.tags, section.tags);
    }

    #[test]
    fn test_description_write_back() {
        let db = Database::in_memory().unwrap();
        db.set_section_description("tasks", "Errands and follow-ups.").unwrap();
        let section = db.get_section("tasks").unwrap().unwrap();
        assert_eq!(section.description.as_deref(), Some("Errands and follow-ups."));
    }
}
