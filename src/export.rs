//! JSON snapshot export/import.
//!
//! Round-trips the whole sections/notes collection through the same wire
//! representation the models serialize to. Import is additive and tolerant:
//! existing ids are skipped and notes pointing at a missing section are
//! reported, not fatal.

use serde::{Deserialize, Serialize};

use crate::db::{Database, Note, Section};

/// Full snapshot of a database, in wire field names.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub sections: Vec<Section>,
    pub notes: Vec<Note>,
}

/// Import result summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub sections_imported: usize,
    pub notes_imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Serialize every section and note to pretty-printed JSON.
pub fn export_snapshot(db: &Database) -> Result<String, String> {
    let snapshot = Snapshot {
        sections: db.get_sections().map_err(|e| e.to_string())?,
        notes: db.get_all_notes().map_err(|e| e.to_string())?,
    };
    serde_json::to_string_pretty(&snapshot)
        .map_err(|e| format!("Failed to serialize snapshot: {}", e))
}

/// Import a snapshot produced by `export_snapshot`.
///
/// Sections come first so notes can resolve their foreign keys. Records
/// whose id already exists are counted as skipped; notes referencing a
/// section that exists neither in the snapshot nor the database are
/// recorded as errors and dropped.
pub fn import_snapshot(db: &Database, json_content: &str) -> Result<ImportResult, String> {
    let snapshot: Snapshot = serde_json::from_str(json_content)
        .map_err(|e| format!("Failed to parse snapshot JSON: {}", e))?;

    let mut result = ImportResult {
        sections_imported: 0,
        notes_imported: 0,
        skipped: 0,
        errors: Vec::new(),
    };

    for section in &snapshot.sections {
        match db.get_section(&section.id) {
            Ok(Some(_)) => result.skipped += 1,
            Ok(None) => match db.create_section(section) {
                Ok(()) => result.sections_imported += 1,
                Err(e) => result.errors.push(format!("section {}: {}", section.id, e)),
            },
            Err(e) => result.errors.push(format!("section {}: {}", section.id, e)),
        }
    }

    for note in &snapshot.notes {
        match db.get_note(&note.id) {
            Ok(Some(_)) => {
                result.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                result.errors.push(format!("note {}: {}", note.id, e));
                continue;
            }
        }

        match db.get_section(&note.section_id) {
            Ok(Some(_)) => match db.create_note(note) {
                Ok(()) => result.notes_imported += 1,
                Err(e) => result.errors.push(format!("note {}: {}", note.id, e)),
            },
            Ok(None) => result.errors.push(format!(
                "note {}: section {} does not exist",
                note.id, note.section_id
            )),
            Err(e) => result.errors.push(format!("note {}: {}", note.id, e)),
        }
    }

    log::debug!(
        "snapshot import: {} sections, {} notes, {} skipped, {} errors",
        result.sections_imported,
        result.notes_imported,
        result.skipped,
        result.errors.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let source = Database::in_memory().unwrap();
        let section = Section::new("Recipes");
        source.create_section(&section).unwrap();
        source.create_note(&Note::new("pasta carbonara", &section.id)).unwrap();
        source.create_note(&Note::new("buy milk", "tasks")).unwrap();

        let json = export_snapshot(&source).unwrap();

        let target = Database::in_memory().unwrap();
        let result = import_snapshot(&target, &json).unwrap();

        // Builtin sections exist on both sides and are skipped.
        assert_eq!(result.sections_imported, 1);
        assert_eq!(result.notes_imported, 2);
        assert!(result.errors.is_empty());

        let restored = target.find_section_by_name("Recipes").unwrap().unwrap();
        assert_eq!(restored.id, section.id);
        assert_eq!(target.get_notes_for_section(&section.id).unwrap().len(), 1);
    }

    #[test]
    fn test_import_is_idempotent() {
        let db = Database::in_memory().unwrap();
        db.create_note(&Note::new("buy milk", "tasks")).unwrap();
        let json = export_snapshot(&db).unwrap();

        let result = import_snapshot(&db, &json).unwrap();
        assert_eq!(result.sections_imported, 0);
        assert_eq!(result.notes_imported, 0);
        assert!(result.skipped >= 5); // four builtins plus the note
    }

    #[test]
    fn test_import_reports_orphan_notes() {
        let db = Database::in_memory().unwrap();
        let json = r#"{
            "sections": [],
            "notes": [{
                "id": "n1",
                "text": "orphan",
                "sectionId": "missing-section",
                "createdAt": 1000,
                "updatedAt": 1000
            }]
        }"#;

        let result = import_snapshot(&db, json).unwrap();
        assert_eq!(result.notes_imported, 0);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("missing-section"));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let db = Database::in_memory().unwrap();
        assert!(import_snapshot(&db, "not json").is_err());
    }
}
