//! Note capture service: the layer that actually mutates state.
//!
//! Ties the parser, classifier and storage together for the composition
//! flow: resolve explicit intent (creating `@mentioned` sections on
//! demand), classify, persist, then refresh the section's description in
//! the background.

use std::sync::Arc;

use crate::ai_client::{ChatClient, ClassificationResult};
use crate::classifier::{Classifier, COMMAND_CONFIDENCE};
use crate::commands::parse_commands;
use crate::db::{Database, Note, Section};
use crate::describe::generate_description;

/// A captured note plus the classification that routed it.
#[derive(Debug, Clone)]
pub struct CapturedNote {
    pub note: Note,
    pub classification: ClassificationResult,
    /// Set when an `@mention` named a section that had to be created.
    pub created_section: Option<Section>,
}

pub struct NoteService {
    db: Arc<Database>,
    classifier: Arc<Classifier>,
    chat: Option<Arc<ChatClient>>,
}

impl NoteService {
    pub fn new(
        db: Arc<Database>,
        classifier: Arc<Classifier>,
        chat: Option<Arc<ChatClient>>,
    ) -> Self {
        NoteService { db, classifier, chat }
    }

    /// Capture raw composition text as a note.
    ///
    /// Classification completes before any write, so a storage failure
    /// never invalidates the routing decision. After the note is stored, a
    /// description refresh for its section is scheduled in the background.
    pub async fn capture(&self, text: &str) -> Result<CapturedNote, String> {
        let sections = self.db.get_sections().map_err(|e| e.to_string())?;
        let parsed = parse_commands(text, &sections);

        let mut created_section = None;
        let (clean_text, classification) = match (&parsed.forced_category, &parsed.section_name) {
            // Mention of a section that does not exist yet: create it on
            // the fly and treat the mention as authoritative.
            (None, Some(name)) => {
                let section = self.ensure_section(name)?;
                let classification = ClassificationResult {
                    section_id: section.id.clone(),
                    confidence: COMMAND_CONFIDENCE,
                };
                created_section = Some(section);
                (parsed.clean_text.clone(), classification)
            }
            _ => {
                let classification = self.classifier.classify_note(text, &sections).await;
                (parsed.clean_text.clone(), classification)
            }
        };

        let note = Note::new(&clean_text, &classification.section_id);
        self.db.create_note(&note).map_err(|e| e.to_string())?;
        log::debug!(
            "captured note {} into {} (confidence {:.2})",
            note.id,
            classification.section_id,
            classification.confidence
        );

        self.spawn_description_refresh(&classification.section_id);

        Ok(CapturedNote { note, classification, created_section })
    }

    /// Re-route an existing note after its text changed.
    pub async fn reclassify_note(&self, note_id: &str) -> Result<ClassificationResult, String> {
        let note = self
            .db
            .get_note(note_id)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("note not found: {}", note_id))?;

        let sections = self.db.get_sections().map_err(|e| e.to_string())?;
        let classification = self.classifier.classify_note(&note.text, &sections).await;

        if classification.section_id != note.section_id {
            self.db
                .move_note(note_id, &classification.section_id)
                .map_err(|e| e.to_string())?;
            self.spawn_description_refresh(&classification.section_id);
            self.spawn_description_refresh(&note.section_id);
        }

        Ok(classification)
    }

    /// Regenerate one section's description and write it back.
    ///
    /// Concurrent refreshes of the same section are last-write-wins; the
    /// description is advisory text and regenerates on the next change.
    pub async fn refresh_description(&self, section_id: &str) -> Result<(), String> {
        refresh_section_description(&self.db, self.chat.as_deref(), section_id).await
    }

    fn spawn_description_refresh(&self, section_id: &str) {
        let db = Arc::clone(&self.db);
        let chat = self.chat.clone();
        let section_id = section_id.to_string();

        tokio::spawn(async move {
            if let Err(e) =
                refresh_section_description(&db, chat.as_deref(), &section_id).await
            {
                log::warn!("description refresh for {} failed: {}", section_id, e);
            }
        });
    }

    fn ensure_section(&self, name: &str) -> Result<Section, String> {
        if let Some(existing) = self.db.find_section_by_name(name).map_err(|e| e.to_string())? {
            return Ok(existing);
        }
        let section = Section::new(name);
        self.db.create_section(&section).map_err(|e| e.to_string())?;
        log::debug!("created section {} for mention @{}", section.id, name);
        Ok(section)
    }
}

async fn refresh_section_description(
    db: &Database,
    chat: Option<&ChatClient>,
    section_id: &str,
) -> Result<(), String> {
    let section = db
        .get_section(section_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("section not found: {}", section_id))?;

    let notes = db
        .recent_notes_for_section(section_id, 5)
        .map_err(|e| e.to_string())?;

    let description = generate_description(chat, &notes, &section.name).await;

    db.set_section_description(section_id, &description)
        .map_err(|e| e.to_string())
}
