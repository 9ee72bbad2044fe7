//! Section description generation.
//!
//! Summarizes a section's recent notes into one or two sentences. Lower
//! stakes than classification: any model failure degrades to a templated
//! description, so this never fails and never blocks a caller.

use crate::ai_client::{ChatClient, ChatMessage};
use crate::db::Note;
use crate::utils::safe_truncate;

const DESCRIPTION_NOTE_LIMIT: usize = 5;
const DESCRIPTION_MAX_TOKENS: u32 = 100;
const DESCRIPTION_TEMPERATURE: f32 = 0.7;
const NOTE_PREVIEW_LIMIT: usize = 300;

/// Fixed text for a section with no notes yet.
pub fn placeholder_description(section_name: &str) -> String {
    format!(
        "This is the {} section. Add notes to generate a summary.",
        section_name
    )
}

/// Summarize a section's notes into a short natural-language description.
///
/// Uses the model when a client is available, the deterministic template
/// otherwise or on any failure.
pub async fn generate_description(
    client: Option<&ChatClient>,
    notes: &[Note],
    section_name: &str,
) -> String {
    if notes.is_empty() {
        return placeholder_description(section_name);
    }

    let recent = most_recent(notes, DESCRIPTION_NOTE_LIMIT);

    if let Some(client) = client {
        match describe_with_model(client, &recent, section_name).await {
            Ok(description) => return description,
            Err(e) => {
                log::warn!("description generation failed, using template: {}", e);
            }
        }
    }

    template_description(&recent, section_name)
}

async fn describe_with_model(
    client: &ChatClient,
    notes: &[&Note],
    section_name: &str,
) -> Result<String, crate::ai_client::ModelError> {
    let notes_text = notes
        .iter()
        .map(|n| safe_truncate(&n.text, NOTE_PREVIEW_LIMIT))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Based on these notes from the \"{}\" section, generate a brief, natural description (1-2 sentences):\n\n{}\n\nDescription:",
        section_name, notes_text
    );

    let content = client
        .complete(
            vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            DESCRIPTION_MAX_TOKENS,
            DESCRIPTION_TEMPERATURE,
        )
        .await?;

    let description = content.trim();
    if description.is_empty() {
        Ok(format!("A collection of notes about {}.", section_name))
    } else {
        Ok(description.to_string())
    }
}

/// Deterministic description from the first few words of the first two
/// notes. Used whenever the model is unavailable.
fn template_description(notes: &[&Note], section_name: &str) -> String {
    let keywords = notes
        .iter()
        .take(2)
        .map(|n| {
            n.text
                .split_whitespace()
                .take(3)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{} currently focuses on {}... showing a mix of recent thoughts and tasks.",
        section_name, keywords
    )
}

fn most_recent(notes: &[Note], limit: usize) -> Vec<&Note> {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted.truncate(limit);
    sorted
}
