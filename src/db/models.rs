use serde::{Deserialize, Serialize};

use crate::utils::{now_ms, slugify};

/// The four built-in sections every database starts with.
///
/// `unsorted` doubles as the low-confidence catch-all: anything the
/// classifiers are not sure about lands there.
pub const BUILTIN_SECTIONS: &[(&str, &str)] = &[
    ("tasks", "Tasks"),
    ("ideas", "Ideas"),
    ("notes", "Notes"),
    ("unsorted", "Unsorted"),
];

/// A user-defined bucket that notes are routed into.
///
/// `id` is stable and immutable once created; `name` is mutable and used for
/// case-insensitive matching when parsing `@Section` mentions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(rename = "isBookmarked", default)]
    pub is_bookmarked: bool,
}

impl Section {
    /// New user-created section. Ids are `<slug>-<millis>` so they stay
    /// readable in exports while remaining unique.
    pub fn new(name: &str) -> Self {
        let now = now_ms();
        let slug = slugify(name);
        let slug = if slug.is_empty() { "section".to_string() } else { slug };
        Section {
            id: format!("{}-{}", slug, now),
            name: name.trim().to_string(),
            tags: None,
            description: None,
            created_at: now,
            updated_at: now,
            is_bookmarked: false,
        }
    }
}

/// A single freeform text entry. Always belongs to exactly one section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: String,
    pub text: String,
    #[serde(rename = "sectionId")]
    pub section_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Note {
    pub fn new(text: &str, section_id: &str) -> Self {
        let now = now_ms();
        Note {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            section_id: section_id.to_string(),
            created_at: now,
            updated_at: now,
            tags: None,
        }
    }
}
