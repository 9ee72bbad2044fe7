//! Explicit routing commands embedded in note text.
//!
//! Two forms of user intent override automatic classification:
//! slash-commands (`/task buy milk`) and section mentions
//! (`@Recipes pasta carbonara`). The parser only reports intent;
//! it never creates sections or touches storage.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::Section;

// Matched anywhere in the trimmed input, like the mention handling users
// already know from chat apps. Group 1 is the section name, group 2 the
// note content after the first whitespace run.
static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)\s+(.+)").expect("valid mention regex"));

// Plural forms first so "/tasks" strips its whole token instead of leaving
// a stray "s" on the note text. Prefix matching is deliberately bare: no
// word boundary is required after the token, so "/taskrabbit" forces tasks
// with clean text "rabbit".
const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/tasks", "tasks"),
    ("/task", "tasks"),
    ("/ideas", "ideas"),
    ("/idea", "ideas"),
    ("/notes", "notes"),
    ("/note", "notes"),
];

/// What the parser found in a raw composition.
///
/// `forced_category` is a section id when the user's intent is unambiguous.
/// `section_name` is set for every recognized `@mention`, including ones
/// that name a section that does not exist yet; in that case
/// `forced_category` is `None` and the caller decides whether to create it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub clean_text: String,
    pub forced_category: Option<String>,
    pub section_name: Option<String>,
}

impl ParsedCommand {
    fn passthrough(text: &str) -> Self {
        ParsedCommand {
            clean_text: text.to_string(),
            forced_category: None,
            section_name: None,
        }
    }
}

/// Detect explicit user intent in raw text.
///
/// Checks slash-commands first, then `@Section` mentions against
/// `available_sections` (case-insensitive exact name match). Unmatched
/// input falls through untouched: malformed command syntax is not an error.
pub fn parse_commands(text: &str, available_sections: &[Section]) -> ParsedCommand {
    let trimmed = text.trim();

    for (token, section_id) in SLASH_COMMANDS {
        if let Some(rest) = strip_prefix_ci(trimmed, token) {
            return ParsedCommand {
                clean_text: rest.trim_start().to_string(),
                forced_category: Some((*section_id).to_string()),
                section_name: None,
            };
        }
    }

    if let Some(caps) = MENTION_RE.captures(trimmed) {
        let name = &caps[1];
        let content = &caps[2];
        let name_lower = name.to_lowercase();

        if let Some(section) = available_sections
            .iter()
            .find(|s| s.name.to_lowercase() == name_lower)
        {
            return ParsedCommand {
                clean_text: content.to_string(),
                forced_category: Some(section.id.clone()),
                section_name: Some(section.name.clone()),
            };
        }

        // Unknown section: signal the name so the caller can create it.
        return ParsedCommand {
            clean_text: content.to_string(),
            forced_category: None,
            section_name: Some(name.to_string()),
        };
    }

    ParsedCommand::passthrough(trimmed)
}

/// ASCII case-insensitive prefix strip that never slices inside a
/// multi-byte character.
fn strip_prefix_ci<'a>(text: &'a str, token: &str) -> Option<&'a str> {
    let head = text.get(..token.len())?;
    if head.eq_ignore_ascii_case(token) {
        text.get(token.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, name: &str) -> Section {
        let mut s = Section::new(name);
        s.id = id.to_string();
        s
    }

    #[test]
    fn test_slash_task() {
        let parsed = parse_commands("/task call the dentist", &[]);
        assert_eq!(parsed.clean_text, "call the dentist");
        assert_eq!(parsed.forced_category.as_deref(), Some("tasks"));
        assert_eq!(parsed.section_name, None);
    }

    #[test]
    fn test_slash_commands_case_insensitive() {
        let parsed = parse_commands("/IDEA solar kettle", &[]);
        assert_eq!(parsed.forced_category.as_deref(), Some("ideas"));
        assert_eq!(parsed.clean_text, "solar kettle");
    }

    #[test]
    fn test_plural_token_stripped_whole() {
        let parsed = parse_commands("/tasks buy milk", &[]);
        assert_eq!(parsed.clean_text, "buy milk");
        assert_eq!(parsed.forced_category.as_deref(), Some("tasks"));

        let parsed = parse_commands("/notes meeting at 3pm", &[]);
        assert_eq!(parsed.clean_text, "meeting at 3pm");
        assert_eq!(parsed.forced_category.as_deref(), Some("notes"));
    }

    #[test]
    fn test_bare_prefix_policy() {
        // No word boundary required after the command token.
        let parsed = parse_commands("/taskrabbit errand", &[]);
        assert_eq!(parsed.forced_category.as_deref(), Some("tasks"));
        assert_eq!(parsed.clean_text, "rabbit errand");
    }

    #[test]
    fn test_mention_matches_known_section() {
        let sections = vec![section("recipes-1712000000000", "Recipes")];
        let parsed = parse_commands("@recipes pasta carbonara", &sections);
        assert_eq!(parsed.clean_text, "pasta carbonara");
        assert_eq!(parsed.forced_category.as_deref(), Some("recipes-1712000000000"));
        assert_eq!(parsed.section_name.as_deref(), Some("Recipes"));
    }

    #[test]
    fn test_mention_unknown_section_signals_intent() {
        let parsed = parse_commands("@Groceries eggs and butter", &[]);
        assert_eq!(parsed.clean_text, "eggs and butter");
        assert_eq!(parsed.forced_category, None);
        assert_eq!(parsed.section_name.as_deref(), Some("Groceries"));
    }

    #[test]
    fn test_mention_without_content_is_not_a_command() {
        let parsed = parse_commands("@Recipes", &[section("recipes-1", "Recipes")]);
        assert_eq!(parsed.clean_text, "@Recipes");
        assert_eq!(parsed.forced_category, None);
        assert_eq!(parsed.section_name, None);
    }

    #[test]
    fn test_plain_text_passes_through_trimmed() {
        let parsed = parse_commands("  buy milk  ", &[]);
        assert_eq!(parsed.clean_text, "buy milk");
        assert_eq!(parsed.forced_category, None);
        assert_eq!(parsed.section_name, None);
    }

    #[test]
    fn test_slash_command_beats_mention() {
        let sections = vec![section("recipes-1", "Recipes")];
        let parsed = parse_commands("/note @Recipes pasta", &sections);
        assert_eq!(parsed.forced_category.as_deref(), Some("notes"));
        assert_eq!(parsed.clean_text, "@Recipes pasta");
    }
}
