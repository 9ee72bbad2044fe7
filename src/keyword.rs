// =============================================================================
// Keyword Classification Module
// =============================================================================
//
// Deterministic fallback classifier for routing note text into sections:
// - tasks: action verbs, errands, reminders
// - ideas: creative/brainstorm phrasing, whimsical concepts
// - unsorted: everything ambiguous (the conservative default)
//
// Classification uses pattern matching, not AI, so it is always available
// and always returns the same answer for the same input.

/// Canonical note categories, mirroring the built-in section ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Tasks,
    Ideas,
    Notes,
    Unsorted,
}

impl Category {
    pub fn section_id(&self) -> &'static str {
        match self {
            Category::Tasks => "tasks",
            Category::Ideas => "ideas",
            Category::Notes => "notes",
            Category::Unsorted => "unsorted",
        }
    }

    pub fn from_section_id(s: &str) -> Option<Self> {
        match s {
            "tasks" => Some(Category::Tasks),
            "ideas" => Some(Category::Ideas),
            "notes" => Some(Category::Notes),
            "unsorted" => Some(Category::Unsorted),
            _ => None,
        }
    }
}

// Single-word task verbs, matched as whole words only ("do" must not fire
// inside "dough").
const TASK_WORDS: &[&str] = &[
    // Shopping/errands
    "get", "buy", "grab", "purchase",
    // Action verbs
    "call", "email", "text", "message", "schedule", "finish", "complete",
    "submit", "pay", "review", "update", "fix", "create", "send", "meet",
    "attend", "do", "make", "prepare", "write", "read", "watch", "listen",
    // Imperative markers
    "todo", "task", "should", "must",
];

// Multi-word task phrases, matched as substrings.
const TASK_PHRASES: &[&str] = &[
    "pick up", "remember to", "don't forget", "need to", "have to",
];

// Idea phrasing, matched as substrings.
const IDEA_PHRASES: &[&str] = &[
    "what if", "could we", "maybe we", "i wonder", "imagine", "consider",
    "app idea", "project concept", "feature idea", "brainstorm",
    "should build", "idea:", "concept:",
];

// Words that suggest an imaginative concept ("robot butler") even without
// explicit idea phrasing. Whole-word matches, and only consulted when no
// task signal is present: "fix the robot" stays a task.
const CONCEPT_WORDS: &[&str] = &[
    "powered", "robot", "automatic", "smart", "flying", "magic",
    "invisible", "teleport", "clone", "invention", "design", "concept",
    "prototype",
];

const CONCEPT_PHRASES: &[&str] = &["time travel"];

/// Classify note text by keyword patterns. Pure and total: ambiguous or
/// unmatched input returns `Unsorted` rather than guessing.
pub fn classify_keywords(text: &str) -> Category {
    let lower = text.to_lowercase();
    let lower = lower.trim();
    let words = word_set(lower);

    let has_task_word = TASK_WORDS.iter().any(|w| words.contains(*w))
        || TASK_PHRASES.iter().any(|p| lower.contains(p));

    // 1. Action-verb phrasing is the most reliable signal
    if has_task_word {
        return Category::Tasks;
    }

    // 2. Explicit idea phrasing
    if IDEA_PHRASES.iter().any(|p| lower.contains(p)) {
        return Category::Ideas;
    }

    // 3. Imaginative concepts, only when nothing task-like is present
    if CONCEPT_WORDS.iter().any(|w| words.contains(*w))
        || CONCEPT_PHRASES.iter().any(|p| lower.contains(p))
    {
        return Category::Ideas;
    }

    // 4. Conservative default
    Category::Unsorted
}

/// Tokenize on non-alphanumeric boundaries, keeping apostrophes so
/// contractions ("don't") survive as single words.
fn word_set(lower: &str) -> std::collections::HashSet<&str> {
    lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_verbs() {
        assert_eq!(classify_keywords("buy milk"), Category::Tasks);
        assert_eq!(classify_keywords("Call the dentist tomorrow"), Category::Tasks);
        assert_eq!(classify_keywords("remember to water the plants"), Category::Tasks);
        assert_eq!(classify_keywords("need to renew passport"), Category::Tasks);
    }

    #[test]
    fn test_task_words_require_word_boundary() {
        // "do" inside "dough", "get" inside "together"
        assert_eq!(classify_keywords("sourdough and rye"), Category::Unsorted);
        assert_eq!(classify_keywords("togetherness"), Category::Unsorted);
    }

    #[test]
    fn test_idea_phrases() {
        assert_eq!(classify_keywords("what if cats could fly"), Category::Ideas);
        assert_eq!(classify_keywords("brainstorm for the offsite"), Category::Ideas);
        assert_eq!(classify_keywords("idea: subscription tier for pets"), Category::Ideas);
    }

    #[test]
    fn test_creative_concepts_without_task_language() {
        assert_eq!(classify_keywords("cat powered laundry"), Category::Ideas);
        assert_eq!(classify_keywords("robot butler"), Category::Ideas);
    }

    #[test]
    fn test_task_language_beats_creative_concepts() {
        // "fix" wins over "robot"
        assert_eq!(classify_keywords("fix the robot"), Category::Tasks);
    }

    #[test]
    fn test_ambiguous_text_is_unsorted() {
        assert_eq!(classify_keywords("banana"), Category::Unsorted);
        assert_eq!(classify_keywords("zidwudd adhcfsbjhd"), Category::Unsorted);
        assert_eq!(classify_keywords(""), Category::Unsorted);
    }

    #[test]
    fn test_classification_is_idempotent() {
        for text in ["buy milk", "what if cats could fly", "banana", "fix the robot"] {
            let first = classify_keywords(text);
            assert_eq!(classify_keywords(text), first);
            assert_eq!(classify_keywords(text), first);
        }
    }

    #[test]
    fn test_category_section_ids_round_trip() {
        for cat in [Category::Tasks, Category::Ideas, Category::Notes, Category::Unsorted] {
            assert_eq!(Category::from_section_id(cat.section_id()), Some(cat));
        }
        assert_eq!(Category::from_section_id("recipes-123"), None);
    }
}
