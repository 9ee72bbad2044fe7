//! Note routing engine for a personal note-taking app.
//!
//! Raw text goes in, a `(section id, confidence)` decision comes out.
//! Explicit commands (`/task`, `@Section`) override everything, an AI
//! backend handles the rest, and a deterministic keyword classifier keeps
//! the engine working when the model is unreachable or unconfigured. The
//! surrounding application owns all UI and sync; this crate owns routing,
//! local persistence, and section descriptions.

mod ai_client;
mod classifier;
mod commands;
mod db;
mod describe;
mod export;
mod keyword;
mod live;
mod logging;
mod remote;
mod service;
mod settings;
mod utils;

pub use ai_client::{ChatClient, ClassificationResult, ModelError, Transport, CONFIDENCE_FLOOR};
pub use classifier::{
    Classifier, ClassifyBackend, COMMAND_CONFIDENCE, KEYWORD_MATCH_CONFIDENCE,
    KEYWORD_MISS_CONFIDENCE,
};
pub use commands::{parse_commands, ParsedCommand};
pub use db::{Database, Note, Section, BUILTIN_SECTIONS};
pub use describe::{generate_description, placeholder_description};
pub use export::{export_snapshot, import_snapshot, ImportResult, Snapshot};
pub use keyword::{classify_keywords, Category};
pub use live::{LiveClassifier, DEFAULT_DEBOUNCE};
pub use logging::{default_log_level, init_logging};
pub use remote::ServiceClient;
pub use service::{CapturedNote, NoteService};
pub use settings::Settings;
pub use utils::safe_truncate;

/// Returns the crate version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_not_empty() {
        assert!(!engine_version().is_empty());
    }
}
