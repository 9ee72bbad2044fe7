//! Classification orchestrator: the single entry point the rest of the
//! application calls to route note text into a section.
//!
//! Precedence is fixed: explicit commands win outright, the AI backend is
//! consulted next, and the keyword classifier catches everything else.
//! The orchestrator never fails and never mutates state.

use async_trait::async_trait;
use std::sync::Arc;

use crate::ai_client::{ChatClient, ClassificationResult, ModelError};
use crate::commands::parse_commands;
use crate::db::Section;
use crate::keyword::{classify_keywords, Category};

/// Confidence attached to a command-forced classification. The only path
/// that ever yields exactly 1.0.
pub const COMMAND_CONFIDENCE: f64 = 1.0;
/// Keyword fallback confidence when a keyword actually matched.
pub const KEYWORD_MATCH_CONFIDENCE: f64 = 0.5;
/// Keyword fallback confidence when nothing matched and the note went to
/// `unsorted`.
pub const KEYWORD_MISS_CONFIDENCE: f64 = 0.4;

/// The injected AI capability. `ChatClient` talks to the model directly;
/// `remote::ServiceClient` goes through a hosted endpoint; tests inject
/// canned implementations.
#[async_trait]
pub trait ClassifyBackend: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        sections: &[Section],
    ) -> Result<ClassificationResult, ModelError>;
}

#[async_trait]
impl ClassifyBackend for ChatClient {
    async fn classify(
        &self,
        text: &str,
        sections: &[Section],
    ) -> Result<ClassificationResult, ModelError> {
        ChatClient::classify(self, text, sections).await
    }
}

pub struct Classifier {
    backend: Option<Arc<dyn ClassifyBackend>>,
}

impl Classifier {
    pub fn new(backend: Arc<dyn ClassifyBackend>) -> Self {
        Classifier { backend: Some(backend) }
    }

    /// Keyword-only classifier for setups with no AI configured.
    pub fn keyword_only() -> Self {
        Classifier { backend: None }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Route note text to a section. Infallible: every AI failure mode is
    /// swallowed here and degrades to the keyword classifier.
    pub async fn classify_note(
        &self,
        text: &str,
        sections: &[Section],
    ) -> ClassificationResult {
        let parsed = parse_commands(text, sections);

        // Explicit user intent is authoritative.
        if let Some(section_id) = parsed.forced_category {
            return ClassificationResult {
                section_id,
                confidence: COMMAND_CONFIDENCE,
            };
        }

        if let Some(backend) = &self.backend {
            match backend.classify(&parsed.clean_text, sections).await {
                Ok(result) => {
                    log::debug!(
                        "model routed note to {} (confidence {:.2})",
                        result.section_id,
                        result.confidence
                    );
                    return result;
                }
                Err(e) => {
                    log::warn!("model classification failed, using keywords: {}", e);
                }
            }
        }

        keyword_fallback(&parsed.clean_text)
    }
}

/// Deterministic fallback. Matched keywords earn slightly more confidence
/// than the unsorted default, but both stay below the model floor.
fn keyword_fallback(text: &str) -> ClassificationResult {
    let category = classify_keywords(text);
    let confidence = match category {
        Category::Unsorted => KEYWORD_MISS_CONFIDENCE,
        _ => KEYWORD_MATCH_CONFIDENCE,
    };
    ClassificationResult {
        section_id: category.section_id().to_string(),
        confidence,
    }
}
