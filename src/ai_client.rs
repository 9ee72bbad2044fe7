//! Chat-completion client for AI-powered note classification.
//!
//! Talks to an OpenAI-compatible completions endpoint, either directly with
//! an API key or through a proxy that holds the key server-side. Responses
//! are JSON-in-text: the model is instructed to answer with a JSON object,
//! but the payload is extracted and validated defensively because models
//! wrap it in prose often enough.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::db::Section;
use crate::settings::Settings;
use crate::utils::safe_truncate;

const DIRECT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

const CLASSIFY_MAX_TOKENS: u32 = 150;
const CLASSIFY_TEMPERATURE: f32 = 0.1;
const CLASSIFY_INPUT_LIMIT: usize = 2000;

/// Classifications below this confidence are never trusted to route into a
/// specific bucket; they land in `unsorted`.
pub const CONFIDENCE_FLOOR: f64 = 0.6;

const CLASSIFY_SYSTEM_PROMPT: &str = r#"You are a classification assistant for a personal organization app.
Classify the user's input into one of these categories:
- "task": Actionable items, todos, reminders, things to do
- "idea": Creative thoughts, possibilities, brainstorming, "what if" scenarios, imaginative concepts
- "note": Information to remember, facts, meeting notes, summaries
- "unsorted": When unclear, gibberish, ambiguous, or doesn't fit other categories

CRITICAL RULES:
1. If text is gibberish (not real words/phrases like "adhcfsbjhd", "zidwudd") -> "unsorted" with confidence < 0.6
2. If text is ambiguous (single words like "banana" without context) -> "unsorted" with confidence < 0.6
3. If text doesn't clearly fit any category -> "unsorted" with confidence < 0.6
4. Creative/whimsical concepts (e.g., "cat powered laundry") -> "idea" with high confidence
5. Action items (e.g., "get eggs") -> "task" with high confidence
6. Information/facts (e.g., "Meeting at 3pm") -> "note" with high confidence

Respond ONLY with valid JSON in this exact format:
{"category": "task|idea|note|unsorted", "confidence": 0.0-1.0}"#;

/// Everything that can go wrong talking to the model. Callers treat every
/// variant the same way: fall back to keyword classification.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },
    #[error("model returned an empty completion")]
    EmptyCompletion,
    #[error("could not resolve model response: {0}")]
    Malformed(String),
    #[error("no API credentials configured")]
    MissingCredentials,
}

/// Where a classification landed and how sure the model was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "sectionId")]
    pub section_id: String,
    pub confidence: f64,
}

/// How requests reach the completions endpoint. Identical request/response
/// semantics either way; only the URL and bearer credential differ.
#[derive(Debug, Clone)]
pub enum Transport {
    /// Straight to the provider with the user's own API key.
    Direct { api_key: String },
    /// Through a proxy/edge function that injects the key server-side;
    /// the bearer token is the caller's session token.
    Proxy { url: String, token: String },
}

// ==================== Wire format ====================

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    category: String,
    #[serde(default = "default_raw_confidence")]
    confidence: f64,
}

fn default_raw_confidence() -> f64 {
    0.5
}

// ==================== Client ====================

pub struct ChatClient {
    http: reqwest::Client,
    transport: Transport,
    model: String,
}

impl ChatClient {
    pub fn new(transport: Transport, model: &str, timeout: Duration) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ChatClient {
            http,
            transport,
            model: model.to_string(),
        })
    }

    /// Build a client from settings: proxy transport when a proxy URL is
    /// configured, otherwise direct with the stored/env API key.
    pub fn from_settings(settings: &Settings) -> Result<Self, ModelError> {
        let transport = settings.transport().ok_or(ModelError::MissingCredentials)?;
        Self::new(
            transport,
            &settings.model,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn endpoint(&self) -> &str {
        match &self.transport {
            Transport::Direct { .. } => DIRECT_API_URL,
            Transport::Proxy { url, .. } => url,
        }
    }

    fn bearer(&self) -> &str {
        match &self.transport {
            Transport::Direct { api_key } => api_key,
            Transport::Proxy { token, .. } => token,
        }
    }

    /// One request/response round trip. Returns the completion text from
    /// `choices[0].message.content`.
    pub(crate) async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.bearer())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::EmptyCompletion);
        }

        Ok(content)
    }

    /// Classify note text against the available sections.
    ///
    /// Fails with `ModelError` on any transport or parse problem; the
    /// orchestrator catches that and falls back to keywords.
    pub async fn classify(
        &self,
        text: &str,
        sections: &[Section],
    ) -> Result<ClassificationResult, ModelError> {
        let input = safe_truncate(text, CLASSIFY_INPUT_LIMIT);
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: CLASSIFY_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: input.to_string(),
            },
        ];

        let content = self
            .complete(messages, CLASSIFY_MAX_TOKENS, CLASSIFY_TEMPERATURE)
            .await?;

        resolve_classification(&content, sections)
    }
}

// ==================== Response resolution ====================

/// Turn a raw completion into a validated `ClassificationResult`.
///
/// Extraction, parsing, category mapping, confidence clamping and the
/// low-confidence floor all happen here so the whole pipeline is testable
/// without a network.
pub(crate) fn resolve_classification(
    content: &str,
    sections: &[Section],
) -> Result<ClassificationResult, ModelError> {
    let json_text = extract_json(content);
    let raw: RawClassification = serde_json::from_str(json_text)
        .map_err(|e| ModelError::Malformed(format!("invalid classification JSON: {}", e)))?;

    if raw.category.trim().is_empty() {
        return Err(ModelError::Malformed("empty category".to_string()));
    }

    let confidence = clamp_confidence(raw.confidence);

    // An unresolvable category means the whole response is untrusted:
    // full fallback, not a partial guess.
    let mut section_id = map_category(&raw.category, sections).ok_or_else(|| {
        ModelError::Malformed(format!("unresolvable category: {}", raw.category))
    })?;

    if confidence < CONFIDENCE_FLOOR {
        section_id = "unsorted".to_string();
    }

    Ok(ClassificationResult { section_id, confidence })
}

/// Find the JSON object inside possibly-chatty model output: the span from
/// the first `{` to the last `}`, or first `(` to last `)` as a fallback.
fn extract_json(text: &str) -> &str {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return &text[start..=end];
        }
    }
    if let (Some(start), Some(end)) = (text.find('('), text.rfind(')')) {
        if start < end {
            return &text[start..=end];
        }
    }
    text
}

pub(crate) fn clamp_confidence(confidence: f64) -> f64 {
    confidence.clamp(0.0, 1.0)
}

/// Map a model category onto a concrete section id: the four canonical
/// categories (singular or plural), then a case-insensitive name match
/// against user-defined sections.
fn map_category(category: &str, sections: &[Section]) -> Option<String> {
    let lower = category.to_lowercase();
    match lower.as_str() {
        "task" | "tasks" => Some("tasks".to_string()),
        "idea" | "ideas" => Some("ideas".to_string()),
        "note" | "notes" => Some("notes".to_string()),
        "unsorted" => Some("unsorted".to_string()),
        _ => sections
            .iter()
            .find(|s| s.name.to_lowercase() == lower)
            .map(|s| s.id.clone()),
    }
}
