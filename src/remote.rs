//! Client for a hosted classification service.
//!
//! Some deployments keep the model key server-side and expose two endpoints
//! that mirror the local engine: `/classify-note` and
//! `/generate-description`. Semantics match the local pipeline (the service
//! runs the same command parsing and fallback rules), so this client plugs
//! into the orchestrator as just another backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ai_client::{clamp_confidence, ClassificationResult, ModelError};
use crate::classifier::ClassifyBackend;
use crate::db::{Note, Section};

// ==================== Wire format ====================

#[derive(Debug, Serialize)]
struct ClassifyRequest {
    text: String,
    #[serde(rename = "availableSections")]
    available_sections: Vec<SectionRef>,
}

#[derive(Debug, Serialize)]
struct SectionRef {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct DescribeRequest {
    notes: Vec<NoteRef>,
    #[serde(rename = "sectionName")]
    section_name: String,
}

#[derive(Debug, Serialize)]
struct NoteRef {
    text: String,
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    description: String,
}

// ==================== Client ====================

pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ServiceClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ServiceClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub async fn classify_note(
        &self,
        text: &str,
        sections: &[Section],
    ) -> Result<ClassificationResult, ModelError> {
        let request = ClassifyRequest {
            text: text.to_string(),
            available_sections: sections
                .iter()
                .map(|s| SectionRef {
                    id: s.id.clone(),
                    name: s.name.clone(),
                })
                .collect(),
        };

        let mut result: ClassificationResult = self.post("classify-note", &request).await?;
        // The service clamps too; re-clamping costs nothing and keeps the
        // invariant local.
        result.confidence = clamp_confidence(result.confidence);
        Ok(result)
    }

    pub async fn generate_description(
        &self,
        notes: &[Note],
        section_name: &str,
    ) -> Result<String, ModelError> {
        let request = DescribeRequest {
            notes: notes
                .iter()
                .map(|n| NoteRef { text: n.text.clone() })
                .collect(),
            section_name: section_name.to_string(),
        };

        let response: DescribeResponse = self.post("generate-description", &request).await?;
        Ok(response.description)
    }

    async fn post<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, ModelError>
    where
        Req: Serialize,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ClassifyBackend for ServiceClient {
    async fn classify(
        &self,
        text: &str,
        sections: &[Section],
    ) -> Result<ClassificationResult, ModelError> {
        self.classify_note(text, sections).await
    }
}
