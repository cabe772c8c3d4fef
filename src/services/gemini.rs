use crate::config::GeminiSettings;
use crate::core::prompt::{build_prompt, parse_result};
use crate::models::{ScholarshipResult, UserProfile};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use super::ScholarshipMatcher;

/// Errors that can occur when interacting with Gemini
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Gemini API key is not configured")]
    NotConfigured,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Gemini `generateContent` client
///
/// Sends the matching prompt, optionally with Google Search grounding, and
/// turns the model's free-text answer into a ranked [`ScholarshipResult`].
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    search_grounding: bool,
    temperature: f32,
    max_results: usize,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(settings: &GeminiSettings) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            search_grounding: settings.search_grounding,
            temperature: settings.temperature,
            max_results: settings.max_results.max(1),
            client,
        })
    }

    fn request_body(&self, profile: &UserProfile) -> serde_json::Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(profile, self.max_results) }]
            }],
            "generationConfig": { "temperature": self.temperature }
        });

        if self.search_grounding {
            body["tools"] = json!([{ "google_search": {} }]);
        }

        body
    }

    /// Ask the model for scholarships matching `profile`
    ///
    /// `Ok(None)` means the model answered but gave nothing usable (blocked,
    /// empty, or unparseable); the caller substitutes the fallback result.
    pub async fn get_scholarships(
        &self,
        profile: &UserProfile,
    ) -> Result<Option<ScholarshipResult>, GeminiError> {
        if self.api_key.trim().is_empty() {
            return Err(GeminiError::NotConfigured);
        }

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        tracing::debug!(model = %self.model, grounding = self.search_grounding, "requesting scholarship matches");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(profile))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Gemini generateContent failed: {} - {}", status, body);
            return Err(GeminiError::ApiError(format!(
                "generateContent returned {}",
                status
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(reason) = parsed.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()) {
            tracing::warn!(reason, "prompt blocked by Gemini safety filters");
            return Ok(None);
        }

        let text = match parsed.text() {
            Some(text) => text,
            None => {
                let finish = parsed
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .unwrap_or_else(|| "NO_CANDIDATES".to_string());
                tracing::warn!(finish_reason = %finish, "Gemini returned no text");
                return Ok(None);
            }
        };

        let result = parse_result(&text).map(|r| r.ranked(self.max_results));

        tracing::info!(
            matches = result.as_ref().map(|r| r.scholarships.len()).unwrap_or(0),
            "Gemini matching completed"
        );

        Ok(result)
    }
}

#[async_trait]
impl ScholarshipMatcher for GeminiClient {
    async fn get_scholarships(
        &self,
        profile: &UserProfile,
    ) -> Result<Option<ScholarshipResult>, GeminiError> {
        GeminiClient::get_scholarships(self, profile).await
    }
}
