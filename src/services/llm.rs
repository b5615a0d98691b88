// src/services/llm.rs
//! LLM-backed interest extraction client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

const INTEREST_EXTRACTION_SYSTEM_PROMPT: &str = "You are an assistant that extracts structured \
interests from natural language prompts.

Your task is to analyze a user's prompt and identify:
1. Interests they want to ADD (new interests mentioned or implied)
2. Interests they want to REMOVE (interests they explicitly say they don't want, or want to stop \
following)

Guidelines:
- Extract specific, actionable interest topics (e.g., \"Python async patterns\", \"React hooks\", \
\"machine learning\")
- Be precise: avoid overly broad topics unless explicitly mentioned
- Only include interests in remove_interests if the user explicitly states they want to remove or \
stop following something
- If a user says \"I'm interested in X\", add X to add_interests
- If a user says \"I don't want Y anymore\" or \"remove Y\", add Y to remove_interests
- Keep interest names concise but descriptive (2-5 words typically)
- Return an empty list if no interests are found

Return your response as a JSON object with two arrays: \"add_interests\" and \"remove_interests\".";

fn interest_extraction_prompt(user_prompt: &str) -> String {
    format!(
        "User prompt: \"{}\"\n\nExtract the interests from this prompt. Return a JSON object with \
\"add_interests\" and \"remove_interests\" arrays.",
        user_prompt
    )
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM service unavailable: {0}")]
    Unavailable(String),

    #[error("LLM authentication failed: {0}")]
    AuthFailed(String),

    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Stable machine-readable code for this failure category.
    pub fn error_code(&self) -> &'static str {
        match self {
            LlmError::Unavailable(_) => "llm_unavailable",
            LlmError::AuthFailed(_) => "llm_auth_failed",
            LlmError::InvalidResponse(_) => "llm_response_invalid",
        }
    }
}

/// Structured extraction result: labels to add and labels to remove.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterestExtraction {
    #[serde(default)]
    pub add_interests: Vec<String>,
    #[serde(default)]
    pub remove_interests: Vec<String>,
}

impl InterestExtraction {
    /// Trim labels, drop empties, and deduplicate while preserving the
    /// order in which labels first appeared.
    pub fn normalized(self) -> Self {
        Self {
            add_interests: normalize_labels(self.add_interests),
            remove_interests: normalize_labels(self.remove_interests),
        }
    }
}

fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .filter(|label| seen.insert(label.clone()))
        .collect()
}

/// One capability: given free text, return interests to add and remove.
///
/// Production and test implementations both satisfy this trait.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn extract_interests(&self, prompt: &str) -> Result<InterestExtraction, LlmError>;
}

// ============================================================================
// OpenAI implementation
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn extract_interests(&self, prompt: &str) -> Result<InterestExtraction, LlmError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: INTEREST_EXTRACTION_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: interest_extraction_prompt(prompt),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
            // Lower temperature for more consistent extraction
            temperature: 0.3,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        debug!(model = %self.model, "sending interest extraction request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "LLM request failed to send");
                LlmError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            error!(http_status = %status, "LLM authentication failed");
            return Err(LlmError::AuthFailed(format!(
                "authentication rejected with status {}",
                status
            )));
        }
        if !status.is_success() {
            // Rate limiting and upstream 5xx are transient from this layer's
            // point of view; the request is not retried here.
            error!(http_status = %status, "LLM request failed");
            return Err(LlmError::Unavailable(format!(
                "request failed with status {}",
                status
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "failed to decode LLM response body");
            LlmError::InvalidResponse(e.to_string())
        })?;

        let content = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("empty response content".to_string()))?;

        let extraction: InterestExtraction = serde_json::from_str(content).map_err(|e| {
            error!(error = %e, "LLM returned malformed extraction JSON");
            LlmError::InvalidResponse(format!("malformed extraction payload: {}", e))
        })?;

        if let Some(usage) = completion.usage {
            info!(
                model = %self.model,
                tokens_used = usage.total_tokens,
                "interest extraction request completed"
            );
        }

        Ok(extraction.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_drops_empties() {
        let extraction = InterestExtraction {
            add_interests: vec!["  Rust  ".to_string(), "".to_string(), "   ".to_string()],
            remove_interests: vec![" crypto ".to_string()],
        }
        .normalized();

        assert_eq!(extraction.add_interests, vec!["Rust"]);
        assert_eq!(extraction.remove_interests, vec!["crypto"]);
    }

    #[test]
    fn normalization_dedupes_preserving_order() {
        let extraction = InterestExtraction {
            add_interests: vec![
                "machine learning".to_string(),
                "Rust".to_string(),
                "machine learning ".to_string(),
            ],
            remove_interests: vec![],
        }
        .normalized();

        assert_eq!(extraction.add_interests, vec!["machine learning", "Rust"]);
    }

    #[test]
    fn extraction_parses_with_missing_fields() {
        let extraction: InterestExtraction =
            serde_json::from_str(r#"{"add_interests": ["AI"]}"#).unwrap();
        assert_eq!(extraction.add_interests, vec!["AI"]);
        assert!(extraction.remove_interests.is_empty());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            LlmError::Unavailable("x".into()).error_code(),
            "llm_unavailable"
        );
        assert_eq!(
            LlmError::AuthFailed("x".into()).error_code(),
            "llm_auth_failed"
        );
        assert_eq!(
            LlmError::InvalidResponse("x".into()).error_code(),
            "llm_response_invalid"
        );
    }

    #[test]
    fn user_prompt_is_quoted_into_the_template() {
        let prompt = interest_extraction_prompt("more AI news");
        assert!(prompt.contains("\"more AI news\""));
        assert!(prompt.contains("add_interests"));
    }
}
