// Prompt sanitization for LLM-bound free text

use regex::Regex;
use tracing::info;

/// Raised when prompt sanitization fails. Maps to the `invalid_prompt`
/// error code at the boundary.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PromptValidationError(pub String);

/// Validates and normalizes free-text input before it reaches the LLM.
///
/// Reject checks run in a fixed order, and the injection-pattern check runs
/// BEFORE code spans are stripped: wrapping part of an injection phrase in
/// backticks must not bypass detection.
pub struct PromptSanitizer {
    control_chars: Regex,
    url: Regex,
    injection: Vec<Regex>,
    code_block: Regex,
    inline_code: Regex,
}

impl PromptSanitizer {
    pub fn new() -> Self {
        Self {
            control_chars: Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("control regex"),
            url: Regex::new(r"(?i)(https?://|www\.)\S+").expect("url regex"),
            injection: vec![
                Regex::new(r"(?i)ignore (all|previous|prior) instructions").expect("injection regex"),
                Regex::new(r"(?i)system prompt").expect("injection regex"),
                Regex::new(r"(?i)developer message").expect("injection regex"),
                Regex::new(r"(?i)jailbreak").expect("injection regex"),
            ],
            code_block: Regex::new(r"(?s)```.*?```").expect("code block regex"),
            inline_code: Regex::new(r"`[^`]+`").expect("inline code regex"),
        }
    }

    /// Sanitize prompt input and return safe text for LLM usage.
    ///
    /// The returned text contains no code spans and no whitespace run longer
    /// than one space; already-clean input comes back byte-for-byte intact.
    pub fn sanitize(&self, prompt: &str) -> Result<String, PromptValidationError> {
        if self.control_chars.is_match(prompt) {
            return Err(PromptValidationError(
                "Prompt contains unsupported control characters".to_string(),
            ));
        }
        if self.url.is_match(prompt) {
            return Err(PromptValidationError(
                "Prompt must not include URLs".to_string(),
            ));
        }
        // Checked against the raw text, before code spans are removed.
        for pattern in &self.injection {
            if pattern.is_match(prompt) {
                return Err(PromptValidationError(
                    "Prompt contains disallowed instruction patterns".to_string(),
                ));
            }
        }

        let without_blocks = self.code_block.replace_all(prompt, " ");
        let without_code = self.inline_code.replace_all(&without_blocks, " ");
        let sanitized = without_code.split_whitespace().collect::<Vec<_>>().join(" ");

        if sanitized.is_empty() {
            return Err(PromptValidationError(
                "Prompt must include valid text after sanitization".to_string(),
            ));
        }

        if sanitized != prompt {
            info!(
                original_length = prompt.len(),
                sanitized_length = sanitized.len(),
                "sanitized prompt input"
            );
        }

        Ok(sanitized)
    }
}

impl Default for PromptSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
