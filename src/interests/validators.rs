// src/interests/validators.rs

use super::handlers::ExtractInterestsRequest;
use crate::common::{ValidationResult, Validator};

pub struct ExtractionValidator;

impl Validator<ExtractInterestsRequest> for ExtractionValidator {
    fn validate(&self, data: &ExtractInterestsRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.prompt.is_empty() {
            result.add_error("prompt", "Prompt is required");
        } else if data.prompt.chars().count() > 500 {
            result.add_error("prompt", "Prompt must be at most 500 characters");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> ExtractInterestsRequest {
        ExtractInterestsRequest {
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn accepts_prompt_within_bounds() {
        let result = ExtractionValidator.validate(&request("I want more AI news"));
        assert!(result.is_valid);
    }

    #[test]
    fn rejects_empty_prompt() {
        let result = ExtractionValidator.validate(&request(""));
        assert!(!result.is_valid);
    }

    #[test]
    fn rejects_prompt_over_500_chars() {
        let result = ExtractionValidator.validate(&request(&"p".repeat(501)));
        assert!(!result.is_valid);
    }
}
