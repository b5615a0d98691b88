// Interest extraction service - orchestration over the LLM client

use tracing::{info, warn};

use crate::services::llm::{InterestExtraction, LlmClient, LlmError};

/// Extract interests from a sanitized natural-language prompt.
///
/// Failures are not retried here; each surfaces immediately with its
/// category (`llm_unavailable`, `llm_auth_failed`, `llm_response_invalid`).
pub async fn extract_interests_from_prompt(
    prompt: &str,
    llm: &dyn LlmClient,
) -> Result<InterestExtraction, LlmError> {
    match llm.extract_interests(prompt).await {
        Ok(result) => {
            info!(
                add_count = result.add_interests.len(),
                remove_count = result.remove_interests.len(),
                "interest extraction completed"
            );
            Ok(result)
        }
        Err(e) => {
            warn!(error = %e, error_code = e.error_code(), "interest extraction failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Test double: returns a canned result or a canned error.
    struct StubLlm {
        outcome: Result<InterestExtraction, LlmError>,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn extract_interests(&self, _prompt: &str) -> Result<InterestExtraction, LlmError> {
            match &self.outcome {
                Ok(result) => Ok(result.clone()),
                Err(LlmError::Unavailable(m)) => Err(LlmError::Unavailable(m.clone())),
                Err(LlmError::AuthFailed(m)) => Err(LlmError::AuthFailed(m.clone())),
                Err(LlmError::InvalidResponse(m)) => Err(LlmError::InvalidResponse(m.clone())),
            }
        }
    }

    #[tokio::test]
    async fn returns_extraction_result_on_success() {
        let stub = StubLlm {
            outcome: Ok(InterestExtraction {
                add_interests: vec!["Rust".to_string(), "FastAPI".to_string()],
                remove_interests: vec!["JavaScript".to_string()],
            }),
        };

        let result = extract_interests_from_prompt("I like Rust", &stub)
            .await
            .expect("extraction");
        assert_eq!(result.add_interests, vec!["Rust", "FastAPI"]);
        assert_eq!(result.remove_interests, vec!["JavaScript"]);
    }

    #[tokio::test]
    async fn propagates_each_failure_category() {
        let cases = [
            (LlmError::Unavailable("down".into()), "llm_unavailable"),
            (LlmError::AuthFailed("bad key".into()), "llm_auth_failed"),
            (
                LlmError::InvalidResponse("not json".into()),
                "llm_response_invalid",
            ),
        ];

        for (error, expected_code) in cases {
            let stub = StubLlm {
                outcome: Err(error),
            };
            let err = extract_interests_from_prompt("prompt", &stub)
                .await
                .expect_err("must fail");
            assert_eq!(err.error_code(), expected_code);
        }
    }
}
