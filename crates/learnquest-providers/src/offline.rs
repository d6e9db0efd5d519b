//! Generator for running without a question service.

use async_trait::async_trait;

use learnquest_core::error::FetchError;
use learnquest_core::model::QuizQuestion;
use learnquest_core::traits::{QuestionGenerator, QuestionRequest};

/// Always fails with a network error, so the engine serves the fallback bank.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl QuestionGenerator for OfflineGenerator {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, _request: &QuestionRequest) -> Result<Vec<QuizQuestion>, FetchError> {
        Err(FetchError::Network("offline mode".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnquest_core::model::{Difficulty, TestType};

    #[tokio::test]
    async fn always_network_error() {
        let request = QuestionRequest {
            difficulty: Difficulty::Medium,
            test_type: TestType::Reading,
            learning_context: "Reading".into(),
            num_questions: 10,
        };
        let err = OfflineGenerator.generate(&request).await.unwrap_err();
        assert_eq!(err, FetchError::Network("offline mode".into()));
    }
}
