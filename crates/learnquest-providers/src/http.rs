//! HTTP question generator client.
//!
//! Talks to the question generation service:
//! `POST {base_url}/generate_full_test` with a JSON [`QuestionRequest`].
//!
//! Accepted response bodies:
//! - `{"questions": [...]}`
//! - a bare `[...]`
//! - `{"test_json": "..."}` where the string holds either of the above,
//!   possibly wrapped in a markdown code fence

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use learnquest_core::error::{DataError, FetchError};
use learnquest_core::model::QuizQuestion;
use learnquest_core::traits::{extract_json_from_markdown, QuestionGenerator, QuestionRequest};

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const GENERATE_PATH: &str = "/generate_full_test";

/// Question generator backed by an HTTP service.
pub struct HttpQuestionGenerator {
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpQuestionGenerator {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout_secs,
            client,
        })
    }

    async fn fetch(&self, request: &QuestionRequest) -> Result<Vec<QuizQuestion>, ProviderError> {
        let mut builder = self
            .client
            .post(format!("{}{}", self.base_url, GENERATE_PATH))
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                ProviderError::NetworkError(format!(
                    "question generator not reachable at {}",
                    self.base_url
                ))
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            DataError::MalformedResponse(format!("response is not JSON: {e}"))
        })?;

        Ok(parse_questions(body)?)
    }
}

#[async_trait]
impl QuestionGenerator for HttpQuestionGenerator {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(test_type = %request.test_type, difficulty = %request.difficulty))]
    async fn generate(&self, request: &QuestionRequest) -> Result<Vec<QuizQuestion>, FetchError> {
        Ok(self.fetch(request).await?)
    }
}

/// Pull the question list out of any accepted response shape.
pub fn parse_questions(body: Value) -> Result<Vec<QuizQuestion>, DataError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("questions") {
                items
            } else if let Some(Value::String(embedded)) = map.remove("test_json") {
                let json = extract_json_from_markdown(&embedded);
                let inner: Value = serde_json::from_str(&json).map_err(|e| {
                    DataError::MalformedResponse(format!("test_json is not valid JSON: {e}"))
                })?;
                if matches!(inner, Value::Object(ref m) if m.contains_key("test_json")) {
                    return Err(DataError::MalformedResponse("nested test_json".into()));
                }
                return parse_questions(inner);
            } else {
                return Err(DataError::MalformedResponse(
                    "expected a `questions` array".into(),
                ));
            }
        }
        other => {
            return Err(DataError::MalformedResponse(format!(
                "unexpected response type: {}",
                json_type(&other)
            )))
        }
    };

    if items.is_empty() {
        return Err(DataError::EmptyQuestionList);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<QuizQuestion>(item).map_err(|e| DataError::InvalidQuestion {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
