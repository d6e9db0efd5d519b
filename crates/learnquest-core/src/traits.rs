//! Trait definitions for the engine's external collaborators.
//!
//! The question generator is implemented in `learnquest-providers`; the
//! snapshot source and history store are implemented by the surrounding
//! application (an in-memory version lives in `learnquest-providers::mock`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::model::{Difficulty, PerformanceSnapshot, QuizQuestion, RecommendationSpec, TestType};
use crate::stats::HistoryRecord;

// ---------------------------------------------------------------------------
// Question generator
// ---------------------------------------------------------------------------

/// Request sent to an external question generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub difficulty: Difficulty,
    pub test_type: TestType,
    pub learning_context: String,
    /// How many questions the quiz needs.
    pub num_questions: usize,
}

impl QuestionRequest {
    pub fn from_spec(spec: &RecommendationSpec, num_questions: usize) -> Self {
        Self {
            difficulty: spec.difficulty,
            test_type: spec.test_type,
            learning_context: spec.learning_context.clone(),
            num_questions,
        }
    }
}

/// Backend that produces quiz questions for a request.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Human-readable generator name (e.g. "http").
    fn name(&self) -> &str;

    /// Produce questions. Implementations should not validate the question
    /// invariants themselves; the session does that before use.
    async fn generate(&self, request: &QuestionRequest) -> Result<Vec<QuizQuestion>, FetchError>;
}

// ---------------------------------------------------------------------------
// Learner data
// ---------------------------------------------------------------------------

/// Read access to learners' forecast snapshots.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// The most recent snapshot for `user_id`, if any.
    async fn latest_snapshot(&self, user_id: &str) -> anyhow::Result<Option<PerformanceSnapshot>>;
}

/// Learners' result history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Every record for `user_id`, oldest first.
    async fn history(&self, user_id: &str) -> anyhow::Result<Vec<HistoryRecord>>;

    /// Append a record after a quiz or prediction run.
    async fn append(&self, user_id: &str, record: HistoryRecord) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Markdown JSON extraction
// ---------------------------------------------------------------------------

/// Extract a JSON payload from a model response that may wrap it in a
/// markdown code fence.
///
/// Handles:
/// - A ```json``` block (preferred)
/// - A generic ``` block
/// - A truncated, unclosed block
/// - Fences sharing a line with the payload (```` ```json [..] ``` ````)
/// - Raw JSON with no fence (returned trimmed)
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_block: Option<String> = None;
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    let mut keep = |block: String, is_json: bool| {
        if is_json {
            json_block.get_or_insert(block);
        } else {
            generic_block.get_or_insert(block);
        }
    };

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            let (lang, rest) = split_fence_language(trimmed.trim_start_matches('`'));
            is_json_block = lang.eq_ignore_ascii_case("json");
            current_block.clear();

            if let Some(end) = rest.find("```") {
                keep(rest[..end].trim().to_string(), is_json_block);
            } else {
                in_block = true;
                current_block.push_str(rest);
            }
            continue;
        }

        if in_block && trimmed.ends_with("```") {
            in_block = false;
            let content = trimmed.trim_end_matches('`').trim_end();
            if !content.is_empty() {
                if !current_block.is_empty() {
                    current_block.push('\n');
                }
                current_block.push_str(content);
            }
            keep(std::mem::take(&mut current_block), is_json_block);
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated (unclosed) block: keep what was accumulated
    if in_block && !current_block.is_empty() {
        keep(current_block, is_json_block);
    }

    // No block at all: drop stray fence markers and keep the rest
    json_block
        .or(generic_block)
        .unwrap_or_else(|| response.replace("```json", "").replace("```", "").trim().to_string())
}

/// Split the text after an opening fence into its language tag and whatever
/// follows on the same line.
fn split_fence_language(after_fence: &str) -> (&str, &str) {
    let tag_len = after_fence
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_fence.len());
    let (lang, rest) = after_fence.split_at(tag_len);
    (lang, rest.trim())
}
