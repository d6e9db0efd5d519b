//! Mock generator and in-memory store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use learnquest_core::error::FetchError;
use learnquest_core::model::{PerformanceSnapshot, QuizQuestion};
use learnquest_core::stats::HistoryRecord;
use learnquest_core::traits::{HistoryStore, QuestionGenerator, QuestionRequest, SnapshotSource};

/// A mock question generator for exercising the engine without a service.
///
/// Returns the same canned result for every request.
pub struct MockGenerator {
    response: Result<Vec<QuizQuestion>, FetchError>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<QuestionRequest>>,
}

impl MockGenerator {
    /// Create a mock that always returns these questions.
    pub fn with_questions(questions: Vec<QuizQuestion>) -> Self {
        Self::with_response(Ok(questions))
    }

    /// Create a mock that always fails with this error.
    pub fn failing(error: FetchError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<Vec<QuizQuestion>, FetchError>) -> Self {
        Self {
            response,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this generator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this generator.
    pub fn last_request(&self) -> Option<QuestionRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &QuestionRequest) -> Result<Vec<QuizQuestion>, FetchError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());
        self.response.clone()
    }
}

/// Snapshot source and history store held in memory, keyed by user id.
#[derive(Default)]
pub struct InMemoryStore {
    snapshots: Mutex<HashMap<String, Vec<PerformanceSnapshot>>>,
    history: Mutex<HashMap<String, Vec<HistoryRecord>>>,
    fail_reads: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose reads always fail, for exercising degraded paths.
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn insert_snapshot(&self, user_id: &str, snapshot: PerformanceSnapshot) {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(user_id.to_string())
            .or_default()
            .push(snapshot);
    }

    /// Records appended so far for `user_id`.
    pub fn records(&self, user_id: &str) -> Vec<HistoryRecord> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SnapshotSource for InMemoryStore {
    async fn latest_snapshot(&self, user_id: &str) -> anyhow::Result<Option<PerformanceSnapshot>> {
        if self.fail_reads {
            anyhow::bail!("snapshot store unavailable");
        }
        let snapshots = self
            .snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(snapshots
            .get(user_id)
            .and_then(|list| list.iter().max_by_key(|s| s.taken_at))
            .cloned())
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn history(&self, user_id: &str) -> anyhow::Result<Vec<HistoryRecord>> {
        if self.fail_reads {
            anyhow::bail!("history store unavailable");
        }
        Ok(self.records(user_id))
    }

    async fn append(&self, user_id: &str, record: HistoryRecord) -> anyhow::Result<()> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(user_id.to_string())
            .or_default()
            .push(record);
        Ok(())
    }
}
