//! Quiz session state machine.
//!
//! ```text
//! Selecting ──start──▶ Loading ──apply_fetch──▶ InProgress ──submit──▶ Submitted
//!     ▲                                                                    │
//!     └──────────────────────────────── reset ◀────────────────────────────┘
//! ```
//!
//! `reset()` is accepted from every state. The question fetch started by
//! [`QuizSession::start`] is addressed by a request id; a result delivered for
//! any other request, or after a reset, is dropped.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DataError, FetchError, ValidationError};
use crate::fallback::FallbackBank;
use crate::model::{validate_questions, QuizQuestion, RecommendationSpec};
use crate::scoring::{self, ScoreResult, Weight};
use crate::traits::QuestionRequest;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Selecting,
    Loading,
    InProgress,
    Submitted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Selecting => write!(f, "selecting"),
            SessionState::Loading => write!(f, "loading"),
            SessionState::InProgress => write!(f, "in progress"),
            SessionState::Submitted => write!(f, "submitted"),
        }
    }
}

/// Origin of the questions in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Generated,
    Fallback,
}

/// Handle for a question fetch started by [`QuizSession::start`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub request_id: Uuid,
    pub request: QuestionRequest,
}

/// What happened when a fetch result was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Generated questions are in use.
    Generated { count: usize },
    /// The fetch failed and the offline bank is in use.
    Fallback { reason: FetchError, count: usize },
    /// The session moved on (reset or restarted); the result was dropped.
    Stale,
}

impl FetchOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchOutcome::Fallback { .. })
    }
}

/// One question as shown in post-submit review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem {
    pub index: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// A single learner's quiz, owned by the caller.
#[derive(Debug, Clone)]
pub struct QuizSession {
    state: SessionState,
    spec: Option<RecommendationSpec>,
    weight: Weight,
    pending_request: Option<Uuid>,
    questions: Vec<QuizQuestion>,
    answers: BTreeMap<usize, String>,
    current_index: usize,
    source: Option<QuestionSource>,
    result: Option<ScoreResult>,
}

impl QuizSession {
    /// A fresh session waiting for a subject to be chosen.
    pub fn new() -> Self {
        Self {
            state: SessionState::Selecting,
            spec: None,
            weight: Weight::DEFAULT,
            pending_request: None,
            questions: Vec::new(),
            answers: BTreeMap::new(),
            current_index: 0,
            source: None,
            result: None,
        }
    }

    /// A session that starts directly in progress with known questions.
    pub fn with_questions(
        spec: RecommendationSpec,
        questions: Vec<QuizQuestion>,
        weight: Weight,
    ) -> Result<Self, DataError> {
        validate_questions(&questions)?;
        let mut session = Self::new();
        session.spec = Some(spec);
        session.weight = weight;
        session.begin(questions, QuestionSource::Generated);
        Ok(session)
    }

    /// Begin loading `num_questions` questions for `spec`. Each correct
    /// answer is worth `weight` points.
    pub fn start(
        &mut self,
        spec: RecommendationSpec,
        weight: Weight,
        num_questions: usize,
    ) -> Result<FetchTicket, ValidationError> {
        self.require(SessionState::Selecting, "start a quiz")?;

        let request_id = Uuid::new_v4();
        let request = QuestionRequest::from_spec(&spec, num_questions);
        debug!(%request_id, test_type = %spec.test_type, difficulty = %spec.difficulty, "loading quiz");

        self.state = SessionState::Loading;
        self.pending_request = Some(request_id);
        self.spec = Some(spec);
        self.weight = weight;
        Ok(FetchTicket {
            request_id,
            request,
        })
    }

    /// Apply the result of the fetch identified by `request_id`.
    ///
    /// Failures and empty or invalid question lists are replaced by the
    /// fallback bank for the session's test type.
    pub fn apply_fetch(
        &mut self,
        request_id: Uuid,
        result: Result<Vec<QuizQuestion>, FetchError>,
        bank: &FallbackBank,
    ) -> FetchOutcome {
        if self.state != SessionState::Loading || self.pending_request != Some(request_id) {
            debug!(%request_id, state = %self.state, "dropping stale fetch result");
            return FetchOutcome::Stale;
        }
        let Some(test_type) = self.spec.as_ref().map(|s| s.test_type) else {
            return FetchOutcome::Stale;
        };

        let checked = result.and_then(|questions| {
            validate_questions(&questions)?;
            Ok(questions)
        });

        match checked {
            Ok(questions) => {
                let count = questions.len();
                self.begin(questions, QuestionSource::Generated);
                FetchOutcome::Generated { count }
            }
            Err(reason) => {
                warn!(%request_id, %test_type, error = %reason, "question fetch failed, using fallback bank");
                let questions = bank.questions_for(test_type);
                let count = questions.len();
                self.begin(questions, QuestionSource::Fallback);
                FetchOutcome::Fallback { reason, count }
            }
        }
    }

    fn begin(&mut self, questions: Vec<QuizQuestion>, source: QuestionSource) {
        self.state = SessionState::InProgress;
        self.pending_request = None;
        self.questions = questions;
        self.answers.clear();
        self.current_index = 0;
        self.source = Some(source);
        self.result = None;
    }

    /// Record `value` as the answer to question `index`. Does not advance.
    pub fn select_answer(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.require(SessionState::InProgress, "answer")?;

        let question = self
            .questions
            .get(index)
            .ok_or(ValidationError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            })?;
        let value = value.into();
        if !question.has_option(&value) {
            return Err(ValidationError::InvalidOption { index, value });
        }

        self.answers.insert(index, value);
        Ok(())
    }

    /// Move to the next question. No-op on the last one.
    pub fn next_question(&mut self) -> usize {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
        self.current_index
    }

    /// Move to the previous question. No-op on the first one.
    pub fn prev_question(&mut self) -> usize {
        self.current_index = self.current_index.saturating_sub(1);
        self.current_index
    }

    /// Score the quiz and switch to read-only review.
    ///
    /// Calling this again once submitted returns the stored result without
    /// rescoring.
    pub fn submit(&mut self) -> Result<ScoreResult, ValidationError> {
        if self.state == SessionState::Submitted {
            if let Some(result) = self.result {
                debug!("duplicate submit ignored");
                return Ok(result);
            }
        }
        self.require(SessionState::InProgress, "submit")?;

        let missing: Vec<usize> = (0..self.questions.len())
            .filter(|i| !self.answers.contains_key(i))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::IncompleteSubmission { missing });
        }

        let result = scoring::score(&self.questions, &self.answers, self.weight);
        debug!(
            raw_correct = result.raw_correct,
            score = result.score,
            "quiz submitted"
        );
        self.result = Some(result);
        self.state = SessionState::Submitted;
        self.current_index = 0;
        Ok(result)
    }

    /// Discard the session and go back to subject selection.
    pub fn reset(&mut self) {
        if let Some(request_id) = self.pending_request {
            debug!(%request_id, "reset while loading, fetch result will be dropped");
        }
        *self = Self::new();
    }

    /// Per-question review, available once submitted.
    pub fn review(&self) -> Result<Vec<ReviewItem>, ValidationError> {
        self.require(SessionState::Submitted, "review")?;

        Ok(self
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let selected = self.answers.get(&index).cloned().unwrap_or_default();
                ReviewItem {
                    index,
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                    is_correct: q.is_correct(&selected),
                    selected,
                    correct_answer: q.correct_answer.clone(),
                }
            })
            .collect())
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), ValidationError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ValidationError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn spec(&self) -> Option<&RecommendationSpec> {
        self.spec.as_ref()
    }

    pub fn weight(&self) -> f64 {
        self.weight.get()
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current_index)
    }

    pub fn source(&self) -> Option<QuestionSource> {
        self.source
    }

    pub fn result(&self) -> Option<ScoreResult> {
        self.result
    }

    pub fn pending_request(&self) -> Option<Uuid> {
        self.pending_request
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}
