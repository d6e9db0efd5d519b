//! Error types for the assessment engine.
//!
//! The taxonomy follows how each failure is handled:
//!
//! - [`ValidationError`] is user-correctable. The triggering operation is
//!   rejected and the session is left untouched.
//! - [`FetchError`] (and the [`DataError`] it wraps) comes from external I/O.
//!   The engine recovers by substituting the offline question bank.
//! - [`ConfigError`] is fatal at construction time.

use thiserror::Error;

use crate::model::TestType;
use crate::session::SessionState;

/// User-correctable errors raised by quiz session operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// `submit()` was called before every question had an answer.
    #[error("please answer all questions before submitting (missing: {missing:?})")]
    IncompleteSubmission { missing: Vec<usize> },

    /// The selected value is not one of the question's options.
    #[error("'{value}' is not an option for question {index}")]
    InvalidOption { index: usize, value: String },

    /// The question index is outside the session.
    #[error("question {index} is out of range (session has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    /// Points per correct answer must be finite and positive.
    #[error("weight must be a positive number, got {0}")]
    InvalidWeight(f64),

    /// The operation is not permitted in the current session state.
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

/// Malformed or unusable data received from an external collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// The generator returned no questions.
    #[error("question list is empty")]
    EmptyQuestionList,

    /// A question violates the question invariants.
    #[error("invalid question {index}: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    /// The response body had an unexpected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Failures of the external question fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The generator could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The generator answered with a non-success status.
    #[error("generator error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The generator answered, but the content was unusable.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl FetchError {
    /// Returns `true` for failures caused by the payload rather than transport.
    pub fn is_data_error(&self) -> bool {
        matches!(self, FetchError::Data(_))
    }
}

/// Invalid engine configuration. Always fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown test type: {0}")]
    UnknownTestType(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("unknown badge metric: {0}")]
    UnknownMetric(String),

    #[error("unknown profile fact: {0}")]
    UnknownFact(String),

    #[error("badge '{0}' has no unlock rule")]
    MissingPredicate(String),

    #[error("badge '{badge}' must use either a metric threshold or a profile fact, not both")]
    AmbiguousPredicate { badge: String },

    #[error("badge '{badge}' has an invalid threshold {threshold}")]
    InvalidThreshold { badge: String, threshold: f64 },

    #[error("duplicate badge id: {0}")]
    DuplicateBadge(String),

    #[error("badge catalog is empty")]
    EmptyCatalog,

    #[error("no exam profile configured for {0}")]
    MissingExamProfile(TestType),

    #[error("exam profile for {test_type} is invalid: {reason}")]
    InvalidExamProfile { test_type: TestType, reason: String },

    #[error("fallback bank has no questions for {0}")]
    EmptyFallbackBank(TestType),

    #[error("invalid fallback question for {test_type}: {source}")]
    InvalidFallbackQuestion {
        test_type: TestType,
        #[source]
        source: DataError,
    },

    #[error("invalid planner thresholds: easy ({easy}) must not exceed remediation ({remediation})")]
    InvalidThresholds { remediation: f64, easy: f64 },
}
