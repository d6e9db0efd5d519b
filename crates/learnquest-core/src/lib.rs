//! learnquest-core: the adaptive assessment engine.
//!
//! This crate turns a learner's latest performance snapshot into a next-quiz
//! recommendation, runs the quiz as a bounded state machine, scores it, and
//! evaluates the achievement badge catalog. All external I/O goes through the
//! traits in [`traits`].

pub mod achievements;
pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod model;
pub mod planner;
pub mod risk;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod traits;

pub use engine::AssessmentEngine;
pub use error::{ConfigError, DataError, FetchError, ValidationError};
pub use session::{FetchOutcome, QuizSession, SessionState};
