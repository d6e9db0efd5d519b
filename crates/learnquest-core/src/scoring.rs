//! Deterministic quiz scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::QuizQuestion;

/// Points per correct answer. Always finite and positive, so a score stays
/// within `[0, total × weight]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Weight(f64);

impl Weight {
    /// Used when no exam profile says otherwise.
    pub const DEFAULT: Weight = Weight(1.0);

    pub fn new(points: f64) -> Result<Self, ValidationError> {
        if points.is_finite() && points > 0.0 {
            Ok(Self(points))
        } else {
            Err(ValidationError::InvalidWeight(points))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of scoring a completed answer set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Number of questions answered correctly.
    pub raw_correct: usize,
    /// Number of questions in the quiz.
    pub total: usize,
    /// Points per correct answer.
    pub weight: f64,
    /// `raw_correct × weight`.
    pub score: f64,
    /// `total × weight`.
    pub max_score: f64,
}

impl ScoreResult {
    /// Passing means scoring at least half of the maximum.
    pub fn passed(&self) -> bool {
        self.score >= self.max_score / 2.0
    }

    /// Fraction of questions answered correctly, in `[0, 1]`.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.raw_correct as f64 / self.total as f64
    }
}

/// Score `answers` against `questions`. Unanswered indices count as wrong.
pub fn score(
    questions: &[QuizQuestion],
    answers: &BTreeMap<usize, String>,
    weight: Weight,
) -> ScoreResult {
    let weight = weight.get();
    let raw_correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(i).is_some_and(|a| q.is_correct(a)))
        .count();
    let total = questions.len();

    ScoreResult {
        raw_correct,
        total,
        weight,
        score: raw_correct as f64 * weight,
        max_score: total as f64 * weight,
    }
}
