//! Core data model types for learnquest.
//!
//! These are the value types shared by the classifier, planner, quiz session
//! and achievement engine.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DataError};

/// Coarse likelihood of a learner falling behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
}

impl RiskLevel {
    /// Pass probability at or above which a learner is `Low` risk.
    pub const LOW_RISK_PROBABILITY: f64 = 0.75;
    /// Pass probability at or above which a learner is `Medium` risk.
    pub const MEDIUM_RISK_PROBABILITY: f64 = 0.5;

    /// Derive a tier from a pass probability in `[0, 1]`.
    ///
    /// `NaN` is treated as a coin flip (0.5), out-of-range values are clamped.
    pub fn from_pass_probability(probability: f64) -> Self {
        let p = if probability.is_nan() {
            0.5
        } else {
            probability.clamp(0.0, 1.0)
        };
        if p >= Self::LOW_RISK_PROBABILITY {
            RiskLevel::Low
        } else if p >= Self::MEDIUM_RISK_PROBABILITY {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// A scored subject of a performance snapshot.
///
/// Declaration order is the tie-break precedence used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Reading,
    Writing,
}

impl Subject {
    /// All subjects in tie-break precedence order.
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::Reading, Subject::Writing];

    /// The booster test type that targets this subject.
    pub fn test_type(self) -> TestType {
        match self {
            Subject::Math => TestType::Math,
            Subject::Reading => TestType::Reading,
            Subject::Writing => TestType::Writing,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Math => write!(f, "Math"),
            Subject::Reading => write!(f, "Reading"),
            Subject::Writing => write!(f, "Writing"),
        }
    }
}

/// The kind of quiz to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Math,
    Reading,
    Writing,
    Internal1,
    Internal2,
    Assignment,
}

impl TestType {
    pub const ALL: [TestType; 6] = [
        TestType::Math,
        TestType::Reading,
        TestType::Writing,
        TestType::Internal1,
        TestType::Internal2,
        TestType::Assignment,
    ];
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestType::Math => write!(f, "math"),
            TestType::Reading => write!(f, "reading"),
            TestType::Writing => write!(f, "writing"),
            TestType::Internal1 => write!(f, "internal1"),
            TestType::Internal2 => write!(f, "internal2"),
            TestType::Assignment => write!(f, "assignment"),
        }
    }
}

impl FromStr for TestType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "math" | "maths" => Ok(TestType::Math),
            "reading" => Ok(TestType::Reading),
            "writing" => Ok(TestType::Writing),
            "internal1" => Ok(TestType::Internal1),
            "internal2" => Ok(TestType::Internal2),
            "assignment" => Ok(TestType::Assignment),
            _ => Err(ConfigError::UnknownTestType(s.to_string())),
        }
    }
}

/// Quiz difficulty, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
            Difficulty::VeryHard => write!(f, "very_hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "veryhard" => Ok(Difficulty::VeryHard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// The most recent forecast recorded for a learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub risk_level: RiskLevel,
    pub math_score: f64,
    pub reading_score: f64,
    pub writing_score: f64,
    pub predicted_marks: f64,
    pub pass_probability: f64,
    pub taken_at: DateTime<Utc>,
}

impl PerformanceSnapshot {
    /// Score recorded for a subject.
    pub fn score(&self, subject: Subject) -> f64 {
        match subject {
            Subject::Math => self.math_score,
            Subject::Reading => self.reading_score,
            Subject::Writing => self.writing_score,
        }
    }
}

/// A concrete next-quiz recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSpec {
    /// Human-readable exam name (e.g. "Math Score").
    pub subject_label: String,
    pub test_type: TestType,
    pub difficulty: Difficulty,
    /// Why this quiz was chosen.
    pub rationale: String,
    /// Topic description forwarded to the question generator.
    pub learning_context: String,
}

/// A single multiple-choice question.
///
/// Construct through [`QuizQuestion::new`] or deserialize and call
/// [`QuizQuestion::validate`]; the correct answer must be one of the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(alias = "answer")]
    pub correct_answer: String,
}

impl QuizQuestion {
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, DataError> {
        let question = Self {
            prompt: prompt.into(),
            options,
            correct_answer: correct_answer.into(),
        };
        question.validate(0)?;
        Ok(question)
    }

    /// Check the question invariants. `index` is only used for reporting.
    pub fn validate(&self, index: usize) -> Result<(), DataError> {
        let invalid = |reason: &str| DataError::InvalidQuestion {
            index,
            reason: reason.to_string(),
        };

        if self.prompt.trim().is_empty() {
            return Err(invalid("prompt is empty"));
        }
        if self.options.len() < 2 {
            return Err(invalid("needs at least two options"));
        }
        let mut seen = HashSet::new();
        if !self.options.iter().all(|o| seen.insert(o.as_str())) {
            return Err(invalid("options are not unique"));
        }
        if !self.has_option(&self.correct_answer) {
            return Err(invalid("correct answer is not one of the options"));
        }
        Ok(())
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }

    pub fn is_correct(&self, value: &str) -> bool {
        self.correct_answer == value
    }
}

/// Validate a fetched question list as a whole.
pub fn validate_questions(questions: &[QuizQuestion]) -> Result<(), DataError> {
    if questions.is_empty() {
        return Err(DataError::EmptyQuestionList);
    }
    for (index, question) in questions.iter().enumerate() {
        question.validate(index)?;
    }
    Ok(())
}
