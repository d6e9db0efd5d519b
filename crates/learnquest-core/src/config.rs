//! Engine configuration: planner thresholds, exam profiles, the offline
//! question bank and the badge catalog.
//!
//! Loaded from TOML. Every table is optional; missing tables fall back to the
//! built-in defaults. Any unknown name or invalid value is a [`ConfigError`].

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::achievements::{default_catalog, validate_catalog, Badge, BadgeRule};
use crate::error::ConfigError;
use crate::fallback::FallbackBank;
use crate::model::{QuizQuestion, TestType};

/// Score cut-offs used by the recommendation planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerThresholds {
    /// A weakest score below this triggers a booster test.
    pub remediation: f64,
    /// A weakest score below this makes the booster test `Easy`.
    pub easy: f64,
}

impl PlannerThresholds {
    pub const DEFAULT_REMEDIATION: f64 = 65.0;
    pub const DEFAULT_EASY: f64 = 40.0;

    pub fn new(remediation: f64, easy: f64) -> Result<Self, ConfigError> {
        if !remediation.is_finite() || !easy.is_finite() || easy > remediation {
            return Err(ConfigError::InvalidThresholds { remediation, easy });
        }
        Ok(Self { remediation, easy })
    }
}

impl Default for PlannerThresholds {
    fn default() -> Self {
        Self {
            remediation: Self::DEFAULT_REMEDIATION,
            easy: Self::DEFAULT_EASY,
        }
    }
}

/// Per-test-type exam settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamProfile {
    pub test_type: TestType,
    /// Label shown to the learner (e.g. "Internal Test 1").
    pub name: String,
    /// Learning context sent to the question generator.
    pub topic: String,
    pub questions_needed: usize,
    /// Points awarded per correct answer.
    pub marks_per_question: f64,
}

impl ExamProfile {
    fn new(test_type: TestType, name: &str, topic: &str, questions_needed: usize, marks: f64) -> Self {
        Self {
            test_type,
            name: name.to_string(),
            topic: topic.to_string(),
            questions_needed,
            marks_per_question: marks,
        }
    }

    pub fn max_marks(&self) -> f64 {
        self.questions_needed as f64 * self.marks_per_question
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidExamProfile {
            test_type: self.test_type,
            reason: reason.to_string(),
        };
        if self.questions_needed == 0 {
            return Err(invalid("questions_needed must be at least 1"));
        }
        if !self.marks_per_question.is_finite() || self.marks_per_question <= 0.0 {
            return Err(invalid("marks_per_question must be positive"));
        }
        if self.topic.trim().is_empty() {
            return Err(invalid("topic is empty"));
        }
        Ok(())
    }
}

/// One exam profile per test type.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamCatalog {
    profiles: BTreeMap<TestType, ExamProfile>,
}

impl ExamCatalog {
    /// Validate `profiles`; every test type needs one. A later profile for the
    /// same test type replaces an earlier one.
    pub fn new(profiles: impl IntoIterator<Item = ExamProfile>) -> Result<Self, ConfigError> {
        let mut by_type = BTreeMap::new();
        for profile in profiles {
            profile.validate()?;
            by_type.insert(profile.test_type, profile);
        }
        if let Some(missing) = TestType::ALL.into_iter().find(|t| !by_type.contains_key(t)) {
            return Err(ConfigError::MissingExamProfile(missing));
        }
        Ok(Self { profiles: by_type })
    }

    /// The profile for `test_type`. `new` rejects incomplete catalogs, so
    /// every test type is present.
    pub fn get(&self, test_type: TestType) -> &ExamProfile {
        &self.profiles[&test_type]
    }

    /// Profiles in test type order.
    pub fn iter(&self) -> impl Iterator<Item = &ExamProfile> {
        self.profiles.values()
    }
}

impl Default for ExamCatalog {
    fn default() -> Self {
        Self {
            profiles: default_exam_profiles()
                .into_iter()
                .map(|p| (p.test_type, p))
                .collect(),
        }
    }
}

fn default_exam_profiles() -> Vec<ExamProfile> {
    vec![
        ExamProfile::new(TestType::Math, "Math Score", "Grade 5 Mathematics", 10, 10.0),
        ExamProfile::new(TestType::Reading, "Reading Score", "Reading Comprehension", 10, 10.0),
        ExamProfile::new(TestType::Writing, "Writing Score", "English Grammar", 10, 10.0),
        ExamProfile::new(TestType::Internal1, "Internal Test 1", "General Science", 10, 4.0),
        ExamProfile::new(TestType::Internal2, "Internal Test 2", "Social Studies", 10, 4.0),
        ExamProfile::new(TestType::Assignment, "Assignment", "Logical Reasoning", 10, 1.0),
    ]
}

/// Complete, validated engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub thresholds: PlannerThresholds,
    pub exams: ExamCatalog,
    pub fallback: FallbackBank,
    pub badges: Vec<Badge>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: PlannerThresholds::default(),
            exams: ExamCatalog::default(),
            fallback: FallbackBank::default(),
            badges: default_catalog(),
        }
    }
}

// ---------------------------------------------------------------------------
// TOML parsing
// ---------------------------------------------------------------------------

/// Intermediate TOML structure. Unrelated tables (e.g. `[generator]`) are
/// ignored so the engine settings can share a file with provider settings.
#[derive(Debug, Default, Deserialize)]
struct TomlEngineFile {
    #[serde(default)]
    thresholds: Option<TomlThresholds>,
    #[serde(default)]
    exams: Vec<TomlExam>,
    #[serde(default)]
    fallback: Vec<TomlFallbackQuestion>,
    #[serde(default)]
    badges: Vec<TomlBadge>,
}

#[derive(Debug, Deserialize)]
struct TomlThresholds {
    #[serde(default = "default_remediation")]
    remediation: f64,
    #[serde(default = "default_easy")]
    easy: f64,
}

fn default_remediation() -> f64 {
    PlannerThresholds::DEFAULT_REMEDIATION
}

fn default_easy() -> f64 {
    PlannerThresholds::DEFAULT_EASY
}

#[derive(Debug, Deserialize)]
struct TomlExam {
    test_type: String,
    name: String,
    topic: String,
    #[serde(default = "default_questions_needed")]
    questions_needed: usize,
    #[serde(default = "default_marks_per_question")]
    marks_per_question: f64,
}

fn default_questions_needed() -> usize {
    10
}

fn default_marks_per_question() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct TomlFallbackQuestion {
    test_type: String,
    question: String,
    options: Vec<String>,
    correct_answer: String,
}

#[derive(Debug, Deserialize)]
struct TomlBadge {
    id: String,
    #[serde(default)]
    icon: String,
    label: String,
    #[serde(default = "default_color")]
    color: String,
    #[serde(default)]
    metric: Option<String>,
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(default)]
    fact: Option<String>,
}

fn default_color() -> String {
    "#64748b".to_string()
}

/// Parse an engine config file.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    parse_engine_config_str(&content)
        .with_context(|| format!("invalid engine config: {}", path.display()))
}

/// Parse an engine config from a TOML string.
pub fn parse_engine_config_str(content: &str) -> Result<EngineConfig> {
    let parsed: TomlEngineFile = toml::from_str(content).context("failed to parse TOML")?;
    Ok(build_engine_config(parsed)?)
}

fn build_engine_config(parsed: TomlEngineFile) -> Result<EngineConfig, ConfigError> {
    let thresholds = match parsed.thresholds {
        Some(t) => PlannerThresholds::new(t.remediation, t.easy)?,
        None => PlannerThresholds::default(),
    };

    // Configured exams override the defaults per test type.
    let mut exams: BTreeMap<TestType, ExamProfile> = default_exam_profiles()
        .into_iter()
        .map(|p| (p.test_type, p))
        .collect();
    for exam in parsed.exams {
        let test_type: TestType = exam.test_type.parse()?;
        exams.insert(
            test_type,
            ExamProfile {
                test_type,
                name: exam.name,
                topic: exam.topic,
                questions_needed: exam.questions_needed,
                marks_per_question: exam.marks_per_question,
            },
        );
    }
    let exams = ExamCatalog::new(exams.into_values())?;

    let mut overrides: BTreeMap<TestType, Vec<QuizQuestion>> = BTreeMap::new();
    for entry in parsed.fallback {
        let test_type: TestType = entry.test_type.parse()?;
        overrides.entry(test_type).or_default().push(QuizQuestion {
            prompt: entry.question,
            options: entry.options,
            correct_answer: entry.correct_answer,
        });
    }
    let fallback = FallbackBank::with_overrides(overrides)?;

    let badges = if parsed.badges.is_empty() {
        default_catalog()
    } else {
        parsed
            .badges
            .into_iter()
            .map(build_badge)
            .collect::<Result<Vec<_>, _>>()?
    };
    validate_catalog(&badges)?;

    Ok(EngineConfig {
        thresholds,
        exams,
        fallback,
        badges,
    })
}

fn build_badge(badge: TomlBadge) -> Result<Badge, ConfigError> {
    let rule = match (badge.metric, badge.threshold, badge.fact) {
        (Some(metric), Some(threshold), None) => BadgeRule::Threshold {
            metric: metric.parse()?,
            threshold,
        },
        (None, None, Some(fact)) => BadgeRule::Fact {
            fact: fact.parse()?,
        },
        (None, None, None) | (Some(_), None, None) | (None, Some(_), None) => {
            return Err(ConfigError::MissingPredicate(badge.id));
        }
        _ => return Err(ConfigError::AmbiguousPredicate { badge: badge.id }),
    };

    Ok(Badge {
        id: badge.id,
        icon: badge.icon,
        label: badge.label,
        color: badge.color,
        rule,
    })
}
