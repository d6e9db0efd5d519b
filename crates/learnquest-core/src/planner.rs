//! Maps a risk assessment to the next quiz to take.

use crate::config::{ExamCatalog, PlannerThresholds};
use crate::model::{Difficulty, RecommendationSpec, RiskLevel, TestType};
use crate::risk::RiskAssessment;

const ADVANCED_RATIONALE: &str = "Advanced challenge for a high performer.";
const BALANCED_RATIONALE: &str = "Balanced readiness drill: no subject needs urgent attention.";

/// Pure decision policy from assessment to [`RecommendationSpec`].
#[derive(Debug, Clone)]
pub struct RecommendationPlanner {
    thresholds: PlannerThresholds,
    exams: ExamCatalog,
}

impl RecommendationPlanner {
    pub fn new(thresholds: PlannerThresholds, exams: ExamCatalog) -> Self {
        Self { thresholds, exams }
    }

    pub fn thresholds(&self) -> PlannerThresholds {
        self.thresholds
    }

    /// Recommend the next quiz. `None` when there is no assessment.
    ///
    /// Rules, first match wins:
    /// 1. Low risk: `Internal2` at `VeryHard`.
    /// 2. Weakest score below the remediation threshold: a booster test on that
    ///    subject, `Easy` below the easy threshold, `Medium` otherwise.
    /// 3. Anything else: `Internal1` at `Hard`.
    pub fn plan(&self, assessment: Option<&RiskAssessment>) -> Option<RecommendationSpec> {
        let assessment = assessment?;

        if assessment.risk_level == RiskLevel::Low {
            return Some(self.spec(TestType::Internal2, Difficulty::VeryHard, ADVANCED_RATIONALE.into()));
        }

        if let (Some(subject), Some(score)) = (assessment.weakest_subject, assessment.weakest_score) {
            if score < self.thresholds.remediation {
                let difficulty = if score < self.thresholds.easy {
                    Difficulty::Easy
                } else {
                    Difficulty::Medium
                };
                let rationale = format!(
                    "Booster test: {subject} is your weakest subject at {score}/100, \
                     below the {:.0} target.",
                    self.thresholds.remediation
                );
                return Some(self.spec(subject.test_type(), difficulty, rationale));
            }
        }

        Some(self.spec(TestType::Internal1, Difficulty::Hard, BALANCED_RATIONALE.into()))
    }

    /// Spec for a quiz picked by hand, used when there is no history.
    pub fn manual(&self, test_type: TestType, difficulty: Difficulty) -> RecommendationSpec {
        let profile = self.exams.get(test_type);
        self.spec(
            test_type,
            difficulty,
            format!("Practice quiz chosen by the learner: {}.", profile.name),
        )
    }

    fn spec(&self, test_type: TestType, difficulty: Difficulty, rationale: String) -> RecommendationSpec {
        let profile = self.exams.get(test_type);
        RecommendationSpec {
            subject_label: profile.name.clone(),
            test_type,
            difficulty,
            rationale,
            learning_context: profile.topic.clone(),
        }
    }
}

impl Default for RecommendationPlanner {
    fn default() -> Self {
        Self::new(PlannerThresholds::default(), ExamCatalog::default())
    }
}
