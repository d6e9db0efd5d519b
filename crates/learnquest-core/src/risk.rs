//! Risk classification of a performance snapshot.

use serde::{Deserialize, Serialize};

use crate::model::{PerformanceSnapshot, RiskLevel, Subject};

/// Risk tier plus the learner's weakest subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub weakest_subject: Option<Subject>,
    pub weakest_score: Option<f64>,
}

/// Classify a snapshot. Returns `None` when the learner has no history.
///
/// The weakest subject is the one with the lowest score. Ties go to the
/// subject that comes first in `Math > Reading > Writing`. Non-finite scores
/// are skipped; if no score is usable both weakest fields are `None`.
pub fn classify(snapshot: Option<&PerformanceSnapshot>) -> Option<RiskAssessment> {
    let snapshot = snapshot?;

    let mut weakest: Option<(Subject, f64)> = None;
    for subject in Subject::ALL {
        let score = snapshot.score(subject);
        if !score.is_finite() {
            continue;
        }
        // Strict comparison keeps the earlier subject on ties.
        match weakest {
            Some((_, lowest)) if score >= lowest => {}
            _ => weakest = Some((subject, score)),
        }
    }

    Some(RiskAssessment {
        risk_level: snapshot.risk_level,
        weakest_subject: weakest.map(|(s, _)| s),
        weakest_score: weakest.map(|(_, score)| score),
    })
}
