//! Cumulative learner statistics folded from the external result history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::TestType;

/// What produced a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Quiz,
    Prediction,
}

/// One entry of the learner's result history, appended after a quiz or a
/// prediction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub recorded_at: DateTime<Utc>,
    pub kind: RecordKind,
    #[serde(default)]
    pub test_type: Option<TestType>,
    /// Marks earned (quiz) or predicted (forecast). Missing counts as 0.
    #[serde(default)]
    pub total_marks: Option<f64>,
}

/// Statistics recomputed on every view from the full history.
///
/// `level` is always derived from `total_tests`; a serialized `level` is
/// ignored on the way back in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatsCounters")]
pub struct CumulativeStats {
    total_tests: u32,
    best_score: f64,
    level: u32,
}

#[derive(Deserialize)]
struct StatsCounters {
    total_tests: u32,
    best_score: f64,
}

impl From<StatsCounters> for CumulativeStats {
    fn from(counters: StatsCounters) -> Self {
        Self::new(counters.total_tests, counters.best_score)
    }
}

impl CumulativeStats {
    /// Build stats from counters; `level` is derived, never supplied.
    pub fn new(total_tests: u32, best_score: f64) -> Self {
        Self {
            total_tests,
            best_score: best_score.max(0.0),
            level: level_for(total_tests),
        }
    }

    /// Fold a result history into stats.
    pub fn from_history(history: &[HistoryRecord]) -> Self {
        let best = history
            .iter()
            .map(|r| r.total_marks.filter(|m| m.is_finite()).unwrap_or(0.0))
            .fold(0.0_f64, f64::max);
        Self::new(u32::try_from(history.len()).unwrap_or(u32::MAX), best)
    }

    pub fn total_tests(&self) -> u32 {
        self.total_tests
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for CumulativeStats {
    fn default() -> Self {
        Self::new(0, 0.0)
    }
}

/// Every two completed tests raise the level by one, starting at 1.
pub fn level_for(total_tests: u32) -> u32 {
    total_tests / 2 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(marks: Option<f64>) -> HistoryRecord {
        HistoryRecord {
            recorded_at: Utc::now(),
            kind: RecordKind::Prediction,
            test_type: None,
            total_marks: marks,
        }
    }

    #[test]
    fn empty_history() {
        let stats = CumulativeStats::from_history(&[]);
        assert_eq!(stats, CumulativeStats::new(0, 0.0));
        assert_eq!(stats.level(), 1);
    }

    #[test]
    fn level_formula() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(1), 1);
        assert_eq!(level_for(2), 2);
        assert_eq!(level_for(5), 3);
        assert_eq!(level_for(38), 20);
    }

    #[test]
    fn best_score_ignores_missing_marks() {
        let history = vec![record(Some(42.0)), record(None), record(Some(88.5))];
        let stats = CumulativeStats::from_history(&history);
        assert_eq!(stats.total_tests(), 3);
        assert_eq!(stats.best_score(), 88.5);
        assert_eq!(stats.level(), 2);
    }

    #[test]
    fn deserialized_level_is_recomputed() {
        let stats: CumulativeStats =
            serde_json::from_str(r#"{"total_tests": 5, "best_score": 72.5, "level": 99}"#).unwrap();
        assert_eq!(stats.level(), 3);
        assert_eq!(stats, CumulativeStats::new(5, 72.5));

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["level"], 3);
    }
}
