//! Badge catalog and the achievement engine.
//!
//! Badges are data: each one carries a [`BadgeRule`] that is either a
//! threshold on a [`Metric`] or the presence of a [`ProfileFact`]. The engine
//! evaluates rules uniformly and has no per-badge branches.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::stats::CumulativeStats;

/// A numeric statistic a badge can be measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalTests,
    BestScore,
    Level,
}

impl Metric {
    pub fn value(self, stats: &CumulativeStats) -> f64 {
        match self {
            Metric::TotalTests => f64::from(stats.total_tests()),
            Metric::BestScore => stats.best_score(),
            Metric::Level => f64::from(stats.level()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::TotalTests => write!(f, "total_tests"),
            Metric::BestScore => write!(f, "best_score"),
            Metric::Level => write!(f, "level"),
        }
    }
}

impl FromStr for Metric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total_tests" => Ok(Metric::TotalTests),
            "best_score" => Ok(Metric::BestScore),
            "level" => Ok(Metric::Level),
            other => Err(ConfigError::UnknownMetric(other.to_string())),
        }
    }
}

/// A profile-completeness flag a badge can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFact {
    FavoriteSubject,
    DreamJob,
}

impl FromStr for ProfileFact {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favorite_subject" => Ok(ProfileFact::FavoriteSubject),
            "dream_job" => Ok(ProfileFact::DreamJob),
            other => Err(ConfigError::UnknownFact(other.to_string())),
        }
    }
}

/// Profile details relevant to badges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFacts {
    #[serde(default)]
    pub favorite_subject: Option<String>,
    #[serde(default)]
    pub dream_job: Option<String>,
}

impl ProfileFacts {
    /// A fact is present when its value is set and not blank.
    pub fn has(&self, fact: ProfileFact) -> bool {
        let value = match fact {
            ProfileFact::FavoriteSubject => &self.favorite_subject,
            ProfileFact::DreamJob => &self.dream_job,
        };
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

/// How a badge is unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeRule {
    Threshold { metric: Metric, threshold: f64 },
    Fact { fact: ProfileFact },
}

/// A named achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub icon: String,
    pub label: String,
    pub color: String,
    pub rule: BadgeRule,
}

impl Badge {
    fn threshold(id: &str, icon: &str, label: &str, color: &str, metric: Metric, threshold: f64) -> Self {
        Self {
            id: id.into(),
            icon: icon.into(),
            label: label.into(),
            color: color.into(),
            rule: BadgeRule::Threshold { metric, threshold },
        }
    }

    fn fact(id: &str, icon: &str, label: &str, color: &str, fact: ProfileFact) -> Self {
        Self {
            id: id.into(),
            icon: icon.into(),
            label: label.into(),
            color: color.into(),
            rule: BadgeRule::Fact { fact },
        }
    }
}

/// Evaluated state of one badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeStatus {
    pub badge: Badge,
    pub unlocked: bool,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
}

/// The stock catalog of twenty badges.
pub fn default_catalog() -> Vec<Badge> {
    use Metric::*;

    vec![
        Badge::threshold("first-step", "🌱", "First Step", "#84cc16", TotalTests, 1.0),
        Badge::threshold("quick-learner", "⚡", "Quick Learner", "#facc15", TotalTests, 2.0),
        Badge::threshold("bookworm", "📚", "Bookworm", "#38bdf8", TotalTests, 3.0),
        Badge::threshold("brain-boost", "🧠", "Brain Boost", "#0ea5e9", TotalTests, 4.0),
        Badge::threshold("scholar", "🎓", "Scholar", "#6366f1", TotalTests, 5.0),
        Badge::threshold("sharp-aim", "🎯", "Sharp Aim", "#22c55e", BestScore, 50.0),
        Badge::threshold("on-fire", "🔥", "On Fire", "#fb923c", BestScore, 70.0),
        Badge::threshold("high-impact", "💥", "High Impact", "#f97316", BestScore, 80.0),
        Badge::threshold("elite-scorer", "💎", "Elite Scorer", "#a855f7", BestScore, 90.0),
        Badge::threshold("topper", "👑", "Topper", "#ec4899", BestScore, 95.0),
        Badge::fact("subject-lover", "🧪", "Subject Lover", "#14b8a6", ProfileFact::FavoriteSubject),
        Badge::fact("visionary", "🚀", "Visionary", "#f472b6", ProfileFact::DreamJob),
        Badge::threshold("consistent", "🗓️", "Consistent", "#10b981", TotalTests, 7.0),
        Badge::threshold("marathoner", "🏃", "Marathoner", "#06b6d4", TotalTests, 10.0),
        Badge::threshold("explorer", "🧭", "Explorer", "#0ea5e9", Level, 3.0),
        Badge::threshold("veteran", "🛡️", "Veteran", "#8b5cf6", Level, 5.0),
        Badge::threshold("champion", "⚔️", "Champion", "#7c3aed", Level, 7.0),
        Badge::threshold("legend", "🐉", "Legend", "#6d28d9", Level, 10.0),
        Badge::threshold("mythic-mind", "🌌", "Mythic Mind", "#312e81", Level, 15.0),
        Badge::threshold("immortal", "♾️", "Immortal", "#020617", Level, 20.0),
    ]
}

/// Check a catalog for duplicate ids and unusable thresholds.
pub fn validate_catalog(catalog: &[Badge]) -> Result<(), ConfigError> {
    if catalog.is_empty() {
        return Err(ConfigError::EmptyCatalog);
    }

    let mut seen = HashSet::new();
    for badge in catalog {
        if !seen.insert(badge.id.as_str()) {
            return Err(ConfigError::DuplicateBadge(badge.id.clone()));
        }
        if let BadgeRule::Threshold { threshold, .. } = badge.rule {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(ConfigError::InvalidThreshold {
                    badge: badge.id.clone(),
                    threshold,
                });
            }
        }
    }
    Ok(())
}

/// Evaluates a validated badge catalog against learner statistics.
#[derive(Debug, Clone)]
pub struct AchievementEngine {
    catalog: Vec<Badge>,
}

impl AchievementEngine {
    pub fn new(catalog: Vec<Badge>) -> Result<Self, ConfigError> {
        validate_catalog(&catalog)?;
        Ok(Self { catalog })
    }

    pub fn catalog(&self) -> &[Badge] {
        &self.catalog
    }

    /// Evaluate every badge, preserving catalog order.
    pub fn evaluate(&self, stats: &CumulativeStats, facts: &ProfileFacts) -> Vec<BadgeStatus> {
        self.catalog
            .iter()
            .map(|badge| {
                let (unlocked, progress) = match badge.rule {
                    BadgeRule::Threshold { metric, threshold } => {
                        let value = metric.value(stats);
                        (value >= threshold, progress_towards(value, threshold))
                    }
                    BadgeRule::Fact { fact } => {
                        let present = facts.has(fact);
                        (present, if present { 100.0 } else { 0.0 })
                    }
                };
                BadgeStatus {
                    badge: badge.clone(),
                    unlocked,
                    progress,
                }
            })
            .collect()
    }
}

impl Default for AchievementEngine {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
        }
    }
}

/// Number of unlocked badges in an evaluation.
pub fn unlocked_count(statuses: &[BadgeStatus]) -> usize {
    statuses.iter().filter(|s| s.unlocked).count()
}

fn progress_towards(value: f64, threshold: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    (value / threshold * 100.0).min(100.0)
}
