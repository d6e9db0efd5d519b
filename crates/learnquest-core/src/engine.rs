//! Assessment engine orchestrator.
//!
//! Wires the snapshot source, classifier, planner, question generator,
//! fallback bank, quiz session and achievement engine together so that each
//! learner action is one call.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::achievements::{AchievementEngine, BadgeStatus, ProfileFacts};
use crate::config::EngineConfig;
use crate::error::{ConfigError, FetchError, ValidationError};
use crate::model::{Difficulty, PerformanceSnapshot, RecommendationSpec, TestType};
use crate::planner::RecommendationPlanner;
use crate::risk::classify;
use crate::scoring::{ScoreResult, Weight};
use crate::session::{FetchOutcome, QuizSession, SessionState};
use crate::stats::{CumulativeStats, HistoryRecord, RecordKind};
use crate::traits::{HistoryStore, QuestionGenerator, SnapshotSource};

/// Default upper bound on a question fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The assessment engine.
pub struct AssessmentEngine {
    config: EngineConfig,
    planner: RecommendationPlanner,
    achievements: AchievementEngine,
    generator: Arc<dyn QuestionGenerator>,
    fetch_timeout: Duration,
}

impl AssessmentEngine {
    /// Build an engine. Fails if the badge catalog is invalid.
    pub fn new(
        config: EngineConfig,
        generator: Arc<dyn QuestionGenerator>,
    ) -> Result<Self, ConfigError> {
        let planner = RecommendationPlanner::new(config.thresholds, config.exams.clone());
        let achievements = AchievementEngine::new(config.badges.clone())?;
        Ok(Self {
            config,
            planner,
            achievements,
            generator,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        })
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recommend the next quiz for a learner.
    ///
    /// A failed snapshot read is treated like missing history: the caller gets
    /// `None` and falls back to manual selection.
    pub async fn recommend(
        &self,
        source: &dyn SnapshotSource,
        user_id: &str,
    ) -> Option<RecommendationSpec> {
        let snapshot = match source.latest_snapshot(user_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(user_id, "snapshot read failed, no recommendation: {e:#}");
                None
            }
        };
        self.recommend_from(snapshot.as_ref())
    }

    /// Recommend from an already-loaded snapshot.
    pub fn recommend_from(&self, snapshot: Option<&PerformanceSnapshot>) -> Option<RecommendationSpec> {
        self.planner.plan(classify(snapshot).as_ref())
    }

    /// Spec for a quiz chosen by hand.
    pub fn manual_spec(&self, test_type: TestType, difficulty: Difficulty) -> RecommendationSpec {
        self.planner.manual(test_type, difficulty)
    }

    /// Points per correct answer for a test type.
    pub fn weight_for(&self, test_type: TestType) -> f64 {
        self.config.exams.get(test_type).marks_per_question
    }

    /// Start `session` on `spec` and load its questions.
    ///
    /// Generator failures never abort: the fallback bank is used and the
    /// returned outcome says so.
    pub async fn begin_quiz(
        &self,
        session: &mut QuizSession,
        spec: RecommendationSpec,
    ) -> Result<FetchOutcome, ValidationError> {
        let weight = Weight::new(self.weight_for(spec.test_type))?;
        let num_questions = self.config.exams.get(spec.test_type).questions_needed;
        let ticket = session.start(spec, weight, num_questions)?;

        let result = match tokio::time::timeout(
            self.fetch_timeout,
            self.generator.generate(&ticket.request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout.as_secs())),
        };

        let outcome = session.apply_fetch(ticket.request_id, result, &self.config.fallback);
        match &outcome {
            FetchOutcome::Generated { count } => {
                info!(generator = self.generator.name(), count, "quiz ready");
            }
            FetchOutcome::Fallback { count, .. } => {
                info!(count, "quiz ready with offline questions");
            }
            FetchOutcome::Stale => {}
        }
        Ok(outcome)
    }

    /// Submit `session` and append the result to the learner's history.
    ///
    /// A repeated call on an already submitted session returns the same result
    /// and records nothing. A failed append is logged; the score stands.
    pub async fn finish_quiz(
        &self,
        session: &mut QuizSession,
        store: &dyn HistoryStore,
        user_id: &str,
    ) -> Result<ScoreResult, ValidationError> {
        let already_submitted = session.state() == SessionState::Submitted;
        let result = session.submit()?;
        if already_submitted {
            return Ok(result);
        }

        let record = HistoryRecord {
            recorded_at: chrono::Utc::now(),
            kind: RecordKind::Quiz,
            test_type: session.spec().map(|s| s.test_type),
            total_marks: Some(result.score),
        };
        if let Err(e) = store.append(user_id, record).await {
            warn!(user_id, "failed to record quiz result: {e:#}");
        }
        Ok(result)
    }

    /// Evaluate the badge catalog.
    pub fn achievements(&self, stats: &CumulativeStats, facts: &ProfileFacts) -> Vec<BadgeStatus> {
        self.achievements.evaluate(stats, facts)
    }

    /// Load a learner's history and evaluate the badge catalog against it.
    ///
    /// A failed history read is treated as an empty history.
    pub async fn achievements_for(
        &self,
        store: &dyn HistoryStore,
        user_id: &str,
        facts: &ProfileFacts,
    ) -> (CumulativeStats, Vec<BadgeStatus>) {
        let history = match store.history(user_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(user_id, "history read failed, showing empty stats: {e:#}");
                Vec::new()
            }
        };
        let stats = CumulativeStats::from_history(&history);
        let badges = self.achievements(&stats, facts);
        (stats, badges)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::model::{QuizQuestion, RiskLevel};
    use crate::session::QuestionSource;
    use crate::traits::QuestionRequest;

    struct StubGenerator {
        questions: Result<Vec<QuizQuestion>, FetchError>,
        delay: Option<Duration>,
        calls: AtomicU32,
        last_request: Mutex<Option<QuestionRequest>>,
    }

    impl StubGenerator {
        fn ok(questions: Vec<QuizQuestion>) -> Self {
            Self {
                questions: Ok(questions),
                delay: None,
                calls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn failing(err: FetchError) -> Self {
            Self {
                questions: Err(err),
                delay: None,
                calls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl QuestionGenerator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, request: &QuestionRequest) -> Result<Vec<QuizQuestion>, FetchError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.questions.clone()
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        snapshots: HashMap<String, PerformanceSnapshot>,
        history: Mutex<HashMap<String, Vec<HistoryRecord>>>,
        broken: bool,
    }

    #[async_trait]
    impl SnapshotSource for MemoryStore {
        async fn latest_snapshot(&self, user_id: &str) -> anyhow::Result<Option<PerformanceSnapshot>> {
            if self.broken {
                anyhow::bail!("store unavailable");
            }
            Ok(self.snapshots.get(user_id).cloned())
        }
    }

    #[async_trait]
    impl HistoryStore for MemoryStore {
        async fn history(&self, user_id: &str) -> anyhow::Result<Vec<HistoryRecord>> {
            if self.broken {
                anyhow::bail!("store unavailable");
            }
            Ok(self.history.lock().unwrap().get(user_id).cloned().unwrap_or_default())
        }

        async fn append(&self, user_id: &str, record: HistoryRecord) -> anyhow::Result<()> {
            if self.broken {
                anyhow::bail!("store unavailable");
            }
            self.history
                .lock()
                .unwrap()
                .entry(user_id.to_string())
                .or_default()
                .push(record);
            Ok(())
        }
    }

    fn questions() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion::new("1 + 1?", vec!["2".into(), "3".into()], "2").unwrap(),
            QuizQuestion::new("2 + 2?", vec!["4".into(), "5".into()], "4").unwrap(),
        ]
    }

    fn engine(generator: StubGenerator) -> AssessmentEngine {
        AssessmentEngine::new(EngineConfig::default(), Arc::new(generator)).unwrap()
    }

    fn snapshot(risk: RiskLevel, math: f64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            risk_level: risk,
            math_score: math,
            reading_score: 80.0,
            writing_score: 90.0,
            predicted_marks: 70.0,
            pass_probability: 0.6,
            taken_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn recommends_from_latest_snapshot() {
        let mut store = MemoryStore::default();
        store
            .snapshots
            .insert("ada".into(), snapshot(RiskLevel::Medium, 30.0));
        let engine = engine(StubGenerator::ok(questions()));

        let spec = engine.recommend(&store, "ada").await.unwrap();
        assert_eq!(spec.test_type, TestType::Math);
        assert_eq!(spec.difficulty, Difficulty::Easy);

        assert!(engine.recommend(&store, "nobody").await.is_none());
    }

    #[tokio::test]
    async fn snapshot_read_failure_degrades_to_no_recommendation() {
        let store = MemoryStore {
            broken: true,
            ..Default::default()
        };
        let engine = engine(StubGenerator::ok(questions()));
        assert!(engine.recommend(&store, "ada").await.is_none());
    }

    #[tokio::test]
    async fn begin_quiz_uses_generated_questions_and_exam_weight() {
        let engine = engine(StubGenerator::ok(questions()));
        let mut session = QuizSession::new();
        let spec = engine.manual_spec(TestType::Internal1, Difficulty::Hard);

        let outcome = engine.begin_quiz(&mut session, spec).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Generated { count: 2 });
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.weight(), 4.0);
    }

    #[tokio::test]
    async fn begin_quiz_requests_exam_question_count() {
        let config = crate::config::parse_engine_config_str(
            "[[exams]]\ntest_type = \"reading\"\nname = \"Reading Check\"\ntopic = \"Short Stories\"\nquestions_needed = 5\nmarks_per_question = 2\n",
        )
        .unwrap();
        let generator = Arc::new(StubGenerator::ok(questions()));
        let engine = AssessmentEngine::new(config, generator.clone()).unwrap();
        let mut session = QuizSession::new();
        let spec = engine.manual_spec(TestType::Reading, Difficulty::Medium);

        engine.begin_quiz(&mut session, spec).await.unwrap();
        let request = generator.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.num_questions, 5);
        assert_eq!(request.test_type, TestType::Reading);
        assert_eq!(request.learning_context, "Short Stories");
        assert_eq!(session.weight(), 2.0);
    }

    #[tokio::test]
    async fn generator_failure_falls_back() {
        let engine = engine(StubGenerator::failing(FetchError::Api {
            status: 500,
            message: "boom".into(),
        }));
        let mut session = QuizSession::new();
        let spec = engine.manual_spec(TestType::Reading, Difficulty::Easy);

        let outcome = engine.begin_quiz(&mut session, spec).await.unwrap();
        assert!(outcome.is_fallback());
        assert_eq!(session.source(), Some(QuestionSource::Fallback));
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generator_times_out_into_fallback() {
        let mut generator = StubGenerator::ok(questions());
        generator.delay = Some(Duration::from_secs(120));
        let engine = engine(generator).with_fetch_timeout(Duration::from_secs(5));
        let mut session = QuizSession::new();
        let spec = engine.manual_spec(TestType::Math, Difficulty::Medium);

        let outcome = engine.begin_quiz(&mut session, spec).await.unwrap();
        match outcome {
            FetchOutcome::Fallback { reason, .. } => assert_eq!(reason, FetchError::Timeout(5)),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn begin_quiz_rejects_busy_session() {
        let generator = StubGenerator::ok(questions());
        let engine = engine(generator);
        let mut session = QuizSession::new();
        let spec = engine.manual_spec(TestType::Math, Difficulty::Easy);
        engine.begin_quiz(&mut session, spec.clone()).await.unwrap();

        let err = engine.begin_quiz(&mut session, spec).await.unwrap_err();
        assert!(matches!(err, ValidationError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn finish_quiz_records_history_once() {
        let engine = engine(StubGenerator::ok(questions()));
        let store = MemoryStore::default();
        let mut session = QuizSession::new();
        let spec = engine.manual_spec(TestType::Math, Difficulty::Easy);
        engine.begin_quiz(&mut session, spec).await.unwrap();

        assert!(matches!(
            engine.finish_quiz(&mut session, &store, "ada").await,
            Err(ValidationError::IncompleteSubmission { .. })
        ));

        session.select_answer(0, "2").unwrap();
        session.select_answer(1, "4").unwrap();
        let first = engine.finish_quiz(&mut session, &store, "ada").await.unwrap();
        let second = engine.finish_quiz(&mut session, &store, "ada").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.score, 20.0);

        let history = store.history("ada").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_marks, Some(20.0));
        assert_eq!(history[0].test_type, Some(TestType::Math));
    }

    #[tokio::test]
    async fn achievements_follow_history() {
        let engine = engine(StubGenerator::ok(questions()));
        let store = MemoryStore::default();
        for marks in [40.0, 75.0, 60.0] {
            store
                .append(
                    "ada",
                    HistoryRecord {
                        recorded_at: Utc::now(),
                        kind: RecordKind::Prediction,
                        test_type: None,
                        total_marks: Some(marks),
                    },
                )
                .await
                .unwrap();
        }

        let (stats, badges) = engine
            .achievements_for(&store, "ada", &ProfileFacts::default())
            .await;
        assert_eq!(stats, CumulativeStats::new(3, 75.0));
        let on_fire = badges.iter().find(|b| b.badge.id == "on-fire").unwrap();
        assert!(on_fire.unlocked);
        let scholar = badges.iter().find(|b| b.badge.id == "scholar").unwrap();
        assert_eq!(scholar.progress, 60.0);
    }

    #[tokio::test]
    async fn achievements_survive_broken_store() {
        let engine = engine(StubGenerator::ok(questions()));
        let store = MemoryStore {
            broken: true,
            ..Default::default()
        };
        let (stats, badges) = engine
            .achievements_for(&store, "ada", &ProfileFacts::default())
            .await;
        assert_eq!(stats, CumulativeStats::default());
        assert!(badges.iter().all(|b| !b.unlocked));
    }
}
