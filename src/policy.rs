//! Policy engine
//!
//! Composition root for an evaluation: scores → classification → hysteresis
//! → final tier. Collaborators are passed per call; an evaluation is a pure
//! read-then-compute sequence keyed by user, so concurrent evaluations share
//! no mutable state.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::classifier::IntensityClassifier;
use crate::config::PolicyConfig;
use crate::error::EngineError;
use crate::history::{MetricHistory, PlanHistory};
use crate::hysteresis::HysteresisFilter;
use crate::scores::ScoreCalculator;
use crate::types::{Intensity, Recommendation, RecommendationBasis, ScoreSet};

/// Tier substituted when evaluation fails.
pub const FALLBACK_INTENSITY: Intensity = Intensity::Moderate;

/// Orchestrates score computation, classification, and smoothing.
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyEngine {
    /// Create an engine with the default policy configuration.
    pub fn new() -> Self {
        Self {
            config: PolicyConfig::default(),
        }
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Compute the final recommended tier for `user_id` at `as_of`.
    ///
    /// Fails only when a data collaborator fails; missing history is defined
    /// data and produces the neutral scores.
    pub fn next_best_intensity(
        &self,
        plans: &dyn PlanHistory,
        metrics: &dyn MetricHistory,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Intensity, EngineError> {
        self.evaluate(plans, metrics, user_id, as_of)
            .map(|(intensity, _)| intensity)
    }

    /// Both scores for `user_id` at `as_of`.
    pub fn scores(
        &self,
        plans: &dyn PlanHistory,
        metrics: &dyn MetricHistory,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<ScoreSet, EngineError> {
        Ok(ScoreSet {
            readiness: ScoreCalculator::readiness(metrics, user_id, as_of, &self.config)?,
            adherence: ScoreCalculator::adherence(plans, user_id, as_of, &self.config)?,
        })
    }

    /// Evaluate and never fail: collaborator errors collapse to the neutral
    /// default tier, with the reason recorded on the basis so callers can
    /// tell a computed Moderate from a substituted one.
    pub fn recommend(
        &self,
        plans: &dyn PlanHistory,
        metrics: &dyn MetricHistory,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Recommendation {
        match self.evaluate(plans, metrics, user_id, as_of) {
            Ok((intensity, scores)) => Recommendation {
                user_id: user_id.to_string(),
                as_of,
                intensity,
                basis: RecommendationBasis::Computed { scores },
            },
            Err(e) => {
                warn!(user_id, error = %e, "evaluation failed, substituting neutral tier");
                Recommendation {
                    user_id: user_id.to_string(),
                    as_of,
                    intensity: FALLBACK_INTENSITY,
                    basis: RecommendationBasis::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    fn evaluate(
        &self,
        plans: &dyn PlanHistory,
        metrics: &dyn MetricHistory,
        user_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<(Intensity, ScoreSet), EngineError> {
        let scores = self.scores(plans, metrics, user_id, as_of)?;
        let raw = IntensityClassifier::classify(
            scores.readiness,
            scores.adherence,
            &self.config.thresholds,
        );
        let last = plans
            .last_plan(user_id)?
            .and_then(|plan| plan.workout_intensity());
        let intensity = HysteresisFilter::apply(last, raw);
        debug!(
            user_id,
            readiness = scores.readiness,
            adherence = scores.adherence,
            raw = raw.as_str(),
            last = last.map(|tier| tier.as_str()),
            intensity = intensity.as_str(),
            "evaluated intensity"
        );
        Ok((intensity, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{
        MetricKind, MetricSample, PlanItem, PlanItemKind, PlanRecord, PlanStatus,
    };
    use chrono::{Duration, NaiveDate, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
    }

    fn sleep_sample(hours_ago: i64, value: f64) -> MetricSample {
        MetricSample {
            user_id: "u1".to_string(),
            kind: MetricKind::SleepScore,
            recorded_at: as_of() - Duration::hours(hours_ago),
            value: serde_json::json!(value),
        }
    }

    fn workout_plan(date: NaiveDate, intensity: Intensity) -> PlanRecord {
        PlanRecord {
            user_id: "u1".to_string(),
            date,
            status: PlanStatus::Completed,
            items: vec![PlanItem {
                kind: PlanItemKind::Workout,
                intensity,
                duration_minutes: 30,
                description: "session".to_string(),
            }],
        }
    }

    /// No plans and no HR history: the HR sub-score is neutral 0.5. With a
    /// recent sleep score of 90, readiness lands at 0.74 and adherence at
    /// the neutral 0.5, so classification yields Moderate with no last
    /// intensity to smooth against.
    #[test]
    fn test_cold_start_user_lands_on_moderate() {
        let mut store = MemoryStore::new();
        store.add_sample(sleep_sample(10, 90.0));

        let engine = PolicyEngine::new();
        let scores = engine.scores(&store, &store, "u1", as_of()).unwrap();
        assert!((scores.adherence - 0.5).abs() < f64::EPSILON);

        let tier = engine
            .next_best_intensity(&store, &store, "u1", as_of())
            .unwrap();
        assert_eq!(tier, Intensity::Moderate);
    }

    #[test]
    fn test_hysteresis_consults_last_workout() {
        let mut store = MemoryStore::new();
        // Strong recent signals that classify raw High: resting HR well
        // below its two-week baseline plus excellent sleep...
        for day in 2..14 {
            store.add_sample(MetricSample {
                kind: MetricKind::Hr,
                recorded_at: as_of() - Duration::hours(day * 24),
                ..sleep_sample(0, 75.0)
            });
        }
        store.add_sample(MetricSample {
            kind: MetricKind::Hr,
            recorded_at: as_of() - Duration::hours(5),
            ..sleep_sample(0, 55.0)
        });
        store.add_sample(sleep_sample(10, 95.0));
        for day in 0..5 {
            let date = as_of().date_naive() - Duration::days(day);
            store.add_plan(workout_plan(date, Intensity::Low));
        }
        // ...but yesterday's Workout was Low, so High is out of reach.
        let engine = PolicyEngine::new();
        let scores = engine.scores(&store, &store, "u1", as_of()).unwrap();
        assert!(scores.readiness > 0.8 && scores.adherence >= 0.6);

        let tier = engine
            .next_best_intensity(&store, &store, "u1", as_of())
            .unwrap();
        assert_eq!(tier, Intensity::Moderate);
    }

    #[test]
    fn test_idempotent_on_unchanged_snapshot() {
        let mut store = MemoryStore::new();
        store.add_sample(sleep_sample(12, 85.0));
        store.add_plan(workout_plan(
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            Intensity::Moderate,
        ));

        let engine = PolicyEngine::new();
        let first = engine
            .next_best_intensity(&store, &store, "u1", as_of())
            .unwrap();
        let second = engine
            .next_best_intensity(&store, &store, "u1", as_of())
            .unwrap();
        assert_eq!(first, second);
    }

    struct UnreachableSource;

    impl PlanHistory for UnreachableSource {
        fn recent_plans(
            &self,
            _user_id: &str,
            _since: NaiveDate,
        ) -> Result<Vec<crate::types::PlanSummary>, EngineError> {
            Err(EngineError::Upstream("plans offline".to_string()))
        }

        fn last_plan(&self, _user_id: &str) -> Result<Option<PlanRecord>, EngineError> {
            Err(EngineError::Upstream("plans offline".to_string()))
        }
    }

    impl MetricHistory for UnreachableSource {
        fn samples(
            &self,
            _user_id: &str,
            _kind: MetricKind,
            _since: DateTime<Utc>,
            _limit: usize,
        ) -> Result<Vec<MetricSample>, EngineError> {
            Err(EngineError::Upstream("metrics offline".to_string()))
        }
    }

    #[test]
    fn test_recommend_substitutes_fallback_on_upstream_failure() {
        let source = UnreachableSource;
        let engine = PolicyEngine::new();
        let rec = engine.recommend(&source, &source, "u1", as_of());

        assert_eq!(rec.intensity, FALLBACK_INTENSITY);
        assert!(rec.is_fallback());
        match &rec.basis {
            RecommendationBasis::Fallback { reason } => {
                assert!(reason.contains("offline"));
            }
            other => panic!("expected fallback basis, got {other:?}"),
        }
    }

    #[test]
    fn test_recommend_carries_scores_on_success() {
        let store = MemoryStore::new();
        let engine = PolicyEngine::new();
        let rec = engine.recommend(&store, &store, "u1", as_of());

        assert!(!rec.is_fallback());
        match &rec.basis {
            RecommendationBasis::Computed { scores } => {
                assert!((scores.adherence - 0.5).abs() < f64::EPSILON);
            }
            other => panic!("expected computed basis, got {other:?}"),
        }
    }
}
