//! Score computation
//!
//! Derives the two normalized scores that drive tier classification:
//! adherence (completion ratio of recent daily plans) and readiness
//! (heart-rate recovery and sleep quality relative to a 14-day personal
//! baseline). Every operation takes an explicit as-of time; the engine never
//! reads the wall clock.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::PolicyConfig;
use crate::error::EngineError;
use crate::history::{MetricHistory, PlanHistory};
use crate::types::{MetricKind, MetricSample, PlanStatus};

/// Adherence when no plan history exists in the window.
pub const NEUTRAL_ADHERENCE: f64 = 0.5;

/// Lower clamp bound for readiness sub-scores.
pub const SCORE_FLOOR: f64 = 0.1;

/// Upper clamp bound for readiness sub-scores.
pub const SCORE_CEIL: f64 = 1.0;

/// Stateless calculator for adherence and readiness.
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Fraction of plans marked Completed within the adherence window.
    ///
    /// An empty window is defined data, not a failure: it yields the neutral
    /// 0.5.
    pub fn adherence(
        plans: &dyn PlanHistory,
        user_id: &str,
        as_of: DateTime<Utc>,
        config: &PolicyConfig,
    ) -> Result<f64, EngineError> {
        let since = as_of.date_naive() - Duration::days(config.adherence_window_days);
        let window = plans.recent_plans(user_id, since)?;
        if window.is_empty() {
            return Ok(NEUTRAL_ADHERENCE);
        }
        let completed = window
            .iter()
            .filter(|p| p.status == PlanStatus::Completed)
            .count();
        Ok(round2(completed as f64 / window.len() as f64))
    }

    /// Weighted composite of heart-rate recovery and sleep quality.
    ///
    /// Each signal is compared against its personal baseline (mean over the
    /// trailing baseline window). A signal with no recent samples scores
    /// neutrally: its recent value is taken to be the baseline itself.
    pub fn readiness(
        metrics: &dyn MetricHistory,
        user_id: &str,
        as_of: DateTime<Utc>,
        config: &PolicyConfig,
    ) -> Result<f64, EngineError> {
        let hr_history = numeric_window(
            metrics,
            user_id,
            MetricKind::Hr,
            as_of,
            config.baseline_window_hours,
            config.sample_limit,
        )?;
        let sleep_history = numeric_window(
            metrics,
            user_id,
            MetricKind::SleepScore,
            as_of,
            config.baseline_window_hours,
            config.sample_limit,
        )?;
        let hr_baseline = mean(&hr_history).unwrap_or(config.hr_fallback_baseline);
        let sleep_baseline = mean(&sleep_history).unwrap_or(config.sleep_fallback_baseline);

        let hr_recent = numeric_window(
            metrics,
            user_id,
            MetricKind::Hr,
            as_of,
            config.hr_recent_hours,
            config.sample_limit,
        )?;
        let mut sleep_recent = numeric_window(
            metrics,
            user_id,
            MetricKind::SleepScore,
            as_of,
            config.sleep_recent_hours,
            config.sample_limit,
        )?;
        sleep_recent.truncate(config.sleep_recent_samples);

        let hr_avg = mean(&hr_recent).unwrap_or(hr_baseline);
        let sleep_avg = mean(&sleep_recent).unwrap_or(sleep_baseline);

        // Lower HR vs baseline is better; higher sleep is better.
        let hr_delta = hr_baseline - hr_avg;
        let hr_score = clamp_score(0.5 + hr_delta / config.hr_span_bpm);
        let sleep_score = clamp_score(sleep_avg / 100.0);

        let readiness = round2(config.hr_weight * hr_score + config.sleep_weight * sleep_score);
        debug!(
            user_id,
            hr_baseline, hr_avg, sleep_baseline, sleep_avg, readiness, "computed readiness"
        );
        Ok(readiness)
    }
}

/// Numeric values of a metric over the trailing window, most recent first.
/// Samples that do not coerce to a number are skipped.
fn numeric_window(
    metrics: &dyn MetricHistory,
    user_id: &str,
    kind: MetricKind,
    as_of: DateTime<Utc>,
    hours: i64,
    limit: usize,
) -> Result<Vec<f64>, EngineError> {
    let since = as_of - Duration::hours(hours);
    let samples = metrics.samples(user_id, kind, since, limit)?;
    Ok(samples.iter().filter_map(MetricSample::numeric).collect())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(SCORE_FLOOR, SCORE_CEIL)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{PlanItem, PlanRecord};
    use chrono::{NaiveDate, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
    }

    fn add_plan(store: &mut MemoryStore, date: NaiveDate, status: PlanStatus) {
        store.add_plan(PlanRecord {
            user_id: "u1".to_string(),
            date,
            status,
            items: Vec::<PlanItem>::new(),
        });
    }

    fn add_metric(
        store: &mut MemoryStore,
        kind: MetricKind,
        hours_ago: i64,
        value: serde_json::Value,
    ) {
        store.add_sample(MetricSample {
            user_id: "u1".to_string(),
            kind,
            recorded_at: as_of() - Duration::hours(hours_ago),
            value,
        });
    }

    #[test]
    fn test_adherence_no_history_is_neutral() {
        let store = MemoryStore::new();
        let score =
            ScoreCalculator::adherence(&store, "u1", as_of(), &PolicyConfig::default()).unwrap();
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_adherence_completion_ratio() {
        let mut store = MemoryStore::new();
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        add_plan(&mut store, day(5), PlanStatus::Completed);
        add_plan(&mut store, day(6), PlanStatus::Completed);
        add_plan(&mut store, day(7), PlanStatus::Completed);
        add_plan(&mut store, day(8), PlanStatus::Proposed);
        add_plan(&mut store, day(9), PlanStatus::Other("Skipped".to_string()));

        let score =
            ScoreCalculator::adherence(&store, "u1", as_of(), &PolicyConfig::default()).unwrap();
        assert!((score - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_adherence_window_excludes_old_plans() {
        let mut store = MemoryStore::new();
        // Eight days before as_of: outside the 7-day window.
        add_plan(
            &mut store,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            PlanStatus::Completed,
        );
        let score =
            ScoreCalculator::adherence(&store, "u1", as_of(), &PolicyConfig::default()).unwrap();
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_readiness_no_data_uses_fallback_baselines() {
        let store = MemoryStore::new();
        let score =
            ScoreCalculator::readiness(&store, "u1", as_of(), &PolicyConfig::default()).unwrap();
        // HR neutral 0.5; sleep fallback baseline 70 scores 0.7.
        // 0.4 * 0.5 + 0.6 * 0.7 = 0.62
        assert!((score - 0.62).abs() < 0.001);
    }

    #[test]
    fn test_readiness_improved_hr_and_strong_sleep() {
        let mut store = MemoryStore::new();
        // Baseline HR around 75 over two weeks; last night at 65.
        for day in 2..14 {
            add_metric(&mut store, MetricKind::Hr, day * 24, serde_json::json!(75));
        }
        add_metric(&mut store, MetricKind::Hr, 6, serde_json::json!(65));
        // Three recent sleep scores averaging 90.
        for (hours_ago, value) in [(30, 88), (54, 90), (78, 92)] {
            add_metric(
                &mut store,
                MetricKind::SleepScore,
                hours_ago,
                serde_json::json!(value),
            );
        }

        let score =
            ScoreCalculator::readiness(&store, "u1", as_of(), &PolicyConfig::default()).unwrap();
        // hr baseline = 965/13 ~ 74.23 (13 samples incl. the recent 65)
        // hr_score = clamp(0.5 + 9.23/20) ~ 0.9615; sleep = 0.9
        // readiness = round2(0.4 * 0.9615 + 0.6 * 0.9) = 0.92
        assert!((score - 0.92).abs() < 0.001);
    }

    #[test]
    fn test_readiness_sleep_truncated_to_three_most_recent() {
        let mut store = MemoryStore::new();
        // Five sleep scores in the past week; only the three most recent
        // (90, 90, 90) should feed the recent average.
        for (hours_ago, value) in [(10, 90), (34, 90), (58, 90), (82, 20), (106, 20)] {
            add_metric(
                &mut store,
                MetricKind::SleepScore,
                hours_ago,
                serde_json::json!(value),
            );
        }

        let config = PolicyConfig::default();
        let score = ScoreCalculator::readiness(&store, "u1", as_of(), &config).unwrap();
        // Sleep baseline = mean(90,90,90,20,20) = 62, recent = 90 -> 0.9.
        // No HR at all: neutral 0.5.
        // round2(0.4 * 0.5 + 0.6 * 0.9) = 0.74
        assert!((score - 0.74).abs() < 0.001);
    }

    #[test]
    fn test_readiness_skips_unparseable_samples() {
        let mut store = MemoryStore::new();
        add_metric(&mut store, MetricKind::SleepScore, 10, serde_json::json!(90));
        add_metric(
            &mut store,
            MetricKind::SleepScore,
            12,
            serde_json::json!("bad-reading"),
        );
        add_metric(&mut store, MetricKind::SleepScore, 14, serde_json::Value::Null);

        let with_junk =
            ScoreCalculator::readiness(&store, "u1", as_of(), &PolicyConfig::default()).unwrap();

        let mut clean = MemoryStore::new();
        clean.add_sample(MetricSample {
            user_id: "u1".to_string(),
            kind: MetricKind::SleepScore,
            recorded_at: as_of() - Duration::hours(10),
            value: serde_json::json!(90),
        });
        let without_junk =
            ScoreCalculator::readiness(&clean, "u1", as_of(), &PolicyConfig::default()).unwrap();

        assert_eq!(with_junk, without_junk);
    }

    #[test]
    fn test_readiness_clamped_and_deterministic() {
        let mut store = MemoryStore::new();
        // Catastrophic night: HR way above baseline, terrible sleep.
        for day in 2..14 {
            add_metric(&mut store, MetricKind::Hr, day * 24, serde_json::json!(60));
        }
        add_metric(&mut store, MetricKind::Hr, 3, serde_json::json!(140));
        add_metric(&mut store, MetricKind::SleepScore, 10, serde_json::json!(2));

        let config = PolicyConfig::default();
        let first = ScoreCalculator::readiness(&store, "u1", as_of(), &config).unwrap();
        let second = ScoreCalculator::readiness(&store, "u1", as_of(), &config).unwrap();

        assert_eq!(first, second);
        assert!(first >= SCORE_FLOOR && first <= SCORE_CEIL);
        // Both sub-scores pinned to the 0.1 floor.
        assert!((first - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.666_666), 0.67);
        assert_eq!(round2(0.5), 0.5);
        assert_eq!(round2(3.0 / 5.0), 0.6);
    }
}
