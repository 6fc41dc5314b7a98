//! Engine configuration
//!
//! Windows, weights, fallback baselines, and classification thresholds for
//! score computation. Defaults match the reference coaching policy.

use serde::{Deserialize, Serialize};

/// Default adherence lookback in days
pub const DEFAULT_ADHERENCE_WINDOW_DAYS: i64 = 7;

/// Default personal-baseline window in hours (14 days)
pub const DEFAULT_BASELINE_WINDOW_HOURS: i64 = 24 * 14;

/// Default cap on samples fetched per metric query
pub const DEFAULT_SAMPLE_LIMIT: usize = 500;

/// Tuning parameters for a policy evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Days of plan history scored for adherence
    pub adherence_window_days: i64,
    /// Hours of metric history used for personal baselines
    pub baseline_window_hours: i64,
    /// Hours of heart-rate history treated as recent
    pub hr_recent_hours: i64,
    /// Hours of sleep history searched for recent scores
    pub sleep_recent_hours: i64,
    /// Number of most recent sleep scores averaged
    pub sleep_recent_samples: usize,
    /// Resting heart-rate baseline (bpm) assumed when no history exists
    pub hr_fallback_baseline: f64,
    /// Sleep-score baseline assumed when no history exists
    pub sleep_fallback_baseline: f64,
    /// Heart-rate delta (bpm) that saturates the HR sub-score
    pub hr_span_bpm: f64,
    /// Weight of the HR sub-score in combined readiness
    pub hr_weight: f64,
    /// Weight of the sleep sub-score in combined readiness
    pub sleep_weight: f64,
    /// Max samples fetched per metric query
    pub sample_limit: usize,
    /// Tier classification thresholds
    pub thresholds: Thresholds,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            adherence_window_days: DEFAULT_ADHERENCE_WINDOW_DAYS,
            baseline_window_hours: DEFAULT_BASELINE_WINDOW_HOURS,
            hr_recent_hours: 24,
            sleep_recent_hours: 24 * 7,
            sleep_recent_samples: 3,
            hr_fallback_baseline: 75.0,
            sleep_fallback_baseline: 70.0,
            hr_span_bpm: 20.0,
            hr_weight: 0.4,
            sleep_weight: 0.6,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            thresholds: Thresholds::default(),
        }
    }
}

/// Score thresholds for tier classification.
///
/// High requires both conditions; readiness alone can only reach Moderate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Readiness floor (exclusive) for High
    pub high_readiness: f64,
    /// Adherence floor (inclusive) for High
    pub high_adherence: f64,
    /// Readiness floor (inclusive) for Moderate
    pub moderate_readiness: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_readiness: 0.8,
            high_adherence: 0.6,
            moderate_readiness: 0.6,
        }
    }
}
