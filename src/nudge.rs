//! Activity nudges
//!
//! Short motivational messages keyed to recent step volume. Message text is
//! selected by fixed thresholds over the average of the user's most recent
//! step samples; each delivered nudge is appended to the log with a fresh
//! id.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::EngineError;
use crate::history::{MetricHistory, NudgeLog};
use crate::types::{MetricKind, MetricSample, NudgeRecord};

/// How many recent step samples feed the average.
pub const NUDGE_SAMPLE_LIMIT: usize = 6;

/// How far back step samples are considered.
pub const STEP_LOOKBACK_HOURS: i64 = 24 * 7;

/// Below this average the user gets the quick-win message.
const QUICK_WIN_STEP_AVG: f64 = 300.0;

/// Below this average the user gets the keep-building message.
const BUILDING_STEP_AVG: f64 = 2000.0;

const CONTEXT: &str = "nudge";

/// Compose, log, and return a step nudge for `user_id` at `as_of`.
///
/// No step history is defined data: the average is zero and the quick-win
/// message applies. Non-numeric samples are skipped.
pub fn generate_nudge<S>(
    store: &mut S,
    user_id: &str,
    as_of: DateTime<Utc>,
) -> Result<NudgeRecord, EngineError>
where
    S: MetricHistory + NudgeLog,
{
    let since = as_of - Duration::hours(STEP_LOOKBACK_HOURS);
    let samples = store.samples(user_id, MetricKind::Steps, since, NUDGE_SAMPLE_LIMIT)?;
    let steps: Vec<f64> = samples.iter().filter_map(MetricSample::numeric).collect();
    let average = if steps.is_empty() {
        0.0
    } else {
        steps.iter().sum::<f64>() / steps.len() as f64
    };

    let record = NudgeRecord {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        message: message_for(average).to_string(),
        context: CONTEXT.to_string(),
        created_at: as_of,
    };
    store.append_nudge(record.clone())?;
    Ok(record)
}

fn message_for(average_steps: f64) -> &'static str {
    if average_steps < QUICK_WIN_STEP_AVG {
        "Quick win: 10-minute brisk walk to boost your step count."
    } else if average_steps < BUILDING_STEP_AVG {
        "Great start! Add another short walk to hit your daily goal."
    } else {
        "Nice pace! Add a 5-minute stretch break to stay loose."
    }
}
