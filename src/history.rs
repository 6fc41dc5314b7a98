//! Data collaborator contracts
//!
//! The engine reads plan and metric history through these traits; durable
//! storage lives with the caller. [`crate::store::MemoryStore`] provides the
//! in-process implementation used by tests and the CLI.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::EngineError;
use crate::types::{MetricKind, MetricSample, NudgeRecord, PlanRecord, PlanSummary};

/// Read access to a user's daily plan history.
pub trait PlanHistory {
    /// Plan summaries dated on or after `since`, in any order.
    fn recent_plans(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<PlanSummary>, EngineError>;

    /// The user's most recent plan by date, or `None` when no plan exists.
    fn last_plan(&self, user_id: &str) -> Result<Option<PlanRecord>, EngineError>;
}

/// Read access to metric time series.
pub trait MetricHistory {
    /// Samples of `kind` recorded at or after `since`, sorted most recent
    /// first and capped at `limit`.
    fn samples(
        &self,
        user_id: &str,
        kind: MetricKind,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MetricSample>, EngineError>;
}

/// Write access for generated plans.
///
/// Implementations must upsert atomically on the (user_id, date) key; that
/// uniqueness is what keeps concurrent generations from producing two plans
/// for the same day.
pub trait PlanWriter {
    fn upsert_plan(&mut self, plan: PlanRecord) -> Result<(), EngineError>;
}

/// Append-only log of delivered nudges.
pub trait NudgeLog {
    fn append_nudge(&mut self, nudge: NudgeRecord) -> Result<(), EngineError>;
}
