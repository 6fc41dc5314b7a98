//! In-memory data store
//!
//! Backs all four collaborator traits with plain vectors, with JSON
//! round-trip for snapshot files and test fixtures. Durable storage is out
//! of scope; this is the reference implementation of the contracts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::history::{MetricHistory, NudgeLog, PlanHistory, PlanWriter};
use crate::types::{MetricKind, MetricSample, NudgeRecord, PlanRecord, PlanSummary};

/// Vector-backed store for metric samples, plans, and nudges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    samples: Vec<MetricSample>,
    #[serde(default)]
    plans: Vec<PlanRecord>,
    #[serde(default)]
    nudges: Vec<NudgeRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }

    /// Insert a plan, replacing any existing plan for the same (user, date).
    pub fn add_plan(&mut self, plan: PlanRecord) {
        match self
            .plans
            .iter_mut()
            .find(|p| p.user_id == plan.user_id && p.date == plan.date)
        {
            Some(existing) => *existing = plan,
            None => self.plans.push(plan),
        }
    }

    pub fn metric_samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn plans(&self) -> &[PlanRecord] {
        &self.plans
    }

    pub fn nudges(&self) -> &[NudgeRecord] {
        &self.nudges
    }

    /// Load a store from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the store to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl PlanHistory for MemoryStore {
    fn recent_plans(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<PlanSummary>, EngineError> {
        Ok(self
            .plans
            .iter()
            .filter(|p| p.user_id == user_id && p.date >= since)
            .map(|p| PlanSummary {
                date: p.date,
                status: p.status.clone(),
            })
            .collect())
    }

    fn last_plan(&self, user_id: &str) -> Result<Option<PlanRecord>, EngineError> {
        Ok(self
            .plans
            .iter()
            .filter(|p| p.user_id == user_id)
            .max_by_key(|p| p.date)
            .cloned())
    }
}

impl MetricHistory for MemoryStore {
    fn samples(
        &self,
        user_id: &str,
        kind: MetricKind,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MetricSample>, EngineError> {
        let mut matching: Vec<MetricSample> = self
            .samples
            .iter()
            .filter(|s| s.user_id == user_id && s.kind == kind && s.recorded_at >= since)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        matching.truncate(limit);
        Ok(matching)
    }
}

impl PlanWriter for MemoryStore {
    fn upsert_plan(&mut self, plan: PlanRecord) -> Result<(), EngineError> {
        self.add_plan(plan);
        Ok(())
    }
}

impl NudgeLog for MemoryStore {
    fn append_nudge(&mut self, nudge: NudgeRecord) -> Result<(), EngineError> {
        self.nudges.push(nudge);
        Ok(())
    }
}
