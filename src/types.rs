//! Core types for the Paceline decision engine
//!
//! This module defines the data structures that flow through an evaluation:
//! metric samples, daily plan records, computed scores, and the
//! recommendation output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Recommended workout intensity tier.
///
/// The ordinal ordering is load-bearing: the hysteresis filter measures tier
/// distance on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

impl Intensity {
    /// Position on the Low < Moderate < High scale.
    pub fn ordinal(self) -> i8 {
        match self {
            Intensity::Low => 0,
            Intensity::Moderate => 1,
            Intensity::High => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "Low",
            Intensity::Moderate => "Moderate",
            Intensity::High => "High",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric stream identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "HR")]
    Hr,
    SleepScore,
    Steps,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Hr => "HR",
            MetricKind::SleepScore => "SleepScore",
            MetricKind::Steps => "Steps",
        }
    }
}

/// A single time-series sample from a sensor or ingestion feed.
///
/// The value is kept as raw JSON: upstream feeds deliver numbers, numeric
/// strings, and occasional junk. Coercion happens at read time via
/// [`MetricSample::numeric`]; values that do not coerce are skipped, never
/// fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub user_id: String,
    pub kind: MetricKind,
    pub recorded_at: DateTime<Utc>,
    pub value: serde_json::Value,
}

impl MetricSample {
    /// The sample value as a float, if it is numerically coercible.
    pub fn numeric(&self) -> Option<f64> {
        match &self.value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Lifecycle status of a daily plan.
///
/// Proposed and Completed drive adherence scoring; anything else a storage
/// backend holds is preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatus {
    Proposed,
    Completed,
    Other(String),
}

impl PlanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PlanStatus::Proposed => "Proposed",
            PlanStatus::Completed => "Completed",
            PlanStatus::Other(s) => s,
        }
    }
}

impl Serialize for PlanStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlanStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "Proposed" => PlanStatus::Proposed,
            "Completed" => PlanStatus::Completed,
            _ => PlanStatus::Other(s),
        })
    }
}

/// Category of a plan item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanItemKind {
    Workout,
    Habit,
    Recovery,
    Other(String),
}

impl PlanItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            PlanItemKind::Workout => "Workout",
            PlanItemKind::Habit => "Habit",
            PlanItemKind::Recovery => "Recovery",
            PlanItemKind::Other(s) => s,
        }
    }
}

impl Serialize for PlanItemKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlanItemKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "Workout" => PlanItemKind::Workout,
            "Habit" => PlanItemKind::Habit,
            "Recovery" => PlanItemKind::Recovery,
            _ => PlanItemKind::Other(s),
        })
    }
}

/// One entry of a daily plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    #[serde(rename = "type")]
    pub kind: PlanItemKind,
    pub intensity: Intensity,
    pub duration_minutes: u32,
    pub description: String,
}

/// A user's plan for one calendar day.
///
/// (user_id, date) is the natural key; writers upsert on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub status: PlanStatus,
    pub items: Vec<PlanItem>,
}

impl PlanRecord {
    /// Intensity of the Workout item, if the plan has one.
    ///
    /// Plans are built with at most one Workout item; should stored data
    /// violate that, the first match wins.
    pub fn workout_intensity(&self) -> Option<Intensity> {
        self.items
            .iter()
            .find(|item| item.kind == PlanItemKind::Workout)
            .map(|item| item.intensity)
    }
}

/// Status and date of a plan, as read for adherence scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub date: NaiveDate,
    pub status: PlanStatus,
}

/// The two normalized scores computed per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    /// Weighted composite of heart-rate recovery and sleep quality (0.1-1.0)
    pub readiness: f64,
    /// Fraction of recent daily plans marked Completed (0-1)
    pub adherence: f64,
}

/// Why a recommendation carries the tier it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationBasis {
    /// The tier was computed from history.
    Computed { scores: ScoreSet },
    /// Evaluation failed and the neutral default tier was substituted.
    Fallback { reason: String },
}

/// Final output of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_id: String,
    pub as_of: DateTime<Utc>,
    pub intensity: Intensity,
    pub basis: RecommendationBasis,
}

impl Recommendation {
    /// Whether the tier was substituted rather than computed.
    pub fn is_fallback(&self) -> bool {
        matches!(self.basis, RecommendationBasis::Fallback { .. })
    }
}

/// A delivered nudge message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NudgeRecord {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub context: String,
    pub created_at: DateTime<Utc>,
}
