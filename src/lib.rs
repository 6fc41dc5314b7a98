//! Paceline - decision engine for adaptive daily activity recommendations
//!
//! Paceline turns a user's recent behavioral and physiological history into
//! a daily workout intensity recommendation through a deterministic
//! pipeline: score computation → threshold classification → hysteresis
//! smoothing.
//!
//! ## Modules
//!
//! - **Scores**: adherence (plan completion ratio) and readiness (HR
//!   recovery + sleep quality vs a 14-day personal baseline)
//! - **Classifier**: fixed-threshold mapping from scores to a raw tier
//! - **Hysteresis**: bounds tier movement to one step per evaluation
//! - **Policy**: composition root exposing `next_best_intensity` and the
//!   fallback-aware `recommend`
//! - **Plan / Nudge**: templated daily plans and step nudges built on top of
//!   the recommendation

pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod hysteresis;
pub mod nudge;
pub mod plan;
pub mod policy;
pub mod scores;
pub mod store;
pub mod types;

pub use classifier::IntensityClassifier;
pub use config::{PolicyConfig, Thresholds};
pub use error::EngineError;
pub use history::{MetricHistory, NudgeLog, PlanHistory, PlanWriter};
pub use hysteresis::HysteresisFilter;
pub use policy::{PolicyEngine, FALLBACK_INTENSITY};
pub use scores::ScoreCalculator;
pub use store::MemoryStore;
pub use types::{
    Intensity, MetricKind, MetricSample, NudgeRecord, PlanItem, PlanItemKind, PlanRecord,
    PlanStatus, PlanSummary, Recommendation, RecommendationBasis, ScoreSet,
};

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports and diagnostics
pub const ENGINE_NAME: &str = "paceline";
