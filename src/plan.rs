//! Daily plan generation
//!
//! Maps the recommended tier to a templated daily plan and upserts it keyed
//! on (user, date). Template content is caller configuration; the default
//! catalog carries the reference templates.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::EngineError;
use crate::history::{MetricHistory, PlanHistory, PlanWriter};
use crate::policy::PolicyEngine;
use crate::types::{Intensity, PlanItem, PlanItemKind, PlanRecord, PlanStatus};

/// Per-tier plan templates.
///
/// Construction rejects any template holding more than one Workout item, so
/// every generated plan carries an unambiguous previous-intensity marker for
/// the next evaluation.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    low: Vec<PlanItem>,
    moderate: Vec<PlanItem>,
    high: Vec<PlanItem>,
}

impl PlanCatalog {
    pub fn new(
        low: Vec<PlanItem>,
        moderate: Vec<PlanItem>,
        high: Vec<PlanItem>,
    ) -> Result<Self, EngineError> {
        for (tier, items) in [
            (Intensity::Low, &low),
            (Intensity::Moderate, &moderate),
            (Intensity::High, &high),
        ] {
            let workouts = items
                .iter()
                .filter(|item| item.kind == PlanItemKind::Workout)
                .count();
            if workouts > 1 {
                return Err(EngineError::InvalidTemplate(format!(
                    "{tier} template has {workouts} Workout items, at most one is allowed"
                )));
            }
        }
        Ok(Self {
            low,
            moderate,
            high,
        })
    }

    pub fn items_for(&self, intensity: Intensity) -> &[PlanItem] {
        match intensity {
            Intensity::Low => &self.low,
            Intensity::Moderate => &self.moderate,
            Intensity::High => &self.high,
        }
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        let item = |kind, intensity, duration_minutes, description: &str| PlanItem {
            kind,
            intensity,
            duration_minutes,
            description: description.to_string(),
        };
        // Known-good templates: one Workout each, so no validation needed.
        Self {
            low: vec![
                item(
                    PlanItemKind::Workout,
                    Intensity::Low,
                    20,
                    "Light mobility + walk",
                ),
                item(PlanItemKind::Habit, Intensity::Low, 5, "Hydrate: +1L"),
                item(
                    PlanItemKind::Recovery,
                    Intensity::Low,
                    10,
                    "Stretch + sleep target 8h",
                ),
            ],
            moderate: vec![
                item(
                    PlanItemKind::Workout,
                    Intensity::Moderate,
                    35,
                    "Bodyweight circuit + brisk walk",
                ),
                item(
                    PlanItemKind::Habit,
                    Intensity::Low,
                    5,
                    "2L water + protein target",
                ),
                item(
                    PlanItemKind::Recovery,
                    Intensity::Low,
                    10,
                    "Cooldown + mindfulness 5m",
                ),
            ],
            high: vec![
                item(
                    PlanItemKind::Workout,
                    Intensity::High,
                    45,
                    "Intervals + strength",
                ),
                item(
                    PlanItemKind::Habit,
                    Intensity::Low,
                    5,
                    "Macros check + 2.5L water",
                ),
                item(
                    PlanItemKind::Recovery,
                    Intensity::Low,
                    15,
                    "Mobility + sleep hygiene",
                ),
            ],
        }
    }
}

/// Build a Proposed plan for the given day from the tier's template.
pub fn build_plan(
    catalog: &PlanCatalog,
    user_id: &str,
    date: NaiveDate,
    intensity: Intensity,
) -> PlanRecord {
    PlanRecord {
        user_id: user_id.to_string(),
        date,
        status: PlanStatus::Proposed,
        items: catalog.items_for(intensity).to_vec(),
    }
}

/// Evaluate the user, build the day's plan, and upsert it.
///
/// Evaluation goes through [`PolicyEngine::recommend`], so an unreachable
/// data source still yields a (neutral) plan; only the upsert itself can
/// fail.
pub fn generate_plan<S>(
    engine: &PolicyEngine,
    store: &mut S,
    catalog: &PlanCatalog,
    user_id: &str,
    as_of: DateTime<Utc>,
) -> Result<PlanRecord, EngineError>
where
    S: PlanHistory + MetricHistory + PlanWriter,
{
    let recommendation = engine.recommend(&*store, &*store, user_id, as_of);
    let plan = build_plan(catalog, user_id, as_of.date_naive(), recommendation.intensity);
    store.upsert_plan(plan.clone())?;
    Ok(plan)
}
