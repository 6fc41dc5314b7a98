//! Intensity classification
//!
//! Pure threshold mapping from (readiness, adherence) to a raw tier. The
//! raw tier is smoothed afterwards by the hysteresis filter; this stage
//! knows nothing about history.

use crate::config::Thresholds;
use crate::types::Intensity;

/// Stateless threshold classifier.
pub struct IntensityClassifier;

impl IntensityClassifier {
    /// Map scores to a raw tier.
    ///
    /// High demands both strong readiness and strong adherence; readiness
    /// alone can only reach Moderate. The conjunction is checked first, so
    /// a ready-but-non-adherent user lands on Moderate, never High.
    pub fn classify(readiness: f64, adherence: f64, thresholds: &Thresholds) -> Intensity {
        if readiness > thresholds.high_readiness && adherence >= thresholds.high_adherence {
            Intensity::High
        } else if readiness >= thresholds.moderate_readiness {
            Intensity::Moderate
        } else {
            Intensity::Low
        }
    }
}
