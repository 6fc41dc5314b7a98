//! Recommendation smoothing
//!
//! Bounds tier movement against the previous recommendation so a single
//! evaluation never jumps two steps. Deterministic: same inputs, same
//! output; the only state it consults is the tier handed to it.

use crate::types::Intensity;

/// One-step hysteresis over the tier ordinal.
pub struct HysteresisFilter;

impl HysteresisFilter {
    /// Clamp `raw` against the previously recommended tier.
    ///
    /// A two-step jump in either direction settles on Moderate; one-step
    /// moves and same-tier repeats pass through. With no prior tier the raw
    /// value stands.
    pub fn apply(last: Option<Intensity>, raw: Intensity) -> Intensity {
        let Some(last) = last else {
            return raw;
        };
        if (raw.ordinal() - last.ordinal()).abs() > 1 {
            Intensity::Moderate
        } else {
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Intensity::{High, Low, Moderate};

    #[test]
    fn test_two_step_jumps_clamp_to_moderate() {
        assert_eq!(HysteresisFilter::apply(Some(Low), High), Moderate);
        assert_eq!(HysteresisFilter::apply(Some(High), Low), Moderate);
    }

    #[test]
    fn test_single_steps_pass_through() {
        assert_eq!(HysteresisFilter::apply(Some(Low), Moderate), Moderate);
        assert_eq!(HysteresisFilter::apply(Some(Moderate), High), High);
        assert_eq!(HysteresisFilter::apply(Some(Moderate), Low), Low);
        assert_eq!(HysteresisFilter::apply(Some(High), Moderate), Moderate);
    }

    #[test]
    fn test_same_tier_passes_through() {
        assert_eq!(HysteresisFilter::apply(Some(Low), Low), Low);
        assert_eq!(HysteresisFilter::apply(Some(High), High), High);
    }

    #[test]
    fn test_no_prior_tier_passes_raw() {
        assert_eq!(HysteresisFilter::apply(None, High), High);
        assert_eq!(HysteresisFilter::apply(None, Low), Low);
    }
}
