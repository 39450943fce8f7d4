//! One-shot visibility state for scroll-revealed sections.
//!
//! The browser side feeds intersection samples in; this module only folds
//! them into a flag that flips to visible once and stays there.

/// Smallest threshold accepted; anything at or below zero is lifted to this.
const MIN_THRESHOLD: f64 = f64::EPSILON;

/// Slack for ratios reported just under the threshold the observer fired on.
const RATIO_TOLERANCE: f64 = 1e-3;

/// A single observation of how much of a section is inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionSample {
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionSample {
    pub fn new(ratio: f64, is_intersecting: bool) -> Self {
        Self {
            ratio,
            is_intersecting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealTransition {
    Unchanged,
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealState {
    threshold: f64,
    visible: bool,
}

impl RevealState {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: normalize_threshold(threshold),
            visible: false,
        }
    }

    /// State for a section that cannot be observed: shown immediately rather
    /// than left hidden forever.
    pub fn always_visible(threshold: f64) -> Self {
        Self {
            threshold: normalize_threshold(threshold),
            visible: true,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn observe(&mut self, sample: IntersectionSample) -> RevealTransition {
        if self.visible {
            return RevealTransition::Unchanged;
        }
        if sample.is_intersecting && sample.ratio + RATIO_TOLERANCE >= self.threshold {
            self.visible = true;
            RevealTransition::Revealed
        } else {
            RevealTransition::Unchanged
        }
    }
}

fn normalize_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() || threshold <= 0.0 {
        MIN_THRESHOLD
    } else {
        threshold.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_once_when_ratio_reaches_threshold() {
        for threshold in [0.05, 0.1, 0.15, 0.2, 0.5, 1.0] {
            let mut state = RevealState::new(threshold);
            assert!(!state.is_visible());

            let below = IntersectionSample::new(threshold * 0.5, true);
            assert_eq!(state.observe(below), RevealTransition::Unchanged);
            assert!(!state.is_visible());

            let at = IntersectionSample::new(threshold, true);
            assert_eq!(state.observe(at), RevealTransition::Revealed);
            assert!(state.is_visible());

            // Scrolling away afterwards never hides it again.
            for ratio in [0.0, threshold, 1.0, 0.0] {
                let sample = IntersectionSample::new(ratio, ratio > 0.0);
                assert_eq!(state.observe(sample), RevealTransition::Unchanged);
                assert!(state.is_visible());
            }
        }
    }

    #[test]
    fn crossing_reported_just_under_threshold_reveals() {
        let mut state = RevealState::new(0.1);
        assert_eq!(
            state.observe(IntersectionSample::new(0.0999, true)),
            RevealTransition::Revealed
        );

        let mut state = RevealState::new(0.1);
        state.observe(IntersectionSample::new(0.09, true));
        assert!(!state.is_visible());
    }

    #[test]
    fn non_intersecting_samples_do_not_reveal() {
        let mut state = RevealState::new(0.1);
        state.observe(IntersectionSample::new(0.4, false));
        assert!(!state.is_visible());
    }

    #[test]
    fn thresholds_are_clamped_into_unit_interval() {
        assert_eq!(RevealState::new(0.0).threshold(), MIN_THRESHOLD);
        assert_eq!(RevealState::new(-3.0).threshold(), MIN_THRESHOLD);
        assert_eq!(RevealState::new(f64::NAN).threshold(), MIN_THRESHOLD);
        assert_eq!(RevealState::new(4.0).threshold(), 1.0);
    }

    #[test]
    fn fallback_state_starts_visible() {
        let mut state = RevealState::always_visible(0.2);
        assert!(state.is_visible());
        assert_eq!(
            state.observe(IntersectionSample::new(1.0, true)),
            RevealTransition::Unchanged
        );
    }
}
