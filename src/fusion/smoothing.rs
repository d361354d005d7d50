//! Opt-in exponential smoothing of the overall score.
//!
//! The base engine flips level on every recomputation. Wrapping it in a
//! [`ScoreSmoother`] trades that responsiveness for resistance to single
//! noisy ticks; sub-scores are reported unsmoothed.

use crate::fusion::engine::{FatigueAssessment, FatigueEngine};
use crate::metrics::{FacialSnapshot, TypingSnapshot};

#[derive(Debug, Clone)]
pub struct ScoreSmoother {
    engine: FatigueEngine,
    alpha: f64,
    last_overall: Option<f64>,
}

impl ScoreSmoother {
    /// `alpha` is clamped to `(0, 1]`; 1.0 behaves like the bare engine.
    pub fn new(engine: FatigueEngine, alpha: f64) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(f64::EPSILON, 1.0)
        } else {
            1.0
        };

        Self {
            engine,
            alpha,
            last_overall: None,
        }
    }

    pub fn assess(
        &mut self,
        facial: Option<&FacialSnapshot>,
        typing: Option<&TypingSnapshot>,
    ) -> FatigueAssessment {
        let (facial_score, typing_score, overall) = self.engine.scores(facial, typing);

        // First sample seeds the average instead of pulling it up from 0.
        let smoothed = match self.last_overall {
            Some(previous) => self.alpha * overall + (1.0 - self.alpha) * previous,
            None => overall,
        };
        self.last_overall = Some(smoothed);

        self.engine
            .build_assessment(facial_score, typing_score, smoothed)
    }

    pub fn reset(&mut self) {
        self.last_overall = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::engine::FatigueLevel;

    #[test]
    fn single_spike_does_not_flip_level() {
        let mut smoother = ScoreSmoother::new(FatigueEngine::default(), 0.2);
        let tired = FacialSnapshot::new(22.0, 0.5, 25.0);

        assert_eq!(smoother.assess(None, None).level, FatigueLevel::Focused);
        let spiked = smoother.assess(Some(&tired), None);
        // 0.2 * 50 + 0.8 * 0
        assert_eq!(spiked.overall_score, 10.0);
        assert_eq!(spiked.facial_score, 100.0);
        assert_eq!(spiked.level, FatigueLevel::Focused);
    }

    #[test]
    fn alpha_one_matches_bare_engine() {
        let engine = FatigueEngine::default();
        let mut smoother = ScoreSmoother::new(engine.clone(), 1.0);
        let tired = FacialSnapshot::new(22.0, 0.5, 25.0);

        smoother.assess(None, None);
        assert_eq!(smoother.assess(Some(&tired), None), engine.assess(Some(&tired), None));
    }

    #[test]
    fn reset_reseeds_from_next_sample() {
        let mut smoother = ScoreSmoother::new(FatigueEngine::default(), 0.1);
        let tired = FacialSnapshot::new(22.0, 0.5, 25.0);

        smoother.assess(None, None);
        smoother.reset();
        assert_eq!(smoother.assess(Some(&tired), None).overall_score, 50.0);
    }
}
