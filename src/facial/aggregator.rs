use std::time::{Duration, Instant};

use crate::metrics::FacialSnapshot;

use super::sensor::FaceObservation;

#[derive(Debug, Clone, PartialEq)]
pub struct FacialAggregatorConfig {
    /// Minimum time between two counted blinks.
    pub refractory: Duration,
    /// Blink rate starts decaying once no blink was counted for this long.
    pub decay_after: Duration,
    pub decay_step: f64,
    pub max_blink_rate: f64,
}

impl Default for FacialAggregatorConfig {
    fn default() -> Self {
        Self {
            refractory: Duration::from_millis(200),
            decay_after: Duration::from_secs(5),
            decay_step: 0.1,
            max_blink_rate: 20.0,
        }
    }
}

/// Turns per-frame observations into a [`FacialSnapshot`].
pub struct FacialAggregator {
    config: FacialAggregatorConfig,
    started_at: Instant,
    last_blink: Option<Instant>,
    snapshot: FacialSnapshot,
}

impl FacialAggregator {
    pub fn new(config: FacialAggregatorConfig) -> Self {
        Self::starting_at(config, Instant::now())
    }

    pub fn starting_at(config: FacialAggregatorConfig, started_at: Instant) -> Self {
        Self {
            config,
            started_at,
            last_blink: None,
            snapshot: FacialSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &FacialSnapshot {
        &self.snapshot
    }

    pub fn tick(&mut self, observation: &FaceObservation) -> FacialSnapshot {
        self.tick_at(Instant::now(), observation)
    }

    pub fn tick_at(&mut self, now: Instant, observation: &FaceObservation) -> FacialSnapshot {
        // Before the first blink, the refractory and decay windows run from start.
        let reference = self.last_blink.unwrap_or(self.started_at);
        let since_blink = now.saturating_duration_since(reference);
        let max_rate = self.config.max_blink_rate.max(0.0);

        let mut blink_rate = self.snapshot.blink_rate_per_minute;
        if observation.blink && since_blink >= self.config.refractory {
            blink_rate = (blink_rate + 1.0).min(max_rate);
            self.last_blink = Some(now);
        } else if since_blink > self.config.decay_after {
            blink_rate = (blink_rate - self.config.decay_step).max(0.0);
        }

        let eye_openness = if observation.eye_openness.is_finite() {
            observation.eye_openness.clamp(0.0, 1.0)
        } else {
            self.snapshot.eye_openness
        };
        let head_pose_degrees = if observation.head_pose_degrees.is_finite() {
            observation.head_pose_degrees
        } else {
            self.snapshot.head_pose_degrees
        };

        self.snapshot = FacialSnapshot {
            blink_rate_per_minute: blink_rate.clamp(0.0, max_rate),
            eye_openness,
            head_pose_degrees,
            last_blink: self.last_blink,
        };

        self.snapshot.clone()
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.started_at = now;
        self.last_blink = None;
        self.snapshot = FacialSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(blink: bool) -> FaceObservation {
        FaceObservation {
            blink,
            eye_openness: 0.9,
            head_pose_degrees: 2.0,
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn blinks_within_refractory_count_once() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);

        agg.tick_at(start + ms(1000), &frame(true));
        let snapshot = agg.tick_at(start + ms(1100), &frame(true));

        assert_eq!(snapshot.blink_rate_per_minute, 1.0);
        assert_eq!(snapshot.last_blink, Some(start + ms(1000)));
    }

    #[test]
    fn blinks_after_refractory_count_again() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);

        agg.tick_at(start + ms(1000), &frame(true));
        let snapshot = agg.tick_at(start + ms(1200), &frame(true));
        assert_eq!(snapshot.blink_rate_per_minute, 2.0);
    }

    #[test]
    fn no_blink_right_after_start() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);

        let snapshot = agg.tick_at(start + ms(100), &frame(true));
        assert_eq!(snapshot.blink_rate_per_minute, 0.0);
        assert_eq!(snapshot.last_blink, None);
    }

    #[test]
    fn a_held_closure_counts_once_at_ten_hertz() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);

        // Eyes report closed for two consecutive 100 ms frames.
        agg.tick_at(start + ms(2000), &frame(true));
        agg.tick_at(start + ms(2100), &frame(true));
        let snapshot = agg.tick_at(start + ms(2150), &frame(false));
        assert_eq!(snapshot.blink_rate_per_minute, 1.0);
    }

    #[test]
    fn rate_is_capped() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);

        let mut snapshot = agg.snapshot().clone();
        for i in 1..=40u64 {
            snapshot = agg.tick_at(start + ms(300 * i), &frame(true));
        }
        assert_eq!(snapshot.blink_rate_per_minute, 20.0);
    }

    #[test]
    fn rate_decays_after_quiet_period() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);

        agg.tick_at(start + ms(1000), &frame(true));
        agg.tick_at(start + ms(1300), &frame(true));

        // Still inside the decay window.
        let snapshot = agg.tick_at(start + ms(6300), &frame(false));
        assert_eq!(snapshot.blink_rate_per_minute, 2.0);

        let snapshot = agg.tick_at(start + ms(6400), &frame(false));
        assert!((snapshot.blink_rate_per_minute - 1.9).abs() < 1e-9);

        let mut rate = snapshot.blink_rate_per_minute;
        for i in 0..100u64 {
            rate = agg
                .tick_at(start + ms(6500 + 100 * i), &frame(false))
                .blink_rate_per_minute;
        }
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn blink_never_lowers_the_rate() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);

        agg.tick_at(start + ms(1000), &frame(true));
        // Long after the decay window, a blink increments instead of decaying.
        let snapshot = agg.tick_at(start + ms(20_000), &frame(true));
        assert_eq!(snapshot.blink_rate_per_minute, 2.0);
    }

    #[test]
    fn observation_values_are_sanitised() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);

        let snapshot = agg.tick_at(
            start + ms(100),
            &FaceObservation {
                blink: false,
                eye_openness: 1.4,
                head_pose_degrees: -31.0,
            },
        );
        assert_eq!(snapshot.eye_openness, 1.0);
        assert_eq!(snapshot.head_pose_degrees, -31.0);

        let snapshot = agg.tick_at(
            start + ms(200),
            &FaceObservation {
                blink: false,
                eye_openness: f64::NAN,
                head_pose_degrees: f64::INFINITY,
            },
        );
        assert_eq!(snapshot.eye_openness, 1.0);
        assert_eq!(snapshot.head_pose_degrees, -31.0);
    }

    #[test]
    fn reset_clears_rate() {
        let start = Instant::now();
        let mut agg = FacialAggregator::starting_at(FacialAggregatorConfig::default(), start);
        agg.tick_at(start + ms(1000), &frame(true));

        agg.reset_at(start + ms(2000));
        assert_eq!(agg.snapshot(), &FacialSnapshot::default());
        let snapshot = agg.tick_at(start + ms(2100), &frame(true));
        assert_eq!(snapshot.blink_rate_per_minute, 0.0);
    }
}
