/// Which side of a limit counts as tired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Tired when the value is strictly greater than the limit.
    Above,
    /// Tired when the value is strictly less than the limit.
    Below,
}

/// A two-tier scoring rule: the severe tier is checked first, the mild tier
/// only applies when the severe one does not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TieredRule {
    pub direction: Direction,
    pub severe_limit: f64,
    pub severe_points: f64,
    pub mild_limit: f64,
    pub mild_points: f64,
}

impl TieredRule {
    pub const fn above(severe_limit: f64, severe_points: f64, mild_limit: f64, mild_points: f64) -> Self {
        Self {
            direction: Direction::Above,
            severe_limit,
            severe_points,
            mild_limit,
            mild_points,
        }
    }

    pub const fn below(severe_limit: f64, severe_points: f64, mild_limit: f64, mild_points: f64) -> Self {
        Self {
            direction: Direction::Below,
            severe_limit,
            severe_points,
            mild_limit,
            mild_points,
        }
    }

    /// Points contributed by `value`. NaN never crosses a limit.
    pub fn points(&self, value: f64) -> f64 {
        let crosses = |limit: f64| match self.direction {
            Direction::Above => value > limit,
            Direction::Below => value < limit,
        };

        if crosses(self.severe_limit) {
            self.severe_points
        } else if crosses(self.mild_limit) {
            self.mild_points
        } else {
            0.0
        }
    }
}

/// Thresholds and point values for the fusion engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionConfig {
    pub blink_rate: TieredRule,
    pub eye_openness: TieredRule,
    /// Applied to the absolute head pose.
    pub head_pose: TieredRule,

    pub typing_speed: TieredRule,
    /// Speed is only scored once more than this many keystrokes were seen.
    pub min_keystrokes_for_speed: u64,
    pub error_rate: TieredRule,
    pub avg_pause: TieredRule,
    pub accuracy: TieredRule,

    /// Overall scores at or above this are at least slightly tired.
    pub slightly_tired_at: f64,
    /// Overall scores at or above this are very tired.
    pub very_tired_at: f64,

    pub confidence_floor: f64,
    /// Overall score at which confidence peaks at 100.
    pub confidence_peak: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            blink_rate: TieredRule::above(20.0, 30.0, 15.0, 15.0),
            eye_openness: TieredRule::below(0.6, 40.0, 0.8, 20.0),
            head_pose: TieredRule::above(20.0, 30.0, 10.0, 15.0),

            typing_speed: TieredRule::below(20.0, 25.0, 30.0, 15.0),
            min_keystrokes_for_speed: 20,
            error_rate: TieredRule::above(10.0, 30.0, 5.0, 15.0),
            avg_pause: TieredRule::above(3000.0, 25.0, 2000.0, 15.0),
            accuracy: TieredRule::below(80.0, 20.0, 90.0, 10.0),

            slightly_tired_at: 30.0,
            very_tired_at: 60.0,

            confidence_floor: 60.0,
            confidence_peak: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_rule_boundaries_are_exclusive() {
        let rule = TieredRule::above(20.0, 30.0, 10.0, 15.0);
        assert_eq!(rule.points(10.0), 0.0);
        assert_eq!(rule.points(10.5), 15.0);
        assert_eq!(rule.points(20.0), 15.0);
        assert_eq!(rule.points(20.01), 30.0);
    }

    #[test]
    fn below_rule_boundaries_are_exclusive() {
        let rule = TieredRule::below(0.6, 40.0, 0.8, 20.0);
        assert_eq!(rule.points(0.8), 0.0);
        assert_eq!(rule.points(0.79), 20.0);
        assert_eq!(rule.points(0.6), 20.0);
        assert_eq!(rule.points(0.59), 40.0);
    }

    #[test]
    fn nan_scores_nothing() {
        let config = FusionConfig::default();
        assert_eq!(config.blink_rate.points(f64::NAN), 0.0);
        assert_eq!(config.accuracy.points(f64::NAN), 0.0);
    }
}
