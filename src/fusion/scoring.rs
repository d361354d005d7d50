use crate::fusion::config::FusionConfig;
use crate::metrics::{FacialSnapshot, TypingSnapshot};

/// Highest tiredness score a single stream can report.
pub const MAX_SCORE: f64 = 100.0;

/// Facial tiredness from blink rate, eye openness and head pose.
/// An absent snapshot is no evidence of tiredness and scores 0.
pub fn score_facial(facial: Option<&FacialSnapshot>, config: &FusionConfig) -> f64 {
    let Some(facial) = facial else {
        return 0.0;
    };

    let score = config.blink_rate.points(facial.blink_rate_per_minute)
        + config.eye_openness.points(facial.eye_openness)
        + config.head_pose.points(facial.head_pose_degrees.abs());

    score.min(MAX_SCORE)
}

/// Typing tiredness from speed, error rate, pauses and accuracy.
/// An absent snapshot scores 0.
pub fn score_typing(typing: Option<&TypingSnapshot>, config: &FusionConfig) -> f64 {
    let Some(typing) = typing else {
        return 0.0;
    };

    // Slow typing over a handful of keystrokes says nothing yet.
    let speed = if typing.total_keystrokes > config.min_keystrokes_for_speed {
        config.typing_speed.points(typing.words_per_minute)
    } else {
        0.0
    };

    let score = speed
        + config.error_rate.points(typing.error_rate_percent)
        + config.avg_pause.points(typing.avg_pause_millis)
        + config.accuracy.points(typing.accuracy_percent);

    score.min(MAX_SCORE)
}

/// Displayed wellness factor: the complement of a tiredness score.
pub fn wellness(score: f64) -> f64 {
    (MAX_SCORE - score).max(0.0)
}
