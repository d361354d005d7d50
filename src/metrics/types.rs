use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Typing performance summary, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingSnapshot {
    pub words_per_minute: f64,
    pub accuracy_percent: f64,
    /// Always `100 - accuracy_percent`; kept as its own field for consumers.
    pub error_rate_percent: f64,
    /// Mean of the inter-keystroke gaps longer than the pause threshold.
    pub avg_pause_millis: f64,
    pub total_keystrokes: u64,
    pub elapsed_seconds: f64,
}

impl Default for TypingSnapshot {
    fn default() -> Self {
        Self {
            words_per_minute: 0.0,
            accuracy_percent: 100.0,
            error_rate_percent: 0.0,
            avg_pause_millis: 0.0,
            total_keystrokes: 0,
            elapsed_seconds: 0.0,
        }
    }
}

/// Ocular and head-pose summary produced by each facial sampling tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacialSnapshot {
    pub blink_rate_per_minute: f64,
    /// 1.0 is fully open.
    pub eye_openness: f64,
    /// Signed deviation from a neutral pose; only the magnitude is scored.
    pub head_pose_degrees: f64,
    /// `None` until the first counted blink.
    #[serde(skip)]
    pub last_blink: Option<Instant>,
}

impl Default for FacialSnapshot {
    fn default() -> Self {
        Self {
            blink_rate_per_minute: 0.0,
            eye_openness: 1.0,
            head_pose_degrees: 0.0,
            last_blink: None,
        }
    }
}

impl FacialSnapshot {
    pub fn new(blink_rate_per_minute: f64, eye_openness: f64, head_pose_degrees: f64) -> Self {
        Self {
            blink_rate_per_minute,
            eye_openness,
            head_pose_degrees,
            last_blink: None,
        }
    }
}
