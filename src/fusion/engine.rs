use serde::{Deserialize, Serialize};

use crate::fusion::config::FusionConfig;
use crate::fusion::scoring::{score_facial, score_typing, wellness};
use crate::metrics::{FacialSnapshot, TypingSnapshot};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FatigueLevel {
    #[default]
    Focused,
    SlightlyTired,
    VeryTired,
}

impl FatigueLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FatigueLevel::Focused => "focused",
            FatigueLevel::SlightlyTired => "slightly-tired",
            FatigueLevel::VeryTired => "very-tired",
        }
    }

    /// Classify an overall tiredness score. No hysteresis: the level follows
    /// the score on every call.
    pub fn classify(overall: f64, config: &FusionConfig) -> Self {
        if overall >= config.very_tired_at {
            FatigueLevel::VeryTired
        } else if overall >= config.slightly_tired_at {
            FatigueLevel::SlightlyTired
        } else {
            FatigueLevel::Focused
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            FatigueLevel::Focused => &[
                "Great focus! Keep it up",
                "Maintain good posture",
                "Stay hydrated",
            ],
            FatigueLevel::SlightlyTired => &[
                "Consider taking a short break",
                "Do some eye exercises",
                "Check your lighting",
                "Adjust your posture",
            ],
            FatigueLevel::VeryTired => &[
                "Take a 10-15 minute break",
                "Get some fresh air",
                "Do stretching exercises",
                "Consider ending your session",
            ],
        }
    }
}

/// Wellness values shown to the user, 100 = best.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FatigueFactors {
    pub facial_alertness: f64,
    pub typing_performance: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FatigueAssessment {
    pub level: FatigueLevel,
    pub confidence_percent: f64,
    pub factors: FatigueFactors,
    pub recommendations: Vec<String>,
    /// Raw tiredness sub-scores behind `factors`.
    pub facial_score: f64,
    pub typing_score: f64,
    pub overall_score: f64,
}

impl Default for FatigueAssessment {
    fn default() -> Self {
        assess(None, None)
    }
}

/// Scores, combines and classifies the two snapshot streams.
#[derive(Debug, Clone, Default)]
pub struct FatigueEngine {
    config: FusionConfig,
}

impl FatigueEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Sub-scores and their combination, before classification.
    /// Missing streams contribute 0 and the denominator stays 2.
    pub fn scores(
        &self,
        facial: Option<&FacialSnapshot>,
        typing: Option<&TypingSnapshot>,
    ) -> (f64, f64, f64) {
        let facial_score = score_facial(facial, &self.config);
        let typing_score = score_typing(typing, &self.config);
        let overall = (facial_score + typing_score) / 2.0;
        (facial_score, typing_score, overall)
    }

    pub fn assess(
        &self,
        facial: Option<&FacialSnapshot>,
        typing: Option<&TypingSnapshot>,
    ) -> FatigueAssessment {
        let (facial_score, typing_score, overall) = self.scores(facial, typing);
        self.build_assessment(facial_score, typing_score, overall)
    }

    /// Classify an already-combined overall score. Used directly by the
    /// smoothing variant, which substitutes its own overall value.
    pub fn build_assessment(
        &self,
        facial_score: f64,
        typing_score: f64,
        overall: f64,
    ) -> FatigueAssessment {
        let level = FatigueLevel::classify(overall, &self.config);

        FatigueAssessment {
            level,
            confidence_percent: self.confidence(overall),
            factors: FatigueFactors {
                facial_alertness: wellness(facial_score),
                typing_performance: wellness(typing_score),
                overall: wellness(overall),
            },
            recommendations: level
                .recommendations()
                .iter()
                .map(|rec| rec.to_string())
                .collect(),
            facial_score,
            typing_score,
            overall_score: overall,
        }
    }

    /// Peaks at the scoring midpoint and never drops below the floor.
    pub fn confidence(&self, overall: f64) -> f64 {
        (100.0 - (overall - self.config.confidence_peak).abs()).max(self.config.confidence_floor)
    }
}

/// Assess with the default thresholds.
pub fn assess(facial: Option<&FacialSnapshot>, typing: Option<&TypingSnapshot>) -> FatigueAssessment {
    FatigueEngine::default().assess(facial, typing)
}
