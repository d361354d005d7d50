pub mod config;
pub mod engine;
pub mod scoring;
pub mod smoothing;

pub use config::{FusionConfig, TieredRule};
pub use engine::{assess, FatigueAssessment, FatigueEngine, FatigueFactors, FatigueLevel};
pub use smoothing::ScoreSmoother;
