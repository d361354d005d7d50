pub mod cli;
pub mod facial;
pub mod fusion;
pub mod metrics;
pub mod monitor;
pub mod sensing;
pub mod settings;
pub mod typing;
pub mod utils;

pub use facial::{FaceSensor, SensorError, SimulatedFaceSensor};
pub use fusion::{assess, FatigueAssessment, FatigueEngine, FatigueLevel, FusionConfig};
pub use metrics::{FacialSnapshot, SessionOverview, TypingSnapshot};
pub use monitor::{MonitorController, MonitorEvent, MonitorState, MonitorStatus};
pub use settings::{MonitorSettings, SettingsStore};

/// Environment variable that switches logging to debug level.
pub const DEBUG_ENV_VAR: &str = "FATIGUE_MONITOR_DEBUG";

/// Whether `FATIGUE_MONITOR_DEBUG` is set to a truthy value.
pub fn debug_mode() -> bool {
    std::env::var(DEBUG_ENV_VAR)
        .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
