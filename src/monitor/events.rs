use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::facial::SensorStatus;
use crate::fusion::FatigueAssessment;

use super::state::MonitorState;

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Everything the presentation layer is told about.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum MonitorEvent {
    AssessmentUpdated {
        assessment: FatigueAssessment,
        at: DateTime<Utc>,
    },
    SensorStatusChanged {
        status: SensorStatus,
    },
    StateChanged {
        state: MonitorState,
    },
}
