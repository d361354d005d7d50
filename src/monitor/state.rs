use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MonitorStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonitorState {
    pub status: MonitorStatus,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub active_ms: u64,
    /// Time monitored in earlier running windows; combines with
    /// `running_anchor` to compute the true active duration.
    #[serde(skip)]
    pub active_ms_baseline: u64,
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == MonitorStatus::Running
    }

    pub fn current_active_ms(&self) -> u64 {
        self.current_active_ms_at(Instant::now())
    }

    pub fn current_active_ms_at(&self, now: Instant) -> u64 {
        if let (MonitorStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            self.active_ms_baseline
                .saturating_add(now.saturating_duration_since(anchor).as_millis() as u64)
        } else {
            self.active_ms
        }
    }

    pub fn sync_active_at(&mut self, now: Instant) {
        if self.is_running() {
            self.active_ms = self.current_active_ms_at(now);
        }
    }

    pub fn begin_session(&mut self, session_id: String, start_at: DateTime<Utc>, now: Instant) {
        *self = Self {
            status: MonitorStatus::Running,
            session_id: Some(session_id),
            started_at: Some(start_at),
            active_ms: 0,
            active_ms_baseline: 0,
            running_anchor: Some(now),
        };
    }

    /// Continue a stopped session; time spent stopped is not counted.
    pub fn resume(&mut self, now: Instant) {
        if self.status == MonitorStatus::Stopped {
            self.status = MonitorStatus::Running;
            self.active_ms_baseline = self.active_ms;
            self.running_anchor = Some(now);
        }
    }

    pub fn stop_at(&mut self, now: Instant) {
        self.sync_active_at(now);
        self.status = MonitorStatus::Stopped;
        self.running_anchor = None;
        self.active_ms_baseline = self.active_ms;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// `m:ss`, as shown next to the session controls.
pub fn format_session_clock(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn active_time_excludes_stopped_windows() {
        let t0 = Instant::now();
        let mut state = MonitorState::new();

        state.begin_session("s1".into(), Utc::now(), t0);
        assert_eq!(state.current_active_ms_at(t0 + Duration::from_secs(10)), 10_000);

        state.stop_at(t0 + Duration::from_secs(10));
        assert_eq!(state.status, MonitorStatus::Stopped);
        assert_eq!(state.current_active_ms_at(t0 + Duration::from_secs(60)), 10_000);

        state.resume(t0 + Duration::from_secs(60));
        assert_eq!(state.current_active_ms_at(t0 + Duration::from_secs(65)), 15_000);
        assert_eq!(state.session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn resume_only_applies_to_stopped() {
        let mut state = MonitorState::new();
        state.resume(Instant::now());
        assert_eq!(state.status, MonitorStatus::Idle);
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_session_clock(0), "0:00");
        assert_eq!(format_session_clock(9_999), "0:09");
        assert_eq!(format_session_clock(61_000), "1:01");
        assert_eq!(format_session_clock(3_600_000), "60:00");
    }
}
