mod types;

pub use types::{FacialSnapshot, TypingSnapshot};

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::fusion::{FatigueAssessment, FatigueLevel};
use crate::monitor::state::format_session_clock;

const MAX_RECENT_ASSESSMENTS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCounts {
    pub focused: u64,
    pub slightly_tired: u64,
    pub very_tired: u64,
}

impl LevelCounts {
    fn record(&mut self, level: FatigueLevel) {
        match level {
            FatigueLevel::Focused => self.focused += 1,
            FatigueLevel::SlightlyTired => self.slightly_tired += 1,
            FatigueLevel::VeryTired => self.very_tired += 1,
        }
    }
}

/// Session summary for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOverview {
    pub words_per_minute: f64,
    pub accuracy_percent: f64,
    pub blink_rate_per_minute: f64,
    pub session_duration: String,
    pub session_ms: u64,
    pub current_level: FatigueLevel,
    pub level_counts: LevelCounts,
    pub assessment_count: u64,
    pub recent_assessments: Vec<FatigueAssessment>,
}

pub struct SessionOverviewCollector {
    inner: Arc<Mutex<OverviewState>>,
}

#[derive(Default)]
struct OverviewState {
    latest_typing: Option<TypingSnapshot>,
    latest_facial: Option<FacialSnapshot>,
    current_level: FatigueLevel,
    level_counts: LevelCounts,
    assessment_count: u64,
    recent_assessments: Vec<FatigueAssessment>,
}

impl SessionOverviewCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(OverviewState::default())),
        }
    }

    /// Record one recomputation together with the inputs it was made from.
    pub async fn record(
        &self,
        facial: Option<&FacialSnapshot>,
        typing: Option<&TypingSnapshot>,
        assessment: &FatigueAssessment,
    ) {
        let mut state = self.inner.lock().await;

        state.latest_facial = facial.cloned();
        state.latest_typing = typing.cloned();
        state.current_level = assessment.level;
        state.level_counts.record(assessment.level);
        state.assessment_count += 1;

        state.recent_assessments.push(assessment.clone());
        if state.recent_assessments.len() > MAX_RECENT_ASSESSMENTS {
            state.recent_assessments.remove(0);
        }
    }

    /// Summary as of now; `session_ms` comes from the monitor clock.
    pub async fn get_snapshot(&self, session_ms: u64) -> SessionOverview {
        let state = self.inner.lock().await;
        let typing = state.latest_typing.clone().unwrap_or_default();

        SessionOverview {
            words_per_minute: typing.words_per_minute,
            accuracy_percent: typing.accuracy_percent,
            blink_rate_per_minute: state
                .latest_facial
                .as_ref()
                .map(|f| f.blink_rate_per_minute)
                .unwrap_or(0.0),
            session_duration: format_session_clock(session_ms),
            session_ms,
            current_level: state.current_level,
            level_counts: state.level_counts.clone(),
            assessment_count: state.assessment_count,
            recent_assessments: state.recent_assessments.clone(),
        }
    }

    pub async fn reset(&self) {
        let mut state = self.inner.lock().await;
        *state = OverviewState::default();
    }
}

impl Default for SessionOverviewCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionOverviewCollector {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::assess;

    #[tokio::test]
    async fn empty_overview_uses_display_defaults() {
        let collector = SessionOverviewCollector::new();
        let overview = collector.get_snapshot(65_000).await;

        assert_eq!(overview.words_per_minute, 0.0);
        assert_eq!(overview.accuracy_percent, 100.0);
        assert_eq!(overview.blink_rate_per_minute, 0.0);
        assert_eq!(overview.session_duration, "1:05");
        assert_eq!(overview.current_level, FatigueLevel::Focused);
        assert_eq!(overview.assessment_count, 0);
    }

    #[tokio::test]
    async fn records_levels_and_bounds_history() {
        let collector = SessionOverviewCollector::new();
        let tired = FacialSnapshot::new(22.0, 0.5, 25.0);
        let slightly = assess(Some(&tired), None);
        let focused = assess(None, None);

        for _ in 0..15 {
            collector.record(Some(&tired), None, &slightly).await;
        }
        for _ in 0..10 {
            collector.record(None, None, &focused).await;
        }

        let overview = collector.get_snapshot(0).await;
        assert_eq!(overview.assessment_count, 25);
        assert_eq!(overview.level_counts.slightly_tired, 15);
        assert_eq!(overview.level_counts.focused, 10);
        assert_eq!(overview.recent_assessments.len(), MAX_RECENT_ASSESSMENTS);
        assert_eq!(overview.current_level, FatigueLevel::Focused);

        collector.reset().await;
        assert_eq!(collector.get_snapshot(0).await.assessment_count, 0);
    }
}
