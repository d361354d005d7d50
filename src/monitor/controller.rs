use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{info, warn};
use tokio::{
    sync::{broadcast, Mutex},
    time::Instant,
};
use uuid::Uuid;

use crate::facial::{FaceSensor, FacialAggregator};
use crate::fusion::{FatigueAssessment, FatigueEngine, FusionConfig};
use crate::metrics::{SessionOverview, SessionOverviewCollector, TypingSnapshot};
use crate::sensing::{SensingController, SensingPlan};
use crate::settings::MonitorSettings;
use crate::typing::{ErrorDetector, TypingAggregator};

use super::events::{MonitorEvent, EVENT_CHANNEL_CAPACITY};
use super::hub::FusionHub;
use super::state::{MonitorState, MonitorStatus};

/// Drives one monitoring session: owns the typing aggregator, the sampling
/// loops and the fusion hub, and forwards everything to subscribers.
#[derive(Clone)]
pub struct MonitorController {
    state: Arc<Mutex<MonitorState>>,
    typing: Arc<Mutex<TypingAggregator>>,
    hub: FusionHub,
    overview: SessionOverviewCollector,
    events: broadcast::Sender<MonitorEvent>,
    sensing: Arc<Mutex<SensingController>>,
    settings: MonitorSettings,
}

impl MonitorController {
    pub fn new(settings: MonitorSettings, detector: Box<dyn ErrorDetector>) -> Self {
        Self::with_fusion_config(settings, detector, FusionConfig::default())
    }

    pub fn with_fusion_config(
        settings: MonitorSettings,
        detector: Box<dyn ErrorDetector>,
        fusion: FusionConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let overview = SessionOverviewCollector::new();
        let hub = FusionHub::new(
            FatigueEngine::new(fusion),
            settings.smoothing_alpha,
            events.clone(),
            overview.clone(),
        );
        let typing = TypingAggregator::new(settings.typing_aggregator(), detector);

        Self {
            state: Arc::new(Mutex::new(MonitorState::new())),
            typing: Arc::new(Mutex::new(typing)),
            hub,
            overview,
            events,
            sensing: Arc::new(Mutex::new(SensingController::new())),
            settings,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub async fn get_state(&self) -> MonitorState {
        let mut guard = self.state.lock().await;
        guard.sync_active_at(now());
        guard.clone()
    }

    pub async fn latest_assessment(&self) -> FatigueAssessment {
        self.hub.latest().await
    }

    pub async fn typing_snapshot(&self) -> TypingSnapshot {
        self.typing.lock().await.snapshot().clone()
    }

    pub async fn overview(&self) -> SessionOverview {
        let active_ms = self.state.lock().await.current_active_ms_at(now());
        self.overview.get_snapshot(active_ms).await
    }

    /// Start a new session from idle, or resume a stopped one. The sensor is
    /// acquired by the facial loop; if that fails the session still runs with
    /// the facial stream absent.
    pub async fn start_monitoring(&self, sensor: Box<dyn FaceSensor>) -> Result<MonitorState> {
        let started = now();
        let resumed = {
            let mut state = self.state.lock().await;
            match state.status {
                MonitorStatus::Running => return Err(anyhow!("monitoring already active")),
                MonitorStatus::Stopped => {
                    state.resume(started);
                    true
                }
                MonitorStatus::Idle => {
                    state.begin_session(Uuid::new_v4().to_string(), Utc::now(), started);
                    false
                }
            }
        };

        if !resumed {
            self.typing.lock().await.reset_at(started);
            self.hub.reset().await;
            self.overview.reset().await;
        }

        let plan = SensingPlan {
            sensor,
            facial: FacialAggregator::starting_at(self.settings.facial_aggregator(), started),
            facial_interval: self.settings.facial_sample_interval(),
            typing: self.typing.clone(),
            typing_interval: self.settings.typing_refresh_interval(),
        };

        if let Err(err) = self
            .sensing
            .lock()
            .await
            .start_sensing(plan, self.hub.clone(), self.events.clone())
        {
            self.state.lock().await.stop_at(now());
            return Err(err);
        }

        let state = self.emit_state_changed().await;
        info!(
            "Monitoring {} for session {}",
            if resumed { "resumed" } else { "started" },
            state.session_id.as_deref().unwrap_or("?")
        );
        Ok(state)
    }

    /// Stop sampling and release the camera. The last assessment stays
    /// available as the display fallback.
    pub async fn stop_monitoring(&self) -> Result<MonitorState> {
        {
            let mut state = self.state.lock().await;
            if !state.is_running() {
                return Ok(state.clone());
            }
            state.stop_at(now());
        }

        self.sensing.lock().await.stop_sensing().await?;

        let state = self.emit_state_changed().await;
        info!("Monitoring stopped after {}ms", state.active_ms);
        Ok(state)
    }

    /// Stop if needed, return the final overview and go back to idle.
    pub async fn end_session(&self) -> Result<SessionOverview> {
        self.stop_monitoring().await?;
        let overview = self.overview().await;

        self.state.lock().await.clear();
        self.typing.lock().await.reset_at(now());
        self.hub.reset().await;
        self.overview.reset().await;

        self.emit_state_changed().await;
        Ok(overview)
    }

    /// A key was pressed; `buffer` is the text after the key took effect.
    pub async fn record_keystroke(
        &self,
        buffer: &str,
        at: std::time::Instant,
    ) -> Result<Option<FatigueAssessment>> {
        self.update_typing(buffer, Some(at)).await
    }

    /// The buffer changed without a keystroke (paste, cut, programmatic edit).
    pub async fn buffer_changed(&self, buffer: &str) -> Result<Option<FatigueAssessment>> {
        self.update_typing(buffer, None).await
    }

    /// Clear the typing statistics mid-session and publish the clean
    /// snapshot right away so nothing stale is scored.
    pub async fn reset_typing(&self) -> Result<Option<FatigueAssessment>> {
        let snapshot = {
            let mut typing = self.typing.lock().await;
            typing.reset_at(now());
            typing.snapshot().clone()
        };
        Ok(self.hub.publish_typing(snapshot).await)
    }

    async fn update_typing(
        &self,
        buffer: &str,
        keystroke: Option<std::time::Instant>,
    ) -> Result<Option<FatigueAssessment>> {
        if !self.state.lock().await.is_running() {
            warn!("Ignoring typing input while monitoring is not running");
            return Ok(None);
        }

        let snapshot = {
            let mut typing = self.typing.lock().await;
            typing.update_at(buffer, keystroke, now()).clone()
        };

        if snapshot.total_keystrokes == 0 {
            return Ok(None);
        }
        Ok(self.hub.publish_typing(snapshot).await)
    }

    async fn emit_state_changed(&self) -> MonitorState {
        let state = self.get_state().await;
        let _ = self.events.send(MonitorEvent::StateChanged {
            state: state.clone(),
        });
        state
    }
}

/// Monotonic now, following tokio's clock so paused-time tests line up.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}
