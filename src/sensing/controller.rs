use anyhow::{bail, Context, Result};
use log::info;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::facial::{FaceSensor, FacialAggregator};
use crate::monitor::{events::MonitorEvent, hub::FusionHub};
use crate::typing::TypingAggregator;

use super::loop_worker::{facial_sampling_loop, typing_refresh_loop};

/// Everything the two sampling loops need for one running window.
pub struct SensingPlan {
    pub sensor: Box<dyn FaceSensor>,
    pub facial: FacialAggregator,
    pub facial_interval: Duration,
    pub typing: Arc<Mutex<TypingAggregator>>,
    pub typing_interval: Duration,
}

/// Owns the facial sampling and typing refresh tasks.
pub struct SensingController {
    handles: Vec<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SensingController {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            cancel_token: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel_token.is_some()
    }

    pub fn start_sensing(
        &mut self,
        plan: SensingPlan,
        hub: FusionHub,
        events: broadcast::Sender<MonitorEvent>,
    ) -> Result<()> {
        if self.is_active() {
            bail!("sensing already active");
        }

        let cancel_token = CancellationToken::new();

        let facial = tokio::spawn(facial_sampling_loop(
            plan.sensor,
            plan.facial,
            plan.facial_interval,
            hub.clone(),
            events,
            cancel_token.clone(),
        ));
        let typing = tokio::spawn(typing_refresh_loop(
            plan.typing,
            plan.typing_interval,
            hub,
            cancel_token.clone(),
        ));

        self.handles = vec![facial, typing];
        self.cancel_token = Some(cancel_token);
        info!("Sensing started");
        Ok(())
    }

    /// Cancel both loops and wait for them, so the camera is released by the
    /// time this returns.
    pub async fn stop_sensing(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        for handle in self.handles.drain(..) {
            handle.await.context("sensing task failed to join")?;
        }
        Ok(())
    }
}

impl Default for SensingController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SensingController {
    fn drop(&mut self) {
        // Abort drops each loop future, which releases the camera guard.
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        for handle in &self.handles {
            handle.abort();
        }
    }
}
