use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::facial::{FaceSensor, FacialAggregator, SensorGuard, SensorStatus};
use crate::monitor::{events::MonitorEvent, hub::FusionHub};
use crate::typing::TypingAggregator;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Samples the camera at a fixed rate until cancelled or the camera fails.
/// The camera is released on every exit path, including task abort.
pub async fn facial_sampling_loop(
    sensor: Box<dyn FaceSensor>,
    mut aggregator: FacialAggregator,
    interval: Duration,
    hub: FusionHub,
    events: broadcast::Sender<MonitorEvent>,
    cancel_token: CancellationToken,
) {
    let mut guard = match SensorGuard::acquire(sensor) {
        Ok(guard) => guard,
        Err(err) => {
            log_warn!("camera acquisition failed: {err}");
            publish_status(&events, SensorStatus::Unavailable { reason: err.to_string() });
            hub.clear_facial().await;
            return;
        }
    };

    log_info!("facial sampling started ({}ms interval)", interval.as_millis());
    publish_status(&events, SensorStatus::Streaming);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match guard.read_frame() {
                    Ok(observation) => {
                        let snapshot = aggregator.tick_at(Instant::now().into_std(), &observation);
                        hub.publish_facial(snapshot).await;
                    }
                    Err(err) => {
                        log_error!("camera frame read failed, stopping facial stream: {err}");
                        publish_status(&events, SensorStatus::Unavailable { reason: err.to_string() });
                        hub.clear_facial().await;
                        return;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("facial sampling shutting down");
                break;
            }
        }
    }

    drop(guard);
    publish_status(&events, SensorStatus::Inactive);
}

/// Refreshes the typing snapshot on a timer so speed keeps falling while the
/// user is idle.
pub async fn typing_refresh_loop(
    typing: Arc<Mutex<TypingAggregator>>,
    interval: Duration,
    hub: FusionHub,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = {
                    let mut aggregator = typing.lock().await;
                    aggregator.refresh_at(Instant::now().into_std()).clone()
                };
                // Nothing typed yet: leave the stream absent.
                if snapshot.total_keystrokes == 0 {
                    continue;
                }
                if hub.publish_typing(snapshot).await.is_some() {
                    log_debug!("typing snapshot refreshed");
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("typing refresh shutting down");
                break;
            }
        }
    }
}

fn publish_status(events: &broadcast::Sender<MonitorEvent>, status: SensorStatus) {
    let _ = events.send(MonitorEvent::SensorStatusChanged { status });
}
