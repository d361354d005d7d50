use anyhow::{Context, Result};
use clap::Parser;
use fatigue_monitor_lib::{
    cli::Cli,
    debug_mode,
    facial::SimulatedFaceSensor,
    monitor::{MonitorController, MonitorEvent},
    settings::{MonitorSettings, SettingsStore},
    typing::{ErrorDetector, RandomErrorDetector, SimulatedTypist},
    utils::logging,
};
use log::{debug, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug || debug_mode());

    info!("fatigue-monitor starting up...");

    let settings = match &cli.settings {
        Some(path) => {
            let store = SettingsStore::new(path.clone())
                .with_context(|| format!("failed to load settings from {}", path.display()))?;
            if !path.exists() {
                store.update(store.settings())?;
                info!("Wrote default settings to {}", path.display());
            }
            store.settings()
        }
        None => MonitorSettings::default(),
    };

    let error_probability = settings.typing.simulated_error_probability;
    let blink_probability = settings.facial.simulated_blink_probability;

    let detector: Box<dyn ErrorDetector> = match cli.seed {
        Some(seed) => Box::new(RandomErrorDetector::seeded(seed, error_probability)),
        None => Box::new(RandomErrorDetector::new(error_probability)),
    };
    let mut sensor = match cli.seed {
        Some(seed) => SimulatedFaceSensor::seeded(seed.wrapping_add(1), blink_probability),
        None => SimulatedFaceSensor::new(blink_probability),
    };
    if cli.camera_denied {
        sensor = sensor.denying_permission();
    }
    let typist = match cli.seed {
        Some(seed) => SimulatedTypist::seeded(seed.wrapping_add(2)),
        None => SimulatedTypist::new(),
    };

    let controller = MonitorController::new(settings, detector);
    let cancel_token = CancellationToken::new();

    let reporter = tokio::spawn(report_events(controller.clone(), cancel_token.clone()));

    controller.start_monitoring(Box::new(sensor)).await?;

    let typing = tokio::spawn(simulate_typing(
        controller.clone(),
        typist,
        cancel_token.clone(),
    ));

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(cli.duration_secs)) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted, ending session early"),
    }

    cancel_token.cancel();
    typing.await.context("typing simulation failed to join")??;

    let overview = controller.end_session().await?;
    reporter.await.context("event reporter failed to join")?;

    println!("{}", serde_json::to_string_pretty(&overview)?);
    Ok(())
}

/// Feeds simulated keystrokes into the controller until cancelled.
async fn simulate_typing(
    controller: MonitorController,
    mut typist: SimulatedTypist,
    cancel_token: CancellationToken,
) -> Result<()> {
    let mut buffer = String::new();

    loop {
        let (delay, ch) = typist.next_keystroke();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                buffer.push(ch);
                controller
                    .record_keystroke(&buffer, Instant::now().into_std())
                    .await?;
            }
            _ = cancel_token.cancelled() => break,
        }
    }

    Ok(())
}

async fn report_events(controller: MonitorController, cancel_token: CancellationToken) {
    let mut events = controller.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(MonitorEvent::AssessmentUpdated { assessment, .. }) => {
                    debug!(
                        "{} (confidence {:.0}%, facial {:.0}, typing {:.0})",
                        assessment.level.as_str(),
                        assessment.confidence_percent,
                        assessment.facial_score,
                        assessment.typing_score
                    );
                }
                Ok(MonitorEvent::SensorStatusChanged { status }) => {
                    info!("Camera status: {status:?}");
                }
                Ok(MonitorEvent::StateChanged { state }) => {
                    info!("Monitor is {:?} ({}ms active)", state.status, state.active_ms);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event reporter lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            },
            _ = cancel_token.cancelled() => break,
        }
    }
}
