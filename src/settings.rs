use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::facial::FacialAggregatorConfig;
use crate::typing::TypingAggregatorConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingSettings {
    pub refresh_interval_ms: u64,
    /// Gaps between keystrokes longer than this count as pauses.
    pub pause_threshold_ms: u64,
    /// Chance that the simulated detector flags a keystroke as an error.
    pub simulated_error_probability: f64,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1000,
            pause_threshold_ms: 500,
            simulated_error_probability: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacialSettings {
    pub sample_interval_ms: u64,
    pub blink_refractory_ms: u64,
    /// Blink rate starts decaying once no blink was seen for this long.
    pub blink_decay_after_ms: u64,
    pub blink_decay_step: f64,
    pub max_blink_rate: f64,
    /// Chance that the simulated camera reports a blink in a frame.
    pub simulated_blink_probability: f64,
}

impl Default for FacialSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            blink_refractory_ms: 200,
            blink_decay_after_ms: 5000,
            blink_decay_step: 0.1,
            max_blink_rate: 20.0,
            simulated_blink_probability: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorSettings {
    pub typing: TypingSettings,
    pub facial: FacialSettings,
    /// Exponential smoothing of the overall score; `None` keeps the
    /// un-smoothed classification.
    pub smoothing_alpha: Option<f64>,
}

impl MonitorSettings {
    pub fn typing_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.typing.refresh_interval_ms.max(1))
    }

    pub fn facial_sample_interval(&self) -> Duration {
        Duration::from_millis(self.facial.sample_interval_ms.max(1))
    }

    pub fn typing_aggregator(&self) -> TypingAggregatorConfig {
        TypingAggregatorConfig {
            pause_threshold: Duration::from_millis(self.typing.pause_threshold_ms),
        }
    }

    pub fn facial_aggregator(&self) -> FacialAggregatorConfig {
        FacialAggregatorConfig {
            refractory: Duration::from_millis(self.facial.blink_refractory_ms),
            decay_after: Duration::from_millis(self.facial.blink_decay_after_ms),
            decay_step: self.facial.blink_decay_step,
            max_blink_rate: self.facial.max_blink_rate,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<MonitorSettings>,
}

impl SettingsStore {
    /// Load settings from `path`. A missing or unparsable file yields defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring malformed settings in {}: {err}; using defaults",
                    path.display()
                );
                MonitorSettings::default()
            })
        } else {
            MonitorSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> MonitorSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, settings: MonitorSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        *guard = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: MonitorSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &MonitorSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
