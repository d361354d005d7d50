//! Command-line arguments for the simulated monitoring session.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fatigue-monitor")]
#[command(version)]
#[command(about = "Estimates mental fatigue from typing rhythm and facial cues", long_about = None)]
pub struct Cli {
    /// How long to monitor before printing the session overview
    #[arg(short = 'd', long = "duration-secs", default_value_t = 30)]
    pub duration_secs: u64,

    /// Settings file (JSON); created with defaults when missing
    #[arg(short = 's', long = "settings", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Seed the simulated typist, error detector and camera for a repeatable run
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Simulate a camera whose permission was denied
    #[arg(long = "camera-denied")]
    pub camera_denied: bool,

    /// Debug-level logs of every assessment (also FATIGUE_MONITOR_DEBUG=1)
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["fatigue-monitor"]).unwrap();
        assert_eq!(cli.duration_secs, 30);
        assert!(cli.settings.is_none());
        assert!(cli.seed.is_none());
        assert!(!cli.camera_denied);
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "fatigue-monitor",
            "--duration-secs",
            "5",
            "--settings",
            "/tmp/fatigue.json",
            "--seed",
            "42",
            "--camera-denied",
        ])
        .unwrap();
        assert_eq!(cli.duration_secs, 5);
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/fatigue.json")));
        assert_eq!(cli.seed, Some(42));
        assert!(cli.camera_denied);
    }

    #[test]
    fn rejects_non_numeric_duration() {
        assert!(Cli::try_parse_from(["fatigue-monitor", "--duration-secs", "soon"]).is_err());
    }
}
