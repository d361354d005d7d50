use std::time::{Duration, Instant};

use crate::metrics::TypingSnapshot;

use super::detector::ErrorDetector;

/// Average word length used for words-per-minute.
const CHARS_PER_WORD: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TypingAggregatorConfig {
    pub pause_threshold: Duration,
}

impl Default for TypingAggregatorConfig {
    fn default() -> Self {
        Self {
            pause_threshold: Duration::from_millis(500),
        }
    }
}

/// Accumulates keystroke timing for one session and summarises it into a
/// [`TypingSnapshot`] on every refresh.
pub struct TypingAggregator {
    config: TypingAggregatorConfig,
    detector: Box<dyn ErrorDetector>,
    started_at: Instant,
    keystrokes: Vec<Instant>,
    errors: u64,
    pauses: Vec<Duration>,
    buffer_chars: usize,
    snapshot: TypingSnapshot,
}

impl TypingAggregator {
    pub fn new(config: TypingAggregatorConfig, detector: Box<dyn ErrorDetector>) -> Self {
        Self::starting_at(config, detector, Instant::now())
    }

    pub fn starting_at(
        config: TypingAggregatorConfig,
        detector: Box<dyn ErrorDetector>,
        started_at: Instant,
    ) -> Self {
        Self {
            config,
            detector,
            started_at,
            keystrokes: Vec::new(),
            errors: 0,
            pauses: Vec::new(),
            buffer_chars: 0,
            snapshot: TypingSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &TypingSnapshot {
        &self.snapshot
    }

    pub fn update(&mut self, buffer: &str, keystroke: Option<Instant>) -> &TypingSnapshot {
        self.update_at(buffer, keystroke, Instant::now())
    }

    /// Record an optional keystroke, take the new buffer length, and refresh.
    pub fn update_at(
        &mut self,
        buffer: &str,
        keystroke: Option<Instant>,
        now: Instant,
    ) -> &TypingSnapshot {
        if let Some(at) = keystroke {
            self.record_keystroke(at);
        }
        self.buffer_chars = buffer.chars().count();
        self.refresh_at(now)
    }

    fn record_keystroke(&mut self, at: Instant) {
        if let Some(previous) = self.keystrokes.last() {
            let gap = at.saturating_duration_since(*previous);
            if gap > self.config.pause_threshold {
                self.pauses.push(gap);
            }
        }

        self.keystrokes.push(at);

        if self.detector.is_error(at) {
            self.errors += 1;
        }
    }

    /// Recompute the snapshot. Without keystrokes or elapsed time the
    /// previous snapshot is kept as is.
    pub fn refresh_at(&mut self, now: Instant) -> &TypingSnapshot {
        let keystrokes = self.keystrokes.len() as u64;
        let elapsed = now.saturating_duration_since(self.started_at);

        if keystrokes == 0 || elapsed.is_zero() {
            return &self.snapshot;
        }

        let elapsed_minutes = elapsed.as_secs_f64() / 60.0;
        let words = self.buffer_chars as f64 / CHARS_PER_WORD;
        let error_rate = (self.errors as f64 / keystrokes as f64 * 100.0).min(100.0);
        let avg_pause_millis = if self.pauses.is_empty() {
            0.0
        } else {
            let total: f64 = self.pauses.iter().map(|p| p.as_secs_f64() * 1000.0).sum();
            total / self.pauses.len() as f64
        };

        self.snapshot = TypingSnapshot {
            words_per_minute: words / elapsed_minutes,
            accuracy_percent: (100.0 - error_rate).max(0.0),
            error_rate_percent: error_rate,
            avg_pause_millis,
            total_keystrokes: keystrokes,
            elapsed_seconds: elapsed.as_secs_f64(),
        };

        &self.snapshot
    }

    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Drop every accumulator and start a new measuring window at `now`.
    pub fn reset_at(&mut self, now: Instant) {
        self.started_at = now;
        self.keystrokes.clear();
        self.errors = 0;
        self.pauses.clear();
        self.buffer_chars = 0;
        self.snapshot = TypingSnapshot::default();
    }
}
