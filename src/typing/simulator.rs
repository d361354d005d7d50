use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;

const SAMPLE_TEXT: &str = "the quick brown fox jumps over the lazy dog while the \
    afternoon slowly drifts toward evening and the coffee goes cold ";

/// Chance that the next keystroke follows a thinking pause.
const PAUSE_PROBABILITY: f64 = 0.05;

/// Produces a plausible stream of keystrokes for demos: short inter-key gaps
/// with an occasional long pause.
pub struct SimulatedTypist {
    rng: StdRng,
    text: Vec<char>,
    position: usize,
}

impl SimulatedTypist {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            text: SAMPLE_TEXT.chars().collect(),
            position: 0,
        }
    }

    /// Delay before the next keystroke and the character it types.
    pub fn next_keystroke(&mut self) -> (Duration, char) {
        let delay_ms = if self.rng.gen_bool(PAUSE_PROBABILITY) {
            self.rng.gen_range(1500..4500)
        } else {
            self.rng.gen_range(80..350)
        };

        let ch = self.text[self.position % self.text.len()];
        self.position += 1;

        (Duration::from_millis(delay_ms), ch)
    }
}

impl Default for SimulatedTypist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_sample_text() {
        let mut typist = SimulatedTypist::seeded(11);
        let typed: String = (0..9).map(|_| typist.next_keystroke().1).collect();
        assert_eq!(typed, "the quick");
    }

    #[test]
    fn delays_stay_in_expected_bands() {
        let mut typist = SimulatedTypist::seeded(5);
        for _ in 0..500 {
            let (delay, _) = typist.next_keystroke();
            let ms = delay.as_millis();
            assert!((80..350).contains(&ms) || (1500..4500).contains(&ms), "{ms}");
        }
    }
}
