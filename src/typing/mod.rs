pub mod aggregator;
pub mod detector;
pub mod simulator;

pub use aggregator::{TypingAggregator, TypingAggregatorConfig};
pub use detector::{ErrorDetector, NoErrors, RandomErrorDetector};
pub use simulator::SimulatedTypist;
