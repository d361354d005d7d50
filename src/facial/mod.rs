pub mod aggregator;
pub mod sensor;

pub use aggregator::{FacialAggregator, FacialAggregatorConfig};
pub use sensor::{
    FaceObservation, FaceSensor, SensorError, SensorGuard, SensorStatus, SimulatedFaceSensor,
};
