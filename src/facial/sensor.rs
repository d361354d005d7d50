use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

/// What the camera pipeline saw in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceObservation {
    pub blink: bool,
    pub eye_openness: f64,
    pub head_pose_degrees: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SensorError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("frame read failed: {0}")]
    FrameReadFailed(String),
}

/// Status of the facial stream as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SensorStatus {
    Inactive,
    Streaming,
    Unavailable { reason: String },
}

/// Source of per-frame facial observations. `release` must be safe to call
/// more than once and after a failed `acquire`.
pub trait FaceSensor: Send {
    fn acquire(&mut self) -> Result<(), SensorError>;
    fn read_frame(&mut self) -> Result<FaceObservation, SensorError>;
    fn release(&mut self);
}

/// Holds an acquired sensor and releases it when dropped, whichever way the
/// owning loop exits.
pub struct SensorGuard {
    sensor: Box<dyn FaceSensor>,
}

impl SensorGuard {
    pub fn acquire(mut sensor: Box<dyn FaceSensor>) -> Result<Self, SensorError> {
        if let Err(err) = sensor.acquire() {
            sensor.release();
            return Err(err);
        }
        Ok(Self { sensor })
    }

    pub fn read_frame(&mut self) -> Result<FaceObservation, SensorError> {
        self.sensor.read_frame()
    }
}

impl Drop for SensorGuard {
    fn drop(&mut self) {
        self.sensor.release();
    }
}

/// Camera stand-in: random blinks, mostly-open eyes and a small head sway.
pub struct SimulatedFaceSensor {
    rng: StdRng,
    blink_probability: f64,
    deny_permission: bool,
    acquired: bool,
}

impl SimulatedFaceSensor {
    pub fn new(blink_probability: f64) -> Self {
        Self::with_rng(StdRng::from_entropy(), blink_probability)
    }

    pub fn seeded(seed: u64, blink_probability: f64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), blink_probability)
    }

    fn with_rng(rng: StdRng, blink_probability: f64) -> Self {
        Self {
            rng,
            blink_probability: if blink_probability.is_finite() {
                blink_probability.clamp(0.0, 1.0)
            } else {
                0.0
            },
            deny_permission: false,
            acquired: false,
        }
    }

    /// Make `acquire` fail as if the user refused camera access.
    pub fn denying_permission(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired
    }
}

impl FaceSensor for SimulatedFaceSensor {
    fn acquire(&mut self) -> Result<(), SensorError> {
        if self.deny_permission {
            return Err(SensorError::PermissionDenied);
        }
        self.acquired = true;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<FaceObservation, SensorError> {
        if !self.acquired {
            return Err(SensorError::FrameReadFailed("sensor not acquired".into()));
        }

        Ok(FaceObservation {
            blink: self.rng.gen_bool(self.blink_probability),
            eye_openness: 0.7 + self.rng.gen::<f64>() * 0.3,
            head_pose_degrees: (self.rng.gen::<f64>() - 0.5) * 20.0,
        })
    }

    fn release(&mut self) {
        self.acquired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    struct CountingSensor {
        fail_acquire: bool,
        releases: Arc<AtomicUsize>,
    }

    impl FaceSensor for CountingSensor {
        fn acquire(&mut self) -> Result<(), SensorError> {
            if self.fail_acquire {
                Err(SensorError::DeviceUnavailable("busy".into()))
            } else {
                Ok(())
            }
        }

        fn read_frame(&mut self) -> Result<FaceObservation, SensorError> {
            Err(SensorError::FrameReadFailed("unplugged".into()))
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn guard_releases_on_drop() {
        let releases = Arc::new(AtomicUsize::new(0));
        let guard = SensorGuard::acquire(Box::new(CountingSensor {
            fail_acquire: false,
            releases: releases.clone(),
        }))
        .unwrap();

        assert_eq!(releases.load(Ordering::SeqCst), 0);
        drop(guard);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_acquire_still_releases() {
        let releases = Arc::new(AtomicUsize::new(0));
        let result = SensorGuard::acquire(Box::new(CountingSensor {
            fail_acquire: true,
            releases: releases.clone(),
        }));

        assert!(matches!(result, Err(SensorError::DeviceUnavailable(_))));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn simulated_sensor_ranges() {
        let mut sensor = SimulatedFaceSensor::seeded(42, 0.02);
        assert!(sensor.read_frame().is_err());

        sensor.acquire().unwrap();
        for _ in 0..1000 {
            let frame = sensor.read_frame().unwrap();
            assert!((0.7..=1.0).contains(&frame.eye_openness));
            assert!((-10.0..=10.0).contains(&frame.head_pose_degrees));
        }

        sensor.release();
        assert!(!sensor.is_acquired());
    }

    #[test]
    fn denied_permission_surfaces_as_error() {
        let mut sensor = SimulatedFaceSensor::seeded(1, 0.02).denying_permission();
        assert_eq!(sensor.acquire(), Err(SensorError::PermissionDenied));
        assert_eq!(SensorError::PermissionDenied.to_string(), "camera permission denied");
    }
}
