use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::fusion::{FatigueAssessment, FatigueEngine, ScoreSmoother};
use crate::metrics::{FacialSnapshot, SessionOverviewCollector, TypingSnapshot};

use super::events::MonitorEvent;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Latest snapshot of each stream plus the assessment made from them.
///
/// Publishing recomputes synchronously under the lock, so an assessment is
/// always built from one consistent pair of inputs. Streams tick
/// independently; whichever published last is paired with the other's most
/// recent (possibly stale) snapshot.
#[derive(Clone)]
pub struct FusionHub {
    inner: Arc<Mutex<HubState>>,
    events: broadcast::Sender<MonitorEvent>,
    overview: SessionOverviewCollector,
}

struct HubState {
    engine: FatigueEngine,
    smoother: Option<ScoreSmoother>,
    facial: Option<FacialSnapshot>,
    typing: Option<TypingSnapshot>,
    latest: FatigueAssessment,
}

impl HubState {
    fn assess(&mut self) -> FatigueAssessment {
        match self.smoother.as_mut() {
            Some(smoother) => smoother.assess(self.facial.as_ref(), self.typing.as_ref()),
            None => self.engine.assess(self.facial.as_ref(), self.typing.as_ref()),
        }
    }
}

impl FusionHub {
    pub fn new(
        engine: FatigueEngine,
        smoothing_alpha: Option<f64>,
        events: broadcast::Sender<MonitorEvent>,
        overview: SessionOverviewCollector,
    ) -> Self {
        let latest = engine.assess(None, None);
        let smoother = smoothing_alpha.map(|alpha| ScoreSmoother::new(engine.clone(), alpha));

        Self {
            inner: Arc::new(Mutex::new(HubState {
                engine,
                smoother,
                facial: None,
                typing: None,
                latest,
            })),
            events,
            overview,
        }
    }

    pub async fn publish_facial(&self, snapshot: FacialSnapshot) -> Option<FatigueAssessment> {
        self.update(|state| replace_if_changed(&mut state.facial, Some(snapshot)))
            .await
    }

    pub async fn publish_typing(&self, snapshot: TypingSnapshot) -> Option<FatigueAssessment> {
        self.update(|state| replace_if_changed(&mut state.typing, Some(snapshot)))
            .await
    }

    /// Mark the facial stream absent, e.g. after the camera was lost.
    pub async fn clear_facial(&self) -> Option<FatigueAssessment> {
        self.update(|state| replace_if_changed(&mut state.facial, None))
            .await
    }

    pub async fn clear_typing(&self) -> Option<FatigueAssessment> {
        self.update(|state| replace_if_changed(&mut state.typing, None))
            .await
    }

    /// Most recent assessment; the display fallback between recomputations.
    pub async fn latest(&self) -> FatigueAssessment {
        self.inner.lock().await.latest.clone()
    }

    pub async fn inputs(&self) -> (Option<FacialSnapshot>, Option<TypingSnapshot>) {
        let state = self.inner.lock().await;
        (state.facial.clone(), state.typing.clone())
    }

    /// Forget both streams and the smoothing history for a new session.
    pub async fn reset(&self) {
        let mut state = self.inner.lock().await;
        state.facial = None;
        state.typing = None;
        if let Some(smoother) = state.smoother.as_mut() {
            smoother.reset();
        }
        state.latest = state.engine.assess(None, None);
    }

    async fn update<F>(&self, apply: F) -> Option<FatigueAssessment>
    where
        F: FnOnce(&mut HubState) -> bool,
    {
        let (assessment, previous_level, facial, typing) = {
            let mut state = self.inner.lock().await;
            if !apply(&mut state) {
                return None;
            }

            let previous_level = state.latest.level;
            let assessment = state.assess();
            state.latest = assessment.clone();
            (
                assessment,
                previous_level,
                state.facial.clone(),
                state.typing.clone(),
            )
        };

        if assessment.level != previous_level {
            log_info!(
                "Fatigue level {} -> {} (overall {:.1}, confidence {:.0}%)",
                previous_level.as_str(),
                assessment.level.as_str(),
                assessment.overall_score,
                assessment.confidence_percent
            );
        } else {
            log_debug!(
                "Assessment recomputed: {} overall {:.1}",
                assessment.level.as_str(),
                assessment.overall_score
            );
        }

        self.overview
            .record(facial.as_ref(), typing.as_ref(), &assessment)
            .await;

        // No subscribers is fine; the assessment is still kept as `latest`.
        let _ = self.events.send(MonitorEvent::AssessmentUpdated {
            assessment: assessment.clone(),
            at: Utc::now(),
        });

        Some(assessment)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::FatigueLevel;
    use crate::monitor::events::EVENT_CHANNEL_CAPACITY;

    fn hub() -> (FusionHub, broadcast::Receiver<MonitorEvent>) {
        let (tx, rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let hub = FusionHub::new(
            FatigueEngine::default(),
            None,
            tx,
            SessionOverviewCollector::new(),
        );
        (hub, rx)
    }

    fn tired_typing() -> TypingSnapshot {
        TypingSnapshot {
            words_per_minute: 15.0,
            accuracy_percent: 70.0,
            error_rate_percent: 12.0,
            avg_pause_millis: 3500.0,
            total_keystrokes: 40,
            elapsed_seconds: 120.0,
        }
    }

    #[tokio::test]
    async fn starts_with_empty_assessment() {
        let (hub, _rx) = hub();
        let latest = hub.latest().await;
        assert_eq!(latest.level, FatigueLevel::Focused);
        assert_eq!(latest.confidence_percent, 60.0);
    }

    #[tokio::test]
    async fn recomputes_on_each_stream() {
        let (hub, mut rx) = hub();

        let first = hub
            .publish_facial(FacialSnapshot::new(22.0, 0.5, 25.0))
            .await
            .unwrap();
        assert_eq!(first.level, FatigueLevel::SlightlyTired);

        let second = hub.publish_typing(tired_typing()).await.unwrap();
        assert_eq!(second.level, FatigueLevel::VeryTired);
        assert_eq!(hub.latest().await, second);

        match rx.recv().await.unwrap() {
            MonitorEvent::AssessmentUpdated { assessment, .. } => assert_eq!(assessment, first),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn unchanged_input_does_not_recompute() {
        let (hub, _rx) = hub();
        let snapshot = FacialSnapshot::new(16.0, 0.7, 0.0);

        assert!(hub.publish_facial(snapshot.clone()).await.is_some());
        assert!(hub.publish_facial(snapshot).await.is_none());
        assert!(hub.clear_typing().await.is_none());
    }

    #[tokio::test]
    async fn losing_a_stream_drops_its_contribution() {
        let (hub, _rx) = hub();
        hub.publish_facial(FacialSnapshot::new(22.0, 0.5, 25.0)).await;
        hub.publish_typing(tired_typing()).await;

        let after = hub.clear_facial().await.unwrap();
        assert_eq!(after.facial_score, 0.0);
        assert_eq!(after.overall_score, 50.0);
        assert_eq!(hub.inputs().await.0, None);
    }

    #[tokio::test]
    async fn smoothing_variant_is_applied() {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let hub = FusionHub::new(
            FatigueEngine::default(),
            Some(0.5),
            tx,
            SessionOverviewCollector::new(),
        );

        hub.publish_typing(TypingSnapshot::default()).await;
        let smoothed = hub
            .publish_facial(FacialSnapshot::new(22.0, 0.5, 25.0))
            .await
            .unwrap();
        assert_eq!(smoothed.overall_score, 25.0);
        assert_eq!(smoothed.level, FatigueLevel::Focused);
    }

    #[tokio::test]
    async fn reset_returns_to_empty_assessment() {
        let (hub, _rx) = hub();
        hub.publish_typing(tired_typing()).await;
        hub.reset().await;

        assert_eq!(hub.latest().await, FatigueAssessment::default());
        assert_eq!(hub.inputs().await, (None, None));
    }
}
