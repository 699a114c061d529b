// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Outward capture events.
//!
//! The sequencer reports three events to its caller. What to do with them, such
//! as taking the photo when a stage completes, is up to the caller.

use std::time::Duration;

use crate::stage::PoseStage;
use crate::validator::Failure;

/// Receives capture progress. Every method defaults to doing nothing.
pub trait CaptureListener {
    /// A rule rejected the pose; validation runs again after `retry_in`.
    fn on_validation_error(&mut self, _stage: PoseStage, _failure: Failure, _retry_in: Duration) {}

    /// The pose holds; `remaining` ticks are left before capture.
    fn on_countdown_tick(&mut self, _stage: PoseStage, _remaining: u32) {}

    /// The pose was captured. `next_retry_in` is when the next stage starts
    /// validating, or zero after the last stage.
    fn on_stage_complete(&mut self, _stage: PoseStage, _next_retry_in: Duration) {}
}

impl CaptureListener for () {}

impl<T: CaptureListener + ?Sized> CaptureListener for Box<T> {
    fn on_validation_error(&mut self, stage: PoseStage, failure: Failure, retry_in: Duration) {
        (**self).on_validation_error(stage, failure, retry_in);
    }

    fn on_countdown_tick(&mut self, stage: PoseStage, remaining: u32) {
        (**self).on_countdown_tick(stage, remaining);
    }

    fn on_stage_complete(&mut self, stage: PoseStage, next_retry_in: Duration) {
        (**self).on_stage_complete(stage, next_retry_in);
    }
}

/// A recorded listener callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    ValidationError {
        stage: PoseStage,
        failure: Failure,
        retry_in: Duration,
    },
    CountdownTick {
        stage: PoseStage,
        remaining: u32,
    },
    StageComplete {
        stage: PoseStage,
        next_retry_in: Duration,
    },
}

/// Listener that records every event in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<CaptureEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[CaptureEvent] {
        &self.events
    }

    /// Countdown values reported for `stage`, in order.
    #[must_use]
    pub fn countdown(&self, stage: PoseStage) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                CaptureEvent::CountdownTick { stage: s, remaining } if s == stage => {
                    Some(remaining)
                }
                _ => None,
            })
            .collect()
    }

    /// Stages reported complete, in order.
    #[must_use]
    pub fn completed(&self) -> Vec<PoseStage> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                CaptureEvent::StageComplete { stage, .. } => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl CaptureListener for EventLog {
    fn on_validation_error(&mut self, stage: PoseStage, failure: Failure, retry_in: Duration) {
        self.events.push(CaptureEvent::ValidationError {
            stage,
            failure,
            retry_in,
        });
    }

    fn on_countdown_tick(&mut self, stage: PoseStage, remaining: u32) {
        self.events.push(CaptureEvent::CountdownTick { stage, remaining });
    }

    fn on_stage_complete(&mut self, stage: PoseStage, next_retry_in: Duration) {
        self.events.push(CaptureEvent::StageComplete {
            stage,
            next_retry_in,
        });
    }
}
