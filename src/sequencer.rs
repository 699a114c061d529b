// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Two-pose capture state machine.
//!
//! The sequencer owns the capture stage, the countdown counter and the single
//! pending validation tick. It is driven from outside with two calls:
//!
//! - [`CaptureSequencer::on_frame`] hands over the latest landmark frame. The
//!   very first frame, and the first frame after the subject was lost, run a
//!   validation cycle immediately.
//! - [`CaptureSequencer::poll`] runs the pending cycle once its deadline has
//!   passed. Every cycle schedules the next one a retry delay later, so at most
//!   one cycle runs per delay regardless of the camera frame rate.
//!
//! ```text
//! AwaitingPose1 ──pass──▶ Pose1Countdown ──0──▶ Pose1Captured ──tick──▶ AwaitingPose2
//!                                                                          │
//!                                                                        pass
//!                                                                          ▼
//!                            Completed ◀──0── Pose2Countdown
//! ```
//!
//! A failed cycle keeps the stage and restarts the counter, so a countdown
//! state survives a failure and begins again from the top. Losing the subject
//! drops a countdown back to the awaiting state of the same pose.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::CaptureConfig;
use crate::error::Result;
use crate::feedback::{Feedback, FeedbackSink};
use crate::landmark::LandmarkFrame;
use crate::listener::CaptureListener;
use crate::scheduler::TickScheduler;
use crate::stage::{CaptureStage, PoseStage};
use crate::validator::{StageValidator, ValidationOutcome};
use crate::{section, verbose};

/// Spoken once, on the first frame of a session.
pub const WELCOME_MESSAGE: &str = "Please place your device vertically straight on a table, and step back, to make yourself fully visible in the camera frame";

/// Spoken when the front pose is captured.
pub const FRONT_CAPTURED_MESSAGE: &str =
    "First Image Captured successfully. Now, turn 90 degrees to capture second";

/// Spoken when the side pose is captured.
pub const SIDE_CAPTURED_MESSAGE: &str = "Pose 2 Complete";

/// Repeated for every frame after both poses are captured.
pub const COMPLETED_MESSAGE: &str = "Both pose completed successfully. Thank you!";

/// Drives a capture session through both poses.
#[derive(Debug)]
pub struct CaptureSequencer<S, L = ()> {
    config: CaptureConfig,
    front: StageValidator,
    side: StageValidator,
    stage: CaptureStage,
    countdown: u32,
    scheduler: TickScheduler,
    latest: Option<LandmarkFrame>,
    welcomed: bool,
    subject_lost: bool,
    shut_down: bool,
    sink: S,
    listener: L,
}

impl<S: FeedbackSink, L: CaptureListener> CaptureSequencer<S, L> {
    /// Create a sequencer for one session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CaptureError::PreconditionError`] if the configuration
    /// carries no usable camera intrinsics, and
    /// [`crate::CaptureError::ConfigError`] for invalid thresholds. Nothing is
    /// validated or spoken in either case.
    pub fn new(config: CaptureConfig, sink: S, listener: L) -> Result<Self> {
        let intrinsics = config.resolve_intrinsics()?;
        let front = StageValidator::new(PoseStage::Front, intrinsics, config.thresholds);
        let side = StageValidator::new(PoseStage::Side, intrinsics, config.thresholds);

        Ok(Self {
            countdown: config.countdown_start,
            config,
            front,
            side,
            stage: CaptureStage::default(),
            scheduler: TickScheduler::new(),
            latest: None,
            welcomed: false,
            subject_lost: false,
            shut_down: false,
            sink,
            listener,
        })
    }

    /// Hand over the latest frame received at `now`.
    pub fn on_frame(&mut self, frame: LandmarkFrame, now: Instant) {
        if self.shut_down {
            return;
        }
        if self.stage.is_terminal() {
            self.emit_status(COMPLETED_MESSAGE, now);
            return;
        }
        if !self.welcomed {
            self.welcomed = true;
            self.emit_status(WELCOME_MESSAGE, now);
        }

        if frame.is_empty() {
            self.latest = None;
            if !self.subject_lost {
                self.subject_lost = true;
                self.scheduler.cancel();
                verbose!("Subject lost during {}", self.stage);
            }
            return;
        }

        self.latest = Some(frame);
        if self.subject_lost {
            self.subject_lost = false;
            self.restart_stage();
            self.run_cycle(self.countdown, now);
        } else if !self.scheduler.is_pending() {
            self.run_cycle(self.countdown, now);
        }
    }

    /// Run the pending validation cycle if it is due at `now`.
    ///
    /// Returns `true` if a cycle ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.shut_down {
            return false;
        }
        match self.scheduler.take_due(now) {
            Some(tick) => {
                self.run_cycle(tick.countdown, now);
                true
            }
            None => false,
        }
    }

    /// Cancel the pending tick and ignore all further frames and polls.
    pub fn shutdown(&mut self) {
        if let Some(tick) = self.scheduler.cancel() {
            verbose!("Cancelled pending {} cycle (countdown {})", self.stage, tick.countdown);
        }
        self.shut_down = true;
    }

    /// When the next validation cycle is due, if one is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    #[must_use]
    pub const fn stage(&self) -> CaptureStage {
        self.stage
    }

    /// Countdown value the next cycle validates with.
    #[must_use]
    pub const fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Whether the last frame had no landmarks at all.
    #[must_use]
    pub const fn is_subject_lost(&self) -> bool {
        self.subject_lost
    }

    #[must_use]
    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    #[must_use]
    pub const fn config(&self) -> &CaptureConfig {
        &self.config
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    #[must_use]
    pub const fn listener(&self) -> &L {
        &self.listener
    }

    /// Consume the sequencer, returning its sink and listener.
    pub fn into_parts(self) -> (S, L) {
        (self.sink, self.listener)
    }

    /// Restart the current stage from the top of its countdown. Completed stages
    /// stay completed.
    fn restart_stage(&mut self) {
        self.countdown = self.config.countdown_start;
        if let Some(pose) = self.stage.pose() {
            if self.stage == CaptureStage::countdown(pose) {
                self.stage = CaptureStage::awaiting(pose);
            }
        }
        verbose!("Subject back in frame, restarting {}", self.stage);
    }

    const fn validator(&self, pose: PoseStage) -> &StageValidator {
        match pose {
            PoseStage::Front => &self.front,
            PoseStage::Side => &self.side,
        }
    }

    fn run_cycle(&mut self, countdown: u32, now: Instant) {
        if self.stage == CaptureStage::Pose1Captured {
            self.stage = CaptureStage::AwaitingPose2;
            section!("Pose {}: {}", PoseStage::Side.number(), PoseStage::Side);
        }
        let Some(pose) = self.stage.pose() else {
            return;
        };
        let Some(frame) = self.latest.as_ref() else {
            return;
        };

        let outcome = self.validator(pose).check(frame, countdown);
        let retry = self.config.retry_delay;

        match outcome {
            ValidationOutcome::Fail(failure) => {
                if self.stage == CaptureStage::countdown(pose) {
                    verbose!("{pose} countdown interrupted at {countdown}: {failure:?}");
                }
                self.countdown = self.config.countdown_start;
                self.emit_status(failure.message(), now);
                self.listener.on_validation_error(pose, failure, retry);
                self.scheduler.schedule(now + retry, self.countdown);
            }
            ValidationOutcome::Countdown(remaining) => {
                self.stage = CaptureStage::countdown(pose);
                self.countdown = remaining - 1;
                self.emit_urgent(remaining.to_string(), now);
                self.listener.on_countdown_tick(pose, remaining);
                self.scheduler.schedule(now + retry, self.countdown);
            }
            ValidationOutcome::Complete => self.complete(pose, now),
        }
    }

    fn complete(&mut self, pose: PoseStage, now: Instant) {
        let retry = self.config.retry_delay;
        self.countdown = self.config.countdown_start;
        verbose!("{pose} pose captured");

        match pose {
            PoseStage::Front => {
                self.stage = CaptureStage::Pose1Captured;
                self.emit_urgent(FRONT_CAPTURED_MESSAGE, now);
                self.listener.on_stage_complete(pose, retry);
                self.scheduler.schedule(now + retry, self.countdown);
            }
            PoseStage::Side => {
                self.stage = CaptureStage::Completed;
                self.scheduler.cancel();
                self.emit_urgent(SIDE_CAPTURED_MESSAGE, now);
                self.listener.on_stage_complete(pose, Duration::ZERO);
            }
        }
    }

    fn emit_status(&mut self, message: &str, now: Instant) {
        if self.sink.is_busy(now) {
            verbose!("Feedback busy, dropped: {message}");
            return;
        }
        self.sink.deliver(Feedback::status(message, now));
    }

    fn emit_urgent(&mut self, message: impl Into<String>, now: Instant) {
        self.sink.deliver(Feedback::urgent(message, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use crate::feedback::{MemorySink, Priority, SpeechPacer};
    use crate::listener::{CaptureEvent, EventLog};
    use crate::test_utils::{PoseSpec, INTRINSICS};
    use crate::validator::Failure;
    use crate::CameraIntrinsics;

    type Sequencer = CaptureSequencer<MemorySink, EventLog>;

    fn sequencer() -> Sequencer {
        CaptureSequencer::new(
            CaptureConfig::new().with_intrinsics(INTRINSICS),
            MemorySink::new(),
            EventLog::new(),
        )
        .unwrap()
    }

    fn at(t0: Instant, secs: f64) -> Instant {
        t0 + Duration::from_secs_f64(secs)
    }

    /// Poll once per second from `from + 1` through `to`.
    fn poll_seconds(seq: &mut Sequencer, t0: Instant, from: u32, to: u32) {
        for s in from + 1..=to {
            assert!(seq.poll(at(t0, f64::from(s))), "no cycle at t+{s}");
        }
    }

    /// Feed a passing front pose until the front capture completes at t+5.
    fn capture_front(seq: &mut Sequencer, t0: Instant) {
        seq.on_frame(PoseSpec::front().frame(), t0);
        poll_seconds(seq, t0, 0, 5);
    }

    #[test]
    fn test_countdown_runs_down_to_capture() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        seq.on_frame(PoseSpec::front().frame(), t0);
        assert_eq!(seq.stage(), CaptureStage::Pose1Countdown);
        assert_eq!(seq.next_deadline(), Some(at(t0, 1.0)));

        // Frames arriving between ticks do not start extra cycles.
        seq.on_frame(PoseSpec::front().frame(), at(t0, 0.5));
        assert!(!seq.poll(at(t0, 0.9)));

        poll_seconds(&mut seq, t0, 0, 5);

        assert_eq!(seq.stage(), CaptureStage::Pose1Captured);
        assert_eq!(seq.listener().countdown(PoseStage::Front), vec![5, 4, 3, 2, 1]);
        assert_eq!(seq.listener().completed(), vec![PoseStage::Front]);
        assert_eq!(
            seq.sink().messages(),
            vec![WELCOME_MESSAGE, "5", "4", "3", "2", "1", FRONT_CAPTURED_MESSAGE]
        );
        let urgent: Vec<_> = seq.sink().deliveries().iter().map(Feedback::is_urgent).collect();
        assert_eq!(urgent, vec![false, true, true, true, true, true, true]);
    }

    #[test]
    fn test_front_capture_never_regresses() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        capture_front(&mut seq, t0);

        // Still facing the camera: the side rules reject it, but the front stage
        // stays captured.
        for s in 6..10 {
            seq.on_frame(PoseSpec::front().frame(), at(t0, f64::from(s) - 0.5));
            assert!(seq.poll(at(t0, f64::from(s))));
            assert_eq!(seq.stage(), CaptureStage::AwaitingPose2);
        }
        assert_eq!(
            seq.sink().messages().last().copied(),
            Some(Failure::NotTurned.message())
        );
        assert_eq!(seq.listener().completed(), vec![PoseStage::Front]);
    }

    #[test]
    fn test_full_session_reaches_completed() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        capture_front(&mut seq, t0);

        seq.on_frame(PoseSpec::side().frame(), at(t0, 5.5));
        poll_seconds(&mut seq, t0, 5, 11);

        assert_eq!(seq.stage(), CaptureStage::Completed);
        assert_eq!(seq.listener().countdown(PoseStage::Side), vec![5, 4, 3, 2, 1]);
        assert_eq!(
            seq.listener().events().last(),
            Some(&CaptureEvent::StageComplete {
                stage: PoseStage::Side,
                next_retry_in: Duration::ZERO,
            })
        );
        assert_eq!(seq.sink().messages().last().copied(), Some(SIDE_CAPTURED_MESSAGE));
        assert_eq!(seq.next_deadline(), None);
    }

    #[test]
    fn test_completed_is_terminal() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        capture_front(&mut seq, t0);
        seq.on_frame(PoseSpec::side().frame(), at(t0, 5.5));
        poll_seconds(&mut seq, t0, 5, 11);
        let events = seq.listener().events().len();

        seq.on_frame(LandmarkFrame::empty(), at(t0, 12.0));
        seq.on_frame(PoseSpec::front().with_distance(9.0).frame(), at(t0, 13.0));
        assert!(!seq.poll(at(t0, 20.0)));

        assert_eq!(seq.stage(), CaptureStage::Completed);
        assert_eq!(seq.next_deadline(), None);
        assert_eq!(seq.listener().events().len(), events);
        let messages = seq.sink().messages();
        assert_eq!(&messages[messages.len() - 2..], [COMPLETED_MESSAGE, COMPLETED_MESSAGE]);
    }

    #[test]
    fn test_fail_restarts_countdown() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        seq.on_frame(PoseSpec::front().frame(), t0);
        assert!(seq.poll(at(t0, 1.0)));

        seq.on_frame(PoseSpec::front().with_distance(7.0).frame(), at(t0, 1.5));
        assert_eq!(seq.stage(), CaptureStage::Pose1Countdown);
        assert!(seq.poll(at(t0, 2.0)));
        assert_eq!(seq.stage(), CaptureStage::Pose1Countdown);
        assert_eq!(seq.countdown(), 5);

        seq.on_frame(PoseSpec::front().frame(), at(t0, 2.5));
        assert!(seq.poll(at(t0, 3.0)));

        assert_eq!(seq.listener().countdown(PoseStage::Front), vec![5, 4, 5]);
        assert!(seq.listener().events().contains(&CaptureEvent::ValidationError {
            stage: PoseStage::Front,
            failure: Failure::TooFar,
            retry_in: Duration::from_secs(1),
        }));
    }

    #[test]
    fn test_fail_keeps_side_countdown_stage() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        capture_front(&mut seq, t0);
        seq.on_frame(PoseSpec::side().frame(), at(t0, 5.5));
        assert!(seq.poll(at(t0, 6.0)));
        assert_eq!(seq.stage(), CaptureStage::Pose2Countdown);

        seq.on_frame(PoseSpec::side().with_distance(3.0).frame(), at(t0, 6.5));
        assert!(seq.poll(at(t0, 7.0)));
        assert_eq!(seq.stage(), CaptureStage::Pose2Countdown);
        assert_eq!(seq.countdown(), 5);
        assert_eq!(seq.sink().messages().last().copied(), Some(Failure::TooClose.message()));
    }

    #[test]
    fn test_lost_subject_restarts_current_stage() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        seq.on_frame(PoseSpec::front().frame(), t0);
        assert!(seq.poll(at(t0, 1.0)));

        seq.on_frame(LandmarkFrame::empty(), at(t0, 1.5));
        assert!(seq.is_subject_lost());
        assert_eq!(seq.next_deadline(), None);
        assert!(!seq.poll(at(t0, 2.0)));

        seq.on_frame(PoseSpec::front().frame(), at(t0, 3.0));
        assert!(!seq.is_subject_lost());
        assert_eq!(seq.listener().countdown(PoseStage::Front), vec![5, 4, 5]);
        assert_eq!(seq.next_deadline(), Some(at(t0, 4.0)));
    }

    #[test]
    fn test_lost_subject_keeps_captured_stage() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        capture_front(&mut seq, t0);

        seq.on_frame(LandmarkFrame::empty(), at(t0, 5.5));
        seq.on_frame(PoseSpec::side().frame(), at(t0, 8.0));

        assert_eq!(seq.stage(), CaptureStage::Pose2Countdown);
        assert_eq!(seq.listener().countdown(PoseStage::Side), vec![5]);
    }

    #[test]
    fn test_welcome_spoken_once() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        seq.on_frame(LandmarkFrame::empty(), t0);
        seq.on_frame(PoseSpec::front().with_distance(2.0).frame(), at(t0, 1.0));
        assert!(seq.poll(at(t0, 2.0)));

        let welcomes = seq
            .sink()
            .messages()
            .iter()
            .filter(|m| **m == WELCOME_MESSAGE)
            .count();
        assert_eq!(welcomes, 1);
        assert_eq!(seq.sink().messages().last().copied(), Some(Failure::TooClose.message()));
    }

    #[test]
    fn test_busy_sink_drops_status_but_not_urgent() {
        let t0 = Instant::now();
        let mut seq = CaptureSequencer::new(
            CaptureConfig::new().with_intrinsics(INTRINSICS),
            MemorySink::paced(SpeechPacer::new(60.0)),
            EventLog::new(),
        )
        .unwrap();

        // The welcome keeps the sink busy for well over a second.
        seq.on_frame(PoseSpec::front().with_distance(7.0).frame(), t0);
        assert_eq!(seq.sink().messages(), vec![WELCOME_MESSAGE]);
        assert_eq!(seq.listener().events().len(), 1);

        seq.on_frame(PoseSpec::front().frame(), at(t0, 0.5));
        assert!(seq.poll(at(t0, 1.0)));
        let last = seq.sink().deliveries().last().unwrap();
        assert_eq!(last.message, "5");
        assert_eq!(last.priority, Priority::Urgent);
    }

    #[test]
    fn test_shutdown_cancels_pending_tick() {
        let t0 = Instant::now();
        let mut seq = sequencer();
        seq.on_frame(PoseSpec::front().frame(), t0);
        seq.shutdown();

        assert!(seq.is_shut_down());
        assert_eq!(seq.next_deadline(), None);
        assert!(!seq.poll(at(t0, 5.0)));
        seq.on_frame(PoseSpec::front().frame(), at(t0, 6.0));

        let (sink, listener) = seq.into_parts();
        assert_eq!(sink.messages(), vec![WELCOME_MESSAGE, "5"]);
        assert_eq!(listener.countdown(PoseStage::Front), vec![5]);
    }

    #[test]
    fn test_custom_countdown_and_delay() {
        let t0 = Instant::now();
        let mut seq = CaptureSequencer::new(
            CaptureConfig::new()
                .with_intrinsics(INTRINSICS)
                .with_countdown(2)
                .with_retry_delay(Duration::from_millis(250)),
            MemorySink::new(),
            EventLog::new(),
        )
        .unwrap();

        seq.on_frame(PoseSpec::front().frame(), t0);
        assert!(seq.poll(at(t0, 0.25)));
        assert!(seq.poll(at(t0, 0.5)));
        assert_eq!(seq.stage(), CaptureStage::Pose1Captured);
        assert_eq!(seq.listener().countdown(PoseStage::Front), vec![2, 1]);
    }

    #[test]
    fn test_missing_intrinsics_fail_fast() {
        let result = Sequencer::new(CaptureConfig::new(), MemorySink::new(), EventLog::new());
        assert!(matches!(result, Err(CaptureError::PreconditionError(_))));

        let broken = CameraIntrinsics::new(0.0, 45.0, 4.0, 720, 1280);
        let result = Sequencer::new(
            CaptureConfig::new().with_intrinsics(broken),
            MemorySink::new(),
            EventLog::new(),
        );
        assert!(matches!(result, Err(CaptureError::PreconditionError(_))));
    }
}
