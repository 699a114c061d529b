// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::time::Duration;

use pose_capture::logging::set_verbose;
use pose_capture::{
    info, section, success, verbose, warn, CaptureError, CaptureListener, CaptureSequencer,
    ConsoleSink, Failure, FeedbackSink, PoseStage, Result, Source, SpeechPacer,
};
use tokio::time::Instant;

use crate::cli::args::ReplayArgs;

/// Prints capture events next to the spoken feedback.
#[derive(Debug, Default)]
struct ConsoleListener {
    captured: Vec<PoseStage>,
}

impl CaptureListener for ConsoleListener {
    fn on_validation_error(&mut self, stage: PoseStage, failure: Failure, retry_in: Duration) {
        verbose!("{stage}: {failure:?}, retrying in {retry_in:?}");
    }

    fn on_stage_complete(&mut self, stage: PoseStage, _next_retry_in: Duration) {
        success!("Pose {} ({stage}) captured", stage.number());
        self.captured.push(stage);
    }
}

/// Run every tick due up to `now`, each at its own deadline.
fn drain_ticks<S: FeedbackSink, L: CaptureListener>(
    sequencer: &mut CaptureSequencer<S, L>,
    now: Instant,
) {
    while let Some(due) = sequencer.next_deadline().filter(|due| *due <= now) {
        sequencer.poll(due);
    }
}

/// Time between two recorded frames.
fn frame_interval(fps: f64) -> Result<Duration> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(CaptureError::ConfigError(format!("fps must be positive, got {fps}")));
    }
    Duration::try_from_secs_f64(1.0 / fps)
        .map_err(|e| CaptureError::ConfigError(format!("fps {fps} is out of range: {e}")))
}

/// Replay a recording through the capture flow on a virtual clock.
///
/// # Errors
///
/// Fails before reading any frame if the camera intrinsics are missing or
/// invalid, and on unreadable or malformed recordings.
pub fn run_replay(args: &ReplayArgs) -> Result<()> {
    set_verbose(args.verbose);

    let frame_interval = frame_interval(args.fps)?;
    if !args.speech_wpm.is_finite() || args.speech_wpm < 0.0 {
        return Err(CaptureError::ConfigError(format!(
            "speech rate must be a non-negative number, got {}",
            args.speech_wpm
        )));
    }

    let sink = ConsoleSink::new(SpeechPacer::new(args.speech_wpm));
    let mut sequencer = CaptureSequencer::new(args.config(), sink, ConsoleListener::default())?;

    let source = Source::from(args.frames.as_str());
    section!("Replaying {} at {} fps", source.name(), args.fps);

    let start = Instant::now();
    let mut now = start;
    let mut frames = source.open()?;
    for frame in frames.by_ref() {
        let frame = frame?;
        drain_ticks(&mut sequencer, now);
        sequencer.on_frame(frame, now);
        now = now.checked_add(frame_interval).ok_or_else(|| {
            CaptureError::ConfigError("recording is too long for the frame rate".to_string())
        })?;
    }
    sequencer.shutdown();

    let stage = sequencer.stage();
    let (_, listener) = sequencer.into_parts();
    info!(
        "{} frames, {:.1}s of recording",
        frames.frames_read(),
        (now - start).as_secs_f64()
    );
    if stage.is_terminal() {
        success!("Both poses captured");
    } else {
        warn!(
            "Recording ended in stage '{stage}' with {} of 2 poses captured",
            listener.captured.len()
        );
    }
    Ok(())
}
