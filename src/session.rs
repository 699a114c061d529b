// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Background capture session on the tokio runtime.
//!
//! [`spawn`] moves a [`CaptureSequencer`] onto its own task. Frames are published
//! through a `watch` channel, so a slow cycle only ever sees the most recent
//! frame. The task sleeps until the sequencer's next deadline and stops as soon
//! as [`SessionHandle::shutdown`] is called; cancellation is checked before
//! anything else on every iteration, so a cancelled tick never runs.
//!
//! ```no_run
//! # async fn demo(frame: pose_capture::LandmarkFrame) -> pose_capture::Result<()> {
//! use pose_capture::{session, CameraIntrinsics, CaptureConfig, CaptureSequencer, ConsoleSink};
//!
//! let config = CaptureConfig::new()
//!     .with_intrinsics(CameraIntrinsics::new(66.0, 51.0, 4.2, 720, 1280));
//! let handle = session::spawn(CaptureSequencer::new(config, ConsoleSink::default(), ())?);
//!
//! handle.push_frame(frame)?;
//! let sequencer = handle.shutdown().await?;
//! println!("stopped in stage: {}", sequencer.stage());
//! # Ok(())
//! # }
//! ```

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::error::{CaptureError, Result};
use crate::feedback::FeedbackSink;
use crate::landmark::LandmarkFrame;
use crate::listener::CaptureListener;
use crate::sequencer::CaptureSequencer;

/// Handle to a running capture session.
#[derive(Debug)]
pub struct SessionHandle<S, L> {
    frames: watch::Sender<Option<LandmarkFrame>>,
    cancel: oneshot::Sender<()>,
    task: JoinHandle<CaptureSequencer<S, L>>,
}

/// Start driving `sequencer` on a new tokio task.
///
/// Must be called from within a tokio runtime.
pub fn spawn<S, L>(sequencer: CaptureSequencer<S, L>) -> SessionHandle<S, L>
where
    S: FeedbackSink + Send + 'static,
    L: CaptureListener + Send + 'static,
{
    let (frames, frame_rx) = watch::channel(None);
    let (cancel, cancel_rx) = oneshot::channel();
    let task = tokio::spawn(run(sequencer, frame_rx, cancel_rx));

    SessionHandle {
        frames,
        cancel,
        task,
    }
}

impl<S, L> SessionHandle<S, L> {
    /// Publish the latest frame, replacing any frame not yet picked up.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::SessionError`] if the session task has stopped.
    pub fn push_frame(&self, frame: LandmarkFrame) -> Result<()> {
        self.frames
            .send(Some(frame))
            .map_err(|_| CaptureError::SessionError("capture session has stopped".to_string()))
    }

    /// Whether the session task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the session, cancelling any pending tick, and return the sequencer.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::SessionError`] if the session task panicked.
    pub async fn shutdown(self) -> Result<CaptureSequencer<S, L>> {
        // The task may already be gone; joining reports that.
        let _ = self.cancel.send(());
        self.task
            .await
            .map_err(|err| CaptureError::SessionError(err.to_string()))
    }
}

async fn run<S, L>(
    mut sequencer: CaptureSequencer<S, L>,
    mut frames: watch::Receiver<Option<LandmarkFrame>>,
    mut cancel: oneshot::Receiver<()>,
) -> CaptureSequencer<S, L>
where
    S: FeedbackSink,
    L: CaptureListener,
{
    loop {
        let deadline = sequencer.next_deadline();
        tokio::select! {
            biased;

            _ = &mut cancel => break,
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                if let Some(frame) = frame {
                    sequencer.on_frame(frame, Instant::now());
                }
            }
            () = sleep_until_deadline(deadline) => {
                sequencer.poll(Instant::now());
            }
        }
    }

    sequencer.shutdown();
    sequencer
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
