// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # Pose Capture
//!
//! Two-stage body pose validation and capture sequencing from body-landmark
//! frames.
//!
//! A subject stands in front of a phone camera and is guided, by spoken
//! corrections and a countdown, into two poses: first facing the camera with
//! feet apart and arms raised about 45 degrees, then turned 90 degrees with feet
//! together. This crate is the decision core. It consumes per-frame body
//! landmarks from any 33-joint (`BlazePose` layout) detector and decides, once per
//! retry interval, whether the pose holds, which correction to give if it does
//! not, and when each pose is captured.
//!
//! ## Features
//!
//! - **Pure geometry** - Joint angles, camera distance from eye separation, leg
//!   spread, visibility and rotation checks over a single frame
//! - **Ordered rules** - Each pose has a fixed rule order; the first failing rule
//!   decides the correction
//! - **State machine** - Countdown, capture, stage transition and subject-lost
//!   handling with a single cancellable pending tick
//! - **Feedback classes** - Status messages yield to busy speech output, urgent
//!   ones always go through
//! - **Async session** - Optional tokio task driving the state machine from a
//!   frame channel
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use pose_capture::{
//!     CameraIntrinsics, CaptureConfig, CaptureSequencer, FrameReader, MemorySink,
//! };
//! use tokio::time::Instant;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CaptureConfig::new()
//!         .with_intrinsics(CameraIntrinsics::new(66.0, 51.0, 4.2, 720, 1280));
//!     let mut sequencer = CaptureSequencer::new(config, MemorySink::new(), ())?;
//!
//!     let start = Instant::now();
//!     for (i, frame) in FrameReader::open("session.jsonl")?.enumerate() {
//!         let now = start + Duration::from_millis(33 * i as u64);
//!         sequencer.poll(now);
//!         sequencer.on_frame(frame?, now);
//!     }
//!
//!     for message in sequencer.sink().messages() {
//!         println!("{message}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Replay a recording through the full capture flow
//! pose-capture replay --frames session.jsonl --hfov 66 --vfov 51 --focal 4.2 --width 720 --height 1280
//!
//! # Inspect per-frame measurements for one pose
//! pose-capture analyze --frames session.jsonl --stage side --hfov 66 --vfov 51 --focal 4.2 --width 720 --height 1280
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`landmark`] | Joint types and frames ([`LandmarkType`], [`LandmarkFrame`]) |
//! | [`camera`] | Camera intrinsics ([`CameraIntrinsics`]) |
//! | [`geometry`] | 2-D points and angle helpers |
//! | [`analyzer`] | Per-pose measurements ([`FrontAnalyzer`], [`SideAnalyzer`]) |
//! | [`validator`] | Ordered rule pipelines ([`StageValidator`], [`ValidationOutcome`]) |
//! | [`sequencer`] | Capture state machine ([`CaptureSequencer`]) |
//! | [`scheduler`] | Single pending validation tick ([`TickScheduler`]) |
//! | [`feedback`] | Feedback sinks ([`ConsoleSink`], [`MemorySink`]) |
//! | [`listener`] | Outward capture events ([`CaptureListener`]) |
//! | [`session`] | Tokio task driving a sequencer |
//! | [`source`] | JSON-lines recordings ([`FrameReader`]) |
//! | [`stage`] | Pose and workflow stages ([`PoseStage`], [`CaptureStage`]) |
//! | [`config`] | Session configuration ([`CaptureConfig`], [`ValidationThresholds`]) |
//! | [`error`] | Error types ([`CaptureError`], [`Result`]) |
//!
//! ## License
//!
//! This project is licensed under [AGPL-3.0](https://ultralytics.com/license).

// Modules
pub mod analyzer;
pub mod camera;
pub mod config;
pub mod error;
pub mod feedback;
pub mod geometry;
pub mod landmark;
pub mod listener;
pub mod logging;
pub mod scheduler;
pub mod sequencer;
pub mod session;
pub mod source;
pub mod stage;
pub mod validator;

#[cfg(test)]
mod test_utils;

// Re-export main types for convenience
pub use analyzer::{AnalysisResult, BodyAlignment, FrontAnalyzer, PoseAnalyzer, SideAnalyzer};
pub use camera::CameraIntrinsics;
pub use config::{CaptureConfig, ValidationThresholds};
pub use error::{CaptureError, Measure, MissingLandmark, Result};
pub use feedback::{ConsoleSink, Feedback, FeedbackSink, MemorySink, Priority, SpeechPacer};
pub use landmark::{Landmark, LandmarkFrame, LandmarkType};
pub use listener::{CaptureEvent, CaptureListener, EventLog};
pub use scheduler::TickScheduler;
pub use sequencer::CaptureSequencer;
pub use session::SessionHandle;
pub use source::{FrameReader, Source};
pub use stage::{CaptureStage, PoseStage};
pub use validator::{Failure, StageValidator, ValidationOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pose-capture");
    }
}
