// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use pose_capture::{CameraIntrinsics, CaptureConfig, PoseStage, ValidationThresholds};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Camera Options (required by every command):
    --hfov <DEG>       Horizontal field of view in degrees
    --vfov <DEG>       Vertical field of view in degrees
    --focal <MM>       Focal length in millimeters
    --width <PX>       Frame width in pixels
    --height <PX>      Frame height in pixels

Examples:
    pose-capture replay --frames session.jsonl --hfov 66 --vfov 51 --focal 4.2 --width 720 --height 1280
    pose-capture replay -f - --hfov 66 --vfov 51 --focal 4.2 --width 720 --height 1280 --fps 15 --verbose
    pose-capture replay -f session.jsonl --hfov 66 --vfov 51 --focal 4.2 --width 720 --height 1280 --min-raise 35 --max-raise 55
    pose-capture analyze -f session.jsonl --stage side --hfov 66 --vfov 51 --focal 4.2 --width 720 --height 1280"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a landmark recording through the two-pose capture flow
    Replay(ReplayArgs),
    /// Print per-frame measurements and the rule outcome for one pose
    Analyze(AnalyzeArgs),
}

/// Camera intrinsics flags. All five are needed; a missing one is reported when
/// the command starts.
#[derive(Args, Debug, Clone, Default)]
pub struct CameraArgs {
    /// Horizontal field of view in degrees
    #[arg(long)]
    pub hfov: Option<f64>,

    /// Vertical field of view in degrees
    #[arg(long)]
    pub vfov: Option<f64>,

    /// Focal length in millimeters
    #[arg(long)]
    pub focal: Option<f64>,

    /// Frame width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

impl CameraArgs {
    /// Intrinsics, if every flag was given.
    #[must_use]
    pub fn intrinsics(&self) -> Option<CameraIntrinsics> {
        Some(CameraIntrinsics::new(
            self.hfov?,
            self.vfov?,
            self.focal?,
            self.width?,
            self.height?,
        ))
    }
}

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON-lines landmark recording, or `-` for stdin
    #[arg(short, long)]
    pub frames: String,

    #[command(flatten)]
    pub camera: CameraArgs,

    /// Frame rate the recording was captured at
    #[arg(long, default_value_t = 30.0)]
    pub fps: f64,

    /// Countdown start value for each pose
    #[arg(long, default_value_t = 5)]
    pub countdown: u32,

    /// Delay between validation cycles in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Lowest accepted arm raise in degrees
    #[arg(long, default_value_t = 40.0)]
    pub min_raise: f64,

    /// Highest accepted arm raise in degrees
    #[arg(long, default_value_t = 50.0)]
    pub max_raise: f64,

    /// Speech rate used to pace feedback, in words per minute (0 disables pacing)
    #[arg(long, default_value_t = 150.0)]
    pub speech_wpm: f64,

    /// Show verbose output
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl ReplayArgs {
    /// Session configuration from the flags. Intrinsics stay unset if any camera
    /// flag is missing.
    #[must_use]
    pub fn config(&self) -> CaptureConfig {
        let config = CaptureConfig::new()
            .with_countdown(self.countdown)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
            .with_thresholds(
                ValidationThresholds::default().with_arm_raise(self.min_raise, self.max_raise),
            );
        match self.camera.intrinsics() {
            Some(intrinsics) => config.with_intrinsics(intrinsics),
            None => config,
        }
    }
}

/// Arguments for the analyze command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON-lines landmark recording, or `-` for stdin
    #[arg(short, long)]
    pub frames: String,

    /// Pose to evaluate (front, side)
    #[arg(long, default_value = "front")]
    pub stage: PoseStage,

    #[command(flatten)]
    pub camera: CameraArgs,

    /// Lowest accepted arm raise in degrees
    #[arg(long, default_value_t = 40.0)]
    pub min_raise: f64,

    /// Highest accepted arm raise in degrees
    #[arg(long, default_value_t = 50.0)]
    pub max_raise: f64,

    /// Show verbose output
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}
