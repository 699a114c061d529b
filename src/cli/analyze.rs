// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::collections::HashMap;

use colored::Colorize;
use pose_capture::logging::set_verbose;
use pose_capture::{
    info, section, AnalysisResult, CaptureError, Failure, Measure, Result, Source,
    StageValidator, ValidationOutcome, ValidationThresholds,
};

use crate::cli::args::AnalyzeArgs;

fn number(value: Measure<f64>) -> String {
    value.map_or_else(|_| "-".to_string(), |v| format!("{v:.1}"))
}

fn flag(value: &Measure<bool>) -> &'static str {
    match value {
        Ok(true) => "yes",
        Ok(false) => "no",
        Err(_) => "-",
    }
}

fn describe(analysis: &AnalysisResult) -> String {
    let arms = analysis.body_alignment.map_or_else(
        |_| "-".to_string(),
        |a| format!("{:.1}/{:.1}", a.left, a.right),
    );
    format!(
        "joints {:>2}  visible {:<3}  dist {:>5}ft  legs {:>6}  arms {:>11}  hands {:<3}  knees {:<3}  turned {:<3}",
        analysis.landmark_count,
        if analysis.whole_body_visible { "yes" } else { "no" },
        number(analysis.camera_distance_ft),
        number(analysis.inter_leg_distance),
        arms,
        flag(&analysis.hands_straight),
        flag(&analysis.legs_straight),
        flag(&analysis.turned_90_degrees),
    )
}

/// Print the measurements and rule outcome of every frame for one pose.
///
/// # Errors
///
/// Fails if the camera intrinsics or thresholds are missing or invalid, and on
/// unreadable or malformed recordings.
pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    set_verbose(args.verbose);

    let intrinsics = args.camera.intrinsics().ok_or_else(|| {
        CaptureError::PreconditionError(
            "camera intrinsics are not available; pass --hfov, --vfov, --focal, --width and --height"
                .to_string(),
        )
    })?;
    intrinsics.validate()?;
    let thresholds =
        ValidationThresholds::default().with_arm_raise(args.min_raise, args.max_raise);
    thresholds.validate()?;

    let validator = StageValidator::new(args.stage, intrinsics, thresholds);
    let source = Source::from(args.frames.as_str());
    section!("Analyzing {} as the {} pose", source.name(), args.stage);

    let mut total = 0usize;
    let mut passing = 0usize;
    let mut failures: HashMap<Failure, usize> = HashMap::new();

    for (idx, frame) in source.open()?.enumerate() {
        let frame = frame?;
        let analysis = validator.analyzer().analyze(&frame);
        let outcome = match validator.evaluate(&analysis, 1) {
            ValidationOutcome::Fail(failure) => {
                *failures.entry(failure).or_default() += 1;
                format!("{failure:?}").red()
            }
            ValidationOutcome::Countdown(_) | ValidationOutcome::Complete => {
                passing += 1;
                "pass".green()
            }
        };
        total += 1;
        info!("{idx:>5}  {}  {outcome}", describe(&analysis));
    }

    info!("\n{total} frames, {passing} passing");
    let mut failures: Vec<_> = failures.into_iter().collect();
    failures.sort_by(|a, b| b.1.cmp(&a.1));
    for (failure, count) in failures {
        info!("{count:>7}  {failure:?}: {}", failure.message().dimmed());
    }
    Ok(())
}
