// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Stage rule pipelines.
//!
//! Each pose has a fixed, ordered list of rules. A validation cycle runs them in
//! order against one [`AnalysisResult`] and stops at the first rule that rejects
//! the pose, so exactly one correction is reported per cycle. When every rule
//! passes, the countdown value decides between [`ValidationOutcome::Countdown`]
//! and [`ValidationOutcome::Complete`].
//!
//! | # | Front pose | Side pose |
//! |---|------------|-----------|
//! | 1 | whole body visible | whole body visible |
//! | 2 | distance >= min | distance >= min |
//! | 3 | distance <= max | turned 90° |
//! | 4 | leg spread >= front min | leg spread <= side max |
//! | 5 | legs straight | hands straight |
//! | 6 | hands straight | legs straight |
//! | 7 | arm raise <= max | |
//! | 8 | arm raise >= min | |

use std::fmt;

use crate::analyzer::{analyzer_for, AnalysisResult, PoseAnalyzer};
use crate::camera::CameraIntrinsics;
use crate::config::ValidationThresholds;
use crate::error::Measure;
use crate::landmark::LandmarkFrame;
use crate::stage::PoseStage;

/// A rule rejection, carrying the correction to give the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Failure {
    /// Not all required joints are confidently in frame.
    BodyNotVisible,
    /// Closer than the minimum distance.
    TooClose,
    /// Further than the maximum distance.
    TooFar,
    /// Feet too close together for the front pose.
    LegsTooClose,
    /// Feet too far apart for the side pose.
    LegsNotTogether,
    /// A knee is bent.
    LegsNotStraight,
    /// An elbow is bent.
    HandsNotStraight,
    /// Arms raised above the window.
    LowerHands,
    /// Arms raised below the window.
    RaiseHands,
    /// Not standing side-on.
    NotTurned,
}

impl Failure {
    /// Spoken correction for this failure.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BodyNotVisible => {
                "Your full body is not visible in the camera screen. Please step back."
            }
            Self::TooClose => {
                "You are standing too close to the device. Maintain a distance of 5-6 feet from the camera."
            }
            Self::TooFar => {
                "You are too far from the device. Stand closer to the camera within the 5-6 feet range."
            }
            Self::LegsTooClose => {
                "Legs are too close together. Please spread your legs apart by approximately 1 foot."
            }
            Self::LegsNotTogether => "Legs are not close together. Please keep your legs close.",
            Self::LegsNotStraight => {
                "Legs are not straight. Please straighten both legs, ensuring no bending at the knees."
            }
            Self::HandsNotStraight => "The hands are not straight. Please straighten both hands.",
            Self::LowerHands => {
                "Hands are not at a 45-degree angle. Please lower hands slightly."
            }
            Self::RaiseHands => {
                "Hands are not at a 45-degree angle. Please raise hands slightly."
            }
            Self::NotTurned => "Please make sure you have turned 90 degree angle",
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of one validation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// A rule rejected the pose.
    Fail(Failure),
    /// All rules pass; this many ticks remain before capture.
    Countdown(u32),
    /// All rules pass and the countdown has run out.
    Complete,
}

impl ValidationOutcome {
    /// Returns `true` unless a rule rejected the pose.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        !matches!(self, Self::Fail(_))
    }
}

/// One step of a pipeline. `Ok(None)` means the rule passes.
pub type Rule = fn(&AnalysisResult, &ValidationThresholds) -> Measure<Option<Failure>>;

const fn reject_if(condition: bool, failure: Failure) -> Option<Failure> {
    if condition {
        Some(failure)
    } else {
        None
    }
}

fn body_visible(a: &AnalysisResult, _: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(!a.whole_body_visible, Failure::BodyNotVisible))
}

fn not_too_close(a: &AnalysisResult, t: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(a.camera_distance_ft? < t.min_distance_ft, Failure::TooClose))
}

fn not_too_far(a: &AnalysisResult, t: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(a.camera_distance_ft? > t.max_distance_ft, Failure::TooFar))
}

fn legs_apart(a: &AnalysisResult, t: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(a.inter_leg_distance? < t.min_front_leg_spread, Failure::LegsTooClose))
}

fn legs_together(a: &AnalysisResult, t: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(a.inter_leg_distance? > t.max_side_leg_spread, Failure::LegsNotTogether))
}

fn legs_straight(a: &AnalysisResult, _: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(!a.legs_straight?, Failure::LegsNotStraight))
}

fn hands_straight(a: &AnalysisResult, _: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(!a.hands_straight?, Failure::HandsNotStraight))
}

fn arms_not_too_high(a: &AnalysisResult, t: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(a.body_alignment?.any_above(t.max_arm_raise_deg), Failure::LowerHands))
}

fn arms_not_too_low(a: &AnalysisResult, t: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(a.body_alignment?.any_below(t.min_arm_raise_deg), Failure::RaiseHands))
}

fn turned(a: &AnalysisResult, _: &ValidationThresholds) -> Measure<Option<Failure>> {
    Ok(reject_if(!a.turned_90_degrees?, Failure::NotTurned))
}

/// Front pose rules, in evaluation order.
pub const FRONT_RULES: [Rule; 8] = [
    body_visible,
    not_too_close,
    not_too_far,
    legs_apart,
    legs_straight,
    hands_straight,
    arms_not_too_high,
    arms_not_too_low,
];

/// Side pose rules, in evaluation order. There is no upper distance bound.
pub const SIDE_RULES: [Rule; 6] = [
    body_visible,
    not_too_close,
    turned,
    legs_together,
    hands_straight,
    legs_straight,
];

/// Validator for one pose.
///
/// The analyzer variant is chosen once, at construction, from the pose stage.
pub struct StageValidator {
    analyzer: Box<dyn PoseAnalyzer>,
    thresholds: ValidationThresholds,
}

impl fmt::Debug for StageValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageValidator")
            .field("stage", &self.stage())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl StageValidator {
    /// Create a validator for `stage`.
    #[must_use]
    pub fn new(
        stage: PoseStage,
        intrinsics: CameraIntrinsics,
        thresholds: ValidationThresholds,
    ) -> Self {
        Self {
            analyzer: analyzer_for(stage, intrinsics),
            thresholds,
        }
    }

    /// Pose this validator checks.
    #[must_use]
    pub fn stage(&self) -> PoseStage {
        self.analyzer.stage()
    }

    /// The analyzer behind this validator.
    #[must_use]
    pub fn analyzer(&self) -> &dyn PoseAnalyzer {
        self.analyzer.as_ref()
    }

    /// Rules for this validator's pose, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &'static [Rule] {
        match self.stage() {
            PoseStage::Front => &FRONT_RULES,
            PoseStage::Side => &SIDE_RULES,
        }
    }

    /// Analyze a frame and evaluate it.
    #[must_use]
    pub fn check(&self, frame: &LandmarkFrame, countdown: u32) -> ValidationOutcome {
        self.evaluate(&self.analyzer.analyze(frame), countdown)
    }

    /// Evaluate an analysis with the given countdown value.
    ///
    /// A rule whose measurement is missing a joint rejects the pose as not fully
    /// visible.
    #[must_use]
    pub fn evaluate(&self, analysis: &AnalysisResult, countdown: u32) -> ValidationOutcome {
        for rule in self.rules() {
            match rule(analysis, &self.thresholds) {
                Ok(None) => {}
                Ok(Some(failure)) => return ValidationOutcome::Fail(failure),
                Err(missing) => {
                    crate::verbose!("{} pose: {missing}", analysis.stage);
                    return ValidationOutcome::Fail(Failure::BodyNotVisible);
                }
            }
        }

        if countdown > 0 {
            ValidationOutcome::Countdown(countdown)
        } else {
            ValidationOutcome::Complete
        }
    }
}
