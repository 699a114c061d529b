// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Geometric pose analysis.
//!
//! An analyzer turns one [`LandmarkFrame`] into the measurements the stage rules
//! check: joint angles, camera distance, leg spread, visibility and rotation.
//! Analyzers hold no state besides the session's [`CameraIntrinsics`], so the same
//! frame always produces the same [`AnalysisResult`].
//!
//! | Measurement | [`FrontAnalyzer`] | [`SideAnalyzer`] |
//! |-------------|-------------------|------------------|
//! | Straight arms | elbow angle in [160, 180] | elbow angle in [150, 180] |
//! | Straight legs | knee angle in [160, 180] | knee angle in [160, 180] |
//! | Leg spread | ankle pixel distance, feet-scaled | signed 3-D x difference of ankles |
//! | Arm raise | signed deviation per side | not measured (0, 0) |
//! | Turned 90° | always `false` | shoulders stacked |

use std::ops::RangeInclusive;

use crate::camera::CameraIntrinsics;
use crate::error::Measure;
use crate::geometry::vertex_angle;
use crate::landmark::{LandmarkFrame, LandmarkType};
use crate::stage::PoseStage;

pub mod body;
pub mod front;
pub mod side;

pub use body::BodySide;
pub use front::FrontAnalyzer;
pub use side::SideAnalyzer;

/// Confidence a joint must exceed to count as visible.
pub const VISIBILITY_THRESHOLD: f32 = 0.7;

/// Average adult inter-pupil distance, in millimeters.
pub const AVERAGE_EYE_DISTANCE_MM: f64 = 63.0;

/// Millimeters per foot.
pub const MM_PER_FOOT: f64 = 304.8;

/// Joints that must all be confidently visible for the whole body to be in frame.
pub const VISIBILITY_LANDMARKS: [LandmarkType; 8] = [
    LandmarkType::LeftEye,
    LandmarkType::RightEye,
    LandmarkType::LeftEar,
    LandmarkType::RightEar,
    LandmarkType::LeftFootIndex,
    LandmarkType::RightFootIndex,
    LandmarkType::LeftWrist,
    LandmarkType::RightWrist,
];

/// Arm-raise angle on each side of the body, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyAlignment {
    pub left: f64,
    pub right: f64,
}

impl BodyAlignment {
    /// Returns `true` when either side exceeds `limit`.
    #[must_use]
    pub fn any_above(&self, limit: f64) -> bool {
        self.left > limit || self.right > limit
    }

    /// Returns `true` when either side is below `limit`.
    #[must_use]
    pub fn any_below(&self, limit: f64) -> bool {
        self.left < limit || self.right < limit
    }
}

/// Everything an analyzer measured on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Pose the analyzer was built for.
    pub stage: PoseStage,
    /// Number of joints present in the frame.
    pub landmark_count: usize,
    /// All eight visibility joints present and confident.
    pub whole_body_visible: bool,
    /// Arm-raise angles.
    pub body_alignment: Measure<BodyAlignment>,
    /// Estimated camera-to-subject distance in feet.
    pub camera_distance_ft: Measure<f64>,
    /// Leg spread, in the stage's own units.
    pub inter_leg_distance: Measure<f64>,
    /// Both elbows inside the stage's straight-arm window.
    pub hands_straight: Measure<bool>,
    /// Both knees inside the stage's straight-leg window.
    pub legs_straight: Measure<bool>,
    /// Shoulders stacked as in a side-on stance.
    pub turned_90_degrees: Measure<bool>,
}

/// Per-pose geometric analysis.
pub trait PoseAnalyzer: Send + Sync {
    /// Pose this analyzer measures.
    fn stage(&self) -> PoseStage;

    /// Session camera intrinsics.
    fn intrinsics(&self) -> &CameraIntrinsics;

    /// Accepted shoulder-elbow-wrist angles.
    fn hands_window(&self) -> RangeInclusive<f64>;

    /// Accepted hip-knee-ankle angles.
    fn legs_window(&self) -> RangeInclusive<f64>;

    /// Arm-raise angle per side. Poses that do not constrain arm raise report zero.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MissingLandmark`] if a wrist, shoulder, hip or ankle is absent.
    fn body_alignment(&self, frame: &LandmarkFrame) -> Measure<BodyAlignment>;

    /// Leg spread given the already estimated camera distance.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MissingLandmark`] if an ankle (or its depth) is absent.
    fn inter_leg_distance(&self, frame: &LandmarkFrame, camera_distance_ft: f64) -> Measure<f64>;

    /// Whether the subject stands side-on to the camera.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MissingLandmark`] if a shoulder is absent.
    fn turned_90_degrees(&self, frame: &LandmarkFrame) -> Measure<bool>;

    /// Estimated camera-to-subject distance in feet.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MissingLandmark`] if an eye is absent.
    fn camera_distance(&self, frame: &LandmarkFrame) -> Measure<f64> {
        camera_distance_ft(frame, self.intrinsics())
    }

    /// Whether the whole body is confidently in frame.
    fn whole_body_visible(&self, frame: &LandmarkFrame) -> bool {
        whole_body_visible(frame)
    }

    /// Whether both arms are straight.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MissingLandmark`] if an arm joint is absent.
    fn hands_straight(&self, frame: &LandmarkFrame) -> Measure<bool> {
        limbs_within(frame, BodySide::arm, &self.hands_window())
    }

    /// Whether both legs are straight.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MissingLandmark`] if a leg joint is absent.
    fn legs_straight(&self, frame: &LandmarkFrame) -> Measure<bool> {
        limbs_within(frame, BodySide::leg, &self.legs_window())
    }

    /// Run every measurement on a frame.
    fn analyze(&self, frame: &LandmarkFrame) -> AnalysisResult {
        let camera_distance_ft = self.camera_distance(frame);
        let inter_leg_distance =
            camera_distance_ft.and_then(|distance| self.inter_leg_distance(frame, distance));

        AnalysisResult {
            stage: self.stage(),
            landmark_count: frame.len(),
            whole_body_visible: self.whole_body_visible(frame),
            body_alignment: self.body_alignment(frame),
            camera_distance_ft,
            inter_leg_distance,
            hands_straight: self.hands_straight(frame),
            legs_straight: self.legs_straight(frame),
            turned_90_degrees: self.turned_90_degrees(frame),
        }
    }
}

/// Build the analyzer for a pose.
#[must_use]
pub fn analyzer_for(stage: PoseStage, intrinsics: CameraIntrinsics) -> Box<dyn PoseAnalyzer> {
    match stage {
        PoseStage::Front => Box::new(FrontAnalyzer::new(intrinsics)),
        PoseStage::Side => Box::new(SideAnalyzer::new(intrinsics)),
    }
}

/// Angle at joint `b` formed with joints `a` and `c`, folded into `[0, 180]` degrees.
///
/// # Errors
///
/// Returns [`crate::MissingLandmark`] for the first of the three joints that is absent.
pub fn acute_angle(
    frame: &LandmarkFrame,
    a: LandmarkType,
    b: LandmarkType,
    c: LandmarkType,
) -> Measure<f64> {
    let a = frame.require(a)?.position;
    let b = frame.require(b)?.position;
    let c = frame.require(c)?.position;
    Ok(vertex_angle(a, b, c))
}

/// Estimate the camera-to-subject distance in feet from the eye separation.
///
/// The eye separation is measured along whichever image axis shows the larger
/// pixel difference, and back-projected through that axis' sensor extent
/// assuming [`AVERAGE_EYE_DISTANCE_MM`] between the eyes. Coinciding eyes give an
/// infinite distance.
///
/// # Errors
///
/// Returns [`crate::MissingLandmark`] if either eye is absent.
pub fn camera_distance_ft(frame: &LandmarkFrame, intrinsics: &CameraIntrinsics) -> Measure<f64> {
    let left = frame.require(LandmarkType::LeftEye)?.position;
    let right = frame.require(LandmarkType::RightEye)?.position;

    let dx = (f64::from(left.x) - f64::from(right.x)).abs();
    let dy = (f64::from(left.y) - f64::from(right.y)).abs();
    let (sensor_x, sensor_y) = intrinsics.sensor_extent_mm();
    let focal = intrinsics.focal_length_mm;

    let distance_mm = if dx >= dy {
        focal * (AVERAGE_EYE_DISTANCE_MM / sensor_x) * (f64::from(intrinsics.frame_width) / dx)
    } else {
        focal * (AVERAGE_EYE_DISTANCE_MM / sensor_y) * (f64::from(intrinsics.frame_height) / dy)
    };

    Ok(distance_mm / MM_PER_FOOT)
}

/// Whether all [`VISIBILITY_LANDMARKS`] are present with confidence above
/// [`VISIBILITY_THRESHOLD`].
#[must_use]
pub fn whole_body_visible(frame: &LandmarkFrame) -> bool {
    VISIBILITY_LANDMARKS.iter().all(|kind| {
        frame
            .get(*kind)
            .is_some_and(|landmark| landmark.is_confident(VISIBILITY_THRESHOLD))
    })
}

fn limbs_within(
    frame: &LandmarkFrame,
    chain: fn(BodySide) -> [LandmarkType; 3],
    window: &RangeInclusive<f64>,
) -> Measure<bool> {
    for side in BodySide::BOTH {
        let [a, b, c] = chain(side);
        if !window.contains(&acute_angle(frame, a, b, c)?) {
            return Ok(false);
        }
    }
    Ok(true)
}
