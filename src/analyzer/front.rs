// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Front-facing pose: feet apart, arms straight and raised away from the body.

use std::ops::RangeInclusive;

use super::{BodyAlignment, BodySide, PoseAnalyzer};
use crate::camera::CameraIntrinsics;
use crate::error::Measure;
use crate::geometry::heading_difference;
use crate::landmark::{LandmarkFrame, LandmarkType};
use crate::stage::PoseStage;

/// Reference ankle separation, in feet, that the pixel spread is scaled by.
pub const LEG_SPREAD_BASELINE_FT: f64 = 0.206;

/// Analyzer for the first, front-facing pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontAnalyzer {
    intrinsics: CameraIntrinsics,
}

impl FrontAnalyzer {
    #[must_use]
    pub const fn new(intrinsics: CameraIntrinsics) -> Self {
        Self { intrinsics }
    }

    /// Arm-raise angle for one side.
    ///
    /// Compares the heading of the shoulder → wrist ray against the heading of the
    /// ankle → hip ray, normalizes the difference into `[0, 360)`, then folds it per
    /// side (see [`BodySide::fold_alignment`]).
    ///
    /// # Errors
    ///
    /// Returns [`crate::MissingLandmark`] if a wrist, shoulder, hip or ankle is absent.
    pub fn side_alignment(&self, frame: &LandmarkFrame, side: BodySide) -> Measure<f64> {
        let [wrist, shoulder, hip, ankle] = side.trunk();
        let wrist = frame.require(wrist)?.position;
        let shoulder = frame.require(shoulder)?.position;
        let hip = frame.require(hip)?.position;
        let ankle = frame.require(ankle)?.position;

        let angle = heading_difference((shoulder, wrist), (ankle, hip));
        Ok(side.fold_alignment(angle))
    }
}

impl PoseAnalyzer for FrontAnalyzer {
    fn stage(&self) -> PoseStage {
        PoseStage::Front
    }

    fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    fn hands_window(&self) -> RangeInclusive<f64> {
        160.0..=180.0
    }

    fn legs_window(&self) -> RangeInclusive<f64> {
        160.0..=180.0
    }

    fn body_alignment(&self, frame: &LandmarkFrame) -> Measure<BodyAlignment> {
        Ok(BodyAlignment {
            left: self.side_alignment(frame, BodySide::Left)?,
            right: self.side_alignment(frame, BodySide::Right)?,
        })
    }

    /// Pixel distance between the ankles, scaled to feet through the camera distance.
    fn inter_leg_distance(&self, frame: &LandmarkFrame, camera_distance_ft: f64) -> Measure<f64> {
        let left = frame.require(LandmarkType::LeftAnkle)?.position;
        let right = frame.require(LandmarkType::RightAnkle)?.position;
        let pixels = left.distance(right);

        let pixels_per_foot = camera_distance_ft / LEG_SPREAD_BASELINE_FT;
        Ok(pixels * (camera_distance_ft / pixels_per_foot))
    }

    /// Rotation is not checked before the first capture.
    fn turned_90_degrees(&self, _frame: &LandmarkFrame) -> Measure<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MissingLandmark;
    use crate::landmark::Landmark;

    fn intrinsics() -> CameraIntrinsics {
        CameraIntrinsics::new(60.0, 45.0, 4.0, 720, 1280)
    }

    fn arms_at(raise_deg: f32) -> LandmarkFrame {
        // Left side sits at larger x; y grows downwards.
        let (sin, cos) = raise_deg.to_radians().sin_cos();
        let arm = 100.0;
        LandmarkFrame::from_landmarks([
            Landmark::new(LandmarkType::LeftShoulder, 400.0, 300.0, 0.9),
            Landmark::new(LandmarkType::LeftWrist, 400.0 + arm * sin, 300.0 + arm * cos, 0.9),
            Landmark::new(LandmarkType::LeftHip, 390.0, 500.0, 0.9),
            Landmark::new(LandmarkType::LeftAnkle, 390.0, 800.0, 0.9),
            Landmark::new(LandmarkType::RightShoulder, 300.0, 300.0, 0.9),
            Landmark::new(LandmarkType::RightWrist, 300.0 - arm * sin, 300.0 + arm * cos, 0.9),
            Landmark::new(LandmarkType::RightHip, 310.0, 500.0, 0.9),
            Landmark::new(LandmarkType::RightAnkle, 310.0, 800.0, 0.9),
        ])
        .unwrap()
    }

    #[test]
    fn test_alignment_at_45_degrees() {
        let alignment = FrontAnalyzer::new(intrinsics())
            .body_alignment(&arms_at(45.0))
            .unwrap();
        assert!((alignment.left - 45.0).abs() < 1e-3, "left {}", alignment.left);
        assert!((alignment.right - 45.0).abs() < 1e-3, "right {}", alignment.right);
    }

    #[test]
    fn test_alignment_grows_with_raise() {
        let analyzer = FrontAnalyzer::new(intrinsics());
        let low = analyzer.body_alignment(&arms_at(30.0)).unwrap();
        let high = analyzer.body_alignment(&arms_at(60.0)).unwrap();
        assert!((low.left - 30.0).abs() < 1e-3);
        assert!((high.right - 60.0).abs() < 1e-3);
        assert!(high.any_above(50.0));
        assert!(low.any_below(40.0));
    }

    #[test]
    fn test_inter_leg_distance_scales_pixels() {
        let frame = arms_at(45.0);
        let spread = FrontAnalyzer::new(intrinsics())
            .inter_leg_distance(&frame, 5.0)
            .unwrap();
        assert!((spread - 80.0 * LEG_SPREAD_BASELINE_FT).abs() < 1e-9);
    }

    #[test]
    fn test_missing_wrist() {
        let frame = LandmarkFrame::from_landmarks(
            arms_at(45.0)
                .iter()
                .copied()
                .filter(|l| l.kind != LandmarkType::RightWrist),
        )
        .unwrap();
        assert_eq!(
            FrontAnalyzer::new(intrinsics()).body_alignment(&frame),
            Err(MissingLandmark(LandmarkType::RightWrist))
        );
    }

    #[test]
    fn test_never_turned() {
        let analyzer = FrontAnalyzer::new(intrinsics());
        assert_eq!(analyzer.turned_90_degrees(&LandmarkFrame::empty()), Ok(false));
    }
}
