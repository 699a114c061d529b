// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Side-on pose: turned 90 degrees, feet together, arms and legs straight.

use std::ops::{Range, RangeInclusive};

use super::{BodyAlignment, PoseAnalyzer};
use crate::camera::CameraIntrinsics;
use crate::error::{Measure, MissingLandmark};
use crate::geometry::Point3;
use crate::landmark::{LandmarkFrame, LandmarkType};
use crate::stage::PoseStage;

/// Accepted left-minus-right shoulder offset, in pixels, on each image axis.
/// Both bounds are exclusive.
pub const SHOULDER_STACK_RANGE: Range<f32> = -10.0..30.0;

/// Analyzer for the second, side-on pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideAnalyzer {
    intrinsics: CameraIntrinsics,
}

impl SideAnalyzer {
    #[must_use]
    pub const fn new(intrinsics: CameraIntrinsics) -> Self {
        Self { intrinsics }
    }
}

fn depth_point(frame: &LandmarkFrame, kind: LandmarkType) -> Measure<Point3> {
    frame.require(kind)?.position_3d.ok_or(MissingLandmark(kind))
}

fn in_stack_range(offset: f32) -> bool {
    offset > SHOULDER_STACK_RANGE.start && offset < SHOULDER_STACK_RANGE.end
}

impl PoseAnalyzer for SideAnalyzer {
    fn stage(&self) -> PoseStage {
        PoseStage::Side
    }

    fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    fn hands_window(&self) -> RangeInclusive<f64> {
        150.0..=180.0
    }

    fn legs_window(&self) -> RangeInclusive<f64> {
        160.0..=180.0
    }

    fn body_alignment(&self, _frame: &LandmarkFrame) -> Measure<BodyAlignment> {
        Ok(BodyAlignment::default())
    }

    /// Difference of the absolute 3-D x coordinates of the ankles.
    ///
    /// This is neither converted to feet nor made absolute; the side-pose limit is
    /// expressed in the same raw units.
    fn inter_leg_distance(&self, frame: &LandmarkFrame, _camera_distance_ft: f64) -> Measure<f64> {
        let left = depth_point(frame, LandmarkType::LeftAnkle)?;
        let right = depth_point(frame, LandmarkType::RightAnkle)?;
        Ok(f64::from(left.x.abs()) - f64::from(right.x.abs()))
    }

    fn turned_90_degrees(&self, frame: &LandmarkFrame) -> Measure<bool> {
        let left = frame.require(LandmarkType::LeftShoulder)?.position;
        let right = frame.require(LandmarkType::RightShoulder)?.position;
        Ok(in_stack_range(left.x - right.x) && in_stack_range(left.y - right.y))
    }
}
