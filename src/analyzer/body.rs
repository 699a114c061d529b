// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Left/right body chains.

use crate::landmark::LandmarkType;

/// One side of the body, as labelled by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodySide {
    Left,
    Right,
}

impl BodySide {
    /// Both sides, left first.
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    /// Shoulder, elbow, wrist.
    #[must_use]
    pub const fn arm(self) -> [LandmarkType; 3] {
        match self {
            Self::Left => [
                LandmarkType::LeftShoulder,
                LandmarkType::LeftElbow,
                LandmarkType::LeftWrist,
            ],
            Self::Right => [
                LandmarkType::RightShoulder,
                LandmarkType::RightElbow,
                LandmarkType::RightWrist,
            ],
        }
    }

    /// Hip, knee, ankle.
    #[must_use]
    pub const fn leg(self) -> [LandmarkType; 3] {
        match self {
            Self::Left => [
                LandmarkType::LeftHip,
                LandmarkType::LeftKnee,
                LandmarkType::LeftAnkle,
            ],
            Self::Right => [
                LandmarkType::RightHip,
                LandmarkType::RightKnee,
                LandmarkType::RightAnkle,
            ],
        }
    }

    /// Wrist, shoulder, hip, ankle: the joints that define arm raise.
    #[must_use]
    pub const fn trunk(self) -> [LandmarkType; 4] {
        match self {
            Self::Left => [
                LandmarkType::LeftWrist,
                LandmarkType::LeftShoulder,
                LandmarkType::LeftHip,
                LandmarkType::LeftAnkle,
            ],
            Self::Right => [
                LandmarkType::RightWrist,
                LandmarkType::RightShoulder,
                LandmarkType::RightHip,
                LandmarkType::RightAnkle,
            ],
        }
    }

    /// Map a `[0, 360)` arm-to-leg heading difference onto a raise angle.
    ///
    /// The two sides mirror each other in the image, so the left side reads
    /// `180 - angle` and the right side `angle - 180`. An arm held straight out
    /// 45 degrees from a vertical leg yields 45 on either side.
    #[must_use]
    pub fn fold_alignment(self, angle: f64) -> f64 {
        match self {
            Self::Left => 180.0 - angle,
            Self::Right => angle - 180.0,
        }
    }
}
