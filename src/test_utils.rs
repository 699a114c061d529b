// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Synthetic pose frames for unit tests.

use crate::analyzer::front::LEG_SPREAD_BASELINE_FT;
use crate::analyzer::{AVERAGE_EYE_DISTANCE_MM, MM_PER_FOOT};
use crate::camera::CameraIntrinsics;
use crate::landmark::{Landmark, LandmarkFrame, LandmarkType};
use crate::stage::PoseStage;

/// Portrait phone camera used by every fixture.
pub const INTRINSICS: CameraIntrinsics = CameraIntrinsics::new(60.0, 45.0, 4.0, 720, 1280);

const CENTER_X: f64 = 360.0;
const SHOULDER_Y: f64 = 300.0;
const HIP_Y: f64 = 550.0;
const ANKLE_Y: f64 = 850.0;
const UPPER_ARM: f64 = 60.0;
const KNEE_BEND: f64 = 60.0;

/// Description of a synthetic subject.
#[derive(Debug, Clone, Copy)]
pub struct PoseSpec {
    pub stage: PoseStage,
    pub distance_ft: f64,
    /// Front: feet as read by the front analyzer. Side: raw ankle x difference.
    pub leg_spread: f64,
    pub raise_deg: f64,
    pub straight_arms: bool,
    pub straight_legs: bool,
    /// Side only: left shoulder minus right shoulder.
    pub shoulder_offset: (f64, f64),
    pub visibility: f32,
}

impl PoseSpec {
    /// A front pose that passes every rule: 5 ft, 12 ft spread, arms at 45°.
    pub const fn front() -> Self {
        Self {
            stage: PoseStage::Front,
            distance_ft: 5.0,
            leg_spread: 12.0,
            raise_deg: 45.0,
            straight_arms: true,
            straight_legs: true,
            shoulder_offset: (80.0, 0.0),
            visibility: 0.95,
        }
    }

    /// A side pose that passes every rule.
    pub const fn side() -> Self {
        Self {
            stage: PoseStage::Side,
            distance_ft: 5.0,
            leg_spread: 4.0,
            raise_deg: 0.0,
            straight_arms: true,
            straight_legs: true,
            shoulder_offset: (5.0, 5.0),
            visibility: 0.95,
        }
    }

    pub const fn with_distance(mut self, distance_ft: f64) -> Self {
        self.distance_ft = distance_ft;
        self
    }

    pub const fn with_leg_spread(mut self, leg_spread: f64) -> Self {
        self.leg_spread = leg_spread;
        self
    }

    pub const fn with_raise(mut self, raise_deg: f64) -> Self {
        self.raise_deg = raise_deg;
        self
    }

    pub const fn with_bent_arms(mut self) -> Self {
        self.straight_arms = false;
        self
    }

    pub const fn with_bent_legs(mut self) -> Self {
        self.straight_legs = false;
        self
    }

    pub const fn with_shoulder_offset(mut self, dx: f64, dy: f64) -> Self {
        self.shoulder_offset = (dx, dy);
        self
    }

    pub const fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = visibility;
        self
    }

    /// Horizontal eye separation that reads back as `distance_ft`.
    fn eye_separation_px(&self) -> f64 {
        let (sensor_x, _) = INTRINSICS.sensor_extent_mm();
        INTRINSICS.focal_length_mm
            * (AVERAGE_EYE_DISTANCE_MM / sensor_x)
            * f64::from(INTRINSICS.frame_width)
            / (self.distance_ft * MM_PER_FOOT)
    }

    /// Ankle x positions, left then right.
    fn ankle_x(&self) -> (f64, f64) {
        match self.stage {
            PoseStage::Front => {
                let half = self.leg_spread / LEG_SPREAD_BASELINE_FT / 2.0;
                (CENTER_X + half, CENTER_X - half)
            }
            PoseStage::Side => (CENTER_X + self.leg_spread, CENTER_X),
        }
    }

    fn shoulders(&self) -> ((f64, f64), (f64, f64)) {
        match self.stage {
            PoseStage::Front => ((CENTER_X + 40.0, SHOULDER_Y), (CENTER_X - 40.0, SHOULDER_Y)),
            PoseStage::Side => {
                let (dx, dy) = self.shoulder_offset;
                ((CENTER_X + dx, SHOULDER_Y + dy), (CENTER_X, SHOULDER_Y))
            }
        }
    }

    /// Render the subject as a landmark frame. Every joint carries a zero depth.
    #[allow(clippy::cast_possible_truncation)]
    pub fn frame(&self) -> LandmarkFrame {
        use LandmarkType as T;

        let v = self.visibility;
        let point = |kind: LandmarkType, (x, y): (f64, f64)| {
            Landmark::new(kind, x as f32, y as f32, v).with_depth(0.0)
        };

        let half_eye = self.eye_separation_px() / 2.0;
        let mut landmarks = vec![
            point(T::Nose, (CENTER_X, 215.0)),
            point(T::LeftEye, (CENTER_X + half_eye, 200.0)),
            point(T::RightEye, (CENTER_X - half_eye, 200.0)),
            point(T::LeftEar, (CENTER_X + half_eye + 12.0, 206.0)),
            point(T::RightEar, (CENTER_X - half_eye - 12.0, 206.0)),
        ];

        let (left_shoulder, right_shoulder) = self.shoulders();
        let (left_ankle_x, right_ankle_x) = self.ankle_x();
        let (sin, cos) = self.raise_deg.to_radians().sin_cos();

        let sides = [
            (
                1.0,
                left_shoulder,
                left_ankle_x,
                [
                    T::LeftShoulder,
                    T::LeftElbow,
                    T::LeftWrist,
                    T::LeftHip,
                    T::LeftKnee,
                    T::LeftAnkle,
                    T::LeftHeel,
                    T::LeftFootIndex,
                ],
            ),
            (
                -1.0,
                right_shoulder,
                right_ankle_x,
                [
                    T::RightShoulder,
                    T::RightElbow,
                    T::RightWrist,
                    T::RightHip,
                    T::RightKnee,
                    T::RightAnkle,
                    T::RightHeel,
                    T::RightFootIndex,
                ],
            ),
        ];

        for (sign, shoulder, ankle_x, [s, e, w, h, k, a, heel, toe]) in sides {
            let dir = (sign * sin, cos);
            let elbow = (shoulder.0 + UPPER_ARM * dir.0, shoulder.1 + UPPER_ARM * dir.1);
            let wrist = if self.straight_arms {
                (elbow.0 + UPPER_ARM * dir.0, elbow.1 + UPPER_ARM * dir.1)
            } else {
                (elbow.0 + UPPER_ARM * dir.1, elbow.1 - UPPER_ARM * dir.0)
            };

            let hip = (ankle_x, HIP_Y);
            let ankle = (ankle_x, ANKLE_Y);
            let bend = if self.straight_legs { 0.0 } else { sign * KNEE_BEND };
            let knee = (ankle_x + bend, (HIP_Y + ANKLE_Y) / 2.0);

            landmarks.extend([
                point(s, shoulder),
                point(e, elbow),
                point(w, wrist),
                point(h, hip),
                point(k, knee),
                point(a, ankle),
                point(heel, (ankle_x - sign * 4.0, ANKLE_Y + 10.0)),
                point(toe, (ankle_x + sign * 8.0, ANKLE_Y + 25.0)),
            ]);
        }

        LandmarkFrame::from_landmarks(landmarks).unwrap()
    }
}
