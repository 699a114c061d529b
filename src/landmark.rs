// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Body landmarks and per-frame landmark sets.
//!
//! A [`LandmarkFrame`] is the snapshot handed over by the external pose detector for
//! one camera frame. It holds at most one [`Landmark`] per [`LandmarkType`]; a joint
//! that was not detected is simply absent, which is distinct from a joint detected
//! with low confidence.

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, Measure, MissingLandmark, Result};
use crate::geometry::{Point2, Point3};

/// Number of joints tracked by the detector.
pub const LANDMARK_COUNT: usize = 33;

/// Named body joints, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkType {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkType {
    /// All joints in detector output order.
    pub const ALL: [Self; LANDMARK_COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Detector output index of this joint.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Joint for a detector output index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the snake_case name used in recordings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for LandmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkType {
    type Err = LandmarkParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| LandmarkParseError(s.to_string()))
    }
}

/// Error returned when parsing an unknown landmark name.
#[derive(Debug, Clone)]
pub struct LandmarkParseError(String);

impl fmt::Display for LandmarkParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown landmark '{}'", self.0)
    }
}

impl std::error::Error for LandmarkParseError {}

/// A single detected joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LandmarkRecord", into = "LandmarkRecord")]
pub struct Landmark {
    /// Which joint this is.
    pub kind: LandmarkType,
    /// Position in image pixels.
    pub position: Point2,
    /// Position with depth, when the detector reports it.
    pub position_3d: Option<Point3>,
    /// Detection confidence in [0, 1].
    pub visibility: f32,
}

impl Landmark {
    /// Create a 2-D landmark.
    #[must_use]
    pub const fn new(kind: LandmarkType, x: f32, y: f32, visibility: f32) -> Self {
        Self {
            kind,
            position: Point2::new(x, y),
            position_3d: None,
            visibility,
        }
    }

    /// Attach a depth value, producing a 3-D position at the same image coordinates.
    #[must_use]
    pub const fn with_depth(mut self, z: f32) -> Self {
        self.position_3d = Some(Point3::new(self.position.x, self.position.y, z));
        self
    }

    /// Returns `true` when the confidence is strictly above `threshold`.
    #[must_use]
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }
}

/// Flat on-disk form of a landmark.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LandmarkRecord {
    #[serde(rename = "type")]
    kind: LandmarkType,
    x: f32,
    y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    z: Option<f32>,
    visibility: f32,
}

impl From<LandmarkRecord> for Landmark {
    fn from(record: LandmarkRecord) -> Self {
        let landmark = Self::new(record.kind, record.x, record.y, record.visibility);
        match record.z {
            Some(z) => landmark.with_depth(z),
            None => landmark,
        }
    }
}

impl From<Landmark> for LandmarkRecord {
    fn from(landmark: Landmark) -> Self {
        Self {
            kind: landmark.kind,
            x: landmark.position.x,
            y: landmark.position.y,
            z: landmark.position_3d.map(|p| p.z),
            visibility: landmark.visibility,
        }
    }
}

/// All landmarks detected in one camera frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameRecord", into = "FrameRecord")]
pub struct LandmarkFrame {
    slots: [Option<Landmark>; LANDMARK_COUNT],
}

impl Default for LandmarkFrame {
    fn default() -> Self {
        Self::empty()
    }
}

impl LandmarkFrame {
    /// A frame in which no joint was detected.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            slots: [None; LANDMARK_COUNT],
        }
    }

    /// Build a frame from detected landmarks.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::FrameError`] if the same joint appears twice.
    pub fn from_landmarks<I>(landmarks: I) -> Result<Self>
    where
        I: IntoIterator<Item = Landmark>,
    {
        let mut frame = Self::empty();
        for landmark in landmarks {
            let slot = &mut frame.slots[landmark.kind.index()];
            if slot.is_some() {
                return Err(CaptureError::FrameError(format!(
                    "duplicate landmark '{}'",
                    landmark.kind
                )));
            }
            *slot = Some(landmark);
        }
        Ok(frame)
    }

    /// Build a frame from a detector output tensor.
    ///
    /// Rows follow [`LandmarkType`] order. Supported layouts are `(33, 3)` holding
    /// `x, y, visibility` and `(33, 4)` holding `x, y, z, visibility`. Rows with
    /// non-finite coordinates are treated as not detected.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::FrameError`] for any other shape.
    pub fn from_array(data: ArrayView2<'_, f32>) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows != LANDMARK_COUNT || !(cols == 3 || cols == 4) {
            return Err(CaptureError::FrameError(format!(
                "expected landmark tensor of shape ({LANDMARK_COUNT}, 3) or ({LANDMARK_COUNT}, 4), got ({rows}, {cols})"
            )));
        }

        let mut frame = Self::empty();
        for (kind, row) in LandmarkType::ALL.iter().zip(data.rows()) {
            let (x, y) = (row[0], row[1]);
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            let landmark = if cols == 4 {
                Landmark::new(*kind, x, y, row[3]).with_depth(row[2])
            } else {
                Landmark::new(*kind, x, y, row[2])
            };
            frame.slots[kind.index()] = Some(landmark);
        }
        Ok(frame)
    }

    /// Look up a joint.
    #[must_use]
    pub fn get(&self, kind: LandmarkType) -> Option<&Landmark> {
        self.slots[kind.index()].as_ref()
    }

    /// Look up a joint that a measurement cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`MissingLandmark`] if the joint was not detected.
    pub fn require(&self, kind: LandmarkType) -> Measure<&Landmark> {
        self.get(kind).ok_or(MissingLandmark(kind))
    }

    /// Number of detected joints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns `true` when no joint was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterate over detected joints in detector order.
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.slots.iter().flatten()
    }
}

/// On-disk form of a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    landmarks: Vec<Landmark>,
}

impl TryFrom<FrameRecord> for LandmarkFrame {
    type Error = CaptureError;

    fn try_from(record: FrameRecord) -> Result<Self> {
        Self::from_landmarks(record.landmarks)
    }
}

impl From<LandmarkFrame> for FrameRecord {
    fn from(frame: LandmarkFrame) -> Self {
        Self {
            landmarks: frame.iter().copied().collect(),
        }
    }
}
