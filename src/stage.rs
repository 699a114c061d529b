// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose stages and capture workflow states.
//!
//! A capture session walks through two poses: a front-facing pose with the arms
//! raised away from the body, then a side-on pose after turning 90 degrees.

use std::fmt;
use std::str::FromStr;

/// The pose a subject is asked to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseStage {
    /// Facing the camera, feet apart, arms straight and raised about 45 degrees.
    Front,
    /// Turned 90 degrees, feet together, arms and legs straight.
    Side,
}

impl PoseStage {
    /// Returns the string representation used in recordings and on the CLI.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Side => "side",
        }
    }

    /// One-based position of this pose in the capture sequence.
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Front => 1,
            Self::Side => 2,
        }
    }
}

impl fmt::Display for PoseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PoseStage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" | "1" | "pose1" => Ok(Self::Front),
            "side" | "2" | "pose2" => Ok(Self::Side),
            _ => Err(StageParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid stage string.
#[derive(Debug, Clone)]
pub struct StageParseError(String);

impl fmt::Display for StageParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid stage '{}', expected one of: front, side", self.0)
    }
}

impl std::error::Error for StageParseError {}

/// Position of the capture workflow.
///
/// States only move forward, in declaration order. A failed validation keeps the
/// state; losing the subject during a countdown returns to the awaiting state of
/// the same pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CaptureStage {
    /// Validating the front pose.
    #[default]
    AwaitingPose1,
    /// Front pose holds; counting down.
    Pose1Countdown,
    /// Front pose captured; the side pose starts on the next cycle.
    Pose1Captured,
    /// Validating the side pose.
    AwaitingPose2,
    /// Side pose holds; counting down.
    Pose2Countdown,
    /// Both poses captured.
    Completed,
}

impl CaptureStage {
    /// The pose validated in this state, if any.
    #[must_use]
    pub const fn pose(&self) -> Option<PoseStage> {
        match self {
            Self::AwaitingPose1 | Self::Pose1Countdown => Some(PoseStage::Front),
            Self::Pose1Captured | Self::AwaitingPose2 | Self::Pose2Countdown => {
                Some(PoseStage::Side)
            }
            Self::Completed => None,
        }
    }

    /// Awaiting state for a pose.
    #[must_use]
    pub const fn awaiting(pose: PoseStage) -> Self {
        match pose {
            PoseStage::Front => Self::AwaitingPose1,
            PoseStage::Side => Self::AwaitingPose2,
        }
    }

    /// Countdown state for a pose.
    #[must_use]
    pub const fn countdown(pose: PoseStage) -> Self {
        match pose {
            PoseStage::Front => Self::Pose1Countdown,
            PoseStage::Side => Self::Pose2Countdown,
        }
    }

    /// Returns whether the workflow has finished.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingPose1 => "awaiting pose 1",
            Self::Pose1Countdown => "pose 1 countdown",
            Self::Pose1Captured => "pose 1 captured",
            Self::AwaitingPose2 => "awaiting pose 2",
            Self::Pose2Countdown => "pose 2 countdown",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_str() {
        assert_eq!("front".parse::<PoseStage>().unwrap(), PoseStage::Front);
        assert_eq!("Side".parse::<PoseStage>().unwrap(), PoseStage::Side);
        assert_eq!("pose2".parse::<PoseStage>().unwrap(), PoseStage::Side);
        assert!("back".parse::<PoseStage>().is_err());
    }

    #[test]
    fn test_capture_stage_pose() {
        assert_eq!(CaptureStage::AwaitingPose1.pose(), Some(PoseStage::Front));
        assert_eq!(CaptureStage::Pose1Captured.pose(), Some(PoseStage::Side));
        assert_eq!(CaptureStage::Completed.pose(), None);
        assert!(CaptureStage::Completed.is_terminal());
    }

    #[test]
    fn test_capture_stage_ordering() {
        assert!(CaptureStage::AwaitingPose1 < CaptureStage::Pose1Countdown);
        assert!(CaptureStage::Pose1Captured < CaptureStage::AwaitingPose2);
        assert!(CaptureStage::Pose2Countdown < CaptureStage::Completed);
    }
}
