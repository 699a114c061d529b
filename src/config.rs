// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Capture session configuration.
//!
//! This module defines [`CaptureConfig`], the single, session-scoped value that
//! carries the camera intrinsics, countdown and retry timing, and the rule
//! thresholds into the validators and the sequencer.

use std::time::Duration;

use crate::camera::CameraIntrinsics;
use crate::error::{CaptureError, Result};

/// Numeric limits used by the stage rule pipelines.
///
/// Distances are in feet. The leg-spread limits are compared against the
/// analyzer's leg-spread value, which is feet-scaled for the front pose and a raw
/// 3-D coordinate difference for the side pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationThresholds {
    /// Closest allowed camera distance, both poses.
    pub min_distance_ft: f64,
    /// Furthest allowed camera distance, front pose only.
    pub max_distance_ft: f64,
    /// Smallest allowed leg spread for the front pose.
    pub min_front_leg_spread: f64,
    /// Largest allowed leg spread for the side pose.
    pub max_side_leg_spread: f64,
    /// Lowest accepted arm raise, in degrees.
    pub min_arm_raise_deg: f64,
    /// Highest accepted arm raise, in degrees.
    pub max_arm_raise_deg: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_distance_ft: 4.0,
            max_distance_ft: 6.0,
            min_front_leg_spread: 11.0,
            max_side_leg_spread: 10.0,
            min_arm_raise_deg: 40.0,
            max_arm_raise_deg: 50.0,
        }
    }
}

impl ValidationThresholds {
    /// Set the accepted arm-raise window.
    #[must_use]
    pub const fn with_arm_raise(mut self, min_deg: f64, max_deg: f64) -> Self {
        self.min_arm_raise_deg = min_deg;
        self.max_arm_raise_deg = max_deg;
        self
    }

    /// Set the accepted camera distance range.
    #[must_use]
    pub const fn with_distance(mut self, min_ft: f64, max_ft: f64) -> Self {
        self.min_distance_ft = min_ft;
        self.max_distance_ft = max_ft;
        self
    }

    /// Check that each range is ordered and finite.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::ConfigError`] describing the first bad range.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("camera distance", self.min_distance_ft, self.max_distance_ft),
            ("arm raise", self.min_arm_raise_deg, self.max_arm_raise_deg),
        ];
        for (name, min, max) in ranges {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(CaptureError::ConfigError(format!(
                    "invalid {name} range [{min}, {max}]"
                )));
            }
        }
        if !self.min_front_leg_spread.is_finite() || !self.max_side_leg_spread.is_finite() {
            return Err(CaptureError::ConfigError(
                "leg spread limits must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a capture session.
///
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pose_capture::{CameraIntrinsics, CaptureConfig};
///
/// let config = CaptureConfig::new()
///     .with_intrinsics(CameraIntrinsics::new(66.0, 51.0, 4.2, 720, 1280))
///     .with_countdown(3)
///     .with_retry_delay(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Camera intrinsics. Required; a session cannot start without them.
    pub intrinsics: Option<CameraIntrinsics>,
    /// Countdown value each pose starts from once all rules pass.
    pub countdown_start: u32,
    /// Delay between validation cycles.
    pub retry_delay: Duration,
    /// Rule thresholds.
    pub thresholds: ValidationThresholds,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            intrinsics: None,
            countdown_start: 5,
            retry_delay: Duration::from_secs(1),
            thresholds: ValidationThresholds::default(),
        }
    }
}

impl CaptureConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the camera intrinsics.
    #[must_use]
    pub const fn with_intrinsics(mut self, intrinsics: CameraIntrinsics) -> Self {
        self.intrinsics = Some(intrinsics);
        self
    }

    /// Set the countdown start value.
    #[must_use]
    pub const fn with_countdown(mut self, countdown_start: u32) -> Self {
        self.countdown_start = countdown_start;
        self
    }

    /// Set the delay between validation cycles.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Set the rule thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, thresholds: ValidationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Validate the configuration and return the camera intrinsics.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::PreconditionError`] if the intrinsics are missing or
    /// invalid, and [`CaptureError::ConfigError`] for bad thresholds or timing.
    pub fn resolve_intrinsics(&self) -> Result<CameraIntrinsics> {
        let intrinsics = self.intrinsics.ok_or_else(|| {
            CaptureError::PreconditionError("camera intrinsics are not available".to_string())
        })?;
        intrinsics.validate()?;
        self.validate()?;
        Ok(intrinsics)
    }

    /// Check the timing and thresholds.
    ///
    /// A zero retry delay would schedule every cycle at the instant it ran, so
    /// it is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::ConfigError`] for a zero retry delay or bad
    /// thresholds.
    pub fn validate(&self) -> Result<()> {
        if self.retry_delay.is_zero() {
            return Err(CaptureError::ConfigError(
                "retry delay must be greater than zero".to_string(),
            ));
        }
        self.thresholds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.countdown_start, 5);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert!(config.intrinsics.is_none());
        assert!((config.thresholds.min_arm_raise_deg - 40.0).abs() < f64::EPSILON);
        assert!((config.thresholds.max_arm_raise_deg - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_builder() {
        let intrinsics = CameraIntrinsics::new(60.0, 45.0, 4.0, 720, 1280);
        let config = CaptureConfig::new()
            .with_intrinsics(intrinsics)
            .with_countdown(3)
            .with_retry_delay(Duration::from_millis(250))
            .with_thresholds(ValidationThresholds::default().with_arm_raise(35.0, 55.0));

        assert_eq!(config.intrinsics, Some(intrinsics));
        assert_eq!(config.countdown_start, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert!((config.thresholds.min_arm_raise_deg - 35.0).abs() < f64::EPSILON);
        assert!(config.resolve_intrinsics().is_ok());
    }

    #[test]
    fn test_missing_intrinsics_is_precondition_error() {
        let err = CaptureConfig::new().resolve_intrinsics().unwrap_err();
        assert!(matches!(err, CaptureError::PreconditionError(_)));
    }

    #[test]
    fn test_inverted_window_is_config_error() {
        let config = CaptureConfig::new()
            .with_intrinsics(CameraIntrinsics::new(60.0, 45.0, 4.0, 720, 1280))
            .with_thresholds(ValidationThresholds::default().with_arm_raise(50.0, 40.0));
        assert!(matches!(
            config.resolve_intrinsics(),
            Err(CaptureError::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_retry_delay_is_config_error() {
        let config = CaptureConfig::new()
            .with_intrinsics(CameraIntrinsics::new(60.0, 45.0, 4.0, 720, 1280))
            .with_retry_delay(Duration::ZERO);
        assert!(matches!(config.validate(), Err(CaptureError::ConfigError(_))));
        assert!(matches!(
            config.resolve_intrinsics(),
            Err(CaptureError::ConfigError(_))
        ));

        let config = config.with_retry_delay(Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }
}
