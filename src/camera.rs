// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Camera intrinsics supplied once per capture session.

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, Result};

/// Optical parameters of the capturing camera.
///
/// Angles are full field-of-view angles in degrees; the focal length is in
/// millimeters. The frame size is the pixel size of the images the landmarks
/// were detected in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Horizontal field of view (degrees).
    pub horizontal_fov_deg: f64,
    /// Vertical field of view (degrees).
    pub vertical_fov_deg: f64,
    /// Focal length (millimeters).
    pub focal_length_mm: f64,
    /// Frame width (pixels).
    pub frame_width: u32,
    /// Frame height (pixels).
    pub frame_height: u32,
}

impl CameraIntrinsics {
    /// Create intrinsics without validating them.
    #[must_use]
    pub const fn new(
        horizontal_fov_deg: f64,
        vertical_fov_deg: f64,
        focal_length_mm: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            horizontal_fov_deg,
            vertical_fov_deg,
            focal_length_mm,
            frame_width,
            frame_height,
        }
    }

    /// Check that every parameter is finite and positive, and that both
    /// field-of-view angles are below 180 degrees.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::PreconditionError`] naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        let angles = [
            ("horizontal field of view", self.horizontal_fov_deg),
            ("vertical field of view", self.vertical_fov_deg),
        ];
        for (name, value) in angles {
            if !value.is_finite() || value <= 0.0 || value >= 180.0 {
                return Err(CaptureError::PreconditionError(format!(
                    "{name} must be in (0, 180) degrees, got {value}"
                )));
            }
        }
        if !self.focal_length_mm.is_finite() || self.focal_length_mm <= 0.0 {
            return Err(CaptureError::PreconditionError(format!(
                "focal length must be positive, got {}",
                self.focal_length_mm
            )));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(CaptureError::PreconditionError(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        Ok(())
    }

    /// Sensor-plane extents `(width, height)` in millimeters implied by the field
    /// of view and focal length: `2 · f · tan(fov / 2)`.
    #[must_use]
    pub fn sensor_extent_mm(&self) -> (f64, f64) {
        let extent = |fov_deg: f64| 2.0 * self.focal_length_mm * (fov_deg / 2.0).to_radians().tan();
        (extent(self.horizontal_fov_deg), extent(self.vertical_fov_deg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_phone_camera() {
        let intrinsics = CameraIntrinsics::new(66.0, 51.0, 4.2, 720, 1280);
        assert!(intrinsics.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let base = CameraIntrinsics::new(66.0, 51.0, 4.2, 720, 1280);
        let cases = [
            CameraIntrinsics { horizontal_fov_deg: 0.0, ..base },
            CameraIntrinsics { vertical_fov_deg: 180.0, ..base },
            CameraIntrinsics { focal_length_mm: -1.0, ..base },
            CameraIntrinsics { focal_length_mm: f64::NAN, ..base },
            CameraIntrinsics { frame_width: 0, ..base },
        ];
        for intrinsics in cases {
            assert!(matches!(
                intrinsics.validate(),
                Err(CaptureError::PreconditionError(_))
            ));
        }
    }

    #[test]
    fn test_sensor_extent() {
        let intrinsics = CameraIntrinsics::new(90.0, 60.0, 4.0, 100, 100);
        let (sx, sy) = intrinsics.sensor_extent_mm();
        assert!((sx - 8.0).abs() < 1e-9);
        assert!((sy - 8.0 * 30.0_f64.to_radians().tan()).abs() < 1e-9);
    }
}
