use image::RgbImage;
use std::fmt;

use crate::error::Result;

/// Why a capture device could not be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    PermissionDenied,
    NoDevice,
    Failed(String),
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireError::PermissionDenied => f.write_str("camera permission denied"),
            AcquireError::NoDevice => f.write_str("no camera found"),
            AcquireError::Failed(msg) => write!(f, "camera failed to start: {}", msg),
        }
    }
}

impl std::error::Error for AcquireError {}

/// A live camera stream.
pub trait CaptureDevice: Send {
    /// Native stream resolution, if the device reports one.
    fn native_resolution(&self) -> Option<(u32, u32)>;

    /// Grab the current frame.
    fn read_frame(&mut self) -> Result<RgbImage>;
}

/// Platform hook that asks for camera access.
pub trait DeviceProvider {
    fn request(&self) -> std::result::Result<Box<dyn CaptureDevice>, AcquireError>;
}

/// Provider for hosts without a camera.
pub struct NoCamera;

impl DeviceProvider for NoCamera {
    fn request(&self) -> std::result::Result<Box<dyn CaptureDevice>, AcquireError> {
        Err(AcquireError::NoDevice)
    }
}
