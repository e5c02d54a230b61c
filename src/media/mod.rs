//! Where label photos come from: a live camera or a file the user picked.
//!
//! Camera access is requested once. If it is denied or there is no camera,
//! capture is simply switched off and file upload stays available.

pub mod device;
pub mod raster;

use std::path::Path;

use image::ImageFormat;
use tracing::{info, warn};

pub use device::{AcquireError, CaptureDevice, DeviceProvider, NoCamera};

use crate::config::Config;
use crate::error::{Result, WattCompareError};

pub const CAPTURE_FILENAME: &str = "capture.jpg";
pub const JPEG_MIME: &str = "image/jpeg";

/// A still image ready to be sent as the multipart `image` field.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

impl ImageData {
    /// Wrap user-provided bytes verbatim. The MIME type is guessed from the
    /// file extension.
    pub fn from_bytes(filename: &str, bytes: Vec<u8>) -> Self {
        let mime = ImageFormat::from_path(filename)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        Self {
            bytes,
            filename: filename.to_string(),
            mime,
        }
    }
}

pub struct MediaSource {
    device: Option<Box<dyn CaptureDevice>>,
    jpeg_quality: u8,
    default_size: (u32, u32),
}

impl MediaSource {
    /// A source with capture off until [`MediaSource::acquire`] succeeds.
    pub fn new(config: &Config) -> Self {
        Self {
            device: None,
            jpeg_quality: config.jpeg_quality,
            default_size: (config.default_capture_width, config.default_capture_height),
        }
    }

    /// Ask for the camera once. Failure only disables capture.
    pub fn acquire(&mut self, provider: &dyn DeviceProvider) -> bool {
        match provider.request() {
            Ok(device) => {
                info!(
                    "Camera acquired (native resolution: {:?})",
                    device.native_resolution()
                );
                self.device = Some(device);
                true
            }
            Err(e) => {
                warn!("Camera unavailable, upload only: {}", e);
                self.device = None;
                false
            }
        }
    }

    pub fn capture_enabled(&self) -> bool {
        self.device.is_some()
    }

    /// Stop using the camera.
    pub fn release(&mut self) {
        if self.device.take().is_some() {
            info!("Camera released");
        }
    }

    /// Grab a frame and encode it as JPEG at the device's native size.
    pub fn capture(&mut self) -> Result<ImageData> {
        let device = self
            .device
            .as_mut()
            .ok_or(WattCompareError::CaptureUnavailable)?;

        let (width, height) = device
            .native_resolution()
            .filter(|(w, h)| *w > 0 && *h > 0)
            .unwrap_or(self.default_size);
        let frame = device.read_frame()?;
        let canvas = raster::draw_frame(frame, width, height);
        let bytes = raster::encode_jpeg(&canvas, self.jpeg_quality)?;
        info!("Captured {}x{} frame ({} bytes JPEG)", width, height, bytes.len());

        Ok(ImageData {
            bytes,
            filename: CAPTURE_FILENAME.to_string(),
            mime: JPEG_MIME.to_string(),
        })
    }

    /// Read a user-chosen file as-is.
    pub async fn from_file(path: &Path) -> Result<ImageData> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        info!("Loaded {} ({} bytes) for upload", filename, bytes.len());
        Ok(ImageData::from_bytes(&filename, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    struct FakeCamera {
        native: Option<(u32, u32)>,
        frame: (u32, u32),
    }

    impl CaptureDevice for FakeCamera {
        fn native_resolution(&self) -> Option<(u32, u32)> {
            self.native
        }

        fn read_frame(&mut self) -> Result<RgbImage> {
            Ok(RgbImage::new(self.frame.0, self.frame.1))
        }
    }

    struct Provider(Option<(u32, u32)>);

    impl DeviceProvider for Provider {
        fn request(&self) -> std::result::Result<Box<dyn CaptureDevice>, AcquireError> {
            Ok(Box::new(FakeCamera {
                native: self.0,
                frame: (100, 50),
            }))
        }
    }

    struct Denied;

    impl DeviceProvider for Denied {
        fn request(&self) -> std::result::Result<Box<dyn CaptureDevice>, AcquireError> {
            Err(AcquireError::PermissionDenied)
        }
    }

    fn decoded_size(image: &ImageData) -> (u32, u32) {
        let img = image::load_from_memory(&image.bytes).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_capture_uses_native_resolution() {
        let mut source = MediaSource::new(&Config::default());
        assert!(source.acquire(&Provider(Some((200, 100)))));

        let image = source.capture().unwrap();
        assert_eq!(image.filename, CAPTURE_FILENAME);
        assert_eq!(image.mime, JPEG_MIME);
        assert_eq!(decoded_size(&image), (200, 100));
    }

    #[test]
    fn test_capture_falls_back_to_default_size() {
        let config = Config {
            default_capture_width: 64,
            default_capture_height: 48,
            ..Config::default()
        };
        let mut source = MediaSource::new(&config);
        source.acquire(&Provider(None));

        let image = source.capture().unwrap();
        assert_eq!(decoded_size(&image), (64, 48));
    }

    #[test]
    fn test_denied_disables_capture_silently() {
        let mut source = MediaSource::new(&Config::default());
        assert!(!source.acquire(&Denied));
        assert!(!source.capture_enabled());
        assert!(matches!(
            source.capture(),
            Err(WattCompareError::CaptureUnavailable)
        ));
    }

    #[test]
    fn test_no_camera_provider() {
        let mut source = MediaSource::new(&Config::default());
        assert!(!source.acquire(&NoCamera));
    }

    #[test]
    fn test_release_turns_capture_off() {
        let mut source = MediaSource::new(&Config::default());
        source.acquire(&Provider(None));
        source.release();
        assert!(!source.capture_enabled());
    }

    #[test]
    fn test_from_bytes_guesses_mime() {
        assert_eq!(ImageData::from_bytes("label.png", vec![1]).mime, "image/png");
        assert_eq!(ImageData::from_bytes("label.JPG", vec![1]).mime, "image/jpeg");
        assert_eq!(
            ImageData::from_bytes("label.bin", vec![1]).mime,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_from_file_is_verbatim() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let image = MediaSource::from_file(&path).await.unwrap();
        assert_eq!(image.bytes, b"not really a png");
        assert_eq!(image.filename, "label.png");
    }
}
