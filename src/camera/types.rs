use image::{imageops, DynamicImage, GrayImage, ImageBuffer, Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single camera frame
///
/// Frames leave the camera as 3-channel RGB. The grayscale filter turns them
/// into single-channel frames, so every consumer has to accept both layouts.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: DynamicImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer: DynamicImage::ImageRgb8(buffer) }
    }

    /// Create a single-channel frame
    pub fn from_luma(buffer: GrayImage) -> Self {
        Self { buffer: DynamicImage::ImageLuma8(buffer) }
    }

    /// Wrap a decoded image, keeping 8-bit grayscale and converting
    /// everything else to RGB
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::from_luma(gray),
            DynamicImage::ImageRgb8(rgb) => Self::new(rgb),
            other => Self::new(other.to_rgb8()),
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self::new(buffer)
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Number of channels: 1 for grayscale, 3 for color
    pub fn channels(&self) -> u8 {
        self.buffer.color().channel_count()
    }

    pub fn is_grayscale(&self) -> bool {
        matches!(self.buffer, DynamicImage::ImageLuma8(_))
    }

    /// Get the underlying image
    pub fn as_image(&self) -> &DynamicImage {
        &self.buffer
    }

    /// Consume the frame and return the underlying image
    pub fn into_image(self) -> DynamicImage {
        self.buffer
    }

    /// RGB view of the frame; gray values are copied into every channel
    pub fn to_rgb8(&self) -> RgbImage {
        match &self.buffer {
            DynamicImage::ImageRgb8(rgb) => rgb.clone(),
            other => other.to_rgb8(),
        }
    }

    /// Fully opaque RGBA view of the frame
    pub fn to_rgba8(&self) -> RgbaImage {
        self.buffer.to_rgba8()
    }

    /// Mirror the frame left-to-right, the way a booth screen should look
    pub fn mirrored(&self) -> Self {
        Self { buffer: self.buffer.fliph() }
    }

    /// Raw pixel bytes in row-major order
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Scale the frame to exactly `width` x `height` with bilinear sampling
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let buffer = match &self.buffer {
            DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(imageops::resize(
                gray,
                width,
                height,
                imageops::FilterType::Triangle,
            )),
            other => DynamicImage::ImageRgb8(imageops::resize(
                &other.to_rgb8(),
                width,
                height,
                imageops::FilterType::Triangle,
            )),
        };
        Self { buffer }
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save_with_format(path, image::ImageFormat::Png)
    }
}

/// Which stand-in for the camera device to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraSource {
    /// Synthetic moving color pattern
    TestPattern,
    /// Still images from a folder, replayed in name order
    Folder,
}

/// Camera parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    /// Source to open at startup
    pub source: CameraSource,

    /// Image folder for the `folder` source
    pub folder: Option<PathBuf>,

    /// Frame size produced by the test pattern (width, height)
    pub resolution: (u32, u32),

    /// Probability (0.0-1.0) that a read returns no frame
    pub failure_rate: f32,

    /// Seed for the failure simulation, random when absent
    pub seed: Option<u64>,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            source: CameraSource::TestPattern,
            folder: None,
            resolution: (640, 480),
            failure_rate: 0.0,
            seed: None,
        }
    }
}
