use image::{GrayImage, Luma};

use crate::{camera::Frame, filters::Filter};

/// Luminance conversion to a single-channel frame
pub struct GrayscaleFilter;

impl GrayscaleFilter {
    pub fn new() -> Self {
        Self
    }

    /// ITU-R BT.601 luma, the weighting webcams and most video tools use
    fn luma(pixel: &[u8]) -> u8 {
        let y = 0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32;
        y.round().min(255.0) as u8
    }
}

impl Default for GrayscaleFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for GrayscaleFilter {
    fn name(&self) -> &str {
        "grayscale"
    }

    fn description(&self) -> &str {
        "Black and white, one luminance channel"
    }

    fn apply(&self, frame: &Frame) -> Frame {
        if frame.is_grayscale() {
            return frame.clone();
        }

        let rgb = frame.to_rgb8();
        let gray = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            Luma([Self::luma(&rgb.get_pixel(x, y).0)])
        });

        Frame::from_luma(gray)
    }
}
