use image::{Rgb, RgbImage};

use crate::{camera::Frame, filters::Filter};

/// Color mixing matrix, rows and columns in blue-green-red order
pub const SEPIA_KERNEL: [[f32; 3]; 3] = [
    [0.272, 0.534, 0.131],
    [0.349, 0.686, 0.168],
    [0.393, 0.769, 0.189],
];

/// Warm brown tone from a fixed linear color transform
pub struct SepiaFilter;

impl SepiaFilter {
    pub fn new() -> Self {
        Self
    }

    fn transform(pixel: &Rgb<u8>) -> Rgb<u8> {
        let [r, g, b] = pixel.0;
        let bgr = [b as f32, g as f32, r as f32];

        let mix = |row: &[f32; 3]| -> u8 {
            let value = row[0] * bgr[0] + row[1] * bgr[1] + row[2] * bgr[2];
            value.round().clamp(0.0, 255.0) as u8
        };

        let out_b = mix(&SEPIA_KERNEL[0]);
        let out_g = mix(&SEPIA_KERNEL[1]);
        let out_r = mix(&SEPIA_KERNEL[2]);
        Rgb([out_r, out_g, out_b])
    }
}

impl Default for SepiaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for SepiaFilter {
    fn name(&self) -> &str {
        "sepia"
    }

    fn description(&self) -> &str {
        "Old photograph look from a fixed color mixing matrix"
    }

    fn apply(&self, frame: &Frame) -> Frame {
        // Gray frames are expanded to RGB first
        let rgb = frame.to_rgb8();
        let toned = RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            Self::transform(rgb.get_pixel(x, y))
        });

        Frame::new(toned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_stays_black() {
        let out = SepiaFilter::new().apply(&Frame::new_filled(2, 2, [0, 0, 0]));
        assert!(out.as_bytes().iter().all(|&v| v == 0));
        assert_eq!(out.channels(), 3);
    }

    #[test]
    fn test_saturates_bright_pixels() {
        let out = SepiaFilter::new().apply(&Frame::new_filled(1, 1, [255, 255, 255]));
        // Row sums: blue 0.937, green 1.203, red 1.351
        assert_eq!(out.as_bytes(), &[255, 255, 239]);
    }

    #[test]
    fn test_channel_order() {
        // Pure blue input: only the first matrix column contributes
        let out = SepiaFilter::new().apply(&Frame::new_filled(1, 1, [0, 0, 100]));
        assert_eq!(out.as_bytes(), &[39, 35, 27]);
    }

    #[test]
    fn test_gray_frame_is_expanded() {
        let gray = Frame::from_luma(image::GrayImage::from_pixel(2, 2, image::Luma([50])));
        assert_eq!(SepiaFilter::new().apply(&gray).channels(), 3);
    }
}
