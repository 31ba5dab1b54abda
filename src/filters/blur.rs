use image::{GrayImage, ImageBuffer, RgbImage};
use rayon::prelude::*;

use crate::{camera::Frame, filters::Filter};

/// Side length of the square Gaussian kernel
pub const BLUR_KERNEL_SIZE: usize = 15;

/// Isotropic Gaussian smoothing with a fixed kernel size
///
/// Sigma is derived from the kernel size and borders are mirrored without
/// repeating the edge pixel (reflect-101), so a flat image stays flat.
pub struct BlurFilter {
    kernel: Vec<f32>,
}

impl BlurFilter {
    pub fn new() -> Self {
        Self::with_kernel_size(BLUR_KERNEL_SIZE)
    }

    /// Build a blur with an odd kernel size other than the default
    pub fn with_kernel_size(size: usize) -> Self {
        Self {
            kernel: gaussian_kernel(size.max(1) | 1),
        }
    }

    /// Standard deviation used for a kernel of `size` taps
    pub fn sigma_for(size: usize) -> f32 {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }

    fn convolve(&self, data: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
        let radius = (self.kernel.len() / 2) as isize;
        let row_len = width * channels;

        let mut horizontal = vec![0f32; data.len()];
        horizontal
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                let src = &data[y * row_len..(y + 1) * row_len];
                for x in 0..width {
                    for c in 0..channels {
                        let acc: f32 = self
                            .kernel
                            .iter()
                            .enumerate()
                            .map(|(k, w)| {
                                let sx = reflect_101(x as isize + k as isize - radius, width);
                                w * src[sx * channels + c] as f32
                            })
                            .sum();
                        row[x * channels + c] = acc;
                    }
                }
            });

        let mut out = vec![0u8; data.len()];
        out.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (i, value) in row.iter_mut().enumerate() {
                    let acc: f32 = self
                        .kernel
                        .iter()
                        .enumerate()
                        .map(|(k, w)| {
                            let sy = reflect_101(y as isize + k as isize - radius, height);
                            w * horizontal[sy * row_len + i]
                        })
                        .sum();
                    *value = acc.round().clamp(0.0, 255.0) as u8;
                }
            });

        out
    }
}

impl Default for BlurFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for BlurFilter {
    fn name(&self) -> &str {
        "blur"
    }

    fn description(&self) -> &str {
        "Soft focus from a 15x15 Gaussian blur"
    }

    fn apply(&self, frame: &Frame) -> Frame {
        if frame.width() == 0 || frame.height() == 0 {
            return frame.clone();
        }

        let (width, height) = (frame.width(), frame.height());
        let channels = frame.channels() as usize;
        let blurred = self.convolve(frame.as_bytes(), width as usize, height as usize, channels);

        let rebuilt = if frame.is_grayscale() {
            GrayImage::from_raw(width, height, blurred).map(Frame::from_luma)
        } else {
            let rgb: Option<RgbImage> = ImageBuffer::from_raw(width, height, blurred);
            rgb.map(Frame::new)
        };

        rebuilt.unwrap_or_else(|| frame.clone())
    }
}

fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = BlurFilter::sigma_for(size);
    let half = (size / 2) as f32;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Mirror an out-of-range index back into `0..len` without repeating the edge
fn reflect_101(mut index: isize, len: usize) -> usize {
    let len = len as isize;
    if len == 1 {
        return 0;
    }

    while index < 0 || index >= len {
        if index < 0 {
            index = -index;
        }
        if index >= len {
            index = 2 * len - 2 - index;
        }
    }

    index as usize
}
