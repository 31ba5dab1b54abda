use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::camera::types::{CameraParams, CameraSource, Frame};
use crate::error::{CameraError, Result};

/// A frame producer standing in for the video device
///
/// Reads are synchronous. `None` means no frame was available for this read;
/// callers treat that as a skipped tick, never as a fatal error.
pub trait Camera {
    /// Human-readable name of the source
    fn name(&self) -> &str;

    /// Read the next raw (unmirrored) frame
    fn read(&mut self) -> Option<Frame>;
}

/// Read one frame and mirror it, the way every frame enters the booth
pub fn capture_mirrored(camera: &mut dyn Camera) -> Option<Frame> {
    camera.read().map(|frame| frame.mirrored())
}

/// Acquire the configured camera source
///
/// The returned handle is held for the life of the booth and released when dropped.
pub fn open_camera(params: &CameraParams) -> Result<Box<dyn Camera>> {
    if !(0.0..=1.0).contains(&params.failure_rate) {
        return Err(CameraError::InvalidParameters {
            details: format!("failure_rate {} is outside 0.0-1.0", params.failure_rate),
        }
        .into());
    }

    let camera: Box<dyn Camera> = match params.source {
        CameraSource::TestPattern => Box::new(TestPatternCamera::new(params)?),
        CameraSource::Folder => {
            let folder = params.folder.as_ref().ok_or_else(|| CameraError::InvalidParameters {
                details: "the folder source needs camera.folder".to_string(),
            })?;
            Box::new(FolderCamera::open(folder)?)
        }
    };

    info!("Acquired camera: {}", camera.name());
    Ok(camera)
}

/// Synthetic camera producing a slowly cycling color gradient
///
/// The hue runs left to right across each frame so mirroring is visible.
pub struct TestPatternCamera {
    width: u32,
    height: u32,
    frame_index: u64,
    failure_rate: f32,
    rng: SmallRng,
}

impl TestPatternCamera {
    pub fn new(params: &CameraParams) -> Result<Self> {
        let (width, height) = params.resolution;
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidParameters {
                details: format!("resolution {}x{}", width, height),
            }
            .into());
        }

        let rng = match params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Ok(Self {
            width,
            height,
            frame_index: 0,
            failure_rate: params.failure_rate,
            rng,
        })
    }

    fn render(&self) -> Frame {
        let base_hue = (self.frame_index * 6 % 360) as f32;
        let (width, height) = (self.width as f32, self.height as f32);

        let buffer = ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let hue = (base_hue + x as f32 / width * 120.0) % 360.0;
            let value = 0.4 + 0.5 * (y as f32 / height);
            Rgb(hsv_to_rgb(hue, 0.6, value))
        });

        Frame::new(buffer)
    }
}

impl Camera for TestPatternCamera {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn read(&mut self) -> Option<Frame> {
        self.frame_index += 1;

        if self.failure_rate > 0.0 && self.rng.gen::<f32>() < self.failure_rate {
            debug!("Simulated camera read failure at frame {}", self.frame_index);
            return None;
        }

        Some(self.render())
    }
}

impl Drop for TestPatternCamera {
    fn drop(&mut self) {
        debug!("Released test-pattern camera after {} reads", self.frame_index);
    }
}

/// Camera replaying still images from a folder in file name order
pub struct FolderCamera {
    name: String,
    frames: Vec<PathBuf>,
    cursor: usize,
}

impl FolderCamera {
    pub fn open<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let folder = folder.as_ref();
        let entries = std::fs::read_dir(folder).map_err(|_| CameraError::OpenFailed {
            source_name: folder.display().to_string(),
        })?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && Self::is_image_file(path))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(CameraError::NoFrames {
                path: folder.display().to_string(),
            }
            .into());
        }

        debug!("Folder camera found {} frames in {:?}", frames.len(), folder);

        Ok(Self {
            name: format!("folder:{}", folder.display()),
            frames,
            cursor: 0,
        })
    }

    fn is_image_file(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref(),
            Some("png") | Some("jpg") | Some("jpeg")
        )
    }
}

impl Camera for FolderCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self) -> Option<Frame> {
        let path = &self.frames[self.cursor];
        self.cursor = (self.cursor + 1) % self.frames.len();

        match image::open(path) {
            Ok(image) => Some(Frame::new(image.to_rgb8())),
            Err(e) => {
                warn!("Camera read failed for {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Drop for FolderCamera {
    fn drop(&mut self) {
        debug!("Released camera {}", self.name);
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    [
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pattern_frames_have_configured_size() {
        let params = CameraParams {
            resolution: (32, 24),
            ..CameraParams::default()
        };
        let mut camera = open_camera(&params).unwrap();

        let frame = camera.read().unwrap();
        assert_eq!((frame.width(), frame.height()), (32, 24));
        assert_eq!(frame.channels(), 3);
    }

    #[test]
    fn test_failure_rate_one_never_yields_frames() {
        let params = CameraParams {
            resolution: (8, 8),
            failure_rate: 1.0,
            seed: Some(7),
            ..CameraParams::default()
        };
        let mut camera = TestPatternCamera::new(&params).unwrap();

        assert!((0..10).all(|_| camera.read().is_none()));
    }

    #[test]
    fn test_capture_mirrored_flips_raw_frame() {
        let params = CameraParams {
            resolution: (16, 4),
            ..CameraParams::default()
        };
        let mut raw = TestPatternCamera::new(&params).unwrap();
        let mut mirrored = TestPatternCamera::new(&params).unwrap();

        let expected = raw.read().unwrap().mirrored();
        assert_eq!(capture_mirrored(&mut mirrored), Some(expected));
    }

    #[test]
    fn test_folder_camera_cycles_in_name_order() {
        let dir = tempdir().unwrap();
        Frame::new_filled(4, 4, [10, 10, 10]).save_png(dir.path().join("b.png")).unwrap();
        Frame::new_filled(4, 4, [200, 0, 0]).save_png(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut camera = FolderCamera::open(dir.path()).unwrap();
        assert_eq!(camera.read().unwrap().to_rgb8().get_pixel(0, 0), &Rgb([200, 0, 0]));
        assert_eq!(camera.read().unwrap().to_rgb8().get_pixel(0, 0), &Rgb([10, 10, 10]));
        assert_eq!(camera.read().unwrap().to_rgb8().get_pixel(0, 0), &Rgb([200, 0, 0]));
    }

    #[test]
    fn test_empty_folder_is_rejected() {
        let dir = tempdir().unwrap();
        assert!(FolderCamera::open(dir.path()).is_err());
    }

    #[test]
    fn test_folder_source_requires_path() {
        let params = CameraParams {
            source: CameraSource::Folder,
            ..CameraParams::default()
        };
        assert!(open_camera(&params).is_err());
    }
}
