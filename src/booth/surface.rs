use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::{imageops, RgbImage};
use tracing::{info, warn};

use crate::camera::Frame;
use crate::composition::Collage;
use crate::config::DisplayConfig;

/// Where the booth shows its picture and status line
///
/// This is the seam to whatever UI hosts the booth.
pub trait Surface {
    /// Show a live preview frame
    fn show_frame(&mut self, frame: &Frame);

    /// Show a finished collage
    fn show_collage(&mut self, collage: &Collage);

    /// Replace the status line
    fn set_status(&mut self, text: &str);
}

/// Scale a preview frame to the display size as RGB
pub fn fit_frame(frame: &Frame, width: u32, height: u32) -> RgbImage {
    imageops::resize(&frame.to_rgb8(), width, height, imageops::FilterType::Triangle)
}

/// Headless surface: status lines go to the log, images to an optional snapshot file
pub struct ConsoleSurface {
    size: (u32, u32),
    snapshot: Option<PathBuf>,
    snapshot_every: Duration,
    last_snapshot: Option<Instant>,
    status: String,
}

impl ConsoleSurface {
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            size: (display.width, display.height),
            snapshot: display.snapshot.clone(),
            snapshot_every: Duration::from_secs(1),
            last_snapshot: None,
            status: String::new(),
        }
    }

    /// Current status line
    pub fn status(&self) -> &str {
        &self.status
    }

    fn write_snapshot(&mut self, image: &RgbImage) {
        let Some(path) = &self.snapshot else {
            return;
        };

        if let Err(e) = image.save_with_format(path, image::ImageFormat::Png) {
            warn!("Could not write display snapshot {:?}: {}", path, e);
        }
        self.last_snapshot = Some(Instant::now());
    }
}

impl Surface for ConsoleSurface {
    fn show_frame(&mut self, frame: &Frame) {
        if self.snapshot.is_none() {
            return;
        }

        // Preview snapshots are throttled; frames arrive every few milliseconds
        let due = self
            .last_snapshot
            .map_or(true, |last| last.elapsed() >= self.snapshot_every);
        if due {
            let image = fit_frame(frame, self.size.0, self.size.1);
            self.write_snapshot(&image);
        }
    }

    fn show_collage(&mut self, collage: &Collage) {
        info!(
            "Displaying collage from '{}' ({}x{})",
            collage.template_name(),
            collage.width(),
            collage.height()
        );
        if self.snapshot.is_some() {
            let image = collage.to_display(self.size.0, self.size.1);
            self.write_snapshot(&image);
        }
    }

    fn set_status(&mut self, text: &str) {
        info!("{}", text);
        self.status = text.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::compose;
    use crate::templates::Template;
    use image::{DynamicImage, GenericImageView};
    use tempfile::tempdir;

    #[test]
    fn test_fit_frame_scales_gray_to_rgb() {
        let gray = Frame::from_luma(image::GrayImage::new(40, 30));
        let fitted = fit_frame(&gray, 8, 6);
        assert_eq!(fitted.dimensions(), (8, 6));
    }

    #[test]
    fn test_collage_snapshot_uses_display_size() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("screen.png");
        let display = DisplayConfig {
            width: 80,
            height: 60,
            snapshot: Some(snapshot.clone()),
            ..DisplayConfig::default()
        };
        let mut surface = ConsoleSurface::new(&display);

        let template = Template::new("a.png", DynamicImage::new_rgba8(200, 100), vec![]);
        let frames = vec![Frame::new_filled(2, 2, [0, 0, 0]); 4];
        surface.show_collage(&compose(&template, &frames).unwrap());

        let written = image::open(&snapshot).unwrap();
        assert_eq!(written.dimensions(), (80, 60));
        assert_eq!(written.color().channel_count(), 3);
    }

    #[test]
    fn test_status_is_kept() {
        let mut surface = ConsoleSurface::new(&DisplayConfig::default());
        surface.set_status("Capturing in 3...");
        assert_eq!(surface.status(), "Capturing in 3...");
    }
}
