use image::{imageops, DynamicImage, RgbImage};
use tracing::{debug, warn};

use crate::camera::Frame;
use crate::templates::{Slot, Template};

/// Number of shots that make up one collage
pub const SHOTS_PER_COLLAGE: usize = 4;

/// A finished collage: the template image with the captured shots in its slots
#[derive(Debug, Clone, PartialEq)]
pub struct Collage {
    template_name: String,
    image: DynamicImage,
    placed: usize,
}

impl Collage {
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// Number of shots actually written into the template
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Same as the template: 3 or 4
    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// RGB copy scaled to exactly `width` x `height`; alpha is dropped
    pub fn to_display(&self, width: u32, height: u32) -> RgbImage {
        imageops::resize(&self.image.to_rgb8(), width, height, imageops::FilterType::Triangle)
    }
}

/// Place four captured shots into a template's slots
///
/// Returns `None` unless exactly four frames are given. Templates with fewer
/// than four slots get only as many shots as they have slots.
pub fn compose(template: &Template, frames: &[Frame]) -> Option<Collage> {
    let (image, placed) = compose_onto(template.image(), template.slots(), frames)?;

    if placed < SHOTS_PER_COLLAGE {
        warn!(
            "Template '{}' only has room for {} of {} shots",
            template.name(),
            placed,
            SHOTS_PER_COLLAGE
        );
    }

    Some(Collage {
        template_name: template.name().to_string(),
        image,
        placed,
    })
}

/// Overwrite each slot of a copy of `base` with the matching resized frame
///
/// Slots are filled in index order. Each frame is scaled to its slot with
/// bilinear sampling, converted to the base layout (opaque RGBA for 4-channel
/// bases) and copied over the slot without any blending. Blocks running past
/// the base edge are clipped.
pub fn compose_onto(
    base: &DynamicImage,
    slots: &[Slot],
    frames: &[Frame],
) -> Option<(DynamicImage, usize)> {
    if frames.len() != SHOTS_PER_COLLAGE {
        debug!("Refusing to compose {} frames, need {}", frames.len(), SHOTS_PER_COLLAGE);
        return None;
    }

    let placements = slots
        .iter()
        .zip(frames)
        .filter(|(slot, _)| {
            let usable = slot.width > 0 && slot.height > 0;
            if !usable {
                warn!("Skipping empty slot {:?}", slot);
            }
            usable
        })
        .map(|(slot, frame)| (slot, frame.resized(slot.width, slot.height)));

    let mut placed = 0;
    let collage = match base {
        DynamicImage::ImageRgba8(rgba) => {
            let mut canvas = rgba.clone();
            for (slot, block) in placements {
                imageops::replace(&mut canvas, &block.to_rgba8(), slot.x as i64, slot.y as i64);
                placed += 1;
            }
            DynamicImage::ImageRgba8(canvas)
        }
        other => {
            let mut canvas = other.to_rgb8();
            for (slot, block) in placements {
                imageops::replace(&mut canvas, &block.to_rgb8(), slot.x as i64, slot.y as i64);
                placed += 1;
            }
            DynamicImage::ImageRgb8(canvas)
        }
    };

    Some((collage, placed))
}
