use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{Result, TemplateError};
use crate::templates::slots::{resolve_slots, Slot};

/// A collage background with the rectangles the captured shots go into
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    path: PathBuf,
    image: DynamicImage,
    slots: Vec<Slot>,
}

impl Template {
    /// Create a template from an already decoded image
    ///
    /// The image is kept as RGBA when it carries alpha, otherwise as RGB.
    pub fn new<S: Into<String>>(name: S, image: DynamicImage, slots: Vec<Slot>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            image: normalize_layout(image),
            slots,
        }
    }

    /// Load a template file and resolve its slot layout
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TemplateError::LoadFailed {
                path: path.display().to_string(),
            })?
            .to_string();

        let image = image::open(path).map_err(|_| TemplateError::LoadFailed {
            path: path.display().to_string(),
        })?;
        let slots = resolve_slots(path, &name)?;

        let mut template = Self::new(name, image, slots);
        template.path = path.to_path_buf();
        Ok(template)
    }

    /// File name the template is keyed by, extension included
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 3 for RGB templates, 4 for RGBA templates
    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }
}

fn normalize_layout(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// All templates found in the template folder, keyed by file name
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a folder once and load every `.png` and `.jpg` file in it
    ///
    /// Files that fail to decode are skipped with a warning.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|_| TemplateError::DirectoryNotFound {
            path: dir.display().to_string(),
        })?;

        let mut registry = Self::new();
        for entry in entries {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if !Self::is_template_file(file_name) || !path.is_file() {
                continue;
            }

            match Template::load(&path) {
                Ok(template) => {
                    debug!(
                        "Loaded template '{}' ({}x{}, {} channels, {} slots)",
                        template.name(),
                        template.width(),
                        template.height(),
                        template.channels(),
                        template.slots().len()
                    );
                    registry.insert(template);
                }
                Err(e) => warn!("Skipping template {:?}: {}", path, e),
            }
        }

        info!("Loaded {} templates from {:?}", registry.len(), dir);
        Ok(registry)
    }

    fn is_template_file(file_name: &str) -> bool {
        file_name.ends_with(".png") || file_name.ends_with(".jpg")
    }

    /// Add or replace a template
    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name().to_string(), template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
