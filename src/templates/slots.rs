use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TemplateError};

/// Rectangle in template pixel coordinates that one captured frame fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Slot {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

const BIRTHDAY_PARTY: [Slot; 4] = [
    Slot::new(798, 125, 874, 580),
    Slot::new(135, 765, 495, 315),
    Slot::new(668, 765, 483, 315),
    Slot::new(1188, 765, 495, 315),
];

const LAUNCH_PROGRAM: [Slot; 4] = [
    Slot::new(798, 115, 871, 570),
    Slot::new(128, 763, 472, 315),
    Slot::new(665, 763, 472, 315),
    Slot::new(1202, 763, 475, 312),
];

/// Built-in slot layout for a template file name
///
/// Only the two bundled templates are known; any other name has no slots.
pub fn template_positions(template_name: &str) -> Vec<Slot> {
    match template_name {
        "Birthday Party.png" => BIRTHDAY_PARTY.to_vec(),
        "Launch Program.png" => LAUNCH_PROGRAM.to_vec(),
        _ => Vec::new(),
    }
}

/// Slot layout stored next to a template as `<file name>.toml`
///
/// ```toml
/// [[slots]]
/// x = 40
/// y = 40
/// width = 300
/// height = 200
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotDescriptor {
    pub slots: Vec<Slot>,
}

impl SlotDescriptor {
    /// Sidecar path for a template image, e.g. `Wedding.png` -> `Wedding.png.toml`
    pub fn sidecar_path<P: AsRef<Path>>(template_path: P) -> PathBuf {
        let mut path = template_path.as_ref().as_os_str().to_owned();
        path.push(".toml");
        PathBuf::from(path)
    }

    /// Load the sidecar for a template, if one exists
    pub fn load_for<P: AsRef<Path>>(template_path: P) -> Result<Option<Self>> {
        let path = Self::sidecar_path(template_path);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let descriptor: SlotDescriptor =
            toml::from_str(&content).map_err(|e| TemplateError::InvalidDescriptor {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!("Loaded {} slots from {:?}", descriptor.slots.len(), path);
        Ok(Some(descriptor))
    }

    /// Write the descriptor as the sidecar of `template_path`
    pub fn save_for<P: AsRef<Path>>(&self, template_path: P) -> Result<()> {
        let path = Self::sidecar_path(template_path);
        let content = toml::to_string_pretty(self).map_err(|e| TemplateError::InvalidDescriptor {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Slots for a template: the sidecar descriptor wins over the built-in table
pub fn resolve_slots<P: AsRef<Path>>(template_path: P, template_name: &str) -> Result<Vec<Slot>> {
    if let Some(descriptor) = SlotDescriptor::load_for(&template_path)? {
        return Ok(descriptor.slots);
    }

    let slots = template_positions(template_name);
    if slots.is_empty() {
        warn!("Template '{}' has no slot layout, collages will leave it unchanged", template_name);
    }
    Ok(slots)
}
