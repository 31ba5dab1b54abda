use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::composition::Collage;
use crate::error::{OutputError, Result};

/// Folder that receives one PNG per finished collage
///
/// Files are named after the local time with second resolution, so two
/// collages finished within the same second share a name and the later one
/// replaces the earlier.
#[derive(Debug, Clone)]
pub struct CollageStore {
    dir: PathBuf,
}

impl CollageStore {
    /// Use `dir` as the output folder, creating it if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let store = Self {
            dir: dir.as_ref().to_path_buf(),
        };
        store.ensure_dir()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|_| OutputError::DirectoryFailed {
            path: self.dir.display().to_string(),
        })?;
        Ok(())
    }

    /// `collage_<YYYYMMDD_HHMMSS>.png`
    pub fn file_name_for(time: &DateTime<Local>) -> String {
        format!("collage_{}.png", time.format("%Y%m%d_%H%M%S"))
    }

    /// Save with the current local time in the name
    pub fn save(&self, collage: &Collage) -> Result<PathBuf> {
        self.save_at(collage, &Local::now())
    }

    /// Save with `time` in the name, returning the written path
    pub fn save_at(&self, collage: &Collage, time: &DateTime<Local>) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(Self::file_name_for(time));

        if path.exists() {
            debug!("Overwriting {:?}", path);
        }

        collage
            .image()
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| OutputError::SaveFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!("Saved collage to {:?}", path);
        Ok(path)
    }
}
