use thiserror::Error;

/// Main error type for the photo booth library
#[derive(Error, Debug)]
pub enum BoothError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Camera-specific errors
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera source: {source_name}")]
    OpenFailed { source_name: String },

    #[error("No usable frames found in: {path}")]
    NoFrames { path: String },

    #[error("Invalid camera parameters: {details}")]
    InvalidParameters { details: String },
}

/// Template-specific errors
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Failed to load template image: {path}")]
    LoadFailed { path: String },

    #[error("Template not found: {name}")]
    NotFound { name: String },

    #[error("Invalid slot descriptor: {path} - {reason}")]
    InvalidDescriptor { path: String, reason: String },
}

/// Output-specific errors
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {path}")]
    DirectoryFailed { path: String },

    #[error("Failed to save collage: {path} - {reason}")]
    SaveFailed { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using BoothError
pub type Result<T> = std::result::Result<T, BoothError>;

impl BoothError {
    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            // A full disk or a locked file may clear up before the next collage
            Self::Output(OutputError::SaveFailed { .. }) => true,
            Self::Camera(CameraError::OpenFailed { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Template(TemplateError::NotFound { name }) => {
                format!("Template '{}' is not available. Use 'templates' to list the loaded ones.", name)
            }
            Self::Template(TemplateError::DirectoryNotFound { path }) => {
                format!("Template folder '{}' does not exist.", path)
            }
            Self::Camera(CameraError::NoFrames { path }) => {
                format!("The camera folder '{}' has no images to show.", path)
            }
            Self::Output(OutputError::DirectoryFailed { path }) => {
                format!("The output folder '{}' cannot be created.", path)
            }
            Self::Output(OutputError::SaveFailed { path, .. }) => {
                format!("Could not save the collage to '{}'.", path)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
