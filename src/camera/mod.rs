//! # Camera Module
//!
//! Frame type and the frame sources that stand in for the video device.

pub mod source;
pub mod types;

pub use source::{capture_mirrored, open_camera, Camera, FolderCamera, TestPatternCamera};
pub use types::{CameraParams, CameraSource, Frame};
