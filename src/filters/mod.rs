//! # Filter Stage
//!
//! Pure per-frame image filters applied to the live preview and to every
//! captured shot.
//!
//! ## Built-in Filters
//!
//! - **none**: identity
//! - **grayscale**: single-channel luminance
//! - **blur**: 15x15 Gaussian smoothing
//! - **sepia**: fixed color mixing matrix
//!
//! ## Usage
//!
//! ```rust
//! use photo_booth::camera::Frame;
//! use photo_booth::filters::apply_filter;
//!
//! let frame = Frame::new_filled(64, 48, [200, 120, 40]);
//! let toned = apply_filter(&frame, "sepia");
//! assert_eq!(toned.channels(), 3);
//! ```

pub mod blur;
pub mod grayscale;
pub mod identity;
pub mod registry;
pub mod sepia;
pub mod traits;

pub use blur::BlurFilter;
pub use grayscale::GrayscaleFilter;
pub use identity::IdentityFilter;
pub use registry::{FilterRegistry, BUILTIN_FILTERS};
pub use sepia::SepiaFilter;
pub use traits::Filter;

use crate::camera::Frame;

/// Apply a built-in filter by name; unknown names return the frame unchanged
pub fn apply_filter(frame: &Frame, filter_name: &str) -> Frame {
    FilterRegistry::new().apply(frame, filter_name)
}
