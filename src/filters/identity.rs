use crate::{camera::Frame, filters::Filter};

/// Passes frames through untouched
pub struct IdentityFilter;

impl IdentityFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdentityFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for IdentityFilter {
    fn name(&self) -> &str {
        "none"
    }

    fn description(&self) -> &str {
        "No filter, the camera image as captured"
    }

    fn apply(&self, frame: &Frame) -> Frame {
        frame.clone()
    }
}
