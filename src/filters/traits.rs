use crate::camera::Frame;

/// Core trait that all booth filters implement
///
/// Filters are pure: the same frame and filter always give the same output,
/// and the input frame is never modified.
pub trait Filter: Send + Sync {
    /// Returns the unique name of this filter
    fn name(&self) -> &str;

    /// Returns a human-readable description of this filter
    fn description(&self) -> &str;

    /// Produce the filtered copy of `frame`
    ///
    /// Filters must accept both 3-channel and single-channel frames.
    fn apply(&self, frame: &Frame) -> Frame;
}
