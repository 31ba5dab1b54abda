use std::collections::HashMap;

use tracing::debug;

use crate::camera::Frame;
use crate::filters::{BlurFilter, Filter, GrayscaleFilter, IdentityFilter, SepiaFilter};

/// Names of the built-in filters, in the order the controls list them
pub const BUILTIN_FILTERS: [&str; 4] = ["none", "grayscale", "blur", "sepia"];

/// Registry for looking up filters by name
///
/// Lookups for unknown names fall back to the identity filter instead of failing.
pub struct FilterRegistry {
    filters: HashMap<String, Box<dyn Filter>>,
    identity: IdentityFilter,
}

impl FilterRegistry {
    /// Create a new filter registry with all built-in filters
    pub fn new() -> Self {
        let mut registry = Self {
            filters: HashMap::new(),
            identity: IdentityFilter::new(),
        };

        registry.register(Box::new(IdentityFilter::new()));
        registry.register(Box::new(GrayscaleFilter::new()));
        registry.register(Box::new(BlurFilter::new()));
        registry.register(Box::new(SepiaFilter::new()));
        registry
    }

    /// Register a filter under its own name, replacing any filter with the same name
    pub fn register(&mut self, filter: Box<dyn Filter>) {
        self.filters.insert(filter.name().to_string(), filter);
    }

    /// Get a filter by name
    pub fn get_filter(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|f| f.as_ref())
    }

    /// Apply the named filter, or pass the frame through if the name is unknown
    pub fn apply(&self, frame: &Frame, name: &str) -> Frame {
        match self.get_filter(name) {
            Some(filter) => filter.apply(frame),
            None => {
                debug!("Unknown filter '{}', passing frame through", name);
                self.identity.apply(frame)
            }
        }
    }

    /// Get all available filter names, sorted
    pub fn available_filters(&self) -> Vec<String> {
        let mut names: Vec<String> = self.filters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a filter is available
    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn striped_frame() -> Frame {
        Frame::new(RgbImage::from_fn(24, 16, |x, y| {
            Rgb([(x * 10) as u8, (y * 15) as u8, ((x + y) * 5) as u8])
        }))
    }

    #[test]
    fn test_builtin_filters_available() {
        let registry = FilterRegistry::new();
        for name in BUILTIN_FILTERS {
            assert!(registry.has_filter(name), "missing {}", name);
        }
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_unknown_filter_is_identity() {
        let registry = FilterRegistry::new();
        let frame = striped_frame();

        assert!(registry.get_filter("posterize").is_none());
        assert_eq!(registry.apply(&frame, "posterize"), frame);
    }

    #[test]
    fn test_filters_are_deterministic() {
        let registry = FilterRegistry::new();
        let frame = striped_frame();

        for name in BUILTIN_FILTERS {
            assert_eq!(registry.apply(&frame, name), registry.apply(&frame, name), "{}", name);
        }
    }

    #[test]
    fn test_channel_counts() {
        let registry = FilterRegistry::new();
        let frame = striped_frame();

        assert_eq!(registry.apply(&frame, "grayscale").channels(), 1);
        for name in ["none", "blur", "sepia"] {
            let out = registry.apply(&frame, name);
            assert_eq!(out.channels(), 3, "{}", name);
            assert_eq!((out.width(), out.height()), (24, 16));
        }
    }

    #[test]
    fn test_custom_filter_registration() {
        struct Invert;

        impl Filter for Invert {
            fn name(&self) -> &str {
                "invert"
            }

            fn description(&self) -> &str {
                "Negative image"
            }

            fn apply(&self, frame: &Frame) -> Frame {
                let mut rgb = frame.to_rgb8();
                rgb.pixels_mut().for_each(|p| p.0 = p.0.map(|v| 255 - v));
                Frame::new(rgb)
            }
        }

        let mut registry = FilterRegistry::new();
        registry.register(Box::new(Invert));

        assert!(registry.has_filter("invert"));
        assert_eq!(registry.len(), 5);
        let out = registry.apply(&Frame::new_filled(1, 1, [0, 100, 255]), "invert");
        assert_eq!(out.as_bytes(), &[255, 155, 0]);
    }
}
