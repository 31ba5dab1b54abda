//! # Template Registry
//!
//! Collage backgrounds loaded once at startup, each with the slot rectangles
//! the four captured shots are placed into.

pub mod registry;
pub mod slots;

pub use registry::{Template, TemplateRegistry};
pub use slots::{resolve_slots, template_positions, Slot, SlotDescriptor};
