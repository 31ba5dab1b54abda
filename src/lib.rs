//! # Photo Booth
//!
//! Turn four timed camera shots into a collage on a pre-designed template,
//! save it, and send it to the printer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photo_booth::{
//!     booth::{run_booth, Booth, BoothEvent, ConsoleSurface, RunOptions},
//!     config::Config,
//! };
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let mut booth = Booth::from_config(&config, ConsoleSurface::new(&config.display))?;
//!
//! let (tx, rx) = mpsc::channel(8);
//! tx.send(BoothEvent::SelectTemplate("Birthday Party.png".to_string())).await?;
//! tx.send(BoothEvent::Capture).await?;
//! drop(tx);
//!
//! let options = RunOptions { exit_after_collage: true, ..RunOptions::default() };
//! run_booth(&mut booth, rx, &options).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`camera`] - Frame type and camera sources
//! - [`filters`] - Per-frame image filters
//! - [`templates`] - Collage templates and their slot layouts
//! - [`composition`] - Capture sequencing and collage compositing
//! - [`output`] - Saving and printing collages
//! - [`booth`] - Controls, display surface and the event loop
//! - [`config`] - Configuration management
//!
//! ## Custom Filters
//!
//! Extra filters can be registered by implementing the [`Filter`](filters::Filter) trait:
//!
//! ```rust
//! use photo_booth::camera::Frame;
//! use photo_booth::filters::{Filter, FilterRegistry};
//!
//! struct Dim;
//!
//! impl Filter for Dim {
//!     fn name(&self) -> &str {
//!         "dim"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Half brightness"
//!     }
//!
//!     fn apply(&self, frame: &Frame) -> Frame {
//!         let mut rgb = frame.to_rgb8();
//!         rgb.pixels_mut().for_each(|p| p.0 = p.0.map(|v| v / 2));
//!         Frame::new(rgb)
//!     }
//! }
//!
//! let mut registry = FilterRegistry::new();
//! registry.register(Box::new(Dim));
//! assert!(registry.has_filter("dim"));
//! ```

pub mod booth;
pub mod camera;
pub mod composition;
pub mod config;
pub mod error;
pub mod filters;
pub mod output;
pub mod templates;

// Re-export commonly used types for convenience
pub use crate::{
    booth::{Booth, BoothEvent},
    camera::Frame,
    composition::{compose, Collage, CollageSequencer},
    config::Config,
    error::{BoothError, Result},
    filters::{apply_filter, Filter, FilterRegistry},
    templates::{Template, TemplateRegistry},
};
