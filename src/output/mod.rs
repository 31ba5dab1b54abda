//! # Persistence and Print Bridge
//!
//! Writes finished collages to disk and forwards them to the printer.

pub mod print;
pub mod store;

pub use print::{Printer, SystemPrinter};
pub use store::CollageStore;
