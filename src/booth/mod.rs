//! # Booth
//!
//! The running application: operator controls, live preview, capture
//! sequencing and the event loop that ties them together on one thread.

pub mod app;
pub mod controls;
pub mod runner;
pub mod surface;

pub use app::{save_failure_status, Booth, BoothEvent, BoothSettings, TickRequest, SELECT_TEMPLATE_MESSAGE};
pub use controls::{forward_commands, parse_command, spawn_stdin_controls, COMMANDS_HELP};
pub use runner::{run_booth, RunOptions};
pub use surface::{fit_frame, ConsoleSurface, Surface};
