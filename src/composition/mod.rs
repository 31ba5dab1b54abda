//! # Collage Composition
//!
//! The capture sequencer collects four timed shots; the compositor lays them
//! into the selected template.

pub mod compositor;
pub mod sequencer;

// Re-exports for convenience
pub use compositor::{compose, compose_onto, Collage, SHOTS_PER_COLLAGE};
pub use sequencer::{
    CaptureSession, CollageSequencer, SequencerState, Tick, TickEvent, TriggerOutcome,
    COUNTDOWN_TICK, DEFAULT_TIMER_SECONDS, MAX_TIMER_SECONDS, READ_RETRY_DELAY,
};
