use std::time::Duration;

use tracing::{debug, info};

use crate::camera::{capture_mirrored, Camera, Frame};
use crate::composition::compositor::SHOTS_PER_COLLAGE;

/// Delay between two countdown messages
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Delay before retrying after the camera had no frame
pub const READ_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Default per-shot countdown in seconds
pub const DEFAULT_TIMER_SECONDS: u32 = 3;

/// Longest per-shot countdown the controls allow
pub const MAX_TIMER_SECONDS: u32 = 10;

/// Where the sequencer is in a collage run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// No session pending
    Idle,
    /// Counting down to the next shot; the value is the next number shown
    Countdown(u32),
    /// The next tick reads a frame
    Capturing,
}

/// Transient state of one collage run
#[derive(Debug, Clone)]
pub struct CaptureSession {
    id: u64,
    frames: Vec<Frame>,
    remaining: u32,
    countdown: u32,
}

impl CaptureSession {
    fn new(id: u64, countdown: u32) -> Self {
        Self {
            id,
            frames: Vec::with_capacity(SHOTS_PER_COLLAGE),
            remaining: countdown,
            countdown,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Seconds left before the next shot
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Countdown used for the next shot
    pub fn countdown(&self) -> u32 {
        self.countdown
    }
}

/// Result of asking for a new collage run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// No template is selected; nothing was started
    MissingTemplate,
    /// A session started; its first tick is due immediately
    Started { session: u64 },
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// Show "Capturing in {remaining}..."
    Countdown { remaining: u32 },
    /// A shot was taken; `count` shots exist now
    Captured { count: usize },
    /// The camera had no frame; nothing was appended and the full countdown
    /// for this shot runs again before the next read
    Missed,
    /// All four shots are in
    Complete(Vec<Frame>),
}

/// A tick's event and when the next one is due
///
/// `next` is `None` once the session is over.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub event: TickEvent,
    pub next: Option<Duration>,
}

/// Timed multi-shot capture state machine
///
/// The sequencer never sleeps. Each `tick` does one step and reports the
/// delay until the next one; the caller owns the timer. Every session has a
/// fresh id and ticks carrying another id are ignored, so a countdown left
/// over from an earlier trigger can never advance a newer session.
#[derive(Debug)]
pub struct CollageSequencer {
    session: Option<CaptureSession>,
    next_id: u64,
}

impl CollageSequencer {
    pub fn new() -> Self {
        Self {
            session: None,
            next_id: 1,
        }
    }

    /// Start a collage run
    ///
    /// Without a template nothing changes. A session that is still pending
    /// is cancelled and replaced.
    pub fn trigger(&mut self, template_selected: bool, timer_seconds: u32) -> TriggerOutcome {
        if !template_selected {
            debug!("Capture requested without a template");
            return TriggerOutcome::MissingTemplate;
        }

        if let Some(old) = self.session.take() {
            info!("Cancelling session {} with {} shots taken", old.id, old.frames.len());
        }

        let id = self.next_id;
        self.next_id += 1;
        let countdown = timer_seconds.min(MAX_TIMER_SECONDS);
        self.session = Some(CaptureSession::new(id, countdown));

        info!("Starting collage session {} ({}s per shot)", id, countdown);
        TriggerOutcome::Started { session: id }
    }

    /// Advance session `session_id` by one step
    ///
    /// Returns `None` when that session is no longer the current one.
    /// `filter` is applied to each shot as it is taken.
    pub fn tick<F>(&mut self, session_id: u64, camera: &mut dyn Camera, filter: F) -> Option<Tick>
    where
        F: Fn(&Frame) -> Frame,
    {
        let session = self.session.as_mut().filter(|s| s.id == session_id)?;

        if session.remaining > 0 {
            let remaining = session.remaining;
            session.remaining -= 1;
            return Some(Tick {
                event: TickEvent::Countdown { remaining },
                next: Some(COUNTDOWN_TICK),
            });
        }

        let (event, next) = match capture_mirrored(camera) {
            Some(frame) => {
                session.frames.push(filter(&frame));
                debug!("Session {} captured shot {}", session.id, session.frames.len());
                let event = TickEvent::Captured {
                    count: session.frames.len(),
                };
                (event, Duration::ZERO)
            }
            None => {
                debug!("Session {} camera read failed, retrying", session.id);
                (TickEvent::Missed, READ_RETRY_DELAY)
            }
        };
        session.remaining = session.countdown;

        if session.frames.len() == SHOTS_PER_COLLAGE {
            let finished = self.session.take().map(|s| s.frames).unwrap_or_default();
            info!("Session {} complete", session_id);
            return Some(Tick {
                event: TickEvent::Complete(finished),
                next: None,
            });
        }

        Some(Tick {
            event,
            next: Some(next),
        })
    }

    /// Change the countdown of the running session
    ///
    /// Takes effect from the next shot; a countdown already in progress
    /// finishes with its old length.
    pub fn set_countdown(&mut self, timer_seconds: u32) {
        if let Some(session) = self.session.as_mut() {
            session.countdown = timer_seconds.min(MAX_TIMER_SECONDS);
            debug!("Session {} countdown now {}s", session.id, session.countdown);
        }
    }

    /// Drop the pending session, if any
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                info!("Cancelled session {}", session.id);
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> SequencerState {
        match &self.session {
            None => SequencerState::Idle,
            Some(s) if s.remaining > 0 => SequencerState::Countdown(s.remaining),
            Some(_) => SequencerState::Capturing,
        }
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self, session_id: u64) -> bool {
        self.session.as_ref().map_or(false, |s| s.id == session_id)
    }
}

impl Default for CollageSequencer {
    fn default() -> Self {
        Self::new()
    }
}
