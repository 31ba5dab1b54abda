use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::booth::app::{Booth, BoothEvent, TickRequest};
use crate::booth::surface::Surface;

/// Shortest preview period the loop accepts
pub const MIN_PREVIEW_INTERVAL: Duration = Duration::from_millis(1);

/// How the event loop runs
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Live preview refresh period, raised to [`MIN_PREVIEW_INTERVAL`] if shorter
    pub preview_interval: Duration,

    /// Stop as soon as one collage has been produced
    pub exit_after_collage: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            preview_interval: Duration::from_millis(10),
            exit_after_collage: false,
        }
    }
}

/// The single scheduled sequencer tick
///
/// Scheduling a new one replaces the old, which is how a new trigger
/// cancels a countdown still pending from an earlier one.
#[derive(Debug, Clone, Copy)]
struct PendingTick {
    session: u64,
    deadline: Instant,
}

impl From<TickRequest> for PendingTick {
    fn from(request: TickRequest) -> Self {
        Self {
            session: request.session,
            deadline: Instant::now() + request.delay,
        }
    }
}

/// Drive the booth until `Quit` arrives or the event channel closes
///
/// Everything runs cooperatively on the calling task: the preview refresh,
/// the countdown ticks and the operator events never overlap.
pub async fn run_booth<S: Surface>(
    booth: &mut Booth<S>,
    mut events: mpsc::Receiver<BoothEvent>,
    options: &RunOptions,
) {
    let period = options.preview_interval.max(MIN_PREVIEW_INTERVAL);
    let mut preview = time::interval(period);
    preview.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut pending: Option<PendingTick> = None;
    let mut events_open = true;
    let collages_at_start = booth.collages_made();

    info!("Booth running, preview every {:?}", period);

    loop {
        let deadline = pending.map(|p| p.deadline).unwrap_or_else(Instant::now);

        tokio::select! {
            _ = preview.tick() => booth.preview_tick(),

            _ = time::sleep_until(deadline), if pending.is_some() => {
                if let Some(tick) = pending.take() {
                    pending = booth.sequence_tick(tick.session).map(PendingTick::from);
                }
            }

            event = events.recv(), if events_open => match event {
                Some(BoothEvent::Quit) => {
                    info!("Quit requested");
                    break;
                }
                Some(event) => {
                    if let Some(request) = booth.handle(event) {
                        pending = Some(request.into());
                    }
                }
                None if options.exit_after_collage && pending.is_some() => {
                    debug!("Controls closed, finishing the running collage");
                    events_open = false;
                }
                None => {
                    debug!("Controls closed");
                    break;
                }
            },
        }

        // Cancelled sessions leave nothing scheduled
        if pending.map_or(false, |p| !booth.is_session_active(p.session)) {
            pending = None;
        }

        if options.exit_after_collage && booth.collages_made() > collages_at_start {
            break;
        }

        if !events_open && pending.is_none() {
            break;
        }
    }

    info!("Booth stopped after {} collages", booth.collages_made());
}
