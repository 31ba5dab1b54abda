use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::{
    camera::{capture_mirrored, open_camera, Camera, Frame},
    composition::{compose, CollageSequencer, SequencerState, TickEvent, TriggerOutcome, MAX_TIMER_SECONDS},
    config::{BoothConfig, Config},
    error::{BoothError, Result, TemplateError},
    filters::FilterRegistry,
    output::{CollageStore, Printer, SystemPrinter},
    templates::TemplateRegistry,
    booth::surface::Surface,
};

/// Status shown when capture is triggered with no template chosen
pub const SELECT_TEMPLATE_MESSAGE: &str = "Please select a template first!";

/// Operator input, as produced by whatever UI hosts the booth
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoothEvent {
    SetTimer(u32),
    SetFilter(String),
    SelectTemplate(String),
    Capture,
    Cancel,
    Print,
    ListTemplates,
    Status,
    Quit,
}

/// Request to run the sequencer for `session` after `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRequest {
    pub session: u64,
    pub delay: Duration,
}

/// Current values of the operator controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothSettings {
    pub timer_seconds: u32,
    pub filter: String,
    pub template: Option<String>,
}

impl From<&BoothConfig> for BoothSettings {
    fn from(config: &BoothConfig) -> Self {
        Self {
            timer_seconds: config.timer_seconds.min(MAX_TIMER_SECONDS),
            filter: config.filter.clone(),
            template: config.template.clone(),
        }
    }
}

/// The running photo booth
///
/// Owns the camera for its whole life; dropping the booth releases it.
/// All methods run on one thread and are driven by [`crate::booth::run_booth`].
pub struct Booth<S: Surface> {
    camera: Box<dyn Camera>,
    templates: TemplateRegistry,
    filters: FilterRegistry,
    sequencer: CollageSequencer,
    store: CollageStore,
    printer: Box<dyn Printer>,
    surface: S,
    settings: BoothSettings,
    collage_hold: Duration,
    holding_until: Option<Instant>,
    last_collage: Option<PathBuf>,
    collages_made: usize,
    missed_reads: usize,
}

impl<S: Surface> Booth<S> {
    pub fn new(
        camera: Box<dyn Camera>,
        templates: TemplateRegistry,
        store: CollageStore,
        surface: S,
        settings: BoothSettings,
    ) -> Self {
        let mut booth = Self {
            camera,
            templates,
            filters: FilterRegistry::new(),
            sequencer: CollageSequencer::new(),
            store,
            printer: Box::new(SystemPrinter::new()),
            surface,
            settings,
            collage_hold: Duration::ZERO,
            holding_until: None,
            last_collage: None,
            collages_made: 0,
            missed_reads: 0,
        };

        if let Some(name) = booth.settings.template.take() {
            booth.select_template(&name);
        }
        booth
    }

    /// Acquire the camera, load templates and prepare the output folder
    pub fn from_config(config: &Config, surface: S) -> Result<Self> {
        let camera = open_camera(&config.camera)?;
        let templates = TemplateRegistry::load_from_dir(&config.paths.templates_dir)?;
        let store = CollageStore::open(&config.paths.output_dir)?;

        let booth = Self::new(camera, templates, store, surface, BoothSettings::from(&config.booth))
            .with_collage_hold(config.display.collage_hold());
        Ok(booth)
    }

    pub fn with_printer(mut self, printer: Box<dyn Printer>) -> Self {
        self.printer = printer;
        self
    }

    /// Keep a finished collage on screen this long before the preview resumes
    pub fn with_collage_hold(mut self, hold: Duration) -> Self {
        self.collage_hold = hold;
        self
    }

    /// Apply one operator event
    ///
    /// Returns the first sequencer tick to schedule when a capture starts.
    pub fn handle(&mut self, event: BoothEvent) -> Option<TickRequest> {
        debug!("Booth event: {:?}", event);

        match event {
            BoothEvent::SetTimer(seconds) => {
                self.set_timer(seconds);
                None
            }
            BoothEvent::SetFilter(name) => {
                self.set_filter(name);
                None
            }
            BoothEvent::SelectTemplate(name) => {
                self.select_template(&name);
                None
            }
            BoothEvent::Capture => self.start_collage(),
            BoothEvent::Cancel => {
                if self.sequencer.cancel() {
                    self.surface.set_status("Capture cancelled");
                }
                None
            }
            BoothEvent::Print => {
                self.print_collage();
                None
            }
            BoothEvent::ListTemplates => {
                let names = self.templates.names().join(", ");
                self.surface.set_status(&format!("Templates: {}", names));
                None
            }
            BoothEvent::Status => {
                let status = self.describe();
                self.surface.set_status(&status);
                None
            }
            BoothEvent::Quit => None,
        }
    }

    fn set_timer(&mut self, seconds: u32) {
        let clamped = seconds.min(MAX_TIMER_SECONDS);
        self.settings.timer_seconds = clamped;
        self.sequencer.set_countdown(clamped);
        if clamped != seconds {
            self.surface
                .set_status(&format!("Timer limited to {} seconds", MAX_TIMER_SECONDS));
        } else {
            self.surface.set_status(&format!("Timer set to {} seconds", clamped));
        }
    }

    fn set_filter(&mut self, name: String) {
        if self.filters.has_filter(&name) {
            self.surface.set_status(&format!("Filter: {}", name));
        } else {
            self.surface
                .set_status(&format!("Unknown filter '{}', showing the unfiltered image", name));
        }
        self.settings.filter = name;
    }

    fn select_template(&mut self, name: &str) {
        match self.templates.get(name) {
            Some(template) => {
                if template.slots().is_empty() {
                    warn!("Template '{}' has no slot layout", name);
                }
                let status = format!("Template: {} ({} photo slots)", name, template.slots().len());
                self.settings.template = Some(name.to_string());
                self.surface.set_status(&status);
            }
            None => {
                let err = BoothError::from(TemplateError::NotFound { name: name.to_string() });
                self.surface.set_status(&err.user_message());
            }
        }
    }

    fn start_collage(&mut self) -> Option<TickRequest> {
        let template_selected = self
            .settings
            .template
            .as_deref()
            .map_or(false, |name| self.templates.get(name).is_some());

        match self.sequencer.trigger(template_selected, self.settings.timer_seconds) {
            TriggerOutcome::MissingTemplate => {
                self.surface.set_status(SELECT_TEMPLATE_MESSAGE);
                None
            }
            TriggerOutcome::Started { session } => {
                self.holding_until = None;
                Some(TickRequest {
                    session,
                    delay: Duration::ZERO,
                })
            }
        }
    }

    /// Run one sequencer step for `session`
    ///
    /// Returns the next tick to schedule, or `None` when the session is over
    /// or has been replaced.
    pub fn sequence_tick(&mut self, session: u64) -> Option<TickRequest> {
        let filters = &self.filters;
        let filter_name = self.settings.filter.as_str();
        let tick = self
            .sequencer
            .tick(session, self.camera.as_mut(), |frame| filters.apply(frame, filter_name))?;

        match tick.event {
            TickEvent::Countdown { remaining } => {
                self.surface.set_status(&format!("Capturing in {}...", remaining));
            }
            TickEvent::Captured { count } => debug!("Shot {} taken", count),
            TickEvent::Missed => {
                self.missed_reads += 1;
                debug!("No frame from camera, counting down again");
            }
            TickEvent::Complete(frames) => self.create_collage(&frames),
        }

        tick.next.map(|delay| TickRequest { session, delay })
    }

    fn create_collage(&mut self, frames: &[Frame]) {
        let collage = match self.settings.template.as_deref().and_then(|n| self.templates.get(n)) {
            Some(template) => compose(template, frames),
            None => {
                self.surface.set_status(SELECT_TEMPLATE_MESSAGE);
                return;
            }
        };
        let Some(collage) = collage else {
            return;
        };

        match self.store.save(&collage) {
            Ok(path) => {
                self.surface.show_collage(&collage);
                self.surface
                    .set_status(&format!("Collage saved to {}! Displaying...", path.display()));
                info!("Collage {} ready for printing", self.collages_made + 1);
                self.last_collage = Some(path);
                self.collages_made += 1;
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!("Saving collage failed: {}", e);
                } else {
                    error!("Collage output is unavailable: {}", e);
                }
                self.surface.show_collage(&collage);
                self.surface.set_status(&save_failure_status(&e));
            }
        }

        self.holding_until = Some(Instant::now() + self.collage_hold);
    }

    fn print_collage(&mut self) {
        match &self.last_collage {
            Some(path) => {
                self.printer.print(path);
                let status = format!("Sent {} to the printer", path.display());
                self.surface.set_status(&status);
            }
            None => self.surface.set_status("Nothing to print yet, take a collage first"),
        }
    }

    /// Refresh the live preview with one filtered, mirrored frame
    ///
    /// A failed read leaves the previous picture on screen.
    pub fn preview_tick(&mut self) {
        if let Some(until) = self.holding_until {
            if Instant::now() < until {
                return;
            }
            self.holding_until = None;
        }

        if let Some(frame) = capture_mirrored(self.camera.as_mut()) {
            let shown = self.filters.apply(&frame, &self.settings.filter);
            self.surface.show_frame(&shown);
        }
    }

    fn describe(&self) -> String {
        let state = match self.sequencer.state() {
            SequencerState::Idle => "idle".to_string(),
            SequencerState::Countdown(k) => format!("counting down ({})", k),
            SequencerState::Capturing => "capturing".to_string(),
        };
        format!(
            "Camera: {} | Template: {} | Filter: {} | Timer: {}s | {} | Collages: {} | Missed shots: {}",
            self.camera.name(),
            self.settings.template.as_deref().unwrap_or("none"),
            self.settings.filter,
            self.settings.timer_seconds,
            state,
            self.collages_made,
            self.missed_reads
        )
    }

    pub fn settings(&self) -> &BoothSettings {
        &self.settings
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn sequencer_state(&self) -> SequencerState {
        self.sequencer.state()
    }

    pub fn is_session_active(&self, session: u64) -> bool {
        self.sequencer.is_active(session)
    }

    /// Path of the most recent saved collage
    pub fn last_collage(&self) -> Option<&Path> {
        self.last_collage.as_deref()
    }

    pub fn collages_made(&self) -> usize {
        self.collages_made
    }

    /// Shot attempts where the camera had no frame
    pub fn missed_reads(&self) -> usize {
        self.missed_reads
    }
}

/// Status line after a failed save
///
/// Transient failures invite another capture; the rest need the operator to
/// fix the output folder first.
pub fn save_failure_status(err: &BoothError) -> String {
    if err.is_recoverable() {
        format!("{} Press capture to try again.", err.user_message())
    } else {
        format!("{} Collages cannot be saved until this is fixed.", err.user_message())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::camera::{CameraParams, TestPatternCamera};
    use crate::composition::{Collage, COUNTDOWN_TICK};
    use crate::templates::{template_positions, Template};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub frames: usize,
        pub collages: Vec<Collage>,
        pub statuses: Vec<String>,
    }

    impl Surface for RecordingSurface {
        fn show_frame(&mut self, _frame: &Frame) {
            self.frames += 1;
        }

        fn show_collage(&mut self, collage: &Collage) {
            self.collages.push(collage.clone());
        }

        fn set_status(&mut self, text: &str) {
            self.statuses.push(text.to_string());
        }
    }

    impl RecordingSurface {
        pub fn last_status(&self) -> &str {
            self.statuses.last().map(String::as_str).unwrap_or("")
        }
    }

    struct RecordingPrinter {
        jobs: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl Printer for RecordingPrinter {
        fn print(&self, path: &Path) {
            self.jobs.borrow_mut().push(path.to_path_buf());
        }
    }

    pub(crate) fn test_booth(dir: &TempDir, failure_rate: f32) -> Booth<RecordingSurface> {
        let params = CameraParams {
            resolution: (16, 12),
            failure_rate,
            seed: Some(42),
            ..CameraParams::default()
        };
        let camera = Box::new(TestPatternCamera::new(&params).unwrap());

        let mut templates = TemplateRegistry::new();
        let background = DynamicImage::ImageRgb8(RgbImage::from_pixel(1700, 1100, Rgb([250, 240, 230])));
        templates.insert(Template::new(
            "Birthday Party.png",
            background,
            template_positions("Birthday Party.png"),
        ));
        templates.insert(Template::new(
            "Mystery.png",
            DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([1, 2, 3]))),
            template_positions("Mystery.png"),
        ));

        let store = CollageStore::open(dir.path().join("images")).unwrap();
        let settings = BoothSettings::from(&BoothConfig::default());
        Booth::new(camera, templates, store, RecordingSurface::default(), settings)
    }

    fn drain(booth: &mut Booth<RecordingSurface>, first: TickRequest) -> Vec<TickRequest> {
        let mut requests = vec![first];
        let mut next = booth.sequence_tick(first.session);
        while let Some(request) = next {
            requests.push(request);
            next = booth.sequence_tick(request.session);
        }
        requests
    }

    #[test]
    fn test_capture_without_template() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        assert!(booth.handle(BoothEvent::Capture).is_none());
        assert_eq!(booth.surface().last_status(), SELECT_TEMPLATE_MESSAGE);
        assert_eq!(booth.sequencer_state(), SequencerState::Idle);
        assert!(booth.last_collage().is_none());
    }

    #[test]
    fn test_zero_timer_birthday_collage() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        booth.handle(BoothEvent::SetTimer(0));
        booth.handle(BoothEvent::SelectTemplate("Birthday Party.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();

        let requests = drain(&mut booth, first);
        assert!(requests.iter().all(|r| r.delay == Duration::ZERO));

        let saved = booth.last_collage().unwrap().to_path_buf();
        assert_eq!(saved.parent().unwrap(), dir.path().join("images"));
        let file_name = saved.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("collage_") && file_name.ends_with(".png"));
        assert_eq!(file_name.len(), "collage_YYYYMMDD_HHMMSS.png".len());

        let surface = booth.surface();
        assert_eq!(surface.collages.len(), 1);
        assert_eq!(surface.collages[0].placed(), 4);
        assert!(surface.last_status().starts_with("Collage saved to"));
        assert!(!surface.statuses.iter().any(|s| s.starts_with("Capturing in")));
    }

    #[test]
    fn test_countdown_statuses() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        booth.handle(BoothEvent::SetTimer(1));
        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();
        let requests = drain(&mut booth, first);

        let countdowns = booth
            .surface()
            .statuses
            .iter()
            .filter(|s| s.as_str() == "Capturing in 1...")
            .count();
        assert_eq!(countdowns, 4);
        assert!(requests.iter().any(|r| r.delay == Duration::from_secs(1)));
    }

    #[test]
    fn test_unknown_slot_template_leaves_image_unchanged() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        booth.handle(BoothEvent::SetTimer(0));
        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();
        drain(&mut booth, first);

        let collage = &booth.surface().collages[0];
        assert_eq!(collage.placed(), 0);
        assert_eq!(collage.image(), booth.templates().get("Mystery.png").unwrap().image());
    }

    #[test]
    fn test_flaky_camera_still_completes() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.5);

        booth.handle(BoothEvent::SetTimer(0));
        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();
        drain(&mut booth, first);

        assert_eq!(booth.collages_made(), 1);
    }

    #[test]
    fn test_print_requires_collage() {
        let dir = tempdir().unwrap();
        let jobs = Rc::new(RefCell::new(Vec::new()));
        let mut booth = test_booth(&dir, 0.0).with_printer(Box::new(RecordingPrinter { jobs: jobs.clone() }));

        booth.handle(BoothEvent::Print);
        assert!(jobs.borrow().is_empty());
        assert!(booth.surface().last_status().starts_with("Nothing to print"));

        booth.handle(BoothEvent::SetTimer(0));
        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();
        drain(&mut booth, first);
        booth.handle(BoothEvent::Print);

        assert_eq!(jobs.borrow().as_slice(), &[booth.last_collage().unwrap().to_path_buf()]);
    }

    #[test]
    fn test_unknown_template_keeps_selection() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        booth.handle(BoothEvent::SelectTemplate("Wedding.png".to_string()));

        assert_eq!(booth.settings().template.as_deref(), Some("Mystery.png"));
        assert!(booth.surface().last_status().contains("Wedding.png"));
    }

    #[test]
    fn test_timer_and_filter_controls() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        booth.handle(BoothEvent::SetTimer(25));
        assert_eq!(booth.settings().timer_seconds, MAX_TIMER_SECONDS);

        booth.handle(BoothEvent::SetFilter("sepia".to_string()));
        assert_eq!(booth.surface().last_status(), "Filter: sepia");

        booth.handle(BoothEvent::SetFilter("posterize".to_string()));
        assert_eq!(booth.settings().filter, "posterize");
        assert!(booth.surface().last_status().starts_with("Unknown filter"));

        booth.preview_tick();
        assert_eq!(booth.surface().frames, 1);
    }

    #[test]
    fn test_cancel_stops_session() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();
        assert!(booth.sequence_tick(first.session).is_some());

        booth.handle(BoothEvent::Cancel);
        assert!(booth.sequence_tick(first.session).is_none());
        assert_eq!(booth.surface().last_status(), "Capture cancelled");
    }

    #[test]
    fn test_save_failure_statuses() {
        let transient = BoothError::from(crate::error::OutputError::SaveFailed {
            path: "images/collage_20240101_000000.png".to_string(),
            reason: "No space left on device".to_string(),
        });
        assert!(save_failure_status(&transient).ends_with("Press capture to try again."));

        let io = BoothError::from(std::io::Error::new(std::io::ErrorKind::Interrupted, "busy"));
        assert!(save_failure_status(&io).ends_with("Press capture to try again."));
    }

    #[test]
    fn test_unusable_output_folder_is_reported() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        // A plain file where the output folder should be
        let output = dir.path().join("images");
        std::fs::remove_dir_all(&output).unwrap();
        std::fs::write(&output, "not a folder").unwrap();

        booth.handle(BoothEvent::SetTimer(0));
        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();
        drain(&mut booth, first);

        let surface = booth.surface();
        assert_eq!(booth.collages_made(), 0);
        assert!(booth.last_collage().is_none());
        assert_eq!(surface.collages.len(), 1);
        assert!(surface.last_status().starts_with("The output folder"));
        assert!(surface.last_status().ends_with("cannot be saved until this is fixed."));
    }

    #[test]
    fn test_timer_change_during_session() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0);

        booth.handle(BoothEvent::SetTimer(2));
        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();
        let second = booth.sequence_tick(first.session).unwrap();
        assert_eq!(second.delay, COUNTDOWN_TICK);

        booth.handle(BoothEvent::SetTimer(0));
        drain(&mut booth, second);

        let countdowns = booth
            .surface()
            .statuses
            .iter()
            .filter(|s| s.starts_with("Capturing in"))
            .count();
        // Only the first shot counted down
        assert_eq!(countdowns, 2);
        assert_eq!(booth.collages_made(), 1);
    }

    #[test]
    fn test_collage_hold_pauses_preview() {
        let dir = tempdir().unwrap();
        let mut booth = test_booth(&dir, 0.0).with_collage_hold(Duration::from_secs(3600));

        booth.handle(BoothEvent::SetTimer(0));
        booth.handle(BoothEvent::SelectTemplate("Mystery.png".to_string()));
        let first = booth.handle(BoothEvent::Capture).unwrap();
        drain(&mut booth, first);

        booth.preview_tick();
        assert_eq!(booth.surface().frames, 0);

        // A new capture resumes the live view
        booth.handle(BoothEvent::Capture);
        booth.preview_tick();
        assert_eq!(booth.surface().frames, 1);
    }
}
