use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use photo_booth::{
    booth::{run_booth, spawn_stdin_controls, Booth, BoothEvent, ConsoleSurface, RunOptions, COMMANDS_HELP},
    camera::{CameraSource, Frame},
    config::Config,
    filters::apply_filter,
    templates::TemplateRegistry,
};

#[derive(Parser)]
#[command(
    name = "photo-booth",
    version,
    about = "Turn four timed camera shots into a printable collage",
    long_about = "Photo Booth captures four mirrored, filtered shots with a countdown between each, places them into the slots of a collage template, saves the result and can send it to the printer."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Folder with collage templates
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,

    /// Folder collages are saved to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Replay still images from this folder instead of the test pattern
    #[arg(long, global = true)]
    camera_folder: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the booth, reading controls from standard input
    Run(SessionArgs),

    /// Take one collage and exit
    Collage {
        #[command(flatten)]
        session: SessionArgs,

        /// Send the collage to the printer once saved
        #[arg(long)]
        print: bool,
    },

    /// List the loaded templates and their photo slots
    Templates,

    /// Apply a filter to an image file
    Filter {
        /// Input image
        input: PathBuf,

        /// Output PNG
        output: PathBuf,

        /// Filter to apply (none, grayscale, blur, sepia)
        #[arg(short, long, default_value = "sepia")]
        name: String,
    },
}

#[derive(Args)]
struct SessionArgs {
    /// Template file name, e.g. "Birthday Party.png"
    #[arg(short, long)]
    template: Option<String>,

    /// Filter (none, grayscale, blur, sepia)
    #[arg(short, long)]
    filter: Option<String>,

    /// Countdown before each shot in seconds (0-10)
    #[arg(long)]
    timer: Option<u32>,
}

impl SessionArgs {
    fn apply_to(&self, config: &mut Config) {
        if let Some(template) = &self.template {
            config.booth.template = Some(template.clone());
        }
        if let Some(filter) = &self.filter {
            config.booth.filter = filter.clone();
        }
        if let Some(timer) = self.timer {
            config.booth.timer_seconds = timer;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting Photo Booth v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.templates_dir {
        config.paths.templates_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.paths.output_dir = dir.clone();
    }
    if let Some(folder) = &cli.camera_folder {
        config.camera.source = CameraSource::Folder;
        config.camera.folder = Some(folder.clone());
    }

    match cli.command {
        Command::Run(session) => {
            session.apply_to(&mut config);
            config.validate()?;
            run_interactive(&config).await
        }
        Command::Collage { session, print } => {
            session.apply_to(&mut config);
            config.validate()?;
            run_single_collage(&config, print).await
        }
        Command::Templates => list_templates(&config),
        Command::Filter { input, output, name } => filter_file(&input, &output, &name),
    }
}

async fn run_interactive(config: &Config) -> Result<()> {
    let mut booth = Booth::from_config(config, ConsoleSurface::new(&config.display))
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let (tx, rx) = mpsc::channel(32);
    spawn_stdin_controls(tx);
    info!("Ready. {}", COMMANDS_HELP);

    let options = RunOptions {
        preview_interval: config.display.preview_interval(),
        exit_after_collage: false,
    };
    run_booth(&mut booth, rx, &options).await;
    Ok(())
}

async fn run_single_collage(config: &Config, print: bool) -> Result<()> {
    let template = config
        .booth
        .template
        .clone()
        .context("a template is required, pass --template")?;

    let mut booth = Booth::from_config(config, ConsoleSurface::new(&config.display))
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let (tx, rx) = mpsc::channel(4);
    tx.send(BoothEvent::SelectTemplate(template)).await?;
    tx.send(BoothEvent::Capture).await?;
    drop(tx);

    let options = RunOptions {
        preview_interval: config.display.preview_interval(),
        exit_after_collage: true,
    };
    run_booth(&mut booth, rx, &options).await;

    match booth.last_collage() {
        Some(path) => {
            println!("{}", path.display());
            if print {
                booth.handle(BoothEvent::Print);
            }
            Ok(())
        }
        None => {
            warn!("No collage was produced");
            anyhow::bail!("{}", booth.surface().status())
        }
    }
}

fn list_templates(config: &Config) -> Result<()> {
    let registry = TemplateRegistry::load_from_dir(&config.paths.templates_dir)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if registry.is_empty() {
        println!("No templates found in {:?}.", config.paths.templates_dir);
        return Ok(());
    }

    for template in registry.iter() {
        println!(
            "{} ({}x{}, {} channels)",
            template.name(),
            template.width(),
            template.height(),
            template.channels()
        );
        if template.slots().is_empty() {
            println!("    no photo slots");
        }
        for (i, slot) in template.slots().iter().enumerate() {
            println!(
                "    slot {}: x={} y={} {}x{}",
                i + 1,
                slot.x,
                slot.y,
                slot.width,
                slot.height
            );
        }
    }

    Ok(())
}

fn filter_file(input: &Path, output: &Path, name: &str) -> Result<()> {
    let image = image::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let filtered = apply_filter(&Frame::from_dynamic(image), name);

    filtered
        .save_png(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Applied '{}' to {:?} -> {:?}", name, input, output);
    Ok(())
}
