mod animation;
mod config;
mod core;
mod driver;
mod input;
mod kinematics;
mod playback;
mod simulation;
mod ui;

use crate::config::{OutputMode, Settings};
use crate::core::{Position, SystemClock};
use crate::driver::DriverOptions;
use crate::input::{FileSource, SyntheticSource, WaypointSource};
use crate::simulation::Simulation;
use crate::ui::{spawn_stdin_reader, ConsolePresenter, JsonPresenter, Presenter, ShortcutManager};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Where the demo loop starts
const DEMO_ORIGIN: Position = Position {
    lat: 17.385044,
    lng: 78.486671,
};

#[derive(Parser, Debug)]
#[command(
    name = "route-replay",
    version,
    about = "Replay a recorded GPS route with live speed, elapsed time and progress"
)]
struct Cli {
    /// Route file (CSV or JSON) with latitude, longitude and timestamp fields
    #[arg(required_unless_present = "demo")]
    path: Option<PathBuf>,

    /// Replay a generated loop instead of a file
    #[arg(long, conflicts_with = "path")]
    demo: bool,

    /// Recorded time between demo waypoints, in seconds
    #[arg(long, default_value_t = 10, requires = "demo")]
    demo_step_secs: i64,

    /// Fixed period between waypoint advances, in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Duration of each waypoint-to-waypoint animation, in milliseconds
    #[arg(long)]
    animation_ms: Option<u64>,

    /// Frame period of the animation loop, in milliseconds
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Start playing immediately
    #[arg(long)]
    autoplay: bool,

    /// Exit once the last waypoint has been reached
    #[arg(long)]
    exit_on_complete: bool,

    /// Print events as JSON lines instead of a status line
    #[arg(long)]
    json: bool,

    /// Settings file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    /// Merge command line overrides into the stored settings
    fn settings(&self) -> Settings {
        let mut settings = Settings::load(self.config.as_deref());
        if let Some(ms) = self.tick_ms {
            settings.tick_interval_ms = ms;
        }
        if let Some(ms) = self.animation_ms {
            settings.animation_duration_ms = ms;
        }
        if let Some(ms) = self.frame_ms {
            settings.frame_interval_ms = ms;
        }
        if self.autoplay {
            settings.autoplay = true;
        }
        if self.json {
            settings.output = OutputMode::Json;
        }
        settings
    }
}

async fn run_app(cli: Cli, settings: Settings) -> Result<()> {
    let mut source: Box<dyn WaypointSource> = match &cli.path {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(
            SyntheticSource::new(DEMO_ORIGIN, 0.5, 24)
                .with_interval(chrono::Duration::seconds(cli.demo_step_secs.max(1))),
        ),
    };

    info!("Loading waypoints from {}", source.name());
    let waypoints = input::fetch_or_empty(&mut *source).await;
    let summary = kinematics::route_summary(&waypoints);
    info!(
        "{} waypoints, {:.2} km over {} s",
        summary.waypoints,
        summary.distance_km,
        summary.duration.num_seconds()
    );

    let mut sim = Simulation::new(SystemClock::new(), settings.simulation_config());
    sim.load(waypoints);
    if settings.autoplay {
        sim.play();
    }

    let mut presenter: Box<dyn Presenter> = match settings.output {
        OutputMode::Text => {
            eprintln!("Commands:");
            for line in ShortcutManager::new().help() {
                eprintln!("{}", line);
            }
            Box::new(ConsolePresenter::new(std::io::stdout()))
        }
        OutputMode::Json => Box::new(JsonPresenter::new(std::io::stdout())),
    };

    let (tx, rx) = mpsc::channel(16);
    let reader = spawn_stdin_reader(tx);

    let options = DriverOptions {
        exit_on_complete: cli.exit_on_complete,
    };
    let result = driver::run(&mut sim, rx, &mut *presenter, options).await;
    reader.abort();
    result
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only telemetry
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();

    if cli.save_config {
        let path = settings.save(cli.config.as_deref())?;
        info!("Saved settings to {}", path.display());
    }

    // Single-threaded: the simulation is owned by one task
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let result = rt.block_on(run_app(cli, settings));
    // The stdin reader may still be parked in a blocking read
    rt.shutdown_background();
    result
}
