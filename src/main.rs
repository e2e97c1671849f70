//! trkr — play and edit a pattern table in the terminal.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trkr::config::Config;
use trkr::error::TrackerError;
use trkr::pattern::load_song;
use trkr::tui::event::{post, UiEvent};
use trkr::tui::{theme, Controller, ControllerOptions, TerminalSurface, TextSurface};

/// Mock surface size in cells.
const MOCK_WIDTH: u16 = 200;
const MOCK_HEIGHT: u16 = 58;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Pattern file to load
    #[arg(long, default_value = "testpattern.yaml")]
    pattern: PathBuf,

    /// Quit after this many seconds
    #[arg(long)]
    sec: Option<u64>,

    /// Print frames as text on stdout instead of drawing in the terminal
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// Tempo in BPM (overrides the pattern file and config)
    #[arg(long)]
    bpm: Option<u32>,

    /// Config file (default ~/.trkr/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (default from config, else <tmp>/trkr.log)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("trkr: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), TrackerError> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let log_path = args.log.clone().unwrap_or_else(|| config.log_path());
    init_logging(&log_path)?;

    let song = load_song(&args.pattern)?;
    let bpm = args.bpm.or(song.tempo).unwrap_or(config.tempo);
    let theme = theme::load_theme(config.theme.as_deref());
    tracing::info!(pattern = %args.pattern.display(), bpm, mock = args.mock, "starting");

    let mut options = ControllerOptions {
        display_for: args.sec.map(Duration::from_secs),
        ..ControllerOptions::default()
    };

    if args.mock {
        options.autoplay = true;
        options.quit_when_stopped = true;
        let surface = TextSurface::new(std::io::stdout(), MOCK_WIDTH, MOCK_HEIGHT);
        let mut controller = Controller::new(song.table, bpm, &config, theme, surface, options)?;

        let tx = controller.sender();
        if let Err(e) = ctrlc::set_handler(move || {
            post(&tx, UiEvent::Quit);
        }) {
            tracing::warn!("could not install Ctrl-C handler: {e}");
        }
        controller.run()
    } else {
        options.keyboard = true;
        let mut controller =
            Controller::new(song.table, bpm, &config, theme, TerminalSurface::new(), options)?;
        controller.run()
    }
}

/// Send `tracing` output to a plain-text log file so the terminal stays clean.
fn init_logging(path: &Path) -> Result<(), TrackerError> {
    let file = File::create(path).map_err(|e| TrackerError::io(path, e))?;
    let filter = EnvFilter::try_from_env("TRKR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
