use clap::Parser;
use eyetunes::transport::{self, EventSource, LiveInput, MidiFileSource};
use eyetunes::visuals::Resolver;
use eyetunes::{Config, Error, VisualizerApp, spawn_engine};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eyetunes")]
#[command(about = "Turns MIDI notes into shapes and colors", long_about = None)]
struct Cli {
    /// MIDI file to play; listens on a live input port when omitted
    file: Option<PathBuf>,

    /// Settings file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mapping asset (RON), overrides the settings file
    #[arg(short, long)]
    mappings: Option<PathBuf>,

    /// Substring of the input port name to listen on
    #[arg(short, long)]
    port: Option<String>,

    /// Print the available input ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> eyetunes::Result<()> {
    if cli.list_ports {
        for (i, name) in transport::list_ports()?.iter().enumerate() {
            println!("{}: {}", i, name);
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.mappings.is_some() {
        config.mappings = cli.mappings;
    }
    if cli.port.is_some() {
        config.input_port = cli.port;
    }

    let resolver = Resolver::load(config.mappings.as_deref())?;

    let (source, source_name): (Box<dyn EventSource>, String) = match &cli.file {
        Some(path) => {
            let file = MidiFileSource::load(path)?;
            tracing::info!("Playing {} ({:.1}s)", path.display(), file.duration().as_secs_f64());
            (Box::new(file), path.display().to_string())
        }
        None => {
            let input = LiveInput::open(config.input_port.as_deref())?;
            let name = input.port_name().to_string();
            (Box::new(input), name)
        }
    };

    let engine = spawn_engine(&config, resolver, source)?;
    let mappings = config.mappings.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.canvas_width, config.canvas_height])
            .with_title("eyetunes"),
        ..Default::default()
    };

    eframe::run_native(
        "eyetunes",
        options,
        Box::new(move |_cc| Ok(Box::new(VisualizerApp::new(engine, mappings, source_name)))),
    )
    .map_err(|e| Error::Window(e.to_string()))
}
