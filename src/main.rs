use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use neonsynth::config::EngineConfig;
use neonsynth::runtime;

/// Audio-reactive instrument: a looping track, a live spectrum readout and a
/// keyboard synth with echo.
#[derive(Parser, Debug)]
#[command(name = "neonsynth", version, about)]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the playlist locators are resolved against
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Audio file to play right away
    #[arg(short, long)]
    track: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };
    if args.assets.is_some() {
        config.asset_root = args.assets;
    }

    match runtime::run(config, args.track.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
