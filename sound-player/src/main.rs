//! Sound Player (sound-player) - Main entry point
//!
//! Plays one raw PCM file on the system audio output and exits with 0 on
//! success or a nonzero code describing the first failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sound_common::config::{load_toml, ConfigResolver};
use sound_common::logging::init_tracing;
use sound_player::audio::{list_devices, SampleFormat};
use sound_player::config::{ConfigOverrides, PlayerToml};
use sound_player::SoundPlayer;
use tracing::{debug, info};

/// Command-line arguments for sound-player
#[derive(Parser, Debug)]
#[command(name = "sound-player")]
#[command(about = "Play a raw PCM file on the system audio output")]
#[command(version)]
struct Args {
    /// Raw PCM file to play
    #[arg(required_unless_present = "list_devices")]
    path: Option<PathBuf>,

    /// Config file (default: $SOUND_PLAYER_CONFIG, then well-known locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output device name
    #[arg(short, long, env = "SOUND_PLAYER_DEVICE")]
    device: Option<String>,

    /// Transfer chunk size in bytes
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Sample format of the input (s16le, s16be, u8, f32le)
    #[arg(long)]
    format: Option<SampleFormat>,

    /// Sample rate of the input in Hz
    #[arg(long)]
    rate: Option<u32>,

    /// Channel count of the input
    #[arg(long)]
    channels: Option<u16>,

    /// Close the output as soon as the last chunk is accepted
    #[arg(long)]
    no_drain: bool,

    /// List output devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let resolver = ConfigResolver::new("sound-player");
    let config_path = resolver.resolve(args.config.as_deref());
    let (file_config, config_source): (PlayerToml, _) =
        load_toml(config_path.as_deref()).context("Failed to load configuration")?;

    init_tracing(&file_config.logging).context("Failed to initialize logging")?;

    info!(
        "Starting sound-player v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_source.log();

    if args.list_devices {
        for name in list_devices().context("Failed to list output devices")? {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = file_config.playback.with_overrides(ConfigOverrides {
        device: args.device,
        chunk_size: args.chunk_size,
        format: args.format,
        rate: args.rate,
        channels: args.channels,
        no_drain: args.no_drain,
    });

    let player = SoundPlayer::with_default_output(config).context("Invalid configuration")?;

    // clap guarantees a path unless --list-devices was given
    let Some(path) = args.path else {
        return Ok(ExitCode::FAILURE);
    };

    match player.play(&path) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            // Already logged where it happened
            debug!("Exiting with code {} after: {}", e.exit_code(), e);
            let code = u8::try_from(e.exit_code()).unwrap_or(1);
            Ok(ExitCode::from(code))
        }
    }
}
