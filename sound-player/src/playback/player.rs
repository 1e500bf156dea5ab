//! Sound player: stream a raw PCM file to an audio sink
//!
//! One call to `play` is one playback session. The session owns the open
//! source file and the open sink; both are released when `play` returns,
//! whichever way it returns. The sink is only opened once the source is
//! known to be readable, and a sink that fails to open ends the call
//! before any data is read.

use crate::audio::output::CpalSinkOpener;
use crate::audio::sink::{AudioSink, SinkOpener};
use crate::config::PlayerConfig;
use crate::error::{PlayError, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Outcome of a successful play call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// Read/write cycles that moved data
    pub chunks: u64,
}

/// Plays files through sinks obtained from `O`.
pub struct SoundPlayer<O = CpalSinkOpener> {
    config: PlayerConfig,
    opener: O,
}

impl SoundPlayer<CpalSinkOpener> {
    /// Player on the system audio output.
    pub fn with_default_output(config: PlayerConfig) -> sound_common::Result<Self> {
        Self::new(config, CpalSinkOpener)
    }
}

impl<O: SinkOpener> SoundPlayer<O> {
    /// Fails if `config` does not validate.
    pub fn new(config: PlayerConfig, opener: O) -> sound_common::Result<Self> {
        config.validate()?;
        Ok(Self { config, opener })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Play `path` to completion.
    ///
    /// Blocks until the whole file has been accepted by the sink (and, with
    /// `drain` enabled, played out). Returns the first error encountered.
    pub fn play(&self, path: impl AsRef<Path>) -> Result<PlaybackSummary> {
        let path = path.as_ref();
        info!("Playing sound file: {}", path.display());

        let mut source = open_source(path)?;
        let length = bind_source(path, &source)?;
        debug!(
            "Source is {} bytes (~{:.2}s as {})",
            length,
            length as f64 / self.config.sample_spec.bytes_per_second() as f64,
            self.config.sample_spec
        );

        let mut sink = self.opener.open(&self.config.sink_request()).map_err(|e| {
            error!("Failed to open audio output: {}", e);
            PlayError::SinkOpen(e)
        })?;

        let mut buffer = vec![0u8; self.config.chunk_size];
        let summary = transfer(path, &mut source, sink.as_mut(), &mut buffer)?;

        if self.config.drain {
            sink.drain().map_err(|e| {
                error!("Failed to drain audio output: {}", e);
                PlayError::Write(e)
            })?;
        }

        info!(
            "Finished {}: {} bytes in {} chunks",
            path.display(),
            summary.bytes_written,
            summary.chunks
        );
        Ok(summary)
    }
}

/// Copy `source` into `sink` one buffer at a time until EOF.
///
/// Each write hands the sink exactly the bytes of the read before it, so
/// at most `buffer.len()` bytes are in flight. Interrupted reads are
/// retried; any other failure ends the transfer.
pub fn transfer<R>(
    path: &Path,
    source: &mut R,
    sink: &mut dyn AudioSink,
    buffer: &mut [u8],
) -> Result<PlaybackSummary>
where
    R: Read + ?Sized,
{
    let mut summary = PlaybackSummary::default();

    loop {
        let n = match source.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("read() failed on {}: {}", path.display(), e);
                return Err(PlayError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        summary.bytes_read += n as u64;

        sink.write(&buffer[..n]).map_err(|e| {
            error!("Audio write failed: {}", e);
            PlayError::Write(e)
        })?;
        summary.bytes_written += n as u64;
        summary.chunks += 1;
    }

    Ok(summary)
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        error!("open() failed on {}: {}", path.display(), e);
        PlayError::Open {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Check that the opened handle is a byte stream; returns its length.
fn bind_source(path: &Path, file: &File) -> Result<u64> {
    let redirect_error = |source: io::Error| {
        error!("Cannot read from {}: {}", path.display(), source);
        PlayError::Redirect {
            path: PathBuf::from(path),
            source,
        }
    };

    let metadata = file.metadata().map_err(redirect_error)?;
    if metadata.is_dir() {
        return Err(redirect_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }

    Ok(metadata.len())
}

/// Play `path` on the default output with the default configuration.
///
/// Returns 0 on success, otherwise `PlayError::exit_code()`.
pub fn play_sound(path: impl AsRef<Path>) -> i32 {
    let player = match SoundPlayer::with_default_output(PlayerConfig::default()) {
        Ok(player) => player,
        Err(e) => {
            error!("Invalid player configuration: {}", e);
            return 1;
        }
    };
    match player.play(path) {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}
