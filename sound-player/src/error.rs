//! Error types for sound-player
//!
//! Every failure of a play operation maps to exactly one `PlayError`
//! variant. OS errors and audio backend errors share this one taxonomy;
//! integer exit codes are only derived at the process boundary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for an unavailable audio output (sysexits `EX_UNAVAILABLE`)
pub const EXIT_SINK_UNAVAILABLE: i32 = 69;

/// Exit code for a failed write to the audio output (sysexits `EX_IOERR`)
pub const EXIT_SINK_IO: i32 = 74;

/// Audio sink errors
#[derive(Error, Debug)]
pub enum SinkError {
    /// No output device could be found
    #[error("No output device available")]
    NoDevice,

    /// Device exists but cannot play the requested sample spec
    #[error("Unsupported stream configuration: {0}")]
    Unsupported(String),

    /// Audio backend refused an operation (enumerate, build, start)
    #[error("Audio backend error: {0}")]
    Backend(String),

    /// Stream failed while running (device disconnected, server gone)
    #[error("Audio stream error: {0}")]
    Stream(String),
}

/// Play operation errors
#[derive(Error, Debug)]
pub enum PlayError {
    /// Source file missing, unreadable, or permission denied
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Opened handle could not be bound as a byte-stream read source
    #[error("Failed to bind {path} as read source: {source}")]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Audio output could not be opened
    #[error("Failed to open audio output: {0}")]
    SinkOpen(#[source] SinkError),

    /// I/O failure while reading the source (not EOF)
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Audio output rejected or lost written data
    #[error("Failed to write to audio output: {0}")]
    Write(#[source] SinkError),
}

impl PlayError {
    /// Nonzero process exit code for this error.
    ///
    /// File errors report the OS errno (1 if none is available); sink
    /// errors report a fixed sysexits code.
    pub fn exit_code(&self) -> i32 {
        match self {
            PlayError::Open { source, .. }
            | PlayError::Redirect { source, .. }
            | PlayError::Read { source, .. } => match source.raw_os_error() {
                Some(code) if code != 0 => code,
                _ => 1,
            },
            PlayError::SinkOpen(_) => EXIT_SINK_UNAVAILABLE,
            PlayError::Write(_) => EXIT_SINK_IO,
        }
    }
}

/// Convenience Result type for play operations
pub type Result<T> = std::result::Result<T, PlayError>;
