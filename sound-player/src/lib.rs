//! # Sound Player Library (sound-player)
//!
//! Streams a headerless PCM file to an audio output device, one fixed-size
//! chunk at a time, blocking until the device has accepted every byte.
//!
//! **Architecture:** `SoundPlayer` reads the file directly and pushes each
//! chunk into an `AudioSink`; the production sink is a cpal output stream
//! fed through a ring buffer.

pub mod audio;
pub mod config;
pub mod error;
pub mod playback;

pub use config::PlayerConfig;
pub use error::{PlayError, Result, SinkError};
pub use playback::{play_sound, PlaybackSummary, SoundPlayer};
