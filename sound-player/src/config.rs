//! sound-player configuration
//!
//! The `[playback]` table of the TOML config file. Command-line overrides
//! are applied on top of the file values, then the result is validated.
//!
//! ```toml
//! [playback]
//! chunk_size = 2048
//! device = "default"
//! app_name = "sound-player"
//! stream_name = "playback"
//! drain = true
//!
//! [playback.sample_spec]
//! format = "s16le"
//! rate = 16000
//! channels = 1
//! ```

use crate::audio::sink::SinkRequest;
use crate::audio::types::{SampleFormat, SampleSpec};
use serde::Deserialize;
use sound_common::config::TomlConfig;
use sound_common::{Error, Result};

/// Default transfer buffer size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Whole config file for the sound-player module
pub type PlayerToml = TomlConfig<PlayerConfig>;

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Layout of the raw input bytes
    pub sample_spec: SampleSpec,

    /// Transfer buffer capacity in bytes
    pub chunk_size: usize,

    /// Output device name (None = system default)
    pub device: Option<String>,

    pub app_name: String,
    pub stream_name: String,

    /// Wait for queued audio to play out before closing on success
    pub drain: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_spec: SampleSpec::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            device: None,
            app_name: "sound-player".to_string(),
            stream_name: "playback".to_string(),
            drain: true,
        }
    }
}

impl PlayerConfig {
    /// Apply command-line overrides.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(device) = overrides.device {
            self.device = Some(device);
        }
        if let Some(chunk_size) = overrides.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(format) = overrides.format {
            self.sample_spec.format = format;
        }
        if let Some(rate) = overrides.rate {
            self.sample_spec.rate = rate;
        }
        if let Some(channels) = overrides.channels {
            self.sample_spec.channels = channels;
        }
        if overrides.no_drain {
            self.drain = false;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        self.sample_spec.validate().map_err(Error::Config)
    }

    /// Sink parameters for one session.
    pub fn sink_request(&self) -> SinkRequest {
        SinkRequest {
            spec: self.sample_spec,
            device: self.device.clone(),
            app_name: self.app_name.clone(),
            stream_name: self.stream_name.clone(),
        }
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub device: Option<String>,
    pub chunk_size: Option<usize>,
    pub format: Option<SampleFormat>,
    pub rate: Option<u32>,
    pub channels: Option<u16>,
    pub no_drain: bool,
}
