//! Sample format description and raw byte decoding
//!
//! Input files carry no header, so the caller states the layout of the
//! bytes with a `SampleSpec`. The default is signed 16-bit little-endian
//! mono at 16 kHz.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Default channel count (mono)
pub const DEFAULT_CHANNELS: u16 = 1;

/// Encoding of a single sample in the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Signed 16-bit little-endian
    #[default]
    S16Le,
    /// Signed 16-bit big-endian
    S16Be,
    /// Unsigned 8-bit, 128 = silence
    U8,
    /// 32-bit IEEE float little-endian, nominal range [-1.0, 1.0]
    F32Le,
}

impl SampleFormat {
    /// Size of one sample in bytes
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::S16Le | SampleFormat::S16Be => 2,
            SampleFormat::F32Le => 4,
        }
    }

    /// Decode one sample to f32 in [-1.0, 1.0].
    ///
    /// `bytes` must be exactly `bytes_per_sample()` long.
    fn decode(self, bytes: &[u8]) -> f32 {
        match self {
            SampleFormat::S16Le => i16::from_le_bytes([bytes[0], bytes[1]]) as f32 / 32768.0,
            SampleFormat::S16Be => i16::from_be_bytes([bytes[0], bytes[1]]) as f32 / 32768.0,
            SampleFormat::U8 => (bytes[0] as f32 - 128.0) / 128.0,
            SampleFormat::F32Le => {
                f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).clamp(-1.0, 1.0)
            }
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleFormat::S16Le => "s16le",
            SampleFormat::S16Be => "s16be",
            SampleFormat::U8 => "u8",
            SampleFormat::F32Le => "f32le",
        };
        f.write_str(name)
    }
}

impl FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s16le" => Ok(SampleFormat::S16Le),
            "s16be" => Ok(SampleFormat::S16Be),
            "u8" => Ok(SampleFormat::U8),
            "f32le" => Ok(SampleFormat::F32Le),
            other => Err(format!(
                "unknown sample format '{}' (expected s16le, s16be, u8, f32le)",
                other
            )),
        }
    }
}

/// Layout of the raw PCM stream handed to a play operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SampleSpec {
    pub format: SampleFormat,
    pub rate: u32,
    pub channels: u16,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            format: SampleFormat::S16Le,
            rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

impl SampleSpec {
    pub fn bytes_per_sample(&self) -> usize {
        self.format.bytes_per_sample()
    }

    /// Bytes per frame (one sample for every channel)
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }

    pub fn bytes_per_second(&self) -> u64 {
        self.frame_size() as u64 * self.rate as u64
    }

    /// Reject specs no device could play.
    pub fn validate(&self) -> Result<(), String> {
        if self.rate == 0 {
            return Err("sample rate must be greater than zero".to_string());
        }
        if self.channels == 0 {
            return Err("channel count must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for SampleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}ch {}Hz", self.format, self.channels, self.rate)
    }
}

/// Streaming decoder from raw bytes to normalized f32 samples.
///
/// Writes may split a sample across calls; the trailing partial sample is
/// held until the next call completes it.
#[derive(Debug)]
pub struct SampleDecoder {
    format: SampleFormat,
    pending: Vec<u8>,
}

impl SampleDecoder {
    pub fn new(format: SampleFormat) -> Self {
        Self {
            format,
            pending: Vec::with_capacity(format.bytes_per_sample()),
        }
    }

    /// Decode `bytes`, appending complete samples to `out`.
    pub fn decode(&mut self, mut bytes: &[u8], out: &mut Vec<f32>) {
        let width = self.format.bytes_per_sample();

        if !self.pending.is_empty() {
            let needed = width - self.pending.len();
            let take = needed.min(bytes.len());
            self.pending.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];

            if self.pending.len() < width {
                return;
            }
            out.push(self.format.decode(&self.pending));
            self.pending.clear();
        }

        let mut samples = bytes.chunks_exact(width);
        out.extend(samples.by_ref().map(|s| self.format.decode(s)));
        self.pending.extend_from_slice(samples.remainder());
    }

    /// Bytes held back waiting for the rest of a sample
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }
}
