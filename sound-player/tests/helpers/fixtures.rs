//! Input file fixtures
//!
//! Generates headerless s16le mono 16 kHz PCM files and broken inputs
//! (missing, unreadable, directory) inside a temporary directory that is
//! removed when the fixture set is dropped.

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Sample rate of generated tones
const TONE_SAMPLE_RATE: f32 = 16_000.0;

/// `len` bytes of a 440 Hz s16le sine tone.
///
/// An odd `len` ends with the low byte of a sample.
pub fn tone_bytes(len: usize) -> Vec<u8> {
    let samples = len.div_ceil(2);
    let mut bytes = Vec::with_capacity(samples * 2);
    for i in 0..samples {
        let t = i as f32 / TONE_SAMPLE_RATE;
        let value = ((2.0 * PI * 440.0 * t).sin() * 0.5 * i16::MAX as f32) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes.truncate(len);
    bytes
}

pub struct PcmFixtures {
    temp_dir: TempDir,
}

impl PcmFixtures {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.temp_dir.path().join(filename)
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `contents` to `filename` and return its path
    pub fn file(&self, filename: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(filename);
        fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    /// Tone file of exactly `len` bytes
    pub fn tone(&self, filename: &str, len: usize) -> (PathBuf, Vec<u8>) {
        let bytes = tone_bytes(len);
        (self.file(filename, &bytes), bytes)
    }

    pub fn nonexistent(&self) -> PathBuf {
        self.path("does-not-exist.raw")
    }

    /// File with no read permission.
    ///
    /// Returns None when the permission is not enforced (running as root).
    #[cfg(unix)]
    pub fn unreadable(&self) -> Option<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.file("unreadable.raw", &tone_bytes(64));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o200))
            .expect("Failed to set permissions");

        if fs::File::open(&path).is_ok() {
            return None;
        }
        Some(path)
    }
}
