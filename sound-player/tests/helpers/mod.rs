//! Test helper modules for sound-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - RecordingOpener: in-memory sink that records every write and close
//! - PcmFixtures: raw PCM and broken input files in a temp directory

#![allow(dead_code)]

pub mod fixtures;
pub mod recording_sink;

pub use fixtures::{tone_bytes, PcmFixtures};
pub use recording_sink::{RecordingOpener, SinkLog};
