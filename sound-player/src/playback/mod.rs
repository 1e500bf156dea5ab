//! Playback session management

pub mod player;

pub use player::{play_sound, transfer, PlaybackSummary, SoundPlayer};
