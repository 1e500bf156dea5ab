//! Command-Line Integration Tests
//!
//! Runs the built binary on paths that fail before any audio device is
//! opened, and checks what reaches stderr.

mod helpers;

use helpers::PcmFixtures;
use std::ffi::OsStr;
use std::process::{Command, Output};

fn run_player(args: &[&OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sound-player"))
        .args(args)
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .env_remove("SOUND_PLAYER_CONFIG")
        .env_remove("SOUND_PLAYER_DEVICE")
        .output()
        .expect("failed to run sound-player")
}

/// **Given:** A --config path that does not exist
/// **When:** The binary starts
/// **Then:** The missing file is reported as a warning after logging is up
#[test]
fn test_missing_config_file_warned() {
    let fixtures = PcmFixtures::new();
    let config = fixtures.path("absent.toml");
    let missing_input = fixtures.nonexistent();

    let output = run_player(&[
        OsStr::new("--config"),
        config.as_os_str(),
        missing_input.as_os_str(),
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        stderr.contains("not found, using built-in defaults"),
        "stderr: {}",
        stderr
    );
    assert!(stderr.contains("WARN"), "stderr: {}", stderr);
}

/// **Given:** An input path that does not exist
/// **When:** The binary plays it
/// **Then:** The failure is logged once and the exit code is ENOENT
#[cfg(unix)]
#[test]
fn test_playback_failure_logged_once() {
    let fixtures = PcmFixtures::new();
    let config = fixtures.path("absent.toml");
    let missing_input = fixtures.nonexistent();

    let output = run_player(&[
        OsStr::new("--config"),
        config.as_os_str(),
        missing_input.as_os_str(),
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr.matches("ERROR").count(), 1, "stderr: {}", stderr);
}
