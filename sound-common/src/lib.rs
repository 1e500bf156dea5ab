//! # Sound Player Common Library
//!
//! Shared code for the sound player crates including:
//! - Configuration file resolution and TOML loading
//! - Logging configuration and tracing initialization
//! - Common error types

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
