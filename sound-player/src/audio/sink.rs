//! Audio sink abstraction
//!
//! A sink accepts raw bytes in the session's `SampleSpec` and blocks until
//! it has taken all of them. Dropping a sink releases the underlying
//! device connection.

use crate::audio::types::SampleSpec;
use crate::error::SinkError;

/// Parameters for opening a playback stream.
#[derive(Debug, Clone)]
pub struct SinkRequest {
    pub spec: SampleSpec,
    /// Output device name (None = system default)
    pub device: Option<String>,
    pub app_name: String,
    pub stream_name: String,
}

/// Blocking playback stream.
pub trait AudioSink {
    /// Queue `bytes` for playback, blocking until all are accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError>;

    /// Block until everything queued so far has been played.
    fn drain(&mut self) -> Result<(), SinkError>;
}

/// Opens playback streams.
pub trait SinkOpener {
    fn open(&self, request: &SinkRequest) -> Result<Box<dyn AudioSink>, SinkError>;
}
