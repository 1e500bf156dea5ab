//! In-memory audio sink for playback tests
//!
//! `RecordingOpener` hands out sinks that share one `SinkLog`, so a test can
//! inspect what a play call wrote and whether it released the sink. Failure
//! modes are configured on the opener before the call.

use sound_player::audio::{AudioSink, SinkOpener, SinkRequest};
use sound_player::SinkError;
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything the sinks of one opener saw
#[derive(Debug, Default)]
pub struct SinkLog {
    pub open_attempts: usize,
    pub opens: usize,
    pub closes: usize,
    pub drains: usize,
    /// Length of each accepted write, in order
    pub writes: Vec<usize>,
    /// Concatenation of all accepted bytes
    pub data: Vec<u8>,
    pub requests: Vec<SinkRequest>,
}

#[derive(Clone, Default)]
pub struct RecordingOpener {
    log: Arc<Mutex<SinkLog>>,
    fail_open: bool,
    /// Zero-based index of the write that fails
    fail_write_at: Option<usize>,
    fail_drain: bool,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every open fails with `SinkError::NoDevice`
    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// The write at `index` fails with `SinkError::Stream`
    pub fn failing_write_at(index: usize) -> Self {
        Self {
            fail_write_at: Some(index),
            ..Self::default()
        }
    }

    /// Drain fails with `SinkError::Stream`
    pub fn failing_drain() -> Self {
        Self {
            fail_drain: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> MutexGuard<'_, SinkLog> {
        self.log.lock().unwrap()
    }
}

impl SinkOpener for RecordingOpener {
    fn open(&self, request: &SinkRequest) -> Result<Box<dyn AudioSink>, SinkError> {
        let mut log = self.log();
        log.open_attempts += 1;
        if self.fail_open {
            return Err(SinkError::NoDevice);
        }
        log.opens += 1;
        log.requests.push(request.clone());

        Ok(Box::new(RecordingSink {
            log: Arc::clone(&self.log),
            fail_write_at: self.fail_write_at,
            fail_drain: self.fail_drain,
            write_index: 0,
        }))
    }
}

struct RecordingSink {
    log: Arc<Mutex<SinkLog>>,
    fail_write_at: Option<usize>,
    fail_drain: bool,
    write_index: usize,
}

impl AudioSink for RecordingSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        let index = self.write_index;
        self.write_index += 1;
        if self.fail_write_at == Some(index) {
            return Err(SinkError::Stream("device disconnected".to_string()));
        }

        let mut log = self.log.lock().unwrap();
        log.writes.push(bytes.len());
        log.data.extend_from_slice(bytes);
        Ok(())
    }

    fn drain(&mut self) -> Result<(), SinkError> {
        self.log.lock().unwrap().drains += 1;
        if self.fail_drain {
            return Err(SinkError::Stream("server went away".to_string()));
        }
        Ok(())
    }
}

impl Drop for RecordingSink {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.closes += 1;
        }
    }
}
