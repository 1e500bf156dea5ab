//! Audio output: sample formats, the sink abstraction, and the cpal sink

pub mod output;
pub mod sink;
pub mod types;

pub use output::{list_devices, CpalSink, CpalSinkOpener};
pub use sink::{AudioSink, SinkOpener, SinkRequest};
pub use types::{SampleDecoder, SampleFormat, SampleSpec};
