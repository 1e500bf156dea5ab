//! Audio output using cpal
//!
//! `CpalSink` turns cpal's pull-based callback into the blocking push
//! interface of `AudioSink`. Written bytes are decoded to f32 and queued in
//! a lock-free ring buffer; the audio thread drains it, fanning mono out
//! to every device channel and converting to the device sample type.
//! `write` sleeps while the ring is full, which is the only backpressure.

use crate::audio::sink::{AudioSink, SinkOpener, SinkRequest};
use crate::audio::types::{SampleDecoder, SampleSpec};
use crate::error::SinkError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sleep between attempts to push into a full ring buffer
const WRITE_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Sleep between checks while draining
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Extra wait after the ring empties so the device plays out its own buffer
const DRAIN_TAIL: Duration = Duration::from_millis(100);

/// Ring buffer length in seconds of audio
const RING_SECONDS_DIVISOR: usize = 4; // ~250ms

/// Minimum ring buffer capacity in samples
const MIN_RING_SAMPLES: usize = 1024;

/// State shared with the audio thread.
#[derive(Debug, Default)]
struct StreamStatus {
    /// First stream error reported by the backend
    error: Mutex<Option<String>>,
    /// Callbacks that found less than a frame queued
    underruns: AtomicU64,
}

impl StreamStatus {
    fn record_error(&self, message: String) {
        let mut slot = self.error.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(message);
        }
    }

    fn check(&self) -> Result<(), SinkError> {
        let slot = self.error.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(message) => Err(SinkError::Stream(message.clone())),
            None => Ok(()),
        }
    }
}

/// List available audio output devices.
pub fn list_devices() -> Result<Vec<String>, SinkError> {
    let host = cpal::default_host();

    let devices: Vec<String> = host
        .output_devices()
        .map_err(|e| SinkError::Backend(format!("Failed to enumerate devices: {}", e)))?
        .filter_map(|device| device.name().ok())
        .collect();

    debug!("Found {} output devices", devices.len());
    Ok(devices)
}

/// Opens `CpalSink`s on the default cpal host.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalSinkOpener;

impl SinkOpener for CpalSinkOpener {
    fn open(&self, request: &SinkRequest) -> Result<Box<dyn AudioSink>, SinkError> {
        Ok(Box::new(CpalSink::open(request)?))
    }
}

/// Blocking playback stream on a cpal output device.
pub struct CpalSink {
    stream: Stream,
    producer: HeapProd<f32>,
    decoder: SampleDecoder,
    /// Scratch space for decoded samples, reused across writes
    decoded: Vec<f32>,
    status: Arc<StreamStatus>,
    /// Samples queued so far, to find a trailing partial frame at drain
    samples_pushed: u64,
    channels: u16,
    stream_name: String,
}

impl CpalSink {
    /// Open the requested device and start a stream for `request.spec`.
    ///
    /// A named device that cannot be found falls back to the default
    /// device. The stream starts immediately and plays silence until the
    /// first write.
    pub fn open(request: &SinkRequest) -> Result<Self, SinkError> {
        let spec = request.spec;
        spec.validate().map_err(SinkError::Unsupported)?;

        let device = Self::find_device(request.device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let (config, sample_format) = Self::select_config(&device, &spec)?;
        debug!(
            "Stream config: sample_rate={}, channels={}, format={:?}",
            config.sample_rate.0, config.channels, sample_format
        );

        let capacity = (spec.rate as usize * spec.channels as usize / RING_SECONDS_DIVISOR)
            .max(MIN_RING_SAMPLES);
        let (producer, consumer) = HeapRb::<f32>::new(capacity).split();
        let status = Arc::new(StreamStatus::default());

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, consumer, spec.channels, &status)?
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, consumer, spec.channels, &status)?
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, consumer, spec.channels, &status)?
            }
            other => {
                return Err(SinkError::Unsupported(format!(
                    "device sample format {:?}",
                    other
                )));
            }
        };

        stream
            .play()
            .map_err(|e| SinkError::Backend(format!("Failed to start stream: {}", e)))?;

        info!(
            "Opened playback stream '{}' for {} on '{}' ({})",
            request.stream_name, request.app_name, device_name, spec
        );

        Ok(Self {
            stream,
            producer,
            decoder: SampleDecoder::new(spec.format),
            decoded: Vec::new(),
            status,
            samples_pushed: 0,
            channels: spec.channels,
            stream_name: request.stream_name.clone(),
        })
    }

    fn find_device(name: Option<&str>) -> Result<Device, SinkError> {
        let host = cpal::default_host();

        if let Some(name) = name {
            let mut devices = host
                .output_devices()
                .map_err(|e| SinkError::Backend(format!("Failed to enumerate devices: {}", e)))?;

            if let Some(device) = devices.find(|d| d.name().ok().as_deref() == Some(name)) {
                info!("Using requested audio device: {}", name);
                return Ok(device);
            }

            warn!(
                "Requested device '{}' not found, falling back to default device",
                name
            );
        }

        host.default_output_device().ok_or(SinkError::NoDevice)
    }

    /// Pick a device config that plays `spec` without resampling.
    ///
    /// The rate must be supported exactly. Channel counts must match, except
    /// that mono may be fanned out to any count. Ties prefer an exact channel
    /// match, then fewer channels, then i16, f32, u16.
    fn select_config(
        device: &Device,
        spec: &SampleSpec,
    ) -> Result<(StreamConfig, SampleFormat), SinkError> {
        let ranges = device
            .supported_output_configs()
            .map_err(|e| SinkError::Backend(format!("Failed to get device configs: {}", e)))?;

        let best = ranges
            .filter_map(|r| {
                let rates = r.min_sample_rate().0..=r.max_sample_rate().0;
                let key = config_rank(spec, rates, r.channels(), r.sample_format())?;
                Some((key, r))
            })
            .min_by_key(|(key, _)| *key)
            .map(|(_, r)| r)
            .ok_or_else(|| {
                SinkError::Unsupported(format!("no device configuration supports {}", spec))
            })?;

        let supported = best.with_sample_rate(cpal::SampleRate(spec.rate));
        let sample_format = supported.sample_format();
        Ok((supported.config(), sample_format))
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        mut consumer: HeapCons<f32>,
        spec_channels: u16,
        status: &Arc<StreamStatus>,
    ) -> Result<Stream, SinkError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let device_channels = config.channels as usize;
        let spec_channels = spec_channels as usize;
        let callback_status = Arc::clone(status);
        let error_status = Arc::clone(status);

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if fill_output(&mut consumer, data, spec_channels, device_channels) {
                        callback_status.underruns.fetch_add(1, Ordering::Relaxed);
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_status.record_error(err.to_string());
                },
                None,
            )
            .map_err(|e| SinkError::Backend(format!("Failed to build stream: {}", e)))
    }
}

impl AudioSink for CpalSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.status.check()?;

        self.decoded.clear();
        self.decoder.decode(bytes, &mut self.decoded);

        push_blocking(&mut self.producer, &self.status, &self.decoded)?;
        self.samples_pushed += self.decoded.len() as u64;
        Ok(())
    }

    fn drain(&mut self) -> Result<(), SinkError> {
        if self.decoder.pending_bytes() > 0 {
            warn!(
                "Discarding {} trailing bytes that do not form a whole sample",
                self.decoder.pending_bytes()
            );
        }

        // The callback only pops whole frames
        let padding = frame_padding(self.samples_pushed, self.channels);
        if padding > 0 {
            warn!(
                "Input ends {} samples short of a whole frame, padding with silence",
                padding
            );
            let silence = vec![0.0f32; padding];
            push_blocking(&mut self.producer, &self.status, &silence)?;
            self.samples_pushed += padding as u64;
        }

        while !self.producer.is_empty() {
            self.status.check()?;
            thread::sleep(DRAIN_POLL_INTERVAL);
        }

        thread::sleep(DRAIN_TAIL);
        self.status.check()
    }
}

/// Push all of `samples`, sleeping while the ring is full.
fn push_blocking(
    producer: &mut HeapProd<f32>,
    status: &StreamStatus,
    mut samples: &[f32],
) -> Result<(), SinkError> {
    while !samples.is_empty() {
        let pushed = producer.push_slice(samples);
        samples = &samples[pushed..];

        if !samples.is_empty() {
            thread::sleep(WRITE_POLL_INTERVAL);
            status.check()?;
        }
    }
    Ok(())
}

/// Fill one device buffer from the ring.
///
/// Only whole frames are taken so channels never rotate; a frame without
/// enough queued samples is silent. Mono input is copied to every device
/// channel. Returns true if any frame was silent.
fn fill_output<T>(
    consumer: &mut HeapCons<f32>,
    data: &mut [T],
    spec_channels: usize,
    device_channels: usize,
) -> bool
where
    T: SizedSample + FromSample<f32>,
{
    let mut starved = false;

    for frame in data.chunks_mut(device_channels) {
        if consumer.occupied_len() < spec_channels {
            starved = true;
            frame.fill(T::EQUILIBRIUM);
            continue;
        }

        if spec_channels == device_channels {
            for sample in frame.iter_mut() {
                *sample = T::from_sample(consumer.try_pop().unwrap_or(0.0));
            }
        } else {
            let value = T::from_sample(consumer.try_pop().unwrap_or(0.0));
            frame.fill(value);
        }
    }

    starved
}

/// Samples needed to complete the last frame after `samples_pushed`.
fn frame_padding(samples_pushed: u64, channels: u16) -> usize {
    let partial = (samples_pushed % u64::from(channels.max(1))) as usize;
    if partial == 0 {
        0
    } else {
        channels as usize - partial
    }
}

/// Preference key for a supported device config; lower is better.
///
/// `None` if the config cannot play `spec` without resampling: the rate
/// must be in `rates`, and channels must match unless `spec` is mono.
/// Keys order an exact channel match first, then fewer channels, then
/// i16, f32, u16.
fn config_rank(
    spec: &SampleSpec,
    rates: RangeInclusive<u32>,
    channels: u16,
    format: SampleFormat,
) -> Option<(bool, u16, u8)> {
    if !rates.contains(&spec.rate) {
        return None;
    }
    if channels != spec.channels && spec.channels != 1 {
        return None;
    }

    let format_rank = match format {
        SampleFormat::I16 => 0u8,
        SampleFormat::F32 => 1,
        SampleFormat::U16 => 2,
        _ => return None,
    };

    Some((channels != spec.channels, channels, format_rank))
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        if let Err(e) = self.stream.pause() {
            debug!("Failed to pause stream on close: {}", e);
        }
        debug!(
            "Closed playback stream '{}' ({} underrun callbacks)",
            self.stream_name,
            self.status.underruns.load(Ordering::Relaxed)
        );
    }
}
