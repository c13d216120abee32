//! Microphone chunk capture for recognition engines.
//!
//! A recognition session consumes audio in windows rather than as a single
//! take: the capture stream appends samples into a shared buffer and
//! [`ChunkedCapture::drain_wav`] hands back everything recorded since the
//! previous drain, encoded as WAV. Windows that stay at digital silence are
//! skipped so they never reach the transcription endpoint.

use std::io::Cursor;
use std::sync::Arc;

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use hound::WavWriter;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum CaptureError {
    /// generic anyhow error
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
    /// No recording device available
    #[error("no input device available")]
    NoInputDevice,
    /// Sample format not supported
    #[error("sample format not supported: {0}")]
    SampleFormatNotSupported(String),
    /// Build stream error
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
}

type Result<T> = std::result::Result<T, CaptureError>;

/// Returns whether a default input device is present. Used by engines as
/// part of their availability probe.
pub fn input_available() -> bool {
    cpal::default_host().default_input_device().is_some()
}

/// Continuously records the default input device into an in-memory sample
/// buffer.
///
/// The underlying cpal stream is not `Send`; keep the capture on the thread
/// that created it. Dropping the capture ends the stream.
pub struct ChunkedCapture {
    _stream: cpal::Stream,
    samples: Arc<Mutex<Vec<f32>>>,
    spec: hound::WavSpec,
}

impl ChunkedCapture {
    /// Opens the default input device and starts capturing.
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;
        let config = device
            .default_input_config()
            .map_err(|_| CaptureError::NoInputDevice)?;

        info!(
            device_name = %device.name().unwrap_or_else(|_| "<unknown>".to_owned()),
            config = ?config,
            "Capturing from device"
        );

        let spec = wav_spec(&config);
        let samples = Arc::new(Mutex::new(Vec::with_capacity(16 * 1024)));
        let sink = samples.clone();

        let err_fn = move |err| {
            error!("an error occurred on the input stream: {}", err);
        };

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| sink.lock().extend_from_slice(data),
                err_fn,
                None,
            )?,
            sample_format => {
                return Err(CaptureError::SampleFormatNotSupported(format!(
                    "{:?}",
                    sample_format
                )))
            }
        };

        stream
            .play()
            .map_err(|_| anyhow!("failed to start input stream"))?;

        Ok(Self {
            _stream: stream,
            samples,
            spec,
        })
    }

    /// Takes everything captured since the last drain. Returns `None` when
    /// the window held no samples or never rose above the silence floor.
    pub fn drain_wav(&mut self) -> Result<Option<Vec<u8>>> {
        let taken = std::mem::take(&mut *self.samples.lock());
        if taken.is_empty() {
            return Ok(None);
        }
        let peak = peak_dbfs(&taken);
        if peak <= SILENCE_DBFS {
            debug!(peak, samples = taken.len(), "window is silent, skipping");
            return Ok(None);
        }
        encode_wav(&taken, self.spec).map(Some)
    }
}

fn wav_spec(config: &cpal::SupportedStreamConfig) -> hound::WavSpec {
    // Only the F32 sample format is accepted above.
    hound::WavSpec {
        channels: config.channels(),
        sample_rate: config.sample_rate().0,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Encode f32 samples as an in-memory WAV file.
pub fn encode_wav(samples: &[f32], spec: hound::WavSpec) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 4));
    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|e| anyhow!("failed to create wav writer: {}", e))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| anyhow!("failed to write wav sample: {}", e))?;
    }
    writer
        .finalize()
        .map_err(|e| anyhow!("failed to finalize wav: {}", e))?;
    Ok(cursor.into_inner())
}

/// Windows whose peak never rises above this are treated as silence.
pub const SILENCE_DBFS: f32 = -96.0;

/// Convert a slice of f32 samples to peak dBFS.
pub fn peak_dbfs(data: &[f32]) -> f32 {
    let max_sample = data
        .iter()
        .fold(f32::EQUILIBRIUM, |max, &sample| sample.abs().max(max));

    (20.0 * max_sample.log10()).clamp(SILENCE_DBFS, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spec() -> hound::WavSpec {
        hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        }
    }

    #[test]
    fn test_peak_dbfs_silence_is_floor() {
        assert_eq!(peak_dbfs(&[0.0; 64]), SILENCE_DBFS);
        assert_eq!(peak_dbfs(&[]), SILENCE_DBFS);
    }

    #[test]
    fn test_peak_dbfs_full_scale_is_zero() {
        assert_eq!(peak_dbfs(&[0.0, -1.0, 0.25]), 0.0);
    }

    #[test]
    fn test_peak_dbfs_half_scale() {
        let peak = peak_dbfs(&[0.5, -0.1]);
        assert!((peak - -6.0206).abs() < 0.01, "got {peak}");
    }

    #[test]
    fn test_encode_wav_produces_readable_file() {
        let samples = [0.0f32, 0.5, -0.5, 1.0];
        let bytes = encode_wav(&samples, test_spec()).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec(), test_spec());
        assert_eq!(reader.len(), samples.len() as u32);
    }
}
