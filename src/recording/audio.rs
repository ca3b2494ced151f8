//! Audio capture and WAV output.
//!
//! This module handles PCM sample capture from an input device and writes the
//! result as 16-bit mono WAV. Multi-channel input is averaged down to mono as
//! it arrives. A [`PowerProbe`] exposes the live signal level to the meter
//! without handing out the stream itself.

use super::device::MicrophoneAccess;
use crate::amplitude::normalize::power_db_from_samples;
use crate::amplitude::{PowerSource, SourceUnavailable};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use hound::WavWriter;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Length of the trailing block the probe measures, as a fraction of a second.
const PROBE_BLOCKS_PER_SECOND: u32 = 20;

/// Records audio from the device granted by a [`MicrophoneAccess`].
///
/// Features:
/// - Captures at the device's native sample rate
/// - Converts multi-channel audio to mono by averaging channels
/// - Accepts i16 and f32 device formats
/// - Pause and resume without losing captured samples
pub struct AudioRecorder {
    access: MicrophoneAccess,
    /// Actual recording sample rate from device
    sample_rate: u32,
    /// Recorded audio samples (i16 PCM mono)
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active audio input stream (kept alive during recording)
    stream: Option<cpal::Stream>,
    is_paused: Arc<AtomicBool>,
    is_streaming: Arc<AtomicBool>,
}

impl AudioRecorder {
    /// Creates a recorder for the granted device.
    ///
    /// The actual sample rate may differ from `requested_sample_rate`; read
    /// [`sample_rate`](Self::sample_rate) after starting.
    pub fn new(access: MicrophoneAccess, requested_sample_rate: u32) -> Self {
        Self {
            access,
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            is_paused: Arc::new(AtomicBool::new(false)),
            is_streaming: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts capturing from the granted device.
    ///
    /// # Errors
    /// - If device configuration fails
    /// - If the device uses an unsupported sample format
    /// - If audio stream creation fails
    pub fn start_recording(&mut self) -> Result<()> {
        let device = self.access.device();
        tracing::info!("Recording device: {}", self.access.device_name());

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = usize::from(device_config.channels().max(1));
        let sample_format = device_config.sample_format();

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            device_sample_rate,
            num_channels,
            sample_format
        );

        self.sample_rate = device_sample_rate;

        let stream_config: cpal::StreamConfig = device_config.into();
        let on_error = |err: cpal::StreamError| tracing::error!("Audio stream error: {}", err);

        let stream = match sample_format {
            cpal::SampleFormat::I16 => {
                let samples = Arc::clone(&self.samples);
                let paused = Arc::clone(&self.is_paused);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if !paused.load(Ordering::Relaxed) {
                            append_mono(&mut samples.lock(), data.iter().copied(), num_channels);
                        }
                    },
                    on_error,
                    None,
                )?
            }
            cpal::SampleFormat::F32 => {
                let samples = Arc::clone(&self.samples);
                let paused = Arc::clone(&self.is_paused);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if !paused.load(Ordering::Relaxed) {
                            let converted = data.iter().map(|&s| f32_to_i16(s));
                            append_mono(&mut samples.lock(), converted, num_channels);
                        }
                    },
                    on_error,
                    None,
                )?
            }
            other => {
                return Err(anyhow!(
                    "Unsupported input sample format {other:?}. Choose another device with 'voicerec list-devices'."
                ))
            }
        };

        stream.play()?;
        self.stream = Some(stream);
        self.is_streaming.store(true, Ordering::SeqCst);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Stops capturing and writes the recording to `output_path` if given.
    ///
    /// Returns the recorded duration in seconds, or `None` when nothing was
    /// captured (no file is written in that case).
    ///
    /// # Errors
    /// - If the WAV file cannot be created or written
    pub fn stop_recording(&mut self, output_path: Option<&Path>) -> Result<Option<f32>> {
        self.stream = None;
        self.is_streaming.store(false, Ordering::SeqCst);

        let samples = self.samples.lock().clone();
        let sample_count = samples.len();

        if sample_count == 0 {
            tracing::warn!("Recording stopped with no samples captured");
            return Ok(None);
        }

        let duration_secs = sample_count as f32 / self.sample_rate as f32;
        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            sample_count,
            self.sample_rate
        );

        if let Some(output_file) = output_path {
            write_wav(&samples, self.sample_rate, output_file)?;

            let file_size = std::fs::metadata(output_file)?.len();
            tracing::info!(
                "Audio saved: {} ({} bytes)",
                output_file.display(),
                file_size
            );
        }

        Ok(Some(duration_secs))
    }

    /// Returns a level probe sharing this recorder's sample buffer.
    pub fn power_probe(&self) -> PowerProbe {
        PowerProbe {
            samples: Arc::clone(&self.samples),
            is_paused: Arc::clone(&self.is_paused),
            is_streaming: Arc::clone(&self.is_streaming),
            block_len: (self.sample_rate / PROBE_BLOCKS_PER_SECOND).max(1) as usize,
        }
    }

    /// Returns the number of recorded samples.
    pub fn sample_count(&self) -> usize {
        self.samples.lock().len()
    }

    /// Returns the actual sample rate of the recording.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Recorded duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.sample_count() as f32 / self.sample_rate.max(1) as f32
    }

    pub fn device_name(&self) -> &str {
        self.access.device_name()
    }

    /// Returns whether recording is currently paused.
    pub fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::SeqCst)
    }

    /// Stops keeping incoming samples. The stream stays open.
    pub fn pause(&self) {
        if !self.is_paused.swap(true, Ordering::SeqCst) {
            tracing::debug!("Recording paused");
        }
    }

    pub fn resume(&self) {
        if self.is_paused.swap(false, Ordering::SeqCst) {
            tracing::debug!("Recording resumed");
        }
    }

    /// Toggles between paused and recording states.
    ///
    /// Returns `true` if the recorder is now paused.
    pub fn toggle_pause(&self) -> bool {
        if self.is_paused() {
            self.resume();
            false
        } else {
            self.pause();
            true
        }
    }
}

/// Reads the average power of the most recent captured block.
///
/// Reports [`SourceUnavailable`] while the stream is not running or paused.
#[derive(Clone)]
pub struct PowerProbe {
    samples: Arc<Mutex<Vec<i16>>>,
    is_paused: Arc<AtomicBool>,
    is_streaming: Arc<AtomicBool>,
    block_len: usize,
}

impl PowerSource for PowerProbe {
    fn current_power_db(&self) -> Result<f32, SourceUnavailable> {
        if !self.is_streaming.load(Ordering::Relaxed) {
            return Err(SourceUnavailable::new("capture stream is not running"));
        }
        if self.is_paused.load(Ordering::Relaxed) {
            return Err(SourceUnavailable::new("capture is paused"));
        }

        let samples = self.samples.lock();
        let start = samples.len().saturating_sub(self.block_len);
        Ok(power_db_from_samples(&samples[start..]))
    }
}

/// Appends interleaved samples to `out`, averaging each frame down to mono.
fn append_mono<I>(out: &mut Vec<i16>, data: I, num_channels: usize)
where
    I: Iterator<Item = i16>,
{
    if num_channels <= 1 {
        out.extend(data);
        return;
    }

    let mut sum = 0i32;
    let mut filled = 0usize;
    for sample in data {
        sum += i32::from(sample);
        filled += 1;
        if filled == num_channels {
            out.push((sum / num_channels as i32) as i16);
            sum = 0;
            filled = 0;
        }
    }
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

/// Writes mono 16-bit PCM samples as a WAV file.
///
/// # Errors
/// - If the file cannot be created or written
pub fn write_wav(samples: &[i16], sample_rate: u32, path: &Path) -> Result<()> {
    let wav_spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, wav_spec)
        .map_err(|e| anyhow!("Failed to create {}: {e}", path.display()))?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    tracing::debug!("WAV written: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amplitude::normalize::SILENCE_DB;
    use crate::amplitude::{MonoDecoder, WavDecoder};
    use tempfile::tempdir;

    fn probe(samples: Vec<i16>, streaming: bool, paused: bool) -> PowerProbe {
        PowerProbe {
            samples: Arc::new(Mutex::new(samples)),
            is_paused: Arc::new(AtomicBool::new(paused)),
            is_streaming: Arc::new(AtomicBool::new(streaming)),
            block_len: 4,
        }
    }

    #[test]
    fn test_append_mono_averages_frames() {
        let mut out = Vec::new();
        append_mono(&mut out, [100i16, 300, -50, 50].into_iter(), 2);
        assert_eq!(out, vec![200, 0]);

        let mut out = Vec::new();
        append_mono(&mut out, [3i16, 6, 9, 1, 1].into_iter(), 3);
        assert_eq!(out, vec![6]);

        let mut out = vec![1];
        append_mono(&mut out, [2i16, 3].into_iter(), 1);
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_f32_conversion_clamps() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(4.0), i16::MAX);
        assert_eq!(f32_to_i16(-4.0), -i16::MAX);
    }

    #[test]
    fn test_probe_measures_trailing_block() {
        let mut samples = vec![i16::MAX; 100];
        samples.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(probe(samples, true, false).current_power_db().unwrap(), SILENCE_DB);

        let loud = probe(vec![0, 0, i16::MAX, i16::MAX, i16::MAX, i16::MAX], true, false);
        assert!(loud.current_power_db().unwrap().abs() < 1e-3);
    }

    #[test]
    fn test_probe_unavailable_when_stopped_or_paused() {
        assert!(probe(vec![1000; 8], false, false).current_power_db().is_err());
        assert!(probe(vec![1000; 8], true, true).current_power_db().is_err());
        assert_eq!(probe(Vec::new(), true, false).current_power_db().unwrap(), SILENCE_DB);
    }

    #[test]
    fn test_write_wav_round_trips_through_decoder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav(&[0, 16384, -32768], 22050, &path).unwrap();

        let decoded = WavDecoder.decode_mono(&path).unwrap();
        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.samples, vec![0.0, 0.5, -1.0]);
    }
}
