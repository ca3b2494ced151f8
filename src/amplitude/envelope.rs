//! Peak waveform extraction for stored recordings.
//!
//! A file is reduced to a fixed number of buckets, each holding the peak
//! absolute sample of its time span. Peaks rather than RMS keep short
//! transients visible at low resolution.

use super::decode::MonoDecoder;
use super::error::DecodeError;
use super::normalize::normalize_linear;
use std::path::PathBuf;
use std::sync::Arc;

/// Default number of buckets in an envelope.
pub const DEFAULT_RESOLUTION: usize = 200;

/// Normalized peak amplitudes of one file, one value per time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformEnvelope {
    peaks: Vec<f32>,
}

impl WaveformEnvelope {
    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// True when no bucket holds any signal.
    pub fn is_silent(&self) -> bool {
        self.peaks.iter().all(|&p| p == 0.0)
    }
}

/// Downsamples `samples` into exactly `resolution` normalized peak values.
///
/// Bucket `i` spans `[i * len / resolution, (i + 1) * len / resolution)`, so
/// bucket sizes differ by at most one sample. The loudest bucket is scaled to
/// exactly 1.0; an all-zero input gives an all-zero envelope. Inputs shorter
/// than `resolution` leave the buckets that receive no sample at zero.
pub fn extract_envelope(samples: &[f32], resolution: usize) -> WaveformEnvelope {
    if resolution == 0 {
        return WaveformEnvelope { peaks: Vec::new() };
    }

    let total = samples.len();
    let mut peaks: Vec<f32> = (0..resolution)
        .map(|bucket| {
            let start = bucket * total / resolution;
            let end = (bucket + 1) * total / resolution;
            samples[start..end]
                .iter()
                .map(|s| normalize_linear(*s))
                .fold(0.0f32, f32::max)
        })
        .collect();

    let loudest = peaks.iter().copied().fold(0.0f32, f32::max);
    if loudest > 0.0 {
        for peak in peaks.iter_mut() {
            *peak = if *peak == loudest {
                1.0
            } else {
                (*peak / loudest).min(1.0)
            };
        }
    }

    WaveformEnvelope { peaks }
}

/// Decodes `path` and extracts its envelope off the async runtime threads.
///
/// Resolves exactly once. Dropping the returned future discards the result;
/// the blocking decode itself runs to completion.
///
/// # Errors
/// - If the file cannot be decoded
/// - If the blocking task panicked or was cancelled
pub async fn load_envelope(
    decoder: Arc<dyn MonoDecoder>,
    path: PathBuf,
    resolution: usize,
) -> Result<WaveformEnvelope, DecodeError> {
    tokio::task::spawn_blocking(move || -> Result<WaveformEnvelope, DecodeError> {
        let started = std::time::Instant::now();
        let decoded = decoder.decode_mono(&path)?;
        let envelope = extract_envelope(&decoded.samples, resolution);
        tracing::debug!(
            "Envelope for {}: {} samples -> {} buckets in {:?}",
            path.display(),
            decoded.samples.len(),
            envelope.len(),
            started.elapsed()
        );
        Ok(envelope)
    })
    .await
    .map_err(|e| DecodeError::Interrupted(e.to_string()))?
}
