//! Decoding of stored recordings into mono sample buffers.

use super::error::DecodeError;
use hound::{SampleFormat, WavReader};
use std::path::Path;

/// Mono samples of one audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Linear samples in `[-1, 1]`
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration_secs: f64,
}

/// Turns a file into mono samples.
pub trait MonoDecoder: Send + Sync {
    /// Decodes `path` into mono samples.
    ///
    /// # Errors
    /// - If the file cannot be opened or is not a supported format
    /// - If the sample data is truncated or corrupt
    fn decode_mono(&self, path: &Path) -> Result<DecodedAudio, DecodeError>;
}

/// PCM WAV decoder backed by hound.
///
/// Only the first channel of a multi-channel file is read; the others are
/// skipped rather than mixed down.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl MonoDecoder for WavDecoder {
    fn decode_mono(&self, path: &Path) -> Result<DecodedAudio, DecodeError> {
        let reader = WavReader::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        tracing::debug!(
            "Decoding {}: {}Hz, {} channels, {} bits {:?}",
            path.display(),
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format
        );

        let samples = match spec.sample_format {
            SampleFormat::Float => {
                if spec.bits_per_sample != 32 {
                    return Err(DecodeError::UnsupportedFormat {
                        path: path.to_path_buf(),
                        details: format!("{}-bit float samples", spec.bits_per_sample),
                    });
                }
                first_channel(reader.into_samples::<f32>(), channels, |s| s, path)?
            }
            SampleFormat::Int => {
                if !(1..=32).contains(&spec.bits_per_sample) {
                    return Err(DecodeError::UnsupportedFormat {
                        path: path.to_path_buf(),
                        details: format!("{}-bit integer samples", spec.bits_per_sample),
                    });
                }
                let full_scale = 2f64.powi(i32::from(spec.bits_per_sample) - 1);
                first_channel(
                    reader.into_samples::<i32>(),
                    channels,
                    |s| (f64::from(s) / full_scale) as f32,
                    path,
                )?
            }
        };

        let duration_secs = if spec.sample_rate > 0 {
            samples.len() as f64 / f64::from(spec.sample_rate)
        } else {
            0.0
        };

        Ok(DecodedAudio {
            samples,
            sample_rate: spec.sample_rate,
            duration_secs,
        })
    }
}

/// Collects every `channels`-th sample starting at the first one.
fn first_channel<S, I, F>(
    samples: I,
    channels: usize,
    convert: F,
    path: &Path,
) -> Result<Vec<f32>, DecodeError>
where
    I: Iterator<Item = hound::Result<S>>,
    F: Fn(S) -> f32,
{
    samples
        .step_by(channels)
        .map(|sample| {
            sample.map(&convert).map_err(|source| DecodeError::Read {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use tempfile::tempdir;

    fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decodes_mono_int_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, &[0, 16384, -16384, i16::MIN]);

        let decoded = WavDecoder.decode_mono(&path).unwrap();
        assert_eq!(decoded.samples, vec![0.0, 0.5, -0.5, -1.0]);
        assert_eq!(decoded.sample_rate, 8000);
        assert!((decoded.duration_secs - 4.0 / 8000.0).abs() < 1e-12);
    }

    #[test]
    fn test_reads_only_first_channel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[16384, 0, -16384, 32767, 0, 32767]);

        let decoded = WavDecoder.decode_mono(&path).unwrap();
        assert_eq!(decoded.samples, vec![0.5, -0.5, 0.0]);
    }

    #[test]
    fn test_decodes_float_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for sample in [0.25f32, -0.75] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = WavDecoder.decode_mono(&path).unwrap();
        assert_eq!(decoded.samples, vec![0.25, -0.75]);
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = tempdir().unwrap();
        let err = WavDecoder
            .decode_mono(&dir.path().join("missing.wav"))
            .unwrap_err();
        assert!(matches!(err, DecodeError::Open { .. }));
    }

    #[test]
    fn test_garbage_file_is_open_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        let err = WavDecoder.decode_mono(&path).unwrap_err();
        assert!(matches!(err, DecodeError::Open { .. }));
    }

    #[test]
    fn test_empty_wav_decodes_to_no_samples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, 1, &[]);

        let decoded = WavDecoder.decode_mono(&path).unwrap();
        assert!(decoded.samples.is_empty());
        assert_eq!(decoded.duration_secs, 0.0);
    }
}
