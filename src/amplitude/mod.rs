//! Amplitude pipeline shared by live metering and stored-file waveforms.
//!
//! - `normalize`: decibel and linear readings to display amplitudes
//! - `window`: fixed-capacity sliding window of recent amplitudes
//! - `meter`: periodic live metering into a window
//! - `decode`: stored files to mono sample buffers
//! - `envelope`: peak envelope extraction for whole files

pub mod decode;
pub mod envelope;
pub mod error;
pub mod meter;
pub mod normalize;
pub mod window;

pub use decode::{DecodedAudio, MonoDecoder, WavDecoder};
pub use envelope::{extract_envelope, load_envelope, WaveformEnvelope};
pub use error::{CurveError, DecodeError, SourceUnavailable};
pub use meter::{AmplitudeMeter, MeterState, PowerSource, WindowReader};
pub use normalize::NormalizationCurve;
pub use window::AmplitudeWindow;
