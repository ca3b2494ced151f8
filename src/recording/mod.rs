//! Audio recording feature for voicerec.
//!
//! Provides microphone access, audio capture, live visualization, and user
//! interaction handling for the recording workflow.

pub mod audio;
pub mod device;
pub mod ui;
pub mod visualizations;

pub use audio::{AudioRecorder, PowerProbe};
pub use device::MicrophoneAccess;
pub use ui::{RecorderTui, RecordingCommand};
