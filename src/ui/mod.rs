//! Shared full-screen views.

pub mod error;
pub mod waveform_view;

pub use error::{report_error, ErrorScreen};
pub use waveform_view::WaveformScreen;
