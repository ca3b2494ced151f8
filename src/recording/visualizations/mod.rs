//! Visualizations for amplitude windows and waveform envelopes.
//!
//! Every style draws the same data: normalized amplitudes in `[0, 1]`, oldest
//! first. The caller picks a style with [`view_for`] and hands it whatever it
//! currently has, a live meter window or a precomputed envelope.

pub mod bars;
pub mod line;
pub mod mirror;

pub use bars::{block_line, BarsView};
pub use line::LineView;
pub use mirror::MirrorView;

use crate::config::VisualizerStyle;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::Frame;

/// Resolution of the integer levels handed to sparklines.
pub const LEVEL_MAX: u64 = 100;

/// Foreground of drawn amplitude.
pub(crate) const INK: Color = Color::Rgb(206, 224, 220);
/// Background of the lower half in mirrored displays.
pub(crate) const PAPER: Color = Color::Rgb(185, 207, 212);
pub(crate) const BACKGROUND: Color = Color::Rgb(0, 0, 0);

pub(crate) fn ink_style() -> Style {
    Style::default().bg(BACKGROUND).fg(INK)
}

/// A way of drawing a sequence of amplitudes into an area.
pub trait AmplitudeView {
    fn render(&self, frame: &mut Frame, area: Rect, samples: &[f32]);
}

/// Returns the view that draws `style`.
pub fn view_for(style: VisualizerStyle) -> &'static dyn AmplitudeView {
    match style {
        VisualizerStyle::Bars => &BarsView,
        VisualizerStyle::Line => &LineView,
        VisualizerStyle::Mirror => &MirrorView,
    }
}

/// Stretches or compresses `samples` to exactly `width` values.
///
/// Each output column takes the loudest sample of the input range it covers,
/// so short peaks survive compression. An empty input yields silence.
pub fn fit_to_width(samples: &[f32], width: usize) -> Vec<f32> {
    if samples.is_empty() {
        return vec![0.0; width];
    }

    let len = samples.len();
    (0..width)
        .map(|column| {
            let start = column * len / width;
            let end = ((column + 1) * len / width).max(start + 1).min(len);
            samples[start..end].iter().copied().fold(0.0f32, f32::max)
        })
        .collect()
}

/// Converts amplitudes to sparkline levels in `0..=LEVEL_MAX`.
pub fn to_levels(samples: &[f32]) -> Vec<u64> {
    samples
        .iter()
        .map(|&s| (s.clamp(0.0, 1.0) * LEVEL_MAX as f32).round() as u64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to_width_stretches() {
        assert_eq!(fit_to_width(&[0.2, 0.8], 4), vec![0.2, 0.2, 0.8, 0.8]);
    }

    #[test]
    fn test_fit_to_width_compresses_keeping_peaks() {
        let samples = [0.1, 0.9, 0.2, 0.3, 0.4, 0.5];
        assert_eq!(fit_to_width(&samples, 3), vec![0.9, 0.3, 0.5]);
    }

    #[test]
    fn test_fit_to_width_edges() {
        assert_eq!(fit_to_width(&[], 3), vec![0.0; 3]);
        assert!(fit_to_width(&[0.5], 0).is_empty());
        assert_eq!(fit_to_width(&[0.5, 0.6, 0.7], 3), vec![0.5, 0.6, 0.7]);
    }

    #[test]
    fn test_to_levels_clamps() {
        assert_eq!(to_levels(&[0.0, 0.5, 1.0, 1.5, -0.2]), vec![0, 50, 100, 100, 0]);
    }

    #[test]
    fn test_every_style_has_a_view() {
        let mut style = VisualizerStyle::default();
        for _ in 0..3 {
            let _ = view_for(style);
            style = style.next();
        }
        assert_eq!(style, VisualizerStyle::default());
    }
}
