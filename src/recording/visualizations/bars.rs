//! Vertical bars rising from the bottom edge.

use super::{fit_to_width, ink_style, to_levels, AmplitudeView, LEVEL_MAX};
use ratatui::layout::Rect;
use ratatui::widgets::Sparkline;
use ratatui::Frame;

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct BarsView;

impl AmplitudeView for BarsView {
    fn render(&self, frame: &mut Frame, area: Rect, samples: &[f32]) {
        let levels = to_levels(&fit_to_width(samples, usize::from(area.width)));
        let sparkline = Sparkline::default()
            .data(&levels)
            .max(LEVEL_MAX)
            .style(ink_style());
        frame.render_widget(sparkline, area);
    }
}

/// Renders amplitudes as one line of block characters, one per sample.
pub fn block_line(samples: &[f32]) -> String {
    samples
        .iter()
        .map(|&s| {
            let index = (s.clamp(0.0, 1.0) * (BLOCKS.len() - 1) as f32).round() as usize;
            BLOCKS[index]
        })
        .collect()
}
