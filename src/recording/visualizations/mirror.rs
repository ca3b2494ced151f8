//! Bars reflected around the horizontal centre line.
//!
//! The upper half is a plain sparkline. The lower half draws the complement
//! of each level in the background colour on a light background, which leaves
//! a light bar hanging down from the centre with the same height.

use super::{fit_to_width, ink_style, to_levels, AmplitudeView, BACKGROUND, LEVEL_MAX, PAPER};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Sparkline;
use ratatui::Frame;

pub struct MirrorView;

impl AmplitudeView for MirrorView {
    fn render(&self, frame: &mut Frame, area: Rect, samples: &[f32]) {
        let levels = to_levels(&fit_to_width(samples, usize::from(area.width)));

        let top_height = area.height / 2;
        let top_area = Rect {
            height: top_height,
            ..area
        };
        let bottom_area = Rect {
            y: area.y + top_height,
            height: area.height.saturating_sub(top_height),
            ..area
        };

        let top = Sparkline::default()
            .data(&levels)
            .max(LEVEL_MAX)
            .style(ink_style());
        frame.render_widget(top, top_area);

        let inverted: Vec<u64> = levels.iter().map(|&v| LEVEL_MAX - v).collect();
        let bottom = Sparkline::default()
            .data(&inverted)
            .max(LEVEL_MAX)
            .style(Style::default().bg(PAPER).fg(BACKGROUND));
        frame.render_widget(bottom, bottom_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_silence_leaves_lower_half_filled_with_background_bars() {
        let mut terminal = Terminal::new(TestBackend::new(4, 4)).unwrap();
        terminal
            .draw(|frame| MirrorView.render(frame, frame.area(), &[0.0; 4]))
            .unwrap();

        let buffer = terminal.backend().buffer();
        for x in 0..4 {
            assert_eq!(buffer[(x, 0)].symbol(), " ");
            assert_eq!(buffer[(x, 1)].symbol(), " ");
            assert_eq!(buffer[(x, 2)].symbol(), "█");
            assert_eq!(buffer[(x, 3)].symbol(), "█");
        }
    }
}
