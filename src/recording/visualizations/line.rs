//! Connected polyline through the samples.

use super::{fit_to_width, AmplitudeView, BACKGROUND, INK};
use ratatui::layout::Rect;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line};
use ratatui::Frame;

pub struct LineView;

impl AmplitudeView for LineView {
    fn render(&self, frame: &mut Frame, area: Rect, samples: &[f32]) {
        // Braille cells are two dots wide.
        let points = fit_to_width(samples, usize::from(area.width) * 2);
        let x_max = points.len().saturating_sub(1).max(1) as f64;

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(BACKGROUND)
            .x_bounds([0.0, x_max])
            .y_bounds([0.0, 1.0])
            .paint(|ctx| {
                for (i, pair) in points.windows(2).enumerate() {
                    ctx.draw(&Line {
                        x1: i as f64,
                        y1: f64::from(pair[0]),
                        x2: (i + 1) as f64,
                        y2: f64::from(pair[1]),
                        color: INK,
                    });
                }
            });

        frame.render_widget(canvas, area);
    }
}
