//! Full-screen waveform of a stored recording.
//!
//! The envelope is computed off the UI thread. Until it arrives the screen
//! shows a loading line; a decode failure replaces the waveform with the
//! error message. Either way the screen stays until the user leaves it.

use crate::amplitude::{DecodeError, WaveformEnvelope};
use crate::recording::visualizations::{AmplitudeView, MirrorView};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::Paragraph,
};
use std::io::{stdout, Stdout};
use std::time::Duration;
use tokio::task::JoinHandle;

const FRAME_INTERVAL: Duration = Duration::from_millis(50);
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// What the screen currently knows about the envelope.
#[derive(Debug)]
pub enum EnvelopeState {
    Loading,
    Ready(WaveformEnvelope),
    Failed(String),
}

impl EnvelopeState {
    fn from_result(
        result: Result<Result<WaveformEnvelope, DecodeError>, tokio::task::JoinError>,
    ) -> Self {
        match result {
            Ok(Ok(envelope)) => Self::Ready(envelope),
            Ok(Err(err)) => Self::Failed(err.to_string()),
            Err(err) => Self::Failed(format!("Waveform task failed: {err}")),
        }
    }
}

/// Draws the waveform (or its placeholder) above a one-line footer.
pub fn draw_waveform(frame: &mut Frame, title: &str, state: &EnvelopeState, tick: usize) {
    let area = frame.area();
    let content_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let footer_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1.min(area.height),
        ..area
    };

    let dim = Style::default().fg(Color::DarkGray);
    let status = match state {
        EnvelopeState::Loading => {
            let spinner = SPINNER[tick % SPINNER.len()];
            let message =
                Paragraph::new(format!("{spinner} loading waveform")).alignment(Alignment::Center);
            frame.render_widget(message, centered_line(content_area));
            Span::styled("loading", dim)
        }
        EnvelopeState::Ready(envelope) => {
            MirrorView.render(frame, content_area, envelope.peaks());
            if envelope.is_silent() {
                Span::styled("silent", dim)
            } else {
                Span::styled(format!("{} peaks", envelope.len()), dim)
            }
        }
        EnvelopeState::Failed(message) => {
            let text = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center);
            frame.render_widget(text, centered_line(content_area));
            Span::styled("failed", Style::default().fg(Color::Red))
        }
    };

    let footer = Line::from(vec![
        Span::raw(format!("{title}  ")),
        status,
        Span::styled("  esc close", dim),
    ]);
    frame.render_widget(
        Paragraph::new(footer).style(
            Style::default()
                .fg(Color::Rgb(185, 207, 212))
                .bg(Color::Rgb(0, 0, 0)),
        ),
        footer_area,
    );
}

fn centered_line(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: 1.min(area.height),
        ..area
    }
}

/// Terminal screen showing one recording's waveform.
pub struct WaveformScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl WaveformScreen {
    /// Enters alternate screen mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    /// Shows the screen until Esc, q or Enter is pressed.
    ///
    /// Leaving before the envelope is ready cancels its computation.
    ///
    /// # Errors
    /// - If terminal rendering or input polling fails
    pub async fn run(
        &mut self,
        title: &str,
        task: JoinHandle<Result<WaveformEnvelope, DecodeError>>,
    ) -> anyhow::Result<()> {
        let mut pending = Some(task);
        let mut state = EnvelopeState::Loading;
        let mut tick = 0usize;

        loop {
            if let Some(handle) = pending.take_if(|handle| handle.is_finished()) {
                state = EnvelopeState::from_result(handle.await);
                match &state {
                    EnvelopeState::Failed(message) => {
                        tracing::warn!("Waveform unavailable: {}", message)
                    }
                    _ => tracing::debug!("Waveform ready"),
                }
            }

            self.terminal
                .draw(|frame| draw_waveform(frame, title, &state, tick))?;
            tick = tick.wrapping_add(1);

            if event::poll(FRAME_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter) {
                        break;
                    }
                }
            }
        }

        if let Some(handle) = pending {
            tracing::debug!("Waveform screen closed while loading, cancelling");
            handle.abort();
        }
        Ok(())
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amplitude::extract_envelope;
    use ratatui::backend::TestBackend;

    fn screen_text(state: &EnvelopeState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal
            .draw(|frame| draw_waveform(frame, "Recording-1", state, 0))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_loading_state() {
        let text = screen_text(&EnvelopeState::Loading);
        assert!(text.contains("loading waveform"));
        assert!(text.contains("Recording-1"));
    }

    #[test]
    fn test_ready_state_draws_bars() {
        let envelope = extract_envelope(&[0.0, 1.0, 0.5, 0.25], 4);
        let text = screen_text(&EnvelopeState::Ready(envelope));
        assert!(text.contains("4 peaks"));
        assert!(text.contains('█'));
    }

    #[test]
    fn test_failed_state_shows_message() {
        let text = screen_text(&EnvelopeState::Failed("unsupported format".to_string()));
        assert!(text.contains("unsupported format"));
        assert!(text.contains("failed"));
    }

    #[tokio::test]
    async fn test_state_from_task_result() {
        let ok = tokio::spawn(async { Ok::<_, DecodeError>(extract_envelope(&[0.5], 1)) });
        assert!(matches!(EnvelopeState::from_result(ok.await), EnvelopeState::Ready(_)));

        let failed = tokio::spawn(async {
            Err::<WaveformEnvelope, _>(DecodeError::Interrupted("cancelled".into()))
        });
        assert!(matches!(EnvelopeState::from_result(failed.await), EnvelopeState::Failed(_)));
    }
}
