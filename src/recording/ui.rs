//! Terminal user interface for recording with a live amplitude display.
//!
//! The TUI never measures audio itself. Each frame it draws whatever window
//! the meter last produced, plus duration, level and peak readouts.

use crate::config::VisualizerStyle;
use crate::recording::visualizations::view_for;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

/// How long the peak readout holds its highest value.
const PEAK_HOLD: Duration = Duration::from_secs(3);

/// User input command during recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingCommand {
    /// Continue recording (no key pressed)
    Continue,
    /// Stop and keep the recording (Enter key)
    Save,
    /// Stop and discard the recording (Escape or 'q')
    Cancel,
    /// Pause/resume recording (Space key)
    TogglePause,
    /// Switch to the next visualizer style ('v' key)
    CycleStyle,
}

/// Everything the footer shows, computed before drawing.
#[derive(Debug, Clone, Copy)]
pub struct RecordingStatus {
    pub elapsed: Duration,
    pub level: f32,
    pub peak: f32,
    pub peak_threshold: f32,
    pub paused: bool,
    pub style: VisualizerStyle,
}

/// Draws one recording frame: the visualization above a one-line footer.
pub fn draw_recording(frame: &mut Frame, samples: &[f32], status: &RecordingStatus) {
    let area = frame.area();
    let footer_height = 1;

    let content_area = Rect {
        height: area.height.saturating_sub(footer_height),
        ..area
    };
    let footer_area = Rect {
        y: area.y + area.height.saturating_sub(footer_height),
        height: footer_height.min(area.height),
        ..area
    };

    view_for(status.style).render(frame, content_area, samples);

    let (level, peak) = if status.paused {
        (0.0, 0.0)
    } else {
        (status.level, status.peak)
    };

    let peak_style = if peak >= status.peak_threshold {
        Style::default().bg(Color::Red).fg(Color::Rgb(255, 255, 255))
    } else {
        Style::default()
    };

    let indicator = if status.paused {
        Span::styled("⏸ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("● ", Style::default().fg(Color::Red))
    };

    let secs = status.elapsed.as_secs();
    let footer = Line::from(vec![
        indicator,
        Span::raw(format!("{}:{:02}", secs / 60, secs % 60)),
        Span::raw(" / "),
        Span::raw(format!("{}%", percent(level))),
        Span::raw(" / "),
        Span::styled(format!("{}%", percent(peak)), peak_style),
        Span::raw(format!("  [{}]", status.style)),
        Span::styled(
            "  enter save · space pause · v style · esc cancel",
            Style::default().fg(Color::DarkGray),
        ),
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

fn percent(amplitude: f32) -> u8 {
    (amplitude.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Highest level seen recently; falls back to the current level once stale.
#[derive(Debug)]
struct PeakHold {
    value: f32,
    since: Instant,
}

impl PeakHold {
    fn new() -> Self {
        Self {
            value: 0.0,
            since: Instant::now(),
        }
    }

    fn update(&mut self, level: f32, now: Instant) -> f32 {
        if level > self.value || now.duration_since(self.since) >= PEAK_HOLD {
            self.value = level;
            self.since = now;
        }
        self.value
    }
}

/// Terminal UI for the recording workflow.
pub struct RecorderTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    style: VisualizerStyle,
    peak_threshold: f32,
    peak_hold: PeakHold,
    recording_start_time: Instant,
    /// Whether recording is currently paused
    pub is_paused: bool,
    /// Total time paused (accumulated when paused)
    pause_duration: Duration,
    /// When pause started (for calculating pause duration)
    pause_start_time: Option<Instant>,
}

impl RecorderTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(style: VisualizerStyle, peak_threshold: f32) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            style,
            peak_threshold,
            peak_hold: PeakHold::new(),
            recording_start_time: Instant::now(),
            is_paused: false,
            pause_duration: Duration::ZERO,
            pause_start_time: None,
        })
    }

    pub fn style(&self) -> VisualizerStyle {
        self.style
    }

    /// Draws the meter window and the status footer.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, samples: &[f32], level: f32) -> anyhow::Result<()> {
        let status = RecordingStatus {
            elapsed: self.recording_duration(),
            level,
            peak: self.peak_hold.update(level, Instant::now()),
            peak_threshold: self.peak_threshold,
            paused: self.is_paused,
            style: self.style,
        };

        self.terminal
            .draw(|frame| draw_recording(frame, samples, &status))?;
        Ok(())
    }

    /// Processes user input and returns the appropriate recording command.
    ///
    /// Waits up to `timeout` for a key, which also paces the render loop.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, timeout: Duration) -> anyhow::Result<RecordingCommand> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter => {
                        tracing::debug!("Enter pressed: saving recording");
                        RecordingCommand::Save
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: canceling recording");
                        RecordingCommand::Cancel
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        tracing::debug!("Ctrl+C pressed: canceling recording");
                        RecordingCommand::Cancel
                    }
                    KeyCode::Char(' ') => {
                        self.toggle_pause_state();
                        tracing::debug!("Space pressed: paused = {}", self.is_paused);
                        RecordingCommand::TogglePause
                    }
                    KeyCode::Char('v') => {
                        self.style = self.style.next();
                        tracing::debug!("Visualizer style: {}", self.style);
                        RecordingCommand::CycleStyle
                    }
                    _ => RecordingCommand::Continue,
                });
            }
        }
        Ok(RecordingCommand::Continue)
    }

    fn toggle_pause_state(&mut self) {
        if self.is_paused {
            if let Some(pause_start) = self.pause_start_time.take() {
                self.pause_duration += pause_start.elapsed();
            }
            self.is_paused = false;
        } else {
            self.pause_start_time = Some(Instant::now());
            self.is_paused = true;
        }
    }

    /// Elapsed recording time, excluding paused time.
    fn recording_duration(&self) -> Duration {
        let mut pause_time = self.pause_duration;
        if let Some(pause_start) = self.pause_start_time {
            pause_time += pause_start.elapsed();
        }
        self.recording_start_time.elapsed().saturating_sub(pause_time)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
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
    use ratatui::backend::TestBackend;

    fn status(paused: bool) -> RecordingStatus {
        RecordingStatus {
            elapsed: Duration::from_secs(75),
            level: 0.42,
            peak: 0.95,
            peak_threshold: 0.9,
            paused,
            style: VisualizerStyle::Bars,
        }
    }

    fn footer_text(status: &RecordingStatus) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 5)).unwrap();
        terminal
            .draw(|frame| draw_recording(frame, &[0.5; 10], status))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..80).map(|x| buffer[(x, 4)].symbol().to_string()).collect()
    }

    #[test]
    fn test_footer_shows_duration_level_and_style() {
        let text = footer_text(&status(false));
        assert!(text.contains("1:15"));
        assert!(text.contains("42%"));
        assert!(text.contains("95%"));
        assert!(text.contains("[bars]"));
    }

    #[test]
    fn test_footer_zeroes_levels_while_paused() {
        let text = footer_text(&status(true));
        assert!(text.contains("⏸"));
        assert!(text.contains("0% / 0%"));
    }

    #[test]
    fn test_peak_hold_expires() {
        let start = Instant::now();
        let mut hold = PeakHold {
            value: 0.0,
            since: start,
        };
        assert_eq!(hold.update(0.8, start), 0.8);
        assert_eq!(hold.update(0.3, start + Duration::from_secs(1)), 0.8);
        assert_eq!(hold.update(0.3, start + PEAK_HOLD + Duration::from_secs(1)), 0.3);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(0.426), 43);
        assert_eq!(percent(1.7), 100);
    }
}
