//! Full-screen error display.
//!
//! Interactive commands show failures here instead of printing into a
//! terminal that is still in raw mode.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const ERROR_BG: Color = Color::Rgb(255, 0, 0);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Draws `title` and `message` centred on a red screen.
pub fn draw_error(frame: &mut Frame, title: &str, message: &str) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(ERROR_BG)), area);

    let style = Style::default().fg(ERROR_FG).bg(ERROR_BG);
    let mut lines = vec![
        Line::from(Span::styled(title, style.add_modifier(Modifier::BOLD))),
        Line::default(),
    ];
    lines.extend(message.lines().map(|line| Line::from(Span::styled(line, style))));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("press any key", style.add_modifier(Modifier::DIM))));

    let text_height = lines.len() as u16;
    let text_area = Rect {
        x: area.x + area.width / 10,
        y: area.y + area.height.saturating_sub(text_height) / 2,
        width: area.width * 8 / 10,
        height: text_height.min(area.height),
    };

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        text_area,
    );
}

/// Error screen for displaying human-readable error messages.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Shows the error until any key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, title: &str, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal
                .draw(|frame| draw_error(frame, title, message))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Opens an error screen, waits for a key and restores the terminal.
///
/// # Errors
/// - If the terminal cannot be driven
pub fn report_error(title: &str, message: &str) -> anyhow::Result<()> {
    let mut screen = ErrorScreen::new()?;
    screen.show_error(title, message)?;
    screen.cleanup()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_error_screen_is_red_and_shows_message() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|frame| draw_error(frame, "Recording Error", "device gone"))
            .unwrap();

        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(0, 0)].bg, ERROR_BG);

        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Recording Error"));
        assert!(text.contains("device gone"));
    }
}
