use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend, TestBackend},
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Terminal,
};
use tracing::{debug, warn};

use super::pane::{OutputAction, OutputPane, SCROLLBACK_LINES};
use crate::domain::error::{ComError, ComResult};

/// Text currently shown on a surface, for inspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceSnapshot {
    /// Visible lines of the output region, top to bottom
    pub output: Vec<String>,
    /// Status region
    pub status: String,
}

/// Three-region screen: output, status and input.
///
/// Not safe for concurrent use; callers serialize every call through the
/// session's render mutex.
pub trait Surface: Send {
    /// Width of the status region in columns
    fn width(&self) -> u16;

    /// Render text into the output region
    fn write_output(&mut self, actions: &[OutputAction]) -> ComResult<()>;

    /// Erase the output region and its scrollback
    fn clear_output(&mut self) -> ComResult<()>;

    /// Replace the status region. The text cursor is hidden while drawing and
    /// put back in the input region afterwards.
    fn write_status(&mut self, line: &str) -> ComResult<()>;

    /// Re-read the terminal dimensions and reposition every region
    fn resize(&mut self) -> ComResult<()>;

    /// Tear down all regions. Further calls are no-ops.
    fn destroy(&mut self) -> ComResult<()>;

    fn snapshot(&self) -> SurfaceSnapshot;
}

struct Regions {
    output: Rect,
    status: Rect,
    input: Rect,
}

fn regions(area: Rect) -> Regions {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Output
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Input line
        ])
        .split(area);

    Regions {
        output: chunks[0],
        status: chunks[1],
        input: chunks[2],
    }
}

fn terminal_error(e: io::Error) -> ComError {
    ComError::Terminal(e.to_string())
}

/// [`Surface`] drawn with ratatui.
pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    pane: OutputPane,
    status: String,
    area: Rect,
    owns_tty: bool,
    destroyed: bool,
}

impl TerminalSurface<CrosstermBackend<Stdout>> {
    /// Take over the controlling terminal: raw mode plus alternate screen.
    pub fn open() -> ComResult<Self> {
        enable_raw_mode().map_err(terminal_error)?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(terminal_error(e));
        }

        let backend = CrosstermBackend::new(stdout);
        let surface = Terminal::new(backend)
            .map_err(terminal_error)
            .and_then(|terminal| Self::with_terminal(terminal, true));
        if surface.is_err() {
            let _ = restore_terminal();
        }
        surface
    }
}

impl TerminalSurface<TestBackend> {
    /// Off-screen surface of the given size
    pub fn headless(width: u16, height: u16) -> ComResult<Self> {
        let terminal = Terminal::new(TestBackend::new(width, height)).map_err(terminal_error)?;
        Self::with_terminal(terminal, false)
    }

    /// Change the size of the off-screen terminal, as a window resize would
    pub fn resize_backend(&mut self, width: u16, height: u16) {
        self.terminal.backend_mut().resize(width, height);
    }
}

impl<B: Backend> TerminalSurface<B> {
    fn with_terminal(mut terminal: Terminal<B>, owns_tty: bool) -> ComResult<Self> {
        let area = terminal.size().map_err(terminal_error)?;
        terminal.clear().map_err(terminal_error)?;

        let mut surface = Self {
            terminal,
            pane: OutputPane::new(area.width, SCROLLBACK_LINES),
            status: String::new(),
            area,
            owns_tty,
            destroyed: false,
        };
        surface.draw()?;
        Ok(surface)
    }

    fn draw(&mut self) -> ComResult<()> {
        let pane = &self.pane;
        let status = self.status.as_str();

        self.terminal
            .draw(|f| {
                let regions = regions(f.size());
                let output = pane.visible_lines(usize::from(regions.output.height));
                f.render_widget(Paragraph::new(output), regions.output);
                f.render_widget(Paragraph::new(status), regions.status);
                f.set_cursor(regions.input.x, regions.input.y);
            })
            .map_err(terminal_error)?;
        Ok(())
    }
}

impl<B: Backend + Send> Surface for TerminalSurface<B> {
    fn width(&self) -> u16 {
        self.area.width
    }

    fn write_output(&mut self, actions: &[OutputAction]) -> ComResult<()> {
        if self.destroyed {
            return Ok(());
        }
        for action in actions {
            self.pane.apply(action);
        }
        self.draw()
    }

    fn clear_output(&mut self) -> ComResult<()> {
        if self.destroyed {
            return Ok(());
        }
        self.pane.clear();
        self.draw()
    }

    fn write_status(&mut self, line: &str) -> ComResult<()> {
        if self.destroyed {
            return Ok(());
        }
        self.status = line.to_string();
        self.terminal.hide_cursor().map_err(terminal_error)?;
        self.draw()
    }

    fn resize(&mut self) -> ComResult<()> {
        if self.destroyed {
            return Ok(());
        }
        self.terminal.autoresize().map_err(terminal_error)?;
        self.area = self.terminal.size().map_err(terminal_error)?;
        self.pane.set_width(self.area.width);
        debug!("Surface resized to {}x{}", self.area.width, self.area.height);

        self.terminal.clear().map_err(terminal_error)?;
        self.draw()
    }

    fn destroy(&mut self) -> ComResult<()> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;

        self.terminal.clear().map_err(terminal_error)?;
        self.terminal.show_cursor().map_err(terminal_error)?;
        if self.owns_tty {
            restore_terminal()?;
        }
        Ok(())
    }

    fn snapshot(&self) -> SurfaceSnapshot {
        let output_height = regions(self.area).output.height;
        SurfaceSnapshot {
            output: self.pane.visible_text(usize::from(output_height)),
            status: self.status.clone(),
        }
    }
}

impl<B: Backend> Drop for TerminalSurface<B> {
    fn drop(&mut self) {
        if self.owns_tty && !self.destroyed {
            if let Err(e) = restore_terminal() {
                warn!("Failed to restore terminal: {}", e);
            }
        }
    }
}

/// Leave the alternate screen and raw mode
pub fn restore_terminal() -> ComResult<()> {
    disable_raw_mode().map_err(terminal_error)?;
    execute!(io::stdout(), LeaveAlternateScreen).map_err(terminal_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Style};

    #[test]
    fn test_headless_regions() {
        let surface = TerminalSurface::headless(40, 10).unwrap();
        assert_eq!(surface.width(), 40);

        let snapshot = surface.snapshot();
        assert_eq!(snapshot.output, vec![""]);
        assert_eq!(snapshot.status, "");
    }

    #[test]
    fn test_write_output_and_status() {
        let mut surface = TerminalSurface::headless(40, 10).unwrap();
        surface
            .write_output(&OutputAction::from_text("boot ok\r\n> "))
            .unwrap();
        surface.write_status("|--a--|").unwrap();

        let snapshot = surface.snapshot();
        assert_eq!(snapshot.output, vec!["boot ok", "> "]);
        assert_eq!(snapshot.status, "|--a--|");
    }

    #[test]
    fn test_output_region_shows_latest_lines() {
        let mut surface = TerminalSurface::headless(20, 4).unwrap();
        surface
            .write_output(&OutputAction::from_text("1\n2\n3\n4"))
            .unwrap();

        // Two rows are taken by the status and input regions
        assert_eq!(surface.snapshot().output, vec!["3", "4"]);
    }

    #[test]
    fn test_styled_output_reaches_backend() {
        let mut surface = TerminalSurface::headless(10, 4).unwrap();
        let red = Style::default().fg(Color::Red);
        surface.write_output(&[OutputAction::Text('x', red)]).unwrap();

        let buffer = surface.terminal.backend().buffer();
        assert_eq!(buffer.get(0, 0).fg, Color::Red);
    }

    #[test]
    fn test_resize_follows_backend() {
        let mut surface = TerminalSurface::headless(40, 10).unwrap();
        surface.resize_backend(20, 6);
        surface.resize().unwrap();

        assert_eq!(surface.width(), 20);
        surface
            .write_output(&OutputAction::from_text("0123456789abcdefghijXY"))
            .unwrap();
        assert_eq!(
            surface.snapshot().output,
            vec!["0123456789abcdefghij", "XY"]
        );
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut surface = TerminalSurface::headless(10, 4).unwrap();
        surface.destroy().unwrap();
        surface.destroy().unwrap();
        // Writes after teardown are dropped
        surface.write_output(&OutputAction::from_text("late")).unwrap();
        assert_eq!(surface.snapshot().output, vec![""]);
    }
}
