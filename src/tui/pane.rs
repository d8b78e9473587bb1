use ratatui::{
    style::Style,
    text::{Line, Span},
};
use std::collections::VecDeque;

/// Lines kept in the output region's scrollback
pub const SCROLLBACK_LINES: usize = 2000;

const TAB_WIDTH: usize = 8;

/// One step of text rendering in the output region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputAction {
    Text(char, Style),
    LineFeed,
    CarriageReturn,
    Backspace,
    Tab,
}

impl OutputAction {
    /// Unstyled actions for locally generated text (echo, info lines)
    pub fn from_text(text: &str) -> Vec<OutputAction> {
        text.chars()
            .filter_map(|c| match c {
                '\n' => Some(OutputAction::LineFeed),
                '\r' => Some(OutputAction::CarriageReturn),
                '\x08' | '\x7f' => Some(OutputAction::Backspace),
                '\t' => Some(OutputAction::Tab),
                c if c.is_control() => None,
                c => Some(OutputAction::Text(c, Style::default())),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    fn blank() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// Scrollback model of the output region.
///
/// Text wraps at the region width. A line feed starts a new line at column
/// zero; a carriage return only moves the cursor back to column zero, so the
/// following text overwrites.
#[derive(Debug, Clone)]
pub struct OutputPane {
    lines: VecDeque<Vec<Cell>>,
    cursor_col: usize,
    width: usize,
    max_lines: usize,
}

impl OutputPane {
    pub fn new(width: u16, max_lines: usize) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(Vec::new());
        Self {
            lines,
            cursor_col: 0,
            width: usize::from(width).max(1),
            max_lines: max_lines.max(1),
        }
    }

    pub fn apply(&mut self, action: &OutputAction) {
        match *action {
            OutputAction::Text(ch, style) => self.put_char(ch, style),
            OutputAction::LineFeed => self.line_feed(),
            OutputAction::CarriageReturn => self.cursor_col = 0,
            OutputAction::Backspace => self.cursor_col = self.cursor_col.saturating_sub(1),
            OutputAction::Tab => {
                let next_stop = (self.cursor_col / TAB_WIDTH + 1) * TAB_WIDTH;
                let next_stop = next_stop.min(self.width);
                while self.cursor_col < next_stop {
                    self.put_char(' ', Style::default());
                }
            }
        }
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = usize::from(width).max(1);
        self.cursor_col = self.cursor_col.min(self.width);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.lines.push_back(Vec::new());
        self.cursor_col = 0;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    /// Plain text of line `index`, oldest first
    pub fn line_text(&self, index: usize) -> Option<String> {
        self.lines
            .get(index)
            .map(|cells| cells.iter().map(|cell| cell.ch).collect())
    }

    /// Plain text of the last `height` lines
    pub fn visible_text(&self, height: usize) -> Vec<String> {
        let start = self.lines.len().saturating_sub(height);
        (start..self.lines.len())
            .filter_map(|index| self.line_text(index))
            .collect()
    }

    /// The last `height` lines as styled ratatui lines, one span per run of
    /// equally styled cells
    pub fn visible_lines(&self, height: usize) -> Vec<Line<'static>> {
        let start = self.lines.len().saturating_sub(height);
        self.lines
            .iter()
            .skip(start)
            .map(|cells| Line::from(Self::spans(cells)))
            .collect()
    }

    fn spans(cells: &[Cell]) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        let mut run = String::new();
        let mut run_style = Style::default();

        for cell in cells {
            if cell.style != run_style && !run.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut run), run_style));
            }
            run_style = cell.style;
            run.push(cell.ch);
        }
        if !run.is_empty() {
            spans.push(Span::styled(run, run_style));
        }
        spans
    }

    fn put_char(&mut self, ch: char, style: Style) {
        if self.cursor_col >= self.width {
            self.line_feed();
        }

        let col = self.cursor_col;
        let line = self.current_line();
        if col < line.len() {
            line[col] = Cell { ch, style };
        } else {
            line.resize(col, Cell::blank());
            line.push(Cell { ch, style });
        }
        self.cursor_col += 1;
    }

    fn line_feed(&mut self) {
        self.lines.push_back(Vec::new());
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
        self.cursor_col = 0;
    }

    fn current_line(&mut self) -> &mut Vec<Cell> {
        if self.lines.is_empty() {
            self.lines.push_back(Vec::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn write(pane: &mut OutputPane, text: &str) {
        for action in OutputAction::from_text(text) {
            pane.apply(&action);
        }
    }

    #[test]
    fn test_new_pane_is_empty() {
        let pane = OutputPane::new(80, SCROLLBACK_LINES);
        assert!(pane.is_empty());
        assert_eq!(pane.len(), 1);
        assert_eq!(pane.line_text(0).unwrap(), "");
    }

    #[test]
    fn test_line_feed_and_carriage_return() {
        let mut pane = OutputPane::new(80, SCROLLBACK_LINES);
        write(&mut pane, "hello\r\nworld\rW");

        assert_eq!(pane.len(), 2);
        assert_eq!(pane.line_text(0).unwrap(), "hello");
        assert_eq!(pane.line_text(1).unwrap(), "World");
        assert_eq!(pane.cursor_col(), 1);
    }

    #[test]
    fn test_backspace_overwrites() {
        let mut pane = OutputPane::new(80, SCROLLBACK_LINES);
        write(&mut pane, "abc\x08X");
        assert_eq!(pane.line_text(0).unwrap(), "abX");
    }

    #[test]
    fn test_tab_pads_to_stop() {
        let mut pane = OutputPane::new(80, SCROLLBACK_LINES);
        write(&mut pane, "ab\tc");
        assert_eq!(pane.line_text(0).unwrap(), "ab      c");
    }

    #[test]
    fn test_wraps_at_width() {
        let mut pane = OutputPane::new(4, SCROLLBACK_LINES);
        write(&mut pane, "abcdef");
        assert_eq!(pane.visible_text(10), vec!["abcd", "ef"]);
    }

    #[test]
    fn test_scrollback_is_bounded() {
        let mut pane = OutputPane::new(10, 3);
        write(&mut pane, "1\n2\n3\n4\n5");
        assert_eq!(pane.len(), 3);
        assert_eq!(pane.visible_text(3), vec!["3", "4", "5"]);
        assert_eq!(pane.visible_text(2), vec!["4", "5"]);
    }

    #[test]
    fn test_styled_runs_become_spans() {
        let mut pane = OutputPane::new(20, SCROLLBACK_LINES);
        let red = Style::default().fg(Color::Red);
        pane.apply(&OutputAction::Text('a', red));
        pane.apply(&OutputAction::Text('b', red));
        pane.apply(&OutputAction::Text('c', Style::default()));

        let lines = pane.visible_lines(1);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].spans[0].content, "ab");
        assert_eq!(lines[0].spans[0].style, red);
        assert_eq!(lines[0].spans[1].content, "c");
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut pane = OutputPane::new(20, SCROLLBACK_LINES);
        write(&mut pane, "one\ntwo");
        pane.clear();
        assert!(pane.is_empty());
        assert_eq!(pane.cursor_col(), 0);
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let mut pane = OutputPane::new(20, SCROLLBACK_LINES);
        write(&mut pane, "a\x07b\x00c");
        assert_eq!(pane.line_text(0).unwrap(), "abc");
    }
}
