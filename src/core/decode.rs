use ratatui::style::{Color, Modifier, Style};
use vte::{Params, Parser, Perform};

use crate::tui::OutputAction;

/// Turns raw serial bytes into output actions.
///
/// The parser keeps its state between calls, so an escape sequence or UTF-8
/// character split across two reads is completed on the next one instead of
/// being rendered as stray bytes. With colors disabled, SGR sequences are
/// parsed and dropped.
pub struct ColorDecoder {
    parser: Parser,
    pen: Style,
    colors: bool,
}

impl ColorDecoder {
    pub fn new(colors: bool) -> Self {
        Self {
            parser: Parser::new(),
            pen: Style::default(),
            colors,
        }
    }

    pub fn decode(&mut self, bytes: &[u8]) -> Vec<OutputAction> {
        let mut performer = Performer {
            pen: &mut self.pen,
            colors: self.colors,
            actions: Vec::with_capacity(bytes.len()),
        };
        for byte in bytes {
            self.parser.advance(&mut performer, *byte);
        }
        performer.actions
    }
}

// Private struct to hide this implementation detail
struct Performer<'a> {
    pen: &'a mut Style,
    colors: bool,
    actions: Vec<OutputAction>,
}

impl Perform for Performer<'_> {
    fn print(&mut self, c: char) {
        let style = if self.colors { *self.pen } else { Style::default() };
        self.actions.push(OutputAction::Text(c, style));
    }

    fn execute(&mut self, byte: u8) {
        let action = match byte {
            0x08 => OutputAction::Backspace,
            0x09 => OutputAction::Tab,
            0x0a | 0x0b | 0x0c => OutputAction::LineFeed,
            0x0d => OutputAction::CarriageReturn,
            _ => return,
        };
        self.actions.push(action);
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, c: char) {
        if c == 'm' && intermediates.is_empty() && !ignore && self.colors {
            apply_sgr(self.pen, params);
        }
    }
}

fn apply_sgr(pen: &mut Style, params: &Params) {
    let params: Vec<&[u16]> = params.iter().collect();
    if params.is_empty() {
        *pen = Style::default();
        return;
    }

    let mut i = 0;
    while i < params.len() {
        let param = params[i];
        match param[0] {
            0 => *pen = Style::default(),
            1 => *pen = pen.add_modifier(Modifier::BOLD),
            2 => *pen = pen.add_modifier(Modifier::DIM),
            3 => *pen = pen.add_modifier(Modifier::ITALIC),
            4 => *pen = pen.add_modifier(Modifier::UNDERLINED),
            5 => *pen = pen.add_modifier(Modifier::SLOW_BLINK),
            7 => *pen = pen.add_modifier(Modifier::REVERSED),
            9 => *pen = pen.add_modifier(Modifier::CROSSED_OUT),
            22 => *pen = pen.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => *pen = pen.remove_modifier(Modifier::ITALIC),
            24 => *pen = pen.remove_modifier(Modifier::UNDERLINED),
            25 => *pen = pen.remove_modifier(Modifier::SLOW_BLINK),
            27 => *pen = pen.remove_modifier(Modifier::REVERSED),
            29 => *pen = pen.remove_modifier(Modifier::CROSSED_OUT),
            n @ 30..=37 => *pen = pen.fg(ansi_color(n - 30)),
            39 => *pen = pen.fg(Color::Reset),
            n @ 40..=47 => *pen = pen.bg(ansi_color(n - 40)),
            49 => *pen = pen.bg(Color::Reset),
            n @ 90..=97 => *pen = pen.fg(ansi_color(n - 90 + 8)),
            n @ 100..=107 => *pen = pen.bg(ansi_color(n - 100 + 8)),
            n @ (38 | 48) => {
                // Either `38:5:n` in one parameter or `38;5;n` spread over
                // the following ones
                let (color, consumed) = if param.len() > 1 {
                    (extended_color(&param[1..]), 0)
                } else {
                    let rest: Vec<u16> = params[i + 1..].iter().map(|p| p[0]).collect();
                    let consumed = match rest.first() {
                        Some(5) => 2,
                        Some(2) => 4,
                        _ => 0,
                    }
                    .min(rest.len());
                    (extended_color(&rest[..consumed]), consumed)
                };
                if let Some(color) = color {
                    *pen = if n == 38 { pen.fg(color) } else { pen.bg(color) };
                }
                i += consumed;
            }
            _ => {}
        }
        i += 1;
    }
}

/// `5;n` (256-color) or `2;r;g;b` (24-bit). A colorspace id between `2` and
/// the components is tolerated.
fn extended_color(params: &[u16]) -> Option<Color> {
    match params {
        [5, n, ..] => Some(Color::Indexed(clamp(*n))),
        [2, _, r, g, b] => Some(Color::Rgb(clamp(*r), clamp(*g), clamp(*b))),
        [2, r, g, b, ..] => Some(Color::Rgb(clamp(*r), clamp(*g), clamp(*b))),
        _ => None,
    }
}

fn clamp(value: u16) -> u8 {
    value.min(255) as u8
}

fn ansi_color(index: u16) -> Color {
    match index {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        7 => Color::Gray,
        8 => Color::DarkGray,
        9 => Color::LightRed,
        10 => Color::LightGreen,
        11 => Color::LightYellow,
        12 => Color::LightBlue,
        13 => Color::LightMagenta,
        14 => Color::LightCyan,
        _ => Color::White,
    }
}
