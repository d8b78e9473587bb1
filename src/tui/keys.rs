use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::error::{ComError, ComResult};

/// Something the keyboard path has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermEvent {
    /// Bytes produced by one key press
    Key(Vec<u8>),
    /// The terminal window changed size
    Resize,
}

/// Source of keyboard events with a bounded wait.
pub trait KeySource: Send {
    /// Wait at most `timeout` for the next event; `Ok(None)` when nothing
    /// arrived in time.
    fn next_event(&mut self, timeout: Duration) -> ComResult<Option<TermEvent>>;
}

/// Keyboard events from the controlling terminal.
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl CrosstermKeys {
    pub fn new() -> Self {
        Self
    }
}

impl KeySource for CrosstermKeys {
    fn next_event(&mut self, timeout: Duration) -> ComResult<Option<TermEvent>> {
        let ready = event::poll(timeout).map_err(|e| ComError::Terminal(e.to_string()))?;
        if !ready {
            return Ok(None);
        }

        match event::read().map_err(|e| ComError::Terminal(e.to_string()))? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                Ok(key_to_bytes(&key).map(TermEvent::Key))
            }
            Event::Resize(_, _) => Ok(Some(TermEvent::Resize)),
            _ => Ok(None),
        }
    }
}

/// Bytes a serial terminal sends for `key`, or `None` for keys with no
/// byte representation.
pub fn key_to_bytes(key: &KeyEvent) -> Option<Vec<u8>> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let mut bytes = match key.code {
        KeyCode::Char(c) if ctrl => vec![control_byte(c)?],
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            c.encode_utf8(&mut buf).as_bytes().to_vec()
        }
        KeyCode::Enter => vec![b'\n'],
        KeyCode::Tab => vec![b'\t'],
        KeyCode::BackTab => b"\x1b[Z".to_vec(),
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Esc => vec![0x1b],
        KeyCode::Up => b"\x1b[A".to_vec(),
        KeyCode::Down => b"\x1b[B".to_vec(),
        KeyCode::Right => b"\x1b[C".to_vec(),
        KeyCode::Left => b"\x1b[D".to_vec(),
        KeyCode::Home => b"\x1b[H".to_vec(),
        KeyCode::End => b"\x1b[F".to_vec(),
        KeyCode::Insert => b"\x1b[2~".to_vec(),
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        KeyCode::PageUp => b"\x1b[5~".to_vec(),
        KeyCode::PageDown => b"\x1b[6~".to_vec(),
        _ => return None,
    };

    if alt {
        bytes.insert(0, 0x1b);
    }
    Some(bytes)
}

fn control_byte(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(c as u8 - b'a' + 1),
        '@' | ' ' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        '?' | '8' => Some(0x7f),
        'A'..='Z' => Some(c as u8 - b'A' + 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_printable_characters() {
        assert_eq!(key_to_bytes(&key(KeyCode::Char('a'), KeyModifiers::NONE)), Some(vec![b'a']));
        assert_eq!(
            key_to_bytes(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(vec![b'A'])
        );
        assert_eq!(
            key_to_bytes(&key(KeyCode::Char('é'), KeyModifiers::NONE)),
            Some("é".as_bytes().to_vec())
        );
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(
            key_to_bytes(&key(KeyCode::Char('b'), KeyModifiers::CONTROL)),
            Some(vec![0x02])
        );
        assert_eq!(
            key_to_bytes(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(vec![0x03])
        );
        assert_eq!(
            key_to_bytes(&key(KeyCode::Char('['), KeyModifiers::CONTROL)),
            Some(vec![0x1b])
        );
        assert_eq!(key_to_bytes(&key(KeyCode::Char('%'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn test_enter_is_line_feed() {
        assert_eq!(key_to_bytes(&key(KeyCode::Enter, KeyModifiers::NONE)), Some(vec![b'\n']));
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(
            key_to_bytes(&key(KeyCode::Up, KeyModifiers::NONE)),
            Some(b"\x1b[A".to_vec())
        );
        assert_eq!(
            key_to_bytes(&key(KeyCode::Delete, KeyModifiers::NONE)),
            Some(b"\x1b[3~".to_vec())
        );
        assert_eq!(key_to_bytes(&key(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_alt_prefixes_escape() {
        assert_eq!(
            key_to_bytes(&key(KeyCode::Char('x'), KeyModifiers::ALT)),
            Some(vec![0x1b, b'x'])
        );
    }
}
