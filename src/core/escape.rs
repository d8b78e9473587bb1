use std::fmt;

use crate::domain::config::EscapeKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeState {
    Normal,
    AwaitingCommand,
}

/// Commands reachable through the escape trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ShowStats,
    ClearOutput,
    Help,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Quit,
        Command::ShowStats,
        Command::ClearOutput,
        Command::Help,
    ];

    pub fn from_selector(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.selector() == byte)
    }

    pub fn selector(self) -> u8 {
        match self {
            Command::Quit => b'q',
            Command::ShowStats => b's',
            Command::ClearOutput => b'c',
            Command::Help => b'h',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Quit => "quit",
            Command::ShowStats => "show session statistics",
            Command::ClearOutput => "clear the output region",
            Command::Help => "list commands",
        }
    }

    /// One line per command, for the help command
    pub fn help_text(escape: EscapeKey) -> String {
        Self::ALL
            .iter()
            .map(|command| {
                format!(
                    "{} {}: {}\r\n",
                    escape,
                    command.selector() as char,
                    command.description()
                )
            })
            .collect()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Outcome of feeding one keyboard byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// The escape trigger was consumed; the next byte selects a command
    EnterCommand,
    Command(Command),
    /// Unknown selector; back to normal with no effect
    Ignored,
    /// Bytes for the serial channel
    Send(Vec<u8>),
}

/// Keyboard byte interpreter with the escape-command mode.
///
/// The escape trigger byte is never part of a `Send` action.
#[derive(Debug, Clone)]
pub struct EscapeMachine {
    state: EscapeState,
    trigger: u8,
    no_crlf: bool,
}

impl EscapeMachine {
    pub fn new(trigger: EscapeKey, no_crlf: bool) -> Self {
        Self {
            state: EscapeState::Normal,
            trigger: trigger.byte(),
            no_crlf,
        }
    }

    pub fn state(&self) -> EscapeState {
        self.state
    }

    pub fn feed(&mut self, byte: u8) -> KeyAction {
        match self.state {
            EscapeState::Normal if byte == self.trigger => {
                self.state = EscapeState::AwaitingCommand;
                KeyAction::EnterCommand
            }
            EscapeState::Normal => KeyAction::Send(self.line_ending(byte)),
            EscapeState::AwaitingCommand => {
                self.state = EscapeState::Normal;
                Command::from_selector(byte)
                    .map(KeyAction::Command)
                    .unwrap_or(KeyAction::Ignored)
            }
        }
    }

    /// Feed every byte of one key press in order
    pub fn feed_all(&mut self, key: &[u8]) -> Vec<KeyAction> {
        key.iter().map(|byte| self.feed(*byte)).collect()
    }

    fn line_ending(&self, byte: u8) -> Vec<u8> {
        // A CR trigger must not leak through the CRLF expansion
        if byte == b'\n' && !self.no_crlf && self.trigger != b'\r' {
            vec![b'\r', b'\n']
        } else {
            vec![byte]
        }
    }
}
