use std::fmt;

/// Owner of one status slot. Each source writes only its own slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusSource {
    /// The session as a whole (device path)
    Session,
    /// Keyboard to serial worker
    Ingest,
    /// Serial to screen worker
    Cheerios,
    /// Escape-command mode indicator
    CommandPage,
}

impl StatusSource {
    pub const ALL: [StatusSource; 4] = [
        StatusSource::Session,
        StatusSource::Ingest,
        StatusSource::Cheerios,
        StatusSource::CommandPage,
    ];

    fn index(self) -> usize {
        match self {
            StatusSource::Session => 0,
            StatusSource::Ingest => 1,
            StatusSource::Cheerios => 2,
            StatusSource::CommandPage => 3,
        }
    }
}

impl fmt::Display for StatusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusSource::Session => write!(f, "session"),
            StatusSource::Ingest => write!(f, "ingest"),
            StatusSource::Cheerios => write!(f, "cheerios"),
            StatusSource::CommandPage => write!(f, "command"),
        }
    }
}

/// The four status texts, all empty at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSlots {
    slots: [String; 4],
}

impl StatusSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, source: StatusSource, text: String) {
        self.slots[source.index()] = text;
    }

    pub fn get(&self, source: StatusSource) -> &str {
        &self.slots[source.index()]
    }

    /// `|--A--|--B--|--C--|--D--|` over a `-` rule closed by `|`, cut to
    /// `width` columns
    pub fn compose(&self, width: usize) -> String {
        if width == 0 {
            return String::new();
        }

        let head = format!(
            "|--{}--|--{}--|--{}--|--{}--|",
            self.slots[0], self.slots[1], self.slots[2], self.slots[3]
        );

        let mut line: Vec<char> = std::iter::repeat('-')
            .take(width - 1)
            .chain(std::iter::once('|'))
            .collect();
        for (cell, ch) in line.iter_mut().zip(head.chars()) {
            *cell = ch;
        }
        line.into_iter().collect()
    }
}
