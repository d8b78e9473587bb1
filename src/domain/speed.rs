use std::fmt;

/// Serial line speed.
///
/// `Unset` is the "no speed configured" sentinel: every string outside the
/// table maps to it, and it renders as an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineSpeed {
    Unset,
    B50,
    B75,
    B110,
    B134,
    B150,
    B200,
    B300,
    B600,
    B1200,
    B1800,
    B2400,
    B4800,
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
    B230400,
    B460800,
    B500000,
    B576000,
    B921600,
    B1000000,
    B1152000,
    B1500000,
    B2000000,
    B2500000,
    B3000000,
    B3500000,
    B4000000,
}

/// (speed, canonical decimal string, display label, baud)
///
/// 115200 is deliberately labelled "B115200" rather than sharing the
/// "B1152000" label found in older copies of this table, so every entry
/// round-trips.
const SPEED_TABLE: [(LineSpeed, &str, &str, u32); 30] = [
    (LineSpeed::B50, "50", "B50", 50),
    (LineSpeed::B75, "75", "B75", 75),
    (LineSpeed::B110, "110", "B110", 110),
    (LineSpeed::B134, "134", "B134", 134),
    (LineSpeed::B150, "150", "B150", 150),
    (LineSpeed::B200, "200", "B200", 200),
    (LineSpeed::B300, "300", "B300", 300),
    (LineSpeed::B600, "600", "B600", 600),
    (LineSpeed::B1200, "1200", "B1200", 1200),
    (LineSpeed::B1800, "1800", "B1800", 1800),
    (LineSpeed::B2400, "2400", "B2400", 2400),
    (LineSpeed::B4800, "4800", "B4800", 4800),
    (LineSpeed::B9600, "9600", "B9600", 9600),
    (LineSpeed::B19200, "19200", "B19200", 19200),
    (LineSpeed::B38400, "38400", "B38400", 38400),
    (LineSpeed::B57600, "57600", "B57600", 57600),
    (LineSpeed::B115200, "115200", "B115200", 115200),
    (LineSpeed::B230400, "230400", "B230400", 230400),
    (LineSpeed::B460800, "460800", "B460800", 460800),
    (LineSpeed::B500000, "500000", "B500000", 500000),
    (LineSpeed::B576000, "576000", "B576000", 576000),
    (LineSpeed::B921600, "921600", "B921600", 921600),
    (LineSpeed::B1000000, "1000000", "B1000000", 1000000),
    (LineSpeed::B1152000, "1152000", "B1152000", 1152000),
    (LineSpeed::B1500000, "1500000", "B1500000", 1500000),
    (LineSpeed::B2000000, "2000000", "B2000000", 2000000),
    (LineSpeed::B2500000, "2500000", "B2500000", 2500000),
    (LineSpeed::B3000000, "3000000", "B3000000", 3000000),
    (LineSpeed::B3500000, "3500000", "B3500000", 3500000),
    (LineSpeed::B4000000, "4000000", "B4000000", 4000000),
];

impl LineSpeed {
    /// Look up a speed by its decimal string (`"9600"`) or its label
    /// (`"B9600"`). Anything else yields [`LineSpeed::Unset`].
    pub fn parse(speed: &str) -> Self {
        SPEED_TABLE
            .iter()
            .find(|(_, decimal, label, _)| *decimal == speed || *label == speed)
            .map(|(speed, ..)| *speed)
            .unwrap_or(LineSpeed::Unset)
    }

    /// Canonical decimal string; empty for `Unset`.
    pub fn as_str(self) -> &'static str {
        self.entry().map(|(_, decimal, ..)| *decimal).unwrap_or("")
    }

    /// Display label in the `B<rate>` form; empty for `Unset`.
    pub fn label(self) -> &'static str {
        self.entry().map(|(_, _, label, _)| *label).unwrap_or("")
    }

    pub fn baud(self) -> Option<u32> {
        self.entry().map(|(.., baud)| *baud)
    }

    /// Every configured speed, slowest first.
    pub fn all() -> impl Iterator<Item = LineSpeed> {
        SPEED_TABLE.iter().map(|(speed, ..)| *speed)
    }

    fn entry(self) -> Option<&'static (LineSpeed, &'static str, &'static str, u32)> {
        SPEED_TABLE.iter().find(|(speed, ..)| *speed == self)
    }
}

impl Default for LineSpeed {
    fn default() -> Self {
        LineSpeed::B115200
    }
}

impl fmt::Display for LineSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
