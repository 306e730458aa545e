//! Where a frame sits within its transfer.

use std::fmt;

/// Flag bit of the opening frame of a multi-frame transfer.
pub const FLAG_FIRST: u8 = 0b1000_0000;

/// Flag bit of every frame strictly between the first and the last.
pub const FLAG_MIDDLE: u8 = 0b0100_0000;

/// Flag bit of the closing frame (and of a single-frame transfer).
pub const FLAG_LAST: u8 = 0b0010_0000;

/// Position of a frame within its transfer. Exactly one flag bit on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    First,
    Middle,
    Last,
}

impl Position {
    /// Position of frame `index` in a transfer of `count` frames.
    ///
    /// `Last` takes priority over `First`, so a single-frame transfer is
    /// tagged `Last`.
    pub fn for_index(index: usize, count: usize) -> Self {
        if index + 1 >= count {
            Self::Last
        } else if index == 0 {
            Self::First
        } else {
            Self::Middle
        }
    }

    /// Position a frame must carry given whether it opens a transfer and how
    /// many frames follow it.
    pub fn expected(opening: bool, remaining: u16) -> Self {
        if remaining == 0 {
            Self::Last
        } else if opening {
            Self::First
        } else {
            Self::Middle
        }
    }

    pub const fn flag(self) -> u8 {
        match self {
            Self::First => FLAG_FIRST,
            Self::Middle => FLAG_MIDDLE,
            Self::Last => FLAG_LAST,
        }
    }

    /// Parse a flags byte. Anything other than exactly one known bit is
    /// rejected.
    pub const fn from_flag(flags: u8) -> Option<Self> {
        match flags {
            FLAG_FIRST => Some(Self::First),
            FLAG_MIDDLE => Some(Self::Middle),
            FLAG_LAST => Some(Self::Last),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::First => "FIRST",
            Self::Middle => "MIDDLE",
            Self::Last => "LAST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
