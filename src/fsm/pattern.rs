//! Lamp output patterns.
//!
//! An [`OutputPattern`] is the complete set of channel levels asserted while
//! a state is current.  State handlers never toggle individual lamps; the
//! controller writes the whole pattern to the
//! [`OutputPort`](crate::app::ports::OutputPort) in one call on entry.

use core::fmt;

/// One signal lamp channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    Red = 0,
    Yellow = 1,
    Green = 2,
}

impl Channel {
    /// Number of lamp channels.
    pub const COUNT: usize = 3;

    /// All channels in wiring order.
    pub const ALL: [Channel; Channel::COUNT] = [Channel::Red, Channel::Yellow, Channel::Green];
}

/// Channel levels for one state (true = lamp on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutputPattern {
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
}

impl OutputPattern {
    pub const fn new(red: bool, yellow: bool, green: bool) -> Self {
        Self { red, yellow, green }
    }

    /// All lamps off; what `OutputPort::release` writes by default.
    pub const OFF: Self = Self::new(false, false, false);
    /// All lamps on (the button variant's standby indication).
    pub const ALL_ON: Self = Self::new(true, true, true);
    pub const RED: Self = Self::new(true, false, false);
    pub const RED_YELLOW: Self = Self::new(true, true, false);
    pub const GREEN: Self = Self::new(false, false, true);
    pub const YELLOW: Self = Self::new(false, true, false);

    /// Level of a single channel.
    pub const fn level(&self, channel: Channel) -> bool {
        match channel {
            Channel::Red => self.red,
            Channel::Yellow => self.yellow,
            Channel::Green => self.green,
        }
    }

    /// Channel levels in [`Channel::ALL`] order.
    pub const fn levels(&self) -> [bool; Channel::COUNT] {
        [self.red, self.yellow, self.green]
    }
}

impl fmt::Display for OutputPattern {
    /// Compact lamp view, e.g. `[R . G]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lamp = |on: bool, c: char| if on { c } else { '.' };
        write!(
            f,
            "[{} {} {}]",
            lamp(self.red, 'R'),
            lamp(self.yellow, 'Y'),
            lamp(self.green, 'G')
        )
    }
}
