//! Shared types used across the link firmware

use core::fmt;

/// Active half of the half-duplex link
///
/// Exactly one mode is active at a time. The mode only changes on a switch
/// press edge, never on a timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// Listening for packets
    #[default]
    Receive,
    /// Sending numbered packets
    Transmit,
}

impl LinkMode {
    /// The other mode
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Receive => Self::Transmit,
            Self::Transmit => Self::Receive,
        }
    }

    /// Check if receiving
    #[must_use]
    pub const fn is_receive(self) -> bool {
        matches!(self, Self::Receive)
    }

    /// Check if transmitting
    #[must_use]
    pub const fn is_transmit(self) -> bool {
        matches!(self, Self::Transmit)
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Receive => f.write_str("RX"),
            Self::Transmit => f.write_str("TX"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LinkMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Receive => defmt::write!(f, "RX"),
            Self::Transmit => defmt::write!(f, "TX"),
        }
    }
}
