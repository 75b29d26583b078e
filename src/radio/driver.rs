//! Packet Radio Interface
//!
//! The capability set the link controller needs from a transceiver driver.
//! Drivers do the register work; the controller only sequences calls and
//! interprets results.

use core::fmt;

/// Result of a radio operation
pub type RadioResult<T> = Result<T, RadioError>;

/// Radio operation failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioError {
    /// Chip did not report a known version
    ChipNotFound {
        /// Version register value that was read
        version: u8,
    },
    /// Packet arrived with a bad CRC
    CrcMismatch,
    /// Packet longer than the FIFO or caller buffer
    PacketTooLong {
        /// Offending length in bytes
        len: usize,
    },
    /// Receive FIFO overflowed before it was drained
    RxOverflow,
    /// Receive event without any data in the FIFO
    EmptyFifo,
    /// Chip did not reach the expected state in time
    Timeout,
    /// SPI or chip-select failure
    Bus,
    /// Driver-specific failure code
    Other(i16),
}

impl RadioError {
    /// Stable numeric code for log output
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::ChipNotFound { .. } => -2,
            Self::PacketTooLong { .. } => -4,
            Self::Timeout => -5,
            Self::CrcMismatch => -7,
            Self::RxOverflow => -8,
            Self::EmptyFifo => -9,
            Self::Bus => -16,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChipNotFound { version } => write!(f, "chip not found (version 0x{version:02X})"),
            Self::CrcMismatch => f.write_str("CRC mismatch"),
            Self::PacketTooLong { len } => write!(f, "packet too long ({len} bytes)"),
            Self::RxOverflow => f.write_str("RX FIFO overflow"),
            Self::EmptyFifo => f.write_str("RX FIFO empty"),
            Self::Timeout => f.write_str("timeout"),
            Self::Bus => f.write_str("bus error"),
            Self::Other(_) => f.write_str("driver error"),
        }?;
        write!(f, ", code {}", self.code())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RadioError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::ChipNotFound { version } => defmt::write!(f, "ChipNotFound(0x{:02X})", version),
            Self::CrcMismatch => defmt::write!(f, "CrcMismatch"),
            Self::PacketTooLong { len } => defmt::write!(f, "PacketTooLong({})", len),
            Self::RxOverflow => defmt::write!(f, "RxOverflow"),
            Self::EmptyFifo => defmt::write!(f, "EmptyFifo"),
            Self::Timeout => defmt::write!(f, "Timeout"),
            Self::Bus => defmt::write!(f, "Bus"),
            Self::Other(code) => defmt::write!(f, "Other({})", code),
        }
    }
}

/// Half-duplex packet transceiver
///
/// `set_packet_received_action` and `set_packet_sent_action` attach a
/// handler to the packet boundary interrupt. Handlers run in interrupt
/// context and must do nothing but set a flag. Drivers with a single
/// interrupt line keep only the most recent registration.
pub trait PacketRadio {
    /// One-time bring-up
    ///
    /// # Errors
    ///
    /// Any error means the radio is unusable.
    fn init(&mut self) -> RadioResult<()>;

    /// Start listening for a packet
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver could not be armed.
    fn start_receive(&mut self) -> RadioResult<()>;

    /// Read the pending packet into `buf`, returning its length
    ///
    /// # Errors
    ///
    /// `CrcMismatch` for a corrupt packet, other variants for FIFO or bus
    /// failures.
    fn read_data(&mut self, buf: &mut [u8]) -> RadioResult<usize>;

    /// Signal strength of the last packet in dBm
    fn rssi(&mut self) -> f32;

    /// Link quality indicator of the last packet
    fn lqi(&mut self) -> u8;

    /// Start sending `payload`
    ///
    /// # Errors
    ///
    /// Returns an error if the packet could not be queued.
    fn start_transmit(&mut self, payload: &[u8]) -> RadioResult<()>;

    /// Release transmit state after a packet went out
    ///
    /// # Errors
    ///
    /// Returns an error if the chip could not be returned to idle.
    fn finish_transmit(&mut self) -> RadioResult<()>;

    /// Attach the handler run when a packet has been received
    fn set_packet_received_action(&mut self, action: fn());

    /// Attach the handler run when a packet has been sent
    fn set_packet_sent_action(&mut self, action: fn());
}
