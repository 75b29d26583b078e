//! Link Status Reporting
//!
//! Everything the link controller reports is a [`LinkEvent`]. Sinks decide
//! where the line goes: defmt over RTT, the USB serial port, or a recorder
//! in tests.

use core::fmt::{self, Write as _};

use heapless::String;

use super::driver::RadioError;
use super::link::Fault;
use crate::config::LOG_LINE_CAPACITY;
use crate::types::LinkMode;

/// Importance of a status line
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operation
    Info,
    /// Recoverable failure
    Warn,
    /// Fatal failure
    Error,
}

/// Status reported by the link controller
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinkEvent<'a> {
    /// Startup sequence began
    Starting,
    /// Radio bring-up failed (fatal)
    RadioInitFailed(RadioError),
    /// Receiver armed
    Listening,
    /// Receiver could not be armed on startup or mode entry (fatal)
    ListenFailed(RadioError),
    /// Controller stopped after a fatal fault
    Halted(Fault),
    /// Switch press toggled the mode
    ModeSwitched(LinkMode),
    /// Packet read successfully
    PacketReceived {
        /// Packet payload
        data: &'a [u8],
        /// Signal strength in dBm
        rssi_dbm: f32,
        /// Link quality indicator
        lqi: u8,
    },
    /// Packet dropped because of a CRC mismatch
    CrcMismatch,
    /// Packet read failed for another reason
    ReceiveFailed(RadioError),
    /// Receiver could not be re-armed after a packet
    RearmFailed(RadioError),
    /// Transmission started
    Sending {
        /// Payload text
        payload: &'a str,
    },
    /// Previous transmission completed
    TransmitFinished,
    /// Previous transmission could not be started
    TransmitFailed(RadioError),
    /// Transmit state could not be released
    FinishFailed(RadioError),
    /// Switch input could not be read
    SwitchReadFailed,
}

impl LinkEvent<'_> {
    /// Severity of this event
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::RadioInitFailed(_) | Self::ListenFailed(_) | Self::Halted(_) => Severity::Error,
            Self::CrcMismatch
            | Self::ReceiveFailed(_)
            | Self::RearmFailed(_)
            | Self::TransmitFailed(_)
            | Self::FinishFailed(_)
            | Self::SwitchReadFailed => Severity::Warn,
            Self::Starting
            | Self::Listening
            | Self::ModeSwitched(_)
            | Self::PacketReceived { .. }
            | Self::Sending { .. }
            | Self::TransmitFinished => Severity::Info,
        }
    }
}

/// Payload bytes shown as escaped text when valid UTF-8, hex otherwise
struct Payload<'a>(&'a [u8]);

impl fmt::Display for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(self.0) {
            // Escaped so control bytes cannot break the line
            Ok(text) => write!(f, "{text:?}"),
            Err(_) => {
                for (i, byte) in self.0.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for LinkEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => f.write_str("[link] initializing radio"),
            Self::RadioInitFailed(err) => write!(f, "[link] radio init failed: {err}"),
            Self::Listening => f.write_str("[link] listening for packets"),
            Self::ListenFailed(err) => write!(f, "[link] start receive failed: {err}"),
            Self::Halted(fault) => write!(f, "[link] halted ({fault}), reset required"),
            Self::ModeSwitched(mode) => write!(f, "[link] switched to {mode} mode"),
            Self::PacketReceived { data, rssi_dbm, lqi } => write!(
                f,
                "[RX] packet {} RSSI {rssi_dbm:.1} dBm LQI {lqi}",
                Payload(data)
            ),
            Self::CrcMismatch => f.write_str("[RX] CRC error!"),
            Self::ReceiveFailed(err) => write!(f, "[RX] read failed: {err}"),
            Self::RearmFailed(err) => write!(f, "[RX] re-arm failed: {err}"),
            Self::Sending { payload } => write!(f, "[TX] sending \"{payload}\""),
            Self::TransmitFinished => f.write_str("[TX] transmission finished"),
            Self::TransmitFailed(err) => write!(f, "[TX] transmission failed: {err}"),
            Self::FinishFailed(err) => write!(f, "[TX] finish failed: {err}"),
            Self::SwitchReadFailed => f.write_str("[link] switch read failed"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LinkEvent<'_> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Starting => defmt::write!(f, "[link] initializing radio"),
            Self::RadioInitFailed(err) => defmt::write!(f, "[link] radio init failed: {}", err),
            Self::Listening => defmt::write!(f, "[link] listening for packets"),
            Self::ListenFailed(err) => defmt::write!(f, "[link] start receive failed: {}", err),
            Self::Halted(fault) => defmt::write!(f, "[link] halted ({}), reset required", fault),
            Self::ModeSwitched(mode) => defmt::write!(f, "[link] switched to {} mode", mode),
            Self::PacketReceived { data, rssi_dbm, lqi } => defmt::write!(
                f,
                "[RX] packet {=[u8]:a} RSSI {} dBm LQI {}",
                *data,
                rssi_dbm,
                lqi
            ),
            Self::CrcMismatch => defmt::write!(f, "[RX] CRC error!"),
            Self::ReceiveFailed(err) => defmt::write!(f, "[RX] read failed: {}", err),
            Self::RearmFailed(err) => defmt::write!(f, "[RX] re-arm failed: {}", err),
            Self::Sending { payload } => defmt::write!(f, "[TX] sending \"{=str}\"", *payload),
            Self::TransmitFinished => defmt::write!(f, "[TX] transmission finished"),
            Self::TransmitFailed(err) => defmt::write!(f, "[TX] transmission failed: {}", err),
            Self::FinishFailed(err) => defmt::write!(f, "[TX] finish failed: {}", err),
            Self::SwitchReadFailed => defmt::write!(f, "[link] switch read failed"),
        }
    }
}

/// Destination for status lines
pub trait StatusSink {
    /// Report one event
    fn emit(&mut self, event: &LinkEvent<'_>);
}

impl<A: StatusSink, B: StatusSink> StatusSink for (A, B) {
    fn emit(&mut self, event: &LinkEvent<'_>) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

/// Render an event as one CRLF-terminated line
///
/// Lines longer than [`LOG_LINE_CAPACITY`] are truncated; the CRLF is kept.
#[must_use]
pub fn render_line(event: &LinkEvent<'_>) -> String<LOG_LINE_CAPACITY> {
    let mut line = String::new();
    // Overflow leaves the prefix that fit
    let _ = write!(line, "{event}");
    while line.len() > LOG_LINE_CAPACITY - 2 {
        line.pop();
    }
    let _ = line.push_str("\r\n");
    line
}

/// Bounded byte queue behind a [`QueueSink`]
pub trait LineQueue {
    /// Bytes that can be written right now
    fn free_capacity(&self) -> usize;

    /// Write a prefix of `bytes` without blocking, returning its length
    fn try_write(&mut self, bytes: &[u8]) -> usize;
}

/// Sink that queues whole rendered lines
///
/// Never blocks. A line that does not fit is dropped entirely and counted.
pub struct QueueSink<Q> {
    queue: Q,
    dropped: u32,
}

impl<Q: LineQueue> QueueSink<Q> {
    /// Create a sink feeding `queue`
    #[must_use]
    pub const fn new(queue: Q) -> Self {
        Self { queue, dropped: 0 }
    }

    /// Lines dropped because the queue was full
    #[must_use]
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Borrow the queue
    #[must_use]
    pub const fn queue(&self) -> &Q {
        &self.queue
    }
}

impl<Q: LineQueue> StatusSink for QueueSink<Q> {
    fn emit(&mut self, event: &LinkEvent<'_>) {
        let line = render_line(event);
        if self.queue.free_capacity() < line.len() {
            self.dropped = self.dropped.wrapping_add(1);
            return;
        }
        let mut pending = line.as_bytes();
        while !pending.is_empty() {
            match self.queue.try_write(pending) {
                0 => break,
                written => pending = &pending[written..],
            }
        }
    }
}

/// Sink that logs through defmt at the event's severity
#[cfg(feature = "embedded")]
#[derive(Clone, Copy, Debug, Default)]
pub struct DefmtSink;

#[cfg(feature = "embedded")]
impl StatusSink for DefmtSink {
    fn emit(&mut self, event: &LinkEvent<'_>) {
        match event.severity() {
            Severity::Info => defmt::info!("{}", event),
            Severity::Warn => defmt::warn!("{}", event),
            Severity::Error => defmt::error!("{}", event),
        }
    }
}
