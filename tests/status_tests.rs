//! Status Event Tests
//!
//! Rendering, severity and sink fan-out of link status events.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test status_tests

mod common;

use common::RecordingSink;
use fsk_link::config::LOG_LINE_CAPACITY;
use fsk_link::radio::driver::RadioError;
use fsk_link::radio::link::Fault;
use fsk_link::radio::status::{render_line, LineQueue, LinkEvent, QueueSink, Severity, StatusSink};
use fsk_link::types::LinkMode;

// =============================================================================
// Display
// =============================================================================

#[test]
fn test_crc_line() {
    assert_eq!(LinkEvent::CrcMismatch.to_string(), "[RX] CRC error!");
}

#[test]
fn test_mode_switch_lines() {
    assert_eq!(
        LinkEvent::ModeSwitched(LinkMode::Transmit).to_string(),
        "[link] switched to TX mode"
    );
    assert_eq!(
        LinkEvent::ModeSwitched(LinkMode::Receive).to_string(),
        "[link] switched to RX mode"
    );
}

#[test]
fn test_packet_line_text_payload() {
    let event = LinkEvent::PacketReceived {
        data: b"Hello World! #7",
        rssi_dbm: -71.5,
        lqi: 3,
    };
    assert_eq!(
        event.to_string(),
        "[RX] packet \"Hello World! #7\" RSSI -71.5 dBm LQI 3"
    );
}

#[test]
fn test_packet_line_binary_payload_as_hex() {
    let event = LinkEvent::PacketReceived {
        data: &[0xDE, 0xAD, 0xBE, 0xEF],
        rssi_dbm: -90.0,
        lqi: 40,
    };
    assert_eq!(
        event.to_string(),
        "[RX] packet DE AD BE EF RSSI -90.0 dBm LQI 40"
    );
}

#[test]
fn test_packet_line_escapes_control_bytes() {
    let event = LinkEvent::PacketReceived {
        data: b"one\r\ntwo\t\"q\"",
        rssi_dbm: -60.0,
        lqi: 5,
    };
    let text = event.to_string();

    assert_eq!(
        text,
        "[RX] packet \"one\\r\\ntwo\\t\\\"q\\\"\" RSSI -60.0 dBm LQI 5"
    );
    assert!(!text.contains('\r') && !text.contains('\n'));
    assert_eq!(render_line(&event).matches("\r\n").count(), 1);
}

#[test]
fn test_error_lines_carry_code() {
    assert_eq!(
        LinkEvent::RadioInitFailed(RadioError::ChipNotFound { version: 0x00 }).to_string(),
        "[link] radio init failed: chip not found (version 0x00), code -2"
    );
    assert_eq!(
        LinkEvent::Halted(Fault::Listen(RadioError::Timeout)).to_string(),
        "[link] halted (listen: timeout, code -5), reset required"
    );
    assert_eq!(
        LinkEvent::TransmitFailed(RadioError::Other(-20)).to_string(),
        "[TX] transmission failed: driver error, code -20"
    );
}

#[test]
fn test_sending_line() {
    assert_eq!(
        LinkEvent::Sending { payload: "Hello World!" }.to_string(),
        "[TX] sending \"Hello World!\""
    );
}

// =============================================================================
// Severity
// =============================================================================

#[test]
fn test_severity_levels() {
    assert_eq!(LinkEvent::Listening.severity(), Severity::Info);
    assert_eq!(LinkEvent::TransmitFinished.severity(), Severity::Info);
    assert_eq!(LinkEvent::CrcMismatch.severity(), Severity::Warn);
    assert_eq!(LinkEvent::RearmFailed(RadioError::Bus).severity(), Severity::Warn);
    assert_eq!(LinkEvent::ListenFailed(RadioError::Bus).severity(), Severity::Error);
    assert_eq!(
        LinkEvent::Halted(Fault::RadioInit(RadioError::Bus)).severity(),
        Severity::Error
    );
    assert!(Severity::Info < Severity::Warn && Severity::Warn < Severity::Error);
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_render_line_appends_crlf() {
    let line = render_line(&LinkEvent::CrcMismatch);
    assert_eq!(line.as_str(), "[RX] CRC error!\r\n");
}

#[test]
fn test_render_line_truncates_but_keeps_crlf() {
    let data = [0xFFu8; 61];
    let line = render_line(&LinkEvent::PacketReceived {
        data: &data,
        rssi_dbm: -100.0,
        lqi: 0,
    });

    assert_eq!(line.len(), LOG_LINE_CAPACITY);
    assert!(line.starts_with("[RX] packet FF FF"));
    assert!(line.ends_with("\r\n"));
}

#[test]
fn test_error_codes_stable() {
    assert_eq!(RadioError::ChipNotFound { version: 1 }.code(), -2);
    assert_eq!(RadioError::PacketTooLong { len: 70 }.code(), -4);
    assert_eq!(RadioError::Timeout.code(), -5);
    assert_eq!(RadioError::CrcMismatch.code(), -7);
    assert_eq!(RadioError::RxOverflow.code(), -8);
    assert_eq!(RadioError::EmptyFifo.code(), -9);
    assert_eq!(RadioError::Bus.code(), -16);
    assert_eq!(RadioError::Other(-31).code(), -31);
}

// =============================================================================
// Sinks
// =============================================================================

#[test]
fn test_sink_pair_fans_out_in_order() {
    let mut pair = (RecordingSink::default(), RecordingSink::default());

    pair.emit(&LinkEvent::Starting);
    pair.emit(&LinkEvent::Listening);

    assert_eq!(pair.0.lines, pair.1.lines);
    assert_eq!(
        pair.0.lines,
        vec!["[link] initializing radio", "[link] listening for packets"]
    );
}

/// Fixed-size byte queue that accepts at most `chunk` bytes per write
struct BoundedQueue {
    bytes: Vec<u8>,
    capacity: usize,
    chunk: usize,
}

impl BoundedQueue {
    fn new(capacity: usize, chunk: usize) -> Self {
        Self {
            bytes: Vec::new(),
            capacity,
            chunk,
        }
    }

    fn text(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap()
    }
}

impl LineQueue for BoundedQueue {
    fn free_capacity(&self) -> usize {
        self.capacity - self.bytes.len()
    }

    fn try_write(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.chunk).min(self.free_capacity());
        self.bytes.extend_from_slice(&bytes[..n]);
        n
    }
}

#[test]
fn test_queue_sink_writes_whole_lines() {
    // Small chunks stand in for a ring buffer wrapping mid-line
    let mut sink = QueueSink::new(BoundedQueue::new(128, 5));

    sink.emit(&LinkEvent::Starting);
    sink.emit(&LinkEvent::Listening);

    assert_eq!(
        sink.queue().text(),
        "[link] initializing radio\r\n[link] listening for packets\r\n"
    );
    assert_eq!(sink.dropped(), 0);
}

#[test]
fn test_queue_sink_drops_line_that_does_not_fit() {
    let first = render_line(&LinkEvent::CrcMismatch);
    let room = first.len() + 10;
    let mut sink = QueueSink::new(BoundedQueue::new(room, 64));

    sink.emit(&LinkEvent::CrcMismatch);
    sink.emit(&LinkEvent::Listening);

    assert_eq!(sink.queue().text(), first.as_str());
    assert!(sink.queue().text().ends_with("\r\n"));
    assert_eq!(sink.dropped(), 1);

    sink.emit(&LinkEvent::TransmitFinished);
    assert_eq!(sink.dropped(), 2);
    assert_eq!(sink.queue().bytes.len(), first.len());
}

#[test]
fn test_queue_sink_accepts_exact_fit() {
    let line = render_line(&LinkEvent::TransmitFinished);
    let mut sink = QueueSink::new(BoundedQueue::new(line.len(), 64));

    sink.emit(&LinkEvent::TransmitFinished);

    assert_eq!(sink.queue().text(), line.as_str());
    assert_eq!(sink.queue().free_capacity(), 0);
    assert_eq!(sink.dropped(), 0);
}
