//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the FSK link hardware.
//! Timing windows, payloads and radio parameters are centralized here.
//! Board pins are bound by name in the firmware entry.

/// Encoder switch debounce window in milliseconds
pub const SWITCH_DEBOUNCE_MS: u32 = 50;

/// Time the encoder switch must stay pressed before it counts as held
pub const SWITCH_HOLD_MS: u32 = 1_000;

/// Pacing delay between a finished transmission and the next one
pub const TX_INTERVAL_MS: u32 = 1_000;

/// Main loop yield between polling iterations
pub const POLL_INTERVAL_MS: u64 = 1;

/// Idle period of the halt loop after a fatal radio fault
pub const HALT_IDLE_MS: u64 = 100;

/// Payload sent on entry to transmit mode, and prefix of every numbered packet
pub const GREETING: &str = "Hello World!";

/// Capacity of the numbered payload buffer (`"Hello World! #4294967295"` fits)
pub const PAYLOAD_CAPACITY: usize = 32;

/// Largest packet payload the CC1101 FIFO can carry with appended status bytes
pub const MAX_PACKET_LEN: usize = 61;

/// CC1101 FIFO depth in bytes
pub const CC1101_FIFO_SIZE: usize = 64;

/// CC1101 crystal frequency (26 MHz reference)
pub const CC1101_XTAL_HZ: u32 = 26_000_000;

/// Default carrier frequency (434 MHz ISM)
pub const CARRIER_FREQUENCY_HZ: u32 = 434_000_000;

/// Default 16-bit sync word
pub const SYNC_WORD: u16 = 0xD391;

/// PATABLE entry for roughly +10 dBm at 433 MHz
pub const PA_TABLE_POWER: u8 = 0xC0;

/// Register reads allowed while waiting for the chip to come out of reset
pub const RESET_POLL_ATTEMPTS: u32 = 100;

/// SPI clock for the CC1101 (datasheet limit is 6.5 MHz for burst access)
pub const SPI_FREQUENCY_HZ: u32 = 4_000_000;

/// Maximum length of a rendered status line, including CRLF
pub const LOG_LINE_CAPACITY: usize = 128;

/// Buffered bytes between the status sink and the USB log port
pub const LOG_PIPE_SIZE: usize = 512;

/// USB VID (use test VID for development)
pub const USB_VID: u16 = 0x1209;

/// USB PID (get from pid.codes for production)
pub const USB_PID: u16 = 0x0001;

/// USB CDC ACM packet size
pub const USB_CDC_PACKET_SIZE: u16 = 64;
