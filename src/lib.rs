//! FSK Link Firmware Library
//!
//! Core of an STM32G474-based half-duplex packet link built around a TI
//! CC1101 Sub-GHz transceiver. A push on the rotary encoder switch flips the
//! node between listening for packets and sending numbered
//! `"Hello World! #n"` packets once a second.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                        │
//! │        Link Controller  │  Status Events  │  Log Sinks      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      DRIVER LAYER                           │
//! │        CC1101 (PacketRadio)  │  Switch Monitor              │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / BOARD LAYER                         │
//! │  SPI + CS  │  GDO0 EXTI  │  Mode LED  │  USB CDC            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                         │
//! │           embassy-rs (async/await executor)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything above the board layer is generic over `embedded-hal` traits
//! and builds on the host with `--no-default-features --features std`.
//!
//! # Design Principles
//!
//! - **Interrupts only set flags**: all radio I/O happens in the polling loop
//! - **No unsafe in application code**
//! - **Explicit error handling**: all fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use embassy_usb;

/// Hardware Abstraction Layer
///
/// SPI device wrapper, mode LED and GDO0 interrupt routing.
pub mod hal;

/// Peripheral Drivers
///
/// CC1101 transceiver and encoder push switch.
pub mod drivers;

/// Radio Control Logic
///
/// Packet radio interface, event flags, status events and the link controller.
pub mod radio;

/// USB Subsystem
///
/// CDC ACM serial port for the status log.
#[cfg(feature = "embedded")]
pub mod usb;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::radio::driver::{PacketRadio, RadioError, RadioResult};
    pub use crate::radio::status::StatusSink;

    // Common traits
    pub use embedded_hal::digital::{InputPin, OutputPin};

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
