//! Peripheral Drivers
//!
//! Drivers for the CC1101 transceiver and the encoder push switch.

pub mod cc1101;
pub mod encoder;
