//! Hardware Abstraction Layer
//!
//! Board-level glue between embedded-hal traits and STM32G474 peripherals.

#[cfg(feature = "embedded")]
pub mod exti;
pub mod gpio;
pub mod spi;
