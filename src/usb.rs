//! USB Subsystem
//!
//! CDC ACM serial port carrying the link status log.

pub mod cdc;
