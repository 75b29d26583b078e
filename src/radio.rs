//! Radio Control Logic
//!
//! The packet radio interface, interrupt flags, status reporting and the
//! button-toggled link controller that ties them together.

pub mod driver;
pub mod events;
pub mod link;
pub mod status;
