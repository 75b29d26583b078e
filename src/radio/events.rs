//! Radio Event Flags
//!
//! The only state shared between interrupt context and the polling loop.
//! Interrupt handlers only ever set a flag; the loop only ever clears one.
//! A flag means "at least one event happened": a second event of the same
//! kind before the loop drains the first is coalesced.

use core::sync::atomic::{AtomicBool, Ordering};

/// Packet received / packet sent flags
#[derive(Debug, Default)]
pub struct RadioFlags {
    received: AtomicBool,
    transmitted: AtomicBool,
}

impl RadioFlags {
    /// Create cleared flags (usable in a `static`)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            received: AtomicBool::new(false),
            transmitted: AtomicBool::new(false),
        }
    }

    /// Mark a received packet (interrupt side)
    pub fn set_received(&self) {
        self.received.store(true, Ordering::Release);
    }

    /// Mark a sent packet (interrupt side)
    pub fn set_transmitted(&self) {
        self.transmitted.store(true, Ordering::Release);
    }

    /// Observe and clear the received flag in one step (loop side)
    pub fn take_received(&self) -> bool {
        self.received.swap(false, Ordering::AcqRel)
    }

    /// Observe and clear the sent flag in one step (loop side)
    pub fn take_transmitted(&self) -> bool {
        self.transmitted.swap(false, Ordering::AcqRel)
    }

    /// Check the received flag without clearing it
    #[must_use]
    pub fn received_pending(&self) -> bool {
        self.received.load(Ordering::Acquire)
    }

    /// Check the sent flag without clearing it
    #[must_use]
    pub fn transmitted_pending(&self) -> bool {
        self.transmitted.load(Ordering::Acquire)
    }

    /// Drop both flags (loop side)
    pub fn clear(&self) {
        self.received.store(false, Ordering::Release);
        self.transmitted.store(false, Ordering::Release);
    }
}
