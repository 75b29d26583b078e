//! GDO0 Interrupt Routing
//!
//! The radio driver attaches plain `fn()` handlers; an EXTI task calls
//! [`PacketIrq::fire`] on every falling edge of GDO0.

use core::cell::Cell;

use critical_section::Mutex;

use crate::drivers::cc1101::IrqLine;

/// Handler slot for the radio's packet boundary pin
pub struct PacketIrq {
    action: Mutex<Cell<Option<fn()>>>,
}

impl PacketIrq {
    /// Create an empty slot (usable in a `static`)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            action: Mutex::new(Cell::new(None)),
        }
    }

    /// Replace the handler
    pub fn set(&self, action: fn()) {
        critical_section::with(|cs| self.action.borrow(cs).set(Some(action)));
    }

    /// Run the current handler, if any
    pub fn fire(&self) {
        let action = critical_section::with(|cs| self.action.borrow(cs).get());
        if let Some(action) = action {
            action();
        }
    }
}

impl Default for PacketIrq {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqLine for &'static PacketIrq {
    fn attach(&mut self, action: fn()) {
        self.set(action);
    }
}
