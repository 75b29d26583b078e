//! GPIO Abstractions
//!
//! Pin wrappers that give board signals a meaning.

use embedded_hal::digital::OutputPin;

use crate::types::LinkMode;

/// LED state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LedState {
    /// LED is off
    #[default]
    Off,
    /// LED is on
    On,
}

impl LedState {
    /// LED state that shows `mode`: lit while transmitting
    #[must_use]
    pub const fn for_mode(mode: LinkMode) -> Self {
        match mode {
            LinkMode::Receive => Self::Off,
            LinkMode::Transmit => Self::On,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LedState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::On => defmt::write!(f, "ON"),
        }
    }
}

/// Mode indicator LED
///
/// Only touches the pin when the shown state changes.
pub struct ModeIndicator<P> {
    pin: P,
    state: LedState,
}

impl<P: OutputPin> ModeIndicator<P> {
    /// Create an indicator and drive it to the receive (off) state
    ///
    /// # Errors
    ///
    /// Returns the pin error if the LED could not be switched off.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self {
            pin,
            state: LedState::Off,
        })
    }

    /// Show `mode` on the LED
    ///
    /// # Errors
    ///
    /// Returns the pin error; the recorded state is left unchanged.
    pub fn show(&mut self, mode: LinkMode) -> Result<(), P::Error> {
        let next = LedState::for_mode(mode);
        if next == self.state {
            return Ok(());
        }
        match next {
            LedState::On => self.pin.set_high()?,
            LedState::Off => self.pin.set_low()?,
        }
        self.state = next;
        Ok(())
    }

    /// Currently shown state
    #[must_use]
    pub const fn state(&self) -> LedState {
        self.state
    }

    /// Consume the indicator and return the pin
    pub fn release(self) -> P {
        self.pin
    }
}
