//! Rotary Encoder Push Switch
//!
//! Debounces the encoder's push switch and reports the filtered state
//! together with one-shot press and release edges. The switch is active
//! low: a LOW reading means the knob is pushed.
//!
//! `update` never blocks. It is fed the current time by the caller and only
//! trusts a reading once it has been stable for longer than the debounce
//! window.
//!
//! # Edge queries
//!
//! [`SwitchMonitor::was_pressed`] and [`SwitchMonitor::was_released`] share
//! one recorded "previous state" and both overwrite it on every call. Make
//! at most one edge query per loop iteration, otherwise one query swallows
//! the transition the other was waiting for.

use crate::config::{SWITCH_DEBOUNCE_MS, SWITCH_HOLD_MS};
use embedded_hal::digital::{InputPin, PinState};

/// Debounced switch state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SwitchState {
    /// Switch pushed and stable
    Pressed,
    /// Switch pushed for longer than the hold threshold
    Held,
    /// Switch released
    #[default]
    Released,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SwitchState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Pressed => defmt::write!(f, "Pressed"),
            Self::Held => defmt::write!(f, "Held"),
            Self::Released => defmt::write!(f, "Released"),
        }
    }
}

/// Debounced monitor for a single active-low switch input
pub struct SwitchMonitor<P> {
    pin: P,
    debounce_ms: u32,
    hold_ms: u32,
    /// State seen by the last edge query
    previous: SwitchState,
    /// Debounced state
    current: SwitchState,
    /// Raw level seen by the last `update`
    last_reading: PinState,
    /// Time the raw level last changed
    last_change_ms: u32,
    /// Time the switch entered `Pressed`
    press_start_ms: u32,
}

impl<P: InputPin> SwitchMonitor<P> {
    /// Create a monitor with explicit debounce and hold windows
    #[must_use]
    pub fn new(pin: P, debounce_ms: u32, hold_ms: u32) -> Self {
        Self {
            pin,
            debounce_ms,
            hold_ms,
            previous: SwitchState::Released,
            current: SwitchState::Released,
            last_reading: PinState::High,
            last_change_ms: 0,
            press_start_ms: 0,
        }
    }

    /// Create a monitor with the default 50 ms debounce and 1 s hold windows
    #[must_use]
    pub fn with_defaults(pin: P) -> Self {
        Self::new(pin, SWITCH_DEBOUNCE_MS, SWITCH_HOLD_MS)
    }

    /// Reset the filter and start the debounce timer at `now_ms`
    pub fn begin(&mut self, now_ms: u32) {
        self.previous = SwitchState::Released;
        self.current = SwitchState::Released;
        self.last_reading = PinState::High;
        self.last_change_ms = now_ms;
        self.press_start_ms = now_ms;
    }

    /// Sample the pin and advance the debounce state machine
    ///
    /// # Errors
    ///
    /// Returns the pin error if the input could not be read. The filter
    /// state is left untouched in that case.
    pub fn update(&mut self, now_ms: u32) -> Result<(), P::Error> {
        let reading = if self.pin.is_low()? {
            PinState::Low
        } else {
            PinState::High
        };

        if reading != self.last_reading {
            self.last_change_ms = now_ms;
        }
        self.last_reading = reading;

        if now_ms.wrapping_sub(self.last_change_ms) > self.debounce_ms {
            match (reading, self.current) {
                (PinState::Low, SwitchState::Released) => {
                    self.current = SwitchState::Pressed;
                    self.press_start_ms = now_ms;
                }
                (PinState::Low, SwitchState::Pressed) => {
                    if now_ms.wrapping_sub(self.press_start_ms) > self.hold_ms {
                        self.current = SwitchState::Held;
                    }
                }
                (PinState::High, SwitchState::Pressed | SwitchState::Held) => {
                    self.current = SwitchState::Released;
                }
                // Held stays held until release; no path back to Pressed
                (PinState::Low, SwitchState::Held) | (PinState::High, SwitchState::Released) => {}
            }
        }

        Ok(())
    }

    /// Get the debounced state
    #[must_use]
    pub const fn state(&self) -> SwitchState {
        self.current
    }

    /// Check if pressed (not yet held)
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        matches!(self.current, SwitchState::Pressed)
    }

    /// Check if held
    #[must_use]
    pub const fn is_held(&self) -> bool {
        matches!(self.current, SwitchState::Held)
    }

    /// Check if released
    #[must_use]
    pub const fn is_released(&self) -> bool {
        matches!(self.current, SwitchState::Released)
    }

    /// True exactly once after the state becomes `Pressed`
    ///
    /// Overwrites the recorded previous state on every call.
    pub fn was_pressed(&mut self) -> bool {
        self.edge_into(SwitchState::Pressed)
    }

    /// True exactly once after the state becomes `Released`
    ///
    /// Overwrites the recorded previous state on every call, so it must not
    /// be combined with [`Self::was_pressed`] in the same iteration.
    pub fn was_released(&mut self) -> bool {
        self.edge_into(SwitchState::Released)
    }

    fn edge_into(&mut self, target: SwitchState) -> bool {
        let edge = self.current == target && self.previous != target;
        self.previous = self.current;
        edge
    }

    /// Debounce window in milliseconds
    #[must_use]
    pub const fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }

    /// Hold threshold in milliseconds
    #[must_use]
    pub const fn hold_ms(&self) -> u32 {
        self.hold_ms
    }

    /// Consume the monitor and return the input pin
    pub fn release(self) -> P {
        self.pin
    }
}
