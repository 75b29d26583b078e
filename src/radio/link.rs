//! Link Mode Controller
//!
//! Runs the half-duplex link from a single polling loop. Each call to
//! [`LinkController::tick`]:
//!
//! 1. updates the switch monitor and toggles the mode on a press edge,
//! 2. runs either the receive or the transmit handler.
//!
//! The iteration that detects a toggle runs the new mode's entry action
//! instead of its steady-state body. Interrupt handlers only set
//! [`RadioFlags`]; all radio I/O happens here.
//!
//! Startup and receive-entry listen failures are fatal and park the
//! controller in [`LinkState::Halted`]. Per-packet failures are logged and
//! the state machine moves on.

use core::fmt::{self, Write as _};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use heapless::String;

use super::driver::{PacketRadio, RadioError, RadioResult};
use super::events::RadioFlags;
use super::status::{LinkEvent, StatusSink};
use crate::config::{GREETING, MAX_PACKET_LEN, PAYLOAD_CAPACITY, TX_INTERVAL_MS};
use crate::drivers::encoder::SwitchMonitor;
use crate::types::LinkMode;

/// Interrupt handlers registered with the radio
///
/// Each handler must only set its flag in [`RadioFlags`].
#[derive(Clone, Copy, Debug)]
pub struct IrqHandlers {
    /// Run when a packet has been received
    pub packet_received: fn(),
    /// Run when a packet has been sent
    pub packet_sent: fn(),
}

/// Reason the controller halted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Radio bring-up failed
    RadioInit(RadioError),
    /// Receiver could not be armed
    Listen(RadioError),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RadioInit(err) => write!(f, "radio init: {err}"),
            Self::Listen(err) => write!(f, "listen: {err}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Fault {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::RadioInit(err) => defmt::write!(f, "radio init: {}", err),
            Self::Listen(err) => defmt::write!(f, "listen: {}", err),
        }
    }
}

/// Controller run state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// `begin` has not run yet
    Idle,
    /// Servicing the link
    Running,
    /// Stopped after a fatal fault; only a reset recovers
    Halted(Fault),
}

/// Build the payload for numbered packet `count`
#[must_use]
pub fn numbered_payload(count: u32) -> String<PAYLOAD_CAPACITY> {
    let mut payload = String::new();
    // GREETING plus the widest u32 fits PAYLOAD_CAPACITY
    let _ = write!(payload, "{GREETING} #{count}");
    payload
}

/// Button-toggled receive/transmit controller
pub struct LinkController<'a, R, P, D, S> {
    radio: R,
    switch: SwitchMonitor<P>,
    flags: &'a RadioFlags,
    handlers: IrqHandlers,
    delay: D,
    sink: S,
    mode: LinkMode,
    /// Set for the iteration that follows a toggle
    mode_changed: bool,
    /// Status of the last `start_transmit`, evaluated on the next pass
    tx_status: RadioResult<()>,
    /// Next packet number
    tx_count: u32,
    state: LinkState,
}

impl<'a, R, P, D, S> LinkController<'a, R, P, D, S>
where
    R: PacketRadio,
    P: InputPin,
    D: DelayNs,
    S: StatusSink,
{
    /// Create a controller; call [`Self::begin`] before ticking
    #[must_use]
    pub fn new(
        radio: R,
        switch: SwitchMonitor<P>,
        flags: &'a RadioFlags,
        handlers: IrqHandlers,
        delay: D,
        sink: S,
    ) -> Self {
        Self {
            radio,
            switch,
            flags,
            handlers,
            delay,
            sink,
            mode: LinkMode::Receive,
            mode_changed: false,
            tx_status: Ok(()),
            tx_count: 0,
            state: LinkState::Idle,
        }
    }

    /// Bring up the switch and radio and start listening
    ///
    /// Returns [`LinkState::Halted`] if the radio could not be initialized or
    /// armed.
    pub fn begin(&mut self, now_ms: u32) -> LinkState {
        if self.state != LinkState::Idle {
            return self.state;
        }

        self.switch.begin(now_ms);
        self.sink.emit(&LinkEvent::Starting);

        if let Err(err) = self.radio.init() {
            self.sink.emit(&LinkEvent::RadioInitFailed(err));
            return self.halt(Fault::RadioInit(err));
        }

        self.radio
            .set_packet_received_action(self.handlers.packet_received);
        if let Err(err) = self.radio.start_receive() {
            self.sink.emit(&LinkEvent::ListenFailed(err));
            return self.halt(Fault::Listen(err));
        }

        self.sink.emit(&LinkEvent::Listening);
        self.mode = LinkMode::Receive;
        self.mode_changed = false;
        self.state = LinkState::Running;
        self.state
    }

    /// Run one polling iteration
    pub fn tick(&mut self, now_ms: u32) -> LinkState {
        if self.state != LinkState::Running {
            return self.state;
        }

        if self.switch.update(now_ms).is_err() {
            self.sink.emit(&LinkEvent::SwitchReadFailed);
        }
        if self.switch.was_pressed() {
            self.mode = self.mode.toggle();
            self.mode_changed = true;
            self.sink.emit(&LinkEvent::ModeSwitched(self.mode));
        }

        match self.mode {
            LinkMode::Receive => self.service_receive(),
            LinkMode::Transmit => self.service_transmit(),
        }

        self.state
    }

    fn service_receive(&mut self) {
        if self.mode_changed {
            self.mode_changed = false;
            self.enter_receive();
            return;
        }

        if !self.flags.take_received() {
            return;
        }

        let mut buf = [0u8; MAX_PACKET_LEN];
        match self.radio.read_data(&mut buf) {
            Ok(len) => {
                let rssi_dbm = self.radio.rssi();
                let lqi = self.radio.lqi();
                self.sink.emit(&LinkEvent::PacketReceived {
                    data: &buf[..len],
                    rssi_dbm,
                    lqi,
                });
            }
            Err(RadioError::CrcMismatch) => self.sink.emit(&LinkEvent::CrcMismatch),
            Err(err) => self.sink.emit(&LinkEvent::ReceiveFailed(err)),
        }

        // Never leave the receiver idle after consuming a packet
        if let Err(err) = self.radio.start_receive() {
            self.sink.emit(&LinkEvent::RearmFailed(err));
        }
    }

    fn enter_receive(&mut self) {
        if let Err(err) = self.radio.finish_transmit() {
            self.sink.emit(&LinkEvent::FinishFailed(err));
        }

        self.flags.clear();
        self.radio
            .set_packet_received_action(self.handlers.packet_received);

        match self.radio.start_receive() {
            Ok(()) => self.sink.emit(&LinkEvent::Listening),
            Err(err) => {
                self.sink.emit(&LinkEvent::ListenFailed(err));
                self.halt(Fault::Listen(err));
            }
        }
    }

    fn service_transmit(&mut self) {
        if self.mode_changed {
            self.mode_changed = false;
            self.enter_transmit();
            return;
        }

        // A failed start never raises the sent interrupt, so retry on it too
        let sent = self.flags.take_transmitted();
        if !sent && self.tx_status.is_ok() {
            return;
        }

        if let Err(err) = self.radio.finish_transmit() {
            self.sink.emit(&LinkEvent::FinishFailed(err));
        }

        match self.tx_status {
            Ok(()) => self.sink.emit(&LinkEvent::TransmitFinished),
            Err(err) => self.sink.emit(&LinkEvent::TransmitFailed(err)),
        }

        self.delay.delay_ms(TX_INTERVAL_MS);

        let payload = numbered_payload(self.tx_count);
        self.tx_count = self.tx_count.wrapping_add(1);
        self.sink.emit(&LinkEvent::Sending { payload: payload.as_str() });
        self.tx_status = self.radio.start_transmit(payload.as_bytes());
    }

    fn enter_transmit(&mut self) {
        self.flags.clear();
        self.radio.set_packet_sent_action(self.handlers.packet_sent);

        self.sink.emit(&LinkEvent::Sending { payload: GREETING });
        self.tx_status = self.radio.start_transmit(GREETING.as_bytes());
    }

    fn halt(&mut self, fault: Fault) -> LinkState {
        self.sink.emit(&LinkEvent::Halted(fault));
        self.state = LinkState::Halted(fault);
        self.state
    }

    /// Active mode
    #[must_use]
    pub const fn mode(&self) -> LinkMode {
        self.mode
    }

    /// Run state
    #[must_use]
    pub const fn state(&self) -> LinkState {
        self.state
    }

    /// Check if halted
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self.state, LinkState::Halted(_))
    }

    /// Numbered packets started so far
    #[must_use]
    pub const fn packets_sent(&self) -> u32 {
        self.tx_count
    }

    /// Borrow the radio driver
    #[must_use]
    pub const fn radio(&self) -> &R {
        &self.radio
    }

    /// Borrow the switch monitor
    #[must_use]
    pub const fn switch(&self) -> &SwitchMonitor<P> {
        &self.switch
    }

    /// Borrow the status sink
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }
}
