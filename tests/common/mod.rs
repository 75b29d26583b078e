//! Shared test doubles for the link tests
//!
//! A scripted radio that logs every call, a switch pin driven from the test,
//! a delay that records instead of sleeping, and a sink that keeps lines.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin};
use fsk_link::radio::driver::{PacketRadio, RadioError, RadioResult};
use fsk_link::radio::status::{LinkEvent, Severity, StatusSink};

/// One call made on [`ScriptedRadio`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Init,
    StartReceive,
    ReadData,
    StartTransmit(Vec<u8>),
    FinishTransmit,
    SetReceivedAction,
    SetSentAction,
}

/// Radio whose results are queued by the test; an empty queue means `Ok`
#[derive(Default)]
pub struct ScriptedRadio {
    pub calls: Vec<Call>,
    pub init_result: Option<RadioError>,
    pub receive_results: VecDeque<RadioResult<()>>,
    pub read_results: VecDeque<RadioResult<Vec<u8>>>,
    pub transmit_results: VecDeque<RadioResult<()>>,
    pub finish_results: VecDeque<RadioResult<()>>,
    pub rssi_dbm: f32,
    pub lqi: u8,
    received_action: Option<fn()>,
    sent_action: Option<fn()>,
}

impl ScriptedRadio {
    pub fn new() -> Self {
        Self {
            rssi_dbm: -58.0,
            lqi: 12,
            ..Self::default()
        }
    }

    /// Run the registered packet-received handler, as the interrupt would
    pub fn fire_received(&self) {
        if let Some(action) = self.received_action {
            action();
        }
    }

    /// Run the registered packet-sent handler, as the interrupt would
    pub fn fire_sent(&self) {
        if let Some(action) = self.sent_action {
            action();
        }
    }

    /// Payloads passed to `start_transmit`, as text
    pub fn transmitted(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::StartTransmit(data) => Some(String::from_utf8_lossy(data).into_owned()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }
}

impl PacketRadio for ScriptedRadio {
    fn init(&mut self) -> RadioResult<()> {
        self.calls.push(Call::Init);
        self.init_result.map_or(Ok(()), Err)
    }

    fn start_receive(&mut self) -> RadioResult<()> {
        self.calls.push(Call::StartReceive);
        self.receive_results.pop_front().unwrap_or(Ok(()))
    }

    fn read_data(&mut self, buf: &mut [u8]) -> RadioResult<usize> {
        self.calls.push(Call::ReadData);
        let data = self.read_results.pop_front().unwrap_or(Err(RadioError::EmptyFifo))?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    fn rssi(&mut self) -> f32 {
        self.rssi_dbm
    }

    fn lqi(&mut self) -> u8 {
        self.lqi
    }

    fn start_transmit(&mut self, payload: &[u8]) -> RadioResult<()> {
        self.calls.push(Call::StartTransmit(payload.to_vec()));
        self.transmit_results.pop_front().unwrap_or(Ok(()))
    }

    fn finish_transmit(&mut self) -> RadioResult<()> {
        self.calls.push(Call::FinishTransmit);
        self.finish_results.pop_front().unwrap_or(Ok(()))
    }

    fn set_packet_received_action(&mut self, action: fn()) {
        self.calls.push(Call::SetReceivedAction);
        self.received_action = Some(action);
    }

    fn set_packet_sent_action(&mut self, action: fn()) {
        self.calls.push(Call::SetSentAction);
        self.sent_action = Some(action);
    }
}

/// Active-low switch input; `true` in the cell means pressed
#[derive(Clone, Default)]
pub struct FakePin {
    pressed: Rc<Cell<bool>>,
}

impl FakePin {
    pub fn new() -> (Self, Rc<Cell<bool>>) {
        let pressed = Rc::new(Cell::new(false));
        (
            Self {
                pressed: Rc::clone(&pressed),
            },
            pressed,
        )
    }
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.pressed.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pressed.get())
    }
}

/// Delay that records requested milliseconds without sleeping
#[derive(Clone, Default)]
pub struct RecordingDelay {
    pub delays_ms: Rc<RefCell<Vec<u32>>>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.borrow_mut().push(ms);
    }
}

/// Sink that keeps every rendered line with its severity
#[derive(Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
    pub severities: Vec<Severity>,
}

impl RecordingSink {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines.iter().filter(|line| line.contains(needle)).count()
    }
}

impl StatusSink for RecordingSink {
    fn emit(&mut self, event: &LinkEvent<'_>) {
        self.lines.push(event.to_string());
        self.severities.push(event.severity());
    }
}

/// `IrqHandlers` whose handlers set the caller's `FLAGS` static
#[allow(unused_macros)]
macro_rules! test_flags {
    () => {{
        fn on_received() {
            FLAGS.set_received();
        }
        fn on_sent() {
            FLAGS.set_transmitted();
        }
        fsk_link::radio::link::IrqHandlers {
            packet_received: on_received,
            packet_sent: on_sent,
        }
    }};
}
