//! SPI Device Wrapper
//!
//! Turns an exclusively owned SPI bus plus a GPIO chip select into an
//! [`SpiDevice`]. The radio is the only device on its bus, so no bus
//! sharing or locking is needed.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{self, ErrorKind, ErrorType, Operation, SpiBus, SpiDevice};

/// Error from a [`ChipSelectDevice`] transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceError<B, C> {
    /// Bus transfer failed
    Bus(B),
    /// Chip select pin could not be driven
    ChipSelect(C),
}

impl<B: spi::Error, C: fmt::Debug> spi::Error for DeviceError<B, C> {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Bus(err) => err.kind(),
            Self::ChipSelect(_) => ErrorKind::ChipSelectFault,
        }
    }
}

/// SPI bus with a dedicated active-low chip select
pub struct ChipSelectDevice<BUS, CS, D> {
    bus: BUS,
    cs: CS,
    delay: D,
}

impl<BUS, CS, D> ChipSelectDevice<BUS, CS, D>
where
    BUS: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    /// Wrap `bus`, deasserting `cs` first
    ///
    /// # Errors
    ///
    /// Returns the pin error if chip select could not be driven high.
    pub fn new(bus: BUS, mut cs: CS, delay: D) -> Result<Self, CS::Error> {
        cs.set_high()?;
        Ok(Self { bus, cs, delay })
    }

    /// Consume the device and return its parts
    pub fn release(self) -> (BUS, CS, D) {
        (self.bus, self.cs, self.delay)
    }
}

impl<BUS, CS, D> ErrorType for ChipSelectDevice<BUS, CS, D>
where
    BUS: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    type Error = DeviceError<BUS::Error, CS::Error>;
}

impl<BUS, CS, D> SpiDevice for ChipSelectDevice<BUS, CS, D>
where
    BUS: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(DeviceError::ChipSelect)?;

        let result = run_operations(&mut self.bus, &mut self.delay, operations);
        // Flush before releasing CS even if an operation failed
        let flushed = self.bus.flush();
        let released = self.cs.set_high();

        result.map_err(DeviceError::Bus)?;
        flushed.map_err(DeviceError::Bus)?;
        released.map_err(DeviceError::ChipSelect)
    }
}

fn run_operations<BUS: SpiBus, D: DelayNs>(
    bus: &mut BUS,
    delay: &mut D,
    operations: &mut [Operation<'_, u8>],
) -> Result<(), BUS::Error> {
    for op in operations {
        match op {
            Operation::Read(buf) => bus.read(buf)?,
            Operation::Write(buf) => bus.write(buf)?,
            Operation::Transfer(read, write) => bus.transfer(read, write)?,
            Operation::TransferInPlace(buf) => bus.transfer_in_place(buf)?,
            Operation::DelayNs(ns) => {
                bus.flush()?;
                delay.delay_ns(*ns);
            }
        }
    }
    Ok(())
}
