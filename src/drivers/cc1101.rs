//! CC1101 Sub-GHz Transceiver Driver
//!
//! Drives a TI CC1101 as a 2-FSK packet radio over SPI.
//!
//! The chip runs a fixed profile: 4.8 kbit/s, ~5 kHz deviation, ~101 kHz
//! receive bandwidth, variable-length packets up to 61 bytes with hardware
//! CRC and two appended status bytes (RSSI, LQI/CRC_OK).
//!
//! GDO0 asserts on sync word and de-asserts at the end of a packet in both
//! directions, so a single falling-edge interrupt marks "packet received"
//! while listening and "packet sent" while transmitting. The handler
//! attached last through [`IrqLine`] is the one that runs.

use embedded_hal::spi::{Operation, SpiDevice};
use heapless::Vec;

use crate::config::{
    CARRIER_FREQUENCY_HZ, CC1101_FIFO_SIZE, CC1101_XTAL_HZ, MAX_PACKET_LEN, PA_TABLE_POWER,
    RESET_POLL_ATTEMPTS, SYNC_WORD,
};
use crate::radio::driver::{PacketRadio, RadioError, RadioResult};

/// SPI header bits
pub mod header {
    /// Burst write access
    pub const WRITE_BURST: u8 = 0x40;
    /// Single-byte read access
    pub const READ_SINGLE: u8 = 0x80;
    /// Burst read access (also selects status registers at 0x30..0x3D)
    pub const READ_BURST: u8 = 0xC0;
}

/// Command strobes
pub mod strobe {
    /// Reset chip
    pub const SRES: u8 = 0x30;
    /// Enable RX
    pub const SRX: u8 = 0x34;
    /// Enable TX
    pub const STX: u8 = 0x35;
    /// Exit RX/TX to IDLE
    pub const SIDLE: u8 = 0x36;
    /// Flush RX FIFO
    pub const SFRX: u8 = 0x3A;
    /// Flush TX FIFO
    pub const SFTX: u8 = 0x3B;
}

/// Configuration register addresses
#[allow(missing_docs)]
pub mod reg {
    pub const IOCFG2: u8 = 0x00;
    pub const IOCFG0: u8 = 0x02;
    pub const FIFOTHR: u8 = 0x03;
    pub const SYNC1: u8 = 0x04;
    pub const SYNC0: u8 = 0x05;
    pub const PKTLEN: u8 = 0x06;
    pub const PKTCTRL1: u8 = 0x07;
    pub const PKTCTRL0: u8 = 0x08;
    pub const ADDR: u8 = 0x09;
    pub const CHANNR: u8 = 0x0A;
    pub const FSCTRL1: u8 = 0x0B;
    pub const FSCTRL0: u8 = 0x0C;
    pub const FREQ2: u8 = 0x0D;
    pub const FREQ1: u8 = 0x0E;
    pub const FREQ0: u8 = 0x0F;
    pub const MDMCFG4: u8 = 0x10;
    pub const MDMCFG3: u8 = 0x11;
    pub const MDMCFG2: u8 = 0x12;
    pub const MDMCFG1: u8 = 0x13;
    pub const MDMCFG0: u8 = 0x14;
    pub const DEVIATN: u8 = 0x15;
    pub const MCSM1: u8 = 0x17;
    pub const MCSM0: u8 = 0x18;
    pub const FOCCFG: u8 = 0x19;
    pub const BSCFG: u8 = 0x1A;
    pub const AGCCTRL2: u8 = 0x1B;
    pub const AGCCTRL1: u8 = 0x1C;
    pub const AGCCTRL0: u8 = 0x1D;
    pub const FREND1: u8 = 0x21;
    pub const FREND0: u8 = 0x22;
    pub const FSCAL3: u8 = 0x23;
    pub const FSCAL2: u8 = 0x24;
    pub const FSCAL1: u8 = 0x25;
    pub const FSCAL0: u8 = 0x26;
    pub const TEST2: u8 = 0x2C;
    pub const TEST1: u8 = 0x2D;
    pub const TEST0: u8 = 0x2E;
    pub const PATABLE: u8 = 0x3E;
    pub const FIFO: u8 = 0x3F;
}

/// Status register addresses (read with [`header::READ_BURST`])
#[allow(missing_docs)]
pub mod status {
    pub const VERSION: u8 = 0x31;
    pub const MARCSTATE: u8 = 0x35;
    pub const RXBYTES: u8 = 0x3B;
}

/// MARCSTATE value for IDLE
const MARCSTATE_IDLE: u8 = 0x01;

/// RXBYTES overflow bit
const RXFIFO_OVERFLOW: u8 = 0x80;

/// CRC_OK bit in the appended LQI byte
const CRC_OK: u8 = 0x80;

/// Known VERSION register values
const KNOWN_VERSIONS: [u8; 2] = [0x14, 0x04];

/// 2-FSK profile, written in order after reset
///
/// Frequency, sync word and PATABLE are written separately from
/// [`Cc1101Config`].
pub const FSK_PROFILE: [(u8, u8); 29] = [
    (reg::IOCFG2, 0x29),   // CHIP_RDYn
    (reg::IOCFG0, 0x06),   // sync sent/received, de-asserts at end of packet
    (reg::FIFOTHR, 0x47),
    (reg::PKTLEN, MAX_PACKET_LEN as u8),
    (reg::PKTCTRL1, 0x04), // append RSSI/LQI, no address check
    (reg::PKTCTRL0, 0x05), // variable length, CRC on
    (reg::ADDR, 0x00),
    (reg::CHANNR, 0x00),
    (reg::FSCTRL1, 0x06),
    (reg::FSCTRL0, 0x00),
    (reg::MDMCFG4, 0xC7),  // ~101 kHz RX BW, DRATE_E = 7
    (reg::MDMCFG3, 0x83),  // 4.8 kbit/s
    (reg::MDMCFG2, 0x02),  // 2-FSK, 16/16 sync bits
    (reg::MDMCFG1, 0x22),  // 4 preamble bytes
    (reg::MDMCFG0, 0xF8),
    (reg::DEVIATN, 0x15),  // ~5.2 kHz
    (reg::MCSM1, 0x30),    // IDLE after RX and TX
    (reg::MCSM0, 0x18),    // calibrate on IDLE -> RX/TX
    (reg::FOCCFG, 0x16),
    (reg::BSCFG, 0x6C),
    (reg::AGCCTRL2, 0x43),
    (reg::AGCCTRL1, 0x40),
    (reg::AGCCTRL0, 0x91),
    (reg::FREND1, 0x56),
    (reg::FREND0, 0x10),
    (reg::FSCAL3, 0xE9),
    (reg::FSCAL2, 0x2A),
    (reg::FSCAL1, 0x00),
    (reg::FSCAL0, 0x1F),
];

/// Trailing test registers from SmartRF Studio
pub const TEST_SETTINGS: [(u8, u8); 3] = [(reg::TEST2, 0x81), (reg::TEST1, 0x35), (reg::TEST0, 0x09)];

/// Where a GDO0 handler gets attached
pub trait IrqLine {
    /// Replace the handler run on the packet boundary edge
    fn attach(&mut self, action: fn());
}

/// Radio settings that vary per deployment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cc1101Config {
    /// Carrier frequency in Hz
    pub frequency_hz: u32,
    /// 16-bit sync word
    pub sync_word: u16,
    /// PATABLE output power byte
    pub pa_power: u8,
}

impl Default for Cc1101Config {
    fn default() -> Self {
        Self {
            frequency_hz: CARRIER_FREQUENCY_HZ,
            sync_word: SYNC_WORD,
            pa_power: PA_TABLE_POWER,
        }
    }
}

/// Frequency control word: `f * 2^16 / f_xosc`
#[must_use]
pub const fn frequency_word(frequency_hz: u32) -> u32 {
    ((frequency_hz as u64 * (1 << 16)) / CC1101_XTAL_HZ as u64) as u32
}

/// Convert a raw RSSI byte to dBm (offset 74 dB)
#[must_use]
pub fn rssi_to_dbm(raw: u8) -> f32 {
    f32::from(raw as i8) / 2.0 - 74.0
}

/// CC1101 driver
pub struct Cc1101<SPI, IRQ> {
    spi: SPI,
    irq: IRQ,
    config: Cc1101Config,
    last_rssi: u8,
    last_lqi: u8,
}

impl<SPI, IRQ> Cc1101<SPI, IRQ>
where
    SPI: SpiDevice,
    IRQ: IrqLine,
{
    /// Create a driver; call [`PacketRadio::init`] before use
    #[must_use]
    pub fn new(spi: SPI, irq: IRQ, config: Cc1101Config) -> Self {
        Self {
            spi,
            irq,
            config,
            last_rssi: 0,
            last_lqi: 0,
        }
    }

    /// Read the VERSION register
    ///
    /// # Errors
    ///
    /// Returns `Bus` on SPI failure.
    pub fn version(&mut self) -> RadioResult<u8> {
        self.read_status(status::VERSION)
    }

    /// Read the main radio control state
    ///
    /// # Errors
    ///
    /// Returns `Bus` on SPI failure.
    pub fn marc_state(&mut self) -> RadioResult<u8> {
        Ok(self.read_status(status::MARCSTATE)? & 0x1F)
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &Cc1101Config {
        &self.config
    }

    /// Consume the driver and return the SPI device and IRQ line
    pub fn release(self) -> (SPI, IRQ) {
        (self.spi, self.irq)
    }

    fn strobe(&mut self, command: u8) -> RadioResult<()> {
        self.spi.write(&[command]).map_err(|_| RadioError::Bus)
    }

    fn write_register(&mut self, addr: u8, value: u8) -> RadioResult<()> {
        self.spi.write(&[addr, value]).map_err(|_| RadioError::Bus)
    }

    fn write_burst(&mut self, addr: u8, data: &[u8]) -> RadioResult<()> {
        let mut frame: Vec<u8, { CC1101_FIFO_SIZE + 1 }> = Vec::new();
        frame
            .push(addr | header::WRITE_BURST)
            .map_err(|_| RadioError::PacketTooLong { len: data.len() })?;
        frame
            .extend_from_slice(data)
            .map_err(|()| RadioError::PacketTooLong { len: data.len() })?;
        self.spi.write(&frame).map_err(|_| RadioError::Bus)
    }

    fn read_single(&mut self, addr: u8) -> RadioResult<u8> {
        let mut frame = [addr | header::READ_SINGLE, 0];
        self.spi
            .transfer_in_place(&mut frame)
            .map_err(|_| RadioError::Bus)?;
        Ok(frame[1])
    }

    fn read_status(&mut self, addr: u8) -> RadioResult<u8> {
        let mut frame = [addr | header::READ_BURST, 0];
        self.spi
            .transfer_in_place(&mut frame)
            .map_err(|_| RadioError::Bus)?;
        Ok(frame[1])
    }

    fn read_burst(&mut self, addr: u8, buf: &mut [u8]) -> RadioResult<()> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[addr | header::READ_BURST]),
                Operation::Read(buf),
            ])
            .map_err(|_| RadioError::Bus)
    }

    fn wait_idle(&mut self) -> RadioResult<()> {
        for _ in 0..RESET_POLL_ATTEMPTS {
            if self.marc_state()? == MARCSTATE_IDLE {
                return Ok(());
            }
        }
        Err(RadioError::Timeout)
    }

    fn configure(&mut self) -> RadioResult<()> {
        for (addr, value) in FSK_PROFILE.iter().chain(TEST_SETTINGS.iter()) {
            self.write_register(*addr, *value)?;
        }

        let [_, freq2, freq1, freq0] = frequency_word(self.config.frequency_hz).to_be_bytes();
        self.write_register(reg::FREQ2, freq2)?;
        self.write_register(reg::FREQ1, freq1)?;
        self.write_register(reg::FREQ0, freq0)?;

        let [sync1, sync0] = self.config.sync_word.to_be_bytes();
        self.write_register(reg::SYNC1, sync1)?;
        self.write_register(reg::SYNC0, sync0)?;

        self.write_burst(reg::PATABLE, &[self.config.pa_power])
    }

    fn drain_rx(&mut self, buf: &mut [u8]) -> RadioResult<usize> {
        let rx_bytes = self.read_status(status::RXBYTES)?;
        if rx_bytes & RXFIFO_OVERFLOW != 0 {
            return Err(RadioError::RxOverflow);
        }
        if rx_bytes & 0x7F == 0 {
            return Err(RadioError::EmptyFifo);
        }

        let len = usize::from(self.read_single(reg::FIFO)?);
        if len > MAX_PACKET_LEN || len > buf.len() {
            return Err(RadioError::PacketTooLong { len });
        }
        self.read_burst(reg::FIFO, &mut buf[..len])?;

        let mut appended = [0u8; 2];
        self.read_burst(reg::FIFO, &mut appended)?;
        self.last_rssi = appended[0];
        self.last_lqi = appended[1] & 0x7F;

        if appended[1] & CRC_OK == 0 {
            return Err(RadioError::CrcMismatch);
        }
        Ok(len)
    }
}

impl<SPI, IRQ> PacketRadio for Cc1101<SPI, IRQ>
where
    SPI: SpiDevice,
    IRQ: IrqLine,
{
    fn init(&mut self) -> RadioResult<()> {
        self.strobe(strobe::SRES)?;
        self.wait_idle()?;

        let version = self.version()?;
        if !KNOWN_VERSIONS.contains(&version) {
            return Err(RadioError::ChipNotFound { version });
        }

        self.configure()?;
        self.strobe(strobe::SIDLE)
    }

    fn start_receive(&mut self) -> RadioResult<()> {
        self.strobe(strobe::SIDLE)?;
        self.strobe(strobe::SFRX)?;
        self.strobe(strobe::SRX)
    }

    fn read_data(&mut self, buf: &mut [u8]) -> RadioResult<usize> {
        let result = self.drain_rx(buf);
        // Leave the FIFO empty whatever happened
        self.strobe(strobe::SIDLE)?;
        self.strobe(strobe::SFRX)?;
        result
    }

    fn rssi(&mut self) -> f32 {
        rssi_to_dbm(self.last_rssi)
    }

    fn lqi(&mut self) -> u8 {
        self.last_lqi
    }

    fn start_transmit(&mut self, payload: &[u8]) -> RadioResult<()> {
        let len = payload.len();
        if len > MAX_PACKET_LEN {
            return Err(RadioError::PacketTooLong { len });
        }

        self.strobe(strobe::SIDLE)?;
        self.strobe(strobe::SFTX)?;

        let mut packet: Vec<u8, CC1101_FIFO_SIZE> = Vec::new();
        packet
            .push(len as u8)
            .map_err(|_| RadioError::PacketTooLong { len })?;
        packet
            .extend_from_slice(payload)
            .map_err(|()| RadioError::PacketTooLong { len })?;
        self.write_burst(reg::FIFO, &packet)?;

        self.strobe(strobe::STX)
    }

    fn finish_transmit(&mut self) -> RadioResult<()> {
        self.strobe(strobe::SIDLE)?;
        self.strobe(strobe::SFTX)
    }

    fn set_packet_received_action(&mut self, action: fn()) {
        self.irq.attach(action);
    }

    fn set_packet_sent_action(&mut self, action: fn()) {
        self.irq.attach(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_word_434mhz() {
        assert_eq!(frequency_word(434_000_000), 0x10_B1_3B);
    }

    #[test]
    fn frequency_word_868mhz() {
        // 868 MHz = twice 434 MHz, so twice the word (minus truncation)
        let word = frequency_word(868_000_000);
        assert_eq!(word, 0x21_62_76);
    }

    #[test]
    fn rssi_conversion() {
        assert!((rssi_to_dbm(0x20) - -58.0).abs() < f32::EPSILON);
        assert!((rssi_to_dbm(0xEC) - -84.0).abs() < f32::EPSILON);
        assert!((rssi_to_dbm(0x80) - -138.0).abs() < f32::EPSILON);
    }

    #[test]
    fn profile_fits_fifo() {
        assert!(MAX_PACKET_LEN + 3 <= CC1101_FIFO_SIZE);
    }
}
