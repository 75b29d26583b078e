//! USB CDC ACM (Serial) Log Port
//!
//! Status lines are queued into a static byte pipe by [`CdcLogSink`] and
//! drained to the host by [`forward_lines`] running in the USB task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_usb::class::cdc_acm::CdcAcmClass;
use embassy_usb::driver::{Driver, EndpointError};

use crate::config::{USB_CDC_PACKET_SIZE, USB_PID, USB_VID};
use crate::radio::status::{LineQueue, QueueSink};

/// Byte pipe between the status sink and the USB task
pub type LogPipe<const N: usize> = Pipe<CriticalSectionRawMutex, N>;

/// Bytes per bulk packet; one short of full size so no ZLP is needed
const CHUNK_SIZE: usize = USB_CDC_PACKET_SIZE as usize - 1;

/// Status sink that queues whole lines for the serial port
pub type CdcLogSink<const N: usize> = QueueSink<&'static LogPipe<N>>;

impl<const N: usize> LineQueue for &'static LogPipe<N> {
    fn free_capacity(&self) -> usize {
        (**self).free_capacity()
    }

    fn try_write(&mut self, bytes: &[u8]) -> usize {
        (**self).try_write(bytes).unwrap_or(0)
    }
}

/// Copy queued log bytes to the host until the endpoint goes away
///
/// # Errors
///
/// Returns the endpoint error when the host disconnects.
pub async fn forward_lines<'d, D: Driver<'d>, const N: usize>(
    class: &mut CdcAcmClass<'d, D>,
    pipe: &LogPipe<N>,
) -> Result<(), EndpointError> {
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let len = pipe.read(&mut chunk).await;
        class.write_packet(&chunk[..len]).await?;
    }
}

/// USB device descriptor strings
pub struct UsbStrings {
    /// Manufacturer name
    pub manufacturer: &'static str,
    /// Product name
    pub product: &'static str,
    /// Serial number
    pub serial: &'static str,
}

impl Default for UsbStrings {
    fn default() -> Self {
        Self {
            manufacturer: "FSK Link Project",
            product: "FSK Link Console",
            serial: "0001",
        }
    }
}

/// USB device info for descriptor
#[derive(Clone, Copy, Debug)]
pub struct UsbDeviceInfo {
    /// Vendor ID
    pub vid: u16,
    /// Product ID
    pub pid: u16,
    /// Device release number
    pub device_release: u16,
}

impl Default for UsbDeviceInfo {
    fn default() -> Self {
        Self {
            vid: USB_VID,
            pid: USB_PID,
            device_release: 0x0100,
        }
    }
}

impl defmt::Format for UsbDeviceInfo {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "USB({:04X}:{:04X})", self.vid, self.pid);
    }
}

/// Build the device configuration for the log port
#[must_use]
pub fn device_config(info: UsbDeviceInfo, strings: &UsbStrings) -> embassy_usb::Config<'static> {
    let mut config = embassy_usb::Config::new(info.vid, info.pid);
    config.device_release = info.device_release;
    config.manufacturer = Some(strings.manufacturer);
    config.product = Some(strings.product);
    config.serial_number = Some(strings.serial);
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config
}
