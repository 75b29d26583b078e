//! FSK Link Main Application
//!
//! Entry point for the STM32G474 + CC1101 packet link firmware.
//! Initializes hardware, spawns the USB and GDO0 tasks and runs the link
//! controller in the main task.

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::time::Hertz;
use embassy_stm32::usb::{self, Driver};
use embassy_stm32::{bind_interrupts, peripherals, spi};
use embassy_time::Delay;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, UsbDevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use fsk_link::drivers::cc1101::{Cc1101, Cc1101Config};
use fsk_link::drivers::encoder::SwitchMonitor;
use fsk_link::hal::exti::PacketIrq;
use fsk_link::hal::gpio::ModeIndicator;
use fsk_link::hal::spi::ChipSelectDevice;
use fsk_link::prelude::*;
use fsk_link::radio::events::RadioFlags;
use fsk_link::radio::link::{IrqHandlers, LinkController, LinkState};
use fsk_link::radio::status::DefmtSink;
use fsk_link::usb::cdc::{self, CdcLogSink, LogPipe, UsbDeviceInfo, UsbStrings};

// Bind interrupt handlers
bind_interrupts!(struct Irqs {
    USB_LP => usb::InterruptHandler<peripherals::USB>;
});

type UsbDriver = Driver<'static, peripherals::USB>;

static RADIO_FLAGS: RadioFlags = RadioFlags::new();
static GDO0_IRQ: PacketIrq = PacketIrq::new();
static LOG_PIPE: LogPipe<LOG_PIPE_SIZE> = LogPipe::new();

fn on_packet_received() {
    RADIO_FLAGS.set_received();
}

fn on_packet_sent() {
    RADIO_FLAGS.set_transmitted();
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("FSK Link Firmware v{}", env!("CARGO_PKG_VERSION"));

    // HSI48 feeds the USB peripheral, trimmed from SOF
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::{mux, Hsi48Config};
        config.rcc.hsi48 = Some(Hsi48Config { sync_from_usb: true });
        config.rcc.mux.clk48sel = mux::Clk48sel::HSI48;
    }
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    // USB CDC log port
    let device_info = UsbDeviceInfo::default();
    info!("Starting {}", device_info);
    let driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);
    let usb_config = cdc::device_config(device_info, &UsbStrings::default());

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static MSOS_DESCRIPTOR: StaticCell<[u8; 0]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static CDC_STATE: StaticCell<State<'static>> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 0]),
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), USB_CDC_PACKET_SIZE);
    let device = builder.build();

    // CC1101 on SPI2: PB13 = SCK, PB15 = MOSI, PB14 = MISO, PB12 = CS
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(SPI_FREQUENCY_HZ);
    let bus = spi::Spi::new_blocking(p.SPI2, p.PB13, p.PB15, p.PB14, spi_config);
    let cs = Output::new(p.PB12, Level::High, Speed::VeryHigh);
    let spi_device = ChipSelectDevice::new(bus, cs, Delay).unwrap_or_else(|e| match e {});

    // GDO0 on PB0, falling edge marks the end of a packet
    let gdo0 = ExtiInput::new(p.PB0, p.EXTI0, Pull::None);

    spawner.spawn(usb_task(device, class)).unwrap();
    spawner.spawn(gdo0_task(gdo0)).unwrap();

    let radio = Cc1101::new(spi_device, &GDO0_IRQ, Cc1101Config::default());

    // Encoder push switch on PA2, active low
    let switch = SwitchMonitor::with_defaults(Input::new(p.PA2, Pull::Up));

    // Mode LED on PA5 (Nucleo user LED), lit while transmitting
    let mut led =
        ModeIndicator::new(Output::new(p.PA5, Level::Low, Speed::Low)).unwrap_or_else(|e| match e {});

    let handlers = IrqHandlers {
        packet_received: on_packet_received,
        packet_sent: on_packet_sent,
    };
    let sink = (DefmtSink, CdcLogSink::new(&LOG_PIPE));
    let mut link = LinkController::new(radio, switch, &RADIO_FLAGS, handlers, Delay, sink);

    if let LinkState::Halted(fault) = link.begin(now_ms()) {
        halt(fault).await;
    }

    info!("Tasks spawned, entering main loop");

    let mut reported_drops = 0;
    loop {
        if let LinkState::Halted(fault) = link.tick(now_ms()) {
            halt(fault).await;
        }
        let _ = led.show(link.mode());

        let dropped = link.sink().1.dropped();
        if dropped != reported_drops {
            warn!("USB log pipe full, {} lines dropped", dropped);
            reported_drops = dropped;
        }
        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

/// Milliseconds since boot; wraps after ~49 days
#[allow(clippy::cast_possible_truncation)]
fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Park the main task after a fatal radio fault
async fn halt(fault: fsk_link::radio::link::Fault) -> ! {
    error!("Link halted: {}", fault);
    loop {
        Timer::after(Duration::from_millis(HALT_IDLE_MS)).await;
    }
}

/// USB task - runs the device stack and drains the log pipe to the host
#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>, mut class: CdcAcmClass<'static, UsbDriver>) {
    let log = async {
        loop {
            class.wait_connection().await;
            info!("USB log port connected");
            let _ = cdc::forward_lines(&mut class, &LOG_PIPE).await;
            info!("USB log port disconnected");
        }
    };
    embassy_futures::join::join(device.run(), log).await;
}

/// GDO0 task - forwards packet boundary edges to the registered handler
#[embassy_executor::task]
async fn gdo0_task(mut gdo0: ExtiInput<'static>) {
    loop {
        gdo0.wait_for_falling_edge().await;
        GDO0_IRQ.fire();
    }
}
