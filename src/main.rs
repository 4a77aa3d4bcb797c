#[cfg(target_os = "espidf")]
use anyhow::Context;
#[cfg(target_os = "espidf")]
use embedded_graphics::mono_font::{
    iso_8859_15::FONT_10X20 as ISO15_10, iso_8859_15::FONT_5X8, MonoTextStyle, MonoTextStyleBuilder,
};
#[cfg(target_os = "espidf")]
use embedded_graphics::pixelcolor::BinaryColor;
#[cfg(target_os = "espidf")]
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
#[cfg(target_os = "espidf")]
use embedded_graphics::{prelude::*, text::Text};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio::{self, IOPin, OutputPin};
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripherals::Peripherals;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::spi;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::units::Hertz;

#[cfg(target_os = "espidf")]
use uc8151d_epd::config::{validate_bus_topology, DmaChannel};
#[cfg(target_os = "espidf")]
use uc8151d_epd::uc8151d::busy::BusyLine;
#[cfg(target_os = "espidf")]
use uc8151d_epd::uc8151d::port::EspDisplayPort;
#[cfg(target_os = "espidf")]
use uc8151d_epd::{Controller, DisplayBus, Framebuffer, PanelConfig, Region, Uc8151d};

#[cfg(target_os = "espidf")]
fn dma_for(bus: &DisplayBus) -> spi::Dma {
    match bus.dma {
        DmaChannel::Disabled => spi::Dma::Disabled,
        DmaChannel::Auto => spi::Dma::Auto(bus.max_transfer_size),
        DmaChannel::Channel1 => spi::Dma::Channel1(bus.max_transfer_size),
        DmaChannel::Channel2 => spi::Dma::Channel2(bus.max_transfer_size),
    }
}

// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take().context("could not take peripherals")?;
    let pins = peripherals.pins;

    let panel = PanelConfig::default();
    let bus = DisplayBus::for_controller(
        Controller::Uc8151D,
        usize::from(panel.width),
        usize::from(panel.height),
    );
    // No touch device on this board, but keep the wiring honest
    validate_bus_topology(&bus, None)?;

    log::info!(
        "Configuring SPI bus: {} Hz, mode {}, max transfer {} bytes",
        bus.baudrate_hz,
        bus.spi_mode,
        bus.max_transfer_size
    );
    let spi = spi::SpiDeviceDriver::new_single(
        peripherals.spi2,
        pins.gpio12,                    // SCK
        pins.gpio11,                    // MOSI
        Option::<gpio::AnyIOPin>::None, // no MISO, the panel is write-only
        Some(pins.gpio45),              // CS
        &spi::SpiDriverConfig::new().dma(dma_for(&bus)),
        &spi::SpiConfig::new().baudrate(Hertz(bus.baudrate_hz)),
    )
    .context("could not create SPI device driver")?;

    let port = EspDisplayPort::new(
        spi,
        pins.gpio46.downgrade_output(),       // DC
        Some(pins.gpio47.downgrade_output()), // RST
    )
    .context("could not set up display control pins")?;

    // A failure here means no busy interrupt and therefore no way to pace
    // the panel; bring-up cannot continue.
    let busy = BusyLine::new(pins.gpio48.downgrade())
        .context("could not set up the busy line interrupt")?;

    let mut epd = Uc8151d::new(port, busy, panel.clone());
    epd.init().context("panel bring-up failed")?;

    // Draw a framed greeting into the packed buffer
    let mut display = Framebuffer::new(&panel);
    Rectangle::new(Point::new(0, 0), display.size())
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
        .draw(&mut display)?;

    let heading = MonoTextStyleBuilder::new()
        .font(&ISO15_10)
        .text_color(BinaryColor::On)
        .build();
    Text::new("GDEW0154M10", Point::new(10, 40), heading).draw(&mut display)?;

    let label = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    Text::new("UC8151D full refresh", Point::new(10, 60), label).draw(&mut display)?;

    // Full extent no matter what was dirtied; the panel has no partial mode
    let area = Region {
        x1: 10,
        y1: 30,
        x2: 120,
        y2: 65,
    }
    .rounded(&panel);
    log::info!(
        "Flushing rows {}..={} of {}",
        area.y1,
        area.y2,
        panel.height
    );

    epd.full_update(display.data())
        .context("full panel update failed")?;
    log::info!("Flush complete, panel is back in deep sleep");

    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    // The binary only does something on the device; the library and its
    // tests are what run on the host.
    eprintln!("uc8151d-epd targets esp-idf; build with the espidf toolchain");
}
