//! Display and touch peripheral configuration
//!
//! The original firmware selected controller, pins and clocks through a maze
//! of build-time options. Here the same tables are explicit values: pick one
//! [`Controller`], build a [`DisplayBus`] and [`DisplayPins`] once at startup
//! and hand them to the bring-up code. Nothing is reconfigurable at runtime.

use anyhow::{bail, Result};

/// Supported display controllers, one active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    St7789,
    St7735S,
    St7796S,
    Hx8357,
    Ili9481,
    Ili9486,
    Ili9488,
    Ili9341,
    Sh1107,
    Ssd1306,
    Ft81X,
    Il3820,
    Jd79653A,
    Ra8875,
    Gc9A01,
    Ili9163C,
    Pcd8544,
    Uc8151D,
}

impl Controller {
    /// SPI clock for the controller, in Hz.
    pub fn clock_speed_hz(self) -> u32 {
        match self {
            Controller::St7789 => 20_000_000,
            Controller::St7735S => 40_000_000,
            Controller::Hx8357 => 26_000_000,
            Controller::Sh1107 => 8_000_000,
            Controller::Ili9481 => 16_000_000,
            Controller::Ili9486 => 20_000_000,
            Controller::Ili9488 => 40_000_000,
            Controller::Ili9341 => 40_000_000,
            Controller::Ili9163C => 40_000_000,
            Controller::Ft81X => 32_000_000,
            Controller::Pcd8544 => 4_000_000,
            // E-paper panels are slow; the UC8151D is specified to 10 MHz
            // but runs reliably well below that.
            Controller::Uc8151D | Controller::Il3820 | Controller::Jd79653A => 4_000_000,
            _ => 40_000_000,
        }
    }

    /// SPI transfer mode (CPOL/CPHA) for the controller.
    pub fn spi_mode(self) -> u8 {
        match self {
            Controller::St7789 => 2,
            _ => 0,
        }
    }

    /// Size in bytes of the display buffer handed to the rendering layer.
    ///
    /// TFT-class controllers use a 40-line partial buffer; the 1bpp panels
    /// need the full packed frame.
    pub fn buffer_size(self, hor_res: usize, ver_res: usize, mono_theme: bool) -> usize {
        match self {
            Controller::St7789
            | Controller::St7735S
            | Controller::St7796S
            | Controller::Hx8357
            | Controller::Ili9481
            | Controller::Ili9486
            | Controller::Ili9488
            | Controller::Ili9341
            | Controller::Ft81X
            | Controller::Ra8875
            | Controller::Gc9A01
            | Controller::Ili9163C => hor_res * 40,
            Controller::Sh1107 => hor_res * ver_res,
            Controller::Ssd1306 => {
                if mono_theme {
                    hor_res * (ver_res / 8)
                } else {
                    hor_res * ver_res
                }
            }
            Controller::Il3820 => ver_res * (hor_res / 8),
            Controller::Jd79653A | Controller::Uc8151D => (ver_res * ver_res) / 8,
            Controller::Pcd8544 => hor_res * (ver_res / 8),
        }
    }

    /// Maximum single SPI transfer the bus must be sized for.
    pub fn max_transfer_size(self, buffer_size: usize) -> usize {
        match self {
            // 18bpp controllers: 3 bytes per pixel on the wire
            Controller::Ili9481 | Controller::Ili9488 => buffer_size * 3,
            _ => buffer_size * 2,
        }
    }
}

/// SPI host peripheral the bus runs on. SPI1 is reserved for flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpiHost {
    #[default]
    Spi2,
    Spi3,
}

/// DMA channel selection for the SPI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DmaChannel {
    Disabled,
    /// Let the driver pick a free channel (newer targets).
    #[default]
    Auto,
    /// The proven channel on the original ESP32.
    Channel1,
    Channel2,
}

/// One SPI bus plus the device parameters of the display attached to it.
/// Immutable after bus initialization.
#[derive(Debug, Clone)]
pub struct DisplayBus {
    pub host: SpiHost,
    pub mosi: u8,
    pub sclk: u8,
    /// Only wired for controllers that are read back from.
    pub miso: Option<u8>,
    pub cs: Option<u8>,
    pub max_transfer_size: usize,
    pub dma: DmaChannel,
    pub baudrate_hz: u32,
    pub spi_mode: u8,
}

impl DisplayBus {
    /// Bus parameters for one controller at the given resolution.
    pub fn for_controller(controller: Controller, hor_res: usize, ver_res: usize) -> Self {
        let buffer = controller.buffer_size(hor_res, ver_res, true);
        Self {
            host: SpiHost::Spi2,
            mosi: DisplayPins::default().mosi,
            sclk: DisplayPins::default().sclk,
            miso: None,
            cs: Some(DisplayPins::default().cs),
            max_transfer_size: controller.max_transfer_size(buffer),
            dma: DmaChannel::default(),
            baudrate_hz: controller.clock_speed_hz(),
            spi_mode: controller.spi_mode(),
        }
    }
}

/// GPIO assignments for the display device sharing the bus.
#[derive(Debug, Clone)]
pub struct DisplayPins {
    pub mosi: u8,
    pub sclk: u8,
    pub cs: u8,
    /// Data/Command select (low = command, high = data)
    pub dc: u8,
    /// Hardware reset, left unwired on some boards
    pub rst: Option<u8>,
    /// Busy line, asserted low while the controller works
    pub busy: u8,
}

impl Default for DisplayPins {
    fn default() -> Self {
        Self {
            mosi: 11,
            sclk: 12,
            cs: 45,
            dc: 46,
            rst: Some(47),
            busy: 48,
        }
    }
}

/// Supported touch controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchController {
    Xpt2046,
    Stmpe610,
    Ft6X36,
}

impl TouchController {
    pub fn clock_speed_hz(self) -> u32 {
        match self {
            TouchController::Stmpe610 => 1_000_000,
            _ => 2_000_000,
        }
    }

    pub fn spi_mode(self) -> u8 {
        match self {
            TouchController::Stmpe610 => 1,
            _ => 0,
        }
    }
}

/// Touch device configuration; may share the display's bus.
#[derive(Debug, Clone)]
pub struct TouchConfig {
    pub controller: TouchController,
    pub host: SpiHost,
    pub mosi: u8,
    pub sclk: u8,
    pub miso: u8,
    pub cs: u8,
}

impl TouchConfig {
    /// Same MOSI and CLK pins as the display means a shared bus.
    pub fn shares_bus_with(&self, display: &DisplayBus) -> bool {
        self.mosi == display.mosi && self.sclk == display.sclk
    }
}

/// Rejects a display/touch combination that routes one physical bus through
/// two SPI hosts. Returns whether the bus is shared.
pub fn validate_bus_topology(display: &DisplayBus, touch: Option<&TouchConfig>) -> Result<bool> {
    let Some(touch) = touch else {
        return Ok(false);
    };

    if touch.shares_bus_with(display) {
        if touch.host != display.host {
            bail!("display and touch share MOSI/CLK pins but are assigned different SPI hosts");
        }
        return Ok(true);
    }

    Ok(false)
}

/// Panel geometry and mounting orientation for the UC8151D device.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub width: u16,
    pub height: u16,
    pub orientation: Orientation,
}

/// Panel orientations the controller's panel-setting register knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    PortraitInverted,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            orientation: Orientation::default(),
        }
    }
}

impl PanelConfig {
    /// Bytes per packed scan row, 8 pixels per byte.
    pub fn row_length(&self) -> usize {
        usize::from(self.height) / 8
    }

    /// Total bytes of one full 1bpp frame.
    pub fn frame_bytes(&self) -> usize {
        usize::from(self.width) * self.row_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uc8151d_buffer_is_full_packed_frame() {
        assert_eq!(Controller::Uc8151D.buffer_size(200, 200, true), 5000);
    }

    #[test]
    fn ssd1306_buffer_formulas() {
        // mono theme packs 8 rows per byte, the full-color theme does not
        assert_eq!(Controller::Ssd1306.buffer_size(128, 64, true), 128 * 8);
        assert_eq!(Controller::Ssd1306.buffer_size(128, 64, false), 128 * 64);
    }

    #[test]
    fn tft_buffers_are_forty_lines() {
        assert_eq!(Controller::Ili9341.buffer_size(320, 240, false), 320 * 40);
    }

    #[test]
    fn transfer_size_scales_with_pixel_depth() {
        assert_eq!(Controller::Ili9488.max_transfer_size(100), 300);
        assert_eq!(Controller::St7789.max_transfer_size(100), 200);
    }

    #[test]
    fn st7789_uses_mode_2() {
        assert_eq!(Controller::St7789.spi_mode(), 2);
        assert_eq!(Controller::Uc8151D.spi_mode(), 0);
    }

    #[test]
    fn shared_bus_requires_same_host() {
        let display = DisplayBus::for_controller(Controller::Uc8151D, 200, 200);
        let touch = TouchConfig {
            controller: TouchController::Xpt2046,
            host: SpiHost::Spi3,
            mosi: display.mosi,
            sclk: display.sclk,
            miso: 10,
            cs: 9,
        };
        assert!(validate_bus_topology(&display, Some(&touch)).is_err());

        let same_host = TouchConfig {
            host: display.host,
            ..touch
        };
        assert!(validate_bus_topology(&display, Some(&same_host)).unwrap());
    }

    #[test]
    fn separate_buses_are_fine() {
        let display = DisplayBus::for_controller(Controller::Uc8151D, 200, 200);
        let touch = TouchConfig {
            controller: TouchController::Stmpe610,
            host: SpiHost::Spi3,
            mosi: 35,
            sclk: 36,
            miso: 37,
            cs: 38,
        };
        assert!(!validate_bus_topology(&display, Some(&touch)).unwrap());
    }

    #[test]
    fn panel_geometry() {
        let panel = PanelConfig::default();
        assert_eq!(panel.row_length(), 25);
        assert_eq!(panel.frame_bytes(), 5000);
    }
}
