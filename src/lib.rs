//! ESP32 driver crate for the GoodDisplay GDEW0154M10 e-paper panel and its
//! UltraChip UC8151D controller, plus the SPI display/touch configuration
//! tables the firmware builds its bus from.
//!
//! The hardware-facing pieces only compile for `target_os = "espidf"`; the
//! driver logic, configuration tables and framebuffer build and test on the
//! host against injected fakes.

pub mod config;
pub mod uc8151d;

pub use config::{Controller, DisplayBus, DisplayPins, Orientation, PanelConfig};
pub use uc8151d::driver::Uc8151d;
pub use uc8151d::framebuffer::{Framebuffer, Region};
pub use uc8151d::EpdError;
