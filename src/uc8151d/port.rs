//! Injected hardware port for the display
//!
//! The driver never touches SPI or GPIO directly; everything funnels through
//! [`DisplayPort`]. On the device the port wraps the esp-idf SPI device
//! driver and pin drivers. In tests a recording fake stands in and lets the
//! sequence assertions in `driver.rs` check every byte on the wire.

use display_interface::DisplayError;

/// Level of the data/command select pin for the next transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DcLevel {
    /// DC low: the controller parses the bytes as a command opcode.
    Command,
    /// DC high: the bytes are payload for the preceding command.
    Data,
}

/// Hardware access seam between the panel driver and one SPI device.
///
/// Transfers for the device must never be in flight when `set_dc` changes
/// level; callers guarantee this by issuing `drain` first.
pub trait DisplayPort {
    /// Block until every transfer previously queued for this device has
    /// completed.
    fn drain(&mut self) -> Result<(), DisplayError>;

    /// Drive the data/command select pin.
    fn set_dc(&mut self, level: DcLevel) -> Result<(), DisplayError>;

    /// Whether a reset line is wired at all.
    fn has_reset(&self) -> bool;

    /// Drive the reset line. No-op when no reset line is wired.
    fn set_rst(&mut self, high: bool) -> Result<(), DisplayError>;

    /// Queue `bytes` for transfer to the device.
    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    /// Busy-delay the calling task.
    fn delay_ms(&mut self, ms: u32);
}

#[cfg(target_os = "espidf")]
pub use esp::EspDisplayPort;

#[cfg(target_os = "espidf")]
mod esp {
    use display_interface::DisplayError;
    use esp_idf_svc::hal::delay::Delay;
    use esp_idf_svc::hal::gpio::{AnyOutputPin, Output, PinDriver};
    use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriver};
    use esp_idf_svc::sys::EspError;

    use super::{DcLevel, DisplayPort};

    /// [`DisplayPort`] over an esp-idf SPI device and its control pins.
    pub struct EspDisplayPort<'d> {
        spi: SpiDeviceDriver<'d, SpiDriver<'d>>,
        /// Data/Command control pin (high for data, low for command)
        dc: PinDriver<'d, AnyOutputPin, Output>,
        /// Reset line, left unwired on some boards
        rst: Option<PinDriver<'d, AnyOutputPin, Output>>,
        delay: Delay,
    }

    impl<'d> EspDisplayPort<'d> {
        pub fn new(
            spi: SpiDeviceDriver<'d, SpiDriver<'d>>,
            dc: AnyOutputPin,
            rst: Option<AnyOutputPin>,
        ) -> Result<Self, EspError> {
            let dc = PinDriver::output(dc)?;
            let rst = match rst {
                Some(pin) => Some(PinDriver::output(pin)?),
                None => None,
            };

            Ok(Self {
                spi,
                dc,
                rst,
                delay: Delay::default(),
            })
        }
    }

    impl DisplayPort for EspDisplayPort<'_> {
        fn drain(&mut self) -> Result<(), DisplayError> {
            // `SpiDeviceDriver::write` runs each transaction to completion
            // before returning, so nothing can be pending here. The barrier
            // stays in the contract for queued backends.
            Ok(())
        }

        fn set_dc(&mut self, level: DcLevel) -> Result<(), DisplayError> {
            let res = match level {
                DcLevel::Command => self.dc.set_low(),
                DcLevel::Data => self.dc.set_high(),
            };
            res.map_err(|_| DisplayError::DCError)
        }

        fn has_reset(&self) -> bool {
            self.rst.is_some()
        }

        fn set_rst(&mut self, high: bool) -> Result<(), DisplayError> {
            let Some(rst) = self.rst.as_mut() else {
                return Ok(());
            };
            let res = if high { rst.set_high() } else { rst.set_low() };
            res.map_err(|_| DisplayError::RSError)
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
            self.spi.write(bytes).map_err(|e| {
                log::error!("SPI write error for {} byte transfer: {:?}", bytes.len(), e);
                DisplayError::BusWriteError
            })
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delay.delay_ms(ms);
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::cell::RefCell;
    use std::rc::Rc;

    use display_interface::DisplayError;

    use super::{DcLevel, DisplayPort};
    use crate::uc8151d::busy::BusyWait;
    use crate::uc8151d::EpdError;

    /// Everything the driver did to the hardware, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Op {
        Drain,
        Dc(DcLevel),
        Write(Vec<u8>),
        Rst(bool),
        DelayMs(u32),
        BusyArm,
        BusyWait(u32),
    }

    pub type OpLog = Rc<RefCell<Vec<Op>>>;

    pub struct RecordingPort {
        pub log: OpLog,
        pub has_reset: bool,
        pub fail_writes: bool,
    }

    impl RecordingPort {
        pub fn new(log: OpLog) -> Self {
            Self {
                log,
                has_reset: true,
                fail_writes: false,
            }
        }
    }

    impl DisplayPort for RecordingPort {
        fn drain(&mut self) -> Result<(), DisplayError> {
            self.log.borrow_mut().push(Op::Drain);
            Ok(())
        }

        fn set_dc(&mut self, level: DcLevel) -> Result<(), DisplayError> {
            self.log.borrow_mut().push(Op::Dc(level));
            Ok(())
        }

        fn has_reset(&self) -> bool {
            self.has_reset
        }

        fn set_rst(&mut self, high: bool) -> Result<(), DisplayError> {
            self.log.borrow_mut().push(Op::Rst(high));
            Ok(())
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
            if self.fail_writes {
                return Err(DisplayError::BusWriteError);
            }
            self.log.borrow_mut().push(Op::Write(bytes.to_vec()));
            Ok(())
        }

        fn delay_ms(&mut self, ms: u32) {
            self.log.borrow_mut().push(Op::DelayMs(ms));
        }
    }

    /// Busy line that is always ready, or that times out on wait number
    /// `fail_on_wait` (1-based).
    pub struct FakeBusy {
        pub log: OpLog,
        pub fail_on_wait: Option<usize>,
        waits: usize,
    }

    impl FakeBusy {
        pub fn new(log: OpLog) -> Self {
            Self {
                log,
                fail_on_wait: None,
                waits: 0,
            }
        }

        pub fn failing_on(log: OpLog, wait: usize) -> Self {
            Self {
                log,
                fail_on_wait: Some(wait),
                waits: 0,
            }
        }
    }

    impl BusyWait for FakeBusy {
        fn arm(&mut self) -> Result<(), EpdError> {
            self.log.borrow_mut().push(Op::BusyArm);
            Ok(())
        }

        fn wait(&mut self, timeout_ms: u32) -> Result<(), EpdError> {
            self.waits += 1;
            if self.fail_on_wait == Some(self.waits) {
                return Err(EpdError::BusyTimeout);
            }
            self.log.borrow_mut().push(Op::BusyWait(timeout_ms));
            Ok(())
        }
    }
}
