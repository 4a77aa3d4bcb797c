//! Busy-line synchronization
//!
//! The UC8151D holds its busy line low while it processes a command and
//! raises it when ready. Instead of polling, the line's rising edge fires a
//! GPIO interrupt that latches a FreeRTOS task notification; the driver task
//! sleeps in [`BusyWait::wait`] until the latch is set or a timeout expires.
//!
//! esp-idf disables a GPIO interrupt after it fires, so the latch must be
//! re-armed for every busy cycle. [`BusyWait::arm`] is therefore called
//! *before* the command that will assert the busy line. The notification is
//! latched, so an edge landing between the command and the `wait` call is
//! not lost.

use crate::uc8151d::EpdError;

/// Wait forever; any positive value is a hard upper bound in milliseconds.
pub const WAIT_FOREVER: u32 = 0;

/// A single-bit ready latch set from interrupt context.
pub trait BusyWait {
    /// Enable the busy-line interrupt for the next cycle. Call before
    /// sending the command whose completion will be awaited.
    fn arm(&mut self) -> Result<(), EpdError>;

    /// Block until the latch is set, clearing it, or until `timeout_ms`
    /// elapses. [`WAIT_FOREVER`] (0) blocks indefinitely.
    fn wait(&mut self, timeout_ms: u32) -> Result<(), EpdError>;
}

#[cfg(target_os = "espidf")]
pub use esp::BusyLine;

#[cfg(target_os = "espidf")]
mod esp {
    use core::num::NonZeroU32;

    use display_interface::DisplayError;
    use esp_idf_svc::hal::delay;
    use esp_idf_svc::hal::delay::TickType;
    use esp_idf_svc::hal::gpio::{AnyIOPin, Input, InterruptType, PinDriver, Pull};
    use esp_idf_svc::hal::task::notification::Notification;
    use esp_idf_svc::sys::EspError;

    use super::{BusyWait, WAIT_FOREVER};
    use crate::uc8151d::EpdError;

    /// Interrupt-driven ready latch on the panel's busy pin.
    pub struct BusyLine<'d> {
        pin: PinDriver<'d, AnyIOPin, Input>,
        notification: Notification,
    }

    impl<'d> BusyLine<'d> {
        /// Configures the busy input (pulled up, rising edge) and hooks its
        /// interrupt to a task notification. An allocation failure here is
        /// fatal to display bring-up; the caller logs and aborts without
        /// touching the panel.
        pub fn new(pin: AnyIOPin) -> Result<Self, EspError> {
            let mut pin = PinDriver::input(pin)?;
            pin.set_pull(Pull::Up)?;
            pin.set_interrupt_type(InterruptType::PosEdge)?;

            let notification = Notification::new();
            let notifier = notification.notifier();

            // Safety: the notifier holds a weak reference to the task behind
            // `notification`, which lives as long as `self`; the subscription
            // is dropped with the pin driver. The callback runs in ISR
            // context and only latches the notification, yielding to a
            // higher-priority waiter immediately instead of at interrupt
            // exit.
            unsafe {
                pin.subscribe(move || {
                    notifier.notify_and_yield(NonZeroU32::new(1).unwrap());
                })?;
            }

            Ok(Self { pin, notification })
        }
    }

    impl BusyWait for BusyLine<'_> {
        fn arm(&mut self) -> Result<(), EpdError> {
            // No Busy variant in DisplayError; reuse DCError like the rest
            // of the ecosystem does for control-pin failures.
            self.pin
                .enable_interrupt()
                .map_err(|_| EpdError::Interface(DisplayError::DCError))
        }

        fn wait(&mut self, timeout_ms: u32) -> Result<(), EpdError> {
            let ticks = if timeout_ms == WAIT_FOREVER {
                delay::BLOCK
            } else {
                TickType::new_millis(u64::from(timeout_ms)).ticks()
            };

            match self.notification.wait(ticks) {
                Some(_) => Ok(()),
                None => Err(EpdError::BusyTimeout),
            }
        }
    }
}
