//! UC8151D ePaper Display Driver
//!
//! Drives the [GoodDisplay GDEW0154M10](https://www.good-display.com/product/210.html)
//! DES panel and its UltraChip UC8151D controller over SPI.
//!
//! The controller has no partial-refresh mode, so every flush is a full-frame
//! redraw: the "old" frame RAM is cleared, the packed 1bpp buffer is streamed
//! row by row into the "new" frame RAM, and a refresh is triggered. The
//! controller holds its busy line low while it works; completion is observed
//! through a positive-edge interrupt rather than by polling.
//!
//! ### Usage
//!
//! 1. create a [`framebuffer::Framebuffer`] and draw onto it, preferably with
//!    [`embedded_graphics`](https://github.com/embedded-graphics/embedded-graphics)
//! 1. hand the packed buffer to [`driver::Uc8151d::full_update`]
//! 1. the call returns once the panel has refreshed and gone back to sleep,
//!    at which point the buffer may be reused
//!
//! Hardware access goes through the [`port::DisplayPort`] and
//! [`busy::BusyWait`] seams, so the whole command sequence is testable
//! against recording fakes.

pub mod busy;
pub mod driver;
pub mod framebuffer;
pub mod interface;
pub mod port;

mod cmd;
mod flag;

pub use cmd::Cmd;
pub use flag::Flag;

use core::fmt;

pub use display_interface::DisplayError;

/// Errors surfaced by the panel driver.
#[derive(Debug, Clone)]
pub enum EpdError {
    /// Bus or pin failure reported by the transport. Never retried here.
    Interface(DisplayError),
    /// The busy line did not deassert within the allowed window. The
    /// controller's internal state is unknown; the caller decides whether
    /// to re-run `init()`.
    BusyTimeout,
}

// DisplayError does not derive PartialEq; its variants carry no payload, so
// discriminant comparison is exact.
impl PartialEq for EpdError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EpdError::Interface(a), EpdError::Interface(b)) => {
                core::mem::discriminant(a) == core::mem::discriminant(b)
            }
            (EpdError::BusyTimeout, EpdError::BusyTimeout) => true,
            _ => false,
        }
    }
}

impl Eq for EpdError {}

impl From<DisplayError> for EpdError {
    fn from(e: DisplayError) -> Self {
        EpdError::Interface(e)
    }
}

impl fmt::Display for EpdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpdError::Interface(e) => write!(f, "display interface error: {:?}", e),
            EpdError::BusyTimeout => write!(f, "timed out waiting for the busy line"),
        }
    }
}

impl std::error::Error for EpdError {}
