//! UC8151D panel driver
//!
//! Implements the controller's full-update protocol as an ordered command
//! sequence over the transport: reset, power-up, register programming,
//! frame transfer, refresh trigger and power-down, with every long-running
//! controller operation synchronized to the busy line.
//!
//! ## Critical implementation details
//!
//! ### Triple hardware reset
//!
//! Bring-up resets the panel three times. The repetition comes from the
//! vendor demo code and has no documented rationale, but panels have been
//! seen to miss register writes without it, so it is preserved as-is.
//!
//! ### No partial refresh
//!
//! This controller class redraws the whole panel on every refresh. The
//! "old" frame RAM (0x10) is cleared with zero rows before the real frame
//! goes into the "new" frame RAM (0x13); skipping the clear leaves stale
//! pixels ghosting through the update.
//!
//! ### Timing constants
//!
//! The reset pulse widths and the 10 ms settle after the refresh command
//! are datasheet requirements, not tunables.

use crate::config::{Orientation, PanelConfig};
use crate::uc8151d::busy::{BusyWait, WAIT_FOREVER};
use crate::uc8151d::interface::DisplayInterface;
use crate::uc8151d::port::DisplayPort;
use crate::uc8151d::{Cmd, DisplayError, EpdError, Flag};

/// Datasheet: reset must be held low for at least 10 ms; the vendor demo
/// leaves 20.
const RESET_LOW_MS: u32 = 20;
/// Settle time after releasing reset before the first command.
const RESET_SETTLE_MS: u32 = 10;
/// Hardware reset repetition at bring-up, from the vendor demo code.
const RESET_REPEAT: usize = 3;
/// Datasheet: wait before the busy line is meaningful after a refresh.
const REFRESH_SETTLE_MS: u32 = 10;

/// Driver states, advanced strictly in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Resetting,
    PoweringUp,
    Configuring,
    Idle,
    Updating,
    Refreshing,
    Sleeping,
}

/// One self-contained protocol step: an opcode, up to three payload bytes,
/// and whether the controller must be waited for afterwards.
struct SeqStep {
    cmd: u8,
    data: [u8; 3],
    len: usize,
    wait_busy: bool,
}

impl SeqStep {
    const fn make(cmd: u8, data: &[u8], wait_busy: bool) -> Self {
        let mut buf = [0u8; 3];
        let mut i = 0;
        while i < data.len() {
            buf[i] = data[i];
            i += 1;
        }
        Self {
            cmd,
            data: buf,
            len: data.len(),
            wait_busy,
        }
    }

    /// Fire-and-forget step.
    const fn new(cmd: u8, data: &[u8]) -> Self {
        Self::make(cmd, data, false)
    }

    /// Step the controller acknowledges through the busy line.
    const fn with_busy_wait(cmd: u8, data: &[u8]) -> Self {
        Self::make(cmd, data, true)
    }
}

/// Power-down sub-sequence: float the border, cut panel power once the
/// controller is done, then deep-sleep with the magic check byte.
const SLEEP_SEQUENCE: [SeqStep; 3] = [
    SeqStep::new(Cmd::VCOM_AND_DATA_INTERVAL, &[Flag::VCOM_INTERVAL_SLEEP]),
    SeqStep::with_busy_wait(Cmd::POWER_OFF, &[]),
    SeqStep::new(Cmd::DEEP_SLEEP, &[Flag::DEEP_SLEEP_CHECK]),
];

/// UC8151D E-Paper Display Driver
///
/// ## Type parameters
///
/// - `P` - hardware port carrying SPI and the DC/RST pins
/// - `B` - busy-line ready latch
pub struct Uc8151d<P, B> {
    interface: DisplayInterface<P>,
    busy: B,
    panel: PanelConfig,
    state: State,
}

impl<P, B> Uc8151d<P, B>
where
    P: DisplayPort,
    B: BusyWait,
{
    /// Wraps the port without touching the hardware; call [`init`] next.
    ///
    /// [`init`]: Uc8151d::init
    pub fn new(port: P, busy: B, panel: PanelConfig) -> Self {
        Uc8151d {
            interface: DisplayInterface::new(port),
            busy,
            panel,
            state: State::Uninitialized,
        }
    }

    /// Current protocol state, for diagnostics.
    pub fn state(&self) -> State {
        self.state
    }

    pub fn panel(&self) -> &PanelConfig {
        &self.panel
    }

    /// Brings the panel up and settles in `Idle`.
    pub fn init(&mut self) -> Result<(), EpdError> {
        self.panel_init()?;
        self.state = State::Idle;
        log::info!("Panel initialised");
        Ok(())
    }

    /// Full-frame update from a packed 1bpp buffer.
    ///
    /// The buffer is borrowed for the duration of the call only; once this
    /// returns the rendering layer may reuse it. On success the panel has
    /// refreshed and been put back to deep sleep. A busy-wait timeout
    /// aborts the sequence and leaves the panel in whatever electrical
    /// state it was in; re-run [`init`] before retrying.
    ///
    /// [`init`]: Uc8151d::init
    pub fn full_update(&mut self, frame: &[u8]) -> Result<(), EpdError> {
        let row_len = self.panel.row_length();
        let height = usize::from(self.panel.height);

        if frame.len() != self.panel.frame_bytes() {
            log::error!(
                "frame buffer is {} bytes, panel needs {}",
                frame.len(),
                self.panel.frame_bytes()
            );
            return Err(EpdError::Interface(DisplayError::OutOfBoundsError));
        }

        // The panel sleeps between updates, so every update starts with a
        // full bring-up.
        self.panel_init()?;

        self.state = State::Updating;
        log::info!("Writing full frame, {} rows of {} bytes", height, row_len);

        // Clear the "old" frame RAM so stale pixels do not ghost through
        let zero_row = vec![0u8; row_len];
        self.interface.cmd(Cmd::DATA_START_TRANSMISSION_1)?;
        for _ in 0..height {
            self.interface.data(&zero_row)?;
        }

        // Stream the real frame row by row into the "new" frame RAM
        self.interface.cmd(Cmd::DATA_START_TRANSMISSION_2)?;
        for row in frame.chunks(row_len).take(height) {
            self.interface.data(row)?;
        }

        self.state = State::Refreshing;
        self.busy.arm()?;
        self.interface.cmd(Cmd::DISPLAY_REFRESH)?;
        self.interface.delay_ms(REFRESH_SETTLE_MS);
        self.busy.wait(WAIT_FOREVER)?;

        self.sleep()?;
        self.state = State::Idle;
        log::info!("Full update complete");
        Ok(())
    }

    /// Panel bring-up: triple reset, power-on with busy-wait, orientation
    /// and VCOM programming.
    fn panel_init(&mut self) -> Result<(), EpdError> {
        self.state = State::Resetting;
        for _ in 0..RESET_REPEAT {
            self.reset()?;
        }

        self.state = State::PoweringUp;
        self.run_step(&SeqStep::with_busy_wait(Cmd::POWER_ON, &[]))?;

        self.state = State::Configuring;
        let panel_setting = match self.panel.orientation {
            Orientation::Portrait => Flag::PANEL_PORTRAIT,
            Orientation::PortraitInverted => Flag::PANEL_PORTRAIT_INVERTED,
        };
        self.run_step(&SeqStep::new(Cmd::PANEL_SETTING, &[panel_setting]))?;
        self.run_step(&SeqStep::new(
            Cmd::VCOM_AND_DATA_INTERVAL,
            &[Flag::VCOM_INTERVAL_DEFAULT],
        ))?;

        Ok(())
    }

    /// Hardware reset pulse. No-op when no reset line is wired.
    fn reset(&mut self) -> Result<(), EpdError> {
        if !self.interface.has_reset() {
            return Ok(());
        }

        self.interface.set_rst(false)?;
        self.interface.delay_ms(RESET_LOW_MS);
        self.interface.set_rst(true)?;
        self.interface.delay_ms(RESET_SETTLE_MS);
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), EpdError> {
        self.state = State::Sleeping;
        self.run_sequence(&SLEEP_SEQUENCE)
    }

    fn run_sequence(&mut self, steps: &[SeqStep]) -> Result<(), EpdError> {
        for step in steps {
            self.run_step(step)?;
        }
        Ok(())
    }

    fn run_step(&mut self, step: &SeqStep) -> Result<(), EpdError> {
        // Arm before the command: the interrupt must be live before the
        // controller can assert busy.
        if step.wait_busy {
            self.busy.arm()?;
        }

        if step.len > 0 {
            self.interface
                .cmd_with_data(step.cmd, &step.data[..step.len])?;
        } else {
            self.interface.cmd(step.cmd)?;
        }

        if step.wait_busy {
            self.busy.wait(WAIT_FOREVER)?;
        }

        Ok(())
    }
}
