//! Command/data transport over the display port
//!
//! Thin wrapper discriminating command bytes from payload bytes via the DC
//! pin. Every send first drains pending bus transfers, so a mode transition
//! can never overlap a transfer that was queued under the previous level.
//! Transfer failures are propagated untouched; the transport knows nothing
//! about controller semantics and never retries.

use display_interface::DisplayError;

use crate::uc8151d::port::{DcLevel, DisplayPort};

pub struct DisplayInterface<P> {
    port: P,
}

impl<P> DisplayInterface<P> {
    pub fn new(port: P) -> Self {
        DisplayInterface { port }
    }
}

impl<P: DisplayPort> DisplayInterface<P> {
    /// Basic function for sending commands
    pub(crate) fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        self.port.drain()?;
        self.port.set_dc(DcLevel::Command)?;

        match self.port.write(&[command]) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for command 0x{:02X}: {:?}", command, e);
                Err(e)
            }
        }
    }

    /// Basic function for sending an array of u8-values of data
    pub(crate) fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.port.drain()?;
        self.port.set_dc(DcLevel::Data)?;
        self.port.write(data)
    }

    /// Basic function for sending a command and the data belonging to it.
    pub(crate) fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(command)?;
        self.data(data)
    }

    pub(crate) fn has_reset(&self) -> bool {
        self.port.has_reset()
    }

    pub(crate) fn set_rst(&mut self, high: bool) -> Result<(), DisplayError> {
        self.port.set_rst(high)
    }

    pub(crate) fn delay_ms(&mut self, ms: u32) {
        self.port.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::uc8151d::port::testutil::{Op, RecordingPort};

    fn interface() -> (DisplayInterface<RecordingPort>, Rc<RefCell<Vec<Op>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (DisplayInterface::new(RecordingPort::new(log.clone())), log)
    }

    #[test]
    fn command_drains_then_drives_dc_low() {
        let (mut iface, log) = interface();
        iface.cmd(0x12).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Op::Drain,
                Op::Dc(DcLevel::Command),
                Op::Write(vec![0x12]),
            ]
        );
    }

    #[test]
    fn data_drains_then_drives_dc_high() {
        let (mut iface, log) = interface();
        iface.data(&[0xAA, 0xBB]).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Op::Drain,
                Op::Dc(DcLevel::Data),
                Op::Write(vec![0xAA, 0xBB]),
            ]
        );
    }

    #[test]
    fn command_and_payload_never_share_a_dc_level() {
        let (mut iface, log) = interface();
        iface.cmd_with_data(0x50, &[0x97]).unwrap();
        iface.data(&[0xF7]).unwrap();

        // every write is preceded by a drain and a fresh DC level
        let ops = log.borrow();
        for (i, op) in ops.iter().enumerate() {
            if let Op::Write(_) = op {
                assert!(matches!(ops[i - 1], Op::Dc(_)));
                assert_eq!(ops[i - 2], Op::Drain);
            }
        }
        assert_eq!(ops[1], Op::Dc(DcLevel::Command));
        assert_eq!(ops[4], Op::Dc(DcLevel::Data));
        assert_eq!(ops[7], Op::Dc(DcLevel::Data));
    }

    #[test]
    fn bus_failure_propagates_without_retry() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut port = RecordingPort::new(log.clone());
        port.fail_writes = true;
        let mut iface = DisplayInterface::new(port);

        assert!(matches!(iface.cmd(0x04), Err(DisplayError::BusWriteError)));
        assert!(matches!(iface.data(&[0x00]), Err(DisplayError::BusWriteError)));
        // nothing was recorded as written
        assert!(log.borrow().iter().all(|op| !matches!(op, Op::Write(_))));
    }
}
