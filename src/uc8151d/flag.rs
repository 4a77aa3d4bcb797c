/// Data bytes written after UC8151D commands.
///
/// Values come straight from the GDEW0154M10 datasheet and vendor demo code;
/// none of them are tunable.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Panel Setting (0x00) flags
    pub const PANEL_PORTRAIT: u8 = 0x1F;
    pub const PANEL_PORTRAIT_INVERTED: u8 = 0x13;

    // VCOM and Data Interval (0x50) flags
    pub const VCOM_INTERVAL_DEFAULT: u8 = 0x97;
    /// Floats the border ahead of power-off so it does not ghost.
    pub const VCOM_INTERVAL_SLEEP: u8 = 0xF7;

    // Deep Sleep (0x07) flags
    /// The controller ignores the deep-sleep command without this check byte.
    pub const DEEP_SLEEP_CHECK: u8 = 0xA5;
}
