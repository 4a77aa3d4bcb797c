pub struct Cmd;
impl Cmd {
    // Bring-up
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_ON: u8 = 0x04;
    pub const VCOM_AND_DATA_INTERVAL: u8 = 0x50;

    // Update
    pub const DATA_START_TRANSMISSION_1: u8 = 0x10;
    pub const DATA_START_TRANSMISSION_2: u8 = 0x13;
    pub const DISPLAY_REFRESH: u8 = 0x12;

    // Power-down
    pub const POWER_OFF: u8 = 0x02;
    pub const DEEP_SLEEP: u8 = 0x07;
}

/*
UC8151D register map used by the GDEW0154M10 vendor demo:
0x00 - Panel Setting
0x02 - Power Off
0x04 - Power On
0x07 - Deep Sleep (requires 0xA5 check byte)
0x10 - Data Start Transmission 1 ("old" frame)
0x12 - Display Refresh
0x13 - Data Start Transmission 2 ("new" frame)
0x50 - VCOM and Data Interval Setting
*/
