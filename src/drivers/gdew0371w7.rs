// GDEW0371W7 (3.7", 240x416) on a UC81xx-family controller.
// Two RAM planes: 0x10 holds what the panel shows, 0x13 what it should
// show next. Full refresh uses the OTP waveform; partial refresh loads
// the register LUTs below and compares the planes inside a window set
// by 0x90 between PARTIAL_IN/PARTIAL_OUT. BUSY is active low.

use super::epd::Plane;
use super::interface::PanelIo;
use super::panel::PanelDescriptor;
use crate::ui::Region;

#[allow(dead_code)]
mod cmd {
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_SETTING: u8 = 0x01;
    pub const POWER_OFF: u8 = 0x02;
    pub const POWER_ON: u8 = 0x04;
    pub const BOOSTER_SOFT_START: u8 = 0x06;
    pub const DEEP_SLEEP: u8 = 0x07;
    pub const DATA_START_OLD: u8 = 0x10;
    pub const DISPLAY_REFRESH: u8 = 0x12;
    pub const DATA_START_NEW: u8 = 0x13;
    pub const LUT_VCOM: u8 = 0x20;
    pub const LUT_WW: u8 = 0x21;
    pub const LUT_BW: u8 = 0x22;
    pub const LUT_WB: u8 = 0x23;
    pub const LUT_BB: u8 = 0x24;
    pub const PLL_CONTROL: u8 = 0x30;
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    pub const RESOLUTION: u8 = 0x61;
    pub const VCOM_DC: u8 = 0x82;
    pub const PARTIAL_WINDOW: u8 = 0x90;
    pub const PARTIAL_IN: u8 = 0x91;
    pub const PARTIAL_OUT: u8 = 0x92;
}

pub use cmd::{
    DATA_START_NEW, DATA_START_OLD, DEEP_SLEEP, DISPLAY_REFRESH, PARTIAL_IN, PARTIAL_OUT,
    PARTIAL_WINDOW, POWER_OFF, POWER_ON,
};

const DEEP_SLEEP_CHECK: u8 = 0xA5;

// panel setting: LUT from OTP vs from registers
const PSR_OTP_LUT: u8 = 0x1F;
const PSR_REG_LUT: u8 = 0x3F;

// single-phase partial waveform; the rest of each table is zero
const fn lut<const N: usize>(level: u8) -> [u8; N] {
    let mut t = [0u8; N];
    t[0] = level;
    t[1] = 0x19;
    t[2] = 0x01;
    t[5] = 0x01;
    t
}

const LUT_VCOM_PARTIAL: [u8; 44] = lut(0x00);
const LUT_WW_PARTIAL: [u8; 42] = lut(0x00);
const LUT_BW_PARTIAL: [u8; 42] = lut(0x80);
const LUT_WB_PARTIAL: [u8; 42] = lut(0x40);
const LUT_BB_PARTIAL: [u8; 42] = lut(0x00);

fn init_display<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    if io.state().hibernating {
        io.reset();
    }
    let [wh, wl] = panel.width.to_be_bytes();
    let [hh, hl] = panel.height.to_be_bytes();

    io.write_command_data(&[cmd::POWER_SETTING, 0x03, 0x00, 0x2B, 0x2B, 0x03]);
    io.write_command_data(&[cmd::BOOSTER_SOFT_START, 0x17, 0x17, 0x17]);
    io.write_command_data(&[cmd::PLL_CONTROL, 0x3A]);
    io.write_command_data(&[cmd::RESOLUTION, wh, wl, hh, hl]);
    io.write_command_data(&[cmd::VCOM_DC, 0x12]);
    io.write_command_data(&[cmd::VCOM_DATA_INTERVAL, 0x97]);
    io.state_mut().init_done = true;
}

fn power_on<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    if !io.state().power_on {
        io.write_command(cmd::POWER_ON);
        io.wait_while_busy("power on", panel.timing.power_on_ms);
    }
    let state = io.state_mut();
    state.power_on = true;
    state.powered_down = false;
}

fn init_full<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    init_display(io, panel);
    io.write_command_data(&[cmd::PANEL_SETTING, PSR_OTP_LUT]);
    power_on(io, panel);
    io.state_mut().using_partial_mode = false;
}

fn init_part<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    init_display(io, panel);
    io.write_command_data(&[cmd::PANEL_SETTING, PSR_REG_LUT]);
    io.write_command(cmd::LUT_VCOM);
    io.write_data(&LUT_VCOM_PARTIAL);
    io.write_command(cmd::LUT_WW);
    io.write_data(&LUT_WW_PARTIAL);
    io.write_command(cmd::LUT_BW);
    io.write_data(&LUT_BW_PARTIAL);
    io.write_command(cmd::LUT_WB);
    io.write_data(&LUT_WB_PARTIAL);
    io.write_command(cmd::LUT_BB);
    io.write_data(&LUT_BB_PARTIAL);
    power_on(io, panel);
    io.state_mut().using_partial_mode = true;
}

// x rounds down, xe up to the last pixel of its byte
fn set_partial_ram_area<IO: PanelIo>(io: &mut IO, area: Region) {
    let xe = (area.x + area.w - 1) | 0x0007;
    let ye = area.y + area.h - 1;
    let x = area.x & !7;
    let [xh, xl] = x.to_be_bytes();
    let [xeh, xel] = xe.to_be_bytes();
    let [yh, yl] = area.y.to_be_bytes();
    let [yeh, yel] = ye.to_be_bytes();
    io.write_command_data(&[cmd::PARTIAL_WINDOW, xh, xl, xeh, xel, yh, yl, yeh, yel, 0x01]);
}

pub fn prepare_write<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    // RAM writes go through the partial LUT setup so a later window
    // refresh can diff against the old plane
    if !io.state().using_partial_mode {
        init_part(io, panel);
    }
}

pub fn write_ram<IO: PanelIo, I: IntoIterator<Item = u8>>(
    io: &mut IO,
    panel: &PanelDescriptor,
    plane: Plane,
    area: Region,
    data: I,
) {
    let whole = area == Region::new(0, 0, panel.width, panel.height);
    if !whole {
        io.write_command(cmd::PARTIAL_IN);
        set_partial_ram_area(io, area);
    }
    io.write_command(match plane {
        Plane::Current => cmd::DATA_START_NEW,
        Plane::Previous => cmd::DATA_START_OLD,
    });
    io.write_data_iter(data);
    if !whole {
        io.write_command(cmd::PARTIAL_OUT);
    }
}

pub fn update_full<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    if io.state().using_partial_mode || !io.state().init_done {
        init_full(io, panel);
    } else {
        power_on(io, panel);
    }
    io.write_command(cmd::DISPLAY_REFRESH);
    io.wait_while_busy("update full", panel.timing.full_refresh_ms);
}

pub fn update_window<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor, area: Region) {
    if !io.state().using_partial_mode {
        init_part(io, panel);
    }
    io.write_command(cmd::PARTIAL_IN);
    set_partial_ram_area(io, area);
    io.write_command(cmd::DISPLAY_REFRESH);
    io.wait_while_busy("update part", panel.timing.partial_refresh_ms);
    io.write_command(cmd::PARTIAL_OUT);
}

pub fn power_off<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    io.write_command(cmd::POWER_OFF);
    io.wait_while_busy("power off", panel.timing.power_off_ms);
}

pub fn deep_sleep<IO: PanelIo>(io: &mut IO, _panel: &PanelDescriptor) {
    io.write_command_data(&[cmd::DEEP_SLEEP, DEEP_SLEEP_CHECK]);
}
