// GDEQ0426T82 (4.26", 800x480) on an SSD1677.
// BW RAM (0x24) is the new frame, RED RAM (0x26) the previous one used
// by the differential DU waveform. Gates are wired in reverse so the RAM
// window runs Y-decrementing from a flipped origin. BUSY is active high.

use super::epd::Plane;
use super::interface::PanelIo;
use super::panel::PanelDescriptor;
use crate::ui::Region;

#[allow(dead_code)]
mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const BOOSTER_SOFT_START: u8 = 0x0C;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMPERATURE_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_1: u8 = 0x21;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    pub const WRITE_RAM_RED: u8 = 0x26;
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

pub use cmd::{DEEP_SLEEP, MASTER_ACTIVATION, WRITE_RAM_BW, WRITE_RAM_RED};

const SW_RESET_MS: u32 = 10;

fn init_display<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    if io.state().hibernating {
        io.reset();
    }
    io.write_command(cmd::SW_RESET);
    io.delay_ms(SW_RESET_MS);

    io.write_command_data(&[cmd::TEMPERATURE_SENSOR, 0x80]);
    io.write_command_data(&[cmd::BOOSTER_SOFT_START, 0xAE, 0xC7, 0xC3, 0xC0, 0x80]);
    let [gl, gh] = (panel.height - 1).to_le_bytes();
    io.write_command_data(&[cmd::DRIVER_OUTPUT_CONTROL, gl, gh, 0x02]);
    io.write_command_data(&[cmd::BORDER_WAVEFORM, 0x01]);
    set_ram_area(io, panel, Region::new(0, 0, panel.width, panel.height));

    io.state_mut().init_done = true;
}

fn set_ram_area<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor, area: Region) {
    let y_flipped = panel.height - area.y - area.h;
    let [xl, xh] = area.x.to_le_bytes();
    let [xel, xeh] = (area.x + area.w - 1).to_le_bytes();
    let [yl, yh] = y_flipped.to_le_bytes();
    let [yel, yeh] = (y_flipped + area.h - 1).to_le_bytes();

    // X increment, Y decrement
    io.write_command_data(&[cmd::DATA_ENTRY_MODE, 0x01]);
    io.write_command_data(&[cmd::SET_RAM_X_RANGE, xl, xh, xel, xeh]);
    io.write_command_data(&[cmd::SET_RAM_Y_RANGE, yel, yeh, yl, yh]);
    io.write_command_data(&[cmd::SET_RAM_X_COUNTER, xl, xh]);
    io.write_command_data(&[cmd::SET_RAM_Y_COUNTER, yel, yeh]);
}

pub fn prepare_write<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    if !io.state().init_done {
        init_display(io, panel);
    }
}

pub fn write_ram<IO: PanelIo, I: IntoIterator<Item = u8>>(
    io: &mut IO,
    panel: &PanelDescriptor,
    plane: Plane,
    area: Region,
    data: I,
) {
    set_ram_area(io, panel, area);
    io.write_command(match plane {
        Plane::Current => cmd::WRITE_RAM_BW,
        Plane::Previous => cmd::WRITE_RAM_RED,
    });
    io.write_data_iter(data);
}

pub fn update_full<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    if !io.state().init_done {
        init_display(io, panel);
    }
    // bypass RED as 0, BW normal; GC waveform with power up and down
    io.write_command_data(&[cmd::DISPLAY_UPDATE_CONTROL_1, 0x40, 0x00]);
    io.write_command_data(&[cmd::DISPLAY_UPDATE_CONTROL_2, 0xF7]);
    io.write_command(cmd::MASTER_ACTIVATION);
    io.wait_while_busy("update full", panel.timing.full_refresh_ms);

    let state = io.state_mut();
    state.power_on = false;
    state.using_partial_mode = false;
}

pub fn update_window<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor, area: Region) {
    if !io.state().init_done {
        init_display(io, panel);
    }
    set_ram_area(io, panel, area);
    // RED normal, BW normal; DU waveform, analog stays up
    io.write_command_data(&[cmd::DISPLAY_UPDATE_CONTROL_1, 0x00, 0x00]);
    io.write_command_data(&[cmd::DISPLAY_UPDATE_CONTROL_2, 0xFC]);
    io.write_command(cmd::MASTER_ACTIVATION);
    io.wait_while_busy("update part", panel.timing.partial_refresh_ms);

    let state = io.state_mut();
    state.power_on = true;
    state.powered_down = false;
    state.using_partial_mode = true;
}

pub fn power_off<IO: PanelIo>(io: &mut IO, panel: &PanelDescriptor) {
    io.write_command_data(&[cmd::DISPLAY_UPDATE_CONTROL_2, 0x83]);
    io.write_command(cmd::MASTER_ACTIVATION);
    io.wait_while_busy("power off", panel.timing.power_off_ms);
}

pub fn deep_sleep<IO: PanelIo>(io: &mut IO, _panel: &PanelDescriptor) {
    io.write_command_data(&[cmd::DEEP_SLEEP, 0x01]);
}
