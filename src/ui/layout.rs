// Status screen geometry, computed once from the screen size and font.
// Rows top to bottom: axis frame, heaters, fans, progress, status line.

use embedded_graphics::{prelude::*, primitives::Rectangle};

use super::widget::Region;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    pub width: u16,
    pub height: u16,
    pub ascent: u16,
    /// below the baseline, negative
    pub descent: i16,
}

impl FontMetrics {
    pub const FONT_9X15: Self = Self {
        width: 9,
        height: 15,
        ascent: 10,
        descent: -3,
    };
}

pub const ICON_SIZE: u16 = 24;
pub const HEATER_X0: u16 = 12;
pub const HEATER_PITCH: u16 = 54;
pub const FAN_PITCH: u16 = 60;
pub const PROGRESS_BAR_H: u16 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusLayout {
    pub width: u16,
    pub height: u16,
    pub font: FontMetrics,
    pub axis_baseline: i32,
    pub axis_spacing: i32,
    pub frame_height: u32,
    pub heater_target_baseline: i32,
    pub heater_icon_y: i32,
    pub heater_current_baseline: i32,
    pub fan_icon_y: i32,
    pub fan_text_baseline: i32,
    pub progress_text_baseline: i32,
    pub progress_y: i32,
    pub status_baseline: i32,
    pub status_columns: usize,
    pub heater_columns: usize,
    pub fan_columns: usize,
}

impl StatusLayout {
    pub const fn new(width: u16, height: u16, font: FontMetrics) -> Self {
        let fh = font.height as i32;
        let asc = font.ascent as i32;
        let desc = -(font.descent as i32);
        let icon = ICON_SIZE as i32;

        let axis_baseline = fh + desc;
        let frame_height = (font.ascent + font.height) as u32;
        let heater_target_baseline = frame_height as i32 + 15 + asc;
        let heater_icon_y = heater_target_baseline + desc + 1;
        let heater_current_baseline = heater_icon_y + icon + asc + 2;
        let fan_icon_y = heater_current_baseline + desc + 17;
        let fan_text_baseline = fan_icon_y + icon + asc + 2;
        let progress_text_baseline = fan_text_baseline + desc + 12 + asc;
        let progress_y = progress_text_baseline + desc + 3;

        let heater_columns = if width > HEATER_X0 {
            ((width - HEATER_X0) / HEATER_PITCH) as usize
        } else {
            0
        };

        Self {
            width,
            height,
            font,
            axis_baseline,
            axis_spacing: width as i32 / 4,
            frame_height,
            heater_target_baseline,
            heater_icon_y,
            heater_current_baseline,
            fan_icon_y,
            fan_text_baseline,
            progress_text_baseline,
            progress_y,
            status_baseline: height as i32 - fh,
            status_columns: if font.width == 0 {
                0
            } else {
                (width / font.width) as usize
            },
            heater_columns,
            fan_columns: (width / FAN_PITCH) as usize,
        }
    }

    pub fn label_x(&self, axis: usize) -> i32 {
        4 + self.axis_spacing * axis as i32
    }

    pub fn value_x(&self, axis: usize) -> i32 {
        2 * self.font.width as i32 + self.axis_spacing * axis as i32
    }

    pub fn feedrate_value_x(&self) -> i32 {
        self.value_x(3) + self.font.width as i32
    }

    pub fn heater_x(&self, column: usize) -> i32 {
        (HEATER_X0 + HEATER_PITCH * column as u16) as i32
    }

    /// Center line the temperatures of a heater column align on.
    pub fn heater_text_x(&self, column: usize) -> i32 {
        self.heater_x(column) + ICON_SIZE as i32 / 2
    }

    pub fn fan_x(&self, index: usize) -> i32 {
        (HEATER_X0 + FAN_PITCH * index as u16) as i32
    }

    pub fn progress_bar(&self) -> Rectangle {
        let x = 5 * self.font.width as i32;
        let w = (self.width as i32 - x - 4).max(0) as u32;
        Rectangle::new(Point::new(x, self.progress_y), Size::new(w, PROGRESS_BAR_H as u32))
    }

    pub fn status_region(&self) -> Region {
        let top = (self.status_baseline - self.font.ascent as i32).max(0) as u16;
        Region::new(0, top, self.width, self.height.saturating_sub(top))
    }
}
