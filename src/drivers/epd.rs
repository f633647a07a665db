// Panel operations over any PanelIo, dispatched to the controller
// backend by model tag. Owns the lifecycle rules shared by every
// controller: the first write clears both RAM planes, the first refresh
// is a full one, partial requests fall back to full when the panel
// can't do them, deep sleep needs a reset line to come back from.

use super::bitmap::{Bitmap, ImageClip, ImageOpts};
use super::interface::{DriverState, InitKind, PanelIo, PanelState, ResetMode};
use super::panel::{PanelDescriptor, PanelModel};
use super::{gdeq0426t82, gdew0371w7};
use crate::ui::Region;

/// Controller RAM plane. `Current` is the frame to show next,
/// `Previous` what the panel shows now (fast partial diff base).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    Current,
    Previous,
}

pub const WHITE: u8 = 0xFF;
pub const BLACK: u8 = 0x00;

// same call into whichever backend the panel model names
macro_rules! backend {
    ($self:ident . $op:ident ( $($arg:expr),* )) => {
        match $self.panel.model {
            PanelModel::Gdew0371w7 => gdew0371w7::$op(&mut $self.io, $self.panel $(, $arg)*),
            PanelModel::Gdeq0426t82 => gdeq0426t82::$op(&mut $self.io, $self.panel $(, $arg)*),
        }
    };
}

pub struct Epd<IO> {
    io: IO,
    panel: &'static PanelDescriptor,
}

impl<IO: PanelIo> Epd<IO> {
    pub fn new(io: IO, panel: &'static PanelDescriptor) -> Self {
        Self { io, panel }
    }

    pub fn init(&mut self, kind: InitKind, reset_mode: ResetMode) {
        self.io.init(kind, reset_mode);
    }

    pub fn panel(&self) -> &'static PanelDescriptor {
        self.panel
    }

    pub fn width(&self) -> u16 {
        self.panel.width
    }

    pub fn height(&self) -> u16 {
        self.panel.height
    }

    pub fn state(&self) -> &DriverState {
        self.io.state()
    }

    pub fn panel_state(&self) -> PanelState {
        self.io.state().panel_state()
    }

    pub fn io(&self) -> &IO {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub fn release(self) -> IO {
        self.io
    }

    fn full_area(&self) -> Region {
        Region::new(0, 0, self.panel.width, self.panel.height)
    }

    fn activate(&mut self) {
        self.io.state_mut().powered_down = false;
    }

    fn fill_plane(&mut self, plane: Plane, value: u8) {
        let area = self.full_area();
        let count = self.panel.buffer_bytes();
        backend!(self.write_ram(plane, area, core::iter::repeat_n(value, count)));
    }

    /// Fill both RAM planes with `value` (no refresh).
    pub fn write_screen_buffer(&mut self, value: u8) {
        self.activate();
        self.io.state_mut().initial_write = false;
        backend!(self.prepare_write());
        self.fill_plane(Plane::Previous, value);
        self.fill_plane(Plane::Current, value);
    }

    /// Fill the previous plane only, after a refresh showed `value`.
    pub fn write_screen_buffer_again(&mut self, value: u8) {
        if !self.panel.has_fast_partial_update {
            return;
        }
        self.activate();
        backend!(self.prepare_write());
        self.fill_plane(Plane::Previous, value);
    }

    pub fn clear_screen(&mut self, value: u8) {
        self.write_screen_buffer(value);
        self.refresh(true);
        self.write_screen_buffer_again(value);
    }

    pub fn write_image(&mut self, bitmap: &Bitmap<'_>, x: i32, y: i32, opts: ImageOpts) {
        let clip = ImageClip::full(self.panel.width, self.panel.height, bitmap, x, y);
        self.write_clip(Plane::Current, bitmap, clip, opts);
    }

    /// Write the `w`x`h` piece of `bitmap` starting at (`x_part`, `y_part`).
    #[allow(clippy::too_many_arguments)]
    pub fn write_image_part(
        &mut self,
        bitmap: &Bitmap<'_>,
        x_part: u16,
        y_part: u16,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        opts: ImageOpts,
    ) {
        let clip = ImageClip::new(
            self.panel.width,
            self.panel.height,
            bitmap,
            x_part,
            y_part,
            x,
            y,
            w,
            h,
        );
        self.write_clip(Plane::Current, bitmap, clip, opts);
    }

    /// Same image into the previous plane, so the next fast partial
    /// refresh diffs against what is actually on the glass.
    pub fn write_image_again(&mut self, bitmap: &Bitmap<'_>, x: i32, y: i32, opts: ImageOpts) {
        if !self.panel.has_fast_partial_update {
            return;
        }
        let clip = ImageClip::full(self.panel.width, self.panel.height, bitmap, x, y);
        self.write_clip(Plane::Previous, bitmap, clip, opts);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn write_image_part_again(
        &mut self,
        bitmap: &Bitmap<'_>,
        x_part: u16,
        y_part: u16,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        opts: ImageOpts,
    ) {
        if !self.panel.has_fast_partial_update {
            return;
        }
        let clip = ImageClip::new(
            self.panel.width,
            self.panel.height,
            bitmap,
            x_part,
            y_part,
            x,
            y,
            w,
            h,
        );
        self.write_clip(Plane::Previous, bitmap, clip, opts);
    }

    /// Write, refresh the covered window, then sync the previous plane.
    pub fn draw_image(&mut self, bitmap: &Bitmap<'_>, x: i32, y: i32, opts: ImageOpts) {
        self.write_image(bitmap, x, y, opts);
        self.refresh_window(x, y, bitmap.width(), bitmap.height());
        self.write_image_again(bitmap, x, y, opts);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_part(
        &mut self,
        bitmap: &Bitmap<'_>,
        x_part: u16,
        y_part: u16,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
        opts: ImageOpts,
    ) {
        self.write_image_part(bitmap, x_part, y_part, x, y, w, h, opts);
        self.refresh_window(x, y, w, h);
        self.write_image_part_again(bitmap, x_part, y_part, x, y, w, h, opts);
    }

    fn write_clip(
        &mut self,
        plane: Plane,
        bitmap: &Bitmap<'_>,
        clip: Option<ImageClip>,
        opts: ImageOpts,
    ) {
        if plane == Plane::Current && self.io.state().initial_write {
            // controller RAM is random after power-up
            self.write_screen_buffer(WHITE);
        }
        let Some(clip) = clip else {
            return;
        };
        self.activate();
        backend!(self.prepare_write());
        backend!(self.write_ram(plane, clip.area, clip.bytes(bitmap, opts)));
    }

    /// Refresh the whole panel from controller RAM. `partial` asks for the
    /// fast waveform; the first refresh after a cold init is always full.
    pub fn refresh(&mut self, partial: bool) {
        if partial && self.panel.has_partial_update {
            self.refresh_window(0, 0, self.panel.width, self.panel.height);
            return;
        }
        if partial {
            log::warn!("[EPD] {:?} has no partial update, refreshing full", self.panel.model);
        }
        self.activate();
        log::debug!("[EPD] full refresh");
        backend!(self.update_full());
        self.io.state_mut().initial_refresh = false;
    }

    /// Partial refresh of a window; x and w widen to byte boundaries.
    pub fn refresh_window(&mut self, x: i32, y: i32, w: u16, h: u16) {
        if self.io.state().initial_refresh {
            return self.refresh(false);
        }
        if !self.panel.has_partial_update {
            return self.refresh(false);
        }
        let x1 = x.max(0);
        let y1 = y.max(0);
        let x2 = (x + w as i32).min(self.panel.width as i32);
        let y2 = (y + h as i32).min(self.panel.height as i32);
        if x2 <= x1 || y2 <= y1 {
            return;
        }
        let x1 = x1 & !7;
        let x2 = ((x2 + 7) & !7).min(self.panel.width as i32);
        let area = Region::new(x1 as u16, y1 as u16, (x2 - x1) as u16, (y2 - y1) as u16);

        self.activate();
        log::debug!("[EPD] partial refresh {:?}", area);
        backend!(self.update_window(area));
    }

    pub fn power_off(&mut self) {
        if self.io.state().power_on {
            backend!(self.power_off());
        }
        let state = self.io.state_mut();
        state.power_on = false;
        state.using_partial_mode = false;
        state.powered_down = true;
    }

    /// Power off and enter deep sleep. Without a reset line the panel
    /// could never be woken, so it only powers off. Deep sleep drops the
    /// controller RAM, so the next write clears and the next refresh is full.
    pub fn hibernate(&mut self) {
        self.power_off();
        if !self.io.has_reset() {
            log::warn!("[EPD] no reset line, hibernate stays powered off");
            return;
        }
        backend!(self.deep_sleep());
        let state = self.io.state_mut();
        state.hibernating = true;
        state.init_done = false;
        state.initial_write = true;
        state.initial_refresh = true;
        log::info!("[EPD] hibernating");
    }
}
