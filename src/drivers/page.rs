// Page buffer for paged e-paper rendering.
// One N-byte band of the native framebuffer instead of the whole thing;
// the paging loop in display.rs walks the band down the active window.
// Widgets draw in logical (rotated) coordinates and are clipped here.
// Bits are panel polarity: set = white.

use core::ops::Range;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
};

use super::bitmap::{Bitmap, ImageClip, ImageOpts};
use crate::ui::Region;

pub const DEFAULT_PAGE_BUDGET: usize = 800;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// How a `width`x`height` area splits into pages of at most `budget` bytes.
/// An empty area has no pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLayout {
    pub width: u16,
    pub height: u16,
    pub page_height: u16,
    pub pages: u16,
}

impl PageLayout {
    pub const fn new(width: u16, height: u16, budget: usize) -> Self {
        if width == 0 || height == 0 {
            return Self {
                width,
                height,
                page_height: 0,
                pages: 0,
            };
        }
        let row_bytes = (width as usize).div_ceil(8);
        let rows = budget / row_bytes;
        let mut page_height = if rows > height as usize {
            height
        } else {
            rows as u16
        };
        if page_height == 0 {
            page_height = 1;
        }
        let pages = (height as usize).div_ceil(page_height as usize) as u16;
        Self {
            width,
            height,
            page_height,
            pages,
        }
    }

    /// Rows of `page`, relative to the top of the area; the last page is
    /// clamped, not padded.
    pub fn page_rows(&self, page: u16) -> Range<u16> {
        let start = (page as u32 * self.page_height as u32).min(self.height as u32) as u16;
        let end = (start as u32 + self.page_height as u32).min(self.height as u32) as u16;
        start..end
    }

    pub const fn page_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8) * self.page_height as usize
    }
}

pub struct PageBuffer<const N: usize> {
    buf: [u8; N],
    prev: [u8; N],
    prev_len: usize,
    prev_win: Region,
    panel_w: u16,
    panel_h: u16,
    rotation: Rotation,
    background: u8,
    win: Region,
    row_bytes: u16,
}

impl<const N: usize> PageBuffer<N> {
    pub const fn new(panel_w: u16, panel_h: u16) -> Self {
        Self {
            buf: [0xFF; N],
            prev: [0xFF; N],
            prev_len: 0,
            prev_win: Region::new(0, 0, 0, 0),
            panel_w,
            panel_h,
            rotation: Rotation::Deg0,
            background: 0xFF,
            win: Region::new(0, 0, 0, 0),
            row_bytes: 0,
        }
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Byte every page starts from; 0xFF white, 0x00 black.
    pub fn set_background(&mut self, value: u8) {
        self.background = value;
    }

    pub fn background(&self) -> u8 {
        self.background
    }

    pub fn max_rows_for_width(width: u16) -> u16 {
        let rb = (width as usize).div_ceil(8);
        if rb == 0 {
            return 0;
        }
        (N / rb).min(u16::MAX as usize) as u16
    }

    /// Start a page covering native `win`, cleared to the background.
    pub fn begin(&mut self, win: Region) {
        let rb = (win.w as usize).div_ceil(8);
        let mut h = win.h;
        if rb == 0 {
            h = 0;
        } else {
            let max_h = Self::max_rows_for_width(win.w);
            if h > max_h {
                log::warn!(
                    "[EPD] page {}x{} exceeds {} byte buffer, clamping h -> {}",
                    win.w,
                    win.h,
                    N,
                    max_h
                );
                h = max_h;
            }
        }
        self.win = Region::new(win.x, win.y, win.w, h);
        self.row_bytes = rb as u16;
        let total = rb * h as usize;
        self.buf[..total].fill(self.background);
    }

    pub fn data(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let total = self.len();
        &mut self.buf[..total]
    }

    fn len(&self) -> usize {
        self.row_bytes as usize * self.win.h as usize
    }

    /// Current page in native panel coordinates.
    pub fn page_window(&self) -> Region {
        self.win
    }

    pub fn bitmap(&self) -> Bitmap<'_> {
        Bitmap::new(self.data(), self.win.w, self.win.h)
    }

    /// Keep a copy of this page for the previous-plane write.
    pub fn take_snapshot(&mut self) {
        let len = self.len();
        self.prev[..len].copy_from_slice(&self.buf[..len]);
        self.prev_len = len;
        self.prev_win = self.win;
    }

    pub fn discard_snapshot(&mut self) {
        self.prev_len = 0;
    }

    /// Last snapshot and the native window it was taken at.
    pub fn snapshot(&self) -> Option<(Bitmap<'_>, Region)> {
        if self.prev_len == 0 {
            return None;
        }
        Some((
            Bitmap::new(&self.prev[..self.prev_len], self.prev_win.w, self.prev_win.h),
            self.prev_win,
        ))
    }

    // native window -> logical coords for widget culling
    pub fn logical_window(&self) -> Region {
        let (w, h) = (self.panel_w, self.panel_h);
        let win = self.win;
        match self.rotation {
            Rotation::Deg0 => win,
            Rotation::Deg90 => Region::new(win.y, w - win.x - win.w, win.h, win.w),
            Rotation::Deg180 => Region::new(w - win.x - win.w, h - win.y - win.h, win.w, win.h),
            Rotation::Deg270 => Region::new(h - win.y - win.h, win.x, win.h, win.w),
        }
    }

    /// True when logical `region` touches this page.
    pub fn intersects(&self, region: Region) -> bool {
        self.logical_window().intersects(region)
    }

    /// Copy native-polarity bitmap rows into this page at native (`x`, `y`);
    /// `x` snaps down to a byte. Rows outside the page are skipped.
    pub fn write_image(&mut self, bitmap: &Bitmap<'_>, x: i32, y: i32, opts: ImageOpts) {
        let Some(clip) = ImageClip::full(self.panel_w, self.panel_h, bitmap, x, y) else {
            return;
        };
        let win = self.win;
        let rb = self.row_bytes as usize;
        for row in 0..clip.area.h {
            let py = clip.area.y + row;
            if py < win.y || py >= win.y + win.h {
                continue;
            }
            let local_row = (py - win.y) as usize;
            for col in 0..clip.area.w / 8 {
                let px = clip.area.x + col * 8;
                if px < win.x || px >= win.x + win.w {
                    continue;
                }
                let local_col = ((px - win.x) / 8) as usize;
                self.buf[local_row * rb + local_col] =
                    clip.source_byte(bitmap, row as usize, col as usize, opts);
            }
        }
    }

    #[inline]
    fn logical_size(&self) -> (u16, u16) {
        if self.rotation.swaps_axes() {
            (self.panel_h, self.panel_w)
        } else {
            (self.panel_w, self.panel_h)
        }
    }

    #[inline]
    fn to_physical(&self, lx: u16, ly: u16) -> (u16, u16) {
        let (w, h) = (self.panel_w, self.panel_h);
        match self.rotation {
            Rotation::Deg0 => (lx, ly),
            Rotation::Deg90 => (w - 1 - ly, lx),
            Rotation::Deg180 => (w - 1 - lx, h - 1 - ly),
            Rotation::Deg270 => (ly, h - 1 - lx),
        }
    }

    #[inline]
    fn set_pixel_physical(&mut self, px: u16, py: u16, black: bool) {
        let win = self.win;
        if px < win.x || px >= win.x + win.w || py < win.y || py >= win.y + win.h {
            return;
        }
        let local_x = (px - win.x) as usize;
        let local_y = (py - win.y) as usize;
        let idx = local_x / 8 + local_y * self.row_bytes as usize;
        let bit = 7 - (local_x % 8);

        if black {
            self.buf[idx] &= !(1 << bit);
        } else {
            self.buf[idx] |= 1 << bit;
        }
    }

    // byte-aligned rect fill in physical coords, clipped to window
    fn fill_physical_rect(&mut self, px0: u16, py0: u16, px1: u16, py1: u16, black: bool) {
        let win = self.win;
        let cx0 = px0.max(win.x);
        let cx1 = px1.min(win.x + win.w);
        let cy0 = py0.max(win.y);
        let cy1 = py1.min(win.y + win.h);
        if cx0 >= cx1 || cy0 >= cy1 {
            return;
        }

        let lx0 = (cx0 - win.x) as usize;
        let lx1 = (cx1 - win.x) as usize;
        let ly0 = (cy0 - win.y) as usize;
        let ly1 = (cy1 - win.y) as usize;
        let rb = self.row_bytes as usize;

        let first_byte = lx0 / 8;
        let last_byte = (lx1 - 1) / 8;
        let first_mask: u8 = 0xFF >> (lx0 & 7);
        let last_mask: u8 = 0xFF << (7 - ((lx1 - 1) & 7));

        let (fill, edge_op): (u8, fn(&mut u8, u8)) = if black {
            (0x00, |b, m| *b &= !m)
        } else {
            (0xFF, |b, m| *b |= m)
        };

        for ly in ly0..ly1 {
            let row = ly * rb;
            if first_byte == last_byte {
                edge_op(&mut self.buf[row + first_byte], first_mask & last_mask);
            } else {
                edge_op(&mut self.buf[row + first_byte], first_mask);
                self.buf[row + first_byte + 1..row + last_byte].fill(fill);
                edge_op(&mut self.buf[row + last_byte], last_mask);
            }
        }
    }
}

impl<const N: usize> OriginDimensions for PageBuffer<N> {
    fn size(&self) -> Size {
        let (w, h) = self.logical_size();
        Size::new(w as u32, h as u32)
    }
}

impl<const N: usize> DrawTarget for PageBuffer<N> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.logical_size();
        let (log_w, log_h) = (w as i32, h as i32);

        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.x >= log_w || coord.y < 0 || coord.y >= log_h {
                continue;
            }
            let (px, py) = self.to_physical(coord.x as u16, coord.y as u16);
            self.set_pixel_physical(px, py, color == BinaryColor::On);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let (sw, sh) = self.logical_size();
        let clamp = |v: i32, max: u16| v.clamp(0, max as i32) as u16;

        let lx0 = clamp(area.top_left.x, sw);
        let ly0 = clamp(area.top_left.y, sh);
        let lx1 = clamp(area.top_left.x.saturating_add(area.size.width as i32), sw);
        let ly1 = clamp(area.top_left.y.saturating_add(area.size.height as i32), sh);
        if lx0 >= lx1 || ly0 >= ly1 {
            return Ok(());
        }

        let black = color == BinaryColor::On;
        let (w, h) = (self.panel_w, self.panel_h);

        // every rotation maps an axis-aligned rect onto one
        match self.rotation {
            Rotation::Deg0 => self.fill_physical_rect(lx0, ly0, lx1, ly1, black),
            Rotation::Deg90 => self.fill_physical_rect(w - ly1, lx0, w - ly0, lx1, black),
            Rotation::Deg180 => self.fill_physical_rect(w - lx1, h - ly1, w - lx0, h - ly0, black),
            Rotation::Deg270 => self.fill_physical_rect(ly0, h - lx1, ly1, h - lx0, black),
        }
        Ok(())
    }
}
