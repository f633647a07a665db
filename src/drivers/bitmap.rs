// 1bpp source images in panel polarity: a set bit is white.
// Rows are padded to whole bytes, MSB is the leftmost pixel.
//
// ImageClip carries the byte-boundary widening and screen clipping shared
// by the controller writes (Epd::write_image*) and the page buffer blit.

use crate::ui::Region;

#[derive(Clone, Copy, Debug)]
pub struct Bitmap<'a> {
    data: &'a [u8],
    width: u16,
    height: u16,
}

impl<'a> Bitmap<'a> {
    pub const fn new(data: &'a [u8], width: u16, height: u16) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    // short source data reads as white
    #[inline]
    fn byte(&self, col: usize, row: usize) -> u8 {
        self.data
            .get(row * self.row_bytes() + col)
            .copied()
            .unwrap_or(0xFF)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageOpts {
    /// flip bit polarity (white-on-black assets)
    pub invert: bool,
    /// read source rows bottom-up
    pub mirror_y: bool,
}

impl ImageOpts {
    pub const NONE: Self = Self {
        invert: false,
        mirror_y: false,
    };
}

/// Destination window on the panel plus where its first byte comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageClip {
    /// native panel area; x and w are multiples of 8
    pub area: Region,
    src_col: usize,
    src_row: usize,
    src_height: usize,
}

impl ImageClip {
    /// Place `w`x`h` pixels of `bitmap`, starting at (`x_part`, `y_part`)
    /// inside it, at (`x`, `y`) on a `screen_w`x`screen_h` panel. `x_part`
    /// and `x` snap down to a byte boundary, `w` rounds up to whole bytes.
    /// `None` when nothing lands on screen.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screen_w: u16,
        screen_h: u16,
        bitmap: &Bitmap<'_>,
        x_part: u16,
        y_part: u16,
        x: i32,
        y: i32,
        w: u16,
        h: u16,
    ) -> Option<Self> {
        if x_part >= bitmap.width || y_part >= bitmap.height {
            return None;
        }
        let x_part = (x_part & !7) as i32;
        let w = (w as i32).min(bitmap.width as i32 - x_part);
        let h = (h as i32).min(bitmap.height as i32 - y_part as i32);

        let x = x.div_euclid(8) * 8;
        let w = (w + 7) / 8 * 8;
        let x1 = x.max(0);
        let y1 = y.max(0);
        let w1 = (x + w).min(screen_w as i32) - x1;
        let h1 = (y + h).min(screen_h as i32) - y1;
        if w1 <= 0 || h1 <= 0 {
            return None;
        }
        let dx = x1 - x;
        let dy = y1 - y;

        Some(Self {
            area: Region::new(x1 as u16, y1 as u16, w1 as u16, h1 as u16),
            src_col: ((x_part + dx) / 8) as usize,
            src_row: (y_part as i32 + dy) as usize,
            src_height: bitmap.height as usize,
        })
    }

    /// Whole bitmap at (`x`, `y`).
    pub fn full(screen_w: u16, screen_h: u16, bitmap: &Bitmap<'_>, x: i32, y: i32) -> Option<Self> {
        Self::new(
            screen_w,
            screen_h,
            bitmap,
            0,
            0,
            x,
            y,
            bitmap.width,
            bitmap.height,
        )
    }

    #[inline]
    pub fn source_byte(&self, bitmap: &Bitmap<'_>, row: usize, col: usize, opts: ImageOpts) -> u8 {
        let src_row = if opts.mirror_y {
            self.src_height
                .wrapping_sub(1)
                .wrapping_sub(self.src_row + row)
        } else {
            self.src_row + row
        };
        let b = bitmap.byte(self.src_col + col, src_row);
        if opts.invert { !b } else { b }
    }

    /// Row-major byte stream for the clipped area.
    pub fn bytes<'a>(
        &'a self,
        bitmap: &'a Bitmap<'a>,
        opts: ImageOpts,
    ) -> impl Iterator<Item = u8> + 'a {
        let cols = (self.area.w / 8) as usize;
        (0..self.area.h as usize)
            .flat_map(move |row| (0..cols).map(move |col| self.source_byte(bitmap, row, col, opts)))
    }
}
