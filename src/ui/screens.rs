// Boot and kill screens.
// Both draw through any BinaryColor target, normally a PageBuffer inside
// PagedDisplay::draw_paged.

use embedded_graphics::{
    mono_font::{MonoTextStyle, iso_8859_1::FONT_9X15},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

use super::layout::FontMetrics;
use crate::drivers::bitmap::Bitmap;

const FONT: FontMetrics = FontMetrics::FONT_9X15;

fn line<D>(d: &mut D, s: &str, x: i32, y: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_9X15, BinaryColor::On);
    Text::with_baseline(s, Point::new(x, y), style, Baseline::Alphabetic).draw(d)?;
    Ok(())
}

fn text_width(s: &str) -> i32 {
    s.chars().count() as i32 * FONT.width as i32
}

/// Panel-polarity bitmap (set bit = white) drawn as black-on-transparent.
pub fn draw_bitmap<D>(d: &mut D, bitmap: &Bitmap<'_>, at: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let rb = bitmap.row_bytes();
    let data = bitmap.data();
    let (w, h) = (bitmap.width() as i32, bitmap.height() as i32);
    let pixels = (0..h).flat_map(move |y| {
        (0..w).filter_map(move |x| {
            let byte = data.get(y as usize * rb + x as usize / 8).copied()?;
            let white = byte & (0x80 >> (x % 8)) != 0;
            (!white).then(|| Pixel(at + Point::new(x, y), BinaryColor::On))
        })
    });
    d.draw_iter(pixels)
}

pub struct BootScreen<'a> {
    pub logo: Option<Bitmap<'a>>,
    pub version: &'a str,
    pub url: &'a str,
    pub credits: &'a [&'a str],
}

impl BootScreen<'_> {
    /// Logo with version and URL beside it when they fit to its right,
    /// otherwise centered below it; credits fill the rest.
    pub fn draw<D>(&self, d: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions,
    {
        let size = d.size();
        let (width, height) = (size.width as i32, size.height as i32);
        let fh = FONT.height as i32;
        let desc = -(FONT.descent as i32);

        let (logo_w, logo_h) = self
            .logo
            .as_ref()
            .map_or((0, 0), |b| (b.width() as i32, b.height() as i32));
        let w1 = text_width(self.version);
        let w2 = text_width(self.url);
        let text_w = w1.max(w2);
        let text_h = fh * 2;
        let rspace = width - logo_w;

        let (logo_at, x1, x2, base) = if logo_w > 0 && text_w < rspace {
            let inter = (width - text_w - logo_w) / 2;
            (
                Point::new(inter.max(0), ((height - logo_h) / 2).max(0)),
                logo_w + (rspace - w1) / 2,
                logo_w + (rspace - w2) / 2,
                logo_h.max(text_h) - text_h / 2,
            )
        } else {
            let inter = ((height - text_h - logo_h) / 3).clamp(0, fh);
            (
                Point::new((rspace / 2).max(0), inter),
                (width - w1) / 2,
                (width - w2) / 2,
                inter + logo_h + text_h - desc,
            )
        };

        if let Some(logo) = &self.logo {
            draw_bitmap(d, logo, logo_at)?;
        }
        line(d, self.version, x1.max(0), base - fh)?;
        line(d, self.url, x2.max(0), base)?;

        let mut y = base + fh * 2;
        for credit in self.credits {
            if y > height - desc {
                break;
            }
            line(d, credit, 0, y)?;
            y += fh + 2;
        }
        Ok(())
    }
}

pub const MSG_HALTED: &str = "PRINTER HALTED";
pub const MSG_PLEASE_RESET: &str = "Please Reset";

/// Unrecoverable-error screen: the reason, then the halted notice, at
/// quarter heights.
pub fn draw_kill_screen<D>(d: &mut D, message: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    let h4 = d.size().height as i32 / 4;
    line(d, message, 0, h4)?;
    line(d, MSG_HALTED, 0, h4 * 2)?;
    line(d, MSG_PLEASE_RESET, 0, h4 * 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::page::PageBuffer;
    use crate::ui::Region;

    fn black_rows(page: &PageBuffer<4000>) -> Vec<u16> {
        let win = page.page_window();
        let rb = (win.w as usize).div_ceil(8);
        (0..win.h)
            .filter(|&r| {
                page.data()[r as usize * rb..(r as usize + 1) * rb]
                    .iter()
                    .any(|&b| b != 0xFF)
            })
            .map(|r| win.y + r)
            .collect()
    }

    #[test]
    fn kill_screen_lines_sit_at_quarters() {
        let mut page = PageBuffer::<4000>::new(240, 104);
        page.begin(Region::new(0, 0, 240, 104));
        draw_kill_screen(&mut page, "Thermal runaway").unwrap();
        let rows = black_rows(&page);
        // glyphs sit just above each quarter baseline
        for base in [26, 52, 78] {
            assert!(rows.iter().any(|&r| (base - 10..base).contains(&r)));
        }
        assert!(rows.iter().all(|&r| r >= 10));
    }

    #[test]
    fn bitmap_draws_zero_bits_black() {
        let mut page = PageBuffer::<4000>::new(240, 104);
        page.begin(Region::new(0, 0, 240, 104));
        let data = [0b0111_1111, 0xFF];
        let logo = Bitmap::new(&data, 8, 2);
        draw_bitmap(&mut page, &logo, Point::new(16, 3)).unwrap();
        assert_eq!(page.data()[3 * 30 + 2], 0x7F);
        assert_eq!(page.data()[4 * 30 + 2], 0xFF);
    }

    #[test]
    fn boot_screen_without_logo_centers_text() {
        let mut page = PageBuffer::<4000>::new(240, 104);
        page.begin(Region::new(0, 0, 240, 104));
        let boot = BootScreen {
            logo: None,
            version: "1.0",
            url: "example.org",
            credits: &["» someone"],
        };
        boot.draw(&mut page).unwrap();
        assert!(!black_rows(&page).is_empty());
        // nothing in the leftmost byte column but the credit line
        let version_row = black_rows(&page)[0] as usize;
        assert_eq!(page.data()[version_row * 30], 0xFF);
    }
}
