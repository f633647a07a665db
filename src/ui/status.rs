// Printer status screen.
// Axis frame with X/Y/Z and feedrate, heater columns (hotends, bed,
// chamber), fans, job progress and a scrolling status line. Drawing is
// a pure function of MachineStatus plus the blink phase, so it can run
// once per page and twice per frame.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{MonoTextStyle, MonoTextStyleBuilder, iso_8859_1::FONT_9X15},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use super::icons;
use super::layout::{FontMetrics, ICON_SIZE, StatusLayout};
use super::message::MessageScroller;
use super::numfmt::{axis_z7, axis4, elapsed, int3, int3_trimmed, percent3, round_i32};
use super::stack_fmt::StackFmt;

const AXIS_LABELS: [&str; 3] = ["X", "Y", "Z"];
const LINE_BYTES: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisReading {
    pub value: f32,
    pub homed: bool,
    /// position trusted since homing (steppers never released)
    pub known: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeaterReading {
    pub current: f32,
    pub target: f32,
    /// idle timeout hit; the target blinks
    pub idle: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChamberReading {
    pub current: f32,
    /// None for an unheated chamber
    pub target: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FanReading {
    Unavailable,
    Speed {
        percent: u8,
        /// effective percent while adaptive slowing holds the fan back
        slowed: Option<u8>,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MachineStatus<'a> {
    pub axes: [AxisReading; 3],
    pub feedrate_percent: i16,
    pub hotends: &'a [HeaterReading],
    pub bed: Option<HeaterReading>,
    pub chamber: Option<ChamberReading>,
    pub fans: &'a [FanReading],
    /// job progress, percent
    pub progress: Option<u8>,
    pub elapsed_secs: u32,
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_9X15)
        .text_color(BinaryColor::On)
        .background_color(BinaryColor::Off)
        .build()
}

fn text<D>(d: &mut D, s: &str, x: i32, y: i32) -> Result<Point, D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Text::with_baseline(s, Point::new(x, y), text_style(), Baseline::Alphabetic).draw(d)
}

pub struct StatusScreen<const M: usize = 96> {
    layout: StatusLayout,
    message: MessageScroller<M>,
    blink: bool,
}

impl<const M: usize> StatusScreen<M> {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            layout: StatusLayout::new(width, height, FontMetrics::FONT_9X15),
            message: MessageScroller::new(),
            blink: false,
        }
    }

    pub fn layout(&self) -> &StatusLayout {
        &self.layout
    }

    pub fn set_message(&mut self, message: &str) {
        self.message.set(message);
    }

    pub fn message(&self) -> &str {
        self.message.message()
    }

    /// Call once per frame, before drawing.
    pub fn tick(&mut self, blink: bool) {
        self.blink = blink;
        self.message.tick(blink, self.layout.status_columns);
    }

    pub fn draw<D>(&self, d: &mut D, status: &MachineStatus<'_>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.draw_axes(d, status)?;
        self.draw_heaters(d, status)?;
        self.draw_fans(d, status)?;
        self.draw_progress(d, status)?;
        self.draw_status_line(d)
    }

    fn draw_axes<D>(&self, d: &mut D, status: &MachineStatus<'_>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let l = &self.layout;
        let y = l.axis_baseline;

        for (i, axis) in status.axes.iter().enumerate() {
            text(d, AXIS_LABELS[i], l.label_x(i), y)?;
            let value = if i == 2 {
                axis_z7(axis.value)
            } else {
                axis4(axis.value)
            };
            let x = l.value_x(i);
            if !axis.homed {
                let end = text(d, value.as_str(), x, y)?;
                text(d, "*", end.x, y)?;
            } else if !axis.known {
                text(d, if i == 2 { "    N/A" } else { " N/A" }, x, y)?;
            } else {
                text(d, value.as_str(), x, y)?;
            }
        }

        text(d, "FR", l.label_x(3), y)?;
        let end = text(d, int3(status.feedrate_percent as i32).as_str(), l.feedrate_value_x(), y)?;
        text(d, "%", end.x, y)?;

        let w = l.width as i32;
        let h = l.frame_height;
        let frame = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        Rectangle::new(Point::zero(), Size::new(w as u32, h))
            .into_styled(frame)
            .draw(d)?;
        for i in 1..4 {
            let x = w / 4 * i;
            Line::new(Point::new(x, 0), Point::new(x, h as i32 - 1))
                .into_styled(frame)
                .draw(d)?;
        }
        Ok(())
    }

    fn centered_temp<D>(&self, d: &mut D, temp: f32, tx: i32, y: i32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let s = int3_trimmed(round_i32(temp));
        let len = s.as_str().len() as i32;
        let x = tx - len * self.layout.font.width as i32 / 2 + 1;
        let end = text(d, s.as_str(), x, y)?;
        text(d, "°C", end.x, y)?;
        Ok(())
    }

    fn heater_column<D>(
        &self,
        d: &mut D,
        column: usize,
        target: Option<f32>,
        current: f32,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let l = &self.layout;
        let tx = l.heater_text_x(column);
        if let Some(target) = target {
            self.centered_temp(d, target, tx, l.heater_target_baseline)?;
        }
        self.centered_temp(d, current, tx, l.heater_current_baseline)
    }

    fn draw_heaters<D>(&self, d: &mut D, status: &MachineStatus<'_>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let l = &self.layout;
        let numbered = status.hotends.len() > 1;
        let mut column = 0;

        for (e, h) in status.hotends.iter().enumerate().take(l.heater_columns) {
            let at = Point::new(l.heater_x(column), l.heater_icon_y);
            icons::hotend(d, at)?;
            if numbered {
                let mut n = StackFmt::<4>::new();
                let _ = write!(n, "{}", e + 1);
                let style = MonoTextStyle::new(&FONT_9X15, BinaryColor::Off);
                Text::with_baseline(n.as_str(), at + Point::new(8, 13), style, Baseline::Alphabetic)
                    .draw(d)?;
            }
            let show_target = self.blink || !h.idle;
            self.heater_column(d, column, show_target.then_some(h.target), h.current)?;
            column += 1;
        }

        if let Some(bed) = status.bed
            && column < l.heater_columns
        {
            icons::bed(d, Point::new(l.heater_x(column), l.heater_icon_y))?;
            let show_target = self.blink || !bed.idle;
            self.heater_column(d, column, show_target.then_some(bed.target), bed.current)?;
            column += 1;
        }

        if let Some(chamber) = status.chamber
            && column < l.heater_columns
        {
            icons::chamber(d, Point::new(l.heater_x(column), l.heater_icon_y))?;
            self.heater_column(d, column, chamber.target, chamber.current)?;
        }
        Ok(())
    }

    fn draw_fans<D>(&self, d: &mut D, status: &MachineStatus<'_>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let l = &self.layout;
        let numbered = status.fans.len() > 1;

        for (i, fan) in status.fans.iter().enumerate().take(l.fan_columns) {
            let x = l.fan_x(i);
            icons::fan(d, Point::new(x, l.fan_icon_y))?;
            if numbered {
                let mut n = StackFmt::<4>::new();
                let _ = write!(n, "{}", i + 1);
                text(
                    d,
                    n.as_str(),
                    x + ICON_SIZE as i32 + 2,
                    l.fan_icon_y + l.font.ascent as i32,
                )?;
            }

            let mut s = StackFmt::<8>::new();
            match *fan {
                FanReading::Unavailable => {
                    let _ = s.write_str("n/a ");
                }
                FanReading::Speed {
                    slowed: Some(slowed),
                    ..
                } if !self.blink => {
                    let _ = write!(s, "{}*", percent3(slowed));
                }
                FanReading::Speed { percent, .. } => {
                    let _ = write!(s, "{}%", percent3(percent));
                }
            }
            // four characters centered under the icon
            let tx = x + ICON_SIZE as i32 / 2 - 2 * l.font.width as i32;
            text(d, s.as_str(), tx, l.fan_text_baseline)?;
        }
        Ok(())
    }

    fn draw_progress<D>(&self, d: &mut D, status: &MachineStatus<'_>) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let l = &self.layout;
        let bar = l.progress_bar();
        bar.into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(d)?;

        if let Some(progress) = status.progress {
            let progress = progress.min(100);
            if progress > 1 && bar.size.width > 2 {
                let w = (bar.size.width - 2) * progress as u32 / 100;
                Rectangle::new(
                    bar.top_left + Point::new(1, 1),
                    Size::new(w, bar.size.height.saturating_sub(2)),
                )
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(d)?;
            }
            let end = text(
                d,
                percent3(progress).as_str(),
                0,
                bar.top_left.y + bar.size.height as i32,
            )?;
            text(d, "%", end.x, bar.top_left.y + bar.size.height as i32)?;
        }

        let t = elapsed(status.elapsed_secs);
        let len = t.as_str().len() as i32;
        let x = bar.top_left.x + bar.size.width as i32 / 2 - len * l.font.width as i32 / 2;
        text(d, t.as_str(), x, l.progress_text_baseline)?;
        Ok(())
    }

    fn draw_status_line<D>(&self, d: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let mut line = StackFmt::<LINE_BYTES>::new();
        self.message.render(self.layout.status_columns, &mut line);
        text(d, line.as_str(), 0, self.layout.status_baseline)?;
        Ok(())
    }
}
