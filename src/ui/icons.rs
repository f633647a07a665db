// Status icons drawn from primitives, ICON_SIZE square.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle},
};

use super::layout::ICON_SIZE;

const S: i32 = ICON_SIZE as i32;

fn fill() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_fill(BinaryColor::On)
}

fn stroke() -> PrimitiveStyle<BinaryColor> {
    PrimitiveStyle::with_stroke(BinaryColor::On, 2)
}

/// Heater block over a nozzle; the block is solid so an index can be
/// printed on it in white.
pub fn hotend<D>(d: &mut D, at: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Rectangle::new(at + Point::new(3, 0), Size::new(S as u32 - 6, 16))
        .into_styled(fill())
        .draw(d)?;
    Triangle::new(
        at + Point::new(7, 16),
        at + Point::new(S - 8, 16),
        at + Point::new(S / 2, S - 1),
    )
    .into_styled(fill())
    .draw(d)
}

pub fn bed<D>(d: &mut D, at: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    // heat waves over the plate
    for i in 0..3 {
        let x = at.x + 5 + i * 7;
        Line::new(Point::new(x, at.y + 2), Point::new(x + 2, at.y + 8))
            .into_styled(stroke())
            .draw(d)?;
        Line::new(Point::new(x + 2, at.y + 8), Point::new(x, at.y + 14))
            .into_styled(stroke())
            .draw(d)?;
    }
    Rectangle::new(at + Point::new(0, 17), Size::new(S as u32, 5))
        .into_styled(fill())
        .draw(d)
}

pub fn chamber<D>(d: &mut D, at: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Rectangle::new(at + Point::new(1, 1), Size::new(S as u32 - 2, S as u32 - 2))
        .into_styled(stroke())
        .draw(d)?;
    Line::new(at + Point::new(5, S - 7), at + Point::new(S - 6, S - 7))
        .into_styled(stroke())
        .draw(d)
}

pub fn fan<D>(d: &mut D, at: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let c = at + Point::new(S / 2, S / 2);
    Circle::with_center(c, S as u32 - 1)
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(d)?;
    // four blades
    for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
        Triangle::new(
            c,
            c + Point::new(dx * 9 - dy * 4, dy * 9 + dx * 4),
            c + Point::new(dx * 9 + dy, dy * 9 - dx),
        )
        .into_styled(fill())
        .draw(d)?;
    }
    Circle::with_center(c, 5).into_styled(fill()).draw(d)
}
