// Fixed-width number formatting for the status screen.
// Everything formats into a StackFmt so nothing allocates; widths are
// constant so values don't jitter between refreshes.

use core::fmt::Write;

use super::stack_fmt::StackFmt;

pub type NumStr = StackFmt<16>;

/// Round half away from zero without libm.
#[inline]
pub fn round_i32(v: f32) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Right-aligned 3-wide integer, clamped to -99..=999.
pub fn int3(v: i32) -> NumStr {
    let mut s = NumStr::new();
    let _ = write!(s, "{:>3}", v.clamp(-99, 999));
    s
}

/// `int3` with the leading padding stripped.
pub fn int3_trimmed(v: i32) -> NumStr {
    let padded = int3(v);
    let mut s = NumStr::new();
    let _ = s.write_str(padded.as_str().trim_start());
    s
}

/// X/Y position, 4 wide: one decimal while it fits (`12.3`, `-1.2`),
/// otherwise a signed integer (`-123`, ` 250`).
pub fn axis4(v: f32) -> NumStr {
    let mut s = NumStr::new();
    let tenths = round_i32(v * 10.0);
    if (-99..=999).contains(&tenths) {
        let abs = tenths.unsigned_abs();
        if tenths < 0 {
            let _ = write!(s, "-{}.{}", abs / 10, abs % 10);
        } else {
            let _ = write!(s, "{:>2}.{}", abs / 10, abs % 10);
        }
    } else {
        let _ = write!(s, "{:>4}", round_i32(v).clamp(-999, 9999));
    }
    s
}

/// Z position, 7 wide with two decimals: `  12.50`, `  -1.25`.
pub fn axis_z7(v: f32) -> NumStr {
    let mut s = NumStr::new();
    let hundredths = round_i32(v * 100.0);
    let abs = hundredths.unsigned_abs();
    let whole = (abs / 100).min(999);
    let frac = abs % 100;
    let digits = if whole >= 100 {
        3
    } else if whole >= 10 {
        2
    } else {
        1
    };
    for _ in digits..3 {
        let _ = s.write_char(' ');
    }
    let _ = s.write_char(if hundredths < 0 { '-' } else { ' ' });
    let _ = write!(s, "{}.{:02}", whole, frac);
    s
}

pub fn percent3(v: u8) -> NumStr {
    int3(v as i32)
}

/// Print-job duration: `hh:mm`, or `Nd hh:mm` once a day has passed.
pub fn elapsed(secs: u32) -> NumStr {
    let mut s = NumStr::new();
    let m = (secs / 60) % 60;
    let h = secs / 3600;
    if secs >= 86_400 {
        let _ = write!(s, "{}d {:02}:{:02}", secs / 86_400, h % 24, m);
    } else {
        let _ = write!(s, "{:02}:{:02}", h, m);
    }
    s
}
