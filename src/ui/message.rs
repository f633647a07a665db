// Status line message with marquee scrolling.
// A message wider than the line scrolls one character per blink change
// around a ring of `message` + ". ".

use core::fmt::Write;

use super::stack_fmt::StackFmt;
use super::widget::wrap_next;

const SEPARATOR: &str = ". ";

pub struct MessageScroller<const N: usize> {
    text: StackFmt<N>,
    chars: usize,
    offset: usize,
    last_blink: bool,
}

impl<const N: usize> MessageScroller<N> {
    pub const fn new() -> Self {
        Self {
            text: StackFmt::new(),
            chars: 0,
            offset: 0,
            last_blink: false,
        }
    }

    /// Replace the message and restart scrolling; truncated to N bytes.
    pub fn set(&mut self, message: &str) {
        if self.text.as_str() == message {
            return;
        }
        self.text.clear();
        let _ = self.text.write_str(message);
        self.chars = self.text.as_str().chars().count();
        self.offset = 0;
    }

    pub fn message(&self) -> &str {
        self.text.as_str()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Advance one character when `blink` flipped and the message does
    /// not fit `columns`.
    pub fn tick(&mut self, blink: bool, columns: usize) {
        if blink == self.last_blink {
            return;
        }
        self.last_blink = blink;
        if self.chars > columns {
            self.offset = wrap_next(self.offset, self.chars + SEPARATOR.chars().count());
        }
    }

    /// Write exactly `columns` characters: the padded message when it
    /// fits, the scrolled ring when it doesn't.
    pub fn render<W: Write>(&self, columns: usize, out: &mut W) {
        let text = self.text.as_str();
        if self.chars <= columns {
            let _ = write!(out, "{:<width$}", text, width = columns);
            return;
        }
        for c in text
            .chars()
            .chain(SEPARATOR.chars())
            .cycle()
            .skip(self.offset)
            .take(columns)
        {
            let _ = out.write_char(c);
        }
    }
}

impl<const N: usize> Default for MessageScroller<N> {
    fn default() -> Self {
        Self::new()
    }
}
