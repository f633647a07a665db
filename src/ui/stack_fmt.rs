// No-alloc fmt::Write buffer.
// StackFmt<N> owns a [u8; N] and silently truncates on overflow,
// backing off to the last whole UTF-8 character.

pub struct StackFmt<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> StackFmt<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for StackFmt<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Write for StackFmt<N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let mut n = s.len().min(N - self.len);
        while !s.is_char_boundary(n) {
            n -= 1;
        }
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

impl<const N: usize> core::fmt::Display for StackFmt<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn truncates_on_char_boundary() {
        let mut s = StackFmt::<4>::new();
        let _ = write!(s, "12°C");
        // '°' is two bytes; "12°" fits, 'C' does not
        assert_eq!(s.as_str(), "12°");
        let mut s = StackFmt::<3>::new();
        let _ = write!(s, "1°C");
        assert_eq!(s.as_str(), "1°");
        let mut s = StackFmt::<2>::new();
        let _ = write!(s, "1°C");
        assert_eq!(s.as_str(), "1");
    }
}
