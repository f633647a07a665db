// Paged rendering on top of Epd.
// The caller's draw closure runs once per page against a small PageBuffer;
// each finished page is written to controller RAM, and after the last one
// the window is refreshed. Panels with a fast differential waveform get a
// second pass that writes the same pages into the previous plane.

use log::{debug, info};

use crate::drivers::bitmap::ImageOpts;
use crate::drivers::epd::Epd;
use crate::drivers::interface::{InitKind, PanelIo, ResetMode};
use crate::drivers::page::{PageBuffer, PageLayout, Rotation};
use crate::ui::Region;

pub use crate::drivers::page::DEFAULT_PAGE_BUDGET;

pub const FULL_REFRESH_INTERVAL: u32 = 10;

/// Counts partial refreshes and asks for a full one every `interval`
/// updates to clear ghosting. Interval 0 never forces one.
#[derive(Clone, Copy, Debug)]
pub struct RefreshPolicy {
    interval: u32,
    partial_count: u32,
}

impl RefreshPolicy {
    pub const fn new(interval: u32) -> Self {
        Self {
            interval,
            partial_count: 0,
        }
    }

    pub fn full_due(&self) -> bool {
        self.interval != 0 && self.partial_count >= self.interval
    }

    pub fn record(&mut self, full: bool) {
        if full {
            self.partial_count = 0;
        } else {
            self.partial_count = self.partial_count.saturating_add(1);
        }
    }

    pub fn partial_count(&self) -> u32 {
        self.partial_count
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(FULL_REFRESH_INTERVAL)
    }
}

/// Paged renderer over one panel. `N` is the page buffer size in bytes
/// and must hold at least one row of the active window; a window whose
/// row does not fit is skipped (logged) instead of refreshed blank.
pub struct PagedDisplay<IO, const N: usize = DEFAULT_PAGE_BUDGET> {
    epd: Epd<IO>,
    page: PageBuffer<N>,
    layout: PageLayout,
    // native coords, byte aligned
    window: Region,
    partial: bool,
    current: u16,
    second_phase: bool,
    policy: RefreshPolicy,
}

impl<IO: PanelIo, const N: usize> PagedDisplay<IO, N> {
    pub fn new(epd: Epd<IO>) -> Self {
        let panel = epd.panel();
        let window = Region::new(0, 0, panel.width, panel.height);
        Self {
            page: PageBuffer::new(panel.width, panel.height),
            layout: Self::layout_for(window),
            window,
            partial: false,
            current: 0,
            second_phase: false,
            policy: RefreshPolicy::default(),
            epd,
        }
    }

    pub fn init(&mut self, kind: InitKind, reset_mode: ResetMode) {
        self.epd.init(kind, reset_mode);
    }

    pub fn epd(&self) -> &Epd<IO> {
        &self.epd
    }

    pub fn epd_mut(&mut self) -> &mut Epd<IO> {
        &mut self.epd
    }

    pub fn release(self) -> Epd<IO> {
        self.epd
    }

    pub fn page(&self) -> &PageBuffer<N> {
        &self.page
    }

    pub fn layout(&self) -> PageLayout {
        self.layout
    }

    pub fn window(&self) -> Region {
        self.window
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn policy_mut(&mut self) -> &mut RefreshPolicy {
        &mut self.policy
    }

    pub fn set_background(&mut self, value: u8) {
        self.page.set_background(value);
    }

    pub fn rotation(&self) -> Rotation {
        self.page.rotation()
    }

    /// The native window stays where it is; only later drawing and
    /// partial windows use the new orientation.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.page.set_rotation(rotation);
    }

    /// Logical (rotated) width.
    pub fn width(&self) -> u16 {
        if self.rotation().swaps_axes() {
            self.epd.height()
        } else {
            self.epd.width()
        }
    }

    pub fn height(&self) -> u16 {
        if self.rotation().swaps_axes() {
            self.epd.width()
        } else {
            self.epd.height()
        }
    }

    pub fn set_full_window(&mut self) {
        self.window = Region::new(0, 0, self.epd.width(), self.epd.height());
        self.partial = false;
        self.relayout();
    }

    /// Logical rect, clipped to the screen; the native x edges widen to
    /// byte boundaries.
    pub fn set_partial_window(&mut self, x: u16, y: u16, w: u16, h: u16) {
        let (lw, lh) = (self.width(), self.height());
        let x = x.min(lw);
        let y = y.min(lh);
        let w = w.min(lw - x);
        let h = h.min(lh - y);

        let (pw, ph) = (self.epd.width(), self.epd.height());
        let native = match self.rotation() {
            Rotation::Deg0 => Region::new(x, y, w, h),
            Rotation::Deg90 => Region::new(pw - y - h, x, h, w),
            Rotation::Deg180 => Region::new(pw - x - w, ph - y - h, w, h),
            Rotation::Deg270 => Region::new(y, ph - x - w, h, w),
        };

        let nx = native.x & !7;
        let nw = if native.w == 0 {
            0
        } else {
            ((native.w + (native.x & 7) + 7) & !7).min(pw - nx)
        };
        self.window = Region::new(nx, native.y, nw, native.h);
        self.partial = true;
        self.relayout();
        debug!("[EPD] partial window {:?}", self.window);
    }

    // no pages when a single window row does not fit the buffer
    fn layout_for(window: Region) -> PageLayout {
        let mut layout = PageLayout::new(window.w, window.h, N);
        let row_bytes = (window.w as usize).div_ceil(8);
        if row_bytes > N {
            log::warn!(
                "[EPD] page budget {} below one {} byte row, nothing will be drawn",
                N,
                row_bytes
            );
            layout.pages = 0;
        }
        layout
    }

    fn relayout(&mut self) {
        self.layout = Self::layout_for(self.window);
        self.current = 0;
        self.second_phase = false;
        self.page.discard_snapshot();
    }

    fn begin_current(&mut self) {
        let rows = self.layout.page_rows(self.current);
        self.page.begin(Region::new(
            self.window.x,
            self.window.y + rows.start,
            self.window.w,
            rows.end - rows.start,
        ));
    }

    pub fn first_page(&mut self) {
        self.current = 0;
        self.second_phase = false;
        self.page.discard_snapshot();
        self.begin_current();
    }

    fn flush_page(&mut self) {
        let win = self.page.page_window();
        if win.h == 0 {
            return;
        }
        let bitmap = self.page.bitmap();
        let (x, y) = (win.x as i32, win.y as i32);
        if self.second_phase {
            self.epd.write_image_again(&bitmap, x, y, ImageOpts::NONE);
        } else {
            self.epd.write_image(&bitmap, x, y, ImageOpts::NONE);
        }
    }

    fn refresh_active_window(&mut self) {
        if self.partial {
            let w = self.window;
            self.epd.refresh_window(w.x as i32, w.y as i32, w.w, w.h);
        } else {
            self.epd.refresh(false);
        }
    }

    /// Flush the page just drawn; false once the frame is on the glass.
    pub fn next_page(&mut self) -> bool {
        if self.layout.pages == 0 {
            return false;
        }
        let fast = self.epd.panel().has_fast_partial_update;
        let single = self.layout.pages == 1;

        if single && !self.second_phase {
            self.page.take_snapshot();
        }
        self.flush_page();

        self.current += 1;
        if self.current < self.layout.pages {
            self.begin_current();
            return true;
        }

        if self.second_phase {
            self.second_phase = false;
            if !self.partial {
                self.epd.power_off();
            }
            return false;
        }

        self.refresh_active_window();

        if single {
            if fast && let Some((snapshot, win)) = self.page.snapshot() {
                self.epd
                    .write_image_again(&snapshot, win.x as i32, win.y as i32, ImageOpts::NONE);
            }
            if !self.partial {
                self.epd.power_off();
            }
            return false;
        }

        if fast {
            // same pages again into the previous plane
            self.second_phase = true;
            self.current = 0;
            self.begin_current();
            return true;
        }

        if !self.partial {
            self.epd.power_off();
        }
        false
    }

    /// Run `draw` once per page (twice per page on fast-partial panels).
    /// `draw` must paint the same content every time it is called.
    /// An empty window draws nothing and leaves the panel untouched.
    pub fn draw_paged<F: FnMut(&mut PageBuffer<N>)>(&mut self, mut draw: F) {
        self.first_page();
        if self.layout.pages == 0 {
            return;
        }
        loop {
            draw(&mut self.page);
            if !self.next_page() {
                break;
            }
        }
    }

    /// Redraw `dirty` (logical) with a partial refresh, or the whole
    /// screen when `dirty` is None, the panel has never been fully
    /// refreshed, or the ghost-cleanup interval is up.
    pub fn update<F: FnMut(&mut PageBuffer<N>)>(&mut self, dirty: Option<Region>, draw: F) {
        let initial = self.epd.state().initial_refresh;
        let full = match dirty {
            Some(_) if self.policy.full_due() => {
                info!("[EPD] full refresh (ghost cleanup)");
                true
            }
            Some(_) => initial || !self.epd.panel().has_partial_update,
            None => true,
        };

        match dirty {
            Some(r) if !full => self.set_partial_window(r.x, r.y, r.w, r.h),
            _ => self.set_full_window(),
        }
        self.draw_paged(draw);
        self.policy.record(full);
    }

    pub fn clear_screen(&mut self, value: u8) {
        // the clear is a full refresh on first use or without partial support
        let full = self.epd.state().initial_refresh || !self.epd.panel().has_partial_update;
        self.epd.clear_screen(value);
        self.policy.record(full);
    }

    pub fn power_off(&mut self) {
        self.epd.power_off();
    }

    pub fn hibernate(&mut self) {
        self.epd.hibernate();
    }
}
