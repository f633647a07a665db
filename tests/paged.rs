mod common;

use common::{Refresh, Rig, Uc81xx, commands, params_of};
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use printink::display::RefreshPolicy;
use printink::drivers::epd::WHITE;
use printink::drivers::page::{PageBuffer, Rotation};
use printink::drivers::panel::{GDEQ0426T82, GDEW0371W7, PanelDescriptor};
use printink::ui::Region;
use proptest::prelude::*;

static NO_PARTIAL: PanelDescriptor = PanelDescriptor {
    has_partial_update: false,
    has_fast_partial_update: false,
    ..GDEW0371W7
};

fn bar<const N: usize>(page: &mut PageBuffer<N>, x: i32, y: i32, w: u32, h: u32) {
    let _ = Rectangle::new(Point::new(x, y), Size::new(w, h))
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(page);
}

fn decode(rig: &Rig) -> Uc81xx {
    Uc81xx::decode(240, 416, &rig.events())
}

#[test]
fn default_budget_splits_the_small_panel() {
    let rig = Rig::new();
    let d = rig.display::<800>(&GDEW0371W7);
    let layout = d.layout();
    assert_eq!(layout.page_height, 26);
    assert_eq!(layout.pages, 16);
}

#[test]
fn every_page_is_visited_once_per_phase() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    let mut windows = Vec::new();
    d.draw_paged(|page| {
        assert!(page.data().iter().all(|&b| b == 0xFF));
        windows.push(page.page_window());
    });

    // fast panel: write pass, then the previous-plane pass
    assert_eq!(windows.len(), 32);
    assert_eq!(windows[..16], windows[16..]);
    let mut next_y = 0;
    for w in &windows[..16] {
        assert_eq!((w.x, w.w), (0, 240));
        assert_eq!(w.y, next_y);
        next_y += w.h;
    }
    assert_eq!(next_y, 416);
}

#[test]
fn single_phase_without_fast_partial() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&NO_PARTIAL);
    let mut calls = 0;
    d.draw_paged(|_| calls += 1);
    assert_eq!(calls, 16);
    assert_eq!(decode(&rig).refreshes, vec![Refresh::Full]);
}

#[test]
fn paged_frame_reaches_the_glass() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    d.draw_paged(|page| bar(page, 0, 20, 240, 20));

    let dec = decode(&rig);
    assert_eq!(dec.refreshes, vec![Refresh::Full]);
    for y in 0..416 {
        let expect = if (20..40).contains(&y) { 0x00 } else { 0xFF };
        assert!((0..30).all(|c| dec.shown_byte(c, y) == expect), "row {y}");
    }
    assert_eq!(dec.old, dec.new);
    // full window ends powered off
    assert!(!dec.powered);
}

#[test]
fn redrawing_the_same_frame_changes_nothing() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    d.draw_paged(|page| bar(page, 10, 100, 50, 30));
    let first = decode(&rig);
    d.draw_paged(|page| bar(page, 10, 100, 50, 30));
    let second = decode(&rig);

    assert_eq!(first.new, second.new);
    assert_eq!(first.old, second.old);
    assert_eq!(first.shown, second.shown);
}

#[test]
fn partial_window_touches_only_its_bytes() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    d.clear_screen(WHITE);
    d.set_partial_window(13, 40, 10, 20);
    assert_eq!(d.window(), Region::new(8, 40, 16, 20));
    d.draw_paged(|page| bar(page, 0, 0, 240, 416));

    let dec = decode(&rig);
    assert_eq!(
        dec.refreshes.last(),
        Some(&Refresh::Partial {
            x: 8,
            y: 40,
            w: 16,
            h: 20
        })
    );
    for y in 40..60 {
        assert_eq!(dec.shown_byte(0, y), 0xFF);
        assert_eq!(dec.shown_byte(1, y), 0x00);
        assert_eq!(dec.shown_byte(2, y), 0x00);
        assert_eq!(dec.shown_byte(3, y), 0xFF);
        assert_eq!(dec.old[y * 30 + 1], 0x00);
    }
    assert_eq!(dec.shown_byte(1, 39), 0xFF);
    assert_eq!(dec.shown_byte(1, 60), 0xFF);
    // partial updates stay powered for the next one
    assert!(dec.powered);
}

#[test]
fn partial_window_falls_back_to_full_without_support() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&NO_PARTIAL);
    d.clear_screen(WHITE);
    d.set_partial_window(0, 0, 16, 16);
    d.draw_paged(|page| bar(page, 0, 0, 16, 16));

    assert_eq!(decode(&rig).refreshes, vec![Refresh::Full, Refresh::Full]);
}

#[test]
fn rotated_window_maps_to_native_rows() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    d.set_rotation(Rotation::Deg90);
    assert_eq!((d.width(), d.height()), (416, 240));

    // logical top strip -> native right-hand columns
    d.set_partial_window(0, 0, 416, 16);
    assert_eq!(d.window(), Region::new(224, 0, 16, 416));

    d.set_full_window();
    d.draw_paged(|page| bar(page, 0, 0, 416, 8));
    let dec = decode(&rig);
    for y in 0..416 {
        assert_eq!(dec.shown_byte(29, y), 0x00);
        assert_eq!(dec.shown_byte(28, y), 0xFF);
    }
}

#[test]
fn update_forces_full_refresh_on_interval() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    *d.policy_mut() = RefreshPolicy::new(2);
    let dirty = Region::new(0, 0, 16, 16);
    for _ in 0..4 {
        d.update(Some(dirty), |page| bar(page, 0, 0, 16, 16));
    }

    let part = Refresh::Partial {
        x: 0,
        y: 0,
        w: 16,
        h: 16,
    };
    assert_eq!(
        decode(&rig).refreshes,
        vec![Refresh::Full, part, part, Refresh::Full]
    );
}

#[test]
fn update_without_dirty_region_is_full() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    d.clear_screen(WHITE);
    d.update(None, |page| bar(page, 0, 0, 8, 8));
    assert_eq!(decode(&rig).refreshes.last(), Some(&Refresh::Full));
    assert!(!d.is_partial());
}

#[test]
fn ssd_panel_writes_both_planes_per_page() {
    let rig = Rig::new();
    let mut d = rig.display::<4000>(&GDEQ0426T82);
    assert_eq!(d.layout().pages, 12);
    d.draw_paged(|page| bar(page, 0, 0, 100, 100));

    let cmds = commands(&rig.events());
    let count = |c: u8| cmds.iter().filter(|&&x| x == c).count();
    // initial clear fills each plane once, then one write per page
    assert_eq!(count(0x24), 1 + 12);
    assert_eq!(count(0x26), 1 + 12);
}

#[test]
fn ssd_pages_map_to_flipped_ram_rows() {
    let rig = Rig::new();
    let mut d = rig.display::<4000>(&GDEQ0426T82);
    d.clear_screen(WHITE);
    rig.clear();
    assert_eq!(d.layout().page_height, 40);
    d.draw_paged(|page| bar(page, 0, 0, 100, 100));

    let events = rig.events();
    let y_range = params_of(&events, 0x45);
    let y_counter = params_of(&events, 0x4F);
    let x_range = params_of(&events, 0x44);
    // one RAM window per plane per page
    assert_eq!(y_range.len(), 24);

    // page 0 is rows 0..40, stored bottom up at 479..440
    assert_eq!(y_range[0], [0xDF, 0x01, 0xB8, 0x01]);
    assert_eq!(y_counter[0], [0xDF, 0x01]);
    assert_eq!(x_range[0], [0x00, 0x00, 0x1F, 0x03]);

    // last page is rows 440..480, stored at 39..0
    assert_eq!(y_range[23], [39, 0, 0, 0]);
    assert_eq!(y_counter[23], [39, 0]);
}

#[test]
fn partial_after_hibernate_is_upgraded_to_full() {
    use printink::drivers::interface::{InitKind, PanelState, ResetMode};

    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    d.draw_paged(|page| bar(page, 0, 0, 8, 8));
    d.hibernate();
    assert_eq!(d.epd().panel_state(), PanelState::Hibernating);
    assert!(decode(&rig).deep_sleep);

    d.init(InitKind::Warm, ResetMode::ActiveDrive);
    d.set_partial_window(0, 0, 8, 8);
    d.draw_paged(|page| bar(page, 0, 0, 8, 8));
    let dec = decode(&rig);
    assert_eq!(dec.refreshes.last(), Some(&Refresh::Full));
    assert_eq!(dec.shown_byte(0, 0), 0x00);
    assert_eq!(dec.shown_byte(1, 0), 0xFF);

    // the next one may be partial again
    d.draw_paged(|page| bar(page, 0, 0, 8, 8));
    assert!(matches!(
        decode(&rig).refreshes.last(),
        Some(Refresh::Partial { .. })
    ));
}

#[test]
fn empty_partial_window_leaves_a_cold_panel_alone() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    rig.clear();
    // x at the right edge clips the width to zero
    d.set_partial_window(240, 0, 8, 8);
    assert_eq!(d.window().w, 0);
    assert_eq!(d.layout().pages, 0);

    let mut calls = 0;
    d.draw_paged(|_| calls += 1);
    assert_eq!(calls, 0);
    assert!(rig.events().is_empty());
    assert!(d.epd().state().initial_write);
    assert!(d.epd().state().initial_refresh);
}

#[test]
fn empty_rotated_window_draws_nothing() {
    let rig = Rig::new();
    let mut d = rig.display::<800>(&GDEW0371W7);
    d.clear_screen(WHITE);
    d.set_rotation(Rotation::Deg90);
    rig.clear();
    // zero logical height is zero native width
    d.set_partial_window(0, 10, 32, 0);
    d.draw_paged(|page| bar(page, 0, 0, 416, 240));
    assert!(rig.events().is_empty());
}

proptest! {
    #[test]
    fn partial_window_is_an_aligned_superset(
        x in 0u16..240,
        y in 0u16..416,
        w in 1u16..300,
        h in 1u16..500,
    ) {
        let rig = Rig::new();
        let mut d = rig.display::<800>(&GDEW0371W7);
        d.set_partial_window(x, y, w, h);
        let win = d.window();
        let cw = w.min(240 - x);
        let ch = h.min(416 - y);

        prop_assert_eq!(win.x % 8, 0);
        prop_assert!(win.w % 8 == 0 || win.x + win.w == 240);
        prop_assert!(win.x <= x);
        prop_assert!(win.x + win.w >= x + cw);
        prop_assert!(win.x + win.w <= 240);
        prop_assert_eq!((win.y, win.h), (y, ch));
    }

    #[test]
    fn rotated_partial_window_covers_the_request(
        x in 0u16..416,
        y in 0u16..240,
        w in 1u16..416,
        h in 1u16..240,
    ) {
        let rig = Rig::new();
        let mut d = rig.display::<800>(&GDEW0371W7);
        d.set_rotation(Rotation::Deg90);
        d.set_partial_window(x, y, w, h);
        let win = d.window();
        let cw = w.min(416 - x);
        let ch = h.min(240 - y);
        // logical rows run right to left across native columns
        let nx = 240 - y - ch;

        prop_assert_eq!(win.x % 8, 0);
        prop_assert!(win.x <= nx);
        prop_assert!(win.x + win.w >= nx + ch);
        prop_assert!(win.x + win.w <= 240);
        prop_assert_eq!((win.y, win.h), (x, cw));
    }
}
