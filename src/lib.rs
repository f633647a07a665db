// Paged e-paper display driver and printer status screens for
// GDEW0371W7 / GDEQ0426T82 panels over embedded-hal 1.0.

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "esp32c3")]
pub mod board;
pub mod display;
pub mod drivers;
pub mod ui;

pub use display::{PagedDisplay, RefreshPolicy};
pub use drivers::epd::Epd;
pub use drivers::panel::{GDEQ0426T82, GDEW0371W7, PanelDescriptor, PanelModel};
