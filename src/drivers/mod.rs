// E-paper driver stack, board-independent.
//
// transport -> interface (pins, framing, reset, busy) -> controller
// backends -> epd (panel lifecycle) -> page (paged drawing).
// Only pin assignments and bus wiring (in board/) are board-specific.

pub mod bitmap;
pub mod epd;
pub mod gdeq0426t82;
pub mod gdew0371w7;
pub mod interface;
pub mod page;
pub mod panel;
pub mod transport;
