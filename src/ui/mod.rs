// Screens for 1-bit e-paper: printer status, boot and kill screens.
// Everything draws through embedded-graphics into a PageBuffer, so a
// screen is rendered page by page without a full framebuffer.

pub mod icons;
pub mod layout;
pub mod message;
pub mod numfmt;
pub mod screens;
pub mod stack_fmt;
pub mod status;
mod widget;

pub use layout::{FontMetrics, StatusLayout};
pub use message::MessageScroller;
pub use screens::{BootScreen, draw_kill_screen};
pub use stack_fmt::StackFmt;
pub use status::{
    AxisReading, ChamberReading, FanReading, HeaterReading, MachineStatus, StatusScreen,
};
pub use widget::{Region, wrap_next};
