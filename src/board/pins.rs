//! GPIO |     Function    |      Notes
//! -----+-----------------+----------------------------------
//!  4   | EPD DC          | Data/Command select
//!  5   | EPD RST         | Reset (active low)
//!  6   | EPD BUSY        | Low while the controller is busy
//!  8   | SPI2 SCK        | 4 MHz, mode 0
//! 10   | SPI2 MOSI       | Display is write-only, no MISO
//! 21   | EPD CS          | Display chip select, driven by the interface

pub const EPD_CS: u8 = 21;
pub const EPD_DC: u8 = 4;
pub const EPD_RST: u8 = 5;
pub const EPD_BUSY: u8 = 6;

pub const SPI_SCK: u8 = 8;
pub const SPI_MOSI: u8 = 10;
