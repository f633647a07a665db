//! ESP32-C3 board support: a GDEW0371W7 on SPI2.
//!
//! Maps the physical wiring in [`pins`] to a ready [`PagedDisplay`] so
//! the firmware never touches GPIO numbers.

pub mod pins;

use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    peripherals::Peripherals,
    spi,
    time::Rate,
};

use crate::display::PagedDisplay;
use crate::drivers::epd::Epd;
use crate::drivers::interface::{ConnectionConfig, EpdInterface};
use crate::drivers::panel::GDEW0371W7;
use crate::drivers::transport::{EPD_SPI_HZ, HardwareSpi};

// Type Aliases
pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type Interface = EpdInterface<
    HardwareSpi<SpiBus>,
    Output<'static>,
    Output<'static>,
    Output<'static>,
    Input<'static>,
    Delay,
>;
pub type Display = PagedDisplay<Interface>;

/// Complete board hardware, ready for driver initialization.
pub struct Board {
    pub display: Display,
}

impl Board {
    pub fn init(p: Peripherals) -> Self {
        Board {
            display: Self::init_display(p),
        }
    }

    fn init_display(p: Peripherals) -> Display {
        // GPIO setup
        let cs = Output::new(p.GPIO21, Level::High, OutputConfig::default());
        let dc = Output::new(p.GPIO4, Level::High, OutputConfig::default());
        let rst = Output::new(p.GPIO5, Level::High, OutputConfig::default());
        let busy = Input::new(p.GPIO6, InputConfig::default().with_pull(Pull::None));

        // SPI bus; CS stays a plain GPIO so one select spans command + data
        let spi_cfg = spi::master::Config::default()
            .with_frequency(Rate::from_hz(EPD_SPI_HZ))
            .with_mode(spi::Mode::_0);
        let spi_bus = spi::master::Spi::new(p.SPI2, spi_cfg)
            .unwrap()
            .with_sck(p.GPIO8)
            .with_mosi(p.GPIO10);

        let io = EpdInterface::new(
            HardwareSpi::new(spi_bus),
            cs,
            dc,
            Some(rst),
            Some(busy),
            Delay::new(),
            ConnectionConfig::for_panel(&GDEW0371W7),
        );

        PagedDisplay::new(Epd::new(io, &GDEW0371W7))
    }
}
