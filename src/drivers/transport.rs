// Byte transport under the panel interface.
// Hardware SPI (any embedded-hal SpiBus) or bit-banged SCK/MOSI.
// Chip select belongs to the interface, not the transport; a
// transaction here only scopes bus ownership. Bus errors are dropped:
// the panel is a write-only sink and nothing upstream could recover.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{MODE_0, Mode, SpiBus};

pub const EPD_SPI_HZ: u32 = 4_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    Hardware,
    BitBang,
}

/// Bus timing requested for each panel transaction. Always MSB first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiSettings {
    pub frequency_hz: u32,
    pub mode: Mode,
}

impl SpiSettings {
    pub const EPD: Self = Self {
        frequency_hz: EPD_SPI_HZ,
        mode: MODE_0,
    };
}

impl Default for SpiSettings {
    fn default() -> Self {
        Self::EPD
    }
}

pub trait Transport {
    fn mode(&self) -> TransportMode;

    /// Put the lines into their idle state; called from `init`.
    fn start(&mut self) {}

    fn begin_transaction(&mut self, settings: &SpiSettings);

    /// Shift one byte out MSB first; returns whatever was shifted in.
    fn transfer(&mut self, byte: u8) -> u8;

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.transfer(b);
        }
    }

    fn end_transaction(&mut self);
}

/// Hardware SPI peripheral. Clock rate and mode are fixed where the bus
/// is built; `SpiSettings::EPD` documents what the board must configure.
pub struct HardwareSpi<SPI> {
    spi: SPI,
    in_transaction: bool,
}

impl<SPI: SpiBus> HardwareSpi<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            in_transaction: false,
        }
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiBus> Transport for HardwareSpi<SPI> {
    fn mode(&self) -> TransportMode {
        TransportMode::Hardware
    }

    fn begin_transaction(&mut self, _settings: &SpiSettings) {
        if self.in_transaction {
            log::warn!("[EPD] nested bus transaction");
        }
        self.in_transaction = true;
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        let mut word = [byte];
        let _ = self.spi.transfer_in_place(&mut word);
        word[0]
    }

    fn write(&mut self, bytes: &[u8]) {
        let _ = self.spi.write(bytes);
    }

    fn end_transaction(&mut self) {
        // CS rises after this returns; the FIFO must be empty by then
        let _ = self.spi.flush();
        self.in_transaction = false;
    }
}

/// Software SPI on two GPIOs, mode 0: SCK idles low, MOSI is set up
/// before the rising edge. No MISO line, so `transfer` reads back 0.
pub struct BitBangSpi<SCK, MOSI> {
    sck: SCK,
    mosi: MOSI,
}

impl<SCK: OutputPin, MOSI: OutputPin> BitBangSpi<SCK, MOSI> {
    pub fn new(sck: SCK, mosi: MOSI) -> Self {
        Self { sck, mosi }
    }

    pub fn release(self) -> (SCK, MOSI) {
        (self.sck, self.mosi)
    }
}

impl<SCK: OutputPin, MOSI: OutputPin> Transport for BitBangSpi<SCK, MOSI> {
    fn mode(&self) -> TransportMode {
        TransportMode::BitBang
    }

    fn start(&mut self) {
        let _ = self.sck.set_low();
        let _ = self.mosi.set_low();
    }

    // no arbitration needed, the pins are ours alone
    fn begin_transaction(&mut self, _settings: &SpiSettings) {}

    fn transfer(&mut self, byte: u8) -> u8 {
        let mut value = byte;
        for _ in 0..8 {
            let _ = if value & 0x80 != 0 {
                self.mosi.set_high()
            } else {
                self.mosi.set_low()
            };
            let _ = self.sck.set_high();
            let _ = self.sck.set_low();
            value <<= 1;
        }
        0
    }

    fn end_transaction(&mut self) {}
}
