// Command/data framing, reset and busy polling for SPI e-paper controllers.
// Owns the transport, the control pins and the delay source. Panel
// specific sequences live in the controller backends and only talk to
// the panel through the PanelIo trait below.
//
// Framing (one bus transaction per call):
//   command       CS low, DC low, byte, CS high, DC high
//   data          CS low, bytes, CS high
//   command+data  CS low, DC low, first byte, DC high, rest, CS high

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::panel::{BusyLevel, PanelDescriptor};
use super::transport::{SpiSettings, Transport};

const RESET_PULSE_MS: u32 = 20;
const RESET_SETTLE_MS: u32 = 200;
const BUSY_POLL_MS: u32 = 1;
const STREAM_CHUNK: usize = 32;

/// Placeholder for an unwired reset or busy line.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetMode {
    /// high 20 ms, low 20 ms, high, settle 200 ms
    #[default]
    ActiveDrive,
    /// low 20 ms, then released to the pull-up for 200 ms. The board
    /// wires RST as open-drain so `set_high` floats the line.
    Pulldown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitKind {
    /// first power-up: next write clears both RAM planes, next refresh is full
    #[default]
    Cold,
    /// controller kept its RAM; skip the forced clear and full refresh.
    /// After `hibernate` the RAM is lost and both are still forced.
    Warm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelState {
    Uninitialized,
    Active,
    PoweredDown,
    Hibernating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusyWait {
    Ready,
    TimedOut,
    /// no busy line; waited the fixed time instead
    Blind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub busy_level: BusyLevel,
    pub busy_timeout_us: u32,
    pub spi: SpiSettings,
}

impl ConnectionConfig {
    pub const fn for_panel(panel: &PanelDescriptor) -> Self {
        Self {
            busy_level: panel.busy_level,
            busy_timeout_us: panel.busy_timeout_us,
            spi: SpiSettings::EPD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverState {
    pub power_on: bool,
    pub hibernating: bool,
    pub using_partial_mode: bool,
    pub initial_write: bool,
    pub initial_refresh: bool,
    pub initialized: bool,
    /// controller registers loaded since the last reset
    pub init_done: bool,
    /// explicit power_off() since the last write or refresh
    pub powered_down: bool,
}

impl DriverState {
    pub const fn new() -> Self {
        Self {
            power_on: false,
            hibernating: false,
            using_partial_mode: false,
            initial_write: true,
            initial_refresh: true,
            initialized: false,
            init_done: false,
            powered_down: false,
        }
    }

    pub fn panel_state(&self) -> PanelState {
        if !self.initialized {
            PanelState::Uninitialized
        } else if self.hibernating {
            PanelState::Hibernating
        } else if self.powered_down && !self.power_on {
            PanelState::PoweredDown
        } else {
            PanelState::Active
        }
    }
}

impl Default for DriverState {
    fn default() -> Self {
        Self::new()
    }
}

/// What a controller backend needs from the wire.
pub trait PanelIo {
    fn init(&mut self, kind: InitKind, reset_mode: ResetMode);
    fn write_command(&mut self, command: u8);
    fn write_data(&mut self, data: &[u8]);
    /// First byte as command, the rest as its parameters.
    fn write_command_data(&mut self, bytes: &[u8]);
    /// Stream a data burst of any length inside one transaction.
    fn write_data_iter<I: IntoIterator<Item = u8>>(&mut self, data: I);
    /// `count` copies of `value` in one transaction.
    fn write_data_repeat(&mut self, value: u8, count: usize) {
        self.write_data_iter(core::iter::repeat_n(value, count));
    }
    fn wait_while_busy(&mut self, comment: &str, busy_time_ms: u32) -> BusyWait;
    fn delay_ms(&mut self, ms: u32);
    fn reset(&mut self);
    fn has_reset(&self) -> bool;
    fn state(&self) -> &DriverState;
    fn state_mut(&mut self) -> &mut DriverState;
}

pub struct EpdInterface<T, CS, DC, RST, BUSY, D> {
    transport: T,
    cs: CS,
    dc: DC,
    rst: Option<RST>,
    busy: Option<BUSY>,
    delay: D,
    config: ConnectionConfig,
    reset_mode: ResetMode,
    state: DriverState,
}

impl<T, CS, DC, RST, BUSY, D> EpdInterface<T, CS, DC, RST, BUSY, D>
where
    T: Transport,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    pub fn new(
        transport: T,
        cs: CS,
        dc: DC,
        rst: Option<RST>,
        busy: Option<BUSY>,
        delay: D,
        config: ConnectionConfig,
    ) -> Self {
        Self {
            transport,
            cs,
            dc,
            rst,
            busy,
            delay,
            config,
            reset_mode: ResetMode::ActiveDrive,
            state: DriverState::new(),
        }
    }

    /// Idle the control lines, reset the controller and start the bus.
    /// Safe to call again after `hibernate`.
    pub fn init(&mut self, kind: InitKind, reset_mode: ResetMode) {
        self.reset_mode = reset_mode;
        // RAM is gone after deep sleep, whatever the caller asks for
        let woke = self.state.hibernating;
        let _ = self.cs.set_high();
        let _ = self.dc.set_high();
        self.reset();
        self.transport.start();

        let cold = kind == InitKind::Cold;
        if cold || !woke {
            self.state.initial_write = cold;
            self.state.initial_refresh = cold;
        }
        self.state.power_on = false;
        self.state.using_partial_mode = false;
        self.state.hibernating = false;
        self.state.powered_down = false;
        self.state.init_done = false;
        self.state.initialized = true;

        log::info!(
            "[EPD] init {:?} via {:?}, reset {}, busy {}",
            kind,
            self.transport.mode(),
            if self.rst.is_some() { "wired" } else { "none" },
            if self.busy.is_some() { "wired" } else { "none" },
        );
    }

    pub fn reset(&mut self) {
        let Some(rst) = self.rst.as_mut() else {
            return;
        };
        match self.reset_mode {
            ResetMode::ActiveDrive => {
                let _ = rst.set_high();
                self.delay.delay_ms(RESET_PULSE_MS);
                let _ = rst.set_low();
                self.delay.delay_ms(RESET_PULSE_MS);
                let _ = rst.set_high();
                self.delay.delay_ms(RESET_SETTLE_MS);
            }
            ResetMode::Pulldown => {
                let _ = rst.set_low();
                self.delay.delay_ms(RESET_PULSE_MS);
                let _ = rst.set_high();
                self.delay.delay_ms(RESET_SETTLE_MS);
            }
        }
        self.state.hibernating = false;
        // controller forgot its registers
        self.state.init_done = false;
        self.state.power_on = false;
        self.state.using_partial_mode = false;
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn is_busy(&mut self) -> bool {
        let level = self.config.busy_level;
        match self.busy.as_mut() {
            // failed reads count as ready
            Some(pin) => match level {
                BusyLevel::High => pin.is_high().unwrap_or(false),
                BusyLevel::Low => pin.is_low().unwrap_or(false),
            },
            None => false,
        }
    }

    /// Hand back the owned peripherals.
    pub fn release(self) -> (T, CS, DC, Option<RST>, Option<BUSY>, D) {
        (self.transport, self.cs, self.dc, self.rst, self.busy, self.delay)
    }
}

impl<T, CS, DC, RST, BUSY, D> PanelIo for EpdInterface<T, CS, DC, RST, BUSY, D>
where
    T: Transport,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    fn init(&mut self, kind: InitKind, reset_mode: ResetMode) {
        EpdInterface::init(self, kind, reset_mode);
    }

    fn write_command(&mut self, command: u8) {
        self.transport.begin_transaction(&self.config.spi);
        let _ = self.dc.set_low();
        let _ = self.cs.set_low();
        self.transport.transfer(command);
        let _ = self.cs.set_high();
        let _ = self.dc.set_high();
        self.transport.end_transaction();
    }

    fn write_data(&mut self, data: &[u8]) {
        self.transport.begin_transaction(&self.config.spi);
        let _ = self.cs.set_low();
        self.transport.write(data);
        let _ = self.cs.set_high();
        self.transport.end_transaction();
    }

    fn write_command_data(&mut self, bytes: &[u8]) {
        let Some((&command, params)) = bytes.split_first() else {
            return;
        };
        self.transport.begin_transaction(&self.config.spi);
        let _ = self.dc.set_low();
        let _ = self.cs.set_low();
        self.transport.transfer(command);
        let _ = self.dc.set_high();
        self.transport.write(params);
        let _ = self.cs.set_high();
        self.transport.end_transaction();
    }

    fn write_data_iter<I: IntoIterator<Item = u8>>(&mut self, data: I) {
        self.transport.begin_transaction(&self.config.spi);
        let _ = self.cs.set_low();
        let mut chunk = [0u8; STREAM_CHUNK];
        let mut n = 0;
        for b in data {
            chunk[n] = b;
            n += 1;
            if n == STREAM_CHUNK {
                self.transport.write(&chunk);
                n = 0;
            }
        }
        if n > 0 {
            self.transport.write(&chunk[..n]);
        }
        let _ = self.cs.set_high();
        self.transport.end_transaction();
    }

    fn wait_while_busy(&mut self, comment: &str, busy_time_ms: u32) -> BusyWait {
        if self.busy.is_none() {
            self.delay.delay_ms(busy_time_ms);
            return BusyWait::Blind;
        }

        // controller needs a moment to raise BUSY after the command
        self.delay.delay_ms(BUSY_POLL_MS);
        let mut elapsed_us: u32 = 0;
        while self.is_busy() {
            if elapsed_us >= self.config.busy_timeout_us {
                log::warn!("[EPD] {} busy timeout after {} ms", comment, elapsed_us / 1000);
                return BusyWait::TimedOut;
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            elapsed_us = elapsed_us.saturating_add(BUSY_POLL_MS * 1000);
        }
        log::debug!("[EPD] {} done in {} ms", comment, elapsed_us / 1000);
        BusyWait::Ready
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn reset(&mut self) {
        EpdInterface::reset(self);
    }

    fn has_reset(&self) -> bool {
        self.rst.is_some()
    }

    fn state(&self) -> &DriverState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DriverState {
        &mut self.state
    }
}
