// Recording fakes for the panel interface.
// Every pin edge, bus byte and delay lands in one shared event log; the
// UC81xx decoder replays that log into controller RAM planes so tests
// can check what the panel would show.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use printink::display::PagedDisplay;
use printink::drivers::epd::Epd;
use printink::drivers::interface::{ConnectionConfig, EpdInterface, InitKind, ResetMode};
use printink::drivers::panel::PanelDescriptor;
use printink::drivers::transport::{SpiSettings, Transport, TransportMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Cs(bool),
    Dc(bool),
    Rst(bool),
    Begin,
    Byte(u8),
    End,
    DelayMs(u32),
    BusyRead,
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct FakeTransport(pub Log);

impl Transport for FakeTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Hardware
    }

    fn begin_transaction(&mut self, _settings: &SpiSettings) {
        self.0.borrow_mut().push(Event::Begin);
    }

    fn transfer(&mut self, byte: u8) -> u8 {
        self.0.borrow_mut().push(Event::Byte(byte));
        0
    }

    fn end_transaction(&mut self) {
        self.0.borrow_mut().push(Event::End);
    }
}

#[derive(Clone, Copy)]
pub enum Line {
    Cs,
    Dc,
    Rst,
}

pub struct RecPin {
    log: Log,
    line: Line,
}

impl RecPin {
    pub fn new(log: &Log, line: Line) -> Self {
        Self {
            log: log.clone(),
            line,
        }
    }

    fn record(&mut self, high: bool) {
        let ev = match self.line {
            Line::Cs => Event::Cs(high),
            Line::Dc => Event::Dc(high),
            Line::Rst => Event::Rst(high),
        };
        self.log.borrow_mut().push(ev);
    }
}

impl ErrorType for RecPin {
    type Error = Infallible;
}

impl OutputPin for RecPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

/// BUSY line that plays back scripted levels, then holds `idle_high`.
pub struct ScriptedBusy {
    log: Log,
    levels: VecDeque<bool>,
    idle_high: bool,
}

impl ScriptedBusy {
    pub fn new(log: &Log, levels: &[bool], idle_high: bool) -> Self {
        Self {
            log: log.clone(),
            levels: levels.iter().copied().collect(),
            idle_high,
        }
    }

    fn next(&mut self) -> bool {
        self.log.borrow_mut().push(Event::BusyRead);
        self.levels.pop_front().unwrap_or(self.idle_high)
    }
}

impl ErrorType for ScriptedBusy {
    type Error = Infallible;
}

impl InputPin for ScriptedBusy {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.next())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.next())
    }
}

pub struct RecDelay(pub Log);

impl DelayNs for RecDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(Event::DelayMs(ms));
    }
}

pub type FakeIface = EpdInterface<FakeTransport, RecPin, RecPin, RecPin, ScriptedBusy, RecDelay>;

pub struct Rig {
    pub log: Log,
    pub with_reset: bool,
    pub busy: Option<Vec<bool>>,
    pub config: Option<ConnectionConfig>,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            log: new_log(),
            with_reset: true,
            busy: None,
            config: None,
        }
    }

    pub fn without_reset(mut self) -> Self {
        self.with_reset = false;
        self
    }

    /// Wire BUSY; `levels` are played back first, then the line idles.
    pub fn with_busy(mut self, levels: &[bool]) -> Self {
        self.busy = Some(levels.to_vec());
        self
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn iface(&self, panel: &'static PanelDescriptor) -> FakeIface {
        use printink::drivers::panel::BusyLevel;
        let idle_high = panel.busy_level == BusyLevel::Low;
        EpdInterface::new(
            FakeTransport(self.log.clone()),
            RecPin::new(&self.log, Line::Cs),
            RecPin::new(&self.log, Line::Dc),
            self.with_reset.then(|| RecPin::new(&self.log, Line::Rst)),
            self.busy
                .as_ref()
                .map(|levels| ScriptedBusy::new(&self.log, levels, idle_high)),
            RecDelay(self.log.clone()),
            self.config.unwrap_or(ConnectionConfig::for_panel(panel)),
        )
    }

    pub fn epd(&self, panel: &'static PanelDescriptor) -> Epd<FakeIface> {
        let mut epd = Epd::new(self.iface(panel), panel);
        epd.init(InitKind::Cold, ResetMode::ActiveDrive);
        epd
    }

    pub fn display<const N: usize>(
        &self,
        panel: &'static PanelDescriptor,
    ) -> PagedDisplay<FakeIface, N> {
        PagedDisplay::new(self.epd(panel))
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }
}

/// Split the log into Begin..End transactions.
pub fn transactions(events: &[Event]) -> Vec<Vec<Event>> {
    let mut out = Vec::new();
    let mut cur: Option<Vec<Event>> = None;
    for &ev in events {
        match ev {
            Event::Begin => cur = Some(vec![ev]),
            Event::End => {
                if let Some(mut t) = cur.take() {
                    t.push(ev);
                    out.push(t);
                }
            }
            _ => {
                if let Some(t) = cur.as_mut() {
                    t.push(ev);
                }
            }
        }
    }
    out
}

/// Command bytes in order (bytes clocked while DC was low).
pub fn commands(events: &[Event]) -> Vec<u8> {
    let mut dc = true;
    let mut out = Vec::new();
    for &ev in events {
        match ev {
            Event::Dc(level) => dc = level,
            Event::Byte(b) if !dc => out.push(b),
            _ => {}
        }
    }
    out
}

/// Data bytes following each occurrence of `command`.
pub fn params_of(events: &[Event], command: u8) -> Vec<Vec<u8>> {
    let mut dc = true;
    let mut out: Vec<Vec<u8>> = Vec::new();
    let mut inside = false;
    for &ev in events {
        match ev {
            Event::Dc(level) => dc = level,
            Event::Byte(b) if !dc => {
                inside = b == command;
                if inside {
                    out.push(Vec::new());
                }
            }
            Event::Byte(b) if inside => {
                if let Some(last) = out.last_mut() {
                    last.push(b);
                }
            }
            _ => {}
        }
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refresh {
    Full,
    Partial { x: u16, y: u16, w: u16, h: u16 },
}

/// Replays a UC81xx byte stream into its two RAM planes.
pub struct Uc81xx {
    pub width: u16,
    pub height: u16,
    pub old: Vec<u8>,
    pub new: Vec<u8>,
    /// what the glass shows after the refreshes so far
    pub shown: Vec<u8>,
    pub refreshes: Vec<Refresh>,
    pub deep_sleep: bool,
    pub powered: bool,
    partial_in: bool,
    window: (u16, u16, u16, u16),
    cmd: Option<u8>,
    params: Vec<u8>,
    cursor: usize,
}

impl Uc81xx {
    pub fn new(width: u16, height: u16) -> Self {
        let n = width as usize / 8 * height as usize;
        Self {
            width,
            height,
            old: vec![0; n],
            new: vec![0; n],
            shown: vec![0; n],
            refreshes: Vec::new(),
            deep_sleep: false,
            powered: false,
            partial_in: false,
            window: (0, 0, width - 1, height - 1),
            cmd: None,
            params: Vec::new(),
            cursor: 0,
        }
    }

    pub fn replay(&mut self, events: &[Event]) {
        let mut dc = true;
        let mut cs_low = false;
        for &ev in events {
            match ev {
                Event::Dc(level) => dc = level,
                Event::Cs(level) => cs_low = !level,
                Event::Byte(b) if cs_low => {
                    if dc {
                        self.data(b);
                    } else {
                        self.command(b);
                    }
                }
                _ => {}
            }
        }
    }

    pub fn decode(width: u16, height: u16, events: &[Event]) -> Self {
        let mut d = Self::new(width, height);
        d.replay(events);
        d
    }

    fn ram_addr(&self, i: usize) -> Option<usize> {
        let rb_screen = self.width as usize / 8;
        if !self.partial_in {
            return (i < self.new.len()).then_some(i);
        }
        let (x, y, xe, ye) = self.window;
        let rb = (xe as usize - x as usize + 1) / 8;
        let row = i / rb;
        let col = i % rb;
        if y as usize + row > ye as usize {
            return None;
        }
        Some((y as usize + row) * rb_screen + x as usize / 8 + col)
    }

    fn command(&mut self, c: u8) {
        self.cmd = Some(c);
        self.params.clear();
        self.cursor = 0;
        match c {
            0x02 => self.powered = false,
            0x04 => self.powered = true,
            0x91 => self.partial_in = true,
            0x92 => self.partial_in = false,
            0x12 => self.refresh(),
            _ => {}
        }
    }

    fn refresh(&mut self) {
        let rb = self.width as usize / 8;
        if self.partial_in {
            let (x, y, xe, ye) = self.window;
            for row in y..=ye {
                for col in x as usize / 8..=xe as usize / 8 {
                    let a = row as usize * rb + col;
                    self.shown[a] = self.new[a];
                }
            }
            self.refreshes.push(Refresh::Partial {
                x,
                y,
                w: xe - x + 1,
                h: ye - y + 1,
            });
        } else {
            self.shown.copy_from_slice(&self.new);
            self.refreshes.push(Refresh::Full);
        }
    }

    fn data(&mut self, b: u8) {
        match self.cmd {
            Some(0x10) | Some(0x13) => {
                if let Some(a) = self.ram_addr(self.cursor) {
                    if self.cmd == Some(0x10) {
                        self.old[a] = b;
                    } else {
                        self.new[a] = b;
                    }
                }
                self.cursor += 1;
            }
            Some(0x90) => {
                self.params.push(b);
                if self.params.len() == 9 {
                    let p = &self.params;
                    let be = |i: usize| u16::from_be_bytes([p[i], p[i + 1]]);
                    self.window = (be(0), be(4), be(2), be(6));
                }
            }
            Some(0x07) if b == 0xA5 => self.deep_sleep = true,
            _ => {}
        }
    }

    /// Byte at pixel row `y`, byte column `col` of the displayed image.
    pub fn shown_byte(&self, col: usize, y: usize) -> u8 {
        self.shown[y * self.width as usize / 8 + col]
    }
}
