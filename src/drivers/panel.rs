// Static per-model capability descriptors.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelModel {
    /// 3.7" 240x416, UC81xx command set
    Gdew0371w7,
    /// 4.26" 800x480, SSD1677
    Gdeq0426t82,
}

/// Level the BUSY line sits at while the controller is working.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusyLevel {
    Low,
    High,
}

/// Blind wait times (ms) used when no busy line is wired, and as log hints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelTiming {
    pub power_on_ms: u32,
    pub power_off_ms: u32,
    pub full_refresh_ms: u32,
    pub partial_refresh_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelDescriptor {
    pub model: PanelModel,
    pub width: u16,
    pub height: u16,
    pub has_color: bool,
    pub has_partial_update: bool,
    pub has_fast_partial_update: bool,
    pub busy_level: BusyLevel,
    pub busy_timeout_us: u32,
    pub timing: PanelTiming,
}

impl PanelDescriptor {
    pub const fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    pub const fn buffer_bytes(&self) -> usize {
        self.row_bytes() * self.height as usize
    }
}

pub const GDEW0371W7: PanelDescriptor = PanelDescriptor {
    model: PanelModel::Gdew0371w7,
    width: 240,
    height: 416,
    has_color: false,
    has_partial_update: true,
    has_fast_partial_update: true,
    busy_level: BusyLevel::Low,
    busy_timeout_us: 10_000_000,
    timing: PanelTiming {
        power_on_ms: 40,
        power_off_ms: 40,
        full_refresh_ms: 4300,
        partial_refresh_ms: 1700,
    },
};

pub const GDEQ0426T82: PanelDescriptor = PanelDescriptor {
    model: PanelModel::Gdeq0426t82,
    width: 800,
    height: 480,
    has_color: false,
    has_partial_update: true,
    has_fast_partial_update: true,
    busy_level: BusyLevel::High,
    busy_timeout_us: 10_000_000,
    timing: PanelTiming {
        power_on_ms: 100,
        power_off_ms: 200,
        full_refresh_ms: 1600,
        partial_refresh_ms: 600,
    },
};

impl PanelModel {
    pub const fn descriptor(self) -> &'static PanelDescriptor {
        match self {
            PanelModel::Gdew0371w7 => &GDEW0371W7,
            PanelModel::Gdeq0426t82 => &GDEQ0426T82,
        }
    }
}
