// printink firmware entry point
//
// Boot: hardware -> panel init and clear -> boot screen -> status loop.
// Every tick the message line is refreshed; every few ticks the whole
// status screen is. Both are partial refreshes and the refresh policy
// forces a full one now and then to clear ghosting.
// Readings are simulated until a printer link feeds MachineStatus.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use log::info;

use printink::board::Board;
use printink::drivers::epd::WHITE;
use printink::drivers::interface::{InitKind, ResetMode};
use printink::drivers::page::Rotation;
use printink::ui::{
    AxisReading, BootScreen, FanReading, HeaterReading, MachineStatus, Region, StatusScreen,
};

esp_bootloader_esp_idf::esp_app_desc!();

const VERSION: &str = env!("CARGO_PKG_VERSION");
const URL: &str = env!("CARGO_PKG_REPOSITORY");
const CREDITS: &[&str] = &["» e-paper status display", "» GDEW0371W7 / UC8171"];

const BOOT_SCREEN_MS: u32 = 3_000;
const STATUS_INTERVAL_MS: u32 = 1_000;
// ticks between readings refreshes; the message line scrolls every tick
const READINGS_EVERY: u32 = 5;

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("booting...");

    let mut board = Board::init(peripherals);
    let display = &mut board.display;
    let delay = Delay::new();

    display.init(InitKind::Cold, ResetMode::ActiveDrive);
    display.clear_screen(WHITE);
    display.set_rotation(Rotation::Deg90);
    info!("hardware initialized.");

    let boot = BootScreen {
        logo: None,
        version: VERSION,
        url: URL,
        credits: CREDITS,
    };
    display.set_full_window();
    display.draw_paged(|page| {
        let _ = boot.draw(page);
    });
    display.power_off();
    delay.delay_millis(BOOT_SCREEN_MS);

    let mut screen: StatusScreen = StatusScreen::new(display.width(), display.height());
    screen.set_message("printink ready. waiting for printer link");
    info!("ui ready.");

    let fans = [
        FanReading::Speed {
            percent: 100,
            slowed: None,
        },
        FanReading::Unavailable,
    ];
    let mut hotends = [HeaterReading {
        current: 21.0,
        target: 210.0,
        idle: false,
    }];
    let mut bed = HeaterReading {
        current: 21.0,
        target: 60.0,
        idle: false,
    };
    let mut secs: u32 = 0;
    let mut ticks: u32 = 0;
    let mut blink = false;
    let whole = Region::new(0, 0, display.width(), display.height());
    let message_line = screen.layout().status_region();

    loop {
        blink = !blink;
        screen.tick(blink);

        // warm up toward the targets
        hotends[0].current += (hotends[0].target - hotends[0].current) * 0.1;
        bed.current += (bed.target - bed.current) * 0.1;

        let homed = AxisReading {
            value: 0.0,
            homed: true,
            known: true,
        };
        let status = MachineStatus {
            axes: [homed, homed, homed],
            feedrate_percent: 100,
            hotends: &hotends,
            bed: Some(bed),
            chamber: None,
            fans: &fans,
            progress: Some(((secs / 36) % 101) as u8),
            elapsed_secs: secs,
        };

        let dirty = if ticks % READINGS_EVERY == 0 {
            whole
        } else {
            message_line
        };
        display.update(Some(dirty), |page| {
            let _ = screen.draw(page, &status);
        });

        delay.delay_millis(STATUS_INTERVAL_MS);
        secs += STATUS_INTERVAL_MS / 1000;
        ticks = ticks.wrapping_add(1);
    }
}
