#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::flash;
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, mutex::Mutex};
use embassy_time::Timer;
use static_cell::StaticCell;

use chrono::NaiveTime;

use tm1637::transport::DEFAULT_BIT_DELAY;
use tm1637::{
    BitBangTransport, Brightness, ClockConfig, ClockEngine, DisplayController, DisplayFrame,
    HourFormat, SegmentMask, UptimeClock,
};

use tm1637_clock::{flash::NonVolatileConfig, port::FlexPort};

use {defmt_rtt as _, panic_probe as _};

type Display = Mutex<ThreadModeRawMutex, DisplayController<FlexPort<'static>>>;
type Engine = ClockEngine<'static, ThreadModeRawMutex, FlexPort<'static>, UptimeClock>;

const FLASH_SIZE: usize = 2 * 1024 * 1024; // W25Q16JV
const ADDR_OFFSET: u32 = (FLASH_SIZE - flash::ERASE_SIZE) as u32;

// every segment and the colon
const PATTERN_LAMP_TEST: DisplayFrame = DisplayFrame([SegmentMask(0xff); 4]);

#[derive(Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize, defmt::Format)]
struct Config {
    brightness_percent: u8,
    military_time: bool,
    show_colon: bool,
    /// Time of day shown at power on, in seconds since midnight.
    start_of_day_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brightness_percent: 100,
            military_time: true,
            show_colon: true,
            start_of_day_secs: 12 * 60 * 60,
        }
    }
}

impl Config {
    fn brightness(&self) -> Brightness {
        Brightness::from_fraction(f32::from(self.brightness_percent) / 100.0)
    }

    fn hour_format(&self) -> HourFormat {
        if self.military_time {
            HourFormat::Military
        } else {
            HourFormat::Civil
        }
    }

    fn start_of_day(&self) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt(self.start_of_day_secs % 86_400, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    defmt::info!("Hello World!");

    let mut nvcfg = NonVolatileConfig::<_, _, FLASH_SIZE, ADDR_OFFSET, 64>::new(p.FLASH);
    let cfg: Config = defmt::unwrap!(nvcfg.read_or_default());
    defmt::info!("{}", cfg);

    let port = FlexPort::new(p.PIN_21, p.PIN_20);
    let transport = defmt::unwrap!(BitBangTransport::new(port, DEFAULT_BIT_DELAY));

    let display = {
        static DISPLAY: StaticCell<Display> = StaticCell::new();
        DISPLAY.init(Mutex::new(DisplayController::new(transport, cfg.brightness())))
    };

    if let Err(e) = display.lock().await.show(&PATTERN_LAMP_TEST).await {
        defmt::warn!("lamp test failed: {}", e);
    }
    Timer::after_secs(1).await;

    let engine = {
        static ENGINE: StaticCell<Engine> = StaticCell::new();
        ENGINE.init(ClockEngine::new(
            display,
            UptimeClock::new(cfg.start_of_day()),
            ClockConfig::default(),
        ))
    };

    defmt::unwrap!(spawner.spawn(task_clock(engine)));

    engine.set_colon_visible(cfg.show_colon);
    engine.start(cfg.hour_format());
}

#[embassy_executor::task]
async fn task_clock(engine: &'static Engine) {
    engine.run().await;
}
