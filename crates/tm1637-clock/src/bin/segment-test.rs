#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::Timer;

use tm1637::transport::DEFAULT_BIT_DELAY;
use tm1637::{BitBangTransport, Brightness, DisplayController, DisplayFrame, SegmentMask};

use tm1637_clock::port::FlexPort;

use {defmt_rtt as _, panic_probe as _};

/// Walks every digit through 0-9 with the colon toggling, then steps the
/// brightness up, to check the wiring of a freshly soldered module.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let port = FlexPort::new(p.PIN_21, p.PIN_20);
    let mut transport = defmt::unwrap!(BitBangTransport::new(port, DEFAULT_BIT_DELAY));

    let mut level = 0_u8;
    loop {
        let mut display =
            DisplayController::new(transport, Brightness::from_fraction(f32::from(level) / 7.0));
        defmt::info!("brightness {}", display.brightness());

        for i in 0..10_u8 {
            let digit = |n: u8| SegmentMask::from_digit((i + n) % 10).unwrap_or_default();
            let frame = DisplayFrame([digit(3), digit(2), digit(1), digit(0)]).with_colon(i & 1 == 0);
            if let Err(e) = display.show(&frame).await {
                defmt::warn!("{}", e);
            }
            Timer::after_millis(500).await;
        }

        transport = display.into_inner();
        level = (level + 1) % 8;
    }
}
