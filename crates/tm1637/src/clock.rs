//! Background clock refresh.
//!
//! [`ClockEngine::run`] is the one worker. It idles until [`ClockEngine::start`]
//! arms it, then redraws the whole display once per refresh period until
//! [`ClockEngine::stop`] clears the running flag. The controller and the
//! worker share nothing but atomics and two signals:
//!
//! - `wake`: controller -> worker, cuts any sleep short so a stop is seen
//!   within one frame transfer rather than one refresh period
//! - `idle`: worker -> controller, acknowledges that the loop has exited

use chrono::{NaiveTime, Timelike};
use embassy_futures::select::select;
use embassy_sync::{blocking_mutex::raw::RawMutex, mutex::Mutex, signal::Signal};
use embassy_time::{Duration, Timer, with_timeout};
use portable_atomic::{AtomicBool, Ordering};

use crate::controller::DisplayController;
use crate::error::Error;
use crate::gpio::GpioPort;
use crate::segments::{DisplayFrame, SegmentMask};
use crate::time::TimeSource;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourFormat {
    /// 0-23
    Military,
    /// 0-11, noon and midnight show as 0
    Civil,
}

impl HourFormat {
    fn modulus(self) -> u32 {
        match self {
            HourFormat::Military => 24,
            HourFormat::Civil => 12,
        }
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// One full blink cycle; the colon is lit for the first half.
    pub refresh_period: Duration,
    /// How long [`ClockEngine::stop`] waits for the worker to go idle.
    pub stop_timeout: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            refresh_period: Duration::from_secs(1),
            // a full frame takes ~200 bit periods, well below this
            stop_timeout: Duration::from_millis(1500),
        }
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The worker acknowledged the stop.
    Stopped,
    /// The worker did not go idle in time. It will still exit after the
    /// frame it is transmitting.
    TimedOut,
    NotRunning,
}

/// Hours and minutes as four digits. The hour tens digit is blanked when
/// zero, every other digit is always drawn.
pub fn render(time: NaiveTime, format: HourFormat) -> DisplayFrame {
    let hour = time.hour() % format.modulus();
    let minute = time.minute();
    DisplayFrame([
        if hour / 10 == 0 {
            SegmentMask::BLANK
        } else {
            digit(hour / 10)
        },
        digit(hour % 10),
        digit(minute / 10),
        digit(minute % 10),
    ])
}

fn digit(d: u32) -> SegmentMask {
    SegmentMask::from_digit(d as u8).unwrap_or(SegmentMask::BLANK)
}

pub struct ClockEngine<'d, M: RawMutex, P, T> {
    display: &'d Mutex<M, DisplayController<P>>,
    time: T,
    config: ClockConfig,
    running: AtomicBool,
    military: AtomicBool,
    colon: AtomicBool,
    attached: AtomicBool,
    wake: Signal<M, ()>,
    idle: Signal<M, ()>,
}

impl<'d, M, P, T> ClockEngine<'d, M, P, T>
where
    M: RawMutex,
    P: GpioPort,
    T: TimeSource,
{
    pub fn new(display: &'d Mutex<M, DisplayController<P>>, time: T, config: ClockConfig) -> Self {
        Self {
            display,
            time,
            config,
            running: AtomicBool::new(false),
            military: AtomicBool::new(true),
            colon: AtomicBool::new(false),
            attached: AtomicBool::new(false),
            wake: Signal::new(),
            idle: Signal::new(),
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn colon_visible(&self) -> bool {
        self.colon.load(Ordering::Relaxed)
    }

    /// Takes effect from the next refresh cycle.
    pub fn set_colon_visible(&self, visible: bool) {
        self.colon.store(visible, Ordering::Relaxed);
    }

    /// Returns `false`, changing nothing, if the clock is already running.
    pub fn start(&self, format: HourFormat) -> bool {
        if self.running.load(Ordering::Acquire) {
            #[cfg(feature = "defmt")]
            defmt::debug!("clock already running");
            return false;
        }
        self.military.store(format == HourFormat::Military, Ordering::Relaxed);
        self.idle.reset();
        self.running.store(true, Ordering::Release);
        self.wake.signal(());
        #[cfg(feature = "defmt")]
        defmt::info!("clock started ({})", format);
        true
    }

    pub async fn stop(&self) -> StopOutcome {
        if !self.running.swap(false, Ordering::AcqRel) {
            return StopOutcome::NotRunning;
        }
        self.wake.signal(());
        match with_timeout(self.config.stop_timeout, self.idle.wait()).await {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::info!("clock stopped");
                StopOutcome::Stopped
            }
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "clock worker still busy after {} ms",
                    self.config.stop_timeout.as_millis()
                );
                StopOutcome::TimedOut
            }
        }
    }

    /// Stops the clock and releases both GPIO lines.
    pub async fn cleanup(&self) -> Result<StopOutcome, Error<P::Error>> {
        let outcome = self.stop().await;
        self.display.lock().await.release()?;
        Ok(outcome)
    }

    /// The worker loop. Never returns, unless another `run` is already
    /// attached to this engine, in which case it returns at once.
    ///
    /// Dropping the future detaches it, so a new worker can take over.
    pub async fn run(&self) {
        if self.attached.swap(true, Ordering::AcqRel) {
            #[cfg(feature = "defmt")]
            defmt::error!("clock worker already attached");
            return;
        }
        let _attached = Attached(&self.attached);

        loop {
            self.wake.wait().await;
            while self.running.load(Ordering::Acquire) {
                self.refresh().await;
            }
            self.idle.signal(());
        }
    }

    /// One blink cycle.
    async fn refresh(&self) {
        let format = if self.military.load(Ordering::Relaxed) {
            HourFormat::Military
        } else {
            HourFormat::Civil
        };
        let frame = render(self.time.now(), format);

        if self.colon.load(Ordering::Relaxed) {
            let half = self.config.refresh_period / 2;
            self.show(&frame.with_colon(true)).await;
            if !self.sleep(half).await {
                return;
            }
            self.show(&frame).await;
            self.sleep(self.config.refresh_period - half).await;
        } else {
            self.show(&frame).await;
            self.sleep(self.config.refresh_period).await;
        }
    }

    /// A bad frame is dropped, the next cycle tries again.
    #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
    async fn show(&self, frame: &DisplayFrame) {
        let mut display = self.display.lock().await;
        if let Err(e) = display.show(frame).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("frame dropped: {}", defmt::Debug2Format(&e));
        }
    }

    /// Returns whether the clock should keep running.
    async fn sleep(&self, duration: Duration) -> bool {
        select(Timer::after(duration), self.wake.wait()).await;
        self.running.load(Ordering::Acquire)
    }
}

/// Clears the attached flag when the worker future goes away.
struct Attached<'a>(&'a AtomicBool);

impl Drop for Attached<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
