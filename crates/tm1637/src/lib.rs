//! Driver for TM1637 based four digit seven-segment displays.
//!
//! The chip talks a two-wire protocol that looks like I2C but is not: no
//! device address, LSB first, and the acknowledge is best ignored. The
//! protocol is bit-banged over any [`GpioPort`], and [`ClockEngine`] keeps
//! the display refreshed with the current time.
//!
//! ```text
//! ClockEngine -> DisplayController -> BitBangTransport -> GpioPort
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod controller;
pub mod error;
pub mod gpio;
pub mod segments;
pub mod time;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use clock::{ClockConfig, ClockEngine, HourFormat, StopOutcome, render};
pub use controller::{Brightness, DisplayController};
pub use error::Error;
pub use gpio::{Direction, GpioPort, Level, Line};
pub use segments::{DisplayFrame, SegmentMask};
pub use time::{TimeSource, UptimeClock};
pub use transport::BitBangTransport;
