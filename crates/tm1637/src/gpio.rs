//! The two GPIO lines the chip is wired to.
//!
//! Platforms implement [`GpioPort`] once for whatever pin API they have;
//! the protocol code above never touches pins directly.

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Clock,
    Data,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// High impedance, the external pull resistor decides the level.
    Input,
    Output,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// Direction and level control of the clock and data lines.
///
/// Switching a line to [`Direction::Output`] must not change the level it
/// was last written with.
pub trait GpioPort {
    type Error: core::fmt::Debug;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error>;

    fn write_level(&mut self, line: Line, level: Level) -> Result<(), Self::Error>;

    /// Only used to sample the acknowledge bit.
    fn read_level(&mut self, line: Line) -> Result<Level, Self::Error>;
}

impl<T: GpioPort + ?Sized> GpioPort for &mut T {
    type Error = T::Error;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error> {
        T::set_direction(self, line, direction)
    }

    fn write_level(&mut self, line: Line, level: Level) -> Result<(), Self::Error> {
        T::write_level(self, line, level)
    }

    fn read_level(&mut self, line: Line) -> Result<Level, Self::Error> {
        T::read_level(self, line)
    }
}
