use core::convert::Infallible;

use embassy_rp::Peripheral;
use embassy_rp::gpio::{self, Flex, Pull};

use tm1637::{Direction, GpioPort, Level, Line};

/// The TM1637 clock and data lines on two RP2040 pins.
///
/// The module carries its own pull resistors, so the internal ones stay off.
pub struct FlexPort<'d> {
    clk: Flex<'d>,
    dio: Flex<'d>,
}

impl<'d> FlexPort<'d> {
    pub fn new(
        clk: impl Peripheral<P = impl gpio::Pin> + 'd,
        dio: impl Peripheral<P = impl gpio::Pin> + 'd,
    ) -> Self {
        let mut clk = Flex::new(clk);
        let mut dio = Flex::new(dio);
        clk.set_pull(Pull::None);
        dio.set_pull(Pull::None);
        Self { clk, dio }
    }

    fn pin(&mut self, line: Line) -> &mut Flex<'d> {
        match line {
            Line::Clock => &mut self.clk,
            Line::Data => &mut self.dio,
        }
    }
}

impl GpioPort for FlexPort<'_> {
    type Error = Infallible;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Infallible> {
        let pin = self.pin(line);
        match direction {
            Direction::Input => pin.set_as_input(),
            Direction::Output => pin.set_as_output(),
        }
        Ok(())
    }

    fn write_level(&mut self, line: Line, level: Level) -> Result<(), Infallible> {
        self.pin(line).set_level(match level {
            Level::Low => gpio::Level::Low,
            Level::High => gpio::Level::High,
        });
        Ok(())
    }

    fn read_level(&mut self, line: Line) -> Result<Level, Infallible> {
        Ok(Level::from(self.pin(line).is_high()))
    }
}
