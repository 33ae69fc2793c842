use embassy_time::{Duration, Timer};

use crate::error::Error;
use crate::gpio::{Direction, GpioPort, Level, Line};

/// Bit period the chip is known to be happy with.
pub const DEFAULT_BIT_DELAY: Duration = Duration::from_millis(1);

/// Bit-banged TM1637 serial link.
///
/// The data line is never driven high against the chip: a 0 is sent by
/// releasing the line (switching it to input) and a 1 by driving it. The
/// link is open loop, the acknowledge bit is sampled but never checked.
///
/// Idle state between phases: clock driven high, data released.
pub struct BitBangTransport<P> {
    port: P,
    bit_delay: Duration,
}

impl<P: GpioPort> BitBangTransport<P> {
    /// Takes ownership of the port and puts both lines into the idle state.
    pub fn new(mut port: P, bit_delay: Duration) -> Result<Self, Error<P::Error>> {
        port.set_direction(Line::Clock, Direction::Output).map_err(Error::Transport)?;
        port.write_level(Line::Clock, Level::High).map_err(Error::Transport)?;
        port.write_level(Line::Data, Level::Low).map_err(Error::Transport)?;
        port.set_direction(Line::Data, Direction::Input).map_err(Error::Transport)?;
        Ok(Self { port, bit_delay })
    }

    pub fn bit_delay(&self) -> Duration {
        self.bit_delay
    }

    async fn wait(&self) {
        Timer::after(self.bit_delay).await;
    }

    fn direction(&mut self, line: Line, direction: Direction) -> Result<(), Error<P::Error>> {
        self.port
            .set_direction(line, direction)
            .map_err(Error::Transport)
    }

    fn level(&mut self, line: Line, level: Level) -> Result<(), Error<P::Error>> {
        self.port.write_level(line, level).map_err(Error::Transport)
    }

    /// Start condition: data pulled low while the clock is high.
    pub async fn start(&mut self) -> Result<(), Error<P::Error>> {
        self.direction(Line::Data, Direction::Output)?;
        self.wait().await;
        Ok(())
    }

    /// Stop condition: data released while the clock is high.
    pub async fn stop(&mut self) -> Result<(), Error<P::Error>> {
        // data may only change while the clock is low, otherwise the chip
        // sees another start condition
        self.level(Line::Clock, Level::Low)?;
        self.level(Line::Data, Level::Low)?;
        self.direction(Line::Data, Direction::Output)?;
        self.wait().await;
        self.level(Line::Clock, Level::High)?;
        self.wait().await;
        self.direction(Line::Data, Direction::Input)?;
        self.wait().await;
        Ok(())
    }

    /// Shifts one byte out, LSB first, followed by the acknowledge clock.
    pub async fn write_byte(&mut self, byte: u8) -> Result<(), Error<P::Error>> {
        let mut b = byte;
        for _ in 0..8 {
            self.level(Line::Clock, Level::Low)?;
            self.wait().await;
            if b & 1 != 0 {
                self.direction(Line::Data, Direction::Output)?;
                self.level(Line::Data, Level::High)?;
            } else {
                self.direction(Line::Data, Direction::Input)?;
                self.level(Line::Data, Level::Low)?;
            }
            self.wait().await;
            self.level(Line::Clock, Level::High)?;
            self.wait().await;
            b >>= 1;
        }

        self.level(Line::Clock, Level::Low)?;
        self.direction(Line::Data, Direction::Input)?;
        self.wait().await;
        self.level(Line::Clock, Level::High)?;
        self.wait().await;
        #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
        let ack = self.port.read_level(Line::Data).map_err(Error::Transport)?;
        #[cfg(feature = "defmt")]
        if ack == Level::High {
            defmt::trace!("no ack for {=u8:#x}", byte);
        }
        Ok(())
    }

    /// Switches both lines to input, leaving the bus to the pull resistors.
    pub fn release(&mut self) -> Result<(), Error<P::Error>> {
        self.direction(Line::Clock, Direction::Input)?;
        self.direction(Line::Data, Direction::Input)
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    #[cfg(test)]
    pub(crate) fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use std::vec;

    use super::*;
    use crate::mock::{MockPort, Op, PinFault};

    fn transport() -> BitBangTransport<MockPort> {
        let mut t = BitBangTransport::new(MockPort::new(), Duration::from_ticks(0)).unwrap();
        t.port.ops.clear();
        t
    }

    #[test]
    fn new_leaves_bus_idle() {
        let t = BitBangTransport::new(MockPort::new(), DEFAULT_BIT_DELAY).unwrap();
        assert_eq!(
            t.port.ops,
            vec![
                Op::Direction(Line::Clock, Direction::Output),
                Op::Write(Line::Clock, Level::High),
                Op::Write(Line::Data, Level::Low),
                Op::Direction(Line::Data, Direction::Input),
            ]
        );
        assert_eq!(t.bit_delay(), Duration::from_millis(1));
    }

    #[test]
    fn start_only_turns_data_to_output() {
        let mut t = transport();
        block_on(t.start()).unwrap();
        assert_eq!(t.port.ops, vec![Op::Direction(Line::Data, Direction::Output)]);
    }

    #[test]
    fn stop_ends_with_data_released() {
        let mut t = transport();
        block_on(t.stop()).unwrap();
        assert_eq!(
            t.port.ops,
            vec![
                Op::Write(Line::Clock, Level::Low),
                Op::Write(Line::Data, Level::Low),
                Op::Direction(Line::Data, Direction::Output),
                Op::Write(Line::Clock, Level::High),
                Op::Direction(Line::Data, Direction::Input),
            ]
        );
    }

    #[test]
    fn write_byte_lsb_first() {
        let mut t = transport();
        block_on(t.write_byte(0b0000_0101)).unwrap();

        let ops = &t.port.ops;
        // bit 0 = 1: driven high
        assert_eq!(
            ops[..5],
            [
                Op::Write(Line::Clock, Level::Low),
                Op::Direction(Line::Data, Direction::Output),
                Op::Write(Line::Data, Level::High),
                Op::Write(Line::Clock, Level::High),
                Op::Write(Line::Clock, Level::Low),
            ]
        );
        // bit 1 = 0: released
        assert_eq!(ops[5], Op::Direction(Line::Data, Direction::Input));
        assert_eq!(ops[6], Op::Write(Line::Data, Level::Low));
        // 8 data clocks plus the acknowledge clock
        let rising = ops
            .iter()
            .filter(|op| **op == Op::Write(Line::Clock, Level::High))
            .count();
        assert_eq!(rising, 9);
        assert_eq!(ops.last(), Some(&Op::Read(Line::Data)));
    }

    #[test]
    fn framed_bytes_decode() {
        let mut t = transport();
        block_on(async {
            t.start().await?;
            t.write_byte(0xc0).await?;
            t.write_byte(0x3f).await?;
            t.stop().await?;
            t.start().await?;
            t.write_byte(0x88).await?;
            t.stop().await
        })
        .unwrap();
        assert_eq!(t.port.decode_phases(), vec![vec![0xc0, 0x3f], vec![0x88]]);
    }

    #[test]
    fn gpio_failure_aborts_byte() {
        let mut t = transport();
        t.port.fail_after = Some(3);
        assert_eq!(block_on(t.write_byte(0xff)), Err(Error::Transport(PinFault)));
        assert_eq!(t.port.ops.len(), 3);
    }

    #[test]
    fn release_switches_both_lines_to_input() {
        let mut t = transport();
        t.release().unwrap();
        let port = t.into_inner();
        assert_eq!(
            port.ops,
            vec![
                Op::Direction(Line::Clock, Direction::Input),
                Op::Direction(Line::Data, Direction::Input),
            ]
        );
    }
}
