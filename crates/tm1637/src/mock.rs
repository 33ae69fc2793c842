//! Recording [`GpioPort`] for tests.

use std::vec::Vec;

use crate::gpio::{Direction, GpioPort, Level, Line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Direction(Line, Direction),
    Write(Line, Level),
    Read(Line),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

#[derive(Default)]
pub struct MockPort {
    pub ops: Vec<Op>,
    /// Fail every operation once this many operations have succeeded.
    pub fail_after: Option<usize>,
    /// Last level written to each line, reported back by `read_level`.
    clk: Option<Level>,
    dio: Option<Level>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&mut self, op: Op) -> Result<(), PinFault> {
        if self.fail_after.is_some_and(|n| self.ops.len() >= n) {
            return Err(PinFault);
        }
        self.ops.push(op);
        Ok(())
    }

    fn level(&mut self, line: Line) -> &mut Option<Level> {
        match line {
            Line::Clock => &mut self.clk,
            Line::Data => &mut self.dio,
        }
    }

    /// Replays the recorded operations as the chip would see them and
    /// returns the bytes that were clocked in, grouped by start/stop phase.
    ///
    /// A data line configured as input reads low (external pull-down).
    pub fn decode_phases(&self) -> Vec<Vec<u8>> {
        let mut phases = Vec::new();
        let mut current: Option<Vec<u8>> = None;
        let mut dio_dir = Direction::Input;
        let mut dio_level = Level::Low;
        let mut clk_high = true;
        let mut bits: Vec<bool> = Vec::new();

        for op in &self.ops {
            match *op {
                Op::Direction(Line::Data, dir) => {
                    if dir == Direction::Output && dio_dir == Direction::Input && clk_high {
                        // data pulled low while the clock idles high: start condition
                        current = Some(Vec::new());
                        bits.clear();
                    } else if dir == Direction::Input && clk_high {
                        // data released with the clock high: stop condition
                        if let Some(bytes) = current.take() {
                            phases.push(bytes);
                        }
                    }
                    dio_dir = dir;
                }
                Op::Write(Line::Data, level) => dio_level = level,
                Op::Write(Line::Clock, Level::High) => {
                    if !clk_high {
                        let bit = dio_dir == Direction::Output && dio_level == Level::High;
                        bits.push(bit);
                        if bits.len() == 9 {
                            // 8 data bits then the acknowledge slot
                            let byte = bits[..8]
                                .iter()
                                .rev()
                                .fold(0_u8, |acc, b| (acc << 1) | *b as u8);
                            if let Some(bytes) = current.as_mut() {
                                bytes.push(byte);
                            }
                            bits.clear();
                        }
                    }
                    clk_high = true;
                }
                Op::Write(Line::Clock, Level::Low) => clk_high = false,
                _ => (),
            }
        }
        phases
    }
}

impl GpioPort for MockPort {
    type Error = PinFault;

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), PinFault> {
        self.check(Op::Direction(line, direction))
    }

    fn write_level(&mut self, line: Line, level: Level) -> Result<(), PinFault> {
        self.check(Op::Write(line, level))?;
        *self.level(line) = Some(level);
        Ok(())
    }

    fn read_level(&mut self, line: Line) -> Result<Level, PinFault> {
        self.check(Op::Read(line))?;
        Ok(self.level(line).unwrap_or(Level::Low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_last_written_level() {
        let mut port = MockPort::new();
        assert_eq!(port.read_level(Line::Data), Ok(Level::Low));
        port.write_level(Line::Data, Level::High).unwrap();
        port.set_direction(Line::Data, Direction::Input).unwrap();
        assert_eq!(port.read_level(Line::Data), Ok(Level::High));
        assert_eq!(port.read_level(Line::Clock), Ok(Level::Low));
        assert_eq!(
            port.ops,
            [
                Op::Read(Line::Data),
                Op::Write(Line::Data, Level::High),
                Op::Direction(Line::Data, Direction::Input),
                Op::Read(Line::Data),
                Op::Read(Line::Clock),
            ]
        );
    }
}
