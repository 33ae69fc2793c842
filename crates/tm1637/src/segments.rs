//
//     +- A -+
//     F     B
//     +- G -+
//     E     C
//     +- D -+
//
//    :GFEDCBA
const TABLE: [u8; 10] = [
    0b00111111_u8, // '0'
    0b00000110_u8, // '1'
    0b01011011_u8, // '2'
    0b01001111_u8, // '3'
    0b01100110_u8, // '4'
    0b01101101_u8, // '5'
    0b01111101_u8, // '6'
    0b00000111_u8, // '7'
    0b01111111_u8, // '8'
    0b01101111_u8, // '9'
];

/// The colon is wired to bit 7 of the second digit.
const MASK_COLON: u8 = 0b10000000;

const DIGITS: usize = 4;

/// Lit segments of one digit position.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentMask(pub u8);

impl SegmentMask {
    pub const BLANK: SegmentMask = SegmentMask(0);

    /// `None` for anything but 0-9.
    pub const fn from_digit(digit: u8) -> Option<Self> {
        if digit < 10 {
            Some(SegmentMask(TABLE[digit as usize]))
        } else {
            None
        }
    }

    pub const fn with_colon(self, colon: bool) -> Self {
        if colon {
            SegmentMask(self.0 | MASK_COLON)
        } else {
            SegmentMask(self.0 & !MASK_COLON)
        }
    }

    pub const fn has_colon(self) -> bool {
        self.0 & MASK_COLON != 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// A full rewrite of the four digit positions, left to right.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayFrame(pub [SegmentMask; DIGITS]);

impl DisplayFrame {
    pub const DIGITS: usize = DIGITS;

    pub const BLANK: DisplayFrame = DisplayFrame([SegmentMask::BLANK; DIGITS]);

    /// Sets or clears the colon, which lives on the hour units position.
    pub const fn with_colon(self, colon: bool) -> Self {
        let mut digits = self.0;
        digits[1] = digits[1].with_colon(colon);
        DisplayFrame(digits)
    }

    pub fn masks(&self) -> &[SegmentMask] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_table() {
        let expected = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f];
        for (d, mask) in expected.into_iter().enumerate() {
            assert_eq!(SegmentMask::from_digit(d as u8), Some(SegmentMask(mask)));
        }
    }

    #[test]
    fn digit_out_of_range() {
        assert_eq!(SegmentMask::from_digit(10), None);
        assert_eq!(SegmentMask::from_digit(0xff), None);
    }

    #[test]
    fn colon_only_touches_hour_units() {
        let eight = SegmentMask::from_digit(8).unwrap();
        let frame = DisplayFrame([eight; 4]);
        let with = frame.with_colon(true);
        assert_eq!(with.0[1], SegmentMask(0xff));
        assert!(with.0[1].has_colon());
        assert_eq!(with.0[0], eight);
        assert_eq!(with.0[2], eight);
        assert_eq!(with.0[3], eight);
        assert_eq!(with.with_colon(false), frame);
    }
}
