use crate::error::Error;
use crate::gpio::GpioPort;
use crate::segments::{DisplayFrame, SegmentMask};
use crate::transport::BitBangTransport;

/// Data command: write to display registers, auto-increment address.
pub const DATA_COMMAND: u8 = 0x40;
/// Address command, low bits select the first digit register.
pub const ADDRESS_COMMAND: u8 = 0xc0;
/// Display control command with the display-on bit set, low bits are the
/// brightness.
pub const DISPLAY_COMMAND: u8 = 0x88;

/// Display intensity, 0 (dimmest) to 7.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Brightness(u8);

impl Brightness {
    pub const MAX: Brightness = Brightness(7);

    /// `floor(fraction * 7)`, with the fraction clamped to `0.0..=1.0`.
    /// NaN counts as 0.
    pub fn from_fraction(fraction: f32) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        // non-negative, so truncation is floor
        Brightness((fraction * 7.0) as u8)
    }

    pub const fn level(self) -> u8 {
        self.0
    }
}

/// Turns segment data into the chip's three command phases.
pub struct DisplayController<P> {
    transport: BitBangTransport<P>,
    brightness: Brightness,
}

impl<P: GpioPort> DisplayController<P> {
    pub fn new(transport: BitBangTransport<P>, brightness: Brightness) -> Self {
        Self {
            transport,
            brightness,
        }
    }

    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Writes 1 to 4 digit registers starting at `address`, then
    /// (re)applies the brightness.
    pub async fn set_segments(
        &mut self,
        segments: &[SegmentMask],
        address: u8,
    ) -> Result<(), Error<P::Error>> {
        if segments.is_empty() || segments.len() > DisplayFrame::DIGITS {
            return Err(Error::InvalidSegmentCount(segments.len()));
        }
        if address as usize + segments.len() > DisplayFrame::DIGITS {
            return Err(Error::InvalidAddress {
                address,
                len: segments.len(),
            });
        }

        let t = &mut self.transport;

        t.start().await?;
        t.write_byte(DATA_COMMAND).await?;
        t.stop().await?;

        t.start().await?;
        t.write_byte(ADDRESS_COMMAND | address).await?;
        for seg in segments {
            t.write_byte(seg.bits()).await?;
        }
        t.stop().await?;

        t.start().await?;
        t.write_byte(DISPLAY_COMMAND | self.brightness.level()).await?;
        t.stop().await?;

        Ok(())
    }

    pub async fn show(&mut self, frame: &DisplayFrame) -> Result<(), Error<P::Error>> {
        self.set_segments(frame.masks(), 0).await
    }

    /// Shows up to four decimal digits, left aligned.
    pub async fn show_digits(&mut self, digits: &[u8]) -> Result<(), Error<P::Error>> {
        if digits.is_empty() || digits.len() > DisplayFrame::DIGITS {
            return Err(Error::InvalidSegmentCount(digits.len()));
        }
        let mut masks = [SegmentMask::BLANK; DisplayFrame::DIGITS];
        for (mask, &d) in masks.iter_mut().zip(digits) {
            *mask = SegmentMask::from_digit(d).ok_or(Error::InvalidDigit(d))?;
        }
        self.set_segments(&masks[..digits.len()], 0).await
    }

    pub async fn clear(&mut self) -> Result<(), Error<P::Error>> {
        self.show(&DisplayFrame::BLANK).await
    }

    /// Leaves both lines released, see [`BitBangTransport::release`].
    pub fn release(&mut self) -> Result<(), Error<P::Error>> {
        self.transport.release()
    }

    pub fn into_inner(self) -> BitBangTransport<P> {
        self.transport
    }

    #[cfg(test)]
    pub(crate) fn port(&mut self) -> &mut P {
        self.transport.port_mut()
    }
}
