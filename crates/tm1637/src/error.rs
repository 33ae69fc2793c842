use core::fmt;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// A GPIO operation failed in the middle of a transfer.
    Transport(E),
    InvalidDigit(u8),
    InvalidSegmentCount(usize),
    InvalidAddress { address: u8, len: usize },
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport failure: {e:?}"),
            Error::InvalidDigit(d) => write!(f, "no segment mask for digit {d}"),
            Error::InvalidSegmentCount(n) => {
                write!(f, "expected 1 to 4 segment bytes, got {n}")
            }
            Error::InvalidAddress { address, len } => write!(
                f,
                "{len} segment bytes starting at address {address} do not fit the display"
            ),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}
