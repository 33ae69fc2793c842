use embassy_rp::Peripheral;
use embassy_rp::flash::{self, Blocking, ERASE_SIZE, Flash, Instance};

/// First byte of a stored record. Bump it when the layout of the stored
/// type changes so old records fall back to the defaults.
const MAGIC: u8 = 0xa1;

#[derive(defmt::Format, Debug)]
pub enum Error {
    DataTooLarge(usize),
    BadMagic(u8),
    Flash(flash::Error),
    Postcard(postcard::Error),
}

/// A single settings record in one flash sector, stored as
/// `MAGIC | cobs(postcard(C))`.
pub struct NonVolatileConfig<'d, C, T, const FLASH_SIZE: usize, const OFFSET: u32, const N: usize>
where
    T: Instance,
{
    buf: [u8; N],
    flash: Flash<'d, T, Blocking, FLASH_SIZE>,
    _pd: core::marker::PhantomData<C>,
}

impl<'d, C, T, const FLASH_SIZE: usize, const OFFSET: u32, const N: usize>
    NonVolatileConfig<'d, C, T, FLASH_SIZE, OFFSET, N>
where
    T: Instance,
    C: Default + serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn new(flash: impl Peripheral<P = T> + 'd) -> Self {
        Self {
            buf: [0; N],
            flash: Flash::<_, Blocking, FLASH_SIZE>::new_blocking(flash),
            _pd: core::marker::PhantomData,
        }
    }

    /// An erased, foreign or corrupt sector is replaced with the defaults.
    /// Flash errors are passed through.
    pub fn read_or_default(&mut self) -> Result<C, Error> {
        match self.read() {
            r @ (Ok(..) | Err(Error::Flash(..))) => r,
            Err(e) => {
                defmt::info!("stored config unusable ({}), writing defaults", e);
                let default = C::default();
                self.write(&default)?;
                Ok(default)
            }
        }
    }

    pub fn read(&mut self) -> Result<C, Error> {
        self.flash.blocking_read(OFFSET, self.buf.as_mut_slice())?;
        match self.buf[0] {
            MAGIC => Ok(postcard::from_bytes_cobs(&mut self.buf[1..])?),
            other => Err(Error::BadMagic(other)),
        }
    }

    pub fn write(&mut self, value: &C) -> Result<(), Error> {
        self.buf[0] = MAGIC;
        let len = postcard::to_slice_cobs(value, &mut self.buf[1..])
            .map_err(|e| match e {
                postcard::Error::SerializeBufferFull => Error::DataTooLarge(N),
                e => Error::Postcard(e),
            })?
            .len()
            + 1;
        let erase_size = ((len + ERASE_SIZE) / ERASE_SIZE * ERASE_SIZE) as u32;
        self.flash.blocking_erase(OFFSET, OFFSET + erase_size)?;
        self.flash.blocking_write(OFFSET, &self.buf[..len])?;
        defmt::debug!("config written, {} bytes", len);
        Ok(())
    }
}

impl From<flash::Error> for Error {
    fn from(e: flash::Error) -> Self {
        Self::Flash(e)
    }
}

impl From<postcard::Error> for Error {
    fn from(e: postcard::Error) -> Self {
        Self::Postcard(e)
    }
}
