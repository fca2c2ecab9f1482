//! I2C bus shared by the converter, the DAC and the display.
//!
//! All three are driven from the main loop only, so the bus is guarded by
//! a `RefCell` instead of a mutex.

use core::cell::RefCell;

use crate::system::hal::i2c::I2c;
use crate::system::hal::pac::I2C1;
use crate::system::hal::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Error {
    /// The device did not acknowledge or the bus was disturbed.
    Transfer,
    /// The bus was already borrowed by another driver.
    Busy,
    /// The device did not finish its work in time.
    Timeout,
}

pub struct Bus {
    i2c: RefCell<I2c<I2C1>>,
}

impl Bus {
    #[must_use]
    pub fn new(i2c: I2c<I2C1>) -> Self {
        Self {
            i2c: RefCell::new(i2c),
        }
    }

    /// # Errors
    ///
    /// Fails if the device does not respond.
    pub fn write(&self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        let mut i2c = self.i2c.try_borrow_mut().map_err(|_| Error::Busy)?;
        i2c.write(address, bytes).map_err(|_| Error::Transfer)
    }

    /// # Errors
    ///
    /// Fails if the device does not respond.
    pub fn write_read(&self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Error> {
        let mut i2c = self.i2c.try_borrow_mut().map_err(|_| Error::Busy)?;
        i2c.write_read(address, bytes, buffer).map_err(|_| Error::Transfer)
    }
}
