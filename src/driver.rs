//! Blocking driver for AS5048B magnetic position sensor

use embedded_hal::i2c::I2c;

use crate::{
    diagnostics::Diagnostics,
    error::Error,
    register::{self, Register, SlaveAddressRegister},
    sensor::AngleSensor,
    utils,
};

/// Factory bus address (address register 0, A1/A2 low)
pub const DEFAULT_ADDRESS: u8 = 0x40;

const MAX_RAW_ANGLE: u16 = 0x3FFF;

/// AS5048B driver instance
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct As5048b<I2C> {
    i2c: I2C,
    address: u8,
    clockwise: bool,
    last_ok: bool,
}

impl<I2C, E> As5048b<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Create a new AS5048B driver instance talking to `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            clockwise: false,
            last_ok: true,
        }
    }

    /// Release the I2C bus, consuming the driver
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn track<T>(&mut self, result: Result<T, E>) -> Result<T, Error<E>> {
        self.last_ok = result.is_ok();
        result.map_err(Error::Communication)
    }

    fn read_register(&mut self, register: Register) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        let result = self
            .i2c
            .write_read(self.address, &[u8::from(register)], &mut buf);
        self.track(result)?;

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "0x{:02X}: register 0x{:02X} = 0x{:02X}",
            self.address,
            u8::from(register),
            buf[0]
        );

        Ok(buf[0])
    }

    /// Read a 14-bit value split across `msb` and the register after it
    fn read_register_14bit(&mut self, msb: Register) -> Result<u16, Error<E>> {
        let mut buf = [0u8; 2];
        let result = self.i2c.write_read(self.address, &[u8::from(msb)], &mut buf);
        self.track(result)?;

        Ok(register::combine_14bit(buf[0], buf[1]))
    }

    fn write_register(&mut self, register: Register, data: u8) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "0x{:02X}: writing 0x{:02X} to register 0x{:02X}",
            self.address,
            data,
            u8::from(register)
        );

        let result = self.i2c.write(self.address, &[u8::from(register), data]);
        self.track(result)
    }

    /// Get the 14-bit angular position
    ///
    /// Value ranges from 0 to 16383 (0° to 359.978°). When the driver counts
    /// clockwise the value is mirrored.
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn angle(&mut self) -> Result<u16, Error<E>> {
        let raw = self.read_register_14bit(Register::AngleMsb)?;
        Ok(if self.clockwise {
            MAX_RAW_ANGLE - raw
        } else {
            raw
        })
    }

    /// Get the angular position in degrees, in `[0, 360)`
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn angle_degrees(&mut self) -> Result<f32, Error<E>> {
        self.angle().map(utils::raw_to_degrees)
    }

    /// Get the 14-bit magnitude value from CORDIC
    ///
    /// Useful for checking magnet presence and strength
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn magnitude(&mut self) -> Result<u16, Error<E>> {
        self.read_register_14bit(Register::MagnitudeMsb)
    }

    /// Get the diagnostics flags and AGC value
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn diagnostics(&mut self) -> Result<Diagnostics, Error<E>> {
        let agc = self.read_register(Register::Agc)?;
        let flags = self.read_register(Register::Diagnostics)?;
        Ok(Diagnostics::new(flags, agc))
    }

    /// Get the zero position the sensor subtracts from every angle
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn zero_position(&mut self) -> Result<u16, Error<E>> {
        self.read_register_14bit(Register::ZeroMsb)
    }

    /// Set the zero position (volatile, not burned into OTP)
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn set_zero_position(&mut self, value: u16) -> Result<(), Error<E>> {
        let value = value & MAX_RAW_ANGLE;
        #[allow(clippy::cast_possible_truncation)]
        let (msb, lsb) = ((value >> 6) as u8, (value & 0x3F) as u8);

        self.write_register(Register::ZeroMsb, msb)?;
        self.write_register(Register::ZeroLsb, lsb)
    }

    /// Get the slave address register
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn address_register(&mut self) -> Result<SlaveAddressRegister, Error<E>> {
        self.read_register(Register::SlaveAddress)
            .map(SlaveAddressRegister)
    }

    /// Write the slave address register
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails
    pub fn set_address_register(&mut self, value: SlaveAddressRegister) -> Result<(), Error<E>> {
        self.write_register(Register::SlaveAddress, value.0)
    }
}

impl<I2C, E> AngleSensor for As5048b<I2C>
where
    I2C: I2c<Error = E>,
{
    type BusError = E;

    fn read_angle(&mut self) -> Result<f32, Error<E>> {
        self.angle_degrees()
    }

    fn read_address_register(&mut self) -> Result<u8, Error<E>> {
        self.address_register().map(|reg| reg.0)
    }

    fn write_address_register(&mut self, value: u8) -> Result<(), Error<E>> {
        self.set_address_register(SlaveAddressRegister(value))
    }

    fn address(&self) -> u8 {
        self.address
    }

    fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    fn set_clockwise(&mut self, clockwise: bool) {
        self.clockwise = clockwise;
    }

    fn probe(&mut self, address: u8) -> bool {
        let result = self.i2c.write(address, &[]);
        self.last_ok = result.is_ok();

        #[cfg(feature = "defmt")]
        defmt::trace!("probe 0x{:02X}: {}", address, self.last_ok);

        self.last_ok
    }

    fn transaction_succeeded(&self) -> bool {
        self.last_ok
    }
}
