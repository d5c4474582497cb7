//! Capability interface shared by the negotiator, the conditioner and the
//! encoder

use crate::error::Error;

/// Angle sensor reachable on an addressable bus
///
/// Every operation returns its own result; in addition the implementation
/// records the outcome of the most recent bus operation so that
/// [`AngleSensor::transaction_succeeded`] reflects it.
pub trait AngleSensor {
    /// Error type of the underlying bus
    type BusError;

    /// Read the current angle in degrees, in `[0, 360)`
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails
    fn read_angle(&mut self) -> Result<f32, Error<Self::BusError>>;

    /// Read the raw address configuration register
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails
    fn read_address_register(&mut self) -> Result<u8, Error<Self::BusError>>;

    /// Write the raw address configuration register
    ///
    /// The sensor answers on the new address as soon as the write completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails
    fn write_address_register(&mut self, value: u8) -> Result<(), Error<Self::BusError>>;

    /// Bus address used for subsequent transactions
    fn address(&self) -> u8;

    /// Change the bus address used for subsequent transactions
    fn set_address(&mut self, address: u8);

    /// Select the counting direction
    fn set_clockwise(&mut self, clockwise: bool);

    /// Check whether any device acknowledges `address`
    fn probe(&mut self, address: u8) -> bool;

    /// Outcome of the most recent bus operation
    fn transaction_succeeded(&self) -> bool;
}
