//! Power gating for a second sensor that shares the bus address
//!
//! The addon sensor is powered through two GPIO lines: one acting as its
//! supply and one as its ground. Floating both lines removes the device from
//! the bus entirely, so it cannot answer while the primary sensor is moved
//! away from the shared factory address.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

/// A GPIO line that can be released into a high-impedance state
pub trait TriStatePin: OutputPin {
    /// Switch the line to an input with pull resistors disabled
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be reconfigured
    fn set_high_impedance(&mut self) -> Result<(), Self::Error>;
}

/// Anything that can isolate a conflicting bus device
pub trait BusGate {
    /// Error raised when switching the gate
    type Error: GateFault;

    /// Power the gated device (`true`) or float it off the bus (`false`)
    ///
    /// # Errors
    ///
    /// Returns an error if a control line cannot be switched
    fn set_gate(&mut self, enabled: bool) -> Result<(), Self::Error>;
}

/// Gate error, naming the line that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateError<V, G> {
    /// Supply line
    Vdd(V),
    /// Ground line
    Gnd(G),
}

impl<V, G> GateFault for GateError<V, G> {
    fn line(&self) -> GateLine {
        match self {
            Self::Vdd(_) => GateLine::Vdd,
            Self::Gnd(_) => GateLine::Gnd,
        }
    }
}

/// Control line of a power gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateLine {
    /// Supply line
    Vdd,
    /// Ground line
    Gnd,
}

/// Gate error that can tell which line failed
pub trait GateFault {
    /// Line that could not be switched
    fn line(&self) -> GateLine;
}

impl GateFault for Infallible {
    fn line(&self) -> GateLine {
        match *self {}
    }
}

/// Two-line power gate
#[derive(Debug)]
pub struct PowerGate<VDD, GND> {
    vdd: VDD,
    gnd: GND,
    enabled: bool,
}

impl<VDD, GND> PowerGate<VDD, GND>
where
    VDD: TriStatePin,
    GND: TriStatePin,
{
    /// Create a gate from its supply and ground lines
    ///
    /// The lines are not touched until [`BusGate::set_gate`] is called.
    pub fn new(vdd: VDD, gnd: GND) -> Self {
        Self {
            vdd,
            gnd,
            enabled: false,
        }
    }

    /// Whether the gated device was last powered on
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Release the two lines
    pub fn release(self) -> (VDD, GND) {
        (self.vdd, self.gnd)
    }
}

impl<VDD, GND> BusGate for PowerGate<VDD, GND>
where
    VDD: TriStatePin,
    GND: TriStatePin,
{
    type Error = GateError<<VDD as ErrorType>::Error, <GND as ErrorType>::Error>;

    fn set_gate(&mut self, enabled: bool) -> Result<(), Self::Error> {
        if enabled {
            self.vdd.set_high().map_err(GateError::Vdd)?;
            self.gnd.set_low().map_err(GateError::Gnd)?;
        } else {
            self.vdd.set_high_impedance().map_err(GateError::Vdd)?;
            self.gnd.set_high_impedance().map_err(GateError::Gnd)?;
        }
        self.enabled = enabled;

        #[cfg(feature = "defmt")]
        defmt::debug!("addon sensor power: {}", enabled);

        Ok(())
    }
}

/// Gate for a sensor that has no conflicting twin
#[derive(Debug, Default, Clone, Copy)]
pub struct Ungated;

impl BusGate for Ungated {
    type Error = Infallible;

    fn set_gate(&mut self, _enabled: bool) -> Result<(), Infallible> {
        Ok(())
    }
}
