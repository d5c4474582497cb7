//! Runtime bus address negotiation between two identical sensors
//!
//! Both sensors leave the factory answering on the same address. The addon
//! sensor is kept off the bus by a [`BusGate`] while the primary one is moved
//! up by [`ADDON_OFFSET`] address register steps. Once the move is verified
//! the addon is powered and both can be reached.

use embedded_hal::delay::DelayNs;

use crate::{
    error::Error,
    gate::{BusGate, GateFault, GateLine},
    register::{STRAP_MASK, SlaveAddressRegister},
    sensor::AngleSensor,
};

/// Address register steps between the factory address and the addon address
pub const ADDON_OFFSET: u8 = 4;

/// Highest 7-bit bus address
const MAX_ADDRESS: u8 = 0x7F;

/// How the address of a sensor was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// No move needed, the sensor stays on its base address
    Base,
    /// The sensor already answered on the addon address
    AlreadyMoved,
    /// The address register was rewritten and verified
    Reprogrammed {
        /// Register value before the write
        old_register: u8,
        /// Register value written and read back
        new_register: u8,
    },
}

/// Result of a successful negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Negotiation {
    /// Address now bound to the sensor
    pub address: u8,
    /// How it was reached
    pub outcome: Outcome,
}

/// Address negotiator for one sensor
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressNegotiator {
    base: u8,
    addon: bool,
    settle_ms: u32,
}

impl AddressNegotiator {
    /// `base` is the address before any reprogramming, `addon` whether the
    /// sensor must be moved and `settle_ms` the wait after a move
    #[must_use]
    pub const fn new(base: u8, addon: bool, settle_ms: u32) -> Self {
        Self {
            base,
            addon,
            settle_ms,
        }
    }

    /// Address the sensor answers on after being moved, `None` if it would
    /// not fit in 7 bits
    #[must_use]
    pub const fn target_address(&self) -> Option<u8> {
        match self.base.checked_add(ADDON_OFFSET << 2) {
            Some(target) if target <= MAX_ADDRESS => Some(target),
            _ => None,
        }
    }

    /// Resolve the bus address of `sensor`, reprogramming it if required
    ///
    /// `gate` controls the conflicting twin. It is switched off before any
    /// traffic and only switched on once no collision can happen. Running
    /// this twice is harmless: the second run finds the sensor on the target
    /// address and issues no write.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAddress`] if the target is not a 7-bit address
    /// - [`Error::Communication`] if a register access fails before the
    ///   address register is written
    /// - [`Error::Pin`] if the gate cannot be switched
    /// - [`Error::AddressMismatch`], [`Error::AddressVerification`] or
    ///   [`Error::AddressUnknown`] if the move does not land on the target
    ///   address. These are fatal, see [`Error::is_fatal`].
    pub fn negotiate<S, G, D>(
        &self,
        sensor: &mut S,
        gate: &mut G,
        delay: &mut D,
    ) -> Result<Negotiation, Error<S::BusError>>
    where
        S: AngleSensor,
        G: BusGate,
        D: DelayNs,
    {
        if !self.addon {
            sensor.set_address(self.base);
            return Ok(Negotiation {
                address: self.base,
                outcome: Outcome::Base,
            });
        }

        let Some(target) = self.target_address() else {
            #[cfg(feature = "defmt")]
            defmt::error!("0x{:02X} has no addon address", self.base);
            return Err(Error::InvalidAddress(self.base));
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "connecting to 0x{:02X}, reprogram to 0x{:02X}",
            self.base,
            target
        );

        switch(gate, false).map_err(Error::Pin)?;

        if sensor.probe(target) {
            #[cfg(feature = "defmt")]
            defmt::info!("0x{:02X} answers already", target);

            sensor.set_address(target);
            switch(gate, true).map_err(Error::Pin)?;
            return Ok(Negotiation {
                address: target,
                outcome: Outcome::AlreadyMoved,
            });
        }

        sensor.set_address(self.base);
        let old = SlaveAddressRegister(sensor.read_address_register()?);
        let new = old.offset_by(ADDON_OFFSET);
        let computed = new.bus_address(self.base & STRAP_MASK);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "reprogram: register 0x{:02X} -> 0x{:02X}, address 0x{:02X}",
            old.0,
            new.0,
            computed
        );

        if computed != target {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "register 0x{:02X} gives address 0x{:02X}, expected 0x{:02X}",
                new.0,
                computed,
                target
            );
            return Err(Error::AddressMismatch {
                expected: target,
                computed,
            });
        }

        // From here on the sensor may already answer on either address.
        let lost = |err: Error<S::BusError>| match err {
            Error::Communication(source) => {
                #[cfg(feature = "defmt")]
                defmt::error!("address write 0x{:02X} interrupted", new.0);
                Error::AddressUnknown {
                    written: new.0,
                    source,
                }
            }
            other => other,
        };

        sensor.write_address_register(new.0).map_err(lost)?;
        sensor.set_address(computed);

        let read = sensor.read_address_register().map_err(lost)?;
        if read != new.0 {
            #[cfg(feature = "defmt")]
            defmt::error!("address write failed: wrote 0x{:02X}, read 0x{:02X}", new.0, read);
            return Err(Error::AddressVerification {
                written: new.0,
                read,
            });
        }

        switch(gate, true).map_err(Error::Pin)?;
        delay.delay_ms(self.settle_ms);

        Ok(Negotiation {
            address: computed,
            outcome: Outcome::Reprogrammed {
                old_register: old.0,
                new_register: new.0,
            },
        })
    }
}

fn switch<G: BusGate>(gate: &mut G, enabled: bool) -> Result<(), GateLine> {
    gate.set_gate(enabled).map_err(|fault| {
        let line = fault.line();

        #[cfg(feature = "defmt")]
        defmt::error!("gate {} failed on {}", enabled, line);

        line
    })
}
