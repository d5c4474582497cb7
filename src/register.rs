//! Register addresses for AS5048B sensor.

/// Register addresses for AS5048B
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[repr(u8)]
pub enum Register {
    /// I2C slave address (bits 6..2 of the bus address)
    SlaveAddress = 0x15,
    /// Zero position, 8 most significant bits
    ZeroMsb = 0x16,
    /// Zero position, 6 least significant bits
    ZeroLsb = 0x17,

    /// Automatic gain control
    Agc = 0xFA,
    /// Diagnostic flags
    Diagnostics = 0xFB,
    /// CORDIC magnitude, 8 most significant bits
    MagnitudeMsb = 0xFC,
    /// CORDIC magnitude, 6 least significant bits
    MagnitudeLsb = 0xFD,
    /// Angle, 8 most significant bits
    AngleMsb = 0xFE,
    /// Angle, 6 least significant bits
    AngleLsb = 0xFF,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> u8 {
        reg as u8
    }
}

/// Bit of the address register that the sensor stores inverted
pub const INVERTED_ADDRESS_BIT: u8 = 1 << 4;

/// Mask of the bus address bits set by the A1/A2 strap pins
pub const STRAP_MASK: u8 = 0b11;

bitfield::bitfield! {
    /// I2C slave address register
    ///
    /// Holds bits 6..2 of the 7-bit bus address. Bit 4 of the register is
    /// stored inverted, so the factory value `0` maps to address `0x40`. The
    /// two lowest address bits come from the A1/A2 pins.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct SlaveAddressRegister(u8);
    impl Debug;
    u8;
    /// Programmable part of the address, bit 4 inverted
    pub fragment, set_fragment: 4, 0;
}

impl SlaveAddressRegister {
    /// Bus address this register selects, given the strap pin bits
    #[must_use]
    pub fn bus_address(&self, strap: u8) -> u8 {
        ((self.fragment() ^ INVERTED_ADDRESS_BIT) << 2) | (strap & STRAP_MASK)
    }

    /// Register value after moving the address up by `offset` fragment steps
    #[must_use]
    pub fn offset_by(&self, offset: u8) -> Self {
        let mut next = *self;
        next.set_fragment(self.fragment().wrapping_add(offset));
        next
    }
}

/// Combine the high and low halves of a 14-bit value
#[must_use]
pub(crate) fn combine_14bit(msb: u8, lsb: u8) -> u16 {
    (u16::from(msb) << 6) | u16::from(lsb & 0x3F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_register_selects_0x40() {
        assert_eq!(SlaveAddressRegister(0).bus_address(0), 0x40);
        assert_eq!(SlaveAddressRegister(0).bus_address(0b11), 0x43);
    }

    #[test]
    fn offset_register_inverts_bit_four() {
        let next = SlaveAddressRegister(3).offset_by(4);
        assert_eq!(next.0, 7);
        assert_eq!(next.bus_address(0), 92);
    }

    #[test]
    fn combines_14bit_halves() {
        assert_eq!(combine_14bit(0xFF, 0x3F), 0x3FFF);
        assert_eq!(combine_14bit(0x01, 0xC1), 0x41);
    }
}
