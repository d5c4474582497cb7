//! Diagnostics registers for AS5048B

/// Diagnostic flags from the `DIAG` register (0xFB) together with the
/// automatic gain control value from `AGC` (0xFA)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    flags: u8,
    agc: u8,
}

impl Diagnostics {
    /// Create diagnostics from raw register values
    #[must_use]
    pub const fn new(flags: u8, agc: u8) -> Self {
        Self { flags, agc }
    }

    /// Get the raw `DIAG` register value
    #[must_use]
    pub const fn raw(&self) -> u8 {
        self.flags
    }

    /// `COMP_HIGH`: Magnetic field too weak
    ///
    /// The AGC is at its maximum and cannot compensate any further
    #[must_use]
    pub const fn comp_high(&self) -> bool {
        self.flags & 0x08 != 0
    }

    /// `COMP_LOW`: Magnetic field too strong
    ///
    /// The AGC is at its minimum and cannot compensate any further
    #[must_use]
    pub const fn comp_low(&self) -> bool {
        self.flags & 0x04 != 0
    }

    /// COF: CORDIC overflow
    ///
    /// When this bit is set, angle and magnitude data is invalid
    #[must_use]
    pub const fn cordic_overflow(&self) -> bool {
        self.flags & 0x02 != 0
    }

    /// OCF: Offset compensation finished
    ///
    /// Set once after power-up, stays set afterwards
    #[must_use]
    pub const fn offset_comp_finished(&self) -> bool {
        self.flags & 0x01 != 0
    }

    /// Get the Automatic Gain Control (AGC) value
    ///
    /// - 0 = high magnetic field (close to sensor)
    /// - 255 = low magnetic field (far from sensor)
    #[must_use]
    pub const fn agc_value(&self) -> u8 {
        self.agc
    }

    /// Returns `true` if neither `COMP_HIGH` nor `COMP_LOW` is set
    #[must_use]
    pub const fn magnetic_field_ok(&self) -> bool {
        !self.comp_high() && !self.comp_low()
    }

    /// Returns `true` if offset compensation has finished, there's no CORDIC
    /// overflow and the magnetic field is within range
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.offset_comp_finished() && !self.cordic_overflow() && self.magnetic_field_ok()
    }
}
