use crate::gate::GateLine;

/// Error type for AS5048B operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the sensor
    Communication(E),
    /// A gate control line could not be switched
    Pin(GateLine),
    /// The requested address does not fit in 7 bits. Nothing was sent.
    InvalidAddress(u8),
    /// The address derived from the address register does not match the
    /// address the sensor was supposed to move to. Nothing was written.
    AddressMismatch {
        /// Address the negotiation targeted
        expected: u8,
        /// Address computed from the register contents
        computed: u8,
    },
    /// The address register read back after reprogramming differs from the
    /// value written. The sensor is at an unknown address.
    AddressVerification {
        /// Register value written
        written: u8,
        /// Register value read back
        read: u8,
    },
    /// The bus failed while writing or reading back the address register.
    /// The sensor is at an unknown address.
    AddressUnknown {
        /// Register value that was being written
        written: u8,
        /// Bus error that interrupted the handshake
        source: E,
    },
}

impl<E> Error<E> {
    /// Whether the error leaves the sensor in an unknown addressed state.
    ///
    /// There is no recovery path for these at driver level; the caller must
    /// halt or fall back to a safe mode.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AddressMismatch { .. }
                | Self::AddressVerification { .. }
                | Self::AddressUnknown { .. }
        )
    }
}
