//! Device kinds, their capabilities, and the pin address space.
//!
//! Pins are numbered flatly across the ports of a device: pin `i` lives in
//! port `i / 8` at bit `i % 8`.
//!
//! | Kind | Ports | Pins | Threshold/Schmitt | EEPROM write-protect |
//! |------|-------|-----:|:-----------------:|:--------------------:|
//! | IO24R | A-C | 24 | ✓ | ✓ |
//! | IO24T | A-C | 24 | ✗ | ✗ |
//! | IO72T | A-I | 72 | ✗ | ✗ |
//!
//! # Example
//!
//! ```
//! use etherio::DeviceKind;
//!
//! let pin = DeviceKind::IO72T.pin_location(42).unwrap();
//! assert_eq!(pin.port, 5);
//! assert_eq!(pin.bit, 2);
//! assert_eq!(pin.mask, 0b0000_0100);
//! assert_eq!(DeviceKind::IO72T.ports()[pin.port], 'F');
//! ```

use std::str::FromStr;

use crate::error::{EioError, Result};
use crate::register::Register;

/// Number of pins in one port.
pub const PINS_PER_PORT: usize = 8;

const PORT_LETTERS: [char; 9] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I'];

/// Supported Ether I/O module kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceKind {
    /// Ether I/O 24 R: 24 lines with threshold and schmitt control.
    IO24R,
    /// Ether I/O 24 TCP: 24 lines.
    IO24T,
    /// Ether I/O 72 TCP: 72 lines.
    IO72T,
}

/// What a device kind can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Number of 8-bit ports.
    pub port_count: usize,
    /// Threshold (`#`) and schmitt (`$`) registers are present.
    pub threshold_schmitt: bool,
    /// EEPROM write enable/disable and erase commands are present.
    pub eeprom_write_protect: bool,
    /// Identify command returning the MAC address.
    pub identify: &'static [u8],
    /// Reset command.
    pub reset: &'static [u8],
}

const IO24R_CAPS: Capabilities = Capabilities {
    port_count: 3,
    threshold_schmitt: true,
    eeprom_write_protect: true,
    identify: b"IO24",
    reset: b"'@\x00\xAA\x55",
};

const IO24T_CAPS: Capabilities = Capabilities {
    port_count: 3,
    threshold_schmitt: false,
    eeprom_write_protect: false,
    identify: b"IO24",
    reset: b"'@",
};

const IO72T_CAPS: Capabilities = Capabilities {
    port_count: 9,
    threshold_schmitt: false,
    eeprom_write_protect: false,
    identify: b"'IO72",
    reset: b"'@",
};

/// Location of a pin inside the port list of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLocation {
    /// Index into [`DeviceKind::ports`].
    pub port: usize,
    /// Bit position in the port (0-7).
    pub bit: u8,
    /// `1 << bit`.
    pub mask: u8,
}

impl DeviceKind {
    /// All device kinds.
    pub const ALL: [DeviceKind; 3] = [DeviceKind::IO24R, DeviceKind::IO24T, DeviceKind::IO72T];

    /// Returns the capability table entry for this kind.
    pub fn capabilities(self) -> &'static Capabilities {
        match self {
            DeviceKind::IO24R => &IO24R_CAPS,
            DeviceKind::IO24T => &IO24T_CAPS,
            DeviceKind::IO72T => &IO72T_CAPS,
        }
    }

    /// Returns the port letters of this kind, in pin order.
    pub fn ports(self) -> &'static [char] {
        &PORT_LETTERS[..self.capabilities().port_count]
    }

    /// Returns the number of pins on this kind.
    pub fn pin_count(self) -> usize {
        self.capabilities().port_count * PINS_PER_PORT
    }

    /// Returns the index of `port` in [`ports`](Self::ports), accepting either case.
    pub fn port_index(self, port: char) -> Option<usize> {
        let port = port.to_ascii_uppercase();
        self.ports().iter().position(|&p| p == port)
    }

    /// Returns whether `register` exists on this kind.
    ///
    /// # Example
    ///
    /// ```
    /// use etherio::{DeviceKind, Register};
    ///
    /// assert!(DeviceKind::IO24R.supports(Register::Threshold));
    /// assert!(!DeviceKind::IO72T.supports(Register::Schmitt));
    /// assert!(DeviceKind::IO72T.supports(Register::Direction));
    /// ```
    pub fn supports(self, register: Register) -> bool {
        !register.requires_io24r() || self.capabilities().threshold_schmitt
    }

    /// Fails with `UnsupportedRegister` if `register` does not exist on this kind.
    pub(crate) fn check_register(self, register: Register) -> Result<()> {
        if self.supports(register) {
            Ok(())
        } else {
            Err(EioError::unsupported_register(self, register))
        }
    }

    /// Maps a flat pin index to its port, bit and mask.
    ///
    /// # Errors
    ///
    /// Returns `EioError::OutOfRange` if `index` is negative or not below
    /// [`pin_count`](Self::pin_count).
    pub fn pin_location(self, index: impl Into<i64>) -> Result<PinLocation> {
        let index = index.into();
        let len = self.pin_count();
        let in_range = usize::try_from(index).ok().filter(|&i| i < len);
        let Some(i) = in_range else {
            return Err(EioError::out_of_range(index, len));
        };

        let bit = (i % PINS_PER_PORT) as u8;
        Ok(PinLocation {
            port: i / PINS_PER_PORT,
            bit,
            mask: 1 << bit,
        })
    }
}

impl PinLocation {
    /// Returns the flat pin index this location was derived from.
    pub fn index(self) -> usize {
        self.port * PINS_PER_PORT + self.bit as usize
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::IO24R => write!(f, "IO24R"),
            DeviceKind::IO24T => write!(f, "IO24T"),
            DeviceKind::IO72T => write!(f, "IO72T"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = EioError;

    fn from_str(s: &str) -> Result<Self> {
        DeviceKind::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| EioError::UnknownDeviceKind { name: s.to_string() })
    }
}
