//! Port register definitions.
//!
//! Every port on an Ether I/O module is a group of 8-bit registers. A register
//! is selected on the wire by a one-byte prefix in front of the port letter; the
//! value register has no prefix at all.
//!
//! | Register | Selector | Bit = 1 means | Devices |
//! |----------|:--------:|---------------|---------|
//! | Value | (none) | line high | all |
//! | Direction | `!` | input | all |
//! | Pull-up | `@` | pull-up disabled | all |
//! | Threshold | `#` | 1.4 V threshold (0 = 2.5 V) | IO24R |
//! | Schmitt | `$` | schmitt trigger disabled | IO24R |
//!
//! # Example
//!
//! ```
//! use etherio::Register;
//!
//! assert_eq!(Register::Direction.selector(), Some(b'!'));
//! assert_eq!(Register::Value.selector(), None);
//! assert!(Register::Schmitt.requires_io24r());
//! ```

/// Port direction value configuring all eight lines as inputs.
pub const PORT_DIR_INPUT: u8 = 0xFF;

/// Port direction value configuring all eight lines as outputs.
pub const PORT_DIR_OUTPUT: u8 = 0x00;

/// Internal marker standing in for the value register's empty selector.
pub(crate) const VALUE_MARKER: u8 = b'_';

/// Selector of the newer pull-up command on IO24T/IO72T.
pub(crate) const PULL_UP_ALT_SELECTOR: u8 = b'%';

/// Registers addressable on each port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Line levels; reads inputs, drives outputs.
    Value,
    /// Line direction (0 = output, 1 = input).
    Direction,
    /// Pull-up resistors (0 = enabled, 1 = disabled).
    PullUp,
    /// Input threshold (0 = 2.5 V, 1 = 1.4 V). IO24R only.
    Threshold,
    /// Schmitt trigger (0 = enabled, 1 = disabled). IO24R only.
    Schmitt,
}

impl Register {
    /// All registers in wire-documentation order.
    pub const ALL: [Register; 5] = [
        Register::Value,
        Register::Direction,
        Register::PullUp,
        Register::Threshold,
        Register::Schmitt,
    ];

    /// Returns the selector byte sent in front of the port letter.
    ///
    /// The value register is addressed by the bare port letter and has none.
    pub fn selector(self) -> Option<u8> {
        match self {
            Register::Value => None,
            Register::Direction => Some(b'!'),
            Register::PullUp => Some(b'@'),
            Register::Threshold => Some(b'#'),
            Register::Schmitt => Some(b'$'),
        }
    }

    /// Returns the register for a normalized selector byte.
    pub(crate) fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            VALUE_MARKER => Some(Register::Value),
            b'!' => Some(Register::Direction),
            b'@' | PULL_UP_ALT_SELECTOR => Some(Register::PullUp),
            b'#' => Some(Register::Threshold),
            b'$' => Some(Register::Schmitt),
            _ => None,
        }
    }

    /// Returns whether the register exists only on the IO24R.
    pub fn requires_io24r(self) -> bool {
        matches!(self, Register::Threshold | Register::Schmitt)
    }

    /// Builds the read command for this register on `port` (`'A'..='I'`).
    pub(crate) fn read_bytes(self, port: char) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2);
        bytes.extend(self.selector());
        bytes.push(port.to_ascii_lowercase() as u8);
        bytes
    }

    /// Builds the write command setting this register on `port` to `value`.
    pub(crate) fn write_bytes(self, port: char, value: u8) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(3);
        bytes.extend(self.selector());
        bytes.push(port.to_ascii_uppercase() as u8);
        bytes.push(value);
        bytes
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Register::Value => "value",
            Register::Direction => "direction",
            Register::PullUp => "pull-up",
            Register::Threshold => "threshold",
            Register::Schmitt => "schmitt",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        assert_eq!(Register::Value.selector(), None);
        assert_eq!(Register::Direction.selector(), Some(b'!'));
        assert_eq!(Register::PullUp.selector(), Some(b'@'));
        assert_eq!(Register::Threshold.selector(), Some(b'#'));
        assert_eq!(Register::Schmitt.selector(), Some(b'$'));
    }

    #[test]
    fn test_from_selector() {
        assert_eq!(Register::from_selector(b'_'), Some(Register::Value));
        assert_eq!(Register::from_selector(b'%'), Some(Register::PullUp));
        assert_eq!(Register::from_selector(b'$'), Some(Register::Schmitt));
        assert_eq!(Register::from_selector(b'&'), None);
    }

    #[test]
    fn test_requires_io24r() {
        assert!(!Register::Value.requires_io24r());
        assert!(!Register::Direction.requires_io24r());
        assert!(!Register::PullUp.requires_io24r());
        assert!(Register::Threshold.requires_io24r());
        assert!(Register::Schmitt.requires_io24r());
    }

    #[test]
    fn test_command_bytes() {
        assert_eq!(Register::Value.read_bytes('A'), b"a");
        assert_eq!(Register::Direction.read_bytes('c'), b"!c");
        assert_eq!(Register::Value.write_bytes('b', 0x2A), b"B\x2A");
        assert_eq!(Register::Schmitt.write_bytes('A', 0xFF), b"$A\xFF");
    }

    #[test]
    fn test_display() {
        assert_eq!(Register::PullUp.to_string(), "pull-up");
        assert_eq!(Register::Threshold.to_string(), "threshold");
    }
}
