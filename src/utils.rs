//! Utility functions for port bytes and EEPROM words.
//!
//! Port registers are 8 bits wide, one bit per I/O line. These helpers read,
//! modify and format them, and convert the IP configuration words stored in
//! the module EEPROM to and from [`Ipv4Addr`].
//!
//! # Example
//!
//! ```
//! use etherio::utils::{get_bit, set_bit, byte_to_bits, format_binary};
//!
//! let value: u8 = 0b1010_0101;
//!
//! assert!(get_bit(value, 0));
//! assert!(!get_bit(value, 1));
//!
//! let modified = set_bit(value, 1, true);
//! assert_eq!(modified, 0b1010_0111);
//!
//! let bits = byte_to_bits(value);
//! assert!(bits[7]);
//!
//! assert_eq!(format_binary(value), "0b1010_0101");
//! ```

use std::net::Ipv4Addr;

/// Gets a single bit from a port byte.
///
/// # Example
///
/// ```
/// use etherio::utils::get_bit;
///
/// let value: u8 = 0b0000_0101;
/// assert!(get_bit(value, 0));
/// assert!(!get_bit(value, 1));
/// assert!(get_bit(value, 2));
/// ```
#[inline]
pub fn get_bit(value: u8, bit: u8) -> bool {
    (value & (1 << bit)) != 0
}

/// Sets or clears a single bit in a port byte.
///
/// # Example
///
/// ```
/// use etherio::utils::set_bit;
///
/// assert_eq!(set_bit(0, 5, true), 0b0010_0000);
/// assert_eq!(set_bit(0xFF, 0, false), 0b1111_1110);
/// ```
#[inline]
pub fn set_bit(value: u8, bit: u8, state: bool) -> u8 {
    if state {
        value | (1 << bit)
    } else {
        value & !(1 << bit)
    }
}

/// Toggles a single bit in a port byte.
#[inline]
pub fn toggle_bit(value: u8, bit: u8) -> u8 {
    value ^ (1 << bit)
}

/// Converts a port byte to 8 booleans, index 0 being the LSB.
pub fn byte_to_bits(value: u8) -> [bool; 8] {
    std::array::from_fn(|i| get_bit(value, i as u8))
}

/// Converts 8 booleans, index 0 being the LSB, to a port byte.
///
/// # Example
///
/// ```
/// use etherio::utils::{bits_to_byte, byte_to_bits};
///
/// assert_eq!(bits_to_byte(&byte_to_bits(0x5A)), 0x5A);
/// ```
pub fn bits_to_byte(bits: &[bool; 8]) -> u8 {
    bits.iter()
        .enumerate()
        .filter(|(_, &on)| on)
        .fold(0, |acc, (i, _)| acc | (1 << i))
}

/// Returns the indices of the bits that are ON.
///
/// # Example
///
/// ```
/// use etherio::utils::get_on_bits;
///
/// assert_eq!(get_on_bits(0b0010_0101), vec![0, 2, 5]);
/// ```
pub fn get_on_bits(value: u8) -> Vec<u8> {
    (0..8).filter(|&i| get_bit(value, i)).collect()
}

/// Formats a port byte as `0b0000_0000`.
pub fn format_binary(value: u8) -> String {
    let binary = format!("{:08b}", value);
    format!("0b{}_{}", &binary[0..4], &binary[4..8])
}

/// Formats a port byte as `0x00`.
pub fn format_hex(value: u8) -> String {
    format!("0x{:02X}", value)
}

/// Joins the two EEPROM words holding an IPv4 address.
///
/// The first word holds the first two octets, each word high byte first.
///
/// # Example
///
/// ```
/// use etherio::utils::words_to_ipv4;
/// use std::net::Ipv4Addr;
///
/// assert_eq!(words_to_ipv4(0xC0A8, 0x0132), Ipv4Addr::new(192, 168, 1, 50));
/// ```
pub fn words_to_ipv4(first: u16, second: u16) -> Ipv4Addr {
    let [a, b] = first.to_be_bytes();
    let [c, d] = second.to_be_bytes();
    Ipv4Addr::new(a, b, c, d)
}

/// Splits an IPv4 address into the two EEPROM words that store it.
pub fn ipv4_to_words(ip: Ipv4Addr) -> (u16, u16) {
    let [a, b, c, d] = ip.octets();
    (u16::from_be_bytes([a, b]), u16::from_be_bytes([c, d]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bit() {
        let value: u8 = 0b1010_0101;
        assert!(get_bit(value, 0));
        assert!(!get_bit(value, 1));
        assert!(get_bit(value, 7));
    }

    #[test]
    fn test_set_bit() {
        assert_eq!(set_bit(0, 3, true), 0b0000_1000);
        assert_eq!(set_bit(0b0000_1000, 3, false), 0);
        assert_eq!(set_bit(0b0000_1000, 3, true), 0b0000_1000);
    }

    #[test]
    fn test_toggle_bit() {
        assert_eq!(toggle_bit(0, 7), 0x80);
        assert_eq!(toggle_bit(0x80, 7), 0);
    }

    #[test]
    fn test_byte_bits_roundtrip() {
        for value in [0x00, 0x01, 0x80, 0xA5, 0xFF] {
            assert_eq!(bits_to_byte(&byte_to_bits(value)), value);
        }
    }

    #[test]
    fn test_get_on_bits() {
        assert_eq!(get_on_bits(0), Vec::<u8>::new());
        assert_eq!(get_on_bits(0xFF), vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_binary(0x2A), "0b0010_1010");
        assert_eq!(format_hex(0x2A), "0x2A");
        assert_eq!(format_hex(0x05), "0x05");
    }

    #[test]
    fn test_ipv4_words() {
        let ip = Ipv4Addr::new(255, 255, 255, 0);
        assert_eq!(ipv4_to_words(ip), (0xFFFF, 0xFF00));
        let (w1, w2) = ipv4_to_words(Ipv4Addr::new(10, 10, 10, 10));
        assert_eq!(words_to_ipv4(w1, w2), Ipv4Addr::new(10, 10, 10, 10));
    }
}
