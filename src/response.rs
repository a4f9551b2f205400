//! Response decoding.
//!
//! Ether I/O responses are short and unframed. The useful data always sits at a
//! fixed position:
//!
//! | Command | Response | Data |
//! |---------|----------|------|
//! | Register read | echo of the selector and port, then the value | last byte |
//! | EEPROM read word | `R`, register, two data bytes | last two bytes, low byte first |
//! | Identify | model string, MAC, firmware version | bytes 4..10 are the MAC |
//!
//! # Example
//!
//! ```
//! use etherio::Response;
//!
//! let response = Response::new(b"!A\x0F".to_vec());
//! assert_eq!(response.register_value().unwrap(), 0x0F);
//! ```

use crate::error::{EioError, Result};

const MAC_RANGE: std::ops::Range<usize> = 4..10;

/// Raw response bytes received from a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    data: Vec<u8>,
}

impl Response {
    /// Wraps received bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the response, returning the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the register value carried in the last byte.
    ///
    /// # Errors
    ///
    /// Returns `EioError::InvalidResponse` if the response is empty.
    pub fn register_value(&self) -> Result<u8> {
        self.data
            .last()
            .copied()
            .ok_or_else(|| EioError::invalid_response("empty register response"))
    }

    /// Returns the EEPROM word carried in the last two bytes.
    ///
    /// # Errors
    ///
    /// Returns `EioError::InvalidResponse` if fewer than two bytes were received.
    ///
    /// # Example
    ///
    /// ```
    /// use etherio::Response;
    ///
    /// let response = Response::new(b"R\x06\xA8\xC0".to_vec());
    /// assert_eq!(response.eeprom_word().unwrap(), 0xC0A8);
    /// ```
    pub fn eeprom_word(&self) -> Result<u16> {
        match self.data.as_slice() {
            [.., lo, hi] => Ok(u16::from_le_bytes([*lo, *hi])),
            _ => Err(EioError::invalid_response(format!(
                "EEPROM response has {} bytes, expected at least 2",
                self.data.len()
            ))),
        }
    }

    /// Returns the MAC address of an identify response as upper-case hex.
    ///
    /// # Errors
    ///
    /// Returns `EioError::InvalidResponse` if the response is shorter than 10 bytes.
    pub fn mac(&self) -> Result<String> {
        self.data
            .get(MAC_RANGE)
            .map(hex::encode_upper)
            .ok_or_else(|| {
                EioError::invalid_response(format!(
                    "identify response has {} bytes, expected at least 10",
                    self.data.len()
                ))
            })
    }
}

impl From<Vec<u8>> for Response {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}
