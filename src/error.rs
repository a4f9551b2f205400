//! Error types for the Ether I/O driver.

use std::io;
use thiserror::Error;

use crate::layout::DeviceKind;
use crate::register::Register;

/// Result type alias for Ether I/O operations.
pub type Result<T> = std::result::Result<T, EioError>;

/// Errors that can occur while driving an Ether I/O module.
///
/// Everything except [`EioError::Timeout`] and [`EioError::Io`] is detected
/// before a packet leaves the host and is never retried.
#[derive(Debug, Error)]
pub enum EioError {
    /// The byte sequence is not a recognised command.
    #[error("Invalid command: {}", format_command(.command))]
    InvalidCommand {
        /// The rejected bytes.
        command: Vec<u8>,
    },

    /// The register does not exist on this device kind.
    #[error("{kind} does not have a {register} register")]
    UnsupportedRegister {
        /// Device kind the access was attempted on.
        kind: DeviceKind,
        /// The requested register.
        register: Register,
    },

    /// The operation is not available on this device kind.
    #[error("{kind} does not support {operation}")]
    UnsupportedOperation {
        /// Device kind the operation was attempted on.
        kind: DeviceKind,
        /// Name of the operation.
        operation: &'static str,
    },

    /// Pin index outside `0..len`.
    #[error("Pin index {index} out of range: valid pins are 0 - {}", last_pin(.len))]
    OutOfRange {
        /// The requested index.
        index: i64,
        /// Number of pins on the device.
        len: usize,
    },

    /// Port letter not present on this device.
    #[error("Unknown port '{port}'")]
    UnknownPort {
        /// The requested port letter.
        port: char,
    },

    /// Device kind name not recognised.
    #[error("Unknown device kind '{name}': expected one of IO24R, IO24T, IO72T")]
    UnknownDeviceKind {
        /// The rejected name.
        name: String,
    },

    /// Pin value outside the recognised on/off tokens.
    #[error("Invalid pin value '{value}': expected one of 0, 1, L, LO, LOW, OFF, H, HI, HIGH, ON")]
    InvalidPinValue {
        /// The rejected value, as given.
        value: String,
    },

    /// Device address could not be parsed.
    #[error("Invalid address: {reason}")]
    InvalidAddress {
        /// Description of the address error.
        reason: String,
    },

    /// Response too short or otherwise undecodable.
    #[error("Invalid response: {reason}")]
    InvalidResponse {
        /// Description of the response error.
        reason: String,
    },

    /// Retries exhausted without a successful exchange or matching read-back.
    #[error("Communication timeout")]
    Timeout,

    /// I/O error outside the retry loop.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EioError {
    /// Creates a new `InvalidCommand` error.
    ///
    /// # Example
    ///
    /// ```
    /// use etherio::EioError;
    ///
    /// let err = EioError::invalid_command(b"XYZ");
    /// assert_eq!(err.to_string(), "Invalid command: \"XYZ\"");
    /// ```
    pub fn invalid_command(command: &[u8]) -> Self {
        Self::InvalidCommand {
            command: command.to_vec(),
        }
    }

    /// Creates a new `UnsupportedRegister` error.
    pub fn unsupported_register(kind: DeviceKind, register: Register) -> Self {
        Self::UnsupportedRegister { kind, register }
    }

    /// Creates a new `UnsupportedOperation` error.
    pub fn unsupported_operation(kind: DeviceKind, operation: &'static str) -> Self {
        Self::UnsupportedOperation { kind, operation }
    }

    /// Creates a new `OutOfRange` error.
    pub fn out_of_range(index: i64, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    /// Creates a new `InvalidPinValue` error.
    pub fn invalid_pin_value(value: impl Into<String>) -> Self {
        Self::InvalidPinValue {
            value: value.into(),
        }
    }

    /// Creates a new `InvalidAddress` error.
    ///
    /// # Example
    ///
    /// ```
    /// use etherio::EioError;
    ///
    /// let err = EioError::invalid_address("port 'abc' is not a number");
    /// ```
    pub fn invalid_address(reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidResponse` error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors raised before any network I/O.
    ///
    /// These are programming errors and retrying them cannot succeed.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Timeout | Self::Io(_) | Self::InvalidResponse { .. })
    }
}

fn last_pin(len: &usize) -> usize {
    len.saturating_sub(1)
}

/// Renders command bytes with printable ASCII kept and the rest escaped.
fn format_command(command: &[u8]) -> String {
    format!("\"{}\"", command.escape_ascii())
}
