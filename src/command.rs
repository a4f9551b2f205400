//! Command classification.
//!
//! Every byte sequence sent to a module is first classified into an
//! [`OperationKind`]. Classification decides whether the driver waits for a
//! response and whether a write is validated by read-back. Byte patterns that
//! match no known command are rejected with `EioError::InvalidCommand` before
//! any packet is sent.
//!
//! # Command set
//!
//! | Command | Bytes | Kind |
//! |---------|-------|------|
//! | Identify | `IO24`, `'IO72` | Read |
//! | Read register | `{sel}{p}` (`p` in `a`-`i`) | Read |
//! | Write register | `{sel}{P}{v}` (`P` in `A`-`I`) | WriteVerify |
//! | EEPROM read word | `'R{reg}\x00\x00` | Read |
//! | EEPROM write word | `'W{reg}{lo}{hi}` | Write |
//! | EEPROM erase / disable / enable | `'E`/`'0`/`'1` + `\x00\xAA\x55` | Write |
//! | EEPROM read byte | `'r` + 2 bytes | Read |
//! | EEPROM write byte | `'w` + 3 bytes | Write |
//! | Reset | `'@` or `'@\x00\xAA\x55` | Write |
//! | SPI setup | `S1A`, `S0A`, `SA...` | Read |
//!
//! Register selectors are none (value), `!` (direction), `@` or `%`
//! (pull-up), `#` (threshold) and `$` (schmitt).
//!
//! # Example
//!
//! ```
//! use etherio::{Command, OperationKind};
//!
//! assert_eq!(Command::classify(b"!a").unwrap().kind(), OperationKind::Read);
//! assert_eq!(Command::classify(b"A\x2A").unwrap().kind(), OperationKind::WriteVerify);
//! assert!(Command::classify(b"XYZ").is_err());
//! ```

use crate::error::{EioError, Result};
use crate::register::{Register, VALUE_MARKER};

const IDENTIFY_24: &[u8] = b"IO24";
const IDENTIFY_72: &[u8] = b"'IO72";
const REGISTER_SELECTORS: &[u8] = b"_!@#$%";
const EEPROM_KEY: &[u8] = b"\x00\xAA\x55";

/// How the driver must carry out a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Send and wait for one response.
    Read,
    /// Send only.
    Write,
    /// Send only, then confirm by reading the register back.
    WriteVerify,
}

impl OperationKind {
    /// Returns whether the module answers this kind of command.
    pub fn expects_response(self) -> bool {
        matches!(self, OperationKind::Read)
    }
}

/// A classified command ready for transmission.
///
/// The bytes are exactly what goes on the wire; they never change after
/// classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    bytes: Vec<u8>,
    kind: OperationKind,
}

/// The register write carried by a [`OperationKind::WriteVerify`] command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Target register.
    pub register: Register,
    /// Upper-case port letter.
    pub port: char,
    /// Value written.
    pub value: u8,
}

impl Command {
    /// Classifies `bytes` into a command.
    ///
    /// # Errors
    ///
    /// Returns `EioError::InvalidCommand` if `bytes` is not part of the
    /// command set.
    pub fn classify(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        match classify(&bytes) {
            Some(kind) => Ok(Self { bytes, kind }),
            None => Err(EioError::invalid_command(&bytes)),
        }
    }

    /// Register read command, e.g. `!a`.
    pub fn read_register(register: Register, port: char) -> Result<Self> {
        Self::classify(register.read_bytes(port))
    }

    /// Register write command, e.g. `!A\x00`.
    pub fn write_register(register: Register, port: char, value: u8) -> Result<Self> {
        Self::classify(register.write_bytes(port, value))
    }

    /// EEPROM word read, `'R{reg}\x00\x00`.
    pub fn eeprom_read_word(reg: u8) -> Self {
        Self {
            bytes: vec![b'\'', b'R', reg, 0x00, 0x00],
            kind: OperationKind::Read,
        }
    }

    /// EEPROM word write, `'W{reg}{lo}{hi}`.
    pub fn eeprom_write_word(reg: u8, word: u16) -> Self {
        let [lo, hi] = word.to_le_bytes();
        Self {
            bytes: vec![b'\'', b'W', reg, lo, hi],
            kind: OperationKind::Write,
        }
    }

    /// Returns the wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the operation kind.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Returns the register write this command performs, if it is one.
    pub fn register_write(&self) -> Option<RegisterWrite> {
        if self.kind != OperationKind::WriteVerify {
            return None;
        }
        let normalized = normalize(&self.bytes);
        let [selector, port, value] = &*normalized else {
            return None;
        };
        Some(RegisterWrite {
            register: Register::from_selector(*selector)?,
            port: *port as char,
            value: *value,
        })
    }

    /// Returns the read command that reads back what this write targets.
    ///
    /// This is the write with its payload byte dropped and the port letter
    /// lower-cased: `!A\x0F` reads back with `!a`.
    pub(crate) fn readback(&self) -> Option<Command> {
        if self.kind != OperationKind::WriteVerify {
            return None;
        }
        let (_, head) = self.bytes.split_last()?;
        Command::classify(head.to_ascii_lowercase()).ok()
    }
}

impl AsRef<[u8]> for Command {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bytes.escape_ascii())
    }
}

fn is_port_letter(b: u8) -> bool {
    matches!(b, b'a'..=b'i' | b'A'..=b'I')
}

/// Prefixes a bare value-register access with the value marker.
fn normalize(bytes: &[u8]) -> std::borrow::Cow<'_, [u8]> {
    match bytes.first() {
        Some(&b) if is_port_letter(b) => {
            let mut prefixed = Vec::with_capacity(bytes.len() + 1);
            prefixed.push(VALUE_MARKER);
            prefixed.extend_from_slice(bytes);
            prefixed.into()
        }
        _ => bytes.into(),
    }
}

/// Classifies raw command bytes; first matching rule wins.
pub(crate) fn classify(bytes: &[u8]) -> Option<OperationKind> {
    use OperationKind::*;

    if bytes == IDENTIFY_24 || bytes == IDENTIFY_72 {
        return Some(Read);
    }
    if bytes.first().map_or(true, |&b| b == VALUE_MARKER) {
        return None;
    }

    let cmd = normalize(bytes);
    match &*cmd {
        [sel, p] if REGISTER_SELECTORS.contains(sel) && p.is_ascii_lowercase() && is_port_letter(*p) => {
            Some(Read)
        }
        [sel, p, _] if REGISTER_SELECTORS.contains(sel) && p.is_ascii_uppercase() && is_port_letter(*p) => {
            Some(WriteVerify)
        }

        [b'\'', b'R', _, _, _] => Some(Read),
        [b'\'', b'W', _, _, _] => Some(Write),
        [b'\'', b'E' | b'0' | b'1', _, _, _] => Some(Write),
        [b'\'', b'r', _, _] => Some(Read),
        [b'\'', b'w', _, _, _] => Some(Write),

        [b'\'', b'@'] | [b'\'', b'@', _, _, _] => Some(Write),

        b"S1A" | b"S0A" => Some(Read),
        [b'S', b'A', ..] => Some(Read),

        _ => None,
    }
}

/// Builds an EEPROM control command (`'E`, `'0`, `'1`) with its key bytes.
pub(crate) fn eeprom_control(op: u8) -> Command {
    let mut bytes = vec![b'\'', op];
    bytes.extend_from_slice(EEPROM_KEY);
    Command {
        bytes,
        kind: OperationKind::Write,
    }
}
