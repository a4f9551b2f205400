//! Device model: ports, registers, pins and EEPROM.
//!
//! A [`Device`] binds a [`DeviceKind`], a [`DeviceAddress`] and a [`Driver`].
//! Register access goes through [`Port`] views and individual lines through
//! the [`Pins`] view. Capability checks happen here, before any command is
//! built: asking an IO24T for its threshold register fails with
//! `EioError::UnsupportedRegister` without touching the network.
//!
//! # Example
//!
//! ```no_run
//! use etherio::{Device, DeviceKind, PinLevel, PORT_DIR_OUTPUT};
//!
//! let dev = Device::new(DeviceKind::IO24T, "192.168.1.50".parse::<etherio::DeviceAddress>()?);
//!
//! let port_a = dev.port('A')?;
//! port_a.set_direction(PORT_DIR_OUTPUT)?;
//! port_a.set_value(0x2A)?;
//! assert_eq!(port_a.value()?, 0x2A);
//!
//! dev.pins().set(0, PinLevel::High)?;
//! dev.pins().set(1, "OFF".parse()?)?;
//! println!("MAC {}", dev.mac()?);
//! # Ok::<(), etherio::EioError>(())
//! ```

use std::net::Ipv4Addr;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use crate::address::DeviceAddress;
use crate::command::{self, Command};
use crate::driver::Driver;
use crate::error::{EioError, Result};
use crate::layout::DeviceKind;
use crate::register::Register;
use crate::response::Response;
use crate::utils::{get_bit, ipv4_to_words, set_bit, words_to_ipv4};

/// MAC reported when the module does not answer the identify command.
pub const UNKNOWN_MAC: &str = "unknown";

/// EEPROM word holding the first half of the IP address.
pub const EEPROM_IP_ADDRESS: u8 = 6;
/// EEPROM word holding the first half of the IP mask.
pub const EEPROM_IP_MASK: u8 = 25;
/// EEPROM word holding the first half of the IP gateway.
pub const EEPROM_IP_GATEWAY: u8 = 27;
/// Number of 16-bit words in the module EEPROM.
pub const EEPROM_WORDS: u8 = 64;

/// Time the module needs after a reset or EEPROM write.
const SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Level of one I/O line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinLevel {
    /// Line low, bit 0.
    Low,
    /// Line high, bit 1.
    High,
}

impl PinLevel {
    /// Returns `true` for [`PinLevel::High`].
    pub fn is_high(self) -> bool {
        self == PinLevel::High
    }
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl From<PinLevel> for u8 {
    fn from(level: PinLevel) -> Self {
        level.is_high() as u8
    }
}

impl TryFrom<u8> for PinLevel {
    type Error = EioError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(PinLevel::Low),
            1 => Ok(PinLevel::High),
            _ => Err(EioError::invalid_pin_value(value.to_string())),
        }
    }
}

impl FromStr for PinLevel {
    type Err = EioError;

    /// Accepts `0 L LO LOW OFF` and `1 H HI HIGH ON`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "0" | "L" | "LO" | "LOW" | "OFF" => Ok(PinLevel::Low),
            "1" | "H" | "HI" | "HIGH" | "ON" => Ok(PinLevel::High),
            _ => Err(EioError::invalid_pin_value(s)),
        }
    }
}

impl std::fmt::Display for PinLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// An Ether I/O module.
#[derive(Debug, Clone)]
pub struct Device {
    kind: DeviceKind,
    address: DeviceAddress,
    driver: Driver,
}

impl Device {
    /// Creates a device using a default UDP driver.
    pub fn new(kind: DeviceKind, address: impl Into<DeviceAddress>) -> Self {
        Self::with_driver(kind, address, Driver::default())
    }

    /// Creates a device on a specific driver.
    pub fn with_driver(kind: DeviceKind, address: impl Into<DeviceAddress>, driver: Driver) -> Self {
        Self {
            kind,
            address: address.into(),
            driver,
        }
    }

    /// Returns the device kind.
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Returns the device address.
    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// Returns the driver.
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Returns the port with letter `letter` (either case).
    ///
    /// # Errors
    ///
    /// Returns `EioError::UnknownPort` if the device has no such port.
    pub fn port(&self, letter: char) -> Result<Port<'_>> {
        self.kind
            .port_index(letter)
            .and_then(|index| self.port_at(index))
            .ok_or(EioError::UnknownPort { port: letter })
    }

    /// Returns the port at `index` in pin order.
    pub fn port_at(&self, index: usize) -> Option<Port<'_>> {
        self.kind.ports().get(index).map(|&letter| Port {
            device: self,
            letter,
        })
    }

    /// Returns all ports in pin order.
    pub fn ports(&self) -> impl Iterator<Item = Port<'_>> + '_ {
        self.kind.ports().iter().map(move |&letter| Port {
            device: self,
            letter,
        })
    }

    /// Returns the pin view.
    pub fn pins(&self) -> Pins<'_> {
        Pins { device: self }
    }

    /// Reads one pin. Shorthand for `self.pins().get(index)`.
    pub fn pin(&self, index: impl Into<i64>) -> Result<PinLevel> {
        self.pins().get(index)
    }

    /// Drives one pin. Shorthand for `self.pins().set(index, level)`.
    pub fn set_pin(&self, index: impl Into<i64>, level: PinLevel) -> Result<()> {
        self.pins().set(index, level)
    }

    /// Resets the module and waits for it to settle.
    pub fn reset(&self) -> Result<()> {
        let reset = Command::classify(self.kind.capabilities().reset)?;
        self.driver.send(&reset, &self.address, None)?;
        thread::sleep(SETTLE_DELAY);
        Ok(())
    }

    /// Returns the MAC address as 12 upper-case hex digits.
    ///
    /// A module that never answers yields [`UNKNOWN_MAC`] instead of an error.
    pub fn mac(&self) -> Result<String> {
        let identify = Command::classify(self.kind.capabilities().identify)?;
        match self.driver.query(&identify, &self.address, None) {
            Ok(response) => response.mac(),
            Err(EioError::Timeout) => {
                log::info!("{} did not answer identify", self);
                Ok(UNKNOWN_MAC.to_string())
            }
            Err(e) => Err(e),
        }
    }

    /// Reads one 16-bit EEPROM word.
    pub fn eeprom_read_word(&self, reg: u8) -> Result<u16> {
        self.query(&Command::eeprom_read_word(reg))?.eeprom_word()
    }

    /// Writes one 16-bit EEPROM word. EEPROM writes are not read back.
    pub fn eeprom_write_word(&self, reg: u8, word: u16) -> Result<()> {
        self.driver
            .send(&Command::eeprom_write_word(reg, word), &self.address, None)?;
        thread::sleep(SETTLE_DELAY);
        Ok(())
    }

    /// Enables EEPROM writes (IO24R).
    pub fn eeprom_enable_write(&self) -> Result<()> {
        self.eeprom_control(b'1', "EEPROM write enable")
    }

    /// Disables EEPROM writes (IO24R).
    pub fn eeprom_disable_write(&self) -> Result<()> {
        self.eeprom_control(b'0', "EEPROM write disable")
    }

    /// Erases the EEPROM (IO24R).
    pub fn eeprom_erase(&self) -> Result<()> {
        self.eeprom_control(b'E', "EEPROM erase")
    }

    fn eeprom_control(&self, op: u8, operation: &'static str) -> Result<()> {
        if !self.kind.capabilities().eeprom_write_protect {
            return Err(EioError::unsupported_operation(self.kind, operation));
        }
        self.driver
            .send(&command::eeprom_control(op), &self.address, None)?;
        Ok(())
    }

    /// Reads the whole EEPROM, each word high byte first.
    pub fn eeprom_image(&self) -> Result<Vec<u8>> {
        let mut image = Vec::with_capacity(usize::from(EEPROM_WORDS) * 2);
        for reg in 0..EEPROM_WORDS {
            image.extend(self.eeprom_read_word(reg)?.to_be_bytes());
        }
        Ok(image)
    }

    /// Returns the IP address stored in the EEPROM.
    pub fn eeprom_ip_address(&self) -> Result<Ipv4Addr> {
        self.eeprom_ipv4(EEPROM_IP_ADDRESS)
    }

    /// Stores the IP address in the EEPROM. Takes effect after a power cycle.
    pub fn set_eeprom_ip_address(&self, ip: Ipv4Addr) -> Result<()> {
        self.set_eeprom_ipv4(EEPROM_IP_ADDRESS, ip)
    }

    /// Returns the IP mask stored in the EEPROM.
    pub fn eeprom_ip_mask(&self) -> Result<Ipv4Addr> {
        self.eeprom_ipv4(EEPROM_IP_MASK)
    }

    /// Stores the IP mask in the EEPROM.
    pub fn set_eeprom_ip_mask(&self, mask: Ipv4Addr) -> Result<()> {
        self.set_eeprom_ipv4(EEPROM_IP_MASK, mask)
    }

    /// Returns the IP gateway stored in the EEPROM.
    pub fn eeprom_ip_gateway(&self) -> Result<Ipv4Addr> {
        self.eeprom_ipv4(EEPROM_IP_GATEWAY)
    }

    /// Stores the IP gateway in the EEPROM.
    pub fn set_eeprom_ip_gateway(&self, gateway: Ipv4Addr) -> Result<()> {
        self.set_eeprom_ipv4(EEPROM_IP_GATEWAY, gateway)
    }

    fn eeprom_ipv4(&self, reg: u8) -> Result<Ipv4Addr> {
        let first = self.eeprom_read_word(reg)?;
        let second = self.eeprom_read_word(reg + 1)?;
        Ok(words_to_ipv4(first, second))
    }

    fn set_eeprom_ipv4(&self, reg: u8, ip: Ipv4Addr) -> Result<()> {
        let (first, second) = ipv4_to_words(ip);
        self.eeprom_write_word(reg, first)?;
        self.eeprom_write_word(reg + 1, second)
    }

    fn query(&self, command: &Command) -> Result<Response> {
        self.driver.query(command, &self.address, None)
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} device at {}", self.kind, self.address)
    }
}

/// One port of a [`Device`].
#[derive(Debug, Clone, Copy)]
pub struct Port<'a> {
    device: &'a Device,
    letter: char,
}

impl<'a> Port<'a> {
    /// Returns the upper-case port letter.
    pub fn letter(&self) -> char {
        self.letter
    }

    /// Returns the owning device.
    pub fn device(&self) -> &'a Device {
        self.device
    }

    /// Reads a register.
    ///
    /// # Errors
    ///
    /// Returns `EioError::UnsupportedRegister` before any I/O if the device
    /// kind lacks `register`, or `EioError::Timeout` if retries run out.
    pub fn get(&self, register: Register) -> Result<u8> {
        self.device.kind.check_register(register)?;
        let read = Command::read_register(register, self.letter)?;
        self.device.query(&read)?.register_value()
    }

    /// Writes a register, validated by read-back if the driver is configured to.
    pub fn set(&self, register: Register, value: u8) -> Result<()> {
        self.device.kind.check_register(register)?;
        let write = Command::write_register(register, self.letter, value)?;
        self.device
            .driver
            .send(&write, &self.device.address, None)?;
        Ok(())
    }

    /// Reads the line levels.
    pub fn value(&self) -> Result<u8> {
        self.get(Register::Value)
    }

    /// Drives the output lines.
    pub fn set_value(&self, value: u8) -> Result<()> {
        self.set(Register::Value, value)
    }

    /// Reads the direction register (1 = input).
    pub fn direction(&self) -> Result<u8> {
        self.get(Register::Direction)
    }

    /// Writes the direction register (1 = input).
    pub fn set_direction(&self, value: u8) -> Result<()> {
        self.set(Register::Direction, value)
    }

    /// Reads the pull-up register (0 = enabled).
    pub fn pull_up(&self) -> Result<u8> {
        self.get(Register::PullUp)
    }

    /// Writes the pull-up register (0 = enabled).
    pub fn set_pull_up(&self, value: u8) -> Result<()> {
        self.set(Register::PullUp, value)
    }

    /// Reads the threshold register (IO24R).
    pub fn threshold(&self) -> Result<u8> {
        self.get(Register::Threshold)
    }

    /// Writes the threshold register (IO24R).
    pub fn set_threshold(&self, value: u8) -> Result<()> {
        self.set(Register::Threshold, value)
    }

    /// Reads the schmitt register (IO24R).
    pub fn schmitt(&self) -> Result<u8> {
        self.get(Register::Schmitt)
    }

    /// Writes the schmitt register (IO24R).
    pub fn set_schmitt(&self, value: u8) -> Result<()> {
        self.set(Register::Schmitt, value)
    }
}

impl std::fmt::Display for Port<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "port{} of {}",
            self.letter.to_ascii_lowercase(),
            self.device
        )
    }
}

/// Flat view of every I/O line of a [`Device`].
///
/// Pin `i` is bit `i % 8` of port `i / 8`. Setting a pin reads the port value,
/// changes one bit and writes the port back.
#[derive(Debug, Clone, Copy)]
pub struct Pins<'a> {
    device: &'a Device,
}

impl Pins<'_> {
    /// Returns the number of pins (24 or 72).
    pub fn len(&self) -> usize {
        self.device.kind.pin_count()
    }

    /// Always `false`; every device has pins.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads one pin.
    ///
    /// # Errors
    ///
    /// Returns `EioError::OutOfRange` before any I/O if `index` is outside
    /// `0..len()`.
    pub fn get(&self, index: impl Into<i64>) -> Result<PinLevel> {
        let (port, bit) = self.locate(index)?;
        Ok(get_bit(port.value()?, bit).into())
    }

    /// Drives one pin, leaving the other lines of its port unchanged.
    pub fn set(&self, index: impl Into<i64>, level: PinLevel) -> Result<()> {
        let (port, bit) = self.locate(index)?;
        let value = port.value()?;
        port.set_value(set_bit(value, bit, level.is_high()))
    }

    fn locate(&self, index: impl Into<i64>) -> Result<(Port<'_>, u8)> {
        let pin = self.device.kind.pin_location(index)?;
        let port = self
            .device
            .port_at(pin.port)
            .ok_or_else(|| EioError::out_of_range(pin.index() as i64, self.len()))?;
        Ok((port, pin.bit))
    }
}

/// Either a whole device or one of its ports.
///
/// Routines that work on a single port accept a `Target` so callers can pass
/// a device (meaning its first port) or a specific port.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A device; port operations apply to its first port.
    Device(&'a Device),
    /// One port.
    Port(Port<'a>),
}

impl<'a> Target<'a> {
    /// Returns the port operations apply to.
    pub fn port(&self) -> Port<'a> {
        match *self {
            Target::Device(device) => Port {
                device,
                letter: device.kind.ports()[0],
            },
            Target::Port(port) => port,
        }
    }

    /// Returns the device behind the target.
    pub fn device(&self) -> &'a Device {
        match *self {
            Target::Device(device) => device,
            Target::Port(port) => port.device,
        }
    }
}

impl<'a> From<&'a Device> for Target<'a> {
    fn from(device: &'a Device) -> Self {
        Target::Device(device)
    }
}

impl<'a> From<Port<'a>> for Target<'a> {
    fn from(port: Port<'a>) -> Self {
        Target::Port(port)
    }
}
