//! # Elexol Ether I/O Driver
//!
//! A Rust library for driving Elexol Ether I/O modules (IO24R, IO24T, IO72T)
//! over UDP or TCP.
//!
//! Each module exposes 24 or 72 digital lines grouped in 8-bit ports `A`..`I`.
//! Every port has a value register and configuration registers (direction,
//! pull-up, and on the IO24R threshold and schmitt). The library sends the
//! module's short byte commands, retries lost datagrams, and confirms
//! register writes by reading them back.
//!
//! ## Features
//!
//! - **Typed device model**: ports, registers and pins are checked against
//!   the device kind before anything is sent
//! - **Retry on loss**: every exchange is retried up to a configurable limit
//! - **Write validation**: register writes are read back and resent on mismatch
//! - **Statistics**: commands, packets and retry depth, shared per process
//! - **Pluggable transport**: UDP by default, TCP, or any [`Transport`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use etherio::{Device, DeviceKind, PORT_DIR_OUTPUT};
//! use std::net::Ipv4Addr;
//!
//! fn main() -> etherio::Result<()> {
//!     // Factory default address is 10.10.10.10:2424
//!     let dev = Device::new(DeviceKind::IO24T, Ipv4Addr::new(10, 10, 10, 10));
//!
//!     // Port A as outputs, drive 0x2A
//!     let port_a = dev.port('A')?;
//!     port_a.set_direction(PORT_DIR_OUTPUT)?;
//!     port_a.set_value(0x2A)?;
//!
//!     // Read port B
//!     println!("B = {:#04x}", dev.port('B')?.value()?);
//!
//!     // Single lines
//!     dev.pins().set(3, "HIGH".parse()?)?;
//!     println!("pin 17 = {}", dev.pin(17)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Registers
//!
//! | Register | Selector | Devices | Meaning |
//! |----------|:--------:|---------|---------|
//! | [`Register::Value`] | none | all | line levels |
//! | [`Register::Direction`] | `!` | all | 1 = input |
//! | [`Register::PullUp`] | `@` | all | 0 = pull-up enabled |
//! | [`Register::Threshold`] | `#` | IO24R | 1 = 2.5 V threshold |
//! | [`Register::Schmitt`] | `$` | IO24R | 1 = schmitt trigger |
//!
//! ## Raw Commands
//!
//! ```no_run
//! use etherio::{DeviceAddress, Driver, DriverConfig};
//!
//! let driver = Driver::new(DriverConfig::default());
//! let addr: DeviceAddress = "192.168.1.50".parse()?;
//!
//! // Write, validated by read-back
//! driver.command(b"!A\x00", &addr)?;
//!
//! // Read
//! let rsp = driver.command(b"a", &addr)?;
//! println!("{:?}", rsp.map(|r| r.register_value()));
//! # Ok::<(), etherio::EioError>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, EioError>`].
//!
//! ```no_run
//! use etherio::{Device, DeviceKind, EioError, Register};
//!
//! let dev = Device::new(DeviceKind::IO24T, "10.10.10.10".parse::<etherio::DeviceAddress>()?);
//!
//! match dev.port('A')?.get(Register::Threshold) {
//!     Ok(v) => println!("threshold = {v}"),
//!     Err(EioError::UnsupportedRegister { kind, register }) => {
//!         println!("{kind} has no {register} register");
//!     }
//!     Err(EioError::Timeout) => println!("Communication timeout"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! # Ok::<(), EioError>(())
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use etherio::{DriverConfig, TransportKind};
//! use std::time::Duration;
//!
//! let config = DriverConfig::default()
//!     .with_timeout(Duration::from_millis(500)) // default: 1s
//!     .with_retries(3)                          // default: 10
//!     .with_retry_delay(Duration::from_millis(5))
//!     .with_write_validate(false)
//!     .with_transport(TransportKind::Tcp);
//! ```
//!
//! ## Logging
//!
//! Retries and timeouts are reported through the [`log`] facade. Install any
//! logger, e.g. `env_logger`, to see them.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod address;
mod command;
mod device;
mod driver;
mod error;
mod layout;
mod register;
mod response;
#[cfg(test)]
mod sim;
mod stats;
mod transport;
pub mod utils;
pub mod validate;

// Public re-exports
pub use address::{DeviceAddress, DEFAULT_ADDRESS, DEFAULT_HOST, DEFAULT_PORT};
pub use command::{Command, OperationKind, RegisterWrite};
pub use device::{
    Device, PinLevel, Pins, Port, Target, EEPROM_IP_ADDRESS, EEPROM_IP_GATEWAY, EEPROM_IP_MASK,
    EEPROM_WORDS, UNKNOWN_MAC,
};
pub use driver::{Driver, DriverConfig, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
pub use error::{EioError, Result};
pub use layout::{Capabilities, DeviceKind, PinLocation, PINS_PER_PORT};
pub use register::{Register, PORT_DIR_INPUT, PORT_DIR_OUTPUT};
pub use response::Response;
pub use stats::{Stats, StatsSnapshot};
pub use transport::{
    Channel, TcpTransport, Transport, TransportKind, UdpTransport, DEFAULT_TIMEOUT,
    MAX_PACKET_SIZE,
};
