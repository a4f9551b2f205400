//! Command driver with retry.
//!
//! This module provides the [`Driver`] struct, which sends classified commands
//! to a module and copes with datagram loss.
//!
//! # Overview
//!
//! For every command the driver:
//! - rejects byte patterns outside the command set before any I/O
//! - opens a fresh channel, sends, and waits for one response if the command
//!   is a read
//! - retries failed exchanges after a fixed delay, up to `retries` times,
//!   then fails with [`EioError::Timeout`]
//! - confirms register writes by reading the register back (see
//!   [`validate`](crate::validate))
//! - counts commands, packets and retries in a shared [`Stats`]
//!
//! # Example
//!
//! ```no_run
//! use etherio::{DeviceAddress, Driver, DriverConfig};
//! use std::time::Duration;
//!
//! let driver = Driver::new(
//!     DriverConfig::default()
//!         .with_timeout(Duration::from_millis(500))
//!         .with_retries(3),
//! );
//! let address = DeviceAddress::parse("192.168.1.50")?;
//!
//! // Port A all outputs, then drive 0x2A.
//! driver.command(b"!A\x00", &address)?;
//! driver.command(b"A\x2A", &address)?;
//!
//! let response = driver.command(b"a", &address)?.unwrap();
//! assert_eq!(response.register_value()?, 0x2A);
//! # Ok::<(), etherio::EioError>(())
//! ```
//!
//! # Latency
//!
//! A read gives up after at most `timeout × (retries + 1)` plus the retry
//! delays. A validated write nests read retries inside write retries, so its
//! bound is roughly the square of that.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::address::DeviceAddress;
use crate::command::{Command, OperationKind};
use crate::error::{EioError, Result};
use crate::response::Response;
use crate::stats::Stats;
use crate::transport::{self, Transport, TransportKind, DEFAULT_TIMEOUT, MAX_PACKET_SIZE};

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 10;

/// Default delay between retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Configuration for creating a [`Driver`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriverConfig {
    /// Receive timeout per attempt.
    pub timeout: Duration,
    /// Retries after the first attempt, for both reads and write validation.
    pub retries: u32,
    /// Confirm register writes by reading them back.
    pub write_validate: bool,
    /// Delay before each retry.
    pub retry_delay: Duration,
    /// Transport used by [`Driver::new`].
    pub transport: TransportKind,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            write_validate: true,
            retry_delay: DEFAULT_RETRY_DELAY,
            transport: TransportKind::Udp,
        }
    }
}

impl DriverConfig {
    /// Sets the receive timeout (default is 1 second).
    ///
    /// # Example
    ///
    /// ```
    /// use etherio::DriverConfig;
    /// use std::time::Duration;
    ///
    /// let config = DriverConfig::default().with_timeout(Duration::from_millis(250));
    /// assert_eq!(config.timeout, Duration::from_millis(250));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry count (default is 10).
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Enables or disables write validation (default is enabled).
    pub fn with_write_validate(mut self, write_validate: bool) -> Self {
        self.write_validate = write_validate;
        self
    }

    /// Sets the delay between retries (default is 10 ms).
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Selects the transport (default is UDP).
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }
}

/// Sends commands to Ether I/O modules.
///
/// A driver is not bound to one module; the address is given per call. It is
/// cheap to clone and clones share the transport and counters.
#[derive(Clone)]
pub struct Driver {
    pub(crate) config: DriverConfig,
    transport: Arc<dyn Transport>,
    stats: Arc<Stats>,
}

impl Driver {
    /// Creates a driver using the configured transport and the process-wide [`Stats`].
    pub fn new(config: DriverConfig) -> Self {
        let transport = transport::for_kind(config.transport);
        Self {
            config,
            transport,
            stats: Stats::global(),
        }
    }

    /// Creates a driver on a custom transport.
    pub fn with_transport(config: DriverConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
            stats: Stats::global(),
        }
    }

    /// Replaces the counter set this driver reports into.
    pub fn with_stats(mut self, stats: Arc<Stats>) -> Self {
        self.stats = stats;
        self
    }

    /// Returns the active configuration.
    pub fn settings(&self) -> &DriverConfig {
        &self.config
    }

    /// Returns the counters this driver reports into.
    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    /// Classifies and sends raw command bytes.
    ///
    /// Returns the response for read commands and `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are not a known command (`EioError::InvalidCommand`, nothing is sent)
    /// - Retries are exhausted (`EioError::Timeout`)
    pub fn command(&self, bytes: &[u8], address: &DeviceAddress) -> Result<Option<Response>> {
        let command = Command::classify(bytes)?;
        self.send(&command, address, None)
    }

    /// Sends a classified command, retrying lost exchanges.
    ///
    /// `retries` overrides the configured retry count for this call. Register
    /// writes are validated by read-back when write validation is enabled.
    pub fn send(
        &self,
        command: &Command,
        address: &DeviceAddress,
        retries: Option<u32>,
    ) -> Result<Option<Response>> {
        self.stats.command_issued();
        let response = self.send_with_retry(command, address, retries)?;

        if self.config.write_validate && command.kind() == OperationKind::WriteVerify {
            self.validate_write(command, address, retries)?;
        }
        Ok(response)
    }

    /// Sends a read command and returns its response.
    pub fn query(
        &self,
        command: &Command,
        address: &DeviceAddress,
        retries: Option<u32>,
    ) -> Result<Response> {
        self.send(command, address, retries)?
            .ok_or_else(|| EioError::invalid_response(format!("no response to '{command}'")))
    }

    /// The retry loop. Does not count the command as issued.
    pub(crate) fn send_with_retry(
        &self,
        command: &Command,
        address: &DeviceAddress,
        retries: Option<u32>,
    ) -> Result<Option<Response>> {
        let retries = retries.unwrap_or(self.config.retries);
        let mut tries = 0u32;

        loop {
            match self.exchange(command, address) {
                Ok(response) => return Ok(response),
                Err(e) => {
                    self.stats.read_retry();
                    tries += 1;
                    if tries > retries {
                        log::warn!(
                            "'{}' to {} failed after {} attempts: {}",
                            command,
                            address,
                            tries,
                            e
                        );
                        return Err(EioError::Timeout);
                    }
                    self.stats.read_retry_depth(tries);
                    log::debug!("'{}' to {} attempt {} failed: {}", command, address, tries, e);
                    thread::sleep(self.config.retry_delay);
                }
            }
        }
    }

    /// One attempt on a fresh channel.
    pub(crate) fn exchange(
        &self,
        command: &Command,
        address: &DeviceAddress,
    ) -> std::io::Result<Option<Response>> {
        let mut channel = self.transport.open(address, self.config.timeout)?;

        channel.send(command.as_bytes())?;
        self.stats.packet();
        log::trace!("sent '{}' to {}", command, address);

        if !command.kind().expects_response() {
            return Ok(None);
        }

        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let size = channel.recv(&mut buffer)?;
        self.stats.packet();
        log::trace!("received {} bytes from {}", size, address);

        Ok(Some(Response::new(buffer[..size].to_vec())))
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::SimTransport;

    pub(crate) fn fast_config() -> DriverConfig {
        DriverConfig::default()
            .with_timeout(Duration::from_millis(20))
            .with_retry_delay(Duration::ZERO)
    }

    pub(crate) fn sim_driver(config: DriverConfig) -> (Driver, SimTransport) {
        let sim = SimTransport::new();
        let driver =
            Driver::with_transport(config, sim.clone()).with_stats(Arc::new(Stats::new()));
        (driver, sim)
    }

    fn address() -> DeviceAddress {
        DeviceAddress::new("192.168.1.50", 2424)
    }

    #[test]
    fn test_config_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.retries, 10);
        assert!(config.write_validate);
        assert_eq!(config.retry_delay, Duration::from_millis(10));
        assert_eq!(config.transport, TransportKind::Udp);
    }

    #[test]
    fn test_config_builders() {
        let config = DriverConfig::default()
            .with_timeout(Duration::from_secs(3))
            .with_retries(2)
            .with_write_validate(false)
            .with_retry_delay(Duration::from_millis(50))
            .with_transport(TransportKind::Tcp);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.retries, 2);
        assert!(!config.write_validate);
        assert_eq!(config.retry_delay, Duration::from_millis(50));
        assert_eq!(config.transport, TransportKind::Tcp);
    }

    #[test]
    fn test_invalid_command_sends_nothing() {
        let (driver, sim) = sim_driver(fast_config());
        let err = driver.command(b"QQQ", &address()).unwrap_err();
        assert!(matches!(err, EioError::InvalidCommand { .. }));
        assert_eq!(sim.state().opened, 0);
        assert_eq!(driver.stats().snapshot().commands, 0);
    }

    #[test]
    fn test_read_counts_two_packets() {
        let (driver, sim) = sim_driver(fast_config());
        sim.state().registers.insert((crate::Register::PullUp, 'B'), 0x3C);

        let response = driver.command(b"@b", &address()).unwrap().unwrap();
        assert_eq!(response.as_bytes(), b"@B\x3C");

        let stats = driver.stats().snapshot();
        assert_eq!(stats.commands, 1);
        assert_eq!(stats.packets, 2);
        assert_eq!(stats.read_retries, 0);
    }

    #[test]
    fn test_write_expects_no_response() {
        let (driver, sim) = sim_driver(fast_config());
        let response = driver.command(b"'@", &address()).unwrap();
        assert!(response.is_none());
        assert_eq!(sim.state().received, vec![b"'@".to_vec()]);
        assert_eq!(driver.stats().snapshot().packets, 1);
    }

    #[test]
    fn test_retry_recovers_from_loss() {
        let (driver, sim) = sim_driver(fast_config().with_retries(5));
        sim.state().failures.extend([true, true]);

        let response = driver.command(b"IO24", &address()).unwrap();
        assert!(response.is_some());

        let stats = driver.stats().snapshot();
        assert_eq!(stats.read_retries, 2);
        assert_eq!(stats.max_read_retry, 2);
        assert_eq!(sim.state().opened, 3);
    }

    #[test]
    fn test_retry_exhaustion_times_out() {
        let retries = 4;
        let (driver, sim) = sim_driver(fast_config().with_retries(retries));
        sim.state().unreachable = true;

        let err = driver.command(b"a", &address()).unwrap_err();
        assert!(matches!(err, EioError::Timeout));

        assert_eq!(sim.state().opened, retries as usize + 1);
        let stats = driver.stats().snapshot();
        assert_eq!(stats.read_retries, u64::from(retries) + 1);
        assert_eq!(stats.max_read_retry, u64::from(retries));
        assert_eq!(stats.commands, 1);
    }

    #[test]
    fn test_zero_retries_makes_one_attempt() {
        let (driver, sim) = sim_driver(fast_config().with_retries(0));
        sim.state().unreachable = true;

        assert!(matches!(
            driver.command(b"a", &address()),
            Err(EioError::Timeout)
        ));
        assert_eq!(sim.state().opened, 1);
    }

    #[test]
    fn test_per_call_retry_override() {
        let (driver, sim) = sim_driver(fast_config().with_retries(10));
        sim.state().unreachable = true;

        let command = Command::classify(b"IO24".to_vec()).unwrap();
        assert!(driver.send(&command, &address(), Some(1)).is_err());
        assert_eq!(sim.state().opened, 2);
    }

    #[test]
    fn test_udp_unreachable_times_out() {
        let silent = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let address = DeviceAddress::from(silent.local_addr().unwrap());
        let driver = Driver::new(fast_config().with_retries(1)).with_stats(Arc::new(Stats::new()));

        assert!(matches!(
            driver.command(b"IO24", &address),
            Err(EioError::Timeout)
        ));
        let stats = driver.stats().snapshot();
        assert_eq!(stats.read_retries, 2);
        // Both sends went out, no response came back.
        assert_eq!(stats.packets, 2);
    }

    #[test]
    fn test_driver_debug() {
        let (driver, _) = sim_driver(fast_config());
        let debug_str = format!("{:?}", driver);
        assert!(debug_str.contains("Driver"));
        assert!(debug_str.contains("retries"));
    }
}
