//! Write validation by read-back.
//!
//! Register writes get no acknowledgement, so after a write the driver reads
//! the register back and compares. Only bits that can hold the written value
//! are compared:
//!
//! - value register: bits configured as outputs, i.e. the inverted direction
//!   register, read once before the loop
//! - every other register: all eight bits
//!
//! On a mismatch the write is sent again (best effort) and the read-back is
//! repeated after the retry delay, up to `retries` times. The read-backs go
//! through the normal retry loop, so read retries nest inside write retries.

use std::thread;

use crate::address::DeviceAddress;
use crate::command::{Command, RegisterWrite};
use crate::driver::Driver;
use crate::error::{EioError, Result};
use crate::register::Register;

/// Returns whether `read` matches `written` on the bits selected by `mask`.
///
/// # Example
///
/// ```
/// use etherio::validate::masked_eq;
///
/// // Upper nibble are inputs and read back differently.
/// assert!(masked_eq(0xA5, 0x05, 0x0F));
/// assert!(!masked_eq(0xA4, 0x05, 0x0F));
/// ```
pub fn masked_eq(read: u8, written: u8, mask: u8) -> bool {
    (read & mask) == (written & mask)
}

impl Driver {
    /// Confirms a register write by reading it back until the masked bits match.
    pub(crate) fn validate_write(
        &self,
        command: &Command,
        address: &DeviceAddress,
        retries: Option<u32>,
    ) -> Result<()> {
        let (Some(write), Some(readback)) = (command.register_write(), command.readback()) else {
            return Ok(());
        };

        let mask = self.validation_mask(&write, address, retries)?;
        let max_tries = retries.unwrap_or(self.config.retries);
        let mut tries = 0u32;

        loop {
            let read = self
                .send_with_retry(&readback, address, retries)?
                .ok_or_else(|| EioError::invalid_response("read-back returned nothing"))?
                .register_value()?;

            if masked_eq(read, write.value, mask) {
                return Ok(());
            }
            log::debug!(
                "'{}' to {}: read back {:#04x}, wrote {:#04x}, mask {:#04x}",
                command,
                address,
                read,
                write.value,
                mask
            );

            if let Err(e) = self.exchange(command, address) {
                log::debug!("resend of '{}' to {} failed: {}", command, address, e);
            }

            self.stats().write_retry();
            tries += 1;
            if tries > max_tries {
                log::warn!(
                    "'{}' to {} not confirmed after {} write retries",
                    command,
                    address,
                    max_tries
                );
                return Err(EioError::Timeout);
            }
            self.stats().write_retry_depth(tries);
            thread::sleep(self.config.retry_delay);
        }
    }

    /// Bits of `write` the module is expected to hold.
    fn validation_mask(
        &self,
        write: &RegisterWrite,
        address: &DeviceAddress,
        retries: Option<u32>,
    ) -> Result<u8> {
        if write.register != Register::Value {
            return Ok(0xFF);
        }
        let direction = Command::read_register(Register::Direction, write.port)?;
        let dir = self.query(&direction, address, retries)?.register_value()?;
        Ok(!dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::tests::{fast_config, sim_driver};

    fn address() -> DeviceAddress {
        DeviceAddress::default()
    }

    #[test]
    fn test_masked_eq() {
        assert!(masked_eq(0x2A, 0x2A, 0xFF));
        assert!(!masked_eq(0x2B, 0x2A, 0xFF));
        assert!(masked_eq(0xFF, 0x00, 0x00));
    }

    #[test]
    fn test_value_write_round_trip() {
        let (driver, sim) = sim_driver(fast_config());
        sim.state().registers.insert((Register::Direction, 'A'), 0x00);

        driver.command(b"A\x2A", &address()).unwrap();
        let value = driver
            .command(b"a", &address())
            .unwrap()
            .unwrap()
            .register_value()
            .unwrap();
        assert_eq!(value, 0x2A);

        // Write, direction lookup, read-back.
        let received = sim.state().received.clone();
        assert_eq!(received, vec![b"A\x2A".to_vec(), b"!a".to_vec(), b"a".to_vec(), b"a".to_vec()]);

        let stats = driver.stats().snapshot();
        assert_eq!(stats.write_retries, 0);
        // The read-back is not an issued command; the direction lookup is.
        assert_eq!(stats.commands, 3);
    }

    #[test]
    fn test_input_bits_excluded_from_comparison() {
        let (driver, sim) = sim_driver(fast_config().with_retries(0));
        {
            let mut state = sim.state();
            // Upper nibble inputs, held high by the outside world.
            state.registers.insert((Register::Direction, 'B'), 0xF0);
            state.inputs.insert('B', 0xF0);
        }

        driver.command(b"B\x05", &address()).unwrap();
        assert_eq!(driver.stats().snapshot().write_retries, 0);
    }

    #[test]
    fn test_non_value_register_compares_all_bits() {
        let (driver, sim) = sim_driver(fast_config());
        driver.command(b"@C\x81", &address()).unwrap();

        // No direction lookup for the pull-up register.
        let received = sim.state().received.clone();
        assert_eq!(received, vec![b"@C\x81".to_vec(), b"@c".to_vec()]);
    }

    #[test]
    fn test_ignored_write_is_resent() {
        let (driver, sim) = sim_driver(fast_config());
        sim.state().ignored_writes = 2;

        driver.command(b"!A\x0F", &address()).unwrap();

        let received = sim.state().received.clone();
        assert_eq!(
            received,
            vec![
                b"!A\x0F".to_vec(),
                b"!a".to_vec(),
                b"!A\x0F".to_vec(),
                b"!a".to_vec(),
                b"!A\x0F".to_vec(),
                b"!a".to_vec(),
            ]
        );
        let stats = driver.stats().snapshot();
        assert_eq!(stats.write_retries, 2);
        assert_eq!(stats.max_write_retry, 2);
        assert_eq!(sim.state().registers[&(Register::Direction, 'A')], 0x0F);
    }

    #[test]
    fn test_write_validation_exhaustion_times_out() {
        let retries = 3;
        let (driver, sim) = sim_driver(fast_config().with_retries(retries));
        sim.state().ignored_writes = usize::MAX;

        let err = driver.command(b"!A\x00", &address()).unwrap_err();
        assert!(matches!(err, EioError::Timeout));

        let stats = driver.stats().snapshot();
        assert_eq!(stats.write_retries, u64::from(retries) + 1);
        assert_eq!(stats.max_write_retry, u64::from(retries));
    }

    #[test]
    fn test_read_retries_nest_inside_validation() {
        let (driver, sim) = sim_driver(fast_config());
        // Write goes out, then the first read-back attempt is lost.
        sim.state().failures.extend([false, true]);

        driver.command(b"!B\x00", &address()).unwrap();
        let stats = driver.stats().snapshot();
        assert_eq!(stats.read_retries, 1);
        assert_eq!(stats.write_retries, 0);
    }

    #[test]
    fn test_validation_disabled_sends_once() {
        let (driver, sim) = sim_driver(fast_config().with_write_validate(false));
        sim.state().ignored_writes = 1;

        driver.command(b"!A\x00", &address()).unwrap();
        assert_eq!(sim.state().received, vec![b"!A\x00".to_vec()]);
    }
}
