//! In-memory module simulator used by the driver and device tests.
//!
//! [`SimTransport`] answers the command set the way a module does: register
//! reads echo the selector and port and append the value, register writes
//! update state silently, EEPROM words are stored per register. Value-register
//! bits configured as inputs read back as the simulated input levels.
//!
//! Faults can be injected: dropped exchanges and writes that the module
//! ignores.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::address::DeviceAddress;
use crate::register::Register;
use crate::transport::{Channel, Transport};

#[derive(Debug, Default)]
pub(crate) struct SimState {
    pub registers: HashMap<(Register, char), u8>,
    pub inputs: HashMap<char, u8>,
    pub eeprom: HashMap<u8, u16>,
    pub mac: [u8; 6],
    /// Every datagram received, in order.
    pub received: Vec<Vec<u8>>,
    /// Number of channels opened.
    pub opened: usize,
    /// Upcoming exchanges to fail; `true` fails the exchange.
    pub failures: VecDeque<bool>,
    /// Fail every exchange.
    pub unreachable: bool,
    /// Register writes to ignore before honouring them.
    pub ignored_writes: usize,
}

impl SimState {
    fn register(&self, register: Register, port: char) -> u8 {
        // Ports power up as inputs.
        let power_up = if register == Register::Direction { 0xFF } else { 0 };
        let stored = self
            .registers
            .get(&(register, port))
            .copied()
            .unwrap_or(power_up);
        if register != Register::Value {
            return stored;
        }
        // Input bits (direction 1) read the line, output bits read the latch.
        let dir = self.register(Register::Direction, port);
        let inputs = self.inputs.get(&port).copied().unwrap_or(0);
        (stored & !dir) | (inputs & dir)
    }

    fn handle(&mut self, cmd: &[u8]) -> Option<Vec<u8>> {
        match cmd {
            b"IO24" | b"'IO72" => {
                let mut rsp = b"IO24".to_vec();
                rsp.extend_from_slice(&self.mac);
                rsp.extend_from_slice(&[0x01, 0x07]);
                Some(rsp)
            }
            [b'\'', b'R', reg, _, _] => {
                let [lo, hi] = self.eeprom.get(reg).copied().unwrap_or(0).to_le_bytes();
                Some(vec![b'R', *reg, lo, hi])
            }
            [b'\'', b'W', reg, lo, hi] => {
                self.eeprom.insert(*reg, u16::from_le_bytes([*lo, *hi]));
                None
            }
            [b'\'', ..] => None,
            _ => self.handle_register(cmd),
        }
    }

    fn handle_register(&mut self, cmd: &[u8]) -> Option<Vec<u8>> {
        let (selector, rest) = match cmd.first() {
            Some(b) if b.is_ascii_alphabetic() => (b'_', cmd),
            Some(b) => (*b, &cmd[1..]),
            None => return None,
        };
        let register = Register::from_selector(selector)?;
        match rest {
            [port] => {
                let port = port.to_ascii_uppercase() as char;
                let mut rsp = cmd.to_ascii_uppercase();
                rsp.push(self.register(register, port));
                Some(rsp)
            }
            [port, value] => {
                if self.ignored_writes > 0 {
                    self.ignored_writes -= 1;
                } else {
                    self.registers.insert((register, *port as char), *value);
                }
                None
            }
            _ => None,
        }
    }
}

/// Shared handle to a simulated module.
#[derive(Debug, Clone, Default)]
pub(crate) struct SimTransport {
    state: Arc<Mutex<SimState>>,
}

impl SimTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct SimChannel {
    state: Arc<Mutex<SimState>>,
    pending: Option<Vec<u8>>,
    fail: bool,
}

impl Transport for SimTransport {
    fn open(&self, _address: &DeviceAddress, _timeout: Duration) -> io::Result<Box<dyn Channel>> {
        let mut state = self.state();
        state.opened += 1;
        let fail = state.unreachable || state.failures.pop_front().unwrap_or(false);
        Ok(Box::new(SimChannel {
            state: Arc::clone(&self.state),
            pending: None,
            fail,
        }))
    }
}

impl Channel for SimChannel {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "simulated loss"));
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.received.push(data.to_vec());
        self.pending = state.handle(data);
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.pending.take() {
            Some(rsp) => {
                let n = rsp.len().min(buf.len());
                buf[..n].copy_from_slice(&rsp[..n]);
                Ok(n)
            }
            None => Err(io::Error::new(io::ErrorKind::WouldBlock, "no response")),
        }
    }
}
