//! Transport layer for Ether I/O communication.
//!
//! A [`Transport`] opens one [`Channel`] per exchange attempt. The channel owns
//! its socket, so dropping it releases the socket on every path out of the
//! retry loop, including errors. The transport layer knows nothing about the
//! command set; it only moves bytes.
//!
//! Two transports are provided:
//!
//! - [`UdpTransport`] - one datagram out, at most one datagram back
//! - [`TcpTransport`] - connect, send, read once, close
//!
//! # Constants
//!
//! - [`DEFAULT_TIMEOUT`] - Default receive timeout (1 second)
//! - [`MAX_PACKET_SIZE`] - Receive buffer size (1024 bytes)
//!
//! # Example
//!
//! ```no_run
//! use etherio::{Channel, DeviceAddress, Transport, UdpTransport};
//! use std::time::Duration;
//!
//! let address = DeviceAddress::parse("192.168.1.50").unwrap();
//! let mut channel = UdpTransport.open(&address, Duration::from_secs(1)).unwrap();
//! channel.send(b"!a").unwrap();
//!
//! let mut buf = [0u8; 1024];
//! let n = channel.recv(&mut buf).unwrap();
//! println!("direction of port A: {:#04x}", buf[n - 1]);
//! ```

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::time::Duration;

use crate::address::DeviceAddress;

/// Default receive timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Receive buffer size.
pub const MAX_PACKET_SIZE: usize = 1024;

/// Which transport a driver builds by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportKind {
    /// Datagrams on the module's UDP command port.
    #[default]
    Udp,
    /// One TCP connection per exchange.
    Tcp,
}

/// Opens channels to a module.
pub trait Transport: std::fmt::Debug + Send + Sync {
    /// Opens a channel to `address` whose operations give up after `timeout`.
    fn open(&self, address: &DeviceAddress, timeout: Duration) -> io::Result<Box<dyn Channel>>;
}

/// One open exchange with a module. Dropping the channel closes it.
pub trait Channel {
    /// Sends the whole command.
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Receives one response into `buf`, returning its length.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// UDP transport: a fresh ephemeral socket per channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpTransport;

struct UdpChannel {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl Transport for UdpTransport {
    fn open(&self, address: &DeviceAddress, timeout: Duration) -> io::Result<Box<dyn Channel>> {
        let remote = address.resolve()?;
        let local: SocketAddr = if remote.is_ipv4() {
            "0.0.0.0:0".parse().map_err(invalid_input)?
        } else {
            "[::]:0".parse().map_err(invalid_input)?
        };

        let socket = UdpSocket::bind(local)?;
        socket.set_read_timeout(Some(timeout))?;
        socket.set_write_timeout(Some(timeout))?;

        Ok(Box::new(UdpChannel { socket, remote }))
    }
}

impl Channel for UdpChannel {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let sent = self.socket.send_to(data, self.remote)?;
        if sent != data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {sent} of {} bytes", data.len()),
            ));
        }
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (size, _) = self.socket.recv_from(buf)?;
        Ok(size)
    }
}

/// TCP transport: one connection per channel, closed on drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

struct TcpChannel {
    stream: TcpStream,
}

impl Transport for TcpTransport {
    fn open(&self, address: &DeviceAddress, timeout: Duration) -> io::Result<Box<dyn Channel>> {
        let stream = TcpStream::connect_timeout(&address.resolve()?, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;

        Ok(Box::new(TcpChannel { stream }))
    }
}

impl Channel for TcpChannel {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.read(buf)? {
            0 => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before response",
            )),
            n => Ok(n),
        }
    }
}

/// Builds the transport for a [`TransportKind`].
pub(crate) fn for_kind(kind: TransportKind) -> std::sync::Arc<dyn Transport> {
    match kind {
        TransportKind::Udp => std::sync::Arc::new(UdpTransport),
        TransportKind::Tcp => std::sync::Arc::new(TcpTransport),
    }
}

fn invalid_input(e: std::net::AddrParseError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e)
}
