//! Device addressing.
//!
//! A [`DeviceAddress`] is a host and port pair. It can be built from the
//! shapes users tend to have at hand:
//!
//! | Input | Result |
//! |-------|--------|
//! | `"192.168.1.50"` | `192.168.1.50:2424` |
//! | `"192.168.1.50:8000"` | `192.168.1.50:8000` |
//! | `""` | `10.10.10.10:2424` |
//! | `[192, 168, 1, 50]` | `192.168.1.50:2424` |
//! | `([192, 168, 1, 50], 8000)` | `192.168.1.50:8000` |
//! | `("eio.local", 8000)` | `eio.local:8000` |
//!
//! A missing host becomes [`DEFAULT_HOST`] and a missing or zero port becomes
//! [`DEFAULT_PORT`].

use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use crate::error::{EioError, Result};

/// Factory default host, selectable by jumper on the module.
pub const DEFAULT_HOST: &str = "10.10.10.10";

/// Default command port.
pub const DEFAULT_PORT: u16 = 2424;

/// Default device address string.
pub const DEFAULT_ADDRESS: &str = "10.10.10.10:2424";

/// Network address of an Ether I/O module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    host: String,
    port: u16,
}

impl DeviceAddress {
    /// Creates an address, substituting the defaults for an empty host or a zero port.
    ///
    /// # Example
    ///
    /// ```
    /// use etherio::DeviceAddress;
    ///
    /// let addr = DeviceAddress::new("", 0);
    /// assert_eq!(addr.host(), "10.10.10.10");
    /// assert_eq!(addr.port(), 2424);
    /// ```
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let host = host.trim();
        Self {
            host: if host.is_empty() {
                DEFAULT_HOST.to_string()
            } else {
                host.to_string()
            },
            port: if port == 0 { DEFAULT_PORT } else { port },
        }
    }

    /// Parses `"host"`, `"host:port"` or `""`.
    ///
    /// # Errors
    ///
    /// Returns `EioError::InvalidAddress` if the port part is not a number.
    ///
    /// # Example
    ///
    /// ```
    /// use etherio::DeviceAddress;
    ///
    /// let addr = DeviceAddress::parse("192.168.1.50:8000").unwrap();
    /// assert_eq!(addr.host(), "192.168.1.50");
    /// assert_eq!(addr.port(), 8000);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (host, port) = match s.split_once(':') {
            Some((host, port)) => (host, port.trim()),
            None => (s, ""),
        };

        let port = if port.is_empty() {
            DEFAULT_PORT
        } else {
            port.parse::<u16>().map_err(|_| {
                EioError::invalid_address(format!("port '{port}' is not a number in 0-65535"))
            })?
        };

        Ok(Self::new(host, port))
    }

    /// Returns the host name or dotted-quad address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the UDP/TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolves to the first socket address of the host.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the host cannot be resolved.
    pub fn resolve(&self) -> std::io::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    format!("no address found for {}", self.host),
                )
            })
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl FromStr for DeviceAddress {
    type Err = EioError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<[u8; 4]> for DeviceAddress {
    fn from(octets: [u8; 4]) -> Self {
        Self::from(Ipv4Addr::from(octets))
    }
}

impl From<([u8; 4], u16)> for DeviceAddress {
    fn from((octets, port): ([u8; 4], u16)) -> Self {
        Self::new(Ipv4Addr::from(octets).to_string(), port)
    }
}

impl From<Ipv4Addr> for DeviceAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self::new(ip.to_string(), DEFAULT_PORT)
    }
}

impl From<SocketAddr> for DeviceAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

impl From<(&str, u16)> for DeviceAddress {
    fn from((host, port): (&str, u16)) -> Self {
        Self::new(host, port)
    }
}

impl From<(String, u16)> for DeviceAddress {
    fn from((host, port): (String, u16)) -> Self {
        Self::new(host, port)
    }
}

impl std::fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_only() {
        let addr = DeviceAddress::parse("192.168.1.50").unwrap();
        assert_eq!(addr.host(), "192.168.1.50");
        assert_eq!(addr.port(), 2424);
    }

    #[test]
    fn test_parse_host_and_port() {
        let addr = DeviceAddress::parse("192.168.1.50:8000").unwrap();
        assert_eq!(addr.host(), "192.168.1.50");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(DeviceAddress::parse("").unwrap(), DeviceAddress::default());
        assert_eq!(DeviceAddress::default().to_string(), DEFAULT_ADDRESS);
    }

    #[test]
    fn test_parse_port_only() {
        let addr = DeviceAddress::parse(":9000").unwrap();
        assert_eq!(addr.host(), DEFAULT_HOST);
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn test_parse_bad_port() {
        assert!(matches!(
            DeviceAddress::parse("192.168.1.50:http"),
            Err(EioError::InvalidAddress { .. })
        ));
        assert!(DeviceAddress::parse("192.168.1.50:70000").is_err());
    }

    #[test]
    fn test_from_octets() {
        let addr = DeviceAddress::from([192, 168, 1, 10]);
        assert_eq!(addr.to_string(), "192.168.1.10:2424");

        let addr = DeviceAddress::from(([192, 168, 1, 10], 8000));
        assert_eq!(addr.to_string(), "192.168.1.10:8000");
    }

    #[test]
    fn test_from_pair() {
        let addr = DeviceAddress::from(("eio.local", 2425));
        assert_eq!(addr.host(), "eio.local");
        assert_eq!(addr.port(), 2425);

        let addr = DeviceAddress::from((String::new(), 0));
        assert_eq!(addr, DeviceAddress::default());
    }

    #[test]
    fn test_resolve_loopback() {
        let addr = DeviceAddress::new("127.0.0.1", 2424);
        let resolved = addr.resolve().unwrap();
        assert_eq!(resolved, "127.0.0.1:2424".parse().unwrap());
    }
}
