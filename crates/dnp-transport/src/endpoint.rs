use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use crate::error::{Result, TransportError};

/// A validated IPv4 destination or bind address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: Ipv4Addr,
    port: u16,
}

impl Endpoint {
    /// Default destination host for clients.
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    /// Default bind host for servers.
    pub const DEFAULT_BIND_HOST: &'static str = "0.0.0.0";
    /// Default port for both sides.
    pub const DEFAULT_PORT: u16 = 12345;

    /// Validate a host/port pair.
    ///
    /// The host must be in dotted-quad form and the port inside `(0, 65536)`.
    pub fn new(host: &str, port: u32) -> Result<Self> {
        if !is_dotted_quad(host) {
            return Err(TransportError::InvalidHost(host.to_string()));
        }
        let host: Ipv4Addr = host
            .parse()
            .map_err(|_| TransportError::InvalidHost(host.to_string()))?;
        let port = match u16::try_from(port) {
            Ok(port) if port > 0 => port,
            _ => return Err(TransportError::InvalidPort(port)),
        };
        Ok(Self { host, port })
    }

    /// Default client destination, `127.0.0.1:12345`.
    pub fn default_client() -> Self {
        Self {
            host: Ipv4Addr::LOCALHOST,
            port: Self::DEFAULT_PORT,
        }
    }

    /// Default server bind address, `0.0.0.0:12345`.
    pub fn default_server() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED,
            port: Self::DEFAULT_PORT,
        }
    }

    pub fn host(&self) -> Ipv4Addr {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.host, self.port))
    }
}

impl From<SocketAddrV4> for Endpoint {
    fn from(addr: SocketAddrV4) -> Self {
        Self {
            host: *addr.ip(),
            port: addr.port(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parses `host:port`.
impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(input: &str) -> Result<Self> {
        let (host, port) = input
            .rsplit_once(':')
            .ok_or_else(|| TransportError::InvalidHost(input.to_string()))?;
        let port: u32 = port
            .parse()
            .map_err(|_| TransportError::InvalidHost(input.to_string()))?;
        Self::new(host, port)
    }
}

fn is_dotted_quad(host: &str) -> bool {
    let octets: Vec<&str> = host.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|octet| (1..=3).contains(&octet.len()) && octet.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dotted_quad() {
        let endpoint = Endpoint::new("192.168.1.20", 9000).unwrap();
        assert_eq!(endpoint.host(), Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(endpoint.port(), 9000);
        assert_eq!(endpoint.to_string(), "192.168.1.20:9000");
    }

    #[test]
    fn rejects_hostnames_and_partial_addresses() {
        for host in ["localhost", "10.0.0", "10.0.0.1.5", "1234.0.0.1", "10.0.0.x", ""] {
            assert!(
                matches!(Endpoint::new(host, 80), Err(TransportError::InvalidHost(_))),
                "{host} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_octets_that_do_not_fit() {
        assert!(matches!(
            Endpoint::new("300.1.1.1", 80),
            Err(TransportError::InvalidHost(_))
        ));
    }

    #[test]
    fn port_must_be_inside_open_range() {
        assert!(matches!(
            Endpoint::new("127.0.0.1", 0),
            Err(TransportError::InvalidPort(0))
        ));
        assert!(matches!(
            Endpoint::new("127.0.0.1", 65_536),
            Err(TransportError::InvalidPort(65_536))
        ));
        assert!(Endpoint::new("127.0.0.1", 65_535).is_ok());
        assert!(Endpoint::new("127.0.0.1", 1).is_ok());
    }

    #[test]
    fn defaults() {
        assert_eq!(Endpoint::default_client().to_string(), "127.0.0.1:12345");
        assert_eq!(Endpoint::default_server().to_string(), "0.0.0.0:12345");
    }

    #[test]
    fn parse_host_port() {
        let endpoint: Endpoint = "10.1.2.3:4000".parse().unwrap();
        assert_eq!(endpoint, Endpoint::new("10.1.2.3", 4000).unwrap());
        assert!("10.1.2.3".parse::<Endpoint>().is_err());
    }
}
