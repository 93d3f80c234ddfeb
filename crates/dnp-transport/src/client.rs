use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use bytes::Bytes;
use dnp_frame::Packet;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};

/// Configuration for [`UdpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long to wait for a reply. Default: 5 s.
    pub timeout: Duration,
    /// Receive buffer size; longer replies are truncated. Default: 1024 bytes.
    pub buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            buffer_size: 1024,
        }
    }
}

/// Request/reply UDP client: one datagram out, one datagram back.
#[derive(Debug)]
pub struct UdpClient {
    socket: UdpSocket,
    config: ClientConfig,
}

impl UdpClient {
    /// Bind an ephemeral local socket with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Bind an ephemeral local socket with explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        Self::from_socket(socket, config)
    }

    /// Wrap an already-bound socket.
    pub fn from_socket(socket: UdpSocket, config: ClientConfig) -> Result<Self> {
        socket.set_read_timeout(Some(config.timeout))?;
        Ok(Self { socket, config })
    }

    /// Send raw bytes and wait for a single reply.
    ///
    /// Datagrams from any address other than `endpoint` are discarded while
    /// waiting. Returns the number of bytes sent and the reply datagram.
    pub fn send(&self, message: &[u8], endpoint: &Endpoint) -> Result<(usize, Bytes)> {
        let target = endpoint.socket_addr();
        let sent = self
            .socket
            .send_to(message, target)
            .map_err(TransportError::Send)?;
        debug!(%endpoint, sent, "datagram sent");

        let deadline = Instant::now() + self.config.timeout;
        let mut buf = vec![0u8; self.config.buffer_size];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::Timeout(self.config.timeout));
            }
            self.socket.set_read_timeout(Some(remaining))?;

            let (received, from) = self.socket.recv_from(&mut buf).map_err(|err| match err.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout(self.config.timeout),
                _ => TransportError::Receive(err),
            })?;
            if !is_reply_from(target, from) {
                warn!(%from, %endpoint, received, "datagram from unexpected peer ignored");
                continue;
            }
            debug!(%from, received, "reply received");

            buf.truncate(received);
            return Ok((sent, Bytes::from(buf)));
        }
    }

    /// Encode a packet and send it, waiting for a single reply.
    pub fn send_packet(&self, packet: &Packet, endpoint: &Endpoint) -> Result<(usize, Bytes)> {
        self.send(&packet.pack(), endpoint)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

// An unspecified target host can be answered from any local address.
fn is_reply_from(target: SocketAddr, from: SocketAddr) -> bool {
    from.port() == target.port() && (target.ip().is_unspecified() || from.ip() == target.ip())
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn loopback_socket() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").expect("loopback socket should bind")
    }

    #[test]
    fn send_returns_reply() {
        let server = loopback_socket();
        let port = server.local_addr().unwrap().port();

        let echo = thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (n, peer) = server.recv_from(&mut buf).unwrap();
            server.send_to(&buf[..n].to_ascii_uppercase(), peer).unwrap();
        });

        let client = UdpClient::from_socket(loopback_socket(), ClientConfig::default()).unwrap();
        let endpoint = Endpoint::new("127.0.0.1", u32::from(port)).unwrap();
        let (sent, reply) = client.send(b"ping", &endpoint).unwrap();

        assert_eq!(sent, 4);
        assert_eq!(reply.as_ref(), b"PING");
        echo.join().unwrap();
    }

    #[test]
    fn stray_datagram_is_not_taken_as_reply() {
        let server = loopback_socket();
        let port = server.local_addr().unwrap().port();
        let client_socket = loopback_socket();
        let client_addr = client_socket.local_addr().unwrap();

        let stray = loopback_socket();
        stray.send_to(b"success", client_addr).unwrap();

        let answer = thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (_, peer) = server.recv_from(&mut buf).unwrap();
            server.send_to(b"failure", peer).unwrap();
        });

        let client = UdpClient::from_socket(client_socket, ClientConfig::default()).unwrap();
        let endpoint = Endpoint::new("127.0.0.1", u32::from(port)).unwrap();
        let (_, reply) = client.send(b"status", &endpoint).unwrap();

        assert_eq!(reply.as_ref(), b"failure");
        answer.join().unwrap();
    }

    #[test]
    fn reply_source_must_match_target() {
        let target: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert!(is_reply_from(target, target));
        assert!(!is_reply_from(target, "127.0.0.1:4001".parse().unwrap()));
        assert!(!is_reply_from(target, "127.0.0.2:4000".parse().unwrap()));
        assert!(is_reply_from(
            "0.0.0.0:4000".parse().unwrap(),
            "127.0.0.1:4000".parse().unwrap()
        ));
    }

    #[test]
    fn missing_reply_times_out() {
        let silent = loopback_socket();
        let port = silent.local_addr().unwrap().port();

        let client = UdpClient::from_socket(
            loopback_socket(),
            ClientConfig {
                timeout: Duration::from_millis(50),
                ..ClientConfig::default()
            },
        )
        .unwrap();
        let endpoint = Endpoint::new("127.0.0.1", u32::from(port)).unwrap();

        assert!(matches!(
            client.send(b"anyone?", &endpoint),
            Err(TransportError::Timeout(_))
        ));
        drop(silent);
    }
}
