use std::net::SocketAddr;
use std::time::Duration;

/// Errors that can occur in UDP transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The host is not a dotted-quad IPv4 address.
    #[error("IP address not valid: {0}")]
    InvalidHost(String),

    /// The port is outside `1..=65535`.
    #[error("port number out of range: {0}")]
    InvalidPort(u32),

    /// Sending a datagram failed.
    #[error("error sending message: {0}")]
    Send(std::io::Error),

    /// Receiving a datagram failed.
    #[error("error receiving message: {0}")]
    Receive(std::io::Error),

    /// No reply arrived within the configured timeout.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// An I/O error occurred on the socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
