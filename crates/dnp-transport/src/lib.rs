//! UDP datagram transport.
//!
//! The transport moves whole datagrams and nothing else: no sequencing, no
//! acknowledgement, no retry. Each received datagram is handed to a
//! [`DatagramHandler`] together with a [`ReplySink`] addressed to the sender.
//!
//! - [`Endpoint`]: validated IPv4 host + port
//! - [`UdpClient`]: send a datagram, wait for one reply
//! - [`UdpServer`]: blocking receive loop, one worker thread per datagram
//! - `AsyncUdpServer`: the same loop on tokio (behind the `async` feature)

pub mod client;
pub mod endpoint;
pub mod error;
pub mod reply;
pub mod server;

#[cfg(feature = "async")]
pub mod tokio_server;

pub use client::{ClientConfig, UdpClient};
pub use endpoint::Endpoint;
pub use error::{Result, TransportError};
pub use reply::{DatagramHandler, ReplySink, UdpReply};
pub use server::{ServerConfig, UdpServer};

#[cfg(feature = "async")]
pub use tokio_server::{AsyncUdpReply, AsyncUdpServer};
