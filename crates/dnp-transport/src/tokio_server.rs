use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::reply::{DatagramHandler, ReplySink};
use crate::server::ServerConfig;

/// Reply channel over a shared tokio socket.
///
/// Must be used from a blocking worker: the send is driven to completion on
/// the runtime `handle`, waiting for socket buffer space when it is full.
#[derive(Debug, Clone)]
pub struct AsyncUdpReply {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    handle: Handle,
}

impl ReplySink for AsyncUdpReply {
    fn send_reply(&self, message: &[u8]) -> io::Result<usize> {
        self.handle.block_on(self.socket.send_to(message, self.peer))
    }

    fn peer(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}

/// UDP server on the tokio runtime.
///
/// Handlers may block, so each datagram runs on `spawn_blocking`.
#[derive(Debug)]
pub struct AsyncUdpServer {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    config: ServerConfig,
}

impl AsyncUdpServer {
    pub async fn bind(endpoint: &Endpoint) -> Result<Self> {
        Self::bind_with_config(endpoint, ServerConfig::default()).await
    }

    pub async fn bind_with_config(endpoint: &Endpoint, config: ServerConfig) -> Result<Self> {
        let addr = endpoint.socket_addr();
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        Self::from_socket(socket, config)
    }

    pub fn from_socket(socket: UdpSocket, config: ServerConfig) -> Result<Self> {
        let local_addr = socket.local_addr()?;
        info!(%local_addr, "async udp server bound");
        Ok(Self {
            socket: Arc::new(socket),
            local_addr,
            config,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive and dispatch datagrams until `shutdown` is cancelled.
    pub async fn serve<H>(&self, handler: Arc<H>, shutdown: CancellationToken) -> Result<()>
    where
        H: DatagramHandler + ?Sized + 'static,
    {
        let handle = Handle::current();
        let mut buf = vec![0u8; self.config.max_datagram_size];
        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut buf) => received,
            };
            let (len, peer) = match received {
                Ok(received) => received,
                Err(err) => {
                    warn!(error = %err, "receive failed");
                    continue;
                }
            };
            debug!(%peer, len, "datagram received");

            let datagram = buf[..len].to_vec();
            let reply = AsyncUdpReply {
                socket: Arc::clone(&self.socket),
                peer,
                handle: handle.clone(),
            };
            let worker = Arc::clone(&handler);
            tokio::task::spawn_blocking(move || worker.handle(&datagram, &reply));
        }
        info!(local_addr = %self.local_addr, "async udp server stopped");
        Ok(())
    }
}
