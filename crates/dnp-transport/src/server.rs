use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::reply::{DatagramHandler, UdpReply};

/// Configuration for [`UdpServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Largest datagram accepted; longer datagrams are truncated. Default: 8 KiB.
    pub max_datagram_size: usize,
    /// How often the receive loop wakes to check for shutdown. Default: 250 ms.
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_datagram_size: 8 * 1024,
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Blocking UDP server.
///
/// Every received datagram is handled on its own worker thread; there is no
/// ordering between datagrams and no retry.
#[derive(Debug)]
pub struct UdpServer {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    config: ServerConfig,
}

impl UdpServer {
    /// Bind with default configuration.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        Self::bind_with_config(endpoint, ServerConfig::default())
    }

    /// Bind with explicit configuration.
    pub fn bind_with_config(endpoint: &Endpoint, config: ServerConfig) -> Result<Self> {
        let addr = endpoint.socket_addr();
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        Self::from_socket(socket, config)
    }

    /// Wrap an already-bound socket.
    pub fn from_socket(socket: UdpSocket, config: ServerConfig) -> Result<Self> {
        socket.set_read_timeout(Some(config.poll_interval))?;
        let local_addr = socket.local_addr()?;
        info!(%local_addr, "udp server bound");
        Ok(Self {
            socket: Arc::new(socket),
            local_addr,
            config,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive and dispatch datagrams until `running` is cleared.
    ///
    /// Receive errors are logged and the loop keeps going.
    pub fn serve<H>(&self, handler: Arc<H>, running: &AtomicBool) -> Result<()>
    where
        H: DatagramHandler + ?Sized + 'static,
    {
        let mut buf = vec![0u8; self.config.max_datagram_size];
        while running.load(Ordering::SeqCst) {
            let Some((len, peer)) = self.recv(&mut buf) else {
                continue;
            };
            let datagram = buf[..len].to_vec();
            let reply = UdpReply::new(Arc::clone(&self.socket), peer);
            let worker = Arc::clone(&handler);

            let spawned = thread::Builder::new()
                .name(format!("dnp-worker-{peer}"))
                .spawn(move || worker.handle(&datagram, &reply));
            if let Err(err) = spawned {
                warn!(error = %err, %peer, "failed spawning worker, datagram dropped");
            }
        }
        info!(local_addr = %self.local_addr, "udp server stopped");
        Ok(())
    }

    /// Receive one datagram and handle it on the calling thread.
    ///
    /// Returns `false` when nothing arrived within the poll interval.
    pub fn handle_next(&self, handler: &dyn DatagramHandler) -> bool {
        let mut buf = vec![0u8; self.config.max_datagram_size];
        match self.recv(&mut buf) {
            Some((len, peer)) => {
                let reply = UdpReply::new(Arc::clone(&self.socket), peer);
                handler.handle(&buf[..len], &reply);
                true
            }
            None => false,
        }
    }

    fn recv(&self, buf: &mut [u8]) -> Option<(usize, SocketAddr)> {
        match self.socket.recv_from(buf) {
            Ok((len, peer)) => {
                debug!(%peer, len, "datagram received");
                Some((len, peer))
            }
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                None
            }
            Err(err) => {
                warn!(error = %err, "receive failed");
                None
            }
        }
    }
}
