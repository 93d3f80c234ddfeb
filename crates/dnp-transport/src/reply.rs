use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

/// Sends bytes back to the peer that produced the current datagram.
pub trait ReplySink: Send + Sync {
    /// Transmit one reply datagram and return the number of bytes sent.
    fn send_reply(&self, message: &[u8]) -> io::Result<usize>;

    /// Address of the originating peer, when known.
    fn peer(&self) -> Option<SocketAddr> {
        None
    }
}

/// Processes one inbound datagram.
///
/// Implementations must not assume ordering between datagrams: each call is an
/// independent unit of work and may run concurrently with others.
pub trait DatagramHandler: Send + Sync {
    fn handle(&self, datagram: &[u8], reply: &dyn ReplySink);
}

impl<T: DatagramHandler + ?Sized> DatagramHandler for Arc<T> {
    fn handle(&self, datagram: &[u8], reply: &dyn ReplySink) {
        (**self).handle(datagram, reply)
    }
}

/// Reply channel over a shared, blocking UDP socket.
#[derive(Debug, Clone)]
pub struct UdpReply {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpReply {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

impl ReplySink for UdpReply {
    fn send_reply(&self, message: &[u8]) -> io::Result<usize> {
        self.socket.send_to(message, self.peer)
    }

    fn peer(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
