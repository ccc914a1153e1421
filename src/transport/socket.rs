//! UDP broadcast socket pair
//!
//! CHIRP uses two independent endpoints: a sender connected to the broadcast
//! (or a specific) destination address, and a receiver bound to a wildcard or
//! specific address. Both carry the broadcast and reuse-address socket options
//! so several participants can share one machine and one port.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use bytes::Bytes;
use socket2::{Domain, Protocol, Socket, Type};

use crate::protocol::Result;

/// Receive buffer size; anything longer than a CHIRP frame is foreign traffic
/// and gets rejected by the decoder regardless of truncation
const RECV_BUFFER_SIZE: usize = 1024;

/// Datagram received from the broadcast medium
#[derive(Debug, Clone)]
pub struct BroadcastMessage {
    /// Raw datagram content
    pub content: Bytes,
    /// Source address of the datagram
    pub address: SocketAddr,
}

fn broadcast_socket(addr: SocketAddr) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_broadcast(true)?;
    Ok(socket)
}

/// Sender for outgoing CHIRP broadcasts
///
/// The socket is connected to its destination at construction; writes are
/// best-effort datagram sends with no delivery guarantee.
#[derive(Debug)]
pub struct BroadcastSend {
    socket: UdpSocket,
}

impl BroadcastSend {
    /// Create a sender connected to the given destination address
    pub fn new(destination: SocketAddr) -> Result<Self> {
        let socket = broadcast_socket(destination)?;
        socket.connect(&destination.into())?;
        Ok(Self {
            socket: socket.into(),
        })
    }

    /// Send one datagram to the connected destination
    pub fn send(&self, frame: &[u8]) -> Result<()> {
        self.socket.send(frame)?;
        Ok(())
    }
}

/// Receiver for incoming CHIRP broadcasts
#[derive(Debug)]
pub struct BroadcastRecv {
    socket: UdpSocket,
}

impl BroadcastRecv {
    /// Create a receiver bound to the given address
    pub fn new(bind: SocketAddr) -> Result<Self> {
        let socket = broadcast_socket(bind)?;
        socket.bind(&bind.into())?;
        Ok(Self {
            socket: socket.into(),
        })
    }

    /// Get the bound local address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive one datagram, blocking for at most `timeout`
    ///
    /// Returns `Ok(None)` when the timeout elapses without traffic; the
    /// timeout must be non-zero.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<BroadcastMessage>> {
        self.socket.set_read_timeout(Some(timeout))?;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        match self.socket.recv_from(&mut buf) {
            Ok((len, address)) => Ok(Some(BroadcastMessage {
                content: Bytes::copy_from_slice(&buf[..len]),
                address,
            })),
            Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
