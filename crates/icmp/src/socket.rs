//! Raw ICMP socket handling.
//!
//! One socket per monitored destination. Raw ICMP sockets receive a copy
//! of every inbound ICMP datagram addressed to the process, so callers
//! must correlate replies by identifier and sequence number.

use crate::packet::{EchoPacket, strip_ip_header};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, ErrorKind};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Nonblocking raw ICMPv4 socket bound to a single destination
pub struct IcmpSocket {
    socket: Socket,
    dest: SockAddr,
}

impl IcmpSocket {
    /// Create a new raw ICMP socket for the given destination.
    ///
    /// Requires CAP_NET_RAW (or root) on Linux.
    pub fn new(dest: Ipv4Addr) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        socket.set_nonblocking(true)?;

        let dest = SocketAddr::new(IpAddr::V4(dest), 0).into();

        Ok(Self { socket, dest })
    }

    /// Send an echo request to this socket's destination.
    pub fn send(&self, packet: &EchoPacket) -> io::Result<usize> {
        self.socket.send_to(&packet.to_bytes(), &self.dest)
    }

    /// Receive one ICMP message.
    ///
    /// The kernel delivers the full IP datagram on raw sockets; the IP
    /// header is stripped before parsing. Malformed datagrams surface as
    /// `InvalidData`.
    pub fn recv(&self) -> io::Result<EchoPacket> {
        use std::mem::MaybeUninit;

        let mut buf: [MaybeUninit<u8>; 1500] = [MaybeUninit::uninit(); 1500];

        let (len, _from) = self.socket.recv_from(&mut buf)?;

        // Received bytes are initialized by the kernel
        let buf: &[u8] =
            unsafe { std::slice::from_raw_parts(buf.as_ptr() as *const u8, len) };

        let icmp = strip_ip_header(buf)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;

        EchoPacket::parse(icmp).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
    }

    /// Try to receive a message without blocking.
    ///
    /// Returns None when no datagram is queued.
    pub fn try_recv(&self) -> io::Result<Option<EchoPacket>> {
        match self.recv() {
            Ok(packet) => Ok(Some(packet)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}
