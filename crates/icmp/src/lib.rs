//! ICMPv4 echo wire format and raw socket handling.
//!
//! Implements just enough of RFC 792 to probe host reachability:
//! echo request construction with a send-timestamp payload, echo reply
//! parsing, the RFC 1071 Internet checksum, and a nonblocking raw
//! socket wrapper bound to a single destination.
//!
//! # Example
//!
//! ```
//! use icmp::EchoPacket;
//!
//! let request = EchoPacket::request(0x1234, 7);
//! let parsed = EchoPacket::parse(&request.to_bytes()).unwrap();
//! assert_eq!(parsed.ident, 0x1234);
//! assert_eq!(parsed.seq, 7);
//! ```

mod packet;
mod socket;

pub use packet::{
    EchoPacket, ECHO_DATA_LEN, ICMP_ECHO_REPLY, ICMP_ECHO_REQUEST, ICMP_HEADER_LEN, checksum,
    strip_ip_header,
};
pub use socket::IcmpSocket;
