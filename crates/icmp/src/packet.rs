//! ICMP echo packet format and parsing.
//!
//! RFC 792 - Echo or Echo Reply Message
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |     Code      |           Checksum            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           Identifier          |        Sequence Number        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Data ...
//! +-+-+-+-+-+-+-+-+-
//! ```
//!
//! The first 8 data bytes of an outbound request carry the send time in
//! microseconds since the Unix epoch, echoed back by the peer and used
//! for round-trip measurement.

use bytes::{BufMut, Bytes, BytesMut};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// ICMP echo request message type
pub const ICMP_ECHO_REQUEST: u8 = 8;

/// ICMP echo reply message type
pub const ICMP_ECHO_REPLY: u8 = 0;

/// Minimum ICMP header length (type, code, checksum, identifier, sequence)
pub const ICMP_HEADER_LEN: usize = 8;

/// Conventional echo data length (64-byte packet minus the header)
pub const ECHO_DATA_LEN: usize = 56;

/// Length of the send-timestamp prefix inside the echo data
const TIMESTAMP_LEN: usize = 8;

/// One ICMP echo message (request or reply)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoPacket {
    /// Message type (8 = echo request, 0 = echo reply)
    pub icmp_type: u8,

    /// Message code (always 0 for echo)
    pub code: u8,

    /// RFC 1071 checksum over the entire message
    pub checksum: u16,

    /// Echo identifier, process-wide
    pub ident: u16,

    /// Sequence number, used as the per-host correlation tag
    pub seq: u16,

    /// Echo data (send timestamp plus filler)
    pub payload: Bytes,
}

impl EchoPacket {
    /// Build an echo request carrying the current time in its payload.
    ///
    /// The checksum field is filled in, so the returned packet is ready
    /// for transmission.
    pub fn request(ident: u16, seq: u16) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        let mut payload = BytesMut::with_capacity(ECHO_DATA_LEN);
        payload.put_u64(now.as_micros() as u64);
        payload.resize(ECHO_DATA_LEN, 0);

        let mut packet = Self {
            icmp_type: ICMP_ECHO_REQUEST,
            code: 0,
            checksum: 0,
            ident,
            seq,
            payload: payload.freeze(),
        };
        packet.checksum = checksum(&packet.to_bytes());
        packet
    }

    /// Parse an ICMP message from raw bytes (IP header already stripped).
    pub fn parse(data: &[u8]) -> Result<Self, &'static str> {
        if data.len() < ICMP_HEADER_LEN {
            return Err("packet too short");
        }

        Ok(Self {
            icmp_type: data[0],
            code: data[1],
            checksum: u16::from_be_bytes([data[2], data[3]]),
            ident: u16::from_be_bytes([data[4], data[5]]),
            seq: u16::from_be_bytes([data[6], data[7]]),
            payload: Bytes::copy_from_slice(&data[ICMP_HEADER_LEN..]),
        })
    }

    /// Serialize to wire format with the stored checksum.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(ICMP_HEADER_LEN + self.payload.len());

        buf.put_u8(self.icmp_type);
        buf.put_u8(self.code);
        buf.put_u16(self.checksum);
        buf.put_u16(self.ident);
        buf.put_u16(self.seq);
        buf.put_slice(&self.payload);

        buf.freeze()
    }

    /// Whether this message is an echo reply.
    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == ICMP_ECHO_REPLY
    }

    /// Verify the stored checksum.
    ///
    /// A packet carrying its own correct checksum sums to zero under the
    /// same algorithm.
    pub fn verify_checksum(&self) -> bool {
        checksum(&self.to_bytes()) == 0
    }

    /// Send time embedded in the payload, in microseconds since the epoch.
    pub fn sent_at_micros(&self) -> Option<u64> {
        if self.payload.len() < TIMESTAMP_LEN {
            return None;
        }
        let mut stamp = [0u8; TIMESTAMP_LEN];
        stamp.copy_from_slice(&self.payload[..TIMESTAMP_LEN]);
        Some(u64::from_be_bytes(stamp))
    }

    /// Round-trip time computed from the echoed send timestamp.
    ///
    /// None if the payload carries no timestamp or the clock stepped
    /// backwards between send and receive.
    pub fn rtt(&self) -> Option<Duration> {
        let sent = self.sent_at_micros()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64;
        now.checked_sub(sent).map(Duration::from_micros)
    }
}

/// RFC 1071 Internet checksum.
///
/// Sums 16-bit big-endian words with end-around carry folding and returns
/// the one's complement. A trailing odd byte is folded as the high half of
/// its own word. The caller must zero the checksum field before computing.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut chunks = data.chunks_exact(2);
    for word in &mut chunks {
        sum += u16::from_be_bytes([word[0], word[1]]) as u32;
    }
    if let [odd] = chunks.remainder() {
        sum += (*odd as u32) << 8;
    }

    // Fold 32-bit sum to 16 bits
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !sum as u16
}

/// Locate the ICMP message inside a raw IPv4 datagram.
///
/// Raw ICMP sockets deliver the full IP packet; the header length is
/// variable (IHL field). Returns the ICMP portion, or an error when the
/// datagram cannot hold a minimal ICMP header.
pub fn strip_ip_header(datagram: &[u8]) -> Result<&[u8], &'static str> {
    const MIN_IP_HEADER_LEN: usize = 20;

    if datagram.is_empty() {
        return Err("empty datagram");
    }

    let header_len = ((datagram[0] & 0x0F) as usize) << 2;
    if header_len < MIN_IP_HEADER_LEN {
        return Err("invalid IP header length");
    }
    if datagram.len() < header_len + ICMP_HEADER_LEN {
        return Err("packet too short");
    }

    Ok(&datagram[header_len..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_roundtrip() {
        let request = EchoPacket::request(0xBEEF, 3);
        let bytes = request.to_bytes();
        assert_eq!(bytes.len(), ICMP_HEADER_LEN + ECHO_DATA_LEN);

        let parsed = EchoPacket::parse(&bytes).unwrap();
        assert_eq!(parsed.icmp_type, ICMP_ECHO_REQUEST);
        assert_eq!(parsed.code, 0);
        assert_eq!(parsed.ident, 0xBEEF);
        assert_eq!(parsed.seq, 3);
        assert!(parsed.verify_checksum());
        assert_eq!(parsed.sent_at_micros(), request.sent_at_micros());
    }

    #[test]
    fn test_checksum_roundtrip_law() {
        // Any buffer with the computed checksum inserted at the checksum
        // field must then sum to zero.
        let mut buf = vec![
            ICMP_ECHO_REQUEST,
            0,
            0,
            0,
            0x12,
            0x34,
            0x00,
            0x07,
            0xDE,
            0xAD,
            0xBE,
            0xEF,
        ];
        let sum = checksum(&buf);
        buf[2..4].copy_from_slice(&sum.to_be_bytes());
        assert_eq!(checksum(&buf), 0);
    }

    #[test]
    fn test_checksum_odd_length() {
        let mut buf = vec![ICMP_ECHO_REPLY, 0, 0, 0, 0x12, 0x34, 0x00, 0x01, 0xAB];
        let sum = checksum(&buf);
        buf[2..4].copy_from_slice(&sum.to_be_bytes());
        assert_eq!(checksum(&buf), 0);
    }

    #[test]
    fn test_parse_short_packet() {
        assert!(EchoPacket::parse(&[8, 0, 0]).is_err());
    }

    #[test]
    fn test_strip_ip_header() {
        // 20-byte IPv4 header (IHL = 5) followed by a minimal ICMP header.
        let mut datagram = vec![0u8; 28];
        datagram[0] = 0x45;
        datagram[20] = ICMP_ECHO_REPLY;

        let icmp = strip_ip_header(&datagram).unwrap();
        assert_eq!(icmp.len(), 8);
        assert_eq!(icmp[0], ICMP_ECHO_REPLY);
    }

    #[test]
    fn test_strip_ip_header_short() {
        let datagram = vec![0x45u8; 12];
        assert!(strip_ip_header(&datagram).is_err());

        // IHL below the IPv4 minimum
        let bogus = vec![0x41u8; 40];
        assert!(strip_ip_header(&bogus).is_err());
    }

    #[test]
    fn test_rtt_from_timestamp() {
        let request = EchoPacket::request(1, 1);
        let rtt = request.rtt().unwrap();
        assert!(rtt < Duration::from_secs(1));
    }
}
