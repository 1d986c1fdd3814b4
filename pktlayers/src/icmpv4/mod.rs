//! ICMP for IPv4.

use byteorder::{ByteOrder, NetworkEndian};

use crate::error::{ensure_len, DecodeError};
use crate::layer::LayerFields;
use crate::registry::Decoded;
use crate::{Buf, LayerType};

enum_sim! {
    /// An enum-like type for the ICMPv4 message type.
    pub struct IcmpType (u8) {
        /// Echo reply.
        ECHO_REPLY = 0,
        /// Destination unreachable.
        DST_UNREACHABLE = 3,
        /// Redirect.
        REDIRECT_MESSAGE = 5,
        /// Echo request.
        ECHO_REQUEST = 8,
        /// Router advertisement.
        ROUTER_ADVERTISEMENT = 9,
        /// Router solicitation.
        ROUTER_SOLICITATION = 10,
        /// Time exceeded.
        TIME_EXCEEDED = 11,
        /// Parameter problem.
        PARAMETER_PROBLEM = 12,
        /// Timestamp request.
        TIMESTAMP = 13,
        /// Timestamp reply.
        TIMESTAMP_REPLY = 14
    }
}

/// A constant that defines the fixed byte length of the Icmpv4 protocol header.
pub const ICMPV4_HEADER_LEN: usize = 8;

const PROTOCOL: &str = "ICMPv4";

/// A read-only view of an ICMPv4 header at the start of `buf`.
#[derive(Clone, Copy, Debug)]
pub struct Icmpv4Packet<T> {
    buf: T,
}

impl<T: Buf> Icmpv4Packet<T> {
    /// Wrap `buf` without checking its length.
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// Wrap `buf` after checking that it holds the 8-byte header.
    #[inline]
    pub fn parse(buf: T) -> Result<Self, DecodeError> {
        ensure_len(PROTOCOL, buf.chunk(), ICMPV4_HEADER_LEN)?;
        Ok(Self { buf })
    }

    /// Give back the wrapped buffer.
    #[inline]
    pub fn release(self) -> T {
        self.buf
    }

    /// Message type.
    #[inline]
    pub fn icmp_type(&self) -> IcmpType {
        IcmpType::from(self.buf.chunk()[0])
    }

    /// Message code.
    #[inline]
    pub fn code(&self) -> u8 {
        self.buf.chunk()[1]
    }

    /// Checksum over the ICMP message.
    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[2..4])
    }

    /// The type-specific second word.
    #[inline]
    pub fn rest_of_header(&self) -> [u8; 4] {
        let mut data: [u8; 4] = [0; 4];
        data.copy_from_slice(&self.buf.chunk()[4..8]);
        data
    }

    /// Echo identifier.
    #[inline]
    pub fn ident(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[4..6])
    }

    /// Echo sequence number.
    #[inline]
    pub fn seq_num(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[6..8])
    }

    /// The message body after the header.
    #[inline]
    pub fn payload(self) -> T {
        let mut buf = self.buf;
        buf.advance(ICMPV4_HEADER_LEN);
        buf
    }
}

/// The fields of a decoded ICMPv4 header.
///
/// `ident` and `seq_num` are only meaningful for echo and timestamp
/// messages. For other types they are the two halves of the
/// type-specific word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Icmpv4 {
    /// Message type.
    pub icmp_type: IcmpType,
    /// Message code, read with `icmp_type`.
    pub code: u8,
    /// Checksum as found on the wire, not verified.
    pub checksum: u16,
    /// First half of the type-specific word.
    pub ident: u16,
    /// Second half of the type-specific word.
    pub seq_num: u16,
}

impl<T: Buf> From<&Icmpv4Packet<T>> for Icmpv4 {
    fn from(pkt: &Icmpv4Packet<T>) -> Self {
        Icmpv4 {
            icmp_type: pkt.icmp_type(),
            code: pkt.code(),
            checksum: pkt.checksum(),
            ident: pkt.ident(),
            seq_num: pkt.seq_num(),
        }
    }
}

/// Decode the 8-byte ICMPv4 header. The message body is opaque payload.
pub fn decode(buf: &[u8]) -> Result<Decoded, DecodeError> {
    let pkt = Icmpv4Packet::parse(buf)?;
    Ok(Decoded::new(
        ICMPV4_HEADER_LEN,
        LayerType::PAYLOAD,
        LayerFields::Icmpv4(Icmpv4::from(&pkt)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_request_parse() {
        let data = [
            0x08u8, 0x00, 0xf7, 0xfc, 0x12, 0x34, 0x00, 0x01, // ICMP header
            0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x21, 0x21, 0x21, // Payload: "Hello!!!"
        ];

        let pkt = Icmpv4Packet::parse(&data[..]).unwrap();
        assert_eq!(pkt.icmp_type(), IcmpType::ECHO_REQUEST);
        assert_eq!(pkt.code(), 0);
        assert_eq!(pkt.checksum(), 0xf7fc);
        assert_eq!(pkt.ident(), 0x1234);
        assert_eq!(pkt.seq_num(), 0x0001);
        assert_eq!(pkt.rest_of_header(), [0x12, 0x34, 0x00, 0x01]);
        assert_eq!(pkt.payload(), b"Hello!!!");

        let decoded = decode(&data[..]).unwrap();
        assert_eq!(decoded.header_len, ICMPV4_HEADER_LEN);
        assert_eq!(decoded.next, LayerType::PAYLOAD);
    }

    #[test]
    fn time_exceeded() {
        let data = [0x0bu8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let pkt = Icmpv4Packet::parse(&data[..]).unwrap();
        assert_eq!(pkt.icmp_type(), IcmpType::TIME_EXCEEDED);
        assert_eq!(pkt.code(), 0);
    }

    #[test]
    fn truncated_header() {
        let data = [0x08u8, 0x00, 0xf7, 0xfc, 0x12, 0x34, 0x00];
        assert_eq!(
            decode(&data[..]).unwrap_err(),
            DecodeError::truncated("ICMPv4", 8, 7)
        );
    }
}
