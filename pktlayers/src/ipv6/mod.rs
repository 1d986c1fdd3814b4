//! IPv6 fixed header.
//!
//! Extension headers are not walked: the payload of the fixed header is
//! handed on according to its next-header field, and anything this crate
//! does not decode becomes an opaque payload.

pub use std::net::Ipv6Addr;

use byteorder::{ByteOrder, NetworkEndian};

use crate::endian::read_uint_from_be_bytes;
use crate::error::{ensure_len, DecodeError};
use crate::ipv4::IpProtocol;
use crate::layer::LayerFields;
use crate::registry::Decoded;
use crate::Buf;

/// A constant that defines the fixed byte length of the Ipv6 protocol header.
pub const IPV6_HEADER_LEN: usize = 40;

const PROTOCOL: &str = "IPv6";

/// A read-only view of an IPv6 fixed header at the start of `buf`.
#[derive(Debug, Clone, Copy)]
pub struct Ipv6Packet<T> {
    buf: T,
}

impl<T: Buf> Ipv6Packet<T> {
    /// Wrap `buf` without checking it.
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// Wrap `buf` after checking its length and version.
    pub fn parse(buf: T) -> Result<Self, DecodeError> {
        ensure_len(PROTOCOL, buf.chunk(), IPV6_HEADER_LEN)?;
        let container = Self { buf };
        if container.version() != 6 {
            return Err(DecodeError::malformed(
                PROTOCOL,
                format!("version is {}, not 6", container.version()),
            ));
        }
        Ok(container)
    }

    /// Give back the wrapped buffer.
    #[inline]
    pub fn release(self) -> T {
        self.buf
    }

    /// IP version, 6 for a valid header.
    #[inline]
    pub fn version(&self) -> u8 {
        self.buf.chunk()[0] >> 4
    }

    /// Traffic class.
    #[inline]
    pub fn traffic_class(&self) -> u8 {
        ((NetworkEndian::read_u16(&self.buf.chunk()[0..2]) >> 4) & 0xff) as u8
    }

    /// 20-bit flow label.
    #[inline]
    pub fn flow_label(&self) -> u32 {
        (read_uint_from_be_bytes(&self.buf.chunk()[1..4]) & 0xfffff) as u32
    }

    /// Length of the payload after the fixed header.
    #[inline]
    pub fn payload_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[4..6])
    }

    /// Protocol of the next header.
    #[inline]
    pub fn next_header(&self) -> IpProtocol {
        IpProtocol::from(self.buf.chunk()[6])
    }

    /// Hop limit.
    #[inline]
    pub fn hop_limit(&self) -> u8 {
        self.buf.chunk()[7]
    }

    /// Source address.
    #[inline]
    pub fn src_addr(&self) -> Ipv6Addr {
        Ipv6Addr::from(NetworkEndian::read_u128(&self.buf.chunk()[8..24]))
    }

    /// Destination address.
    #[inline]
    pub fn dst_addr(&self) -> Ipv6Addr {
        Ipv6Addr::from(NetworkEndian::read_u128(&self.buf.chunk()[24..40]))
    }

    /// The bytes after the fixed header.
    #[inline]
    pub fn payload(self) -> T {
        let mut buf = self.buf;
        buf.advance(IPV6_HEADER_LEN);
        buf
    }
}

/// The fields of a decoded IPv6 fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6 {
    /// IP version.
    pub version: u8,
    /// Traffic class.
    pub traffic_class: u8,
    /// 20-bit flow label.
    pub flow_label: u32,
    /// Payload length as carried in the header.
    pub payload_len: u16,
    /// Protocol of the next header.
    pub next_header: IpProtocol,
    /// Hop limit.
    pub hop_limit: u8,
    /// Source address.
    pub src_addr: Ipv6Addr,
    /// Destination address.
    pub dst_addr: Ipv6Addr,
}

impl<T: Buf> From<&Ipv6Packet<T>> for Ipv6 {
    fn from(pkt: &Ipv6Packet<T>) -> Self {
        Ipv6 {
            version: pkt.version(),
            traffic_class: pkt.traffic_class(),
            flow_label: pkt.flow_label(),
            payload_len: pkt.payload_len(),
            next_header: pkt.next_header(),
            hop_limit: pkt.hop_limit(),
            src_addr: pkt.src_addr(),
            dst_addr: pkt.dst_addr(),
        }
    }
}

/// Decode an IPv6 fixed header.
pub fn decode(buf: &[u8]) -> Result<Decoded, DecodeError> {
    let pkt = Ipv6Packet::parse(buf)?;
    let fields = Ipv6::from(&pkt);
    Ok(Decoded::new(
        IPV6_HEADER_LEN,
        fields.next_header.layer_type(),
        LayerFields::Ipv6(fields),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayerType;

    // fe80::1 -> ff02::1, traffic class 0xb8, flow label 0x12345, ICMPv6.
    fn header() -> [u8; 40] {
        let mut data = [0u8; 40];
        data[0..4].copy_from_slice(&[0x6b, 0x81, 0x23, 0x45]);
        data[4..6].copy_from_slice(&[0x00, 0x08]);
        data[6] = 58;
        data[7] = 255;
        data[8] = 0xfe;
        data[9] = 0x80;
        data[23] = 0x01;
        data[24] = 0xff;
        data[25] = 0x02;
        data[39] = 0x01;
        data
    }

    #[test]
    fn parse_fields() {
        let data = header();
        let pkt = Ipv6Packet::parse(&data[..]).unwrap();
        assert_eq!(pkt.version(), 6);
        assert_eq!(pkt.traffic_class(), 0xb8);
        assert_eq!(pkt.flow_label(), 0x12345);
        assert_eq!(pkt.payload_len(), 8);
        assert_eq!(pkt.next_header(), IpProtocol::ICMPV6);
        assert_eq!(pkt.hop_limit(), 255);
        assert_eq!(pkt.src_addr(), "fe80::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(pkt.dst_addr(), "ff02::1".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn next_header_mapping() {
        let mut data = header();
        assert_eq!(decode(&data[..]).unwrap().next, LayerType::PAYLOAD);
        data[6] = 4;
        assert_eq!(decode(&data[..]).unwrap().next, LayerType::IPV4);
        data[6] = 41;
        assert_eq!(decode(&data[..]).unwrap().next, LayerType::IPV6);
    }

    #[test]
    fn bad_version_and_truncation() {
        let mut data = header();
        assert_eq!(
            decode(&data[..39]).unwrap_err(),
            DecodeError::truncated("IPv6", 40, 39)
        );
        data[0] = 0x4b;
        assert_eq!(
            decode(&data[..]).unwrap_err().kind(),
            crate::ErrorKind::Malformed
        );
    }
}
