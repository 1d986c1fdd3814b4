//! IPv4 protocol.

pub use std::net::Ipv4Addr;

use byteorder::{ByteOrder, NetworkEndian};

use crate::error::{ensure_len, DecodeError};
use crate::layer::LayerFields;
use crate::registry::Decoded;
use crate::{Buf, LayerType};

enum_sim! {
    /// An enum-like type for representing different protocols in IPv4/v6.
    pub struct IpProtocol (u8) {
        /// IP packet payload is ICMP protocol.
        ICMP = 1,

        /// IP packet payload is an encapsulated IPv4 packet.
        IPIP = 4,

        /// IP packet payload is TCP protocol.
        TCP = 6,

        /// IP packet payload is UDP protocol.
        UDP =  17,

        /// IP packet payload is an encapsulated IPv6 packet.
        IPV6 = 41,

        /// IP packet payload is Hop-by-hop extention number.
        HOPOPT = 0,

        /// IP packet payload is IPv6 Route.
        IPV6_ROUTE = 43,

        /// IP packet payload is IPv6 Fragmentation.
        IPV6_FRAG = 44,

        /// IP packet payload is GRE.
        GRE = 47,

        /// IP packet payload is ESP.
        ESP = 50,

        /// IP packet payload is AH.
        AH = 51,

        /// IP packet payload is ICMPv6.
        ICMPV6 = 58,

        /// IP packet payload is IPv6 no extention.
        IPV6_NO_NXT = 59,

        /// IP packet payload is IPv6 OPTS.
        IPV6_OPTS = 60,
    }
}

impl IpProtocol {
    /// The layer type that decodes a payload of this protocol.
    ///
    /// Protocols without a decoder in this crate map to
    /// [`LayerType::PAYLOAD`].
    pub fn layer_type(&self) -> LayerType {
        match *self {
            IpProtocol::ICMP => LayerType::ICMPV4,
            IpProtocol::IPIP => LayerType::IPV4,
            IpProtocol::IPV6 => LayerType::IPV6,
            _ => LayerType::PAYLOAD,
        }
    }
}

/// A constant that defines the fixed byte length of the Ipv4 protocol header.
pub const IPV4_HEADER_LEN: usize = 20;

const PROTOCOL: &str = "IPv4";

/// A read-only view of an IPv4 header at the start of `buf`.
///
/// `parse` checks that the whole header, options included, is present and
/// that the length fields are consistent with each other.
#[derive(Debug, Clone, Copy)]
pub struct Ipv4Packet<T> {
    buf: T,
}

impl<T: Buf> Ipv4Packet<T> {
    /// Wrap `buf` without checking it.
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// Wrap `buf` after checking the version, the header length and the total length.
    pub fn parse(buf: T) -> Result<Self, DecodeError> {
        ensure_len(PROTOCOL, buf.chunk(), IPV4_HEADER_LEN)?;
        let container = Self { buf };
        if container.version() != 4 {
            return Err(DecodeError::malformed(
                PROTOCOL,
                format!("version is {}, not 4", container.version()),
            ));
        }
        let header_len = container.header_len() as usize;
        if header_len < IPV4_HEADER_LEN {
            return Err(DecodeError::malformed(
                PROTOCOL,
                format!("header length {} is below the minimum of 20", header_len),
            ));
        }
        ensure_len(PROTOCOL, container.buf.chunk(), header_len)?;
        let packet_len = container.packet_len() as usize;
        // A zero total length is left by TCP segmentation offload.
        if packet_len != 0 && packet_len < header_len {
            return Err(DecodeError::malformed(
                PROTOCOL,
                format!(
                    "total length {} is smaller than header length {}",
                    packet_len, header_len
                ),
            ));
        }
        Ok(container)
    }

    /// Give back the wrapped buffer.
    #[inline]
    pub fn release(self) -> T {
        self.buf
    }

    /// The header bytes, options included.
    #[inline]
    pub fn header_slice(&self) -> &[u8] {
        &self.buf.chunk()[0..self.header_len() as usize]
    }

    /// The option bytes after the fixed 20-byte header.
    #[inline]
    pub fn option_slice(&self) -> &[u8] {
        let header_len = self.header_len() as usize;
        &self.buf.chunk()[IPV4_HEADER_LEN..header_len]
    }

    /// IP version, 4 for a valid header.
    #[inline]
    pub fn version(&self) -> u8 {
        self.buf.chunk()[0] >> 4
    }

    /// Header length in bytes.
    #[inline]
    pub fn header_len(&self) -> u8 {
        (self.buf.chunk()[0] & 0xf) * 4
    }

    /// Differentiated services code point.
    #[inline]
    pub fn dscp(&self) -> u8 {
        self.buf.chunk()[1] >> 2
    }

    /// Explicit congestion notification.
    #[inline]
    pub fn ecn(&self) -> u8 {
        self.buf.chunk()[1] & 0x3
    }

    /// Total length of the datagram.
    #[inline]
    pub fn packet_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[2..4])
    }

    /// Identification.
    #[inline]
    pub fn ident(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[4..6])
    }

    /// Don't fragment flag.
    #[inline]
    pub fn dont_frag(&self) -> bool {
        self.buf.chunk()[6] & 0x40 != 0
    }

    /// More fragments flag.
    #[inline]
    pub fn more_frag(&self) -> bool {
        self.buf.chunk()[6] & 0x20 != 0
    }

    /// Fragment offset in 8-byte units.
    #[inline]
    pub fn frag_offset(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[6..8]) & 0x1fff
    }

    /// Time to live.
    #[inline]
    pub fn ttl(&self) -> u8 {
        self.buf.chunk()[8]
    }

    /// Protocol of the payload.
    #[inline]
    pub fn protocol(&self) -> IpProtocol {
        IpProtocol::from(self.buf.chunk()[9])
    }

    /// Header checksum.
    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[10..12])
    }

    /// Source address.
    #[inline]
    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(NetworkEndian::read_u32(&self.buf.chunk()[12..16]))
    }

    /// Destination address.
    #[inline]
    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(NetworkEndian::read_u32(&self.buf.chunk()[16..20]))
    }

    /// The bytes after the header and its options.
    #[inline]
    pub fn payload(self) -> T {
        let header_len = self.header_len() as usize;
        let mut buf = self.buf;
        buf.advance(header_len);
        buf
    }
}

/// The fields of a decoded IPv4 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4 {
    /// IP version.
    pub version: u8,
    /// Header length in bytes, options included.
    pub header_len: u8,
    /// Differentiated services code point.
    pub dscp: u8,
    /// Explicit congestion notification.
    pub ecn: u8,
    /// Total length as carried in the header.
    pub packet_len: u16,
    /// Identification.
    pub ident: u16,
    /// Don't fragment flag.
    pub dont_frag: bool,
    /// More fragments flag.
    pub more_frag: bool,
    /// Fragment offset in 8-byte units.
    pub frag_offset: u16,
    /// Time to live.
    pub ttl: u8,
    /// Protocol of the payload.
    pub protocol: IpProtocol,
    /// Header checksum as found on the wire, not verified.
    pub checksum: u16,
    /// Source address.
    pub src_addr: Ipv4Addr,
    /// Destination address.
    pub dst_addr: Ipv4Addr,
}

impl Ipv4 {
    /// Whether the datagram is one piece of a fragmented packet.
    pub fn is_fragment(&self) -> bool {
        self.more_frag || self.frag_offset != 0
    }
}

impl<T: Buf> From<&Ipv4Packet<T>> for Ipv4 {
    fn from(pkt: &Ipv4Packet<T>) -> Self {
        Ipv4 {
            version: pkt.version(),
            header_len: pkt.header_len(),
            dscp: pkt.dscp(),
            ecn: pkt.ecn(),
            packet_len: pkt.packet_len(),
            ident: pkt.ident(),
            dont_frag: pkt.dont_frag(),
            more_frag: pkt.more_frag(),
            frag_offset: pkt.frag_offset(),
            ttl: pkt.ttl(),
            protocol: pkt.protocol(),
            checksum: pkt.checksum(),
            src_addr: pkt.src_addr(),
            dst_addr: pkt.dst_addr(),
        }
    }
}

/// Decode an IPv4 header.
///
/// Fragments are not reassembled, so their payload is handed on as opaque
/// bytes. A total length beyond the end of the capture is tolerated, the
/// payload is simply shorter than declared.
pub fn decode(buf: &[u8]) -> Result<Decoded, DecodeError> {
    let pkt = Ipv4Packet::parse(buf)?;
    let fields = Ipv4::from(&pkt);
    let next = if fields.is_fragment() {
        LayerType::PAYLOAD
    } else {
        fields.protocol.layer_type()
    };
    Ok(Decoded::new(
        fields.header_len as usize,
        next,
        LayerFields::Ipv4(fields),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 12.0.0.1 -> 2.2.2.2, ICMP, total length 100.
    static HEADER: [u8; 20] = [
        0x45, 0x00, 0x00, 0x64, 0x00, 0x39, 0x00, 0x00, 0xfe, 0x01, 0xac, 0x5b, 0x0c, 0x00, 0x00,
        0x01, 0x02, 0x02, 0x02, 0x02,
    ];

    #[test]
    fn parse_fields() {
        let pkt = Ipv4Packet::parse(&HEADER[..]).unwrap();
        assert_eq!(pkt.version(), 4);
        assert_eq!(pkt.header_len(), 20);
        assert_eq!(pkt.packet_len(), 100);
        assert_eq!(pkt.ident(), 0x39);
        assert_eq!(pkt.dont_frag(), false);
        assert_eq!(pkt.ttl(), 254);
        assert_eq!(pkt.protocol(), IpProtocol::ICMP);
        assert_eq!(pkt.checksum(), 0xac5b);
        assert_eq!(pkt.src_addr(), Ipv4Addr::new(12, 0, 0, 1));
        assert_eq!(pkt.dst_addr(), Ipv4Addr::new(2, 2, 2, 2));
        assert_eq!(pkt.option_slice().len(), 0);

        let decoded = decode(&HEADER[..]).unwrap();
        assert_eq!(decoded.header_len, 20);
        assert_eq!(decoded.next, LayerType::ICMPV4);
    }

    #[test]
    fn header_with_options() {
        let mut data = HEADER.to_vec();
        data[0] = 0x46;
        data.extend_from_slice(&[0x01, 0x01, 0x01, 0x00]);
        let pkt = Ipv4Packet::parse(&data[..]).unwrap();
        assert_eq!(pkt.header_len(), 24);
        assert_eq!(pkt.option_slice(), &[0x01, 0x01, 0x01, 0x00]);
        assert_eq!(decode(&data[..]).unwrap().header_len, 24);

        // Options announced but not captured.
        assert_eq!(
            decode(&data[..22]).unwrap_err(),
            DecodeError::truncated("IPv4", 24, 22)
        );
    }

    #[test]
    fn malformed_headers() {
        let mut data = HEADER;
        data[0] = 0x65;
        assert_eq!(
            decode(&data[..]).unwrap_err().kind(),
            crate::ErrorKind::Malformed
        );

        let mut data = HEADER;
        data[0] = 0x44;
        assert_eq!(
            decode(&data[..]).unwrap_err().kind(),
            crate::ErrorKind::Malformed
        );

        let mut data = HEADER;
        data[2..4].copy_from_slice(&[0x00, 0x10]);
        assert_eq!(
            decode(&data[..]).unwrap_err().kind(),
            crate::ErrorKind::Malformed
        );
    }

    #[test]
    fn offload_zero_length_is_accepted() {
        let mut data = HEADER;
        data[2..4].copy_from_slice(&[0x00, 0x00]);
        assert!(decode(&data[..]).is_ok());
    }

    #[test]
    fn fragments_are_not_decoded_further() {
        let mut data = HEADER;
        data[6] = 0x20;
        assert_eq!(decode(&data[..]).unwrap().next, LayerType::PAYLOAD);

        let mut data = HEADER;
        data[7] = 0x10;
        assert_eq!(decode(&data[..]).unwrap().next, LayerType::PAYLOAD);
    }

    #[test]
    fn truncated_fixed_header() {
        assert_eq!(
            decode(&HEADER[..19]).unwrap_err(),
            DecodeError::truncated("IPv4", 20, 19)
        );
    }
}
