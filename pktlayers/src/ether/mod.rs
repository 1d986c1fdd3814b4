//! Ethernet II frames.

use core::fmt;

use byteorder::{ByteOrder, NetworkEndian};

use crate::error::{ensure_len, DecodeError};
use crate::layer::LayerFields;
use crate::registry::Decoded;
use crate::{Buf, LayerType};

enum_sim! {
    /// An enum-like type for representing Ethertype in Ethernet frame.
    pub struct EtherType (u16) {
        /// Frame payload is Arp protocol.
        ARP =  0x0806,
        /// Frame payload is Ipv4 protocol.
        IPV4 = 0x0800,
        /// Frame payload is Ipv6 protocol.
        IPV6 = 0x86DD,
        /// Frame payload is a 802.1Q VLAN tag.
        VLAN = 0x8100,
        /// Frame payload is a 802.1ad service tag.
        QINQ = 0x88A8,
        /// Frame payload is an MPLS unicast label stack.
        MPLS_UNICAST = 0x8847,
        /// Frame payload is an MPLS multicast label stack.
        MPLS_MULTICAST = 0x8848,
    }
}

impl EtherType {
    /// Values below this are an 802.3 length rather than an ethertype.
    pub const MIN_ETHERTYPE: u16 = 0x0600;

    /// The layer type that decodes a payload carrying this ethertype.
    ///
    /// Protocols without a decoder in this crate map to
    /// [`LayerType::PAYLOAD`].
    pub fn layer_type(&self) -> LayerType {
        match *self {
            EtherType::IPV4 => LayerType::IPV4,
            EtherType::IPV6 => LayerType::IPV6,
            EtherType::VLAN | EtherType::QINQ => LayerType::DOT1Q,
            EtherType::MPLS_UNICAST | EtherType::MPLS_MULTICAST => LayerType::MPLS,
            _ => LayerType::PAYLOAD,
        }
    }
}

/// A six-octet Ethernet II address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct EtherAddr(pub [u8; 6]);

impl EtherAddr {
    /// The broadcast address.
    pub const BROADCAST: EtherAddr = EtherAddr([0xff; 6]);

    /// Construct an Ethernet address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not six octets long.
    pub fn from_bytes(data: &[u8]) -> EtherAddr {
        let mut bytes = [0; 6];
        bytes.copy_from_slice(data);
        EtherAddr(bytes)
    }

    /// Return an Ethernet address as a sequence of octets, in big-endian.
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the address is an unicast address.
    pub fn is_unicast(&self) -> bool {
        !(self.is_broadcast() || self.is_multicast())
    }

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Query whether the 'multicast' bit in the OUI is set.
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Query whether the 'locally administered' bit in the OUI is set.
    pub const fn is_local(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    /// Parse a string with the form 'Aa:0b:Cc:11:02:33' into `EtherAddr`.
    pub fn parse_from<T: AsRef<str>>(s: T) -> Option<Self> {
        let mut result = [0; 6];
        let mut parts = s.as_ref().split(':');
        for byte in result.iter_mut() {
            let part = parts.next()?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            *byte = u8::from_str_radix(part, 16).ok()?;
        }
        if parts.next().is_some() {
            return None;
        }
        Some(Self(result))
    }
}

impl fmt::Display for EtherAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
        )
    }
}

/// A constant that defines the fixed byte length of the Ether protocol header.
pub const ETHER_HEADER_LEN: usize = 14;

const PROTOCOL: &str = "Ethernet";

/// A read-only view of an Ethernet II header at the start of `buf`.
#[derive(Debug, Clone, Copy)]
pub struct EtherPacket<T> {
    buf: T,
}

impl<T: Buf> EtherPacket<T> {
    /// Wrap `buf` without checking its length.
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// Wrap `buf` after checking that it holds a full header.
    #[inline]
    pub fn parse(buf: T) -> Result<Self, DecodeError> {
        ensure_len(PROTOCOL, buf.chunk(), ETHER_HEADER_LEN)?;
        Ok(Self { buf })
    }

    /// The wrapped buffer.
    #[inline]
    pub fn buf(&self) -> &T {
        &self.buf
    }

    /// Give back the wrapped buffer.
    #[inline]
    pub fn release(self) -> T {
        self.buf
    }

    /// The 14 header bytes.
    #[inline]
    pub fn header_slice(&self) -> &[u8] {
        &self.buf.chunk()[0..ETHER_HEADER_LEN]
    }

    /// Destination address.
    #[inline]
    pub fn dst_addr(&self) -> EtherAddr {
        EtherAddr::from_bytes(&self.buf.chunk()[0..6])
    }

    /// Source address.
    #[inline]
    pub fn src_addr(&self) -> EtherAddr {
        EtherAddr::from_bytes(&self.buf.chunk()[6..12])
    }

    /// The ethertype field.
    #[inline]
    pub fn ethertype(&self) -> EtherType {
        EtherType::from(NetworkEndian::read_u16(&self.buf.chunk()[12..14]))
    }

    /// The bytes after the header.
    #[inline]
    pub fn payload(self) -> T {
        let mut buf = self.buf;
        buf.advance(ETHER_HEADER_LEN);
        buf
    }
}

/// The fields of a decoded Ethernet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ethernet {
    /// Destination address.
    pub dst_addr: EtherAddr,
    /// Source address.
    pub src_addr: EtherAddr,
    /// The ethertype, or the 802.3 frame length when below
    /// [`EtherType::MIN_ETHERTYPE`].
    pub ethertype: EtherType,
}

impl Ethernet {
    /// The 802.3 length field, if the frame is not Ethernet II.
    pub fn length(&self) -> Option<u16> {
        let raw = self.ethertype.raw();
        (raw < EtherType::MIN_ETHERTYPE).then_some(raw)
    }
}

impl<T: Buf> From<&EtherPacket<T>> for Ethernet {
    fn from(pkt: &EtherPacket<T>) -> Self {
        Ethernet {
            dst_addr: pkt.dst_addr(),
            src_addr: pkt.src_addr(),
            ethertype: pkt.ethertype(),
        }
    }
}

/// Decode an Ethernet II header.
///
/// 802.3 frames, whose type field is a length, hand their payload on as
/// opaque bytes.
pub fn decode(buf: &[u8]) -> Result<Decoded, DecodeError> {
    let pkt = EtherPacket::parse(buf)?;
    let fields = Ethernet::from(&pkt);
    let next = match fields.length() {
        Some(_) => LayerType::PAYLOAD,
        None => fields.ethertype.layer_type(),
    };
    Ok(Decoded::new(
        ETHER_HEADER_LEN,
        next,
        LayerFields::Ethernet(fields),
    ))
}
