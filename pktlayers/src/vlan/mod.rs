//! IEEE 802.1Q VLAN tags.
//!
//! The tag follows an Ethernet header (or another tag, for 802.1ad QinQ)
//! whose ethertype is 0x8100 or 0x88a8:
//!
//! - **PCP**: 3-bit priority code point (0-7)
//! - **DEI**: 1-bit drop eligible indicator
//! - **VID**: 12-bit VLAN identifier (0-4095, 0 and 4095 reserved)
//! - **EtherType**: type of the encapsulated payload

use byteorder::{ByteOrder, NetworkEndian};

use crate::error::{ensure_len, DecodeError};
use crate::ether::EtherType;
use crate::layer::LayerFields;
use crate::registry::Decoded;
use crate::{Buf, LayerType};

/// A constant that defines the fixed byte length of the Vlan protocol header.
pub const VLAN_HEADER_LEN: usize = 4;

const PROTOCOL: &str = "Dot1Q";

/// A read-only view of a VLAN tag at the start of `buf`.
#[derive(Debug, Clone, Copy)]
pub struct VlanPacket<T> {
    buf: T,
}

impl<T: Buf> VlanPacket<T> {
    /// Wrap `buf` without checking its length.
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// Wrap `buf` after checking that it holds a full tag.
    #[inline]
    pub fn parse(buf: T) -> Result<Self, DecodeError> {
        ensure_len(PROTOCOL, buf.chunk(), VLAN_HEADER_LEN)?;
        Ok(Self { buf })
    }

    /// Give back the wrapped buffer.
    #[inline]
    pub fn release(self) -> T {
        self.buf
    }

    /// Priority code point.
    #[inline]
    pub fn priority(&self) -> u8 {
        self.buf.chunk()[0] >> 5
    }

    /// Drop eligible indicator.
    #[inline]
    pub fn dei_flag(&self) -> bool {
        self.buf.chunk()[0] & 0x10 != 0
    }

    /// 12-bit VLAN identifier.
    #[inline]
    pub fn vlan_id(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.chunk()[0..2]) & 0xfff
    }

    /// Ethertype of the encapsulated payload.
    #[inline]
    pub fn ethertype(&self) -> EtherType {
        EtherType::from(NetworkEndian::read_u16(&self.buf.chunk()[2..4]))
    }

    /// The bytes after the tag.
    #[inline]
    pub fn payload(self) -> T {
        let mut buf = self.buf;
        buf.advance(VLAN_HEADER_LEN);
        buf
    }
}

/// The fields of a decoded VLAN tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dot1Q {
    /// Priority code point (0-7).
    pub priority: u8,
    /// Drop eligible indicator.
    pub drop_eligible: bool,
    /// VLAN identifier.
    pub vlan_id: u16,
    /// Ethertype of the encapsulated payload.
    pub ethertype: EtherType,
}

impl<T: Buf> From<&VlanPacket<T>> for Dot1Q {
    fn from(pkt: &VlanPacket<T>) -> Self {
        Dot1Q {
            priority: pkt.priority(),
            drop_eligible: pkt.dei_flag(),
            vlan_id: pkt.vlan_id(),
            ethertype: pkt.ethertype(),
        }
    }
}

/// Decode one VLAN tag.
pub fn decode(buf: &[u8]) -> Result<Decoded, DecodeError> {
    let pkt = VlanPacket::parse(buf)?;
    let fields = Dot1Q::from(&pkt);
    let next = if fields.ethertype.raw() < EtherType::MIN_ETHERTYPE {
        LayerType::PAYLOAD
    } else {
        fields.ethertype.layer_type()
    };
    Ok(Decoded::new(VLAN_HEADER_LEN, next, LayerFields::Dot1Q(fields)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_double_tag() {
        // Outer tag: priority 5, DEI, VID 666, inner 802.1Q.
        // Inner tag: priority 2, VID 200, ARP.
        let data = [0xb2u8, 0x9a, 0x81, 0x00, 0x40, 0xc8, 0x08, 0x06];

        let outer = decode(&data[..]).unwrap();
        assert_eq!(outer.header_len, VLAN_HEADER_LEN);
        assert_eq!(outer.next, LayerType::DOT1Q);
        assert_eq!(
            outer.fields,
            LayerFields::Dot1Q(Dot1Q {
                priority: 5,
                drop_eligible: true,
                vlan_id: 666,
                ethertype: EtherType::VLAN,
            })
        );

        let inner = VlanPacket::parse(VlanPacket::parse(&data[..]).unwrap().payload()).unwrap();
        assert_eq!(inner.priority(), 2);
        assert_eq!(inner.dei_flag(), false);
        assert_eq!(inner.vlan_id(), 200);
        assert_eq!(inner.ethertype(), EtherType::ARP);
        assert_eq!(decode(&data[4..]).unwrap().next, LayerType::PAYLOAD);
    }

    #[test]
    fn truncated_tag() {
        let data = [0xb2u8, 0x9a, 0x81];
        assert_eq!(
            decode(&data[..]).unwrap_err(),
            DecodeError::truncated("Dot1Q", 4, 3)
        );
    }
}
