//! MPLS (Multiprotocol Label Switching) label stack entries, RFC 3032.
//!
//! Each label stack entry is a single 32-bit big-endian word:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                Label                  | TC  |S|      TTL      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Entries are stacked until one carries the bottom-of-stack bit `S`. The
//! header has no next-protocol field, so what follows the bottom entry is
//! guessed from the first nibble of the payload (see [`decode`]).
//!
//! # Example
//!
//! ```rust
//! use pktlayers::mpls::MplsPacket;
//!
//! let data = [0x00u8, 0x01, 0x31, 0xfe, 0x45];
//! let mpls = MplsPacket::parse(&data[..]).unwrap();
//! assert_eq!(mpls.label(), 19);
//! assert!(mpls.bottom_of_stack());
//! assert_eq!(mpls.ttl(), 254);
//! ```

use byteorder::{ByteOrder, NetworkEndian};

use crate::error::{ensure_len, DecodeError};
use crate::layer::LayerFields;
use crate::registry::Decoded;
use crate::{Buf, LayerType};

/// A constant that defines the fixed byte length of the Mpls protocol header.
pub const MPLS_HEADER_LEN: usize = 4;

/// The largest value of the 20-bit label field.
pub const MPLS_MAX_LABEL: u32 = 0xfffff;

/// Reserved label values, RFC 3032 and later.
pub mod special_label {
    /// IPv4 explicit null.
    pub const IPV4_EXPLICIT_NULL: u32 = 0;
    /// Router alert.
    pub const ROUTER_ALERT: u32 = 1;
    /// IPv6 explicit null.
    pub const IPV6_EXPLICIT_NULL: u32 = 2;
    /// Implicit null, only used in signaling.
    pub const IMPLICIT_NULL: u32 = 3;
    /// Entropy label indicator, RFC 6790.
    pub const ENTROPY_LABEL_INDICATOR: u32 = 7;
    /// Generic associated channel label, RFC 5586.
    pub const GAL: u32 = 13;
    /// OAM alert, RFC 3429.
    pub const OAM_ALERT: u32 = 14;
    /// Extension label, RFC 7274.
    pub const EXTENSION: u32 = 15;
}

const PROTOCOL: &str = "MPLS";

/// A read-only view of an MPLS label stack entry at the start of `buf`.
#[derive(Debug, Clone, Copy)]
pub struct MplsPacket<T> {
    buf: T,
}

impl<T: Buf> MplsPacket<T> {
    /// Wrap `buf` without checking its length.
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// Wrap `buf` after checking that it holds a full entry.
    #[inline]
    pub fn parse(buf: T) -> Result<Self, DecodeError> {
        ensure_len(PROTOCOL, buf.chunk(), MPLS_HEADER_LEN)?;
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

    /// The 4 bytes of the entry.
    #[inline]
    pub fn header_slice(&self) -> &[u8] {
        &self.buf.chunk()[0..MPLS_HEADER_LEN]
    }

    #[inline]
    fn word(&self) -> u32 {
        NetworkEndian::read_u32(&self.buf.chunk()[0..4])
    }

    /// The 20-bit label.
    #[inline]
    pub fn label(&self) -> u32 {
        self.word() >> 12
    }

    /// The 3-bit traffic class.
    #[inline]
    pub fn traffic_class(&self) -> u8 {
        ((self.word() >> 9) & 0x7) as u8
    }

    /// The `S` bit.
    #[inline]
    pub fn bottom_of_stack(&self) -> bool {
        (self.word() >> 8) & 0x1 != 0
    }

    /// Time to live.
    #[inline]
    pub fn ttl(&self) -> u8 {
        (self.word() & 0xff) as u8
    }

    /// The bytes after the entry.
    #[inline]
    pub fn payload(self) -> T {
        let mut buf = self.buf;
        buf.advance(MPLS_HEADER_LEN);
        buf
    }
}

/// The fields of a decoded MPLS label stack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mpls {
    /// 20-bit label.
    pub label: u32,
    /// 3-bit traffic class, formerly the experimental bits.
    pub traffic_class: u8,
    /// Whether this is the last entry of the label stack.
    pub stack_bottom: bool,
    /// Time to live.
    pub ttl: u8,
}

impl Mpls {
    /// Whether the label is one of the values reserved by RFC 3032 (0 to 15).
    pub fn is_reserved_label(&self) -> bool {
        self.label <= special_label::EXTENSION
    }
}

impl<T: Buf> From<&MplsPacket<T>> for Mpls {
    fn from(pkt: &MplsPacket<T>) -> Self {
        Mpls {
            label: pkt.label(),
            traffic_class: pkt.traffic_class(),
            stack_bottom: pkt.bottom_of_stack(),
            ttl: pkt.ttl(),
        }
    }
}

/// Guess the protocol carried below the bottom of a label stack.
///
/// MPLS does not declare its payload type. Looking at the IP version nibble
/// is the usual convention, but it is a heuristic: a pseudowire payload that
/// happens to start with `0x4` or `0x6` will be misread as IP.
pub fn guess_payload_type(payload: &[u8]) -> LayerType {
    match payload.first().map(|b| b >> 4) {
        Some(4) => LayerType::IPV4,
        Some(6) => LayerType::IPV6,
        _ => LayerType::PAYLOAD,
    }
}

/// Decode one label stack entry.
///
/// The next layer is another entry unless the bottom-of-stack bit is set, in
/// which case it is guessed with [`guess_payload_type`].
pub fn decode(buf: &[u8]) -> Result<Decoded, DecodeError> {
    let pkt = MplsPacket::parse(buf)?;
    let fields = Mpls::from(&pkt);
    let next = if fields.stack_bottom {
        guess_payload_type(pkt.payload())
    } else {
        LayerType::MPLS
    };
    Ok(Decoded::new(MPLS_HEADER_LEN, next, LayerFields::Mpls(fields)))
}
