#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! Decode captured network frames into stacks of protocol layers.
//!
//! A [`Packet`] is created from a raw frame and the [`LayerType`] of its
//! outermost header. Decoders looked up in a [`DecoderRegistry`] peel one
//! header at a time, each naming the type of the bytes that follow, until
//! the frame is used up, a decoder announces the end, or a decoder fails.
//! Protocols without a decoder end up as an opaque payload layer, and a
//! failure is kept as a terminal error layer next to everything decoded
//! before it.
//!
//! ```rust
//! use pktlayers::{DecodeOptions, LayerType, LinkType, Packet};
//! use pktlayers::ipv4::Ipv4;
//!
//! let frame = [
//!     0x45, 0x00, 0x00, 0x1c, 0x00, 0x01, 0x00, 0x00, 0x40, 0x01, 0x00, 0x00, 0x0a, 0x00,
//!     0x00, 0x01, 0x0a, 0x00, 0x00, 0x02, // IPv4
//!     0x00, 0x00, 0x00, 0x00, 0x12, 0x34, 0x00, 0x07, // ICMPv4 echo reply
//! ];
//! let first = LinkType::RAW.layer_type();
//! let mut pkt = Packet::decode(&frame[..], first, DecodeOptions::NO_COPY);
//! assert_eq!(pkt.layer_types(), [LayerType::IPV4, LayerType::ICMPV4]);
//! assert_eq!(pkt.layer_of::<Ipv4>().map(|ip| ip.ttl), Some(64));
//! ```

#[macro_use]
mod macros;

pub use bytes::Buf;

mod cursors;
pub use cursors::Cursor;

mod endian;

pub mod data;
pub mod error;
pub mod layer;
pub mod layer_type;
pub mod registry;

mod options;
mod packet;

pub mod ether;
pub mod icmpv4;
pub mod ipv4;
pub mod ipv6;
pub mod mpls;
pub mod vlan;

pub use data::LayerData;
pub use error::{DecodeError, ErrorKind, RegistryError};
pub use layer::{Layer, LayerFields, TypedLayer};
pub use layer_type::{LayerType, LinkType};
pub use options::DecodeOptions;
pub use packet::Packet;
pub use registry::{DecodeFn, Decoded, DecoderRegistry};
