//! Layer and link type tags.

use core::fmt;

enum_sim! {
    /// A tag identifying a protocol format.
    ///
    /// `LayerType` is used both to pick a decoder from the
    /// [`DecoderRegistry`](crate::registry::DecoderRegistry) and to look layers up
    /// in a decoded [`Packet`](crate::Packet). The tag space is open: values not
    /// listed here can be created with `LayerType::from(raw)` or
    /// [`LayerType::user`] and registered
    /// with a custom decoder.
    pub struct LayerType (u16) {
        /// Marks the end of the layer stack. Never appears as the type of a layer.
        END = 0,
        /// Opaque bytes that are not decoded further.
        PAYLOAD = 1,
        /// The terminal layer recording a decode failure.
        ERROR = 2,
        /// Ethernet II frame.
        ETHERNET = 10,
        /// 802.1Q VLAN tag.
        DOT1Q = 11,
        /// MPLS label stack entry.
        MPLS = 12,
        /// IPv4 datagram.
        IPV4 = 20,
        /// IPv6 datagram.
        IPV6 = 21,
        /// ICMP for IPv4.
        ICMPV4 = 30,
    }
}

impl LayerType {
    /// The first raw value that is free for caller-defined layer types.
    pub const USER_BASE: u16 = 1000;

    /// A tag for a caller-defined format, usable in `const` items.
    ///
    /// ```rust
    /// use pktlayers::LayerType;
    ///
    /// const VXLAN: LayerType = LayerType::user(LayerType::USER_BASE + 1);
    /// assert_eq!(VXLAN, LayerType::from(1001));
    /// ```
    pub const fn user(raw: u16) -> Self {
        LayerType(raw)
    }

    /// Whether the framework reserves this tag for itself.
    ///
    /// Reserved tags can not be bound to a decoder in a registry.
    pub const fn is_reserved(&self) -> bool {
        matches!(self.0, 0..=2)
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LayerType::END => f.write_str("End"),
            LayerType::PAYLOAD => f.write_str("Payload"),
            LayerType::ERROR => f.write_str("DecodeFailure"),
            LayerType::ETHERNET => f.write_str("Ethernet"),
            LayerType::DOT1Q => f.write_str("Dot1Q"),
            LayerType::MPLS => f.write_str("MPLS"),
            LayerType::IPV4 => f.write_str("IPv4"),
            LayerType::IPV6 => f.write_str("IPv6"),
            LayerType::ICMPV4 => f.write_str("ICMPv4"),
            LayerType(raw) => write!(f, "LayerType({})", raw),
        }
    }
}

enum_sim! {
    /// The link-layer header type of a capture source, as used in pcap files.
    pub struct LinkType (u32) {
        /// Ethernet II.
        ETHERNET = 1,
        /// Raw IP, version taken from the first nibble.
        RAW = 101,
        /// Raw IPv4.
        IPV4 = 228,
        /// Raw IPv6.
        IPV6 = 229,
    }
}

impl LinkType {
    /// The layer type that decoding of a frame captured on this link starts with.
    ///
    /// Unknown link types map to [`LayerType::PAYLOAD`], so the frame is kept
    /// as a single opaque layer.
    pub fn layer_type(&self) -> LayerType {
        match *self {
            LinkType::ETHERNET => LayerType::ETHERNET,
            LinkType::RAW | LinkType::IPV4 => LayerType::IPV4,
            LinkType::IPV6 => LayerType::IPV6,
            _ => LayerType::PAYLOAD,
        }
    }
}
