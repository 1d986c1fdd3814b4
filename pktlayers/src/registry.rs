//! The table that maps a [`LayerType`] to the decoder for it.
//!
//! Built-in protocols are dispatched through the closed [`BuiltinDecoder`]
//! enumeration. Additional protocols are bound to a tag with
//! [`DecoderRegistry::register`] as plain function pointers. A registry is
//! filled before any decoding takes place and is only read afterwards, so a
//! shared `&DecoderRegistry` can be used from any number of threads.
//!
//! The process-wide registry used by [`Packet::decode`](crate::Packet::decode)
//! is [`global()`]. It holds the built-in decoders unless a different registry
//! was put in place with [`install()`] before the first decode.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::error::{DecodeError, RegistryError};
use crate::layer::LayerFields;
use crate::LayerType;

/// What a decoder reports about the header it parsed.
///
/// The engine splits the decoder's input at `header_len` into the layer's
/// `contents` and `payload`, so decoders stay independent of the packet's
/// copy mode.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Number of header bytes at the start of the input.
    pub header_len: usize,
    /// The type to decode the payload as, or [`LayerType::END`].
    pub next: LayerType,
    /// Protocol-specific fields.
    pub fields: LayerFields,
}

impl Decoded {
    /// Bundle a decoder's result.
    pub fn new(header_len: usize, next: LayerType, fields: LayerFields) -> Self {
        Self {
            header_len,
            next,
            fields,
        }
    }
}

/// A layer decoder.
///
/// Decoders must be pure functions of their input: decoding the same bytes
/// twice yields the same result.
pub type DecodeFn = fn(&[u8]) -> Result<Decoded, DecodeError>;

/// The decoders shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinDecoder {
    /// [`ether::decode`](crate::ether::decode).
    Ethernet,
    /// [`vlan::decode`](crate::vlan::decode).
    Dot1Q,
    /// [`mpls::decode`](crate::mpls::decode).
    Mpls,
    /// [`ipv4::decode`](crate::ipv4::decode).
    Ipv4,
    /// [`ipv6::decode`](crate::ipv6::decode).
    Ipv6,
    /// [`icmpv4::decode`](crate::icmpv4::decode).
    Icmpv4,
}

impl BuiltinDecoder {
    /// Every built-in decoder with the tag it is registered under.
    pub const ALL: [(LayerType, BuiltinDecoder); 6] = [
        (LayerType::ETHERNET, BuiltinDecoder::Ethernet),
        (LayerType::DOT1Q, BuiltinDecoder::Dot1Q),
        (LayerType::MPLS, BuiltinDecoder::Mpls),
        (LayerType::IPV4, BuiltinDecoder::Ipv4),
        (LayerType::IPV6, BuiltinDecoder::Ipv6),
        (LayerType::ICMPV4, BuiltinDecoder::Icmpv4),
    ];

    /// Run the decoder on `buf`.
    #[inline]
    pub fn decode(&self, buf: &[u8]) -> Result<Decoded, DecodeError> {
        match self {
            BuiltinDecoder::Ethernet => crate::ether::decode(buf),
            BuiltinDecoder::Dot1Q => crate::vlan::decode(buf),
            BuiltinDecoder::Mpls => crate::mpls::decode(buf),
            BuiltinDecoder::Ipv4 => crate::ipv4::decode(buf),
            BuiltinDecoder::Ipv6 => crate::ipv6::decode(buf),
            BuiltinDecoder::Icmpv4 => crate::icmpv4::decode(buf),
        }
    }
}

/// A registry entry.
#[derive(Clone, Copy)]
pub enum Decoder {
    /// One of the decoders shipped with the crate.
    Builtin(BuiltinDecoder),
    /// A decoder registered by the caller.
    Custom(DecodeFn),
}

impl Decoder {
    /// Run the decoder on `buf`.
    #[inline]
    pub fn decode(&self, buf: &[u8]) -> Result<Decoded, DecodeError> {
        match self {
            Decoder::Builtin(builtin) => builtin.decode(buf),
            Decoder::Custom(f) => f(buf),
        }
    }
}

impl core::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Decoder::Builtin(builtin) => write!(f, "Builtin({:?})", builtin),
            Decoder::Custom(func) => write!(f, "Custom({:p})", *func as *const ()),
        }
    }
}

/// Maps layer types to decoders.
#[derive(Debug, Clone, Default)]
pub struct DecoderRegistry {
    table: HashMap<LayerType, Decoder>,
}

impl DecoderRegistry {
    /// A registry without any decoders.
    ///
    /// Every frame decoded against it becomes a single payload layer.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// A registry holding all the built-in decoders.
    pub fn builtin() -> Self {
        let table = BuiltinDecoder::ALL
            .iter()
            .map(|(ty, builtin)| (*ty, Decoder::Builtin(*builtin)))
            .collect();
        Self { table }
    }

    /// Bind `decode` to `layer_type`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Reserved`] for the framework's own tags and
    /// [`RegistryError::Duplicate`] if the tag already has a decoder.
    pub fn register(
        &mut self,
        layer_type: LayerType,
        decode: DecodeFn,
    ) -> Result<(), RegistryError> {
        if layer_type.is_reserved() {
            return Err(RegistryError::Reserved(layer_type));
        }
        if self.table.contains_key(&layer_type) {
            return Err(RegistryError::Duplicate(layer_type));
        }
        tracing::debug!(%layer_type, "registering layer decoder");
        self.table.insert(layer_type, Decoder::Custom(decode));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, layer_type: LayerType, decode: DecodeFn) -> Result<Self, RegistryError> {
        self.register(layer_type, decode)?;
        Ok(self)
    }

    /// The decoder bound to `layer_type`, if any.
    #[inline]
    pub fn get(&self, layer_type: LayerType) -> Option<&Decoder> {
        self.table.get(&layer_type)
    }

    /// Whether a decoder is bound to `layer_type`.
    #[inline]
    pub fn contains(&self, layer_type: LayerType) -> bool {
        self.table.contains_key(&layer_type)
    }

    /// The registered layer types, in ascending order.
    pub fn layer_types(&self) -> Vec<LayerType> {
        let mut types: Vec<LayerType> = self.table.keys().copied().collect();
        types.sort();
        types
    }
}

static GLOBAL: OnceCell<DecoderRegistry> = OnceCell::new();

/// Install the process-wide registry.
///
/// This must happen before the first call to [`global()`], which is made
/// implicitly by every [`Packet::decode`](crate::Packet::decode).
///
/// # Errors
///
/// [`RegistryError::AlreadyInstalled`] if a registry was installed before or
/// the built-in default is already in use.
pub fn install(registry: DecoderRegistry) -> Result<(), RegistryError> {
    GLOBAL
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)
}

/// The process-wide registry.
pub fn global() -> &'static DecoderRegistry {
    GLOBAL.get_or_init(DecoderRegistry::builtin)
}
