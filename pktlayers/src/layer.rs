//! Decoded protocol layers.

use core::any::Any;
use std::sync::Arc;

use bytes::Bytes;

use crate::data::LayerData;
use crate::error::DecodeError;
use crate::ether::Ethernet;
use crate::icmpv4::Icmpv4;
use crate::ipv4::Ipv4;
use crate::ipv6::Ipv6;
use crate::mpls::Mpls;
use crate::vlan::Dot1Q;
use crate::LayerType;

/// The protocol-specific fields of a layer.
#[derive(Debug, Clone)]
pub enum LayerFields {
    /// Ethernet II header.
    Ethernet(Ethernet),
    /// 802.1Q tag.
    Dot1Q(Dot1Q),
    /// MPLS label stack entry.
    Mpls(Mpls),
    /// IPv4 header.
    Ipv4(Ipv4),
    /// IPv6 fixed header.
    Ipv6(Ipv6),
    /// ICMPv4 header.
    Icmpv4(Icmpv4),
    /// Opaque bytes, no fields.
    Payload,
    /// The failure that stopped decoding.
    Error(DecodeError),
    /// Fields produced by a caller-registered decoder.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl PartialEq for LayerFields {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LayerFields::Ethernet(a), LayerFields::Ethernet(b)) => a == b,
            (LayerFields::Dot1Q(a), LayerFields::Dot1Q(b)) => a == b,
            (LayerFields::Mpls(a), LayerFields::Mpls(b)) => a == b,
            (LayerFields::Ipv4(a), LayerFields::Ipv4(b)) => a == b,
            (LayerFields::Ipv6(a), LayerFields::Ipv6(b)) => a == b,
            (LayerFields::Icmpv4(a), LayerFields::Icmpv4(b)) => a == b,
            (LayerFields::Payload, LayerFields::Payload) => true,
            (LayerFields::Error(a), LayerFields::Error(b)) => a == b,
            // Custom fields are opaque, identity is the best we can do.
            (LayerFields::Custom(a), LayerFields::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A fields struct that can be pulled out of a layer by type.
///
/// This backs the typed lookups [`Layer::get`] and
/// [`Packet::layer_of`](crate::Packet::layer_of).
pub trait TypedLayer: Sized {
    /// The layer type whose layers carry these fields.
    const LAYER_TYPE: LayerType;

    /// Borrow the fields if `fields` holds this variant.
    fn from_fields(fields: &LayerFields) -> Option<&Self>;
}

macro_rules! typed_layer {
    ($($t:ident => $lt:ident),+ $(,)?) => {
        $(
            impl TypedLayer for $t {
                const LAYER_TYPE: LayerType = LayerType::$lt;

                #[inline]
                fn from_fields(fields: &LayerFields) -> Option<&Self> {
                    match fields {
                        LayerFields::$t(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )+
    };
}

typed_layer! {
    Ethernet => ETHERNET,
    Dot1Q => DOT1Q,
    Mpls => MPLS,
    Ipv4 => IPV4,
    Ipv6 => IPV6,
    Icmpv4 => ICMPV4,
}

/// One decoded protocol unit.
///
/// `contents` holds the bytes of this layer's header and `payload` the bytes
/// following it. Together they are exactly the input the layer's decoder was
/// given, and they never overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer<'a> {
    layer_type: LayerType,
    offset: usize,
    contents: LayerData<'a>,
    payload: LayerData<'a>,
    fields: LayerFields,
}

impl<'a> Layer<'a> {
    pub(crate) fn new(
        layer_type: LayerType,
        offset: usize,
        contents: LayerData<'a>,
        payload: LayerData<'a>,
        fields: LayerFields,
    ) -> Self {
        Self {
            layer_type,
            offset,
            contents,
            payload,
            fields,
        }
    }

    /// The protocol of this layer.
    #[inline]
    pub fn layer_type(&self) -> LayerType {
        self.layer_type
    }

    /// Byte offset of the layer's header within the original frame.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The header bytes.
    #[inline]
    pub fn contents(&self) -> &LayerData<'a> {
        &self.contents
    }

    /// The bytes following the header.
    #[inline]
    pub fn payload(&self) -> &LayerData<'a> {
        &self.payload
    }

    /// Header plus payload length.
    #[inline]
    pub fn len(&self) -> usize {
        self.contents.len() + self.payload.len()
    }

    /// Whether the layer covers no bytes at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The decoded fields, whatever protocol they belong to.
    #[inline]
    pub fn fields(&self) -> &LayerFields {
        &self.fields
    }

    /// The typed fields of this layer, if it is a `T` layer.
    #[inline]
    pub fn get<T: TypedLayer>(&self) -> Option<&T> {
        T::from_fields(&self.fields)
    }

    /// The fields attached by a caller-registered decoder, if they are a `T`.
    pub fn custom<T: Any>(&self) -> Option<&T> {
        match &self.fields {
            LayerFields::Custom(inner) => inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The decode failure, if this is the error layer.
    #[inline]
    pub fn error(&self) -> Option<&DecodeError> {
        match &self.fields {
            LayerFields::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this is the terminal error layer.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.layer_type == LayerType::ERROR
    }

    /// Detach the layer from the caller's frame.
    pub fn into_owned(self) -> Layer<'static> {
        Layer {
            layer_type: self.layer_type,
            offset: self.offset,
            contents: self.contents.into_owned(),
            payload: self.payload.into_owned(),
            fields: self.fields,
        }
    }

    // Point the layer into `frame`, an owned copy of the frame it came from.
    pub(crate) fn rebase(self, frame: &Bytes) -> Layer<'static> {
        let header_end = self.offset + self.contents.len();
        let end = header_end + self.payload.len();
        Layer {
            layer_type: self.layer_type,
            offset: self.offset,
            contents: LayerData::Owned(frame.slice(self.offset..header_end)),
            payload: LayerData::Owned(frame.slice(header_end..end)),
            fields: self.fields,
        }
    }
}
