//! The decode engine and the packet query surface.

use core::mem;

use bytes::{Buf, Bytes};
use tracing::{debug, trace};

use crate::data::{LayerData, PacketBuf};
use crate::error::DecodeError;
use crate::layer::{Layer, LayerFields, TypedLayer};
use crate::options::DecodeOptions;
use crate::registry::{self, DecoderRegistry};
use crate::{Cursor, LayerType};

// Protocol name carried by errors the engine raises on its own.
const ENGINE: &str = "packet";

#[derive(Debug, Clone)]
enum DecodeState<'a> {
    // `remaining` starts at byte `offset` of the frame and is to be decoded
    // as `next`.
    Decoding {
        registry: &'a DecoderRegistry,
        next: LayerType,
        remaining: PacketBuf<'a>,
        offset: usize,
    },
    Done,
    Errored,
}

/// A captured frame decoded into a stack of protocol layers.
///
/// Layers are kept in decode order. Each layer's `contents` immediately
/// follows the previous layer's `contents` in the frame, and the `payload`
/// of the last layer runs to the end of the frame. When a decoder fails, the
/// stack ends with an error layer ([`LayerType::ERROR`]) whose contents are
/// the bytes that could not be parsed. The layers before it stay available.
///
/// In lazy mode the queries decode only as far as they need to and remember
/// what they decoded, which is why they take `&mut self`.
///
/// # Examples
///
/// ```rust
/// use pktlayers::{DecodeOptions, LayerType, Packet};
/// use pktlayers::mpls::Mpls;
///
/// let frame = [
///     0x00, 0x01, 0x31, 0xfe, // MPLS, label 19, bottom of stack
///     0xde, 0xad, 0xbe, 0xef, // not IP
/// ];
/// let mut pkt = Packet::decode(&frame[..], LayerType::MPLS, DecodeOptions::LAZY);
/// assert_eq!(pkt.layer_of::<Mpls>().map(|m| m.label), Some(19));
/// assert_eq!(pkt.layer_types(), [LayerType::MPLS, LayerType::PAYLOAD]);
/// assert!(pkt.error_layer().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Packet<'a> {
    data: LayerData<'a>,
    options: DecodeOptions,
    layers: Vec<Layer<'a>>,
    state: DecodeState<'a>,
}

impl<'a> Packet<'a> {
    /// Decode `buf` as `first` with the process-wide registry.
    ///
    /// The packet carries the lifetime of `buf` in every mode. Use
    /// [`decode_owned`](Packet::decode_owned) or [`into_owned`](Self::into_owned)
    /// for a packet that outlives the buffer.
    pub fn decode(buf: &'a [u8], first: LayerType, options: DecodeOptions) -> Self {
        Self::decode_with(registry::global(), buf, first, options)
    }

    /// Decode `buf` as `first` with the decoders of `registry`.
    ///
    /// Unless the options ask for no-copy storage, `buf` is copied once and
    /// the layers refer to that copy only. The packet still borrows `buf`'s
    /// lifetime either way.
    pub fn decode_with(
        registry: &'a DecoderRegistry,
        buf: &'a [u8],
        first: LayerType,
        options: DecodeOptions,
    ) -> Self {
        let (data, remaining) = if options.is_no_copy() {
            (
                LayerData::Borrowed(buf),
                PacketBuf::Borrowed(Cursor::new(buf)),
            )
        } else {
            let bytes = Bytes::copy_from_slice(buf);
            (LayerData::Owned(bytes.clone()), PacketBuf::Owned(bytes))
        };
        Self::start(registry, data, remaining, first, options)
    }

    fn start(
        registry: &'a DecoderRegistry,
        data: LayerData<'a>,
        remaining: PacketBuf<'a>,
        first: LayerType,
        options: DecodeOptions,
    ) -> Self {
        let mut pkt = Packet {
            data,
            options,
            layers: Vec::new(),
            state: DecodeState::Decoding {
                registry,
                next: first,
                remaining,
                offset: 0,
            },
        };
        if !options.is_lazy() {
            pkt.decode_all();
        }
        pkt
    }

    /// Decode one more layer. Returns `false` once the stack is finished.
    fn step(&mut self) -> bool {
        let (registry, layer_type, mut remaining, offset) =
            match mem::replace(&mut self.state, DecodeState::Done) {
                DecodeState::Decoding {
                    registry,
                    next,
                    remaining,
                    offset,
                } => (registry, next, remaining, offset),
                finished => {
                    self.state = finished;
                    return false;
                }
            };

        let decoder = match registry.get(layer_type) {
            Some(decoder) => decoder,
            None => {
                if layer_type != LayerType::PAYLOAD {
                    debug!(
                        %layer_type,
                        offset,
                        "no decoder registered, keeping the rest as payload"
                    );
                }
                self.layers.push(Layer::new(
                    LayerType::PAYLOAD,
                    offset,
                    remaining.rest(),
                    LayerData::empty(),
                    LayerFields::Payload,
                ));
                return true;
            }
        };

        // The last slot is kept for the error layer.
        if self.layers.len() + 1 >= self.options.max_layers() {
            let err = DecodeError::malformed(
                ENGINE,
                format!("too many layers (limit {})", self.options.max_layers()),
            );
            self.push_error(offset, &remaining, err);
            return true;
        }

        let available = remaining.remaining();
        match decoder.decode(remaining.chunk()) {
            Ok(decoded) if decoded.header_len > available => {
                let err = DecodeError::malformed(
                    ENGINE,
                    format!(
                        "{} decoder claimed {} header bytes with {} available",
                        layer_type, decoded.header_len, available
                    ),
                );
                self.push_error(offset, &remaining, err);
            }
            Ok(decoded) => {
                let contents = remaining.split_header(decoded.header_len);
                let payload = remaining.rest();
                trace!(
                    %layer_type,
                    offset,
                    header_len = decoded.header_len,
                    next = %decoded.next,
                    "decoded layer"
                );
                self.layers.push(Layer::new(
                    layer_type,
                    offset,
                    contents,
                    payload,
                    decoded.fields,
                ));
                if decoded.next != LayerType::END && remaining.has_remaining() {
                    self.state = DecodeState::Decoding {
                        registry,
                        next: decoded.next,
                        remaining,
                        offset: offset + decoded.header_len,
                    };
                }
            }
            Err(err) => self.push_error(offset, &remaining, err),
        }
        true
    }

    fn push_error(&mut self, offset: usize, remaining: &PacketBuf<'a>, err: DecodeError) {
        debug!(offset, error = %err, "decoding stopped");
        self.layers.push(Layer::new(
            LayerType::ERROR,
            offset,
            remaining.rest(),
            LayerData::empty(),
            LayerFields::Error(err),
        ));
        self.state = DecodeState::Errored;
    }

    fn decode_all(&mut self) {
        while self.step() {}
    }

    /// Every layer of the frame, decoding the rest of it if needed.
    pub fn layers(&mut self) -> &[Layer<'a>] {
        self.decode_all();
        &self.layers
    }

    /// The first layer of type `layer_type`.
    ///
    /// In lazy mode decoding stops as soon as such a layer shows up.
    pub fn layer(&mut self, layer_type: LayerType) -> Option<&Layer<'a>> {
        let mut searched = 0;
        loop {
            if let Some(pos) = self.layers[searched..]
                .iter()
                .position(|layer| layer.layer_type() == layer_type)
            {
                return Some(&self.layers[searched + pos]);
            }
            searched = self.layers.len();
            if !self.step() {
                return None;
            }
        }
    }

    /// The fields of the first `T` layer.
    pub fn layer_of<T: TypedLayer>(&mut self) -> Option<&T> {
        self.layer(T::LAYER_TYPE).and_then(|layer| layer.get::<T>())
    }

    /// The layer at position `index` of the stack.
    pub fn layer_at(&mut self, index: usize) -> Option<&Layer<'a>> {
        while self.layers.len() <= index {
            if !self.step() {
                return None;
            }
        }
        self.layers.get(index)
    }

    /// The error layer that ended decoding, if a decoder failed.
    pub fn error_layer(&mut self) -> Option<&Layer<'a>> {
        self.decode_all();
        match self.state {
            DecodeState::Errored => self.layers.last(),
            _ => None,
        }
    }

    /// The layers decoded so far, without decoding any further.
    #[inline]
    pub fn decoded_layers(&self) -> &[Layer<'a>] {
        &self.layers
    }

    /// Whether the whole frame has been decoded.
    #[inline]
    pub fn is_complete(&self) -> bool {
        !matches!(self.state, DecodeState::Decoding { .. })
    }

    /// The type of every layer, in order.
    pub fn layer_types(&mut self) -> Vec<LayerType> {
        self.layers().iter().map(|layer| layer.layer_type()).collect()
    }

    /// The whole frame.
    #[inline]
    pub fn data(&self) -> &LayerData<'a> {
        &self.data
    }

    /// The options the packet was decoded with.
    #[inline]
    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Finish decoding and detach the packet from the caller's buffer.
    ///
    /// A borrowed frame is copied once and every layer is re-pointed into
    /// that copy. An owned packet only changes its lifetime.
    pub fn into_owned(mut self) -> Packet<'static> {
        self.decode_all();
        let frame = self.data.to_bytes();
        let layers = self
            .layers
            .into_iter()
            .map(|layer| layer.rebase(&frame))
            .collect();
        let state = match self.state {
            DecodeState::Errored => DecodeState::Errored,
            _ => DecodeState::Done,
        };
        Packet {
            data: LayerData::Owned(frame),
            options: self.options.no_copy(false),
            layers,
            state,
        }
    }
}

impl Packet<'static> {
    /// Copy `buf` once and decode the copy, detached from `buf`.
    ///
    /// The no-copy option is ignored.
    pub fn decode_owned(buf: &[u8], first: LayerType, options: DecodeOptions) -> Self {
        Self::from_bytes(Bytes::copy_from_slice(buf), first, options)
    }

    /// [`decode_owned`](Self::decode_owned) with an explicit registry.
    pub fn decode_owned_with(
        registry: &'static DecoderRegistry,
        buf: &[u8],
        first: LayerType,
        options: DecodeOptions,
    ) -> Self {
        Self::from_bytes_with(registry, Bytes::copy_from_slice(buf), first, options)
    }

    /// Decode a frame that is already held in a `Bytes` handle.
    ///
    /// The layers share `frame`'s storage, no copy is made regardless of
    /// the no-copy option.
    pub fn from_bytes(frame: Bytes, first: LayerType, options: DecodeOptions) -> Self {
        Self::from_bytes_with(registry::global(), frame, first, options)
    }

    /// [`from_bytes`](Self::from_bytes) with an explicit registry.
    pub fn from_bytes_with(
        registry: &'static DecoderRegistry,
        frame: Bytes,
        first: LayerType,
        options: DecodeOptions,
    ) -> Self {
        let options = options.no_copy(false);
        Self::start(
            registry,
            LayerData::Owned(frame.clone()),
            PacketBuf::Owned(frame),
            first,
            options,
        )
    }
}
