//! Byte storage for decoded layers.
//!
//! A layer either borrows its bytes from the caller's frame (no-copy mode)
//! or holds a handle to an owned, reference-counted copy of the frame (copy
//! mode). Both are exposed through [`LayerData`], which dereferences to
//! `[u8]` so callers rarely need to care which one they got.

use core::fmt;
use core::ops::Deref;

use bytes::{Buf, Bytes};

use crate::Cursor;

/// The header or payload bytes of a layer.
#[derive(Clone, Eq)]
pub enum LayerData<'a> {
    /// A view into the caller-supplied frame.
    Borrowed(&'a [u8]),
    /// Storage owned by the packet, independent of the caller's buffer.
    Owned(Bytes),
}

impl<'a> LayerData<'a> {
    /// An empty byte range.
    pub const fn empty() -> Self {
        LayerData::Borrowed(&[])
    }

    /// Whether the bytes borrow from the caller's frame.
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, LayerData::Borrowed(_))
    }

    /// The bytes as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            LayerData::Borrowed(s) => s,
            LayerData::Owned(b) => b,
        }
    }

    /// Detach the bytes from the caller's frame, copying if necessary.
    pub fn into_owned(self) -> LayerData<'static> {
        match self {
            LayerData::Borrowed(s) => LayerData::Owned(Bytes::copy_from_slice(s)),
            LayerData::Owned(b) => LayerData::Owned(b),
        }
    }

    /// The bytes as a `Bytes` handle, copying if they were borrowed.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            LayerData::Borrowed(s) => Bytes::copy_from_slice(s),
            LayerData::Owned(b) => b.clone(),
        }
    }
}

impl Deref for LayerData<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for LayerData<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for LayerData<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl PartialEq<[u8]> for LayerData<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl PartialEq<&[u8]> for LayerData<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_slice() == *other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for LayerData<'_> {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl fmt::Debug for LayerData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, b) in self.as_slice().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        write!(f, "]")
    }
}

/// The not-yet-decoded tail of a frame.
///
/// This is the `remaining_bytes` half of the decode state. In no-copy mode it
/// is a [`Cursor`] into the caller's buffer, in copy mode a `Bytes` handle on
/// the packet's own copy. Splitting a header off hands out [`LayerData`] with
/// the matching ownership.
#[derive(Debug, Clone)]
pub(crate) enum PacketBuf<'a> {
    Borrowed(Cursor<'a>),
    Owned(Bytes),
}

impl<'a> PacketBuf<'a> {
    /// Remove the first `cnt` bytes and return them.
    ///
    /// The caller must ensure `cnt <= self.remaining()`.
    pub(crate) fn split_header(&mut self, cnt: usize) -> LayerData<'a> {
        match self {
            PacketBuf::Borrowed(cursor) => LayerData::Borrowed(cursor.split_to(cnt)),
            PacketBuf::Owned(bytes) => LayerData::Owned(bytes.split_to(cnt)),
        }
    }

    /// All remaining bytes, without consuming them.
    pub(crate) fn rest(&self) -> LayerData<'a> {
        match self {
            PacketBuf::Borrowed(cursor) => LayerData::Borrowed(cursor.chunk_shared_lifetime()),
            PacketBuf::Owned(bytes) => LayerData::Owned(bytes.clone()),
        }
    }
}

impl Buf for PacketBuf<'_> {
    #[inline]
    fn remaining(&self) -> usize {
        match self {
            PacketBuf::Borrowed(cursor) => cursor.remaining(),
            PacketBuf::Owned(bytes) => bytes.remaining(),
        }
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        match self {
            PacketBuf::Borrowed(cursor) => cursor.chunk(),
            PacketBuf::Owned(bytes) => bytes.chunk(),
        }
    }

    #[inline]
    fn advance(&mut self, cnt: usize) {
        match self {
            PacketBuf::Borrowed(cursor) => cursor.advance(cnt),
            PacketBuf::Owned(bytes) => bytes.advance(cnt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_borrowed_and_owned_agree() {
        let frame: Vec<u8> = (0..32).collect();

        let mut borrowed = PacketBuf::Borrowed(Cursor::new(&frame[..]));
        let mut owned = PacketBuf::Owned(Bytes::copy_from_slice(&frame[..]));

        let h1 = borrowed.split_header(14);
        let h2 = owned.split_header(14);
        assert!(h1.is_borrowed());
        assert!(!h2.is_borrowed());
        assert_eq!(h1, h2);
        assert_eq!(h1, &frame[..14]);

        assert_eq!(borrowed.rest(), owned.rest());
        assert_eq!(borrowed.remaining(), 18);
        assert_eq!(owned.chunk(), &frame[14..]);
    }

    #[test]
    fn into_owned_detaches() {
        let data = {
            let frame = vec![0xab, 0xcd];
            LayerData::Borrowed(&frame[..]).into_owned()
        };
        assert!(!data.is_borrowed());
        assert_eq!(data, [0xab, 0xcd]);
        assert_eq!(format!("{:?}", data), "[ab cd]");
    }
}
