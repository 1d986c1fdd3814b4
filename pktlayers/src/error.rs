//! Error types reported by layer decoders and the decoder registry.

use thiserror::Error;

use crate::LayerType;

/// The coarse class of a [`DecodeError`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    /// Fewer bytes remain than the header requires.
    Truncated,
    /// The bytes are present but violate a structural rule of the format.
    Malformed,
}

/// The failure of a single layer decoder.
///
/// A `DecodeError` never aborts the process or the caller: the decode engine
/// records it in a terminal error layer of the [`Packet`](crate::Packet).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes remain than the layer's fixed or declared header length.
    #[error("{protocol}: truncated header (need {needed} bytes, have {have})")]
    Truncated {
        /// Name of the protocol whose decoder failed.
        protocol: &'static str,
        /// Bytes required to decode the header.
        needed: usize,
        /// Bytes that were available.
        have: usize,
    },

    /// The header is internally inconsistent.
    #[error("{protocol}: malformed header: {reason}")]
    Malformed {
        /// Name of the protocol whose decoder failed.
        protocol: &'static str,
        /// What was wrong.
        reason: String,
    },
}

impl DecodeError {
    /// Build a `Truncated` error.
    pub fn truncated(protocol: &'static str, needed: usize, have: usize) -> Self {
        DecodeError::Truncated {
            protocol,
            needed,
            have,
        }
    }

    /// Build a `Malformed` error.
    pub fn malformed<S: Into<String>>(protocol: &'static str, reason: S) -> Self {
        DecodeError::Malformed {
            protocol,
            reason: reason.into(),
        }
    }

    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Truncated { .. } => ErrorKind::Truncated,
            DecodeError::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    /// Name of the protocol whose decoder failed.
    pub fn protocol(&self) -> &'static str {
        match self {
            DecodeError::Truncated { protocol, .. } | DecodeError::Malformed { protocol, .. } => {
                protocol
            }
        }
    }
}

/// Fails a decoder with [`DecodeError::Truncated`] unless `buf` holds `needed` bytes.
#[inline]
pub(crate) fn ensure_len(
    protocol: &'static str,
    buf: &[u8],
    needed: usize,
) -> Result<(), DecodeError> {
    if buf.len() < needed {
        return Err(DecodeError::truncated(protocol, needed, buf.len()));
    }
    Ok(())
}

/// Errors raised while building or installing a decoder registry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The tag is used by the framework itself.
    #[error("layer type {0} is reserved")]
    Reserved(LayerType),

    /// A decoder is already bound to the tag.
    #[error("a decoder for layer type {0} is already registered")]
    Duplicate(LayerType),

    /// The process-wide registry has already been installed or used.
    #[error("the global decoder registry is already installed")]
    AlreadyInstalled,
}
