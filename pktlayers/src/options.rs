/// How a [`Packet`](crate::Packet) decodes and stores its layers.
///
/// Two independent axes are fixed when a packet is created:
///
/// - **eager / lazy**: eager decodes the whole layer stack up front, lazy
///   decodes a layer only when a query first needs it.
/// - **copy / no-copy**: copy mode makes one owned copy of the frame that
///   all layers share, and [`Packet::into_owned`](crate::Packet::into_owned)
///   detaches it without copying again. No-copy layers borrow the caller's
///   buffer for the packet's lifetime.
///
/// # Default
///
/// [`DecodeOptions::DEFAULT`], eager decoding into owned storage.
///
/// # Examples
///
/// ```rust
/// use pktlayers::DecodeOptions;
///
/// let opts = DecodeOptions::new().lazy(true).no_copy(true);
/// assert_eq!(opts, DecodeOptions::LAZY_NO_COPY);
/// assert_eq!(opts.max_layers(), DecodeOptions::DEFAULT_MAX_LAYERS);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
    lazy: bool,
    no_copy: bool,
    max_layers: usize,
}

impl DecodeOptions {
    /// The default bound on the number of layers in one packet.
    pub const DEFAULT_MAX_LAYERS: usize = 64;

    /// Eager decoding, owned storage.
    pub const DEFAULT: DecodeOptions = DecodeOptions {
        lazy: false,
        no_copy: false,
        max_layers: Self::DEFAULT_MAX_LAYERS,
    };

    /// Lazy decoding, owned storage.
    pub const LAZY: DecodeOptions = DecodeOptions {
        lazy: true,
        ..Self::DEFAULT
    };

    /// Eager decoding, layers borrow the caller's buffer.
    pub const NO_COPY: DecodeOptions = DecodeOptions {
        no_copy: true,
        ..Self::DEFAULT
    };

    /// Lazy decoding, layers borrow the caller's buffer.
    pub const LAZY_NO_COPY: DecodeOptions = DecodeOptions {
        lazy: true,
        no_copy: true,
        ..Self::DEFAULT
    };

    /// Same as [`DecodeOptions::DEFAULT`].
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Select lazy (`true`) or eager (`false`) decoding.
    pub const fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Select borrowed (`true`) or owned (`false`) layer storage.
    pub const fn no_copy(mut self, no_copy: bool) -> Self {
        self.no_copy = no_copy;
        self
    }

    /// Bound the number of layers a packet may hold, the error layer
    /// included.
    ///
    /// A frame that needs more layers ends with a malformed-error layer
    /// holding the rest of its bytes. Values below 2 are raised to 2 so a
    /// single layer and its error can always be recorded.
    pub const fn with_max_layers(mut self, max_layers: usize) -> Self {
        self.max_layers = if max_layers < 2 { 2 } else { max_layers };
        self
    }

    /// Whether layers are decoded on demand.
    #[inline]
    pub const fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Whether layers borrow the caller's buffer.
    #[inline]
    pub const fn is_no_copy(&self) -> bool {
        self.no_copy
    }

    /// The most layers a packet may hold, the error layer included.
    #[inline]
    pub const fn max_layers(&self) -> usize {
        self.max_layers
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}
