//! Codec registry: hardware adapters in priority order, software last.

use std::fmt;
use std::sync::Arc;

use crate::codecs::{self, JpegDecodeAdapter, JpegEncodeAdapter};
use crate::ImageFormat;

/// Set of image formats represented as bitflags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FormatSet(u8);

impl FormatSet {
    const EMPTY: Self = FormatSet(0);
    const JPEG: u8 = 1 << 0;
    const PNG: u8 = 1 << 1;
    const BMP: u8 = 1 << 2;
    const PNM: u8 = 1 << 3;

    fn bit(format: ImageFormat) -> u8 {
        match format {
            ImageFormat::Jpeg => Self::JPEG,
            ImageFormat::Png => Self::PNG,
            ImageFormat::Bmp => Self::BMP,
            ImageFormat::Pnm => Self::PNM,
        }
    }

    fn all_compiled() -> Self {
        let mut set = Self::EMPTY;
        for format in ImageFormat::ALL {
            if codecs::decoder_available(format) || codecs::encoder_available(format) {
                set.insert(format);
            }
        }
        set
    }

    fn contains(self, format: ImageFormat) -> bool {
        (self.0 & Self::bit(format)) != 0
    }

    fn insert(&mut self, format: ImageFormat) {
        self.0 |= Self::bit(format);
    }

    fn remove(&mut self, format: ImageFormat) {
        self.0 &= !Self::bit(format);
    }
}

/// Ordered codec adapters.
///
/// Hardware JPEG adapters are tried in the order they were registered; the
/// software codec for each format is the implicit last entry. Registration
/// only appends, so the priority order of a built registry never changes.
/// Compile-time features determine which software codecs are *available*,
/// while the registry controls which are *enabled*.
#[derive(Clone)]
pub struct CodecRegistry {
    jpeg_decoders: Vec<Arc<dyn JpegDecodeAdapter>>,
    jpeg_encoders: Vec<Arc<dyn JpegEncodeAdapter>>,
    decode_enabled: FormatSet,
    encode_enabled: FormatSet,
}

impl CodecRegistry {
    /// Every hardware adapter compiled in for this build, then software.
    #[allow(unused_mut)]
    pub fn platform() -> Self {
        let mut registry = Self::software_only();
        #[cfg(feature = "turbojpeg")]
        {
            registry = registry
                .with_decoder(codecs::turbo::TurboJpegDecoder)
                .with_encoder(codecs::turbo::TurboJpegEncoder);
        }
        registry
    }

    /// All compiled-in software codecs, no hardware adapters.
    pub fn software_only() -> Self {
        Self {
            jpeg_decoders: Vec::new(),
            jpeg_encoders: Vec::new(),
            decode_enabled: FormatSet::all_compiled(),
            encode_enabled: FormatSet::all_compiled(),
        }
    }

    /// Nothing enabled; caller must opt in.
    pub fn none() -> Self {
        Self {
            jpeg_decoders: Vec::new(),
            jpeg_encoders: Vec::new(),
            decode_enabled: FormatSet::EMPTY,
            encode_enabled: FormatSet::EMPTY,
        }
    }

    /// Append a hardware JPEG decoder after those already registered.
    pub fn with_decoder<A: JpegDecodeAdapter + 'static>(mut self, adapter: A) -> Self {
        self.jpeg_decoders.push(Arc::new(adapter));
        self
    }

    /// Append a hardware JPEG encoder after those already registered.
    pub fn with_encoder<A: JpegEncodeAdapter + 'static>(mut self, adapter: A) -> Self {
        self.jpeg_encoders.push(Arc::new(adapter));
        self
    }

    /// Enable or disable software decoding for a format.
    pub fn with_decode(mut self, format: ImageFormat, enabled: bool) -> Self {
        if enabled {
            self.decode_enabled.insert(format);
        } else {
            self.decode_enabled.remove(format);
        }
        self
    }

    /// Enable or disable software encoding for a format.
    pub fn with_encode(mut self, format: ImageFormat, enabled: bool) -> Self {
        if enabled {
            self.encode_enabled.insert(format);
        } else {
            self.encode_enabled.remove(format);
        }
        self
    }

    /// Is the software decoder for this format compiled in AND enabled?
    pub fn can_decode(&self, format: ImageFormat) -> bool {
        self.decode_enabled.contains(format) && codecs::decoder_available(format)
    }

    /// Is the software encoder for this format compiled in AND enabled?
    pub fn can_encode(&self, format: ImageFormat) -> bool {
        self.encode_enabled.contains(format) && codecs::encoder_available(format)
    }

    /// Hardware JPEG decoders in priority order.
    pub fn jpeg_decoders(&self) -> impl Iterator<Item = &dyn JpegDecodeAdapter> + '_ {
        self.jpeg_decoders.iter().map(|a| a.as_ref())
    }

    /// Hardware JPEG encoders in priority order.
    pub fn jpeg_encoders(&self) -> impl Iterator<Item = &dyn JpegEncodeAdapter> + '_ {
        self.jpeg_encoders.iter().map(|a| a.as_ref())
    }

    /// Formats with an enabled software decoder.
    pub fn decodable_formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        ImageFormat::ALL
            .into_iter()
            .filter(|&f| self.can_decode(f))
    }

    /// Formats with an enabled software encoder.
    pub fn encodable_formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        ImageFormat::ALL
            .into_iter()
            .filter(|&f| self.can_encode(f))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::platform()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decoders: Vec<_> = self.jpeg_decoders().map(|a| a.name()).collect();
        let encoders: Vec<_> = self.jpeg_encoders().map(|a| a.name()).collect();
        f.debug_struct("CodecRegistry")
            .field("jpeg_decoders", &decoders)
            .field("jpeg_encoders", &encoders)
            .field("decode_enabled", &self.decode_enabled)
            .field("encode_enabled", &self.encode_enabled)
            .finish()
    }
}
