//! Codec adapters.
//!
//! Two families live here. Hardware JPEG adapters implement the
//! [`JpegDecodeAdapter`] / [`JpegEncodeAdapter`] lifecycle traits and are
//! tried first by the dispatchers. The software codecs (one module per
//! format) are the final fallback and always speak RGB(A) order.
//!
//! Adapter lifecycle: `supported` is a cheap predicate, `init` creates a
//! session, the session does the work, dropping the session is deinit.

use crate::config::CodecConfig;
use crate::format::ImageFormat;
use crate::limits::Limits;
use crate::pixel::Channels;
use crate::CodecError;

pub(crate) mod convert;

#[cfg(feature = "jpeg")]
pub(crate) mod jpeg;

#[cfg(feature = "png")]
pub(crate) mod png;

#[cfg(feature = "bmp")]
pub(crate) mod bmp;

#[cfg(feature = "pnm")]
pub(crate) mod pnm;

#[cfg(feature = "turbojpeg")]
pub mod turbo;

/// Shape reported by a decode session after `init`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeHeader {
    pub width: u32,
    pub height: u32,
    /// Channel count the session will write. Anything other than 1 or 3 is
    /// treated by the dispatcher as an adapter failure.
    pub channels: usize,
}

/// A hardware JPEG decoder.
///
/// Sessions write canonical channel order directly; the dispatcher applies
/// neither channel normalization nor orientation to their output.
pub trait JpegDecodeAdapter: Send + Sync {
    /// Stable name, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether this adapter wants to try `data`. Must not fail.
    fn supported(&self, data: &[u8]) -> bool;

    /// Parse headers and prepare to decode.
    ///
    /// `desired_channels` is 0 (source channel count), 1, or 3.
    fn init<'a>(
        &'a self,
        data: &'a [u8],
        desired_channels: usize,
    ) -> Result<Box<dyn JpegDecodeSession + 'a>, CodecError>;
}

/// A live decode, created by [`JpegDecodeAdapter::init`].
pub trait JpegDecodeSession {
    fn header(&self) -> DecodeHeader;

    /// Write `width * height * channels` bytes into `out`.
    fn decode(&mut self, out: &mut [u8]) -> Result<(), CodecError>;
}

/// Whether an encoder session outlives the call that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstancePolicy {
    /// Created and dropped within one encode call.
    PerCall,
    /// Kept in the [`EncoderCache`](crate::EncoderCache) and reused while the
    /// [`EncoderKey`] is unchanged.
    Cached,
}

/// Parameters an encoder session is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EncoderKey {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub quality: i32,
}

/// A hardware JPEG encoder.
pub trait JpegEncodeAdapter: Send + Sync {
    /// Stable name; also the encoder cache key.
    fn name(&self) -> &'static str;

    fn supported(&self, width: u32, height: u32, channels: Channels) -> bool;

    /// Fixed per adapter, never chosen by the caller.
    fn policy(&self) -> InstancePolicy {
        InstancePolicy::PerCall
    }

    fn init(&self, key: &EncoderKey) -> Result<Box<dyn JpegEncodeSession>, CodecError>;
}

/// A live encoder bound to one [`EncoderKey`].
pub trait JpegEncodeSession {
    /// Compress contiguous canonical-order pixels, appending to `out`.
    fn encode(&mut self, pixels: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError>;
}

/// Software-decoded pixels in codec (RGB/RGBA) order.
///
/// `channels` may be 2 (gray + alpha) when the source carries it and no
/// conversion was requested; the dispatcher rejects that.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawImage {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub pixels: Vec<u8>,
}

/// Software decode with stb-style desired channel conversion.
pub(crate) fn decode_software(
    data: &[u8],
    format: ImageFormat,
    desired_channels: usize,
    limits: &Limits,
) -> Result<RawImage, CodecError> {
    let raw = match format {
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::decode(data, limits)?,
        #[cfg(feature = "png")]
        ImageFormat::Png => png::decode(data, limits)?,
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::decode(data, limits)?,
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::decode(data, limits)?,
        #[allow(unreachable_patterns)]
        _ => {
            let _ = (data, limits);
            return Err(CodecError::UnsupportedFormat(format));
        }
    };
    convert::to_desired(raw, desired_channels)
}

/// Software encode of contiguous codec-order pixels.
#[allow(unused_variables)]
pub(crate) fn encode_software(
    format: ImageFormat,
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: Channels,
    quality: i32,
    config: &CodecConfig,
) -> Result<Vec<u8>, CodecError> {
    match format {
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::encode(pixels, width, height, channels, quality),
        #[cfg(feature = "png")]
        ImageFormat::Png => png::encode(pixels, width, height, channels, config),
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::encode(pixels, width, height, channels),
        #[allow(unreachable_patterns)]
        _ => Err(CodecError::UnsupportedFormat(format)),
    }
}

/// Whether the software decoder for `format` is compiled in.
pub(crate) fn decoder_available(format: ImageFormat) -> bool {
    match format {
        ImageFormat::Jpeg => cfg!(feature = "jpeg"),
        ImageFormat::Png => cfg!(feature = "png"),
        ImageFormat::Bmp => cfg!(feature = "bmp"),
        ImageFormat::Pnm => cfg!(feature = "pnm"),
    }
}

/// Whether the software encoder for `format` is compiled in.
pub(crate) fn encoder_available(format: ImageFormat) -> bool {
    format.is_encodable() && decoder_available(format)
}

/// Zero-filled pixel storage of `len` bytes.
///
/// Sizes come from untrusted headers, so allocation failure is an error
/// rather than an abort. The buffer is zeroed by the allocator, so pages a
/// truncated decode never reaches are never touched.
pub(crate) fn alloc_pixels(len: usize, limits: &Limits) -> Result<Vec<u8>, CodecError> {
    limits.check_memory(len as u64)?;
    let mut reservation: Vec<u8> = Vec::new();
    reservation
        .try_reserve_exact(len)
        .map_err(|_| CodecError::LimitExceeded(format!("cannot allocate {len} bytes")))?;
    drop(reservation);
    Ok(vec![0u8; len])
}

/// Translate crate limits for an `image` crate decoder.
#[cfg(any(feature = "jpeg", feature = "bmp", feature = "pnm"))]
fn image_crate_limits(limits: &Limits) -> image::Limits {
    let mut out = image::Limits::no_limits();
    out.max_image_width = limits.max_width.map(|w| u32::try_from(w).unwrap_or(u32::MAX));
    out.max_image_height = limits.max_height.map(|h| u32::try_from(h).unwrap_or(u32::MAX));
    out.max_alloc = limits.max_memory_bytes;
    out
}

/// Drive an `image` crate decoder to 8-bit samples.
///
/// 16-bit sources keep the high byte of each sample.
#[cfg(any(feature = "jpeg", feature = "bmp", feature = "pnm"))]
pub(crate) fn read_image_crate<D: image::ImageDecoder>(
    mut decoder: D,
    format: ImageFormat,
    limits: &Limits,
) -> Result<RawImage, CodecError> {
    let (width, height) = decoder.dimensions();
    limits.check_dimensions(u64::from(width), u64::from(height))?;
    decoder
        .set_limits(image_crate_limits(limits))
        .map_err(|e| CodecError::from_codec(format, e))?;

    let color = decoder.color_type();
    let channels = usize::from(color.channel_count());
    let bytes_per_sample = usize::from(color.bytes_per_pixel()) / channels.max(1);
    if !matches!(bytes_per_sample, 1 | 2) {
        return Err(CodecError::InvalidInput(format!(
            "{format:?} decoded to {color:?}, expected 8- or 16-bit samples"
        )));
    }

    let len = usize::try_from(decoder.total_bytes())
        .map_err(|_| CodecError::LimitExceeded("decoded size overflows usize".into()))?;
    let mut pixels = alloc_pixels(len, limits)?;
    decoder
        .read_image(&mut pixels)
        .map_err(|e| CodecError::from_codec(format, e))?;

    if bytes_per_sample == 2 {
        pixels = pixels
            .chunks_exact(2)
            .map(|s| (u16::from_ne_bytes([s[0], s[1]]) >> 8) as u8)
            .collect();
    }

    Ok(RawImage {
        width,
        height,
        channels,
        pixels,
    })
}
