//! PNG codec adapter using png crate.
//!
//! Output is always 8-bit: palettes and low bit depths are expanded, 16-bit
//! samples are stripped.

use std::io::Cursor;

use super::RawImage;
use crate::config::CodecConfig;
use crate::pixel::Channels;
use crate::{CodecError, ImageFormat, Limits};

/// Decode PNG to 8-bit gray, gray+alpha, RGB or RGBA samples.
pub(crate) fn decode(data: &[u8], limits: &Limits) -> Result<RawImage, CodecError> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| CodecError::from_codec(ImageFormat::Png, e))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    limits.check_dimensions(u64::from(width), u64::from(height))?;

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| CodecError::InvalidInput("cannot determine PNG output buffer size".into()))?;
    let mut raw_pixels = super::alloc_pixels(buffer_size, limits)?;

    let output_info = reader
        .next_frame(&mut raw_pixels)
        .map_err(|e| CodecError::from_codec(ImageFormat::Png, e))?;
    raw_pixels.truncate(output_info.buffer_size());

    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != png::BitDepth::Eight {
        return Err(CodecError::InvalidInput(format!(
            "PNG decoded to {bit_depth:?} samples"
        )));
    }
    let channels = match color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        // EXPAND turns palettes into RGB(A)
        png::ColorType::Indexed => {
            return Err(CodecError::InvalidInput("PNG palette was not expanded".into()));
        }
    };

    Ok(RawImage {
        width,
        height,
        channels,
        pixels: raw_pixels,
    })
}

/// Encode 8-bit gray, RGB or RGBA samples.
pub(crate) fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: Channels,
    config: &CodecConfig,
) -> Result<Vec<u8>, CodecError> {
    let mut output = Vec::new();
    let mut encoder = png::Encoder::new(&mut output, width, height);
    encoder.set_color(match channels {
        Channels::Gray => png::ColorType::Grayscale,
        Channels::Bgr => png::ColorType::Rgb,
        Channels::Bgra => png::ColorType::Rgba,
    });
    encoder.set_depth(png::BitDepth::Eight);
    if let Some(compression) = config.png_compression {
        encoder.set_compression(compression);
    }
    if let Some(filter) = config.png_filter {
        encoder.set_filter(filter);
    }

    let mut writer = encoder
        .write_header()
        .map_err(|e| CodecError::from_codec(ImageFormat::Png, e))?;

    writer
        .write_image_data(pixels)
        .map_err(|e| CodecError::from_codec(ImageFormat::Png, e))?;

    writer
        .finish()
        .map_err(|e| CodecError::from_codec(ImageFormat::Png, e))?;

    Ok(output)
}
