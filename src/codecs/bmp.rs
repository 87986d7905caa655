//! BMP codec adapter using the `image` crate.

use std::io::Cursor;

use image::codecs::bmp::{BmpDecoder, BmpEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::RawImage;
use crate::pixel::Channels;
use crate::{CodecError, ImageFormat, Limits};

pub(crate) fn decode(data: &[u8], limits: &Limits) -> Result<RawImage, CodecError> {
    let decoder = BmpDecoder::new(Cursor::new(data))
        .map_err(|e| CodecError::from_codec(ImageFormat::Bmp, e))?;
    super::read_image_crate(decoder, ImageFormat::Bmp, limits)
}

/// Raw (uncompressed) BMP. Gray is written as an 8-bit palette image.
pub(crate) fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: Channels,
) -> Result<Vec<u8>, CodecError> {
    let color = match channels {
        Channels::Gray => ExtendedColorType::L8,
        Channels::Bgr => ExtendedColorType::Rgb8,
        Channels::Bgra => ExtendedColorType::Rgba8,
    };
    let mut output = Vec::new();
    BmpEncoder::new(&mut output)
        .write_image(pixels, width, height, color)
        .map_err(|e| CodecError::from_codec(ImageFormat::Bmp, e))?;
    Ok(output)
}
