//! JPEG software codec using the `image` crate.

use std::io::Cursor;

use image::codecs::jpeg::{JpegDecoder, JpegEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::{convert, RawImage};
use crate::pixel::Channels;
use crate::{CodecError, ImageFormat, Limits};

/// Decode JPEG to gray or RGB samples.
pub(crate) fn decode(data: &[u8], limits: &Limits) -> Result<RawImage, CodecError> {
    let decoder = JpegDecoder::new(Cursor::new(data))
        .map_err(|e| CodecError::from_codec(ImageFormat::Jpeg, e))?;
    super::read_image_crate(decoder, ImageFormat::Jpeg, limits)
}

/// Encode gray or RGB(A) samples. Alpha is dropped.
///
/// Quality is clamped to 1-100 at this boundary only.
pub(crate) fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: Channels,
    quality: i32,
) -> Result<Vec<u8>, CodecError> {
    let quality = quality.clamp(1, 100) as u8;

    let stripped;
    let (samples, color) = match channels {
        Channels::Gray => (pixels, ExtendedColorType::L8),
        Channels::Bgr => (pixels, ExtendedColorType::Rgb8),
        Channels::Bgra => {
            stripped = convert::strip_alpha(pixels);
            (&stripped[..], ExtendedColorType::Rgb8)
        }
    };

    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, quality)
        .write_image(samples, width, height, color)
        .map_err(|e| CodecError::from_codec(ImageFormat::Jpeg, e))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32, channels: Channels, value: u8) -> Vec<u8> {
        vec![value; (width * height) as usize * channels.count()]
    }

    #[test]
    fn encode_then_decode_keeps_shape() {
        let pixels = flat(16, 8, Channels::Bgr, 128);
        let encoded = encode(&pixels, 16, 8, Channels::Bgr, 90).unwrap();
        assert_eq!(&encoded[..2], &[0xFF, 0xD8]);

        let raw = decode(&encoded, &Limits::none()).unwrap();
        assert_eq!((raw.width, raw.height, raw.channels), (16, 8, 3));
        assert!(raw.pixels.iter().all(|&v| v.abs_diff(128) <= 4));
    }

    #[test]
    fn alpha_is_dropped() {
        let pixels = flat(8, 8, Channels::Bgra, 200);
        let encoded = encode(&pixels, 8, 8, Channels::Bgra, 95).unwrap();
        let raw = decode(&encoded, &Limits::none()).unwrap();
        assert_eq!(raw.channels, 3);
    }

    #[test]
    fn gray_stays_gray() {
        let pixels = flat(8, 8, Channels::Gray, 50);
        let encoded = encode(&pixels, 8, 8, Channels::Gray, 95).unwrap();
        let raw = decode(&encoded, &Limits::none()).unwrap();
        assert_eq!(raw.channels, 1);
    }

    #[test]
    fn limits_checked_before_pixels() {
        let pixels = flat(32, 32, Channels::Bgr, 10);
        let encoded = encode(&pixels, 32, 32, Channels::Bgr, 80).unwrap();
        let limits = Limits::none().with_max_width(16);
        assert!(matches!(
            decode(&encoded, &limits),
            Err(CodecError::LimitExceeded(_))
        ));
    }

    #[test]
    fn truncated_fails() {
        let pixels = flat(16, 16, Channels::Bgr, 10);
        let encoded = encode(&pixels, 16, 16, Channels::Bgr, 80).unwrap();
        assert!(decode(&encoded[..20], &Limits::none()).is_err());
        assert!(decode(&[0xFF, 0xD8, 0x00, 0x01, 0x02, 0x03], &Limits::none()).is_err());
    }
}
