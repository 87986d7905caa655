//! PBM/PGM/PPM decoder using the `image` crate. There is no PNM encoder.

use std::io::Cursor;

use image::codecs::pnm::PnmDecoder;

use super::RawImage;
use crate::{CodecError, ImageFormat, Limits};

/// Decode binary or ASCII PNM to gray or RGB samples.
pub(crate) fn decode(data: &[u8], limits: &Limits) -> Result<RawImage, CodecError> {
    let decoder = PnmDecoder::new(Cursor::new(data))
        .map_err(|e| CodecError::from_codec(ImageFormat::Pnm, e))?;
    super::read_image_crate(decoder, ImageFormat::Pnm, limits)
}
