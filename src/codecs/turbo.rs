//! Accelerated JPEG adapters backed by libjpeg-turbo.
//!
//! libjpeg-turbo reads and writes BGR directly, so both adapters work in
//! canonical order with no normalization pass.

use tracing::trace;
use turbojpeg::{Colorspace, Compressor, Decompressor, Image, PixelFormat, Subsamp};

use super::{
    DecodeHeader, EncoderKey, InstancePolicy, JpegDecodeAdapter, JpegDecodeSession,
    JpegEncodeAdapter, JpegEncodeSession,
};
use crate::format::ImageFormat;
use crate::pixel::Channels;
use crate::CodecError;

const NAME: &str = "turbojpeg";

fn turbo_err(e: turbojpeg::Error) -> CodecError {
    CodecError::adapter(NAME, e.to_string())
}

fn pixel_format(channels: Channels) -> PixelFormat {
    match channels {
        Channels::Gray => PixelFormat::GRAY,
        Channels::Bgr => PixelFormat::BGR,
        Channels::Bgra => PixelFormat::BGRA,
    }
}

/// Per-call libjpeg-turbo decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct TurboJpegDecoder;

impl JpegDecodeAdapter for TurboJpegDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn supported(&self, data: &[u8]) -> bool {
        ImageFormat::has_jpeg_marker(data)
    }

    fn init<'a>(
        &'a self,
        data: &'a [u8],
        desired_channels: usize,
    ) -> Result<Box<dyn JpegDecodeSession + 'a>, CodecError> {
        let mut decompressor = Decompressor::new().map_err(turbo_err)?;
        let header = decompressor.read_header(data).map_err(turbo_err)?;
        let channels = match desired_channels {
            0 if matches!(header.colorspace, Colorspace::Gray) => Channels::Gray,
            0 | 3 => Channels::Bgr,
            1 => Channels::Gray,
            other => {
                return Err(CodecError::adapter(
                    NAME,
                    format!("cannot produce {other} channels"),
                ));
            }
        };
        let width = u32::try_from(header.width)
            .map_err(|_| CodecError::adapter(NAME, "width overflow"))?;
        let height = u32::try_from(header.height)
            .map_err(|_| CodecError::adapter(NAME, "height overflow"))?;
        Ok(Box::new(TurboDecodeSession {
            decompressor,
            data,
            header: DecodeHeader {
                width,
                height,
                channels: channels.count(),
            },
            format: pixel_format(channels),
        }))
    }
}

struct TurboDecodeSession<'a> {
    decompressor: Decompressor,
    data: &'a [u8],
    header: DecodeHeader,
    format: PixelFormat,
}

impl JpegDecodeSession for TurboDecodeSession<'_> {
    fn header(&self) -> DecodeHeader {
        self.header
    }

    fn decode(&mut self, out: &mut [u8]) -> Result<(), CodecError> {
        let width = self.header.width as usize;
        let height = self.header.height as usize;
        let pitch = width * self.header.channels;
        if out.len() < pitch * height {
            return Err(CodecError::adapter(NAME, "output buffer too small"));
        }
        let image = Image {
            pixels: out,
            width,
            pitch,
            height,
            format: self.format,
        };
        self.decompressor
            .decompress(self.data, image)
            .map_err(turbo_err)
    }
}

/// libjpeg-turbo encoder whose compressor is kept across calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct TurboJpegEncoder;

impl JpegEncodeAdapter for TurboJpegEncoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn supported(&self, width: u32, height: u32, _channels: Channels) -> bool {
        // libjpeg caps dimensions at 65500
        width > 0 && height > 0 && width <= 65_500 && height <= 65_500
    }

    fn policy(&self) -> InstancePolicy {
        InstancePolicy::Cached
    }

    fn init(&self, key: &EncoderKey) -> Result<Box<dyn JpegEncodeSession>, CodecError> {
        let mut compressor = Compressor::new().map_err(turbo_err)?;
        compressor.set_quality(key.quality.clamp(1, 100)).map_err(turbo_err)?;
        let subsamp = match key.channels {
            Channels::Gray => Subsamp::Gray,
            Channels::Bgr | Channels::Bgra => Subsamp::Sub2x2,
        };
        compressor.set_subsamp(subsamp).map_err(turbo_err)?;
        trace!(?key, "turbojpeg compressor ready");
        Ok(Box::new(TurboEncodeSession {
            compressor,
            key: *key,
        }))
    }
}

struct TurboEncodeSession {
    compressor: Compressor,
    key: EncoderKey,
}

impl JpegEncodeSession for TurboEncodeSession {
    fn encode(&mut self, pixels: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        let width = self.key.width as usize;
        let pitch = width * self.key.channels.count();
        let image = Image {
            pixels,
            width,
            pitch,
            height: self.key.height as usize,
            format: pixel_format(self.key.channels),
        };
        let jpeg = self.compressor.compress_to_vec(image).map_err(turbo_err)?;
        out.extend_from_slice(&jpeg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_bgr() {
        let key = EncoderKey {
            width: 16,
            height: 16,
            channels: Channels::Bgr,
            quality: 90,
        };
        let pixels = vec![100u8; 16 * 16 * 3];
        let mut session = TurboJpegEncoder.init(&key).unwrap();
        let mut jpeg = Vec::new();
        session.encode(&pixels, &mut jpeg).unwrap();
        assert!(TurboJpegDecoder.supported(&jpeg));

        let mut decode = TurboJpegDecoder.init(&jpeg, 0).unwrap();
        let header = decode.header();
        assert_eq!((header.width, header.height, header.channels), (16, 16, 3));
        let mut out = vec![0u8; 16 * 16 * 3];
        decode.decode(&mut out).unwrap();
        assert!(out.iter().all(|&v| v.abs_diff(100) <= 3));
    }

    #[test]
    fn garbage_fails_init() {
        let data = [0xFF, 0xD8, 0xFF, 0x00, 0x00, 0x00, 0x00];
        assert!(TurboJpegDecoder.init(&data, 0).is_err());
    }
}
