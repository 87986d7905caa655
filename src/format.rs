//! Image format detection and extension parsing.
//!
//! This is the only place format tokens are parsed. Decode, encode, and
//! display all work with the closed [`ImageFormat`] enumeration; an
//! unrecognized token is `None` and never reaches a codec.

use std::path::Path;

use crate::CodecError;

/// Supported container formats.
///
/// PNM (PBM/PGM/PPM) is decode-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
    Pnm,
}

/// Minimum input length before the JPEG marker is trusted.
const JPEG_GATE_LEN: usize = 4;

impl ImageFormat {
    /// All formats, in software registry order.
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Bmp,
        ImageFormat::Pnm,
    ];

    /// Detect format from magic bytes. Returns None if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // JPEG: FF D8
        if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
            return Some(ImageFormat::Jpeg);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(ImageFormat::Png);
        }

        // BMP: "BM"
        if data.len() >= 2 && data[0] == b'B' && data[1] == b'M' {
            return Some(ImageFormat::Bmp);
        }

        // PNM: "P1" through "P6"
        if data.len() >= 2 && data[0] == b'P' && (b'1'..=b'6').contains(&data[1]) {
            return Some(ImageFormat::Pnm);
        }

        None
    }

    /// Whether `data` is long enough and starts with the JPEG SOI marker.
    ///
    /// Hardware decoders are only consulted when this holds.
    pub fn has_jpeg_marker(data: &[u8]) -> bool {
        data.len() > JPEG_GATE_LEN && data[0] == 0xFF && data[1] == 0xD8
    }

    /// Detect an encodable format from a file extension (case-insensitive).
    ///
    /// A single leading dot is accepted, so both `"jpg"` and `".JPG"` parse.
    /// Decode-only formats are never returned.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Derive the format from a destination path's extension.
    ///
    /// A path without an extension is [`CodecError::MissingExtension`]; an
    /// extension outside jpg/jpeg/png/bmp is [`CodecError::UnrecognizedExtension`].
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        let ext = path
            .extension()
            .ok_or_else(|| CodecError::MissingExtension(path.to_path_buf()))?;
        let ext = ext.to_string_lossy();
        Self::from_extension(&ext).ok_or_else(|| CodecError::UnrecognizedExtension(ext.into_owned()))
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Pnm => "image/x-portable-anymap",
        }
    }

    /// Common file extensions.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Png => &["png"],
            ImageFormat::Bmp => &["bmp"],
            ImageFormat::Pnm => &["pnm", "pbm", "pgm", "ppm"],
        }
    }

    /// Whether this format supports lossless encoding.
    pub fn supports_lossless(self) -> bool {
        match self {
            ImageFormat::Jpeg => false,
            ImageFormat::Png => true,
            ImageFormat::Bmp => true,
            ImageFormat::Pnm => true,
        }
    }

    /// Whether images can be written in this format.
    pub fn is_encodable(self) -> bool {
        !matches!(self, ImageFormat::Pnm)
    }

    /// Whether this format keeps an alpha channel through the software encoder.
    pub fn supports_alpha(self) -> bool {
        match self {
            ImageFormat::Jpeg => false,
            ImageFormat::Png => true,
            ImageFormat::Bmp => true,
            ImageFormat::Pnm => false,
        }
    }
}
