//! # zenimgio
//!
//! Image load/save for vision pipelines on mixed hardware. Decoding and
//! encoding prefer hardware JPEG codecs and fall back, silently, to a
//! portable software codec for JPEG, PNG and BMP. PNM is decoded but never
//! written.
//!
//! Pixel buffers are 8-bit with 1, 3 or 4 channels, and 3/4-channel buffers
//! are always in B, G, R(, A) order. Decoding applies the EXIF orientation.
//!
//! Each software codec is feature-gated:
//!
//! ```toml
//! [dependencies]
//! zenimgio = { version = "0.1", features = ["jpeg", "png", "turbojpeg"] }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zenimgio::{ImageIo, Params, ReadMode};
//!
//! let mut io = ImageIo::new();
//!
//! // Decode a file, always three channels
//! let image = io.read("photo.jpg", ReadMode::Color)?;
//!
//! // Re-encode in memory; the format comes from the extension
//! let mut jpeg = Vec::new();
//! io.encode(".jpg", image.as_view(), &mut jpeg, &Params::new().with_jpeg_quality(80))?;
//!
//! // Or straight to disk
//! io.write("photo.png", image.as_view(), &Params::new())?;
//! # Ok::<(), zenimgio::CodecError>(())
//! ```
//!
//! Hardware adapters implement [`JpegDecodeAdapter`] / [`JpegEncodeAdapter`]
//! and are registered on a [`CodecRegistry`]; the dispatch logic does not
//! change when one is added.

#![forbid(unsafe_code)]

pub mod cache;
pub mod codecs;
pub mod config;
mod decode;
#[cfg(feature = "display")]
pub mod display;
mod encode;
mod error;
mod format;
mod io;
mod limits;
pub mod normalize;
pub mod orientation;
pub mod params;
pub mod pixel;
mod registry;
pub mod stats;

pub use cache::EncoderCache;
pub use codecs::{
    DecodeHeader, EncoderKey, InstancePolicy, JpegDecodeAdapter, JpegDecodeSession,
    JpegEncodeAdapter, JpegEncodeSession,
};
pub use config::CodecConfig;
pub use decode::{DecodeRequest, ReadMode};
#[cfg(feature = "display")]
pub use display::{Display, Shown};
pub use encode::{EncodeOutput, EncodeRequest};
pub use error::CodecError;
pub use format::ImageFormat;
pub use io::ImageIo;
pub use limits::Limits;
pub use orientation::Orientation;
pub use params::Params;
pub use pixel::{Channels, PixelBuffer, PixelView};
pub use registry::CodecRegistry;
pub use stats::{DispatchCounters, DispatchStats};
