//! Image decoding.
//!
//! JPEG input is offered to each hardware decoder in registry order; any
//! failure falls through silently to the next candidate and finally to the
//! software codec. Only the software path applies EXIF orientation and
//! channel normalization. Hardware sessions already write canonical order.

use std::str::FromStr;

use tracing::{debug, warn};

use crate::codecs::{self, JpegDecodeAdapter};
use crate::config::CodecConfig;
use crate::normalize;
use crate::orientation::read_exif_orientation;
use crate::pixel::{Channels, PixelBuffer};
use crate::stats::DispatchStats;
use crate::{CodecError, CodecRegistry, ImageFormat, Limits};

/// Requested channel layout of a decoded image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReadMode {
    /// Keep the source's channel count (1, 3 or 4).
    Unchanged,
    /// Always one channel.
    Grayscale,
    /// Always three channels.
    #[default]
    Color,
}

impl ReadMode {
    /// Channel count passed to codecs; 0 means "source channel count".
    pub fn desired_channels(self) -> usize {
        match self {
            ReadMode::Unchanged => 0,
            ReadMode::Grayscale => 1,
            ReadMode::Color => 3,
        }
    }

    /// The classic integer flag: -1, 0 or 1.
    pub fn flag(self) -> i32 {
        match self {
            ReadMode::Unchanged => -1,
            ReadMode::Grayscale => 0,
            ReadMode::Color => 1,
        }
    }
}

impl TryFrom<i32> for ReadMode {
    type Error = CodecError;

    fn try_from(flag: i32) -> Result<Self, Self::Error> {
        match flag {
            -1 => Ok(ReadMode::Unchanged),
            0 => Ok(ReadMode::Grayscale),
            1 => Ok(ReadMode::Color),
            other => Err(CodecError::InvalidMode(other)),
        }
    }
}

impl FromStr for ReadMode {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unchanged" => Ok(ReadMode::Unchanged),
            "grayscale" | "gray" => Ok(ReadMode::Grayscale),
            "color" => Ok(ReadMode::Color),
            _ => Err(CodecError::InvalidInput(format!("unknown read mode {s:?}"))),
        }
    }
}

/// Image decode request builder.
///
/// # Example
///
/// ```no_run
/// use zenimgio::{DecodeRequest, ReadMode};
///
/// let data: &[u8] = &[]; // your image bytes
/// let image = DecodeRequest::new(data).with_mode(ReadMode::Grayscale).decode()?;
/// println!("{}x{}", image.width(), image.height());
/// # Ok::<(), zenimgio::CodecError>(())
/// ```
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    mode: ReadMode,
    limits: Option<&'a Limits>,
    registry: Option<&'a CodecRegistry>,
    codec_config: Option<&'a CodecConfig>,
    stats: Option<&'a DispatchStats>,
}

impl<'a> DecodeRequest<'a> {
    /// Create a new decode request in [`ReadMode::Color`].
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            mode: ReadMode::default(),
            limits: None,
            registry: None,
            codec_config: None,
            stats: None,
        }
    }

    pub fn with_mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set resource limits, overriding those in the codec config.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Set the adapters to try. Defaults to [`CodecRegistry::platform`].
    pub fn with_registry(mut self, registry: &'a CodecRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_codec_config(mut self, config: &'a CodecConfig) -> Self {
        self.codec_config = Some(config);
        self
    }

    /// Count dispatch events into `stats`.
    pub fn with_stats(mut self, stats: &'a DispatchStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Decode to a canonical-order buffer.
    pub fn decode(self) -> Result<PixelBuffer, CodecError> {
        let default_registry;
        let registry = match self.registry {
            Some(r) => r,
            None => {
                default_registry = CodecRegistry::platform();
                &default_registry
            }
        };
        let default_config;
        let config = match self.codec_config {
            Some(c) => c,
            None => {
                default_config = CodecConfig::default();
                &default_config
            }
        };
        let limits = self.limits.unwrap_or(&config.limits);
        let fallback_stats = DispatchStats::new();
        let stats = self.stats.unwrap_or(&fallback_stats);

        if self.data.is_empty() {
            return Err(CodecError::EmptyInput);
        }
        limits.check_input_size(self.data.len())?;

        let desired = self.mode.desired_channels();

        if ImageFormat::has_jpeg_marker(self.data) {
            for adapter in registry.jpeg_decoders() {
                if !adapter.supported(self.data) {
                    continue;
                }
                stats.hw_decode_attempt();
                match decode_hardware(adapter, self.data, desired, limits, stats) {
                    Ok(buffer) => {
                        debug!(adapter = adapter.name(), "hardware decode");
                        return Ok(buffer);
                    }
                    Err(e) => {
                        stats.hw_decode_fallthrough();
                        debug!(adapter = adapter.name(), error = %e, "hardware decode fell through");
                    }
                }
            }
        }

        self.decode_software(registry, config, limits, stats)
            .inspect_err(|e| warn!(mode = ?self.mode, error = %e, "decode failed"))
    }

    fn decode_software(
        &self,
        registry: &CodecRegistry,
        config: &CodecConfig,
        limits: &Limits,
        stats: &DispatchStats,
    ) -> Result<PixelBuffer, CodecError> {
        let format = ImageFormat::detect(self.data).ok_or(CodecError::UnrecognizedFormat)?;
        if !registry.can_decode(format) {
            return Err(if codecs::decoder_available(format) {
                CodecError::DisabledFormat(format)
            } else {
                CodecError::UnsupportedFormat(format)
            });
        }

        stats.sw_decode();
        let raw = codecs::decode_software(self.data, format, self.mode.desired_channels(), limits)?;
        let channels = Channels::from_count(raw.channels)?;
        let mut buffer = PixelBuffer::from_vec(raw.width, raw.height, channels, raw.pixels)?;

        if config.auto_orient {
            if let Some(orientation) = read_exif_orientation(self.data) {
                if !orientation.is_identity() {
                    debug!(?orientation, "applying EXIF orientation");
                    buffer = orientation.apply(buffer);
                }
            }
        }

        normalize::to_canonical(&mut buffer);
        Ok(buffer)
    }
}

fn decode_hardware(
    adapter: &dyn JpegDecodeAdapter,
    data: &[u8],
    desired: usize,
    limits: &Limits,
    stats: &DispatchStats,
) -> Result<PixelBuffer, CodecError> {
    let mut session = adapter.init(data, desired)?;
    let header = session.header();
    let channels = match header.channels {
        1 => Channels::Gray,
        3 => Channels::Bgr,
        other => {
            stats.hw_decode_bad_channels();
            return Err(CodecError::UnsupportedChannels(other));
        }
    };
    limits.check_dimensions(u64::from(header.width), u64::from(header.height))?;
    let len = (header.width as usize)
        .checked_mul(header.height as usize)
        .and_then(|n| n.checked_mul(channels.count()))
        .ok_or_else(|| CodecError::LimitExceeded("image size overflows usize".into()))?;
    let pixels = codecs::alloc_pixels(len, limits)?;
    let mut buffer = PixelBuffer::from_vec(header.width, header.height, channels, pixels)?;
    session.decode(buffer.data_mut())?;
    Ok(buffer)
}
