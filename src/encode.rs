//! Image encoding.
//!
//! JPEG targets are offered to each hardware encoder whose predicate accepts
//! the image shape, in registry order. Failures fall through silently; the
//! software codec for the target format is the last resort and receives
//! codec-order (RGB) samples.

use std::borrow::Cow;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::cache::EncoderCache;
use crate::codecs::{self, EncoderKey, InstancePolicy, JpegEncodeAdapter};
use crate::config::CodecConfig;
use crate::normalize;
use crate::params::Params;
use crate::pixel::{Channels, PixelView};
use crate::stats::DispatchStats;
use crate::{CodecError, CodecRegistry, ImageFormat};

/// Encoded image output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOutput {
    /// Encoded image data.
    pub data: Vec<u8>,
    /// Container format of `data`.
    pub format: ImageFormat,
    /// Hardware adapter that produced `data`, or `None` for the software codec.
    pub adapter: Option<&'static str>,
}

/// Image encode request builder.
///
/// # Example
///
/// ```no_run
/// use zenimgio::{Channels, EncodeRequest, ImageFormat, Params, PixelBuffer};
///
/// let image = PixelBuffer::new(100, 100, Channels::Bgr)?;
/// let params = Params::new().with_jpeg_quality(85);
/// let output = EncodeRequest::new(ImageFormat::Jpeg)
///     .with_params(&params)
///     .encode(image.as_view())?;
/// # Ok::<(), zenimgio::CodecError>(())
/// ```
pub struct EncodeRequest<'a> {
    format: ImageFormat,
    params: Option<&'a Params>,
    registry: Option<&'a CodecRegistry>,
    codec_config: Option<&'a CodecConfig>,
    cache: Option<&'a mut EncoderCache>,
    stats: Option<&'a DispatchStats>,
}

impl<'a> EncodeRequest<'a> {
    /// Encode to a specific format.
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            params: None,
            registry: None,
            codec_config: None,
            cache: None,
            stats: None,
        }
    }

    /// Encode to the format named by an extension such as `".png"` or `"JPG"`.
    pub fn from_extension(ext: &str) -> Result<Self, CodecError> {
        ImageFormat::from_extension(ext)
            .map(Self::new)
            .ok_or_else(|| CodecError::UnrecognizedExtension(ext.to_string()))
    }

    /// Encode to the format implied by `path`'s extension.
    pub fn for_path(path: &Path) -> Result<Self, CodecError> {
        ImageFormat::from_path(path).map(Self::new)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Set the `(key, value)` option list.
    pub fn with_params(mut self, params: &'a Params) -> Self {
        self.params = Some(params);
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

    /// Reuse and refresh sessions in `cache`. Without one, cached-policy
    /// sessions live only for this call.
    pub fn with_cache(mut self, cache: &'a mut EncoderCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Count dispatch events into `stats`.
    pub fn with_stats(mut self, stats: &'a DispatchStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Append the encoded image to `sink`. On failure `sink` is untouched.
    pub fn encode_into(self, view: PixelView<'_>, sink: &mut Vec<u8>) -> Result<(), CodecError> {
        let output = self.encode(view)?;
        sink.extend_from_slice(&output.data);
        Ok(())
    }

    /// Encode and write to `path`. Nothing is written unless encoding succeeds.
    pub fn write_file(self, view: PixelView<'_>, path: &Path) -> Result<(), CodecError> {
        let output = self.encode(view)?;
        std::fs::write(path, &output.data).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "could not write image file");
        })?;
        Ok(())
    }

    /// Encode canonical-order pixels.
    pub fn encode(self, view: PixelView<'_>) -> Result<EncodeOutput, CodecError> {
        let EncodeRequest {
            format,
            params,
            registry,
            codec_config,
            cache,
            stats,
        } = self;

        let default_registry;
        let registry = match registry {
            Some(r) => r,
            None => {
                default_registry = CodecRegistry::platform();
                &default_registry
            }
        };
        let default_config;
        let config = match codec_config {
            Some(c) => c,
            None => {
                default_config = CodecConfig::default();
                &default_config
            }
        };
        let mut call_cache;
        let cache = match cache {
            Some(c) => c,
            None => {
                call_cache = EncoderCache::new();
                &mut call_cache
            }
        };
        let fallback_stats = DispatchStats::new();
        let stats = stats.unwrap_or(&fallback_stats);

        config
            .limits
            .check_dimensions(u64::from(view.width()), u64::from(view.height()))?;

        let quality = params.map_or(config.default_jpeg_quality, |p| {
            p.jpeg_quality(config.default_jpeg_quality)
        });

        if format == ImageFormat::Jpeg {
            let key = EncoderKey {
                width: view.width(),
                height: view.height(),
                channels: view.channels(),
                quality,
            };
            for adapter in registry.jpeg_encoders() {
                if !adapter.supported(key.width, key.height, key.channels) {
                    continue;
                }
                stats.hw_encode_attempt();
                let pixels = view.to_contiguous();
                match encode_hardware(adapter, &key, &pixels, cache, stats) {
                    Ok(data) => {
                        debug!(adapter = adapter.name(), bytes = data.len(), "hardware encode");
                        return Ok(EncodeOutput {
                            data,
                            format,
                            adapter: Some(adapter.name()),
                        });
                    }
                    Err(e) => {
                        stats.hw_encode_fallthrough();
                        debug!(adapter = adapter.name(), error = %e, "hardware encode fell through");
                    }
                }
            }
        }

        encode_software(format, view, quality, registry, config, stats)
            .map(|data| EncodeOutput {
                data,
                format,
                adapter: None,
            })
            .inspect_err(|e| warn!(?format, error = %e, "encode failed"))
    }
}

fn encode_hardware(
    adapter: &dyn JpegEncodeAdapter,
    key: &EncoderKey,
    pixels: &[u8],
    cache: &mut EncoderCache,
    stats: &DispatchStats,
) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    match adapter.policy() {
        InstancePolicy::Cached => {
            if let Some(session) = cache.get_mut(adapter.name(), key) {
                stats.encoder_cache_hit();
                trace!(adapter = adapter.name(), ?key, "encoder cache hit");
                session.encode(pixels, &mut out)?;
                return Ok(out);
            }
            stats.encoder_init();
            let mut session = adapter.init(key)?;
            session.encode(pixels, &mut out)?;
            cache.insert(adapter.name(), *key, session);
        }
        InstancePolicy::PerCall => {
            stats.encoder_init();
            let mut session = adapter.init(key)?;
            session.encode(pixels, &mut out)?;
        }
    }
    Ok(out)
}

fn encode_software(
    format: ImageFormat,
    view: PixelView<'_>,
    quality: i32,
    registry: &CodecRegistry,
    config: &CodecConfig,
    stats: &DispatchStats,
) -> Result<Vec<u8>, CodecError> {
    if !registry.can_encode(format) {
        return Err(if codecs::encoder_available(format) {
            CodecError::DisabledFormat(format)
        } else {
            CodecError::UnsupportedFormat(format)
        });
    }
    stats.sw_encode();

    let channels = view.channels();
    let pixels: Cow<'_, [u8]> = match channels {
        Channels::Gray => view.to_contiguous(),
        Channels::Bgr | Channels::Bgra => {
            let mut owned = view.to_contiguous().into_owned();
            normalize::canonical_to_codec(&mut owned, channels);
            Cow::Owned(owned)
        }
    };

    codecs::encode_software(
        format,
        &pixels,
        view.width(),
        view.height(),
        channels,
        quality,
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;

    fn bgr(width: u32, height: u32) -> PixelBuffer {
        let data = (0..width * height * 3).map(|i| (i * 13 % 256) as u8).collect();
        PixelBuffer::from_vec(width, height, Channels::Bgr, data).unwrap()
    }

    #[test]
    fn extension_parsing() {
        assert_eq!(
            EncodeRequest::from_extension(".JPG").unwrap().format(),
            ImageFormat::Jpeg
        );
        assert!(matches!(
            EncodeRequest::from_extension(".tiff"),
            Err(CodecError::UnrecognizedExtension(_))
        ));
        assert!(matches!(
            EncodeRequest::for_path(Path::new("noext")),
            Err(CodecError::MissingExtension(_))
        ));
    }

    #[cfg(feature = "png")]
    #[test]
    fn software_png_leaves_caller_untouched() {
        let image = bgr(4, 4);
        let before = image.clone();
        let output = EncodeRequest::new(ImageFormat::Png)
            .with_registry(&CodecRegistry::software_only())
            .encode(image.as_view())
            .unwrap();
        assert_eq!(output.adapter, None);
        assert_eq!(ImageFormat::detect(&output.data), Some(ImageFormat::Png));
        assert_eq!(image, before);
    }

    #[cfg(feature = "bmp")]
    #[test]
    fn strided_view_is_packed() {
        let image = bgr(6, 5);
        let view = image.view(1, 1, 3, 3).unwrap();
        assert!(!view.is_contiguous());
        let output = EncodeRequest::new(ImageFormat::Bmp)
            .with_registry(&CodecRegistry::software_only())
            .encode(view)
            .unwrap();
        assert_eq!(&output.data[..2], b"BM");
    }

    #[test]
    fn disabled_format() {
        let image = bgr(2, 2);
        let result = EncodeRequest::new(ImageFormat::Png)
            .with_registry(&CodecRegistry::none())
            .encode(image.as_view());
        assert!(matches!(
            result,
            Err(CodecError::DisabledFormat(_) | CodecError::UnsupportedFormat(_))
        ));
    }

    #[cfg(feature = "png")]
    #[test]
    fn sink_untouched_on_failure() {
        let image = bgr(2, 2);
        let mut sink = vec![7u8];
        let result = EncodeRequest::new(ImageFormat::Png)
            .with_registry(&CodecRegistry::none())
            .encode_into(image.as_view(), &mut sink);
        assert!(result.is_err());
        assert_eq!(sink, [7]);

        EncodeRequest::new(ImageFormat::Png)
            .with_registry(&CodecRegistry::software_only())
            .encode_into(image.as_view(), &mut sink)
            .unwrap();
        assert_eq!(sink[0], 7);
        assert_eq!(&sink[1..5], b"\x89PNG");
    }

    #[test]
    fn dimension_limits() {
        let image = bgr(8, 8);
        let config = CodecConfig::default()
            .with_limits(crate::Limits::none().with_max_width(4));
        let result = EncodeRequest::new(ImageFormat::Bmp)
            .with_codec_config(&config)
            .encode(image.as_view());
        assert!(matches!(result, Err(CodecError::LimitExceeded(_))));
    }
}
