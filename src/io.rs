//! Long-lived image I/O context.

use std::path::Path;

use tracing::warn;

use crate::cache::EncoderCache;
use crate::config::CodecConfig;
use crate::decode::{DecodeRequest, ReadMode};
use crate::encode::{EncodeOutput, EncodeRequest};
use crate::params::Params;
use crate::pixel::{PixelBuffer, PixelView};
use crate::stats::{DispatchCounters, DispatchStats};
use crate::{CodecError, CodecRegistry, ImageFormat};

/// Owns a registry, configuration, encoder cache and counters, and exposes
/// the file and in-memory decode/encode entry points.
///
/// Decoding takes `&self`. Encoding takes `&mut self` because it may reuse
/// or replace cached hardware encoder sessions; wrap the context in a
/// `Mutex` to encode from several threads.
///
/// # Example
///
/// ```no_run
/// use zenimgio::{ImageIo, ReadMode, Params};
///
/// let mut io = ImageIo::new();
/// let image = io.read("in.jpg", ReadMode::Color)?;
/// io.write("out.png", image.as_view(), &Params::new())?;
/// # Ok::<(), zenimgio::CodecError>(())
/// ```
#[derive(Debug)]
pub struct ImageIo {
    registry: CodecRegistry,
    config: CodecConfig,
    cache: EncoderCache,
    stats: DispatchStats,
}

impl Default for ImageIo {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageIo {
    /// Platform registry and default configuration.
    pub fn new() -> Self {
        Self::with_registry(CodecRegistry::platform())
    }

    pub fn with_registry(registry: CodecRegistry) -> Self {
        Self {
            registry,
            config: CodecConfig::default(),
            cache: EncoderCache::new(),
            stats: DispatchStats::new(),
        }
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn cache(&self) -> &EncoderCache {
        &self.cache
    }

    /// Drop every cached encoder session.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> DispatchCounters {
        self.stats.snapshot()
    }

    /// Read and decode a file.
    pub fn read(&self, path: impl AsRef<Path>, mode: ReadMode) -> Result<PixelBuffer, CodecError> {
        let path = path.as_ref();
        let data = std::fs::read(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "could not open image file");
        })?;
        if data.is_empty() {
            warn!(path = %path.display(), "image file is empty");
            return Err(CodecError::EmptyInput);
        }
        self.decode(&data, mode)
    }

    /// Decode encoded bytes.
    pub fn decode(&self, data: &[u8], mode: ReadMode) -> Result<PixelBuffer, CodecError> {
        DecodeRequest::new(data)
            .with_mode(mode)
            .with_registry(&self.registry)
            .with_codec_config(&self.config)
            .with_stats(&self.stats)
            .decode()
    }

    /// Decode with the integer mode flag (-1, 0, 1).
    pub fn decode_flag(&self, data: &[u8], flag: i32) -> Result<PixelBuffer, CodecError> {
        self.decode(data, ReadMode::try_from(flag)?)
    }

    /// Encode to the format implied by `path`'s extension and write the file.
    ///
    /// The extension is checked before any pixel is touched; nothing is
    /// written unless encoding succeeds.
    pub fn write(
        &mut self,
        path: impl AsRef<Path>,
        view: PixelView<'_>,
        params: &Params,
    ) -> Result<(), CodecError> {
        let path = path.as_ref();
        self.request(EncodeRequest::for_path(path)?, params)
            .write_file(view, path)
    }

    /// Encode to the format named by `ext` and append to `sink`.
    pub fn encode(
        &mut self,
        ext: &str,
        view: PixelView<'_>,
        sink: &mut Vec<u8>,
        params: &Params,
    ) -> Result<(), CodecError> {
        self.request(EncodeRequest::from_extension(ext)?, params)
            .encode_into(view, sink)
    }

    /// Encode to `format`, returning the output and the adapter that made it.
    pub fn encode_format(
        &mut self,
        format: ImageFormat,
        view: PixelView<'_>,
        params: &Params,
    ) -> Result<EncodeOutput, CodecError> {
        self.request(EncodeRequest::new(format), params).encode(view)
    }

    fn request<'a>(
        &'a mut self,
        request: EncodeRequest<'a>,
        params: &'a Params,
    ) -> EncodeRequest<'a> {
        request
            .with_params(params)
            .with_registry(&self.registry)
            .with_codec_config(&self.config)
            .with_cache(&mut self.cache)
            .with_stats(&self.stats)
    }
}
