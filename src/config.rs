//! Codec configuration and re-exports.
//!
//! [`CodecConfig`] bundles the defaults the dispatchers fall back to when a
//! request does not override them.

use crate::limits::Limits;
use crate::params::DEFAULT_JPEG_QUALITY;

/// PNG configuration types from png crate.
#[cfg(feature = "png")]
pub mod png_codec {
    pub use png::{Compression, Filter};
}

/// Defaults applied by [`ImageIo`](crate::ImageIo) and the request builders.
///
/// # Example
///
/// ```
/// use zenimgio::{CodecConfig, Limits};
///
/// let config = CodecConfig::default()
///     .with_jpeg_quality(85)
///     .with_auto_orient(false)
///     .with_limits(Limits::none().with_max_pixels(64 * 1024 * 1024));
/// assert_eq!(config.default_jpeg_quality, 85);
/// ```
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct CodecConfig {
    /// JPEG quality when the parameter list has none.
    pub default_jpeg_quality: i32,

    /// PNG compression level.
    #[cfg(feature = "png")]
    pub png_compression: Option<png::Compression>,

    /// PNG filter strategy.
    #[cfg(feature = "png")]
    pub png_filter: Option<png::Filter>,

    /// Apply the EXIF orientation after a software decode.
    pub auto_orient: bool,

    /// Resource limits.
    pub limits: Limits,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_jpeg_quality: DEFAULT_JPEG_QUALITY,
            #[cfg(feature = "png")]
            png_compression: None,
            #[cfg(feature = "png")]
            png_filter: None,
            auto_orient: true,
            limits: Limits::none(),
        }
    }
}

impl CodecConfig {
    pub fn with_jpeg_quality(mut self, quality: i32) -> Self {
        self.default_jpeg_quality = quality;
        self
    }

    /// Set PNG compression level.
    #[cfg(feature = "png")]
    pub fn with_png_compression(mut self, compression: png::Compression) -> Self {
        self.png_compression = Some(compression);
        self
    }

    /// Set PNG filter strategy.
    #[cfg(feature = "png")]
    pub fn with_png_filter(mut self, filter: png::Filter) -> Self {
        self.png_filter = Some(filter);
        self
    }

    pub fn with_auto_orient(mut self, enabled: bool) -> Self {
        self.auto_orient = enabled;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.default_jpeg_quality, 95);
        assert!(config.auto_orient);
        assert_eq!(config.limits, Limits::none());
    }
}
