//! Resource limits.

use crate::CodecError;

/// Resource limits for decode and encode operations.
///
/// Used to prevent resource exhaustion on hostile input. All limits are
/// optional; the default is unlimited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum encoded input size in bytes.
    pub max_input_bytes: Option<u64>,
    /// Maximum decoded pixel buffer allocation in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_max_width(mut self, max: u64) -> Self {
        self.max_width = Some(max);
        self
    }

    pub fn with_max_height(mut self, max: u64) -> Self {
        self.max_height = Some(max);
        self
    }

    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    pub fn with_max_input_bytes(mut self, max: u64) -> Self {
        self.max_input_bytes = Some(max);
        self
    }

    pub fn with_max_memory_bytes(mut self, max: u64) -> Self {
        self.max_memory_bytes = Some(max);
        self
    }

    /// Check if dimensions are within limits.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), CodecError> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err(CodecError::LimitExceeded(format!(
                    "width {width} exceeds limit {max_width}"
                )));
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err(CodecError::LimitExceeded(format!(
                    "height {height} exceeds limit {max_height}"
                )));
            }
        }

        if let Some(max_pixels) = self.max_pixels {
            let pixels = width.saturating_mul(height);
            if pixels > max_pixels {
                return Err(CodecError::LimitExceeded(format!(
                    "pixel count {pixels} exceeds limit {max_pixels}"
                )));
            }
        }

        Ok(())
    }

    /// Check the size of an encoded input.
    pub fn check_input_size(&self, bytes: usize) -> Result<(), CodecError> {
        if let Some(max) = self.max_input_bytes {
            if bytes as u64 > max {
                return Err(CodecError::LimitExceeded(format!(
                    "input of {bytes} bytes exceeds limit {max}"
                )));
            }
        }
        Ok(())
    }

    /// Check if a memory allocation is within limits.
    pub fn check_memory(&self, bytes: u64) -> Result<(), CodecError> {
        if let Some(max) = self.max_memory_bytes {
            if bytes > max {
                return Err(CodecError::LimitExceeded(format!(
                    "allocation of {bytes} bytes exceeds limit {max}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_none() {
        let limits = Limits::none();
        assert!(limits.check_dimensions(u64::MAX, u64::MAX).is_ok());
        assert!(limits.check_input_size(usize::MAX).is_ok());
        assert!(limits.check_memory(u64::MAX).is_ok());
    }

    #[test]
    fn limits_memory() {
        let limits = Limits::none().with_max_memory_bytes(1_000_000);
        assert!(limits.check_memory(1_000_000).is_ok());
        assert!(matches!(
            limits.check_memory(1_000_001),
            Err(CodecError::LimitExceeded(_))
        ));
    }

    #[test]
    fn limits_dimensions() {
        let limits = Limits {
            max_width: Some(1000),
            max_height: Some(1000),
            max_pixels: Some(500_000),
            ..Default::default()
        };

        assert!(limits.check_dimensions(1000, 1000).is_err()); // 1M pixels > 500k
        assert!(limits.check_dimensions(500, 500).is_ok()); // 250k pixels
        assert!(limits.check_dimensions(2000, 500).is_err()); // width > 1000
        assert!(limits.check_dimensions(10, 2000).is_err());
    }

    #[test]
    fn limits_input() {
        let limits = Limits::none().with_max_input_bytes(1_000);
        assert!(limits.check_input_size(1_000).is_ok());
        assert!(matches!(
            limits.check_input_size(1_001),
            Err(CodecError::LimitExceeded(_))
        ));
    }
}
