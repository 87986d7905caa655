//! Encode parameter lists.
//!
//! A parameter list is an ordered sequence of `(key, value)` integer pairs.
//! Lookups return the first pair whose key matches; later duplicates are
//! ignored. JPEG quality is the only key the dispatcher reads.

/// Key for JPEG quality, 0-100. The range is passed through unchecked.
pub const JPEG_QUALITY: i32 = 1;

/// Quality used when no `JPEG_QUALITY` pair is present.
pub const DEFAULT_JPEG_QUALITY: i32 = 95;

/// Ordered `(key, value)` encode options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(i32, i32)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret `[k0, v0, k1, v1, ...]`. A trailing key without a value is dropped.
    pub fn from_flat(flat: &[i32]) -> Self {
        Self {
            pairs: flat.chunks_exact(2).map(|kv| (kv[0], kv[1])).collect(),
        }
    }

    /// Append a pair.
    #[must_use]
    pub fn with(mut self, key: i32, value: i32) -> Self {
        self.pairs.push((key, value));
        self
    }

    /// Shorthand for `with(JPEG_QUALITY, quality)`.
    #[must_use]
    pub fn with_jpeg_quality(self, quality: i32) -> Self {
        self.with(JPEG_QUALITY, quality)
    }

    /// Value of the first pair with `key`.
    pub fn get(&self, key: i32) -> Option<i32> {
        self.pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// JPEG quality, or `default` when the list has none.
    pub fn jpeg_quality(&self, default: i32) -> i32 {
        self.get(JPEG_QUALITY).unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.pairs.iter().copied()
    }
}

impl FromIterator<(i32, i32)> for Params {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quality() {
        assert_eq!(Params::new().jpeg_quality(DEFAULT_JPEG_QUALITY), 95);
        assert_eq!(Params::new().with(7, 3).jpeg_quality(80), 80);
    }

    #[test]
    fn first_match_wins() {
        let params = Params::new().with_jpeg_quality(60).with_jpeg_quality(10);
        assert_eq!(params.jpeg_quality(95), 60);
    }

    #[test]
    fn flat_pairs() {
        let params = Params::from_flat(&[9, 1, JPEG_QUALITY, 42, JPEG_QUALITY]);
        assert_eq!(params.iter().count(), 2);
        assert_eq!(params.get(9), Some(1));
        assert_eq!(params.jpeg_quality(95), 42);
    }

    #[test]
    fn out_of_range_passes_through() {
        assert_eq!(Params::from_flat(&[JPEG_QUALITY, 250]).jpeg_quality(95), 250);
    }
}
