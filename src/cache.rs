//! Encoder cache for hardware adapters with [`InstancePolicy::Cached`].
//!
//! [`InstancePolicy::Cached`]: crate::codecs::InstancePolicy::Cached

use std::collections::HashMap;
use std::fmt;

use crate::codecs::{EncoderKey, JpegEncodeSession};

struct Entry {
    key: EncoderKey,
    session: Box<dyn JpegEncodeSession>,
}

/// At most one live encoder session per adapter, tagged with the
/// `(width, height, channels, quality)` it was created for.
///
/// Not thread-safe: sessions are not required to be `Send`, and the encode
/// dispatcher takes the cache by `&mut`. Share it behind a `Mutex` together
/// with its owner if several threads must encode.
#[derive(Default)]
pub struct EncoderCache {
    entries: HashMap<&'static str, Entry>,
}

impl EncoderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session cached for `adapter`, only if it was created for `key`.
    pub fn get_mut(
        &mut self,
        adapter: &'static str,
        key: &EncoderKey,
    ) -> Option<&mut (dyn JpegEncodeSession + 'static)> {
        match self.entries.get_mut(adapter) {
            Some(entry) if entry.key == *key => Some(entry.session.as_mut()),
            _ => None,
        }
    }

    /// Store `session` for `adapter`, dropping any previous one.
    pub fn insert(
        &mut self,
        adapter: &'static str,
        key: EncoderKey,
        session: Box<dyn JpegEncodeSession>,
    ) {
        self.entries.insert(adapter, Entry { key, session });
    }

    /// Key of the session cached for `adapter`.
    pub fn key(&self, adapter: &str) -> Option<EncoderKey> {
        self.entries.get(adapter).map(|e| e.key)
    }

    pub fn contains(&self, adapter: &str) -> bool {
        self.entries.contains_key(adapter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached session.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for EncoderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, e)| (name, e.key)))
            .finish()
    }
}
