//! Dispatch counters.
//!
//! Fallthrough is silent by contract, so these counters are the only way to
//! see how often hardware adapters are skipped or misbehave.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated by the dispatchers.
#[derive(Debug, Default)]
pub struct DispatchStats {
    hw_decode_attempts: AtomicU64,
    hw_decode_fallthroughs: AtomicU64,
    hw_decode_bad_channels: AtomicU64,
    hw_encode_attempts: AtomicU64,
    hw_encode_fallthroughs: AtomicU64,
    encoder_inits: AtomicU64,
    encoder_cache_hits: AtomicU64,
    sw_decodes: AtomicU64,
    sw_encodes: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchCounters {
    /// Hardware decode adapters whose predicate accepted the input.
    pub hw_decode_attempts: u64,
    /// Hardware decode attempts that failed at some lifecycle step.
    pub hw_decode_fallthroughs: u64,
    /// Hardware decodes that reported a channel count other than 1 or 3.
    pub hw_decode_bad_channels: u64,
    /// Hardware encode adapters whose predicate accepted the input.
    pub hw_encode_attempts: u64,
    /// Hardware encode attempts that failed.
    pub hw_encode_fallthroughs: u64,
    /// Encoder sessions created.
    pub encoder_inits: u64,
    /// Encodes served by a cached session.
    pub encoder_cache_hits: u64,
    /// Decodes that reached the software codec.
    pub sw_decodes: u64,
    /// Encodes that reached the software codec.
    pub sw_encodes: u64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DispatchCounters {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        DispatchCounters {
            hw_decode_attempts: get(&self.hw_decode_attempts),
            hw_decode_fallthroughs: get(&self.hw_decode_fallthroughs),
            hw_decode_bad_channels: get(&self.hw_decode_bad_channels),
            hw_encode_attempts: get(&self.hw_encode_attempts),
            hw_encode_fallthroughs: get(&self.hw_encode_fallthroughs),
            encoder_inits: get(&self.encoder_inits),
            encoder_cache_hits: get(&self.encoder_cache_hits),
            sw_decodes: get(&self.sw_decodes),
            sw_encodes: get(&self.sw_encodes),
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for c in [
            &self.hw_decode_attempts,
            &self.hw_decode_fallthroughs,
            &self.hw_decode_bad_channels,
            &self.hw_encode_attempts,
            &self.hw_encode_fallthroughs,
            &self.encoder_inits,
            &self.encoder_cache_hits,
            &self.sw_decodes,
            &self.sw_encodes,
        ] {
            c.store(0, Ordering::Relaxed);
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn hw_decode_attempt(&self) {
        Self::bump(&self.hw_decode_attempts);
    }

    pub(crate) fn hw_decode_fallthrough(&self) {
        Self::bump(&self.hw_decode_fallthroughs);
    }

    pub(crate) fn hw_decode_bad_channels(&self) {
        Self::bump(&self.hw_decode_bad_channels);
    }

    pub(crate) fn hw_encode_attempt(&self) {
        Self::bump(&self.hw_encode_attempts);
    }

    pub(crate) fn hw_encode_fallthrough(&self) {
        Self::bump(&self.hw_encode_fallthroughs);
    }

    pub(crate) fn encoder_init(&self) {
        Self::bump(&self.encoder_inits);
    }

    pub(crate) fn encoder_cache_hit(&self) {
        Self::bump(&self.encoder_cache_hits);
    }

    pub(crate) fn sw_decode(&self) {
        Self::bump(&self.sw_decodes);
    }

    pub(crate) fn sw_encode(&self) {
        Self::bump(&self.sw_encodes);
    }
}
