//! Channel order normalization between codec order and canonical order.
//!
//! Codecs produce and consume R, G, B(, A). Buffers everywhere else in the
//! crate are B, G, R(, A). The permutation is a red/blue swap, so the two
//! directions are the same operation and each is the other's inverse.
//! One-channel data passes through untouched.

use rgb::{RGB8, RGBA8};

use crate::pixel::{Channels, PixelBuffer};

/// Swap red and blue in packed samples of the given channel count.
///
/// A trailing partial pixel is left untouched.
pub(crate) fn swap_red_blue(samples: &mut [u8], channels: Channels) {
    let whole = samples.len() - samples.len() % channels.count();
    let samples = &mut samples[..whole];
    match channels {
        Channels::Gray => {}
        Channels::Bgr => {
            let pixels: &mut [RGB8] = bytemuck::cast_slice_mut(samples);
            for px in pixels {
                core::mem::swap(&mut px.r, &mut px.b);
            }
        }
        Channels::Bgra => {
            let pixels: &mut [RGBA8] = bytemuck::cast_slice_mut(samples);
            for px in pixels {
                core::mem::swap(&mut px.r, &mut px.b);
            }
        }
    }
}

/// Convert codec-order samples (RGB/RGBA) in place to canonical order.
///
/// Bytes past the last whole pixel are left as they are.
pub fn codec_to_canonical(samples: &mut [u8], channels: Channels) {
    swap_red_blue(samples, channels);
}

/// Convert canonical samples (BGR/BGRA) in place to codec order.
///
/// Bytes past the last whole pixel are left as they are.
pub fn canonical_to_codec(samples: &mut [u8], channels: Channels) {
    swap_red_blue(samples, channels);
}

/// Reinterpret a buffer filled by a codec as canonical order.
pub fn to_canonical(buffer: &mut PixelBuffer) {
    let channels = buffer.channels();
    codec_to_canonical(buffer.data_mut(), channels);
}

/// Reorder a canonical buffer for handing to a codec.
pub fn to_codec_order(buffer: &mut PixelBuffer) {
    let channels = buffer.channels();
    canonical_to_codec(buffer.data_mut(), channels);
}
