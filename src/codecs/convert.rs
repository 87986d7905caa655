//! Desired-channel conversion for software decodes.
//!
//! Follows the classic stb_image rules: gray is replicated into color,
//! color collapses to gray with an integer luma, alpha is dropped or
//! filled with 255.

use rgb::{RGB8, RGBA8};

use super::RawImage;
use crate::CodecError;

/// Integer BT.601 luma, weights summing to 256.
#[inline]
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * u32::from(r) + 150 * u32::from(g) + 29 * u32::from(b)) >> 8) as u8
}

/// Convert to `desired` channels. 0 keeps the source layout.
pub(crate) fn to_desired(raw: RawImage, desired: usize) -> Result<RawImage, CodecError> {
    if desired == 0 || desired == raw.channels {
        return Ok(raw);
    }
    let pixels = match (raw.channels, desired) {
        (2, 1) => raw.pixels.chunks_exact(2).map(|ga| ga[0]).collect(),
        (3, 1) => {
            let rgb: &[RGB8] = bytemuck::cast_slice(&raw.pixels);
            rgb.iter().map(|p| luma(p.r, p.g, p.b)).collect()
        }
        (4, 1) => {
            let rgba: &[RGBA8] = bytemuck::cast_slice(&raw.pixels);
            rgba.iter().map(|p| luma(p.r, p.g, p.b)).collect()
        }
        (1, 3) => raw.pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        (2, 3) => raw
            .pixels
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0]])
            .collect(),
        (4, 3) => strip_alpha(&raw.pixels),
        (1, 4) => raw.pixels.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        (2, 4) => raw
            .pixels
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
            .collect(),
        (3, 4) => {
            let rgb: &[RGB8] = bytemuck::cast_slice(&raw.pixels);
            let rgba: Vec<RGBA8> = rgb.iter().map(|p| RGBA8::new(p.r, p.g, p.b, 255)).collect();
            bytemuck::cast_slice(&rgba).to_vec()
        }
        (from, to) => {
            return Err(CodecError::InvalidInput(format!(
                "cannot convert {from} channels to {to}"
            )));
        }
    };
    Ok(RawImage {
        channels: desired,
        pixels,
        ..raw
    })
}

/// Drop the fourth channel of packed 4-channel samples.
pub(crate) fn strip_alpha(pixels: &[u8]) -> Vec<u8> {
    let rgba: &[RGBA8] = bytemuck::cast_slice(pixels);
    let rgb: Vec<RGB8> = rgba.iter().map(|p| RGB8::new(p.r, p.g, p.b)).collect();
    bytemuck::cast_slice(&rgb).to_vec()
}
