//! Pixel buffers in canonical channel order.
//!
//! Uses `imgref` for 2D sample storage: a row of `width` pixels is stored as
//! `width * channels` bytes, so strides and sub-images are in bytes.
//!
//! Every 3- and 4-channel buffer handed out by the decoder, and expected by
//! the encoder, stores channels as B, G, R(, A). Codecs speak R, G, B(, A);
//! [`crate::normalize`] is the only place that moves between the two.

use std::borrow::Cow;

pub use imgref::{ImgRef, ImgVec};

use crate::CodecError;

/// Channel count of an 8-bit pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channels {
    /// One luma channel.
    Gray = 1,
    /// Blue, green, red.
    Bgr = 3,
    /// Blue, green, red, alpha.
    Bgra = 4,
}

impl Channels {
    /// Map a raw channel count; anything other than 1, 3, or 4 is rejected.
    pub fn from_count(count: usize) -> Result<Self, CodecError> {
        match count {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Bgr),
            4 => Ok(Channels::Bgra),
            other => Err(CodecError::UnsupportedChannels(other)),
        }
    }

    /// Number of bytes per pixel.
    pub fn count(self) -> usize {
        self as usize
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Channels::Bgra)
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), CodecError> {
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidInput(format!(
            "zero-sized image {width}x{height}"
        )));
    }
    Ok(())
}

fn row_bytes(width: u32, channels: Channels) -> Result<usize, CodecError> {
    (width as usize)
        .checked_mul(channels.count())
        .ok_or_else(|| CodecError::LimitExceeded("row size overflows usize".into()))
}

fn total_bytes(width: u32, height: u32, channels: Channels) -> Result<usize, CodecError> {
    row_bytes(width, channels)?
        .checked_mul(height as usize)
        .ok_or_else(|| CodecError::LimitExceeded("image size overflows usize".into()))
}

/// Owned, contiguous, row-major 8-bit pixel buffer.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    img: ImgVec<u8>,
    channels: Channels,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer.
    pub fn new(width: u32, height: u32, channels: Channels) -> Result<Self, CodecError> {
        check_dimensions(width, height)?;
        let len = total_bytes(width, height, channels)?;
        Self::from_vec(width, height, channels, vec![0u8; len])
    }

    /// Wrap existing bytes, which must hold exactly `width * height * channels`.
    pub fn from_vec(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> Result<Self, CodecError> {
        check_dimensions(width, height)?;
        let expected = total_bytes(width, height, channels)?;
        if data.len() != expected {
            return Err(CodecError::InvalidInput(format!(
                "expected {expected} bytes for {width}x{height}x{}, got {}",
                channels.count(),
                data.len()
            )));
        }
        let row = row_bytes(width, channels)?;
        Ok(Self {
            img: ImgVec::new(data, row, height as usize),
            channels,
        })
    }

    /// Like [`from_vec`](Self::from_vec) but with an unchecked raw channel count.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, CodecError> {
        Self::from_vec(width, height, Channels::from_count(channels)?, data)
    }

    pub fn width(&self) -> u32 {
        (self.img.width() / self.channels.count()) as u32
    }

    pub fn height(&self) -> u32 {
        self.img.height() as u32
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// All samples, row-major, no padding.
    pub fn data(&self) -> &[u8] {
        self.img.buf()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.img.buf_mut()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.img.into_buf()
    }

    /// Bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let row = self.img.width();
        &self.data()[y as usize * row..][..row]
    }

    /// Bytes of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`. See [`get_pixel`](Self::get_pixel).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels.count();
        &self.row(y)[x as usize * c..][..c]
    }

    /// Bytes of the pixel at `(x, y)`, or `None` outside the image.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        (x < self.width() && y < self.height()).then(|| self.pixel(x, y))
    }

    /// Borrow the whole buffer as a view.
    pub fn as_view(&self) -> PixelView<'_> {
        PixelView {
            img: self.img.as_ref(),
            channels: self.channels,
        }
    }

    /// Borrow a rectangular region. The view is strided unless it spans full rows.
    pub fn view(&self, x: u32, y: u32, width: u32, height: u32) -> Result<PixelView<'_>, CodecError> {
        check_dimensions(width, height)?;
        let fits_x = x.checked_add(width).is_some_and(|r| r <= self.width());
        let fits_y = y.checked_add(height).is_some_and(|b| b <= self.height());
        if !fits_x || !fits_y {
            return Err(CodecError::InvalidInput(format!(
                "region {width}x{height}+{x}+{y} outside {}x{}",
                self.width(),
                self.height()
            )));
        }
        let c = self.channels.count();
        let sub = self.img.as_ref().sub_image(
            x as usize * c,
            y as usize,
            width as usize * c,
            height as usize,
        );
        Ok(PixelView {
            img: sub,
            channels: self.channels,
        })
    }

    /// Build from samples whose length the caller has already established.
    pub(crate) fn from_packed(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * channels.count()
        );
        Self {
            img: ImgVec::new(data, width as usize * channels.count(), height as usize),
            channels,
        }
    }

    pub(crate) fn img_mut(&mut self) -> &mut ImgVec<u8> {
        &mut self.img
    }
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.channels == other.channels
            && self.width() == other.width()
            && self.height() == other.height()
            && self.data() == other.data()
    }
}

impl Eq for PixelBuffer {}

impl<'a> From<&'a PixelBuffer> for PixelView<'a> {
    fn from(buffer: &'a PixelBuffer) -> Self {
        buffer.as_view()
    }
}

/// Borrowed, possibly strided view of 8-bit pixels in canonical order.
#[derive(Clone, Copy, Debug)]
pub struct PixelView<'a> {
    img: ImgRef<'a, u8>,
    channels: Channels,
}

impl<'a> PixelView<'a> {
    /// View contiguous row-major bytes.
    pub fn from_slice(
        data: &'a [u8],
        width: u32,
        height: u32,
        channels: Channels,
    ) -> Result<Self, CodecError> {
        let stride = row_bytes(width, channels)?;
        Self::from_strided(data, width, height, stride, channels)
    }

    /// View rows that are `stride` bytes apart.
    pub fn from_strided(
        data: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
        channels: Channels,
    ) -> Result<Self, CodecError> {
        check_dimensions(width, height)?;
        let row = row_bytes(width, channels)?;
        if stride < row {
            return Err(CodecError::InvalidInput(format!(
                "stride {stride} shorter than row of {row} bytes"
            )));
        }
        let needed = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(row))
            .ok_or_else(|| CodecError::LimitExceeded("image size overflows usize".into()))?;
        if data.len() < needed {
            return Err(CodecError::InvalidInput(format!(
                "need {needed} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            img: ImgRef::new_stride(&data[..needed], row, height as usize, stride),
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        (self.img.width() / self.channels.count()) as u32
    }

    pub fn height(&self) -> u32 {
        self.img.height() as u32
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Distance between row starts, in bytes.
    pub fn stride(&self) -> usize {
        self.img.stride()
    }

    /// Whether rows are packed back to back.
    pub fn is_contiguous(&self) -> bool {
        self.img.height() <= 1 || self.img.stride() == self.img.width()
    }

    /// Iterate rows of `width * channels` bytes.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.img.rows()
    }

    /// Packed bytes: borrowed when already contiguous, copied otherwise.
    pub fn to_contiguous(&self) -> Cow<'a, [u8]> {
        let (buf, _, _) = self.img.to_contiguous_buf();
        buf
    }

    /// Copy into an owned buffer.
    pub fn to_buffer(&self) -> PixelBuffer {
        let data = self.to_contiguous().into_owned();
        PixelBuffer {
            img: ImgVec::new(data, self.img.width(), self.img.height()),
            channels: self.channels,
        }
    }
}
