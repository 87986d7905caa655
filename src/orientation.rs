//! EXIF orientation support.
//!
//! Each of the eight EXIF orientations is expressed as a primitive flip
//! followed, for tags 5-8, by a transpose. The composition order is fixed:
//! flipping after transposing gives the mirror-image result.

use crate::pixel::PixelBuffer;

/// EXIF orientation tag values.
///
/// Values match the EXIF Orientation tag (TIFF tag 274).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Orientation {
    /// No rotation or flip needed.
    #[default]
    Normal = 1,
    /// Flip horizontally (mirror left-right).
    FlipHorizontal = 2,
    /// Rotate 180 degrees (flip both axes).
    Rotate180 = 3,
    /// Flip vertically (mirror top-bottom).
    FlipVertical = 4,
    /// Transpose across the main diagonal.
    Transpose = 5,
    /// Vertical flip, then transpose.
    Rotate90 = 6,
    /// Flip both axes, then transpose.
    Transverse = 7,
    /// Horizontal flip, then transpose.
    Rotate270 = 8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flip {
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Orientation {
    /// Create from an EXIF orientation value. Anything outside 1-8 is `None`.
    pub fn from_exif(value: u16) -> Option<Self> {
        Some(match value {
            1 => Self::Normal,
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => return None,
        })
    }

    /// EXIF tag value (1-8).
    pub fn exif_value(self) -> u16 {
        self as u16
    }

    /// Whether this orientation swaps width and height (values 5-8).
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90 | Self::Transverse | Self::Rotate270
        )
    }

    /// Dimensions after [`apply`](Self::apply) for the given stored dimensions.
    pub fn display_dimensions(self, stored_width: u32, stored_height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (stored_height, stored_width)
        } else {
            (stored_width, stored_height)
        }
    }

    pub fn is_identity(self) -> bool {
        matches!(self, Self::Normal)
    }

    fn decompose(self) -> (Flip, bool) {
        match self {
            Self::Normal => (Flip::None, false),
            Self::FlipHorizontal => (Flip::Horizontal, false),
            Self::Rotate180 => (Flip::Both, false),
            Self::FlipVertical => (Flip::Vertical, false),
            Self::Transpose => (Flip::None, true),
            Self::Rotate90 => (Flip::Vertical, true),
            Self::Transverse => (Flip::Both, true),
            Self::Rotate270 => (Flip::Horizontal, true),
        }
    }

    /// Transform `buffer` so it displays upright.
    ///
    /// Channel count and pixel values are preserved; only positions move.
    pub fn apply(self, buffer: PixelBuffer) -> PixelBuffer {
        let (flip, transpose) = self.decompose();
        let mut buffer = buffer;
        match flip {
            Flip::None => {}
            Flip::Horizontal => flip_horizontal(&mut buffer),
            Flip::Vertical => flip_vertical(&mut buffer),
            Flip::Both => {
                flip_horizontal(&mut buffer);
                flip_vertical(&mut buffer);
            }
        }
        if transpose {
            buffer = transposed(&buffer);
        }
        buffer
    }
}

fn flip_horizontal(buffer: &mut PixelBuffer) {
    let c = buffer.channels().count();
    for row in buffer.img_mut().rows_mut() {
        let width = row.len() / c;
        for x in 0..width / 2 {
            let (left, right) = row.split_at_mut((width - 1 - x) * c);
            left[x * c..x * c + c].swap_with_slice(&mut right[..c]);
        }
    }
}

fn flip_vertical(buffer: &mut PixelBuffer) {
    let row = buffer.width() as usize * buffer.channels().count();
    let height = buffer.height() as usize;
    let data = buffer.data_mut();
    for y in 0..height / 2 {
        let (top, bottom) = data.split_at_mut((height - 1 - y) * row);
        top[y * row..y * row + row].swap_with_slice(&mut bottom[..row]);
    }
}

fn transposed(buffer: &PixelBuffer) -> PixelBuffer {
    let (w, h) = (buffer.width() as usize, buffer.height() as usize);
    let c = buffer.channels().count();
    let src = buffer.data();
    let mut out = vec![0u8; src.len()];
    for y in 0..h {
        for x in 0..w {
            let from = (y * w + x) * c;
            let to = (x * h + y) * c;
            out[to..to + c].copy_from_slice(&src[from..from + c]);
        }
    }
    PixelBuffer::from_packed(h as u32, w as u32, buffer.channels(), out)
}

/// Read the orientation tag from encoded bytes.
///
/// Any parse failure, a missing tag, or a value outside 1-8 is `None`.
#[cfg(feature = "exif")]
pub fn read_exif_orientation(data: &[u8]) -> Option<Orientation> {
    let mut cursor = std::io::Cursor::new(data);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    Orientation::from_exif(u16::try_from(value).ok()?)
}

/// Read the orientation tag from encoded bytes (EXIF support not compiled in).
#[cfg(not(feature = "exif"))]
pub fn read_exif_orientation(_data: &[u8]) -> Option<Orientation> {
    None
}
