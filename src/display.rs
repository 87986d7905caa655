//! Minimal image display.
//!
//! The reserved window name [`FRAMEBUFFER_WINDOW`] blits to the Linux
//! framebuffer, letterboxed to the device resolution. Every other name, and
//! every other platform, saves `<name>.png` instead. There is no window
//! system, so [`Display::wait_key`] never sees a key.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Rgb};
use tracing::{debug, info, warn};

use crate::codecs::convert::strip_alpha;
use crate::io::ImageIo;
use crate::params::Params;
use crate::pixel::{Channels, PixelBuffer, PixelView};
use crate::CodecError;

/// Window name that selects the framebuffer on Linux.
pub const FRAMEBUFFER_WINDOW: &str = "fb";

/// Returned by [`Display::wait_key`] when no key was pressed.
pub const NO_KEY: i32 = -1;

const DEFAULT_DEVICE: &str = "/dev/fb0";
const DEFAULT_SYSFS: &str = "/sys/class/graphics/fb0";

/// Where [`Display::show`] sent the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shown {
    Framebuffer,
    File(PathBuf),
}

/// Display surface with an explicit framebuffer lifecycle.
///
/// The framebuffer device is opened on the first `show` to
/// [`FRAMEBUFFER_WINDOW`] and kept until [`release`](Self::release) or drop.
#[derive(Debug)]
pub struct Display {
    device: PathBuf,
    sysfs: PathBuf,
    framebuffer: Option<Framebuffer>,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl Display {
    /// Use `/dev/fb0`, with geometry from `/sys/class/graphics/fb0`.
    pub fn new() -> Self {
        Self::with_device(DEFAULT_DEVICE, DEFAULT_SYSFS)
    }

    /// Use another framebuffer device and its sysfs directory.
    pub fn with_device(device: impl Into<PathBuf>, sysfs: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            sysfs: sysfs.into(),
            framebuffer: None,
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.framebuffer.is_some()
    }

    /// Close the framebuffer device. The next framebuffer `show` reopens it.
    pub fn release(&mut self) {
        if self.framebuffer.take().is_some() {
            debug!(device = %self.device.display(), "framebuffer released");
        }
    }

    /// Show `view` in window `name`.
    pub fn show(
        &mut self,
        io: &mut ImageIo,
        name: &str,
        view: PixelView<'_>,
    ) -> Result<Shown, CodecError> {
        if cfg!(target_os = "linux") && name == FRAMEBUFFER_WINDOW {
            let fb = self.acquire()?;
            let image = prepare(view, fb.width, fb.height)?;
            fb.blit(&image)?;
            return Ok(Shown::Framebuffer);
        }

        let path = PathBuf::from(format!("{name}.png"));
        info!(path = %path.display(), "no display surface, saving image");
        io.write(&path, view, &Params::new())?;
        Ok(Shown::File(path))
    }

    /// Poll for a key press. Always [`NO_KEY`].
    pub fn wait_key(&self, delay_ms: i32) -> i32 {
        debug!(delay_ms, "wait_key stub");
        NO_KEY
    }

    fn acquire(&mut self) -> Result<&mut Framebuffer, CodecError> {
        if self.framebuffer.is_none() {
            let fb = Framebuffer::open(&self.device, &self.sysfs).inspect_err(|e| {
                warn!(device = %self.device.display(), error = %e, "framebuffer unavailable");
            })?;
            debug!(
                device = %self.device.display(),
                width = fb.width,
                height = fb.height,
                bpp = fb.bits_per_pixel,
                "framebuffer acquired"
            );
            self.framebuffer = Some(fb);
        }
        self.framebuffer
            .as_mut()
            .ok_or_else(|| CodecError::Display("framebuffer not acquired".into()))
    }
}

#[derive(Debug)]
struct Framebuffer {
    file: File,
    width: u32,
    height: u32,
    bits_per_pixel: u32,
    stride: usize,
}

fn read_sysfs(dir: &Path, name: &str) -> Result<String, CodecError> {
    let path = dir.join(name);
    std::fs::read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| CodecError::Display(format!("{}: {e}", path.display())))
}

fn parse_number(text: &str, what: &str) -> Result<u32, CodecError> {
    text.trim()
        .parse()
        .map_err(|_| CodecError::Display(format!("bad framebuffer {what} {text:?}")))
}

impl Framebuffer {
    fn open(device: &Path, sysfs: &Path) -> Result<Self, CodecError> {
        let size = read_sysfs(sysfs, "virtual_size")?;
        let (w, h) = size
            .split_once(',')
            .ok_or_else(|| CodecError::Display(format!("bad framebuffer size {size:?}")))?;
        let width = parse_number(w, "width")?;
        let height = parse_number(h, "height")?;
        let bits_per_pixel = parse_number(&read_sysfs(sysfs, "bits_per_pixel")?, "depth")?;
        if !matches!(bits_per_pixel, 16 | 24 | 32) {
            return Err(CodecError::Display(format!(
                "unsupported framebuffer depth {bits_per_pixel}"
            )));
        }
        let packed = width as usize * (bits_per_pixel as usize / 8);
        let stride = match read_sysfs(sysfs, "stride") {
            Ok(s) => parse_number(&s, "stride")? as usize,
            Err(_) => packed,
        };
        if width == 0 || height == 0 || stride < packed {
            return Err(CodecError::Display(format!(
                "bad framebuffer geometry {width}x{height}, stride {stride}"
            )));
        }

        let file = OpenOptions::new()
            .write(true)
            .open(device)
            .map_err(|e| CodecError::Display(format!("{}: {e}", device.display())))?;

        Ok(Self {
            file,
            width,
            height,
            bits_per_pixel,
            stride,
        })
    }

    fn blit(&mut self, image: &PixelBuffer) -> Result<(), CodecError> {
        for y in 0..image.height().min(self.height) {
            let row = pack_row(image.row(y), image.channels(), self.bits_per_pixel);
            self.file.seek(SeekFrom::Start(y as u64 * self.stride as u64))?;
            self.file.write_all(&row)?;
        }
        self.file.flush()?;
        Ok(())
    }
}

/// Convert a gray or BGR row to the framebuffer's pixel layout.
fn pack_row(row: &[u8], channels: Channels, bits_per_pixel: u32) -> Vec<u8> {
    let c = channels.count();
    let mut out = Vec::with_capacity(row.len() / c * (bits_per_pixel as usize / 8));
    for px in row.chunks_exact(c) {
        let (b, g, r) = match channels {
            Channels::Gray => (px[0], px[0], px[0]),
            _ => (px[0], px[1], px[2]),
        };
        match bits_per_pixel {
            16 => {
                let v = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
                out.extend_from_slice(&v.to_le_bytes());
            }
            24 => out.extend_from_slice(&[b, g, r]),
            _ => out.extend_from_slice(&[b, g, r, 0xFF]),
        }
    }
    out
}

/// Drop alpha and letterbox to `width` x `height`.
fn prepare(view: PixelView<'_>, width: u32, height: u32) -> Result<PixelBuffer, CodecError> {
    let mut image = view.to_buffer();
    if image.channels() == Channels::Bgra {
        let bgr = strip_alpha(image.data());
        image = PixelBuffer::from_vec(image.width(), image.height(), Channels::Bgr, bgr)?;
    }
    if image.width() == width && image.height() == height {
        return Ok(image);
    }
    letterbox(&image, width, height)
}

/// Fit inside `width` x `height` preserving aspect ratio, centered on black.
fn letterbox(image: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer, CodecError> {
    let (iw, ih) = (u64::from(image.width()), u64::from(image.height()));
    let (dw, dh) = (u64::from(width), u64::from(height));
    let (fit_w, fit_h) = if iw * dh > dw * ih {
        (dw, (dw * ih / iw).max(1))
    } else {
        ((dh * iw / ih).max(1), dh)
    };
    let (fit_w, fit_h) = (fit_w as u32, fit_h as u32);
    let scaled = resize(image, fit_w, fit_h)?;

    let c = image.channels().count();
    let mut canvas = PixelBuffer::new(width, height, image.channels())?;
    let x0 = ((width - fit_w) / 2) as usize;
    let y0 = ((height - fit_h) / 2) as usize;
    let canvas_row = width as usize * c;
    let data = canvas.data_mut();
    for y in 0..fit_h as usize {
        let src = scaled.row(y as u32);
        let start = (y0 + y) * canvas_row + x0 * c;
        data[start..start + src.len()].copy_from_slice(src);
    }
    Ok(canvas)
}

/// Bilinear resize. Works on BGR as well as RGB since channels are independent.
fn resize(image: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer, CodecError> {
    let (w, h) = (image.width(), image.height());
    let bad_buffer = || CodecError::InvalidInput("pixel buffer does not match its shape".into());
    let data = image.data().to_vec();
    let scaled = match image.channels() {
        Channels::Gray => {
            let src = ImageBuffer::<Luma<u8>, _>::from_raw(w, h, data).ok_or_else(bad_buffer)?;
            imageops::resize(&src, width, height, FilterType::Triangle).into_raw()
        }
        Channels::Bgr => {
            let src = ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, data).ok_or_else(bad_buffer)?;
            imageops::resize(&src, width, height, FilterType::Triangle).into_raw()
        }
        Channels::Bgra => return Err(CodecError::UnsupportedChannels(4)),
    };
    PixelBuffer::from_vec(width, height, image.channels(), scaled)
}
