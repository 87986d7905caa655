//! Encode/decode round-trips through the software codecs.

#![cfg(all(feature = "jpeg", feature = "png", feature = "bmp"))]

use std::path::PathBuf;

use zenimgio::*;

fn noise_pattern(w: u32, h: u32, channels: Channels) -> PixelBuffer {
    let mut pixels = vec![0u8; (w * h) as usize * channels.count()];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    PixelBuffer::from_vec(w, h, channels, pixels).unwrap()
}

fn software_io() -> ImageIo {
    ImageIo::with_registry(CodecRegistry::software_only())
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("zenimgio-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Insert an APP1 EXIF segment carrying only an orientation tag after SOI.
fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2A\x00");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes()); // SHORT
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut app1 = Vec::new();
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&tiff);

    let mut out = Vec::new();
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

// ── Lossless formats ─────────────────────────────────────────────────

#[test]
fn lossless_roundtrip_all_channel_counts() {
    let mut io = software_io();
    for ext in [".png", ".bmp"] {
        for channels in [Channels::Gray, Channels::Bgr, Channels::Bgra] {
            // gray BMP decodes as color
            if ext == ".bmp" && channels == Channels::Gray {
                continue;
            }
            let image = noise_pattern(7, 5, channels);
            let mut encoded = Vec::new();
            io.encode(ext, image.as_view(), &mut encoded, &Params::new())
                .unwrap();
            let decoded = io.decode(&encoded, ReadMode::Unchanged).unwrap();
            assert_eq!(decoded, image, "{ext} {channels:?}");
        }
    }
}

#[test]
fn png_stores_rgb_order() {
    let mut io = software_io();
    let image = PixelBuffer::from_vec(1, 1, Channels::Bgr, vec![10, 20, 30]).unwrap();
    let mut encoded = Vec::new();
    io.encode("png", image.as_view(), &mut encoded, &Params::new())
        .unwrap();

    let decoder = png::Decoder::new(std::io::Cursor::new(&encoded[..]));
    let mut reader = decoder.read_info().unwrap();
    let mut raw = vec![0u8; reader.output_buffer_size().unwrap()];
    reader.next_frame(&mut raw).unwrap();
    assert_eq!(&raw[..3], &[30, 20, 10]);
}

#[test]
fn strided_region_roundtrip() {
    let mut io = software_io();
    let image = noise_pattern(10, 8, Channels::Bgr);
    let region = image.view(2, 3, 5, 4).unwrap();
    let mut encoded = Vec::new();
    io.encode(".png", region, &mut encoded, &Params::new()).unwrap();
    let decoded = io.decode(&encoded, ReadMode::Unchanged).unwrap();
    assert_eq!(decoded, region.to_buffer());
}

// ── JPEG ─────────────────────────────────────────────────────────────

#[test]
fn jpeg_roundtrip_keeps_shape() {
    let mut io = software_io();
    let image = PixelBuffer::from_vec(24, 16, Channels::Bgr, vec![120; 24 * 16 * 3]).unwrap();
    let mut encoded = Vec::new();
    io.encode(".JPG", image.as_view(), &mut encoded, &Params::new())
        .unwrap();
    let decoded = io.decode(&encoded, ReadMode::Unchanged).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (24, 16));
    assert_eq!(decoded.channels(), Channels::Bgr);
    assert!(decoded.data().iter().all(|&v| v.abs_diff(120) <= 4));
}

#[test]
fn jpeg_keeps_color_channel_order() {
    let mut io = software_io();
    // saturated blue in canonical order
    let pixel = [255u8, 0, 0];
    let data: Vec<u8> = pixel.iter().copied().cycle().take(16 * 16 * 3).collect();
    let image = PixelBuffer::from_vec(16, 16, Channels::Bgr, data).unwrap();
    let mut encoded = Vec::new();
    io.encode(".jpeg", image.as_view(), &mut encoded, &Params::new().with_jpeg_quality(98))
        .unwrap();
    let decoded = io.decode(&encoded, ReadMode::Color).unwrap();
    let px = decoded.pixel(8, 8);
    assert!(px[0] > 200 && px[2] < 60, "{px:?}");
}

#[test]
fn jpeg_quality_changes_output() {
    let mut io = software_io();
    let image = noise_pattern(32, 32, Channels::Bgr);
    let mut low = Vec::new();
    let mut high = Vec::new();
    io.encode("jpg", image.as_view(), &mut low, &Params::new().with_jpeg_quality(10))
        .unwrap();
    io.encode("jpg", image.as_view(), &mut high, &Params::from_flat(&[params::JPEG_QUALITY, 100]))
        .unwrap();
    assert!(low.len() < high.len());
}

#[test]
fn bgra_jpeg_drops_alpha() {
    let mut io = software_io();
    let image = noise_pattern(8, 8, Channels::Bgra);
    let mut encoded = Vec::new();
    io.encode("jpg", image.as_view(), &mut encoded, &Params::new())
        .unwrap();
    let decoded = io.decode(&encoded, ReadMode::Unchanged).unwrap();
    assert_eq!(decoded.channels(), Channels::Bgr);
}

// ── Read modes ───────────────────────────────────────────────────────

#[test]
fn grayscale_mode_on_color_source() {
    let mut io = software_io();
    let image = noise_pattern(9, 9, Channels::Bgr);
    for ext in [".png", ".bmp", ".jpg"] {
        let mut encoded = Vec::new();
        io.encode(ext, image.as_view(), &mut encoded, &Params::new())
            .unwrap();
        let decoded = io.decode(&encoded, ReadMode::Grayscale).unwrap();
        assert_eq!(decoded.channels(), Channels::Gray, "{ext}");
        assert_eq!((decoded.width(), decoded.height()), (9, 9));
    }
}

#[test]
fn color_mode_on_gray_source() {
    let mut io = software_io();
    let image = noise_pattern(4, 4, Channels::Gray);
    let mut encoded = Vec::new();
    io.encode(".png", image.as_view(), &mut encoded, &Params::new())
        .unwrap();
    let decoded = io.decode(&encoded, ReadMode::Color).unwrap();
    assert_eq!(decoded.channels(), Channels::Bgr);
    let g = image.pixel(1, 2)[0];
    assert_eq!(decoded.pixel(1, 2), &[g, g, g]);
}

#[test]
fn color_mode_drops_alpha() {
    let mut io = software_io();
    let image = noise_pattern(3, 3, Channels::Bgra);
    let mut encoded = Vec::new();
    io.encode(".png", image.as_view(), &mut encoded, &Params::new())
        .unwrap();
    let decoded = io.decode(&encoded, ReadMode::Color).unwrap();
    assert_eq!(decoded.channels(), Channels::Bgr);
    assert_eq!(decoded.pixel(2, 2), &image.pixel(2, 2)[..3]);
}

#[test]
fn gray_alpha_unchanged_is_rejected() {
    let mut encoded = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut encoded, 2, 1);
        encoder.set_color(png::ColorType::GrayscaleAlpha);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[10, 255, 20, 128]).unwrap();
    }
    let io = software_io();
    assert!(matches!(
        io.decode(&encoded, ReadMode::Unchanged),
        Err(CodecError::UnsupportedChannels(2))
    ));
    let color = io.decode(&encoded, ReadMode::Color).unwrap();
    assert_eq!(color.data(), &[10, 10, 10, 20, 20, 20]);
}

// ── Orientation ──────────────────────────────────────────────────────

#[cfg(feature = "exif")]
#[test]
fn exif_orientation_applied_on_decode() {
    let mut io = software_io();
    // left half white, right half black
    let mut data = vec![0u8; 16 * 8];
    for row in data.chunks_exact_mut(16) {
        row[..8].fill(255);
    }
    let image = PixelBuffer::from_vec(16, 8, Channels::Gray, data).unwrap();
    let mut jpeg = Vec::new();
    io.encode(".jpg", image.as_view(), &mut jpeg, &Params::new())
        .unwrap();

    let upright = io.decode(&with_exif_orientation(&jpeg, 1), ReadMode::Grayscale).unwrap();
    assert_eq!((upright.width(), upright.height()), (16, 8));

    // vertical flip then transpose: the left half ends up on top
    let rotated = io.decode(&with_exif_orientation(&jpeg, 6), ReadMode::Grayscale).unwrap();
    assert_eq!((rotated.width(), rotated.height()), (8, 16));
    assert!(rotated.pixel(4, 2)[0] > 200);
    assert!(rotated.pixel(4, 13)[0] < 50);

    // out-of-range tags are ignored
    let ignored = io.decode(&with_exif_orientation(&jpeg, 9), ReadMode::Grayscale).unwrap();
    assert_eq!((ignored.width(), ignored.height()), (16, 8));
}

#[test]
fn auto_orient_can_be_disabled() {
    let mut io = software_io().with_config(CodecConfig::default().with_auto_orient(false));
    let image = noise_pattern(16, 8, Channels::Gray);
    let mut jpeg = Vec::new();
    io.encode(".jpg", image.as_view(), &mut jpeg, &Params::new())
        .unwrap();
    let decoded = io.decode(&with_exif_orientation(&jpeg, 6), ReadMode::Unchanged).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 8));
}

// ── Corrupt input ────────────────────────────────────────────────────

#[test]
fn corrupt_inputs_fail_cleanly() {
    let io = software_io();
    let mut inputs: Vec<Vec<u8>> = vec![
        vec![],
        vec![0xFF, 0xD8, 0xFF],
        vec![1, 2, 3],
        b"BM".to_vec(),
        b"\x89PNG\r\n\x1a\n".to_vec(),
    ];
    let mut garbage = vec![0xFF, 0xD8];
    garbage.extend((0..200u32).map(|i| (i * 37 % 251) as u8));
    inputs.push(garbage);

    for input in &inputs {
        for mode in [ReadMode::Unchanged, ReadMode::Grayscale, ReadMode::Color] {
            assert!(io.decode(input, mode).is_err(), "{input:?} {mode:?}");
        }
    }
}

/// A BMP header claiming `width` x `height` at 24 bpp, followed by one pixel.
fn bmp_header_only(width: i32, height: i32) -> Vec<u8> {
    let mut bmp = Vec::new();
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&57u32.to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes());
    bmp.extend_from_slice(&54u32.to_le_bytes());
    bmp.extend_from_slice(&40u32.to_le_bytes());
    bmp.extend_from_slice(&width.to_le_bytes());
    bmp.extend_from_slice(&height.to_le_bytes());
    bmp.extend_from_slice(&1u16.to_le_bytes());
    bmp.extend_from_slice(&24u16.to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    bmp.extend_from_slice(&0u32.to_le_bytes());
    bmp.extend_from_slice(&2835i32.to_le_bytes());
    bmp.extend_from_slice(&2835i32.to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes());
    bmp.extend_from_slice(&[1, 2, 3]);
    bmp
}

#[test]
fn huge_claimed_dimensions_fail_cleanly() {
    let bmp = bmp_header_only(60_000, 60_000);
    assert_eq!(bmp.len(), 57);

    let io = ImageIo::new();
    for mode in [ReadMode::Unchanged, ReadMode::Grayscale, ReadMode::Color] {
        assert!(io.decode(&bmp, mode).is_err(), "{mode:?}");
    }

    let limits = Limits::none().with_max_memory_bytes(1 << 20);
    assert!(matches!(
        DecodeRequest::new(&bmp).with_limits(&limits).decode(),
        Err(CodecError::LimitExceeded(_))
    ));
}

#[test]
fn memory_limit_applies_to_png() {
    let mut io = software_io();
    let image = noise_pattern(64, 64, Channels::Bgr);
    let mut encoded = Vec::new();
    io.encode(".png", image.as_view(), &mut encoded, &Params::new())
        .unwrap();

    let limits = Limits::none().with_max_memory_bytes(64 * 64 * 3 - 1);
    assert!(matches!(
        DecodeRequest::new(&encoded)
            .with_registry(io.registry())
            .with_limits(&limits)
            .decode(),
        Err(CodecError::LimitExceeded(_))
    ));
}

// ── PNM (decode only) ────────────────────────────────────────────────

#[cfg(feature = "pnm")]
#[test]
fn pnm_decodes_to_canonical_order() {
    let io = software_io();

    let gray = io.decode(b"P5\n2 1\n255\n\x10\x20", ReadMode::Unchanged).unwrap();
    assert_eq!(gray.channels(), Channels::Gray);
    assert_eq!(gray.data(), &[0x10, 0x20]);

    let color = io.decode(b"P6\n1 1\n255\n\x0A\x14\x1E", ReadMode::Unchanged).unwrap();
    assert_eq!(color.channels(), Channels::Bgr);
    assert_eq!(color.data(), &[30, 20, 10]);

    let widened = io.decode(b"P5\n2 1\n255\n\x10\x20", ReadMode::Color).unwrap();
    assert_eq!(widened.data(), &[0x10, 0x10, 0x10, 0x20, 0x20, 0x20]);

    let ascii = io.decode(b"P2\n2 2\n255\n1 2\n3 4\n", ReadMode::Grayscale).unwrap();
    assert_eq!(ascii.data(), &[1, 2, 3, 4]);
}

#[cfg(feature = "pnm")]
#[test]
fn pnm_is_never_written() {
    let mut io = software_io();
    let image = noise_pattern(2, 2, Channels::Gray);
    assert!(matches!(
        io.encode_format(ImageFormat::Pnm, image.as_view(), &Params::new()),
        Err(CodecError::UnsupportedFormat(ImageFormat::Pnm))
    ));
    let mut sink = Vec::new();
    assert!(matches!(
        io.encode(".ppm", image.as_view(), &mut sink, &Params::new()),
        Err(CodecError::UnrecognizedExtension(_))
    ));
    assert!(sink.is_empty());
}

// ── Files ────────────────────────────────────────────────────────────

#[test]
fn file_roundtrip() {
    let dir = temp_dir("files");
    let mut io = software_io();
    let image = noise_pattern(6, 4, Channels::Bgra);
    let path = dir.join("out.PNG");
    io.write(&path, image.as_view(), &Params::new()).unwrap();
    assert_eq!(io.read(&path, ReadMode::Unchanged).unwrap(), image);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unrecognized_extension_writes_nothing() {
    let dir = temp_dir("tiff");
    let mut io = software_io();
    let image = noise_pattern(2, 2, Channels::Bgr);

    let tiff = dir.join("out.tiff");
    assert!(matches!(
        io.write(&tiff, image.as_view(), &Params::new()),
        Err(CodecError::UnrecognizedExtension(_))
    ));
    assert!(!tiff.exists());

    let bare = dir.join("out");
    assert!(matches!(
        io.write(&bare, image.as_view(), &Params::new()),
        Err(CodecError::MissingExtension(_))
    ));
    assert!(!bare.exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn empty_file_is_rejected() {
    let dir = temp_dir("empty");
    let path = dir.join("empty.png");
    std::fs::write(&path, b"").unwrap();
    assert!(matches!(
        software_io().read(&path, ReadMode::Color),
        Err(CodecError::EmptyInput)
    ));
    std::fs::remove_dir_all(&dir).ok();
}
