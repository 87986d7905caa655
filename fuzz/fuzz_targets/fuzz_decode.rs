#![no_main]

use libfuzzer_sys::fuzz_target;
use zenimgio::{CodecRegistry, DecodeRequest, Limits, ReadMode};

fuzz_target!(|data: &[u8]| {
    let registry = CodecRegistry::software_only();
    // keep decoded allocations bounded
    let limits = Limits::none()
        .with_max_pixels(1 << 22)
        .with_max_width(8192)
        .with_max_height(8192);

    for mode in [ReadMode::Unchanged, ReadMode::Grayscale, ReadMode::Color] {
        if let Ok(image) = DecodeRequest::new(data)
            .with_mode(mode)
            .with_registry(&registry)
            .with_limits(&limits)
            .decode()
        {
            let expected = image.width() as usize
                * image.height() as usize
                * image.channels().count();
            assert_eq!(image.data().len(), expected);
        }
    }
});
