//! Show an image on the framebuffer, or save it when there is none.

use anyhow::Context;
use zenimgio::{Display, ImageIo, ReadMode, Shown};

use crate::ShowArgs;

/// Run the `show` subcommand.
pub fn run(args: ShowArgs) -> anyhow::Result<()> {
    let mut io = ImageIo::new();
    let image = io
        .read(&args.input, ReadMode::Color)
        .with_context(|| format!("decoding {}", args.input.display()))?;

    let mut display = Display::new();
    match display.show(&mut io, &args.window, image.as_view())? {
        Shown::Framebuffer => eprintln!("shown on framebuffer"),
        Shown::File(path) => eprintln!("saved {}", path.display()),
    }
    display.wait_key(args.wait);
    Ok(())
}
