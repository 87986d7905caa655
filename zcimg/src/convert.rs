//! Decode, then re-encode to the format named by the output extension.

use anyhow::Context;
use zenimgio::{CodecConfig, ImageIo, Params};

use crate::ConvertArgs;

/// Run the `convert` subcommand.
pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let mut io =
        ImageIo::new().with_config(CodecConfig::default().with_auto_orient(args.auto_orient));

    let image = io
        .read(&args.input, args.mode.into())
        .with_context(|| format!("decoding {}", args.input.display()))?;

    let params = match args.quality {
        Some(q) => Params::new().with_jpeg_quality(q),
        None => Params::new(),
    };
    io.write(&args.output, image.as_view(), &params)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let stats = io.stats();
    tracing::debug!(?stats, "dispatch counters");
    eprintln!(
        "{} -> {} ({}x{}, {} channels)",
        args.input.display(),
        args.output.display(),
        image.width(),
        image.height(),
        image.channels().count()
    );
    Ok(())
}
