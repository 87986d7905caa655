//! Image inspection.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use zenimgio::orientation::read_exif_orientation;
use zenimgio::{ImageFormat, ImageIo, ReadMode};

use crate::InfoArgs;

/// Run the `info` subcommand.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let files = expand_inputs(&args.files)?;

    if files.is_empty() {
        anyhow::bail!("no image files found");
    }

    let io = ImageIo::new();
    let multi = files.len() > 1;

    for (i, path) in files.iter().enumerate() {
        if multi && !args.json {
            if i > 0 {
                println!();
            }
            println!("{}:", path.display());
        }

        match inspect_file(&io, path) {
            Ok(info) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    print_info(&info);
                }
            }
            Err(e) => {
                eprintln!("  error: {e}");
            }
        }
    }

    Ok(())
}

/// Expand glob patterns and plain paths, dropping duplicates.
fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let candidates: Vec<PathBuf> =
            if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
                glob::glob(pattern)?.collect::<Result<_, _>>()?
            } else {
                let path = PathBuf::from(pattern);
                if !path.is_file() {
                    anyhow::bail!("not a file: {}", path.display());
                }
                vec![path]
            };

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            if let Ok(canonical) = path.canonicalize() {
                if seen.insert(canonical) {
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}

/// Decode a single file and return structured info.
fn inspect_file(io: &ImageIo, path: &Path) -> anyhow::Result<ImageInfoDisplay> {
    let data = std::fs::read(path)?;
    let format = ImageFormat::detect(&data)
        .ok_or_else(|| anyhow::anyhow!("unrecognized image format"))?;
    let image = io.decode(&data, ReadMode::Unchanged)?;
    let orientation = read_exif_orientation(&data).map_or(1, |o| o.exif_value());

    Ok(ImageInfoDisplay {
        path: path.display().to_string(),
        format: format!("{format:?}"),
        mime_type: format.mime_type().to_string(),
        width: image.width(),
        height: image.height(),
        channels: image.channels().count(),
        has_alpha: image.channels().has_alpha(),
        orientation,
        file_size: data.len() as u64,
    })
}

#[derive(Debug, Serialize)]
struct ImageInfoDisplay {
    path: String,
    format: String,
    mime_type: String,
    /// Dimensions after orientation.
    width: u32,
    height: u32,
    channels: usize,
    has_alpha: bool,
    orientation: u16,
    file_size: u64,
}

fn print_info(info: &ImageInfoDisplay) {
    println!("  Format:       {} ({})", info.format, info.mime_type);
    println!("  Dimensions:   {}x{}", info.width, info.height);
    println!("  Channels:     {}", info.channels);
    println!(
        "  Alpha:        {}",
        if info.has_alpha { "yes" } else { "no" }
    );
    if info.orientation != 1 {
        println!("  Orientation:  {} (applied)", info.orientation);
    }
    println!("  File size:    {}", format_size(info.file_size));
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
