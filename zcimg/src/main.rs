//! zcimg — inspect, convert and show images through zenimgio.
//!
//! Every command goes through the same hardware-first dispatch as the
//! library, so `-v` shows which adapter handled each image.

mod convert;
mod info;
mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use zenimgio::ReadMode;

#[derive(Parser, Debug)]
#[command(name = "zcimg", version, about)]
struct Cli {
    /// Log adapter attempts and fallthroughs.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode images and print their shape and metadata.
    Info(InfoArgs),

    /// Decode an image and re-encode it to the format of the output path.
    Convert(ConvertArgs),

    /// Show an image on the framebuffer or save it as `<window>.png`.
    Show(ShowArgs),
}

/// Arguments for the `info` subcommand.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Input files or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `convert` subcommand.
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Input image.
    pub input: PathBuf,

    /// Output path; the extension picks the format (jpg, jpeg, png, bmp).
    #[arg(short, long)]
    pub output: PathBuf,

    /// JPEG quality (1-100).
    #[arg(short, long)]
    pub quality: Option<i32>,

    /// Channel layout to decode into.
    #[arg(long, value_enum, default_value = "color")]
    pub mode: ModeArg,

    /// Apply the EXIF orientation tag (default: on).
    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    pub auto_orient: bool,
}

/// Arguments for the `show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Input image.
    pub input: PathBuf,

    /// Window name; `fb` targets the Linux framebuffer.
    #[arg(short, long, default_value = "zcimg")]
    pub window: String,

    /// Milliseconds to wait for a key after showing.
    #[arg(long, default_value_t = 0)]
    pub wait: i32,
}

/// Decode channel layout.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Keep the source channel count.
    Unchanged,
    /// Single channel.
    Grayscale,
    /// Three channels, BGR.
    Color,
}

impl From<ModeArg> for ReadMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Unchanged => ReadMode::Unchanged,
            ModeArg::Grayscale => ReadMode::Grayscale,
            ModeArg::Color => ReadMode::Color,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Info(args) => info::run(args),
        Command::Convert(args) => convert::run(args),
        Command::Show(args) => show::run(args),
    }
}
