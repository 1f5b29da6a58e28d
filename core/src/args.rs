use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "Scrawl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recognize a freehand digit drawing with a pretrained network")]
pub struct Args {
    /// Image file containing the drawing. Any raster format; it is read
    /// as grayscale, dark strokes on a light background.
    pub image: PathBuf,

    /// Pretrained network descriptor (JSON export).
    #[arg(short, long)]
    pub network: PathBuf,

    /// Print the normalized grid as ASCII art before the verdict.
    #[arg(short, long)]
    pub preview: bool,

    /// Log debug information to a file.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,
}
