//! Command line arguments backing the `labelprep` binary.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "labelprep",
    about = "Turns OCR output into Label Studio tasks and distills finished annotations for layout-model training",
    version
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information
    Version,
    /// Scan an image directory with OCR and write Label Studio tasks
    Generate {
        /// Directory containing the images to scan
        #[arg(long, short = 'i', default_value = "images")]
        images: PathBuf,

        /// Output file for the generated tasks
        #[arg(long, short = 'o', default_value = "label-studio-tasks.json")]
        output: PathBuf,

        /// Base URL of the OCR recognition service
        #[arg(long = "ocr-url", default_value = "http://localhost:8868")]
        ocr_url: String,

        /// Host the image file server is reachable on
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Port the image file server listens on
        #[arg(long, default_value = "9000")]
        port: u16,

        /// Skip the rectangle entries
        #[arg(long)]
        no_boxes: bool,

        /// Skip the transcription entries
        #[arg(long)]
        no_transcripts: bool,

        /// Skip the placeholder label entries
        #[arg(long)]
        no_labels: bool,

        /// Stop after this many images
        #[arg(long)]
        limit: Option<usize>,

        /// Only log warnings and errors
        #[arg(long)]
        quiet: bool,
    },
    /// Distill a completed Label Studio export into layout-model records
    Distill {
        /// Flattened (JSON-MIN) Label Studio export to read
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Output file for the distilled records
        #[arg(long, short = 'o', default_value = "layoutlm-annotations.json")]
        output: PathBuf,

        /// Label vocabulary file (YAML with a `labels` list)
        #[arg(long, default_value = "labels.yml")]
        labels: PathBuf,

        /// Path prefix distilled image references are rooted under
        #[arg(long = "image-root", default_value = "/images")]
        image_root: String,

        /// Only log warnings and errors
        #[arg(long)]
        quiet: bool,
    },
    /// Serve a directory over HTTP with permissive CORS for the labeling tool
    Serve {
        /// Directory to serve
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,

        /// Port to listen on
        #[arg(long, short = 'p', default_value = "9000")]
        port: u16,

        /// Only log warnings and errors
        #[arg(long)]
        quiet: bool,
    },
}
