//! # labelprep
//!
//! Batch conversion between the annotation formats of a document-understanding
//! labeling workflow.
//!
//! ## Pipelines
//!
//! - **Task generation**: scan an image directory, run every image through an
//!   OCR engine, and write Label Studio pre-annotation tasks: a rectangle, a
//!   transcript, and a placeholder label per detected region, linked by a
//!   shared region id.
//! - **Distillation**: flatten a completed Label Studio export into compact
//!   `{image, bbox, words, word_labels}` records on the 0-1000 coordinate
//!   scale layout models train on.
//! - **Serving**: expose the scanned images over HTTP with permissive CORS
//!   headers so the browser-hosted labeling tool can load them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use labelprep::prelude::*;
//! use labelprep_ocr::RemoteOcrEngine;
//!
//! // Generate tasks from a directory of scans
//! let engine = Arc::new(RemoteOcrEngine::new("http://localhost:8868"));
//! let generator = TaskGenerator::new(GeneratorOptions::default(), engine);
//! let result = generator.generate().await?;
//! println!("{} images, {} regions", result.images_processed, result.regions);
//!
//! // Later, distill the corrected annotations for training
//! let distiller = Distiller::new(DistillerOptions {
//!     input_path: "export.json".into(),
//!     output_path: "layoutlm-annotations.json".into(),
//!     labels_path: "labels.yml".into(),
//!     image_root: "/images".into(),
//! });
//! let result = distiller.distill().await?;
//! println!("{} records", result.records);
//! ```

pub mod cli;
pub mod distiller;
pub mod geometry;
pub mod server;
pub mod task_generator;
pub mod vocabulary;

// Re-export commonly used types at the root level
pub use distiller::{DistillResult, DistilledRecord, Distiller, DistillerOptions};
pub use geometry::{
    corners_to_xywh, denormalize_to_scale, normalize_to_percent, region_id, PercentBox, PixelBox,
};
pub use server::{run_server, ServerConfig};
pub use task_generator::{
    EntryValue, GenerateResult, GeneratorOptions, Prediction, ResultEntry, TaskData, TaskDocument,
    TaskGenerator,
};
pub use vocabulary::LabelVocabulary;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter; `quiet` drops the default to
/// warnings only.
pub fn init_tracing(quiet: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let default_filter = if quiet {
        "warn"
    } else {
        "labelprep=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```ignore
/// use labelprep::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        corners_to_xywh, denormalize_to_scale, normalize_to_percent, region_id, DistillResult,
        DistilledRecord, Distiller, DistillerOptions, GenerateResult, GeneratorOptions,
        LabelVocabulary, PercentBox, PixelBox, ServerConfig, TaskDocument, TaskGenerator,
    };
}
