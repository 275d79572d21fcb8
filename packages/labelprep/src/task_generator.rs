//! OCR-backed Label Studio task generation.
//!
//! Walks an image directory, runs every image through an [`OcrEngine`], and
//! writes one pre-annotation task per image. Each detected region becomes up
//! to three entries in the task's prediction result: a rectangle for the box,
//! a textarea carrying the transcript, and a placeholder label for annotators
//! to correct.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use labelprep_ocr::{OcrEngine, OcrInput};
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::geometry::{corners_to_xywh, normalize_to_percent, region_id, PercentBox};

/// File extensions treated as images; anything else is skipped.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Label attached to every region until an annotator picks the real one.
const DEFAULT_PLACEHOLDER_LABEL: &str = "TEXT";

/// Confidence reported for generated predictions. Label Studio only uses it
/// for sorting, so a single fixed value is fine.
const DEFAULT_PREDICTION_SCORE: f64 = 0.9;

/// Geometry payload shared by all entry kinds, plus the per-kind extras.
/// Field order here is the key order annotators' tooling expects in the JSON.
#[derive(Debug, Clone, Serialize)]
pub struct EntryValue {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// One entry of a task's prediction result list.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub original_width: u32,
    pub original_height: u32,
    pub image_rotation: i32,
    pub value: EntryValue,
    pub id: String,
    pub from_name: String,
    pub to_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskData {
    pub ocr: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub result: Vec<ResultEntry>,
    pub score: f64,
}

/// One Label Studio task: the image URL plus its pre-annotations.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDocument {
    pub data: TaskData,
    pub predictions: Vec<Prediction>,
}

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Directory scanned recursively for images.
    pub image_dir: PathBuf,
    /// File the task array is written to.
    pub output_path: PathBuf,
    /// Host of the file server the tasks will reference images on.
    pub host: String,
    /// Port of the file server.
    pub port: u16,
    /// Emit rectangle entries.
    pub include_boxes: bool,
    /// Emit textarea entries carrying the OCR transcript.
    pub include_transcripts: bool,
    /// Emit placeholder label entries.
    pub include_labels: bool,
    /// Label put on every region until annotators correct it.
    pub placeholder_label: String,
    /// Score reported for every prediction.
    pub prediction_score: f64,
    /// Stop after this many images; a debugging aid for large directories.
    pub limit: Option<usize>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("images"),
            output_path: PathBuf::from("label-studio-tasks.json"),
            host: "localhost".to_string(),
            port: 9000,
            include_boxes: true,
            include_transcripts: true,
            include_labels: true,
            placeholder_label: DEFAULT_PLACEHOLDER_LABEL.to_string(),
            prediction_score: DEFAULT_PREDICTION_SCORE,
            limit: None,
        }
    }
}

/// Summary of a generation run.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub success: bool,
    pub total_files: usize,
    pub images_processed: usize,
    pub files_skipped: usize,
    pub regions: usize,
}

/// Task generator bound to an OCR engine.
pub struct TaskGenerator {
    options: GeneratorOptions,
    engine: Arc<dyn OcrEngine>,
}

impl TaskGenerator {
    pub fn new(options: GeneratorOptions, engine: Arc<dyn OcrEngine>) -> Self {
        Self { options, engine }
    }

    /// Scans the image directory and writes the task array.
    ///
    /// Files without an image extension are counted and skipped. An image
    /// that fails to decode is skipped with a warning. Everything else that
    /// goes wrong (unreadable file, OCR failure, unwritable output) aborts
    /// the run.
    pub async fn generate(&self) -> Result<GenerateResult> {
        let dir = &self.options.image_dir;
        if !dir.is_dir() {
            anyhow::bail!("image directory {} does not exist", dir.display());
        }

        let total_files = count_files(dir);
        info!(total_files, dir = %dir.display(), "scanning for images");

        let mut tasks: Vec<TaskDocument> = Vec::new();
        let mut file_index = 0usize;
        let mut images_processed = 0usize;
        let mut files_skipped = 0usize;
        let mut regions = 0usize;

        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            file_index += 1;
            let path = entry.path();

            if let Some(limit) = self.options.limit {
                if images_processed >= limit {
                    info!(limit, "image limit reached, stopping early");
                    break;
                }
            }

            if !is_image_file(path) {
                debug!(file = file_index, total = total_files, path = %path.display(), "skipping non-image file");
                files_skipped += 1;
                continue;
            }

            let bytes = fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;

            let image = match image::load_from_memory(&bytes) {
                Ok(image) => image,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping undecodable image");
                    files_skipped += 1;
                    continue;
                }
            };
            let (width, height) = (image.width(), image.height());

            let detections = self
                .engine
                .recognize(&OcrInput::Bytes(bytes))
                .await
                .with_context(|| format!("text recognition failed for {}", path.display()))?;

            let mut result = Vec::new();
            let mut task_regions = 0usize;
            for detection in &detections {
                if detection.text.is_empty() {
                    continue;
                }
                let bbox = corners_to_xywh(detection.polygon[0], detection.polygon[2]);
                let percent = normalize_to_percent(bbox, width, height)
                    .with_context(|| format!("bad geometry in {}", path.display()))?;
                let id = region_id();
                result.extend(self.entries_for_region(&id, percent, &detection.text, width, height));
                task_regions += 1;
            }

            info!(
                file = file_index,
                total = total_files,
                path = %path.display(),
                regions = task_regions,
                "processed image"
            );

            tasks.push(TaskDocument {
                data: TaskData {
                    ocr: self.file_url(path),
                },
                predictions: vec![Prediction {
                    result,
                    score: self.options.prediction_score,
                }],
            });
            images_processed += 1;
            regions += task_regions;
        }

        let json = serde_json::to_string_pretty(&tasks).context("failed to serialize tasks")?;
        fs::write(&self.options.output_path, json)
            .await
            .with_context(|| format!("failed to write {}", self.options.output_path.display()))?;

        info!(
            tasks = tasks.len(),
            output = %self.options.output_path.display(),
            "wrote task file"
        );

        Ok(GenerateResult {
            success: true,
            total_files,
            images_processed,
            files_skipped,
            regions,
        })
    }

    /// The URL the labeling tool will fetch this image from, assuming the
    /// file server is started with the same working directory the scan ran
    /// in. Backslashes are normalized so tasks generated on Windows stay
    /// loadable.
    fn file_url(&self, path: &Path) -> String {
        let normalized = path.to_string_lossy().replace('\\', "/");
        format!("http://{}:{}/{}", self.options.host, self.options.port, normalized)
    }

    /// Builds the entries describing one region. All entries share the
    /// region id and geometry; they differ in the template field they target.
    fn entries_for_region(
        &self,
        region_id: &str,
        bbox: PercentBox,
        text: &str,
        width: u32,
        height: u32,
    ) -> Vec<ResultEntry> {
        let mut entries = Vec::new();
        if self.options.include_boxes {
            entries.push(entry(region_id, bbox, width, height, "bbox", "rectangle", None, None));
        }
        if self.options.include_transcripts {
            entries.push(entry(
                region_id,
                bbox,
                width,
                height,
                "transcription",
                "textarea",
                Some(vec![text.to_string()]),
                None,
            ));
        }
        if self.options.include_labels {
            entries.push(entry(
                region_id,
                bbox,
                width,
                height,
                "label",
                "labels",
                None,
                Some(vec![self.options.placeholder_label.clone()]),
            ));
        }
        entries
    }
}

#[allow(clippy::too_many_arguments)]
fn entry(
    region_id: &str,
    bbox: PercentBox,
    width: u32,
    height: u32,
    from_name: &str,
    kind: &str,
    text: Option<Vec<String>>,
    labels: Option<Vec<String>>,
) -> ResultEntry {
    ResultEntry {
        original_width: width,
        original_height: height,
        image_rotation: 0,
        value: EntryValue {
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
            rotation: 0,
            text,
            labels,
        },
        id: region_id.to_string(),
        from_name: from_name.to_string(),
        to_name: "image".to_string(),
        kind: kind.to_string(),
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelprep_ocr::RemoteOcrEngine;

    fn generator(options: GeneratorOptions) -> TaskGenerator {
        TaskGenerator::new(options, Arc::new(RemoteOcrEngine::new("http://localhost:8868")))
    }

    #[test]
    fn image_extensions_match_case_insensitively() {
        assert!(is_image_file(Path::new("scan.jpg")));
        assert!(is_image_file(Path::new("scan.JPG")));
        assert!(is_image_file(Path::new("dir/scan.jpeg")));
        assert!(is_image_file(Path::new("scan.PNG")));
        assert!(!is_image_file(Path::new("scan.txt")));
        assert!(!is_image_file(Path::new("scan.jpg.md")));
        assert!(!is_image_file(Path::new("jpg")));
    }

    #[test]
    fn file_urls_join_host_port_and_forward_slashes() {
        let gen = generator(GeneratorOptions::default());
        assert_eq!(
            gen.file_url(Path::new("images/scan.jpg")),
            "http://localhost:9000/images/scan.jpg"
        );
        assert_eq!(
            gen.file_url(Path::new("images\\sub\\scan.jpg")),
            "http://localhost:9000/images/sub/scan.jpg"
        );
    }

    #[test]
    fn regions_expand_to_three_linked_entries() {
        let gen = generator(GeneratorOptions::default());
        let bbox = PercentBox {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 25.0,
        };
        let entries = gen.entries_for_region("abc123", bbox, "Invoice", 100, 200);

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.id == "abc123"));
        assert!(entries.iter().all(|e| e.to_name == "image"));
        assert!(entries.iter().all(|e| e.value.x == 10.0 && e.value.height == 25.0));

        let from_names: Vec<_> = entries.iter().map(|e| e.from_name.as_str()).collect();
        assert_eq!(from_names, ["bbox", "transcription", "label"]);
        let kinds: Vec<_> = entries.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, ["rectangle", "textarea", "labels"]);

        assert_eq!(entries[1].value.text, Some(vec!["Invoice".to_string()]));
        assert_eq!(entries[2].value.labels, Some(vec!["TEXT".to_string()]));
    }

    #[test]
    fn include_flags_drop_entry_kinds() {
        let gen = generator(GeneratorOptions {
            include_labels: false,
            ..GeneratorOptions::default()
        });
        let bbox = PercentBox {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        };
        let entries = gen.entries_for_region("id", bbox, "text", 10, 10);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.from_name != "label"));
    }

    #[test]
    fn placeholder_label_is_configurable() {
        let gen = generator(GeneratorOptions {
            placeholder_label: "UNLABELED".to_string(),
            ..GeneratorOptions::default()
        });
        let bbox = PercentBox {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        };
        let entries = gen.entries_for_region("id", bbox, "text", 10, 10);
        assert_eq!(entries[2].value.labels, Some(vec!["UNLABELED".to_string()]));
    }

    #[test]
    fn entries_serialize_with_stable_key_order() {
        let box_entry = entry(
            "abc",
            PercentBox {
                x: 10.0,
                y: 10.0,
                width: 20.0,
                height: 25.0,
            },
            100,
            200,
            "bbox",
            "rectangle",
            None,
            None,
        );
        let json = serde_json::to_string(&box_entry).unwrap();
        assert_eq!(
            json,
            "{\"original_width\":100,\"original_height\":200,\"image_rotation\":0,\
             \"value\":{\"x\":10.0,\"y\":10.0,\"width\":20.0,\"height\":25.0,\"rotation\":0},\
             \"id\":\"abc\",\"from_name\":\"bbox\",\"to_name\":\"image\",\"type\":\"rectangle\"}"
        );
    }

    #[test]
    fn omitted_value_fields_stay_out_of_the_json() {
        let transcript = entry(
            "abc",
            PercentBox {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            },
            10,
            10,
            "transcription",
            "textarea",
            Some(vec!["hello".to_string()]),
            None,
        );
        let json = serde_json::to_string(&transcript).unwrap();
        assert!(json.contains("\"text\":[\"hello\"]"));
        assert!(!json.contains("\"labels\""));
    }
}
