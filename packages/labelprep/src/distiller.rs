//! Distills completed Label Studio annotations into layout-model records.
//!
//! Input is the tool's flattened export: one object per task with per-region
//! lists keyed by the template field names. Output is one record per image
//! with index-aligned `bbox` / `words` / `word_labels` lists on the model's
//! 0-1000 coordinate scale.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::geometry::{denormalize_to_scale, PercentBox};
use crate::vocabulary::LabelVocabulary;

/// One annotation set of the flattened export. Unknown keys (annotator,
/// timestamps, internal ids) are ignored.
#[derive(Debug, Clone, Deserialize)]
struct AnnotationSet {
    ocr: String,
    bbox: Vec<PercentBox>,
    transcription: Vec<String>,
    label: Vec<LabelSelection>,
}

/// The export wraps each region's labels in a geometry-bearing object; only
/// the selected labels matter here, and only the first one is kept.
#[derive(Debug, Clone, Deserialize)]
struct LabelSelection {
    labels: Vec<String>,
}

/// One record of the distilled output.
#[derive(Debug, Clone, Serialize)]
pub struct DistilledRecord {
    pub image: String,
    pub bbox: Vec<[[i32; 4]; 1]>,
    pub words: Vec<String>,
    pub word_labels: Vec<usize>,
}

/// Configuration for a distillation run.
#[derive(Debug, Clone)]
pub struct DistillerOptions {
    /// Flattened Label Studio export to read.
    pub input_path: PathBuf,
    /// File the distilled records are written to.
    pub output_path: PathBuf,
    /// Label vocabulary file.
    pub labels_path: PathBuf,
    /// Path prefix distilled image references are rooted under.
    pub image_root: String,
}

/// Summary of a distillation run.
#[derive(Debug, Clone)]
pub struct DistillResult {
    pub success: bool,
    pub records: usize,
    pub regions: usize,
}

pub struct Distiller {
    options: DistillerOptions,
}

impl Distiller {
    pub fn new(options: DistillerOptions) -> Self {
        Self { options }
    }

    /// Reads the export, distills every annotation set, and writes the
    /// record array. Any malformed set aborts the run; a training set with
    /// silently dropped regions is worse than no training set.
    pub async fn distill(&self) -> Result<DistillResult> {
        let vocabulary = LabelVocabulary::load(&self.options.labels_path)?;
        info!(labels = vocabulary.len(), "loaded label vocabulary");

        let raw = fs::read_to_string(&self.options.input_path)
            .await
            .with_context(|| format!("failed to read {}", self.options.input_path.display()))?;
        let sets = parse_sets(&raw)?;

        let mut records = Vec::with_capacity(sets.len());
        let mut regions = 0usize;
        for (index, set) in sets.into_iter().enumerate() {
            let record = self
                .distill_set(set, &vocabulary)
                .with_context(|| format!("annotation set {index}"))?;
            info!(
                set = index + 1,
                image = %record.image,
                regions = record.words.len(),
                "distilled annotation set"
            );
            regions += record.words.len();
            records.push(record);
        }

        let json = serde_json::to_string_pretty(&records).context("failed to serialize records")?;
        fs::write(&self.options.output_path, json)
            .await
            .with_context(|| format!("failed to write {}", self.options.output_path.display()))?;

        info!(
            records = records.len(),
            output = %self.options.output_path.display(),
            "wrote distilled annotations"
        );

        Ok(DistillResult {
            success: true,
            records: records.len(),
            regions,
        })
    }

    fn distill_set(&self, set: AnnotationSet, vocabulary: &LabelVocabulary) -> Result<DistilledRecord> {
        if set.bbox.len() != set.transcription.len() || set.bbox.len() != set.label.len() {
            bail!(
                "region lists are misaligned: {} boxes, {} transcriptions, {} labels",
                set.bbox.len(),
                set.transcription.len(),
                set.label.len()
            );
        }

        let bbox = set
            .bbox
            .iter()
            .map(|region| [denormalize_to_scale(*region)])
            .collect();

        let word_labels = set
            .label
            .iter()
            .map(|selection| {
                let label = selection
                    .labels
                    .first()
                    .ok_or_else(|| anyhow!("region has an empty label list"))?;
                vocabulary
                    .id_of(label)
                    .ok_or_else(|| anyhow!("label {label:?} is not in the vocabulary"))
            })
            .collect::<Result<Vec<_>>>()?;

        let image = image_path_from_url(&set.ocr, &self.options.image_root)?;

        Ok(DistilledRecord {
            image,
            bbox,
            words: set.transcription,
            word_labels,
        })
    }
}

fn parse_sets(raw: &str) -> Result<Vec<AnnotationSet>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(raw).context("export is not a JSON array")?;
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value)
                .with_context(|| format!("annotation set {index} is malformed"))
        })
        .collect()
}

/// Rewrites a task's image URL as the local path the layout model will load
/// images from: percent-escapes decoded, separators normalized, and the
/// original directory structure replaced by the configured root.
fn image_path_from_url(url: &str, image_root: &str) -> Result<String> {
    let decoded = percent_decode_str(url)
        .decode_utf8()
        .with_context(|| format!("image URL {url:?} does not decode to UTF-8"))?;
    let normalized = decoded.replace('\\', "/");
    let filename = normalized.rsplit('/').next().unwrap_or(&normalized);
    Ok(format!("{}/{}", image_root.trim_end_matches('/'), filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distiller() -> Distiller {
        Distiller::new(DistillerOptions {
            input_path: PathBuf::from("export.json"),
            output_path: PathBuf::from("out.json"),
            labels_path: PathBuf::from("labels.yml"),
            image_root: "/images".to_string(),
        })
    }

    fn vocabulary() -> LabelVocabulary {
        LabelVocabulary::from_labels(
            ["other", "header", "question", "answer"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    fn set(boxes: usize, texts: usize, labels: usize) -> AnnotationSet {
        AnnotationSet {
            ocr: "http://localhost:9000/images/scan.png".to_string(),
            bbox: (0..boxes)
                .map(|i| PercentBox {
                    x: i as f64,
                    y: 20.25,
                    width: 30.0,
                    height: 40.75,
                })
                .collect(),
            transcription: (0..texts).map(|i| format!("word{i}")).collect(),
            label: (0..labels)
                .map(|_| LabelSelection {
                    labels: vec!["header".to_string()],
                })
                .collect(),
        }
    }

    #[test]
    fn url_becomes_rooted_decoded_filename() {
        let path = image_path_from_url(
            "http://localhost:9000/images/sub%20dir/My%20File.JPG",
            "/images",
        )
        .unwrap();
        assert_eq!(path, "/images/My File.JPG");
    }

    #[test]
    fn url_backslashes_normalize_after_decoding() {
        let path =
            image_path_from_url("http://localhost:9000/scans%5Cbatch%5Cpage.png", "/images")
                .unwrap();
        assert_eq!(path, "/images/page.png");
    }

    #[test]
    fn image_root_trailing_slash_is_tolerated() {
        let path = image_path_from_url("http://h:1/a.png", "/data/images/").unwrap();
        assert_eq!(path, "/data/images/a.png");
    }

    #[test]
    fn regions_distill_to_aligned_lists() {
        let record = distiller().distill_set(set(3, 3, 3), &vocabulary()).unwrap();

        assert_eq!(record.image, "/images/scan.png");
        assert_eq!(record.words, ["word0", "word1", "word2"]);
        assert_eq!(record.word_labels, [1, 1, 1]);
        // Each box re-scales to tenths and keeps the one-element nesting.
        assert_eq!(record.bbox[0], [[0, 202, 300, 407]]);
        assert_eq!(record.bbox[1], [[10, 202, 300, 407]]);
        assert_eq!(record.bbox[2], [[20, 202, 300, 407]]);
    }

    #[test]
    fn misaligned_region_lists_fail() {
        let err = distiller()
            .distill_set(set(2, 1, 2), &vocabulary())
            .unwrap_err();
        assert!(err.to_string().contains("misaligned"));
    }

    #[test]
    fn unknown_label_fails_with_its_name() {
        let mut bad = set(1, 1, 1);
        bad.label[0].labels = vec!["stamp".to_string()];
        let err = distiller().distill_set(bad, &vocabulary()).unwrap_err();
        assert!(err.to_string().contains("stamp"));
    }

    #[test]
    fn empty_label_selection_fails() {
        let mut bad = set(1, 1, 1);
        bad.label[0].labels.clear();
        assert!(distiller().distill_set(bad, &vocabulary()).is_err());
    }

    #[test]
    fn malformed_sets_are_reported_by_index() {
        let raw = r#"[
            {
                "ocr": "http://localhost:9000/images/a.png",
                "bbox": [], "transcription": [], "label": []
            },
            { "transcription": [] }
        ]"#;
        let err = parse_sets(raw).unwrap_err();
        assert!(format!("{err:#}").contains("annotation set 1"));
    }

    #[test]
    fn extra_export_keys_are_ignored() {
        let raw = r#"[{
            "ocr": "http://localhost:9000/images/a.png",
            "bbox": [{"x": 10.5, "y": 20.0, "width": 30.0, "height": 40.0,
                      "rotation": 0, "original_width": 100, "original_height": 200}],
            "transcription": ["Invoice"],
            "label": [{"labels": ["header"], "x": 10.5, "y": 20.0}],
            "annotator": 1,
            "annotation_id": 7
        }]"#;
        let sets = parse_sets(raw).unwrap();
        let record = distiller().distill_set(sets[0].clone(), &vocabulary()).unwrap();
        assert_eq!(record.bbox, [[[105, 200, 300, 400]]]);
        assert_eq!(record.words, ["Invoice"]);
        assert_eq!(record.word_labels, [1]);
    }
}
