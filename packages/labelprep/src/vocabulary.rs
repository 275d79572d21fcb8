//! The label vocabulary mapping semantic label strings to the integer ids
//! the layout model trains on.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// On-disk layout: a single `labels` key holding an ordered list of strings.
#[derive(Debug, Deserialize)]
struct VocabularyFile {
    labels: Vec<String>,
}

/// Ordered label set. A label's id is its position in the file, so the file
/// order must match the class order the model was configured with.
#[derive(Debug, Clone)]
pub struct LabelVocabulary {
    labels: Vec<String>,
    ids: HashMap<String, usize>,
}

impl LabelVocabulary {
    /// Builds the vocabulary from an ordered label list. A repeated label
    /// keeps its last position.
    pub fn from_labels(labels: Vec<String>) -> Self {
        let ids = labels
            .iter()
            .enumerate()
            .map(|(index, label)| (label.clone(), index))
            .collect();
        Self { labels, ids }
    }

    /// Loads the vocabulary from a YAML file with a `labels` list.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read label vocabulary {}", path.display()))?;
        let file: VocabularyFile = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse label vocabulary {}", path.display()))?;
        Ok(Self::from_labels(file.labels))
    }

    /// The id assigned to `label`, if the vocabulary contains it.
    pub fn id_of(&self, label: &str) -> Option<usize> {
        self.ids.get(label).copied()
    }

    /// The labels in file order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
