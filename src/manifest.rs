//! Manifests - Label Files for Both Training Layouts
//!
//! Records are appended in generation order and flushed once per run:
//! - `Label.txt`: detection labels (image path, full-canvas region)
//! - `rec_gt.txt`: recognition ground truth (image path, character)
//! - `unicode_char.json`: classification directory name to character

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::ImageSize;

pub const LABEL_FILE: &str = "Label.txt";
pub const REC_GT_FILE: &str = "rec_gt.txt";
pub const UNICODE_CHAR_FILE: &str = "unicode_char.json";

/// Classification directory name for a character: its code point as at least
/// four uppercase hex digits (`亜` -> `4E9C`).
///
/// Returns `None` unless `character` is exactly one code point.
pub fn code_point_hex(character: &str) -> Option<String> {
    let mut chars = character.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(format!("{:04X}", c as u32)),
        _ => None,
    }
}

/// One rendered (list, font, character) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path of the sequence-labeling image, relative to the output root.
    pub image_path: String,
    pub character: String,
    pub font: String,
    pub code_point: String,
    pub image_size: ImageSize,
}

impl ManifestEntry {
    /// `Label.txt` line: path, tab, then a one-element JSON array marking the
    /// whole canvas as the text region.
    pub fn label_line(&self) -> Result<String, serde_json::Error> {
        let (w, h) = (self.image_size.width, self.image_size.height);
        let transcription = serde_json::to_string(&self.character)?;
        Ok(format!(
            "{}\t[{{\"transcription\": {}, \"points\": [[0, 0], [{w}, 0], [{w}, {h}], [0, {h}]], \"difficult\": false}}]",
            self.image_path, transcription
        ))
    }

    pub fn rec_gt_line(&self) -> String {
        format!("{}\t{}", self.image_path, self.character)
    }
}

/// Ordered manifest for a whole run.
#[derive(Debug, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    unicode_chars: Map<String, Value>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.unicode_chars
            .insert(entry.code_point.clone(), Value::String(entry.character.clone()));
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Code point to character, in first-seen order.
    pub fn unicode_chars(&self) -> &Map<String, Value> {
        &self.unicode_chars
    }

    pub fn label_text(&self) -> Result<String, serde_json::Error> {
        let lines = self.entries
            .iter()
            .map(ManifestEntry::label_line)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    pub fn rec_gt_text(&self) -> String {
        self.entries
            .iter()
            .map(ManifestEntry::rec_gt_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write all three manifest files into `output_dir`.
    pub fn flush(&self, output_dir: &Path) -> Result<(), ManifestWriteError> {
        fs::write(output_dir.join(LABEL_FILE), self.label_text()?)?;
        fs::write(output_dir.join(REC_GT_FILE), self.rec_gt_text())?;
        fs::write(
            output_dir.join(UNICODE_CHAR_FILE),
            serde_json::to_string_pretty(&self.unicode_chars)?,
        )?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ManifestWriteError {
    #[error("Failed to write manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize manifest: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Read a `unicode_char.json` written by a previous run.
pub fn load_unicode_chars(path: &Path) -> Result<Map<String, Value>, ManifestWriteError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
