//! Generation Pipeline - Training Source Emitter
//!
//! One run renders every (list, font, character) combination into two
//! layouts under the output root:
//! - `images/<list-stem>/<index>.<ext>` for sequence labeling
//! - `classification/<CODEPOINT>/<font-stem>.<ext>` for classification
//!
//! The `images/` path carries no font, so with several fonts only the last
//! font's image remains on disk while the label files list every font.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::charlist::{parse_char_file, CharListError};
use crate::config::{ConfigError, GenerationConfig, ImageSize};
use crate::manifest::{code_point_hex, Manifest, ManifestEntry, ManifestWriteError};
use crate::render::{FontLoader, FontdueLoader, GlyphRenderer, RenderConfig, RenderError};

pub const IMAGES_DIR: &str = "images";
pub const CLASSIFICATION_DIR: &str = "classification";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Character list error: {0}")]
    CharList(#[from] CharListError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot classify {0:?}: classification needs exactly one code point")]
    NotSingleCodePoint(String),

    #[error("Failed to write image {0}: {1}")]
    ImageWrite(PathBuf, #[source] image::ImageError),

    #[error("IO error at {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestWriteError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// What a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub output_dir: PathBuf,
    pub lists: usize,
    pub fonts: usize,
    /// Distinct image files on disk after the run.
    pub images_written: usize,
    pub classes: usize,
    pub manifest_entries: usize,
}

/// The training source emitter.
pub struct TrainingSourceEmitter<L: FontLoader = FontdueLoader> {
    loader: L,
}

impl TrainingSourceEmitter<FontdueLoader> {
    pub fn new() -> Self {
        Self { loader: FontdueLoader }
    }
}

impl Default for TrainingSourceEmitter<FontdueLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: FontLoader> TrainingSourceEmitter<L> {
    pub fn with_loader(loader: L) -> Self {
        Self { loader }
    }

    /// Run the full generation into `output_dir`.
    ///
    /// `images/` and `classification/` are wiped first. `config.json` is
    /// written before anything is rendered. Any failure aborts the run and
    /// leaves whatever was already written.
    pub fn generate(
        &self,
        output_dir: &Path,
        config: &GenerationConfig,
    ) -> Result<GenerationSummary, PipelineError> {
        config.validate()?;
        info!(
            output = %output_dir.display(),
            lists = config.text_file_paths.len(),
            fonts = config.font_paths.len(),
            image_size = %config.image_size,
            "generating training sources"
        );

        create_dir(output_dir)?;
        let images_root = output_dir.join(IMAGES_DIR);
        let classification_root = output_dir.join(CLASSIFICATION_DIR);
        recreate_dir(&images_root)?;
        recreate_dir(&classification_root)?;

        let config_path = output_dir.join(CONFIG_FILE);
        fs::write(&config_path, config.to_json_pretty()?)
            .map_err(|e| PipelineError::Io(config_path.clone(), e))?;

        let extension = config.extension();
        let mut manifest = Manifest::new();
        let mut written: HashSet<PathBuf> = HashSet::new();

        for list_path in &config.text_file_paths {
            let stem = file_stem(list_path);
            let list_dir = images_root.join(&stem);
            create_dir(&list_dir)?;
            let entries = parse_char_file(list_path)?;
            info!(list = %list_path.display(), characters = entries.len(), "parsed character list");

            for font_path in &config.font_paths {
                let font_name = file_stem(font_path);
                let renderer = GlyphRenderer::open(
                    &self.loader,
                    RenderConfig {
                        font_path: font_path.clone(),
                        font_size: config.font_size,
                        image_size: config.image_size,
                    },
                )?;

                for entry in &entries {
                    let glyph = renderer.render(entry)?;
                    let code_point = code_point_hex(&entry.character)
                        .ok_or_else(|| PipelineError::NotSingleCodePoint(entry.character.clone()))?;

                    let file_name = format!("{}.{}", entry.index, extension);
                    let image_path = list_dir.join(&file_name);
                    save_image(&glyph.image, &image_path)?;
                    written.insert(image_path);

                    let class_dir = classification_root.join(&code_point);
                    create_dir(&class_dir)?;
                    let class_path = class_dir.join(format!("{}.{}", font_name, extension));
                    save_image(&glyph.image, &class_path)?;
                    written.insert(class_path);

                    debug!(character = %entry.character, index = entry.index, font = %font_name, "rendered glyph");
                    manifest.push(ManifestEntry {
                        image_path: format!("{}/{}/{}", IMAGES_DIR, stem, file_name),
                        character: entry.character.clone(),
                        font: font_name.clone(),
                        code_point,
                        image_size: config.image_size,
                    });
                }
            }
        }

        manifest.flush(output_dir)?;

        let summary = GenerationSummary {
            output_dir: output_dir.to_path_buf(),
            lists: config.text_file_paths.len(),
            fonts: config.font_paths.len(),
            images_written: written.len(),
            classes: manifest.unicode_chars().len(),
            manifest_entries: manifest.len(),
        };
        info!(
            entries = summary.manifest_entries,
            classes = summary.classes,
            "training sources written"
        );
        Ok(summary)
    }

    /// Render a single list with a single font into
    /// `<output_dir>/char_image/<stem>/` and write a generation log to
    /// `<output_dir>/gen_image_log/<stem>.json`.
    pub fn render_list(
        &self,
        output_dir: &Path,
        request: &RenderListRequest,
    ) -> Result<Vec<GenerationLogEntry>, PipelineError> {
        let entries = parse_char_file(&request.text_file_path)?;
        let stem = file_stem(&request.text_file_path);

        let image_dir = output_dir.join(CHAR_IMAGE_DIR).join(&stem);
        create_dir(&image_dir)?;
        let log_dir = output_dir.join(GEN_IMAGE_LOG_DIR);
        create_dir(&log_dir)?;

        let renderer = GlyphRenderer::open(
            &self.loader,
            RenderConfig {
                font_path: request.font_path.clone(),
                font_size: request.font_size,
                image_size: request.image_size,
            },
        )?;
        let extension = request.extension.trim_start_matches('.');

        let mut logs = Vec::with_capacity(entries.len());
        for entry in &entries {
            let glyph = renderer.render(entry)?;
            let image_path = image_dir.join(format!("{}.{}", entry.index, extension));
            save_image(&glyph.image, &image_path)?;

            logs.push(GenerationLogEntry {
                text_file_path: request.text_file_path.display().to_string(),
                char: entry.character.clone(),
                image_path: image_path.display().to_string(),
                font_family: request.font_path.display().to_string(),
                font_size: request.font_size.to_string(),
                image_size: request.image_size.to_string(),
            });
        }

        let log_path = log_dir.join(format!("{}.json", stem));
        fs::write(&log_path, serde_json::to_string_pretty(&logs)?)
            .map_err(|e| PipelineError::Io(log_path.clone(), e))?;

        info!(
            images = logs.len(),
            dir = %image_dir.display(),
            log = %log_path.display(),
            "rendered character list"
        );
        Ok(logs)
    }
}

pub const CHAR_IMAGE_DIR: &str = "char_image";
pub const GEN_IMAGE_LOG_DIR: &str = "gen_image_log";

/// Parameters for [`TrainingSourceEmitter::render_list`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderListRequest {
    pub text_file_path: PathBuf,
    pub font_path: PathBuf,
    #[serde(default = "default_list_font_size")]
    pub font_size: u32,
    #[serde(default = "default_list_image_size")]
    pub image_size: ImageSize,
    #[serde(default = "default_list_extension")]
    pub extension: String,
}

fn default_list_font_size() -> u32 { 64 }
fn default_list_image_size() -> ImageSize { ImageSize { width: 128, height: 128 } }
fn default_list_extension() -> String { "png".to_string() }

impl RenderListRequest {
    pub fn new(text_file_path: PathBuf, font_path: PathBuf) -> Self {
        Self {
            text_file_path,
            font_path,
            font_size: default_list_font_size(),
            image_size: default_list_image_size(),
            extension: default_list_extension(),
        }
    }
}

/// One record of `gen_image_log/<stem>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationLogEntry {
    pub text_file_path: String,
    pub char: String,
    pub image_path: String,
    pub font_family: String,
    pub font_size: String,
    pub image_size: String,
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn create_dir(path: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(path).map_err(|e| PipelineError::Io(path.to_path_buf(), e))
}

fn recreate_dir(path: &Path) -> Result<(), PipelineError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| PipelineError::Io(path.to_path_buf(), e))?;
    }
    create_dir(path)
}

fn save_image(image: &RgbImage, path: &Path) -> Result<(), PipelineError> {
    image.save(path).map_err(|e| PipelineError::ImageWrite(path.to_path_buf(), e))
}
