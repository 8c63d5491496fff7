//! GlyphForge Core - Glyph Training Source Generator
//!
//! Renders character lists with one or more fonts into two training layouts:
//! 1. Sequence labeling: `images/` with `Label.txt` and `rec_gt.txt`
//! 2. Classification: `classification/<CODEPOINT>/` with `unicode_char.json`
//!
//! Also provides the class index for the classification layout and an
//! adapter for OCR engine output.

pub mod charlist;
pub mod classes;
pub mod config;
pub mod manifest;
pub mod ocr;
pub mod pipeline;
pub mod render;

pub use charlist::{parse_char_file, parse_char_list, CharListError, CharacterEntry};
pub use classes::{ClassIndex, ClassIndexError};
pub use config::{ConfigError, GenerationConfig, ImageSize};
pub use manifest::{code_point_hex, Manifest, ManifestEntry};
pub use ocr::{OcrEngine, OcrResponse, OcrService};
pub use pipeline::{GenerationSummary, PipelineError, RenderListRequest, TrainingSourceEmitter};
pub use render::{generate_char_image, FontLoader, FontdueLoader, GlyphFace, GlyphRenderer, RenderConfig, RenderError, RenderedGlyph};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
