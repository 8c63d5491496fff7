//! OCR Adapter - Engine Output to Response Records
//!
//! The recognition engine is an external collaborator behind [`OcrEngine`].
//! Engines report either parallel columns (texts, scores, polygons) or a
//! list of regions; both are normalized to [`OcrRegion`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),
}

/// Quadrilateral (or polygon) corners, `[x, y]` per point.
pub type Polygon = Vec<[f32; 2]>;

/// Raw engine output.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePrediction {
    Columnar {
        rec_texts: Vec<String>,
        rec_scores: Vec<f32>,
        rec_polys: Vec<Polygon>,
    },
    Regions(Vec<OcrRegion>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrRegion {
    pub polygon: Polygon,
    pub text: String,
    pub confidence: f32,
}

impl EnginePrediction {
    /// Normalize to regions. Texts drive the columnar form: a missing score
    /// becomes 0.0 and a missing polygon becomes empty.
    pub fn into_regions(self) -> Vec<OcrRegion> {
        match self {
            Self::Regions(regions) => regions,
            Self::Columnar { rec_texts, rec_scores, rec_polys } => rec_texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| OcrRegion {
                    polygon: rec_polys.get(i).cloned().unwrap_or_default(),
                    text,
                    confidence: rec_scores.get(i).copied().unwrap_or(0.0),
                })
                .collect(),
        }
    }
}

/// A text recognition engine.
pub trait OcrEngine: Send + Sync {
    fn predict(&self, image: &RgbImage) -> Result<EnginePrediction, OcrError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrResponse {
    pub success: bool,
    pub results: Vec<OcrResult>,
    pub full_text: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl OcrResponse {
    pub fn from_regions(regions: Vec<OcrRegion>) -> Self {
        let full_text = regions
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let message = Some(format!("Detected {} text regions", regions.len()));
        let results = regions
            .into_iter()
            .map(|r| OcrResult {
                text: r.text,
                confidence: r.confidence,
                bounding_box: BoundingBox { points: r.polygon },
            })
            .collect();
        Self {
            success: true,
            results,
            full_text,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub ocr_ready: bool,
    pub version: String,
}

/// Owns one engine instance. Construct once and share by reference.
pub struct OcrService<E: OcrEngine> {
    engine: E,
}

impl<E: OcrEngine> OcrService<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn is_ready(&self) -> bool {
        true
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            ocr_ready: self.is_ready(),
            version: ENGINE_VERSION.to_string(),
        }
    }

    /// Decode any supported image format, convert to RGB, and recognize.
    pub fn process_image(&self, bytes: &[u8]) -> Result<Vec<OcrRegion>, OcrError> {
        if bytes.is_empty() {
            return Ok(vec![]);
        }
        let image = image::load_from_memory(bytes)
            .map_err(|e| OcrError::DecodeFailed(e.to_string()))?
            .to_rgb8();
        debug!(width = image.width(), height = image.height(), "running OCR");
        Ok(self.engine.predict(&image)?.into_regions())
    }

    pub fn process_base64(&self, data: &str) -> Result<Vec<OcrRegion>, OcrError> {
        let bytes = STANDARD.decode(data.trim())?;
        self.process_image(&bytes)
    }

    pub fn recognize(&self, bytes: &[u8]) -> Result<OcrResponse, OcrError> {
        Ok(OcrResponse::from_regions(self.process_image(bytes)?))
    }
}
