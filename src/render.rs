//! Glyph Renderer - Ink-Centered Character Images
//!
//! Text is laid out on a single baseline, its tight ink bounding box is
//! measured, and the box is centered on a white canvas. Font metrics such as
//! advance width only affect pen movement, never centering.

use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::charlist::CharacterEntry;
use crate::config::ImageSize;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const INK: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to load font {0}: {1}")]
    FontLoad(PathBuf, String),

    #[error("Failed to render {0:?}: {1}")]
    GlyphRender(String, String),
}

/// Coverage bitmap of a single glyph.
///
/// `xmin` is the left edge relative to the pen position and `ymin` the bottom
/// edge relative to the baseline, y pointing up.
#[derive(Debug, Clone, Default)]
pub struct GlyphBitmap {
    pub xmin: i32,
    pub ymin: i32,
    pub width: usize,
    pub height: usize,
    pub advance: f32,
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    fn has_ink(&self) -> bool {
        self.width > 0 && self.height > 0 && self.coverage.iter().any(|&c| c > 0)
    }
}

/// A font loaded at a fixed pixel size.
pub trait GlyphFace {
    fn rasterize(&self, ch: char) -> GlyphBitmap;
}

/// Opens font files. The emitter is generic over this so runs can be driven
/// by something other than fontdue.
pub trait FontLoader {
    type Face: GlyphFace;

    fn load(&self, path: &Path, font_size: u32) -> Result<Self::Face, RenderError>;
}

/// TrueType/OpenType loader backed by fontdue.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontdueLoader;

pub struct FontdueFace {
    font: fontdue::Font,
    px: f32,
}

impl FontLoader for FontdueLoader {
    type Face = FontdueFace;

    fn load(&self, path: &Path, font_size: u32) -> Result<FontdueFace, RenderError> {
        if font_size == 0 {
            return Err(RenderError::FontLoad(path.to_path_buf(), "font size must be positive".into()));
        }
        let data = fs::read(path)
            .map_err(|e| RenderError::FontLoad(path.to_path_buf(), e.to_string()))?;
        let px = font_size as f32;
        let settings = fontdue::FontSettings {
            scale: px,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(data, settings)
            .map_err(|e| RenderError::FontLoad(path.to_path_buf(), e.to_string()))?;
        Ok(FontdueFace { font, px })
    }
}

impl GlyphFace for FontdueFace {
    fn rasterize(&self, ch: char) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, self.px);
        GlyphBitmap {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance: metrics.advance_width,
            coverage,
        }
    }
}

/// Font and sizes used for one rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub font_path: PathBuf,
    pub font_size: u32,
    pub image_size: ImageSize,
}

/// A rendered image with the entry and config that produced it.
#[derive(Debug, Clone)]
pub struct RenderedGlyph {
    pub image: RgbImage,
    pub entry: CharacterEntry,
    pub config: RenderConfig,
}

/// Renders entries with one loaded face.
pub struct GlyphRenderer<F: GlyphFace> {
    face: F,
    config: RenderConfig,
}

impl<F: GlyphFace> GlyphRenderer<F> {
    pub fn new(face: F, config: RenderConfig) -> Self {
        Self { face, config }
    }

    pub fn open<L>(loader: &L, config: RenderConfig) -> Result<Self, RenderError>
    where
        L: FontLoader<Face = F>,
    {
        let face = loader.load(&config.font_path, config.font_size)?;
        Ok(Self::new(face, config))
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render(&self, entry: &CharacterEntry) -> Result<RenderedGlyph, RenderError> {
        let image = render_text(&self.face, &entry.character, self.config.image_size)?;
        Ok(RenderedGlyph {
            image,
            entry: entry.clone(),
            config: self.config.clone(),
        })
    }
}

/// Render one character with a font file, loading the font for this call.
pub fn generate_char_image(
    character: &str,
    font_path: &Path,
    font_size: u32,
    image_size: ImageSize,
) -> Result<RgbImage, RenderError> {
    let face = FontdueLoader.load(font_path, font_size)?;
    render_text(&face, character, image_size)
}

struct PlacedGlyph {
    left: i32,
    top: i32,
    bitmap: GlyphBitmap,
}

/// Ink rectangle in layout space, y pointing down from the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl InkBox {
    pub fn width(&self) -> i32 { self.right - self.left }
    pub fn height(&self) -> i32 { self.bottom - self.top }
}

/// Render text centered on a white canvas of `size`.
pub fn render_text<F: GlyphFace>(face: &F, text: &str, size: ImageSize) -> Result<RgbImage, RenderError> {
    if text.is_empty() {
        return Err(RenderError::GlyphRender(text.to_string(), "nothing to draw".into()));
    }
    if size.width == 0 || size.height == 0 {
        return Err(RenderError::GlyphRender(text.to_string(), format!("canvas {} has no area", size)));
    }

    let glyphs = layout(face, text)?;
    let mut canvas = RgbImage::from_pixel(size.width, size.height, BACKGROUND);

    let Some(ink) = ink_box(&glyphs) else {
        return Ok(canvas);
    };

    let origin_x = ((size.width as f32 - ink.width() as f32) / 2.0).floor() as i32 - ink.left;
    let origin_y = ((size.height as f32 - ink.height() as f32) / 2.0).floor() as i32 - ink.top;

    for glyph in &glyphs {
        draw_glyph(&mut canvas, glyph, origin_x, origin_y);
    }

    Ok(canvas)
}

fn layout<F: GlyphFace>(face: &F, text: &str) -> Result<Vec<PlacedGlyph>, RenderError> {
    let mut placed = vec![];
    let mut pen_x = 0.0f32;

    for ch in text.chars() {
        let bitmap = face.rasterize(ch);
        if bitmap.coverage.len() != bitmap.width * bitmap.height {
            return Err(RenderError::GlyphRender(
                text.to_string(),
                format!(
                    "glyph {:?} has {} coverage bytes for a {}x{} box",
                    ch, bitmap.coverage.len(), bitmap.width, bitmap.height
                ),
            ));
        }
        let left = pen_x.round() as i32 + bitmap.xmin;
        let top = -(bitmap.ymin + bitmap.height as i32);
        pen_x += bitmap.advance;
        placed.push(PlacedGlyph { left, top, bitmap });
    }

    Ok(placed)
}

fn ink_box(glyphs: &[PlacedGlyph]) -> Option<InkBox> {
    glyphs
        .iter()
        .filter(|g| g.bitmap.has_ink())
        .map(|g| InkBox {
            left: g.left,
            top: g.top,
            right: g.left + g.bitmap.width as i32,
            bottom: g.top + g.bitmap.height as i32,
        })
        .reduce(|a, b| InkBox {
            left: a.left.min(b.left),
            top: a.top.min(b.top),
            right: a.right.max(b.right),
            bottom: a.bottom.max(b.bottom),
        })
}

fn draw_glyph(canvas: &mut RgbImage, glyph: &PlacedGlyph, origin_x: i32, origin_y: i32) {
    let (canvas_w, canvas_h) = (canvas.width() as i32, canvas.height() as i32);
    let bitmap = &glyph.bitmap;

    for row in 0..bitmap.height {
        let y = origin_y + glyph.top + row as i32;
        if y < 0 || y >= canvas_h {
            continue;
        }
        for col in 0..bitmap.width {
            let x = origin_x + glyph.left + col as i32;
            if x < 0 || x >= canvas_w {
                continue;
            }
            let alpha = bitmap.coverage[row * bitmap.width + col];
            if alpha == 0 {
                continue;
            }
            // black over white: the channel value is the inverse of coverage
            let value = 255 - alpha;
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            if value < pixel.0[0] {
                *pixel = Rgb([value; 3]);
            }
        }
    }
}

/// Tight bounding box of non-background pixels, as (left, top, right, bottom)
/// with exclusive right/bottom.
pub fn inked_region(image: &RgbImage) -> Option<(u32, u32, u32, u32)> {
    let mut region: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel == BACKGROUND {
            continue;
        }
        region = Some(match region {
            None => (x, y, x + 1, y + 1),
            Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x + 1), b.max(y + 1)),
        });
    }
    region
}
