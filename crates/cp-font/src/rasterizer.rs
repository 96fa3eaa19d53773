use std::path::Path;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, point};
use anyhow::Context;
use cp_core::color::Rgb;
use cp_core::frame::PixelBuffer;
use cp_core::traits::PixelSource;

use crate::binarize::{DEFAULT_THRESHOLD, binarize};

/// Taille de police (px par em) utilisée quand aucune n'est donnée.
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Police embarquée : DejaVu Sans Mono (licence Bitstream Vera, voir
/// `fonts/DejaVu-LICENSE`).
pub const BUILTIN_FONT: &[u8] = include_bytes!("../fonts/DejaVuSansMono.ttf");

/// Text rasterized with a TTF/OTF font, exposed as a pixel source.
///
/// The glyphs are drawn onto a luma canvas, then binarized into `fore`
/// (ink) and `back` (background). A `None` background yields transparent
/// pixels, which the half-block modes render as blank half-cells.
pub struct TextSource {
    text: String,
    font: FontVec,
    font_size: u32,
    canvas: Option<(u32, u32)>,
    offset: (i32, i32),
    threshold: u8,
    fore: Rgb,
    back: Option<Rgb>,
}

impl TextSource {
    /// Build a text source from raw font bytes.
    ///
    /// # Errors
    /// Retourne une erreur si les données ne sont pas une police valide.
    pub fn new(text: impl Into<String>, font_data: Vec<u8>) -> anyhow::Result<Self> {
        let font = FontVec::try_from_vec(font_data).context("police invalide")?;
        Ok(Self {
            text: text.into(),
            font,
            font_size: DEFAULT_FONT_SIZE,
            canvas: None,
            offset: (0, 0),
            threshold: DEFAULT_THRESHOLD,
            fore: (255, 255, 255),
            back: Some((0, 0, 0)),
        })
    }

    /// Text source using [`BUILTIN_FONT`].
    ///
    /// # Errors
    /// Returns an error if the embedded font fails to parse.
    pub fn builtin(text: impl Into<String>) -> anyhow::Result<Self> {
        Self::new(text, BUILTIN_FONT.to_vec()).context("police embarquée")
    }

    /// Load the font from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a font.
    pub fn from_file(text: impl Into<String>, font_path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read(font_path)
            .with_context(|| format!("lecture de la police {}", font_path.display()))?;
        Self::new(text, data).with_context(|| format!("police {}", font_path.display()))
    }

    /// Em size in pixels. `0` falls back to [`DEFAULT_FONT_SIZE`].
    #[must_use]
    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = if size == 0 { DEFAULT_FONT_SIZE } else { size };
        self
    }

    /// Explicit canvas size; zero dimensions fall back to the default canvas.
    #[must_use]
    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas = (width > 0 && height > 0).then_some((width, height));
        self
    }

    /// Position of the text's top-left corner on the canvas.
    #[must_use]
    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset = (x, y);
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Ink and background colors. `back = None` keeps the background transparent.
    #[must_use]
    pub fn with_colors(mut self, fore: Rgb, back: Option<Rgb>) -> Self {
        self.fore = fore;
        self.back = back;
        self
    }

    /// Canvas dimensions: explicit, or [`default_canvas`].
    #[must_use]
    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas
            .unwrap_or_else(|| default_canvas(&self.text, self.font_size))
    }

    /// Scale such that one em spans `font_size` pixels.
    fn scale(&self) -> PxScale {
        let size = self.font_size as f32;
        let em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * self.font.height_unscaled() / em)
    }

    /// Draw the glyphs' coverage onto a `width * height` luma canvas.
    #[must_use]
    pub fn coverage(&self) -> (u32, u32, Vec<u8>) {
        let (width, height) = self.canvas_size();
        let mut canvas = vec![0u8; width as usize * height as usize];

        let scale = self.scale();
        let ratio = scale.y / self.font.height_unscaled();
        let ascent = self.font.ascent_unscaled() * ratio;
        let line_height = (self.font.ascent_unscaled() - self.font.descent_unscaled()
            + self.font.line_gap_unscaled())
            * ratio;

        let mut baseline = self.offset.1 as f32 + ascent;
        for line in self.text.lines() {
            let mut pen = self.offset.0 as f32;
            let mut prev: Option<GlyphId> = None;
            for ch in line.chars() {
                let gid = self.font.glyph_id(ch);
                if let Some(p) = prev {
                    pen += self.font.kern_unscaled(p, gid) * ratio;
                }
                let glyph = gid.with_scale_and_position(scale, point(pen, baseline));
                if let Some(outline) = self.font.outline_glyph(glyph) {
                    let bounds = outline.px_bounds();
                    #[allow(clippy::cast_possible_wrap)]
                    outline.draw(|x, y, v| {
                        let px = x as i32 + bounds.min.x as i32;
                        let py = y as i32 + bounds.min.y as i32;
                        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                            let idx = py as usize * width as usize + px as usize;
                            let cov = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                            canvas[idx] = canvas[idx].max(cov);
                        }
                    });
                }
                pen += self.font.h_advance_unscaled(gid) * ratio;
                prev = Some(gid);
            }
            baseline += line_height;
        }

        log::debug!(
            "texte {:?} rasterisé sur {}x{} (taille {})",
            self.text,
            width,
            height,
            self.font_size
        );
        (width, height, canvas)
    }
}

/// Default canvas: `chars * size` wide, `2 * size` tall.
///
/// Multi-line text uses the longest line's character count, and grows by
/// `2 * size` per line.
///
/// # Example
/// ```
/// use cp_font::rasterizer::default_canvas;
/// assert_eq!(default_canvas("Hi!", 10), (30, 20));
/// ```
#[must_use]
pub fn default_canvas(text: &str, font_size: u32) -> (u32, u32) {
    let lines = text.lines().count().max(1) as u32;
    let longest = text
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(1) as u32;
    (
        longest.saturating_mul(font_size),
        lines.saturating_mul(font_size.saturating_mul(2)),
    )
}

impl PixelSource for TextSource {
    fn pixels(&self) -> anyhow::Result<PixelBuffer> {
        let (w, h, coverage) = self.coverage();
        let luma = PixelBuffer::from_luma(w, h, &coverage)?;
        Ok(binarize(&luma, self.threshold, self.fore, self.back))
    }

    fn name(&self) -> &str {
        &self.text
    }

    fn background(&self) -> Option<(u8, u8, u8, u8)> {
        Some(self.back.map_or((0, 0, 0, 0), |(r, g, b)| (r, g, b, 255)))
    }
}
