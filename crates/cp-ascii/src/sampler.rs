//! Échantillonnage du buffer source vers la résolution de la grille.
//!
//! Block boundaries: output index `o` out of `t` covers the half-open
//! source range `[floor(o*s/t), max(floor((o+1)*s/t), floor(o*s/t) + 1))`.
//! Downsampling partitions the source exactly; upsampling degenerates to a
//! single-pixel lookup (block replication). Means are rounded to nearest.

use cp_core::config::RenderConfig;
use cp_core::error::CoreError;
use cp_core::frame::PixelBuffer;

/// Dimensions produced by the sampler for a given source and config.
///
/// # Example
/// ```
/// use cp_ascii::sampler::target_dims;
/// use cp_core::config::{RenderConfig, RenderMode};
/// let config = RenderConfig::new(20).with_mode(RenderMode::Color);
/// let dims = target_dims(100, 100, &config).unwrap();
/// assert_eq!((dims.columns, dims.rows, dims.sample_rows), (20, 10, 10));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDims {
    /// Character columns.
    pub columns: u32,
    /// Character rows.
    pub rows: u32,
    /// Rows in the sampled buffer (2 × rows in half-block modes).
    pub sample_rows: u32,
}

/// Compute grid dimensions from the source size.
///
/// `rows = round(src_h * width / src_w * cell_aspect)`, at least 1, unless
/// `config.height` is set. Half-block modes sample twice as many rows.
///
/// # Errors
/// [`CoreError::InvalidConfig`] for a zero width/height,
/// [`CoreError::MalformedInput`] for an empty source.
pub fn target_dims(
    src_w: u32,
    src_h: u32,
    config: &RenderConfig,
) -> Result<TargetDims, CoreError> {
    if config.width == 0 || config.height == Some(0) {
        return Err(CoreError::InvalidConfig("dimensions cibles nulles".into()));
    }
    if src_w == 0 || src_h == 0 {
        return Err(CoreError::MalformedInput {
            width: src_w,
            height: src_h,
        });
    }

    let rows = config.height.unwrap_or_else(|| {
        let scaled = f64::from(src_h) * f64::from(config.width) / f64::from(src_w)
            * f64::from(config.cell_aspect);
        (scaled.round() as u32).max(1)
    });
    let sample_rows = if config.mode.is_half_block() {
        rows.saturating_mul(2)
    } else {
        rows
    };

    Ok(TargetDims {
        columns: config.width,
        rows,
        sample_rows,
    })
}

/// Sample `buffer` to the grid resolution implied by `config`.
///
/// # Errors
/// Same as [`target_dims`].
///
/// # Example
/// ```
/// use cp_ascii::sampler::sample;
/// use cp_core::config::{RenderConfig, RenderMode};
/// use cp_core::frame::PixelBuffer;
/// let src = PixelBuffer::filled(40, 40, (9, 9, 9, 255));
/// let config = RenderConfig::new(10).with_mode(RenderMode::HalfColor);
/// let out = sample(&src, &config).unwrap();
/// assert_eq!((out.width(), out.height()), (10, 10));
/// ```
pub fn sample(buffer: &PixelBuffer, config: &RenderConfig) -> Result<PixelBuffer, CoreError> {
    let dims = target_dims(buffer.width(), buffer.height(), config)?;
    log::debug!(
        "échantillonnage {}x{} → {}x{} ({} lignes de cellules, mode {})",
        buffer.width(),
        buffer.height(),
        dims.columns,
        dims.sample_rows,
        dims.rows,
        config.mode
    );
    Ok(resample(buffer, dims.columns, dims.sample_rows))
}

/// Block-average `src` into a `width × height` buffer.
///
/// Color channels are weighted by alpha so transparent pixels do not darken
/// a block; alpha itself is a plain mean. A block with zero total alpha
/// averages its colors unweighted.
#[must_use]
pub fn resample(src: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if src.is_empty() || width == 0 || height == 0 {
        return PixelBuffer::filled(width, height, (0, 0, 0, 0));
    }
    if src.width() == width && src.height() == height {
        return src.clone();
    }

    let x_spans: Vec<(u32, u32)> = (0..width).map(|o| span(o, width, src.width())).collect();
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);

    for oy in 0..height {
        let (y0, y1) = span(oy, height, src.height());
        for &(x0, x1) in &x_spans {
            let mut acc = BlockAcc::default();
            for y in y0..y1 {
                let row = src.row(y);
                for px in row[x0 as usize * 4..x1 as usize * 4].chunks_exact(4) {
                    acc.add(px[0], px[1], px[2], px[3]);
                }
            }
            data.extend_from_slice(&acc.mean());
        }
    }

    // Dimensions cohérentes par construction.
    PixelBuffer::from_rgba(width, height, data)
        .unwrap_or_else(|_| PixelBuffer::filled(width, height, (0, 0, 0, 0)))
}

/// Source range `[start, end)` covered by output index `o` of `t` over `s`.
#[inline]
fn span(o: u32, t: u32, s: u32) -> (u32, u32) {
    let start = (u64::from(o) * u64::from(s) / u64::from(t)) as u32;
    let end = (u64::from(o + 1) * u64::from(s) / u64::from(t)) as u32;
    let start = start.min(s - 1);
    (start, end.max(start + 1).min(s))
}

#[derive(Default)]
struct BlockAcc {
    n: u64,
    alpha: u64,
    weighted: [u64; 3],
    plain: [u64; 3],
}

impl BlockAcc {
    #[inline(always)]
    fn add(&mut self, r: u8, g: u8, b: u8, a: u8) {
        let a64 = u64::from(a);
        self.n += 1;
        self.alpha += a64;
        for (i, c) in [r, g, b].into_iter().enumerate() {
            self.weighted[i] += u64::from(c) * a64;
            self.plain[i] += u64::from(c);
        }
    }

    fn mean(&self) -> [u8; 4] {
        let div = |sum: u64, n: u64| ((sum + n / 2) / n) as u8;
        let rgb = if self.alpha > 0 {
            self.weighted.map(|s| div(s, self.alpha))
        } else {
            self.plain.map(|s| div(s, self.n))
        };
        [rgb[0], rgb[1], rgb[2], div(self.alpha, self.n)]
    }
}

/// Strip edge rows/columns that are fully transparent or equal to the
/// background reference (the top-left pixel), from the outside in.
///
/// Each side stops at its first non-trivial line. A buffer made only of
/// trivial pixels is returned unchanged.
///
/// # Example
/// ```
/// use cp_ascii::sampler::trim_border;
/// use cp_core::frame::PixelBuffer;
/// let mut data = vec![0u8; 5 * 5 * 4];
/// let center = (2 * 5 + 2) * 4;
/// data[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);
/// let src = PixelBuffer::from_rgba(5, 5, data).unwrap();
/// let trimmed = trim_border(&src);
/// assert_eq!((trimmed.width(), trimmed.height()), (1, 1));
/// ```
#[must_use]
pub fn trim_border(buffer: &PixelBuffer) -> PixelBuffer {
    if buffer.is_empty() {
        return buffer.clone();
    }
    trim_border_against(buffer, buffer.pixel(0, 0))
}

/// Same as [`trim_border`], with an explicit background reference.
///
/// For sources that know their background (rasterized text), ink touching
/// the corner is never taken for border.
#[must_use]
pub fn trim_border_against(buffer: &PixelBuffer, reference: (u8, u8, u8, u8)) -> PixelBuffer {
    if buffer.is_empty() {
        return buffer.clone();
    }
    let trivial = |x: u32, y: u32| {
        let px = buffer.pixel(x, y);
        px.3 == 0 || px == reference
    };
    let row_trivial = |y: u32, x0: u32, x1: u32| (x0..x1).all(|x| trivial(x, y));
    let col_trivial = |x: u32, y0: u32, y1: u32| (y0..y1).all(|y| trivial(x, y));

    let (w, h) = (buffer.width(), buffer.height());
    let (mut top, mut bottom, mut left, mut right) = (0, h, 0, w);

    while top < bottom && row_trivial(top, left, right) {
        top += 1;
    }
    if top == bottom {
        return buffer.clone();
    }
    while bottom > top && row_trivial(bottom - 1, left, right) {
        bottom -= 1;
    }
    while left < right && col_trivial(left, top, bottom) {
        left += 1;
    }
    while right > left && col_trivial(right - 1, top, bottom) {
        right -= 1;
    }

    if (top, bottom, left, right) == (0, h, 0, w) {
        return buffer.clone();
    }
    log::debug!(
        "bordure rognée : {w}x{h} → {}x{} à ({left}, {top})",
        right - left,
        bottom - top
    );
    buffer.crop(left, top, right - left, bottom - top)
}
