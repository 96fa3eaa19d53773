use cp_core::charset::Charset;
use cp_core::color::luminance;
use cp_core::config::RenderConfig;
use cp_core::frame::{Cell, Grid, PixelBuffer};

use crate::color_map;

/// Plage d'intensité utilisée pour l'auto-contraste.
///
/// # Example
/// ```
/// use cp_ascii::luminance::IntensityRange;
/// let range = IntensityRange::new(50, 150);
/// assert_eq!(range.apply(50), 0);
/// assert_eq!(range.apply(150), 255);
/// assert_eq!(IntensityRange::new(80, 80).apply(80), 80);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntensityRange {
    min: u8,
    max: u8,
}

impl IntensityRange {
    /// Explicit range.
    #[must_use]
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Plage neutre [0, 255].
    #[must_use]
    pub fn identity() -> Self {
        Self { min: 0, max: 255 }
    }

    /// Min/max intensity over pixels with `alpha >= alpha_threshold`.
    /// Identity if no pixel is opaque.
    #[must_use]
    pub fn of_opaque(frame: &PixelBuffer, alpha_threshold: u8) -> Self {
        let mut range: Option<(u8, u8)> = None;
        for px in frame.as_raw().chunks_exact(4) {
            if px[3] < alpha_threshold {
                continue;
            }
            let i = luminance(px[0], px[1], px[2]);
            range = Some(match range {
                Some((lo, hi)) => (lo.min(i), hi.max(i)),
                None => (i, i),
            });
        }
        range.map_or_else(Self::identity, |(min, max)| Self { min, max })
    }

    /// Linear remap of `[min, max]` onto `[0, 255]`. A degenerate range
    /// leaves the value unchanged.
    #[inline]
    #[must_use]
    pub fn apply(&self, intensity: u8) -> u8 {
        if self.max <= self.min {
            return intensity;
        }
        let span = u32::from(self.max - self.min);
        let v = u32::from(intensity.clamp(self.min, self.max) - self.min);
        ((v * 255 + span / 2) / span) as u8
    }
}

/// Process a sampled frame in a density mode (ascii, gray).
///
/// One pixel per cell: the intensity picks the glyph through the charset,
/// gray mode adds a neutral foreground. Transparent pixels become blank
/// cells with no color.
///
/// # Example
/// ```
/// use cp_core::charset::Charset;
/// use cp_core::config::{RenderConfig, RenderMode};
/// use cp_core::frame::{Grid, PixelBuffer};
/// use cp_ascii::luminance::process_density;
///
/// let frame = PixelBuffer::filled(3, 2, (255, 255, 255, 255));
/// let mut grid = Grid::new(3, 2);
/// let config = RenderConfig::new(3).with_mode(RenderMode::Ascii);
/// let charset = Charset::new(" .:#@").unwrap();
/// process_density(&frame, &config, &charset, &mut grid);
/// assert_eq!(grid.get(2, 1).ch, '@');
/// ```
pub fn process_density(
    frame: &PixelBuffer,
    config: &RenderConfig,
    charset: &Charset,
    grid: &mut Grid,
) {
    let range = if config.stretch {
        IntensityRange::of_opaque(frame, config.alpha_threshold)
    } else {
        IntensityRange::identity()
    };
    let with_color = config.mode.is_gray();

    for (cy, row) in grid.cells.chunks_mut(grid.width as usize).enumerate() {
        for (cx, cell) in row.iter_mut().enumerate() {
            let (r, g, b, a) = frame.pixel(cx as u32, cy as u32);
            if a < config.alpha_threshold {
                *cell = Cell::default();
                continue;
            }
            let lum = range.apply(luminance(r, g, b));
            *cell = Cell {
                ch: charset.map(lum, config.invert),
                fg: with_color
                    .then(|| color_map::map_color((r, g, b), config.mode, config.color_depth)),
                bg: None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use cp_core::color::ColorCode;
    use cp_core::config::RenderMode;

    use super::*;

    fn row(pixels: &[(u8, u8, u8, u8)]) -> PixelBuffer {
        let data = pixels.iter().flat_map(|&(r, g, b, a)| [r, g, b, a]).collect();
        PixelBuffer::from_rgba(pixels.len() as u32, 1, data).unwrap()
    }

    #[test]
    fn ascii_has_no_color() {
        let frame = row(&[(255, 0, 0, 255), (0, 0, 0, 255)]);
        let mut grid = Grid::new(2, 1);
        let config = RenderConfig::new(2).with_mode(RenderMode::Ascii);
        process_density(&frame, &config, &config.charset().unwrap(), &mut grid);
        assert_eq!(grid.get(0, 0).ch, ':');
        assert_eq!(grid.get(1, 0).ch, ' ');
        assert!(grid.cells.iter().all(|c| c.fg.is_none() && c.bg.is_none()));
    }

    #[test]
    fn gray_adds_neutral_foreground() {
        let frame = row(&[(255, 0, 0, 255)]);
        let mut grid = Grid::new(1, 1);
        let config = RenderConfig::new(1).with_mode(RenderMode::Gray);
        process_density(&frame, &config, &config.charset().unwrap(), &mut grid);
        let cell = grid.get(0, 0);
        assert_eq!(cell.ch, ':');
        assert_eq!(cell.fg, Some(ColorCode::Rgb(76, 76, 76)));
        assert_eq!(cell.bg, None);
    }

    #[test]
    fn transparent_pixel_is_blank() {
        let frame = row(&[(255, 255, 255, 10)]);
        let mut grid = Grid::new(1, 1);
        let config = RenderConfig::new(1).with_mode(RenderMode::Gray);
        process_density(&frame, &config, &config.charset().unwrap(), &mut grid);
        assert_eq!(*grid.get(0, 0), Cell::default());
    }

    #[test]
    fn invert_swaps_extremes() {
        let frame = row(&[(255, 255, 255, 255), (0, 0, 0, 255)]);
        let mut grid = Grid::new(2, 1);
        let config = RenderConfig {
            invert: true,
            ..RenderConfig::new(2).with_mode(RenderMode::Ascii)
        };
        process_density(&frame, &config, &config.charset().unwrap(), &mut grid);
        assert_eq!(grid.get(0, 0).ch, ' ');
        assert_eq!(grid.get(1, 0).ch, '@');
    }

    #[test]
    fn stretch_spreads_narrow_range() {
        let frame = row(&[(100, 100, 100, 255), (120, 120, 120, 255)]);
        let mut grid = Grid::new(2, 1);
        let config = RenderConfig {
            stretch: true,
            ..RenderConfig::new(2).with_mode(RenderMode::Ascii)
        };
        process_density(&frame, &config, &config.charset().unwrap(), &mut grid);
        assert_eq!(grid.get(0, 0).ch, ' ');
        assert_eq!(grid.get(1, 0).ch, '@');
    }

    #[test]
    fn stretch_ignores_transparent_pixels() {
        let frame = row(&[(0, 0, 0, 0), (100, 100, 100, 255), (200, 200, 200, 255)]);
        assert_eq!(IntensityRange::of_opaque(&frame, 16), IntensityRange::new(100, 200));
    }
}
