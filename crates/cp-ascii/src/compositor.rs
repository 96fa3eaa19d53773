use cp_core::charset::Charset;
use cp_core::config::{RenderConfig, RenderMode};
use cp_core::error::CoreError;
use cp_core::frame::{Cell, Grid, PixelBuffer};

use crate::color_map::map_color;
use crate::sampler;

/// Glyphe de remplissage du mode `color`.
pub const FULL_BLOCK: char = '█';

/// Compositor orchestre les différents modes de conversion pixel→cellule.
///
/// Built once per configuration: the config is validated and the density
/// LUT computed up front, so composing never fails.
///
/// # Example
/// ```
/// use cp_ascii::compositor::Compositor;
/// use cp_core::config::RenderConfig;
/// let c = Compositor::new(&RenderConfig::new(20)).unwrap();
/// assert!(Compositor::new(&RenderConfig::new(0)).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Compositor {
    config: RenderConfig,
    charset: Charset,
}

impl Compositor {
    /// Validate `config` and build the charset LUT.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: &RenderConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let charset = config.charset()?;
        let mut config = config.clone();
        config.clamp_all();
        Ok(Self { config, charset })
    }

    /// Grid size produced for a sampled buffer.
    #[must_use]
    pub fn grid_dims(&self, sampled: &PixelBuffer) -> (u32, u32) {
        let rows = if self.config.mode.is_half_block() {
            sampled.height().div_ceil(2)
        } else {
            sampled.height()
        };
        (sampled.width(), rows)
    }

    /// Compose an already sampled buffer into a grid, dispatching on the mode.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedInput`] if `sampled` has a zero dimension.
    ///
    /// # Example
    /// ```
    /// use cp_ascii::compositor::Compositor;
    /// use cp_core::config::{RenderConfig, RenderMode};
    /// use cp_core::frame::PixelBuffer;
    ///
    /// let compositor = Compositor::new(&RenderConfig::new(4).with_mode(RenderMode::HalfGray)).unwrap();
    /// let sampled = PixelBuffer::filled(4, 6, (10, 20, 30, 255));
    /// let grid = compositor.compose(&sampled).unwrap();
    /// assert_eq!((grid.width, grid.height), (4, 3));
    /// ```
    pub fn compose(&self, sampled: &PixelBuffer) -> Result<Grid, CoreError> {
        if sampled.is_empty() {
            return Err(CoreError::MalformedInput {
                width: sampled.width(),
                height: sampled.height(),
            });
        }
        let (w, h) = self.grid_dims(sampled);
        let mut grid = Grid::new(w, h);
        match self.config.mode {
            RenderMode::Ascii | RenderMode::Gray => {
                crate::luminance::process_density(sampled, &self.config, &self.charset, &mut grid);
            }
            RenderMode::HalfColor | RenderMode::HalfGray => {
                crate::halfblock::process_halfblock(sampled, &self.config, &mut grid);
            }
            RenderMode::Color => self.process_fill(sampled, &mut grid),
        }
        Ok(grid)
    }

    /// Full pipeline from a source buffer: trim, sample, compose.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedInput`] for an empty source.
    ///
    /// # Example
    /// ```
    /// use cp_ascii::compositor::Compositor;
    /// use cp_core::config::{RenderConfig, RenderMode};
    /// use cp_core::frame::PixelBuffer;
    ///
    /// let compositor = Compositor::new(&RenderConfig::new(8).with_mode(RenderMode::Color)).unwrap();
    /// let grid = compositor.render_grid(&PixelBuffer::filled(16, 16, (0, 255, 0, 255))).unwrap();
    /// assert_eq!((grid.width, grid.height), (8, 4));
    /// assert!(compositor.render_grid(&PixelBuffer::filled(0, 16, (0, 0, 0, 0))).is_err());
    /// ```
    pub fn render_grid(&self, source: &PixelBuffer) -> Result<Grid, CoreError> {
        self.render_grid_on(source, None)
    }

    /// [`Compositor::render_grid`] with a known background for `trim_border`.
    /// `None` uses the top-left pixel.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedInput`] for an empty source.
    pub fn render_grid_on(
        &self,
        source: &PixelBuffer,
        background: Option<(u8, u8, u8, u8)>,
    ) -> Result<Grid, CoreError> {
        if source.is_empty() {
            return Err(CoreError::MalformedInput {
                width: source.width(),
                height: source.height(),
            });
        }
        let sampled = if self.config.trim_border {
            let trimmed = match background {
                Some(reference) => sampler::trim_border_against(source, reference),
                None => sampler::trim_border(source),
            };
            sampler::sample(&trimmed, &self.config)?
        } else {
            sampler::sample(source, &self.config)?
        };
        self.compose(&sampled)
    }

    /// Color mode: fixed fill glyph, source color as foreground.
    fn process_fill(&self, frame: &PixelBuffer, grid: &mut Grid) {
        let config = &self.config;
        for (cy, row) in grid.cells.chunks_mut(grid.width as usize).enumerate() {
            for (cx, cell) in row.iter_mut().enumerate() {
                let (r, g, b, a) = frame.pixel(cx as u32, cy as u32);
                *cell = if a < config.alpha_threshold {
                    Cell::default()
                } else {
                    Cell {
                        ch: FULL_BLOCK,
                        fg: Some(map_color((r, g, b), config.mode, config.color_depth)),
                        bg: None,
                    }
                };
            }
        }
    }
}

/// One-shot composition of a sampled buffer.
///
/// # Errors
/// Returns [`CoreError::InvalidConfig`] if the configuration is invalid, or
/// [`CoreError::MalformedInput`] for a zero-sized buffer.
pub fn compose(sampled: &PixelBuffer, config: &RenderConfig) -> Result<Grid, CoreError> {
    Compositor::new(config)?.compose(sampled)
}

#[cfg(test)]
mod tests {
    use cp_core::color::ColorCode;
    use cp_core::config::ColorDepth;

    use super::*;
    use crate::halfblock::UPPER_HALF;
    use crate::sampler::target_dims;

    fn from_fn(w: u32, h: u32, f: impl Fn(u32, u32) -> (u8, u8, u8, u8)) -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let (r, g, b, a) = f(x, y);
                data.extend_from_slice(&[r, g, b, a]);
            }
        }
        PixelBuffer::from_rgba(w, h, data).unwrap()
    }

    #[test]
    fn grid_matches_declared_dims_for_every_mode() {
        let src = from_fn(37, 23, |x, y| ((x * 7) as u8, (y * 11) as u8, 90, 255));
        for mode in RenderMode::ALL {
            for width in [1, 5, 16, 37, 80] {
                let config = RenderConfig::new(width).with_mode(mode);
                let dims = target_dims(37, 23, &config).unwrap();
                let grid = Compositor::new(&config).unwrap().render_grid(&src).unwrap();
                assert_eq!((grid.width, grid.height), (dims.columns, dims.rows), "{mode} w={width}");
                assert_eq!(grid.cells.len(), (dims.columns * dims.rows) as usize);
            }
        }
    }

    #[test]
    fn solid_red_ascii_is_mid_low_glyph() {
        let src = PixelBuffer::filled(4, 4, (255, 0, 0, 255));
        let config = RenderConfig::new(2).with_mode(RenderMode::Ascii);
        let grid = Compositor::new(&config).unwrap().render_grid(&src).unwrap();
        assert_eq!((grid.width, grid.height), (2, 1));
        assert!(grid.cells.iter().all(|c| c.ch == ':' && c.fg.is_none()));
    }

    #[test]
    fn square_cells_keep_source_aspect() {
        let src = PixelBuffer::filled(4, 4, (255, 0, 0, 255));
        let config = RenderConfig {
            cell_aspect: 1.0,
            ..RenderConfig::new(2).with_mode(RenderMode::Ascii)
        };
        let grid = Compositor::new(&config).unwrap().render_grid(&src).unwrap();
        assert_eq!((grid.width, grid.height), (2, 2));
    }

    #[test]
    fn solid_color_fills_every_cell() {
        let src = PixelBuffer::filled(30, 20, (12, 200, 99, 255));
        let config = RenderConfig::new(10).with_mode(RenderMode::Color);
        let grid = Compositor::new(&config).unwrap().render_grid(&src).unwrap();
        for cell in &grid.cells {
            assert_eq!(cell.ch, FULL_BLOCK);
            assert_eq!(cell.fg, Some(ColorCode::Rgb(12, 200, 99)));
            assert_eq!(cell.bg, None);
        }
    }

    #[test]
    fn palette_depth_reaches_cells() {
        let src = PixelBuffer::filled(4, 4, (255, 0, 0, 255));
        let config = RenderConfig {
            color_depth: ColorDepth::Palette256,
            ..RenderConfig::new(4).with_mode(RenderMode::Color)
        };
        let grid = Compositor::new(&config).unwrap().render_grid(&src).unwrap();
        assert_eq!(grid.get(0, 0).fg, Some(ColorCode::Indexed(196)));
    }

    #[test]
    fn half_color_split_lands_inside_one_cell() {
        // 2×6 : trois lignes rouges puis trois bleues → 3 cellules, 6 échantillons.
        let src = from_fn(2, 6, |_, y| if y < 3 { (255, 0, 0, 255) } else { (0, 0, 255, 255) });
        let config = RenderConfig::new(2).with_mode(RenderMode::HalfColor);
        let grid = Compositor::new(&config).unwrap().render_grid(&src).unwrap();
        assert_eq!(grid.height, 3);
        let red = Some(ColorCode::Rgb(255, 0, 0));
        let blue = Some(ColorCode::Rgb(0, 0, 255));
        for x in 0..2 {
            assert_eq!((grid.get(x, 0).fg, grid.get(x, 0).bg), (red, red));
            assert_eq!(grid.get(x, 1).ch, UPPER_HALF);
            assert_eq!((grid.get(x, 1).fg, grid.get(x, 1).bg), (red, blue));
            assert_eq!((grid.get(x, 2).fg, grid.get(x, 2).bg), (blue, blue));
        }
    }

    #[test]
    fn half_block_samples_twice_the_rows() {
        let src = from_fn(2, 6, |_, y| if y < 3 { (255, 0, 0, 255) } else { (0, 0, 255, 255) });
        let full = RenderConfig::new(2).with_mode(RenderMode::Color);
        let half = RenderConfig::new(2).with_mode(RenderMode::HalfColor);
        let full_grid = Compositor::new(&full).unwrap().render_grid(&src).unwrap();
        let half_grid = Compositor::new(&half).unwrap().render_grid(&src).unwrap();
        assert_eq!(full_grid.height, half_grid.height);
        // Plein bloc : la ligne du milieu moyenne rouge et bleu.
        assert_eq!(full_grid.get(0, 1).fg, Some(ColorCode::Rgb(128, 0, 128)));
    }

    #[test]
    fn transparent_cells_carry_no_color() {
        let src = from_fn(4, 4, |x, _| if x < 2 { (0, 0, 0, 0) } else { (255, 255, 255, 255) });
        for mode in RenderMode::ALL {
            let config = RenderConfig {
                cell_aspect: 1.0,
                ..RenderConfig::new(4).with_mode(mode)
            };
            let grid = Compositor::new(&config).unwrap().render_grid(&src).unwrap();
            for y in 0..grid.height {
                assert_eq!(*grid.get(0, y), Cell::default(), "{mode}");
                assert_ne!(grid.get(3, y).ch, ' ', "{mode}");
            }
        }
    }

    #[test]
    fn trim_border_runs_before_sampling() {
        let src = from_fn(8, 8, |x, y| {
            if (2..6).contains(&x) && (2..6).contains(&y) {
                (255, 255, 255, 255)
            } else {
                (0, 0, 0, 0)
            }
        });
        let config = RenderConfig {
            trim_border: true,
            cell_aspect: 1.0,
            ..RenderConfig::new(4).with_mode(RenderMode::Ascii)
        };
        let grid = Compositor::new(&config).unwrap().render_grid(&src).unwrap();
        assert_eq!((grid.width, grid.height), (4, 4));
        assert!(grid.cells.iter().all(|c| c.ch == '@'));
    }

    #[test]
    fn width_one_never_empty() {
        let src = PixelBuffer::filled(300, 2, (1, 2, 3, 255));
        for mode in RenderMode::ALL {
            let grid = compose(
                &sampler::sample(&src, &RenderConfig::new(1).with_mode(mode)).unwrap(),
                &RenderConfig::new(1).with_mode(mode),
            )
            .unwrap();
            assert_eq!(grid.width, 1);
            assert!(grid.height >= 1);
        }
    }

    #[test]
    fn zero_sized_sampled_buffer_is_malformed() {
        let no_columns = PixelBuffer::from_rgba(0, 3, Vec::new()).unwrap();
        let no_rows = PixelBuffer::from_rgba(3, 0, Vec::new()).unwrap();
        for mode in RenderMode::ALL {
            let config = RenderConfig::new(4).with_mode(mode);
            assert_eq!(
                compose(&no_columns, &config),
                Err(CoreError::MalformedInput {
                    width: 0,
                    height: 3
                }),
                "{mode}"
            );
            assert_eq!(
                compose(&no_rows, &config),
                Err(CoreError::MalformedInput {
                    width: 3,
                    height: 0
                }),
                "{mode}"
            );
        }
    }

    #[test]
    fn invalid_config_fails_before_sampling() {
        assert!(matches!(
            Compositor::new(&RenderConfig::new(0)),
            Err(CoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            Compositor::new(&RenderConfig::new(3).with_charset("")),
            Err(CoreError::InvalidConfig(_))
        ));
    }
}
