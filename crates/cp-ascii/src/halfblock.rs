use cp_core::config::RenderConfig;
use cp_core::frame::{Cell, Grid, PixelBuffer};

use crate::color_map::map_color;

/// Demi-bloc supérieur : fg = pixel haut, bg = pixel bas.
pub const UPPER_HALF: char = '▀';

/// Demi-bloc inférieur, utilisé quand seul le pixel bas est visible.
pub const LOWER_HALF: char = '▄';

/// Process frame in half-block mode (▀ character).
///
/// Each terminal cell covers 2 vertical pixels: sampled row `2y` is the top
/// half (fg), row `2y + 1` the bottom half (bg). A transparent half keeps
/// the terminal background; a missing last row counts as transparent.
///
/// # Example
/// ```
/// use cp_core::config::{RenderConfig, RenderMode};
/// use cp_core::frame::{Grid, PixelBuffer};
/// use cp_ascii::halfblock::process_halfblock;
///
/// let frame = PixelBuffer::filled(4, 4, (0, 0, 255, 255));
/// let mut grid = Grid::new(4, 2);
/// let config = RenderConfig::new(4).with_mode(RenderMode::HalfColor);
/// process_halfblock(&frame, &config, &mut grid);
/// assert_eq!(grid.get(3, 1).ch, '▀');
/// ```
pub fn process_halfblock(frame: &PixelBuffer, config: &RenderConfig, grid: &mut Grid) {
    let visible = |a: u8| a >= config.alpha_threshold;
    let color = |r, g, b| map_color((r, g, b), config.mode, config.color_depth);

    for (cy, row) in grid.cells.chunks_mut(grid.width as usize).enumerate() {
        let py_top = cy as u32 * 2;
        let py_bot = py_top + 1;
        for (cx, cell) in row.iter_mut().enumerate() {
            let px = cx as u32;
            let (tr, tg, tb, ta) = frame.pixel(px, py_top);
            let bottom = (py_bot < frame.height())
                .then(|| frame.pixel(px, py_bot))
                .filter(|&(_, _, _, a)| visible(a));

            *cell = match (visible(ta), bottom) {
                (true, Some((br, bg, bb, _))) => Cell {
                    ch: UPPER_HALF,
                    fg: Some(color(tr, tg, tb)), // Top pixel = fg
                    bg: Some(color(br, bg, bb)), // Bottom pixel = bg
                },
                (true, None) => Cell {
                    ch: UPPER_HALF,
                    fg: Some(color(tr, tg, tb)),
                    bg: None,
                },
                (false, Some((br, bg, bb, _))) => Cell {
                    ch: LOWER_HALF,
                    fg: Some(color(br, bg, bb)),
                    bg: None,
                },
                (false, None) => Cell::default(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use cp_core::color::ColorCode;
    use cp_core::config::RenderMode;

    use super::*;

    fn column(pixels: &[(u8, u8, u8, u8)]) -> PixelBuffer {
        let data = pixels.iter().flat_map(|&(r, g, b, a)| [r, g, b, a]).collect();
        PixelBuffer::from_rgba(1, pixels.len() as u32, data).unwrap()
    }

    fn run(frame: &PixelBuffer, mode: RenderMode) -> Grid {
        let mut grid = Grid::new(1, frame.height().div_ceil(2));
        process_halfblock(frame, &RenderConfig::new(1).with_mode(mode), &mut grid);
        grid
    }

    #[test]
    fn top_is_fg_bottom_is_bg() {
        let grid = run(&column(&[(255, 0, 0, 255), (0, 0, 255, 255)]), RenderMode::HalfColor);
        let cell = grid.get(0, 0);
        assert_eq!(cell.ch, UPPER_HALF);
        assert_eq!(cell.fg, Some(ColorCode::Rgb(255, 0, 0)));
        assert_eq!(cell.bg, Some(ColorCode::Rgb(0, 0, 255)));
    }

    #[test]
    fn half_gray_uses_luminance() {
        let grid = run(&column(&[(255, 0, 0, 255), (0, 0, 255, 255)]), RenderMode::HalfGray);
        let cell = grid.get(0, 0);
        assert_eq!(cell.fg, Some(ColorCode::Rgb(76, 76, 76)));
        assert_eq!(cell.bg, Some(ColorCode::Rgb(29, 29, 29)));
    }

    #[test]
    fn odd_last_row_has_no_background() {
        let grid = run(
            &column(&[(1, 1, 1, 255), (2, 2, 2, 255), (3, 3, 3, 255)]),
            RenderMode::HalfColor,
        );
        assert_eq!(grid.height, 2);
        let last = grid.get(0, 1);
        assert_eq!(last.fg, Some(ColorCode::Rgb(3, 3, 3)));
        assert_eq!(last.bg, None);
    }

    #[test]
    fn transparent_top_uses_lower_half() {
        let grid = run(&column(&[(9, 9, 9, 0), (0, 255, 0, 255)]), RenderMode::HalfColor);
        let cell = grid.get(0, 0);
        assert_eq!(cell.ch, LOWER_HALF);
        assert_eq!(cell.fg, Some(ColorCode::Rgb(0, 255, 0)));
        assert_eq!(cell.bg, None);
    }

    #[test]
    fn fully_transparent_cell_is_blank() {
        let grid = run(&column(&[(9, 9, 9, 0), (9, 9, 9, 3)]), RenderMode::HalfColor);
        assert_eq!(*grid.get(0, 0), Cell::default());
    }
}
