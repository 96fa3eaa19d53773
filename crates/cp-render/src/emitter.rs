use std::fmt::Write;

use cp_core::color::ColorCode;
use cp_core::frame::Grid;

/// Reset complet des attributs.
pub const RESET: &str = "\x1b[0m";

/// Plan de couleur d'une séquence SGR.
#[derive(Clone, Copy)]
enum Layer {
    Foreground,
    Background,
}

/// Sérialise une grille en chaîne imprimable avec séquences SGR.
///
/// Styles are written only when they change within a row; every row starts
/// from a clean state and ends with a full reset, so nothing bleeds into the
/// surrounding shell output. Rows are joined by `\n`, without a trailing
/// newline.
///
/// # Example
/// ```
/// use cp_core::color::ColorCode;
/// use cp_core::frame::{Cell, Grid};
/// use cp_render::emitter::emit;
///
/// let mut grid = Grid::new(2, 1);
/// grid.set(0, 0, Cell { ch: '█', fg: Some(ColorCode::Rgb(255, 0, 0)), bg: None });
/// grid.set(1, 0, Cell { ch: '█', fg: Some(ColorCode::Rgb(255, 0, 0)), bg: None });
/// assert_eq!(emit(&grid), "\x1b[38;2;255;0;0m██\x1b[0m");
/// ```
#[must_use]
pub fn emit(grid: &Grid) -> String {
    let mut out = String::with_capacity(grid.cells.len() * 4 + grid.height as usize * 8);

    for (y, row) in grid.rows().enumerate() {
        if y > 0 {
            out.push('\n');
        }
        let mut fg: Option<ColorCode> = None;
        let mut bg: Option<ColorCode> = None;

        for cell in row {
            if cell.fg != fg || cell.bg != bg {
                let dropped =
                    (fg.is_some() && cell.fg.is_none()) || (bg.is_some() && cell.bg.is_none());
                if dropped {
                    out.push_str(RESET);
                    fg = None;
                    bg = None;
                }
                if cell.fg != fg
                    && let Some(c) = cell.fg
                {
                    push_sgr(&mut out, Layer::Foreground, c);
                }
                if cell.bg != bg
                    && let Some(c) = cell.bg
                {
                    push_sgr(&mut out, Layer::Background, c);
                }
                fg = cell.fg;
                bg = cell.bg;
            }
            out.push(cell.ch);
        }
        out.push_str(RESET);
    }
    out
}

/// `ESC[38;2;R;G;Bm`, `ESC[48;5;Nm`, etc.
#[inline]
fn push_sgr(out: &mut String, layer: Layer, code: ColorCode) {
    let base = match layer {
        Layer::Foreground => 38,
        Layer::Background => 48,
    };
    // fmt::Write sur String est infaillible.
    let _ = match code {
        ColorCode::Rgb(r, g, b) => write!(out, "\x1b[{base};2;{r};{g};{b}m"),
        ColorCode::Indexed(n) => write!(out, "\x1b[{base};5;{n}m"),
    };
}

#[cfg(test)]
mod tests {
    use cp_core::frame::Cell;

    use super::*;

    fn colored(ch: char, fg: Option<ColorCode>, bg: Option<ColorCode>) -> Cell {
        Cell { ch, fg, bg }
    }

    #[test]
    fn every_row_is_reset_terminated() {
        let grid = Grid::new(3, 4);
        let out = emit(&grid);
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 4);
        for line in lines {
            assert_eq!(line, format!("   {RESET}"));
        }
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn plain_cells_emit_no_color_codes() {
        let mut grid = Grid::new(2, 1);
        grid.set(0, 0, Cell::plain('#'));
        grid.set(1, 0, Cell::plain(':'));
        assert_eq!(emit(&grid), format!("#:{RESET}"));
    }

    #[test]
    fn fg_and_bg_emitted_separately() {
        let mut grid = Grid::new(1, 1);
        grid.set(
            0,
            0,
            colored('▀', Some(ColorCode::Rgb(1, 2, 3)), Some(ColorCode::Rgb(4, 5, 6))),
        );
        assert_eq!(
            emit(&grid),
            format!("\x1b[38;2;1;2;3m\x1b[48;2;4;5;6m▀{RESET}")
        );
    }

    #[test]
    fn only_changed_layer_is_rewritten() {
        let red = Some(ColorCode::Rgb(255, 0, 0));
        let blue = Some(ColorCode::Rgb(0, 0, 255));
        let mut grid = Grid::new(3, 1);
        grid.set(0, 0, colored('▀', red, blue));
        grid.set(1, 0, colored('▀', red, red));
        grid.set(2, 0, colored('▀', red, red));
        assert_eq!(
            emit(&grid),
            format!(
                "\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m▀\x1b[48;2;255;0;0m▀▀{RESET}"
            )
        );
    }

    #[test]
    fn dropping_a_color_resets_first() {
        let mut grid = Grid::new(3, 1);
        grid.set(0, 0, colored('█', Some(ColorCode::Rgb(9, 9, 9)), None));
        grid.set(1, 0, Cell::default());
        grid.set(2, 0, colored('█', Some(ColorCode::Rgb(9, 9, 9)), None));
        assert_eq!(
            emit(&grid),
            format!("\x1b[38;2;9;9;9m█{RESET} \x1b[38;2;9;9;9m█{RESET}")
        );
    }

    #[test]
    fn rows_do_not_share_escape_state() {
        let c = Some(ColorCode::Rgb(7, 7, 7));
        let mut grid = Grid::new(1, 2);
        grid.set(0, 0, colored('█', c, None));
        grid.set(0, 1, colored('█', c, None));
        let line = format!("\x1b[38;2;7;7;7m█{RESET}");
        assert_eq!(emit(&grid), format!("{line}\n{line}"));
    }

    #[test]
    fn indexed_colors_use_256_palette_codes() {
        let mut grid = Grid::new(1, 1);
        grid.set(
            0,
            0,
            colored('▀', Some(ColorCode::Indexed(196)), Some(ColorCode::Indexed(21))),
        );
        assert_eq!(emit(&grid), format!("\x1b[38;5;196m\x1b[48;5;21m▀{RESET}"));
    }
}
