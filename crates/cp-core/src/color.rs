use crate::config::ColorDepth;

/// Couleur RGB [0,255].
pub type Rgb = (u8, u8, u8);

/// Niveaux du cube 6×6×6 xterm.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Paramètres de couleur représentables par une séquence SGR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorCode {
    /// 24-bit truecolor (`38;2;R;G;B`).
    Rgb(u8, u8, u8),
    /// Index de la palette 256 couleurs (`38;5;N`).
    Indexed(u8),
}

/// Luminance perceptuelle BT.601, arithmétique entière arrondie.
///
/// # Example
/// ```
/// use cp_core::color::luminance;
/// assert_eq!(luminance(255, 255, 255), 255);
/// assert_eq!(luminance(255, 0, 0), 76);
/// assert_eq!(luminance(0, 0, 0), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114 + 500) / 1000) as u8
}

/// Gris neutre de même luminance.
#[inline]
#[must_use]
pub fn to_gray(rgb: Rgb) -> Rgb {
    let i = luminance(rgb.0, rgb.1, rgb.2);
    (i, i, i)
}

/// Convert a color into escape-code parameters for the given depth.
///
/// # Example
/// ```
/// use cp_core::color::{quantize, ColorCode};
/// use cp_core::config::ColorDepth;
/// assert_eq!(quantize((200, 50, 50), ColorDepth::TrueColor), ColorCode::Rgb(200, 50, 50));
/// assert_eq!(quantize((255, 0, 0), ColorDepth::Palette256), ColorCode::Indexed(196));
/// ```
#[must_use]
pub fn quantize(rgb: Rgb, depth: ColorDepth) -> ColorCode {
    match depth {
        ColorDepth::TrueColor => ColorCode::Rgb(rgb.0, rgb.1, rgb.2),
        ColorDepth::Palette256 => ColorCode::Indexed(to_palette256(rgb)),
    }
}

/// Nearest xterm-256 index: 6×6×6 cube (16–231) or gray ramp (232–255).
#[must_use]
pub fn to_palette256(rgb: Rgb) -> u8 {
    let (r, g, b) = rgb;
    let (ri, gi, bi) = (cube_index(r), cube_index(g), cube_index(b));
    let cube = (
        CUBE_LEVELS[ri as usize],
        CUBE_LEVELS[gi as usize],
        CUBE_LEVELS[bi as usize],
    );
    let cube_idx = 16 + 36 * ri + 6 * gi + bi;

    let avg = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
    let step = (avg.saturating_sub(3) / 10).min(23) as u8;
    let level = 8 + 10 * step;
    let gray_idx = 232 + step;

    if distance_sq(rgb, (level, level, level)) < distance_sq(rgb, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

#[inline]
fn cube_index(c: u8) -> u8 {
    match c {
        0..48 => 0,
        48..115 => 1,
        _ => (c - 35) / 40,
    }
}

#[inline]
fn distance_sq(a: Rgb, b: Rgb) -> u32 {
    let d = |x: u8, y: u8| {
        let v = i32::from(x) - i32::from(y);
        (v * v) as u32
    };
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}
