use cp_core::color::{ColorCode, Rgb, quantize, to_gray};
use cp_core::config::{ColorDepth, RenderMode};

/// Map a cell color according to the render mode: gray modes quantize the
/// neutral gray of equal luminance, color modes the source RGB.
///
/// # Example
/// ```
/// use cp_ascii::color_map::map_color;
/// use cp_core::color::ColorCode;
/// use cp_core::config::{ColorDepth, RenderMode};
/// let c = map_color((200, 50, 50), RenderMode::Color, ColorDepth::TrueColor);
/// assert_eq!(c, ColorCode::Rgb(200, 50, 50));
/// let g = map_color((255, 0, 0), RenderMode::HalfGray, ColorDepth::TrueColor);
/// assert_eq!(g, ColorCode::Rgb(76, 76, 76));
/// ```
#[inline]
#[must_use]
pub fn map_color(rgb: Rgb, mode: RenderMode, depth: ColorDepth) -> ColorCode {
    let rgb = if mode.is_gray() { to_gray(rgb) } else { rgb };
    quantize(rgb, depth)
}
