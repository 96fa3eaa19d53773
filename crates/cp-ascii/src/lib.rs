/// Moteur de conversion pixels → cellules pour cellpaint.
///
/// Samples pixel buffers onto a character grid and composes glyphs and
/// color codes per render mode.
pub mod color_map;
pub mod compositor;
pub mod halfblock;
pub mod luminance;
pub mod sampler;

pub use compositor::Compositor;
