/// Rasterisation de texte pour cellpaint.
///
/// Turns a string and a TTF/OTF font into a pixel buffer that renders like
/// any other image.
pub mod binarize;
pub mod rasterizer;

pub use binarize::binarize;
pub use rasterizer::TextSource;
