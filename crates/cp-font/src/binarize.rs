use cp_core::color::Rgb;
use cp_core::frame::PixelBuffer;

/// Seuil par défaut : quasiment toute couverture compte comme encre.
pub const DEFAULT_THRESHOLD: u8 = 5;

/// Convert a coverage/luma bitmap into a two-color buffer.
///
/// Pixels with coverage strictly above `threshold` take `fore`; the others
/// take `back`, or become fully transparent when `back` is `None`.
///
/// # Example
/// ```
/// use cp_core::frame::PixelBuffer;
/// use cp_font::binarize;
///
/// let coverage = PixelBuffer::from_luma(3, 1, &[0, 5, 6]).unwrap();
/// let out = binarize(&coverage, 5, (255, 255, 255), Some((0, 0, 0)));
/// assert_eq!(out.pixel(1, 0), (0, 0, 0, 255));
/// assert_eq!(out.pixel(2, 0), (255, 255, 255, 255));
/// ```
#[must_use]
pub fn binarize(coverage: &PixelBuffer, threshold: u8, fore: Rgb, back: Option<Rgb>) -> PixelBuffer {
    coverage.map_pixels(|(r, g, b, _)| {
        let ink = cp_core::color::luminance(r, g, b) > threshold;
        match (ink, back) {
            (true, _) => (fore.0, fore.1, fore.2, 255),
            (false, Some((br, bg, bb))) => (br, bg, bb, 255),
            (false, None) => (0, 0, 0, 0),
        }
    })
}
