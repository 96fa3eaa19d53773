use crate::frame::PixelBuffer;

/// Fournit un buffer de pixels normalisé au pipeline.
///
/// Implémenté par : `ImageSource`, `TextSource`. Le décodage (fichier, police)
/// reste du côté de la source ; le rendu ne voit que le buffer.
///
/// # Example
/// ```
/// use cp_core::traits::PixelSource;
/// use cp_core::frame::PixelBuffer;
///
/// struct Solid;
/// impl PixelSource for Solid {
///     fn pixels(&self) -> anyhow::Result<PixelBuffer> {
///         Ok(PixelBuffer::filled(4, 4, (0, 0, 255, 255)))
///     }
///     fn name(&self) -> &str { "solid" }
/// }
/// assert_eq!(Solid.pixels().unwrap().width(), 4);
/// ```
pub trait PixelSource {
    /// Produit le buffer RGBA.
    ///
    /// # Errors
    /// Returns an error if decoding or rasterization fails.
    fn pixels(&self) -> anyhow::Result<PixelBuffer>;

    /// Nom lisible pour les logs.
    fn name(&self) -> &str;

    /// Known background pixel, if any. `trim_border` trims against it instead
    /// of guessing from the top-left pixel.
    fn background(&self) -> Option<(u8, u8, u8, u8)> {
        None
    }
}

/// Destination of a rendered string.
///
/// Injected by the caller so the renderer never decides how or where text
/// is printed.
///
/// # Example
/// ```
/// use cp_core::traits::OutputSink;
///
/// struct Collect(Vec<String>);
/// impl OutputSink for Collect {
///     fn write_rendered(&mut self, text: &str) -> anyhow::Result<()> {
///         self.0.push(text.to_string());
///         Ok(())
///     }
/// }
/// let mut sink = Collect(Vec::new());
/// sink.write_rendered("x").unwrap();
/// assert_eq!(sink.0, ["x"]);
/// ```
pub trait OutputSink {
    /// Écrit une sortie rendue complète.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    fn write_rendered(&mut self, text: &str) -> anyhow::Result<()>;
}
