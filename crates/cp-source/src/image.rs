use std::path::Path;

use anyhow::{Context, Result};
use cp_core::frame::PixelBuffer;
use cp_core::traits::PixelSource;
use image::DynamicImage;

/// Source d'image statique, décodée à l'ouverture.
///
/// # Example
/// ```no_run
/// use cp_source::image::ImageSource;
/// use std::path::Path;
/// let source = ImageSource::open(Path::new("photo.png")).unwrap();
/// ```
#[derive(Debug)]
pub struct ImageSource {
    buffer: PixelBuffer,
    name: String,
}

impl ImageSource {
    /// Load an image from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or decoded.
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("Impossible de charger {}", path.display()))?;
        let source = Self::from_dynamic(img, path.display().to_string())?;
        log::debug!(
            "image chargée : {} ({}x{})",
            source.name,
            source.buffer.width(),
            source.buffer.height()
        );
        Ok(source)
    }

    /// Wrap an already decoded image.
    ///
    /// # Errors
    /// Returns an error if the pixel data does not match the dimensions.
    ///
    /// # Example
    /// ```
    /// use cp_core::traits::PixelSource;
    /// use cp_source::image::ImageSource;
    /// use image::{DynamicImage, Rgb, RgbImage};
    ///
    /// let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])));
    /// let source = ImageSource::from_dynamic(img, "mem").unwrap();
    /// assert_eq!(source.pixels().unwrap().pixel(2, 1), (1, 2, 3, 255));
    /// ```
    pub fn from_dynamic(img: DynamicImage, name: impl Into<String>) -> Result<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let buffer = PixelBuffer::from_rgba(width, height, rgba.into_raw())?;
        Ok(Self {
            buffer,
            name: name.into(),
        })
    }

    /// Buffer décodé.
    #[must_use]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
}

impl PixelSource for ImageSource {
    fn pixels(&self) -> Result<PixelBuffer> {
        Ok(self.buffer.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
