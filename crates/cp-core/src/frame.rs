use crate::color::{ColorCode, luminance};
use crate::error::CoreError;

/// Buffer de pixels immuable, RGBA row-major, 4 bytes par pixel.
///
/// Toute transformation (échantillonnage, rognage, binarisation) produit un
/// nouveau buffer ; aucun pixel n'est modifié après construction.
///
/// # Example
/// ```
/// use cp_core::frame::PixelBuffer;
/// let pb = PixelBuffer::filled(10, 10, (255, 0, 0, 255));
/// assert_eq!(pb.as_raw().len(), 400);
/// assert_eq!(pb.pixel(3, 3), (255, 0, 0, 255));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedInput`] if `data.len() != width * height * 4`.
    ///
    /// # Example
    /// ```
    /// use cp_core::frame::PixelBuffer;
    /// assert!(PixelBuffer::from_rgba(2, 1, vec![0; 8]).is_ok());
    /// assert!(PixelBuffer::from_rgba(2, 1, vec![0; 7]).is_err());
    /// ```
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(CoreError::MalformedInput { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Crée un buffer uniforme.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: (u8, u8, u8, u8)) -> Self {
        let (r, g, b, a) = rgba;
        let data = [r, g, b, a].repeat(width as usize * height as usize);
        Self {
            data,
            width,
            height,
        }
    }

    /// Opaque grayscale buffer from one intensity byte per pixel.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedInput`] if `luma.len() != width * height`.
    ///
    /// # Example
    /// ```
    /// use cp_core::frame::PixelBuffer;
    /// let pb = PixelBuffer::from_luma(2, 1, &[0, 200]).unwrap();
    /// assert_eq!(pb.pixel(1, 0), (200, 200, 200, 255));
    /// ```
    pub fn from_luma(width: u32, height: u32, luma: &[u8]) -> Result<Self, CoreError> {
        if luma.len() != width as usize * height as usize {
            return Err(CoreError::MalformedInput { width, height });
        }
        let data = luma.iter().flat_map(|&v| [v, v, v, 255]).collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True si une des dimensions est nulle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        match self.data.get(idx..idx + 4) {
            Some(&[r, g, b, a]) => (r, g, b, a),
            _ => (0, 0, 0, 0),
        }
    }

    /// Luminance BT.601 du pixel.
    ///
    /// # Example
    /// ```
    /// use cp_core::frame::PixelBuffer;
    /// let pb = PixelBuffer::filled(1, 1, (255, 0, 0, 255));
    /// assert_eq!(pb.intensity(0, 0), 76);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn intensity(&self, x: u32, y: u32) -> u8 {
        let (r, g, b, _) = self.pixel(x, y);
        luminance(r, g, b)
    }

    /// Bytes of row `y`.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Copie la région `[x, x+w) × [y, y+h)` dans un nouveau buffer.
    ///
    /// The region is clipped to the buffer bounds.
    #[must_use]
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Self {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let w = w.min(self.width - x);
        let h = h.min(self.height - y);
        let mut data = Vec::with_capacity(w as usize * h as usize * 4);
        for row in y..y + h {
            let line = self.row(row);
            data.extend_from_slice(&line[x as usize * 4..(x + w) as usize * 4]);
        }
        Self {
            data,
            width: w,
            height: h,
        }
    }

    /// Applique `f` à chaque pixel et renvoie le buffer résultant.
    #[must_use]
    pub fn map_pixels<F>(&self, mut f: F) -> Self
    where
        F: FnMut((u8, u8, u8, u8)) -> (u8, u8, u8, u8),
    {
        let data = self
            .data
            .chunks_exact(4)
            .flat_map(|px| {
                let (r, g, b, a) = f((px[0], px[1], px[2], px[3]));
                [r, g, b, a]
            })
            .collect();
        Self {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Single cell of the output grid.
///
/// # Example
/// ```
/// use cp_core::frame::Cell;
/// let cell = Cell::default();
/// assert_eq!(cell.ch, ' ');
/// assert!(cell.fg.is_none() && cell.bg.is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Caractère à afficher.
    pub ch: char,
    /// Couleur foreground. `None` = couleur par défaut du terminal.
    pub fg: Option<ColorCode>,
    /// Couleur background. `None` = fond du terminal visible.
    pub bg: Option<ColorCode>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }
}

impl Cell {
    /// Glyph without any color codes.
    #[must_use]
    pub fn plain(ch: char) -> Self {
        Self {
            ch,
            fg: None,
            bg: None,
        }
    }
}

/// Grille de sortie, row-major, lignes de haut en bas.
///
/// # Example
/// ```
/// use cp_core::frame::{Cell, Grid};
/// let mut grid = Grid::new(8, 4);
/// grid.set(0, 0, Cell::plain('@'));
/// assert_eq!(grid.get(0, 0).ch, '@');
/// assert_eq!(grid.rows().count(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Flat array of cells, row-major.
    pub cells: Vec<Cell>,
    /// Width in characters.
    pub width: u32,
    /// Height in characters.
    pub height: u32,
}

impl Grid {
    /// Crée une grille remplie de cellules vides.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![Cell::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    /// Set a cell at position (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, cell: Cell) {
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    /// Get a cell reference at position (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &Cell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.width.max(1) as usize)
    }
}
