use crate::error::CoreError;

/// 10 caractères: compact, bon contraste. Charset par défaut.
pub const CHARSET_COMPACT: &str = " .:-=+*#%@";

/// 70 caractères: Paul Bourke extended, bon équilibre.
pub const CHARSET_STANDARD: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Blocs Unicode: pseudo-pixels.
pub const CHARSET_BLOCKS: &str = " ░▒▓█";

/// Deux niveaux : fond / encre. Défaut pour le rendu de texte.
pub const CHARSET_BINARY: &str = " #";

/// Resolve a built-in charset by name.
///
/// # Example
/// ```
/// use cp_core::charset::{preset, CHARSET_BLOCKS};
/// assert_eq!(preset("blocks"), Some(CHARSET_BLOCKS));
/// assert_eq!(preset("nope"), None);
/// ```
#[must_use]
pub fn preset(name: &str) -> Option<&'static str> {
    match name {
        "compact" => Some(CHARSET_COMPACT),
        "standard" => Some(CHARSET_STANDARD),
        "blocks" => Some(CHARSET_BLOCKS),
        "binary" => Some(CHARSET_BINARY),
        _ => None,
    }
}

/// Density charset ordered lightest→densest, with a pre-computed lookup
/// table mapping intensity [0..255] → character.
///
/// Bucket index = `intensity * (len - 1) / 255`, so the highest intensity
/// always lands on the densest glyph.
///
/// # Example
/// ```
/// use cp_core::charset::Charset;
/// let cs = Charset::new(" .:#@").unwrap();
/// assert_eq!(cs.map(0, false), ' ');
/// assert_eq!(cs.map(255, false), '@');
/// assert_eq!(cs.map(255, true), ' ');
/// ```
#[derive(Clone, Debug)]
pub struct Charset {
    chars: Vec<char>,
    lut: [char; 256],
}

impl Charset {
    /// Build a charset and its LUT.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] if the charset has fewer than 2
    /// characters.
    pub fn new(charset: &str) -> Result<Self, CoreError> {
        let chars: Vec<char> = charset.chars().collect();
        if chars.len() < 2 {
            return Err(CoreError::InvalidConfig(format!(
                "le charset doit contenir au moins 2 caractères, reçu {charset:?}"
            )));
        }
        let mut lut = [' '; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = chars[bucket(i as u8, chars.len())];
        }
        Ok(Self { chars, lut })
    }

    /// Map an intensity to a glyph. `invert` flips the intensity
    /// (`255 - intensity`) before the lookup.
    #[inline(always)]
    #[must_use]
    pub fn map(&self, intensity: u8, invert: bool) -> char {
        let i = if invert { 255 - intensity } else { intensity };
        self.lut[i as usize]
    }

    /// Position in the charset a given intensity lands on.
    #[inline]
    #[must_use]
    pub fn bucket_index(&self, intensity: u8, invert: bool) -> usize {
        let i = if invert { 255 - intensity } else { intensity };
        bucket(i, self.chars.len())
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Toujours faux : un charset valide a au moins 2 glyphes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Glyphes, du plus clair au plus dense.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

#[inline]
fn bucket(intensity: u8, len: usize) -> usize {
    (usize::from(intensity) * (len - 1) / 255).min(len - 1)
}
