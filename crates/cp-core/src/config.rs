use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::{CHARSET_COMPACT, Charset};
use crate::error::CoreError;

/// Rapport largeur/hauteur d'une cellule terminal (≈ 1:2).
pub const DEFAULT_CELL_ASPECT: f32 = 0.5;

/// Alpha sous lequel un pixel est considéré transparent.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 16;

/// Configuration d'un rendu.
///
/// Sérialisable en TOML. `width` est obligatoire (> 0), le reste a une
/// valeur par défaut saine.
///
/// # Example
/// ```
/// use cp_core::config::{RenderConfig, RenderMode};
/// let config = RenderConfig::new(40);
/// assert_eq!(config.width, 40);
/// assert_eq!(config.mode, RenderMode::HalfColor);
/// assert!(config.validate().is_ok());
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RenderConfig {
    /// Colonnes cibles.
    pub width: u32,
    /// Lignes de cellules explicites. `None` = dérivé du ratio d'aspect.
    pub height: Option<u32>,
    /// Mode de rendu.
    pub mode: RenderMode,
    /// Charset personnalisé (du plus clair au plus dense).
    pub charset: Option<String>,
    /// Inverser l'intensité avant la recherche dans le charset.
    pub invert: bool,
    /// Rogner les bords transparents ou uniformes avant échantillonnage.
    pub trim_border: bool,
    /// Correction aspect ratio cellule (largeur / hauteur).
    pub cell_aspect: f32,
    /// Profondeur de couleur des séquences émises.
    pub color_depth: ColorDepth,
    /// Étirer la plage d'intensité sur [0, 255] avant le mapping densité.
    pub stretch: bool,
    /// Seuil de transparence.
    pub alpha_threshold: u8,
}

/// Render mode enumeration.
///
/// # Example
/// ```
/// use cp_core::config::RenderMode;
/// let mode: RenderMode = "half-gray".parse().unwrap();
/// assert!(mode.is_half_block());
/// assert!("sixel".parse::<RenderMode>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Glyphes de densité, sans couleur.
    Ascii,
    /// Bloc plein, couleur source en foreground.
    Color,
    /// Demi-bloc : pixel haut en fg, pixel bas en bg.
    #[default]
    HalfColor,
    /// Glyphes de densité, gris en foreground.
    Gray,
    /// Demi-bloc en niveaux de gris.
    HalfGray,
}

impl RenderMode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Ascii,
        Self::Color,
        Self::HalfColor,
        Self::Gray,
        Self::HalfGray,
    ];

    /// Two samples per cell (top/bottom).
    #[must_use]
    pub fn is_half_block(self) -> bool {
        matches!(self, Self::HalfColor | Self::HalfGray)
    }

    /// Glyph chosen by the density charset.
    #[must_use]
    pub fn uses_density(self) -> bool {
        matches!(self, Self::Ascii | Self::Gray)
    }

    /// Couleurs ramenées en gris.
    #[must_use]
    pub fn is_gray(self) -> bool {
        matches!(self, Self::Gray | Self::HalfGray)
    }

    /// Nom canonique.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Color => "color",
            Self::HalfColor => "half-color",
            Self::Gray => "gray",
            Self::HalfGray => "half-gray",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                CoreError::InvalidConfig(format!(
                    "mode inconnu {s:?} (attendu : ascii, color, half-color, gray, half-gray)"
                ))
            })
    }
}

/// Color depth of the emitted escape sequences.
///
/// # Example
/// ```
/// use cp_core::config::ColorDepth;
/// assert_eq!(ColorDepth::default(), ColorDepth::TrueColor);
/// assert_eq!("palette256".parse::<ColorDepth>().unwrap(), ColorDepth::Palette256);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum ColorDepth {
    /// 24-bit, passthrough.
    #[default]
    #[serde(rename = "truecolor")]
    TrueColor,
    /// Palette xterm 256 couleurs.
    #[serde(rename = "palette256")]
    Palette256,
}

impl FromStr for ColorDepth {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "truecolor" => Ok(Self::TrueColor),
            "palette256" => Ok(Self::Palette256),
            _ => Err(CoreError::InvalidConfig(format!(
                "profondeur de couleur inconnue {s:?}"
            ))),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: None,
            mode: RenderMode::HalfColor,
            charset: None,
            invert: false,
            trim_border: false,
            cell_aspect: DEFAULT_CELL_ASPECT,
            color_depth: ColorDepth::TrueColor,
            stretch: false,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl RenderConfig {
    /// Default configuration with the given column count.
    #[must_use]
    pub fn new(width: u32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Builder: set the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set a custom charset.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Clamp numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        if !self.cell_aspect.is_finite() {
            self.cell_aspect = DEFAULT_CELL_ASPECT;
        }
        self.cell_aspect = self.cell_aspect.clamp(0.1, 2.0);
    }

    /// Check the configuration before any sampling.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] for a zero width or height, or a
    /// custom charset shorter than 2 characters.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.width == 0 {
            return Err(CoreError::InvalidConfig(
                "la largeur cible doit être > 0".into(),
            ));
        }
        if self.height == Some(0) {
            return Err(CoreError::InvalidConfig(
                "la hauteur cible doit être > 0".into(),
            ));
        }
        self.charset().map(|_| ())
    }

    /// Charset effectif : personnalisé ou [`CHARSET_COMPACT`].
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] if the custom charset is too short.
    pub fn charset(&self) -> Result<Charset, CoreError> {
        Charset::new(self.charset.as_deref().unwrap_or(CHARSET_COMPACT))
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    width: Option<u32>,
    height: Option<u32>,
    mode: Option<RenderMode>,
    charset: Option<String>,
    invert: Option<bool>,
    trim_border: Option<bool>,
    cell_aspect: Option<f32>,
    color_depth: Option<ColorDepth>,
    stretch: Option<bool>,
    alpha_threshold: Option<u8>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the TOML is malformed or holds unknown enum values.
///
/// # Example
/// ```
/// use cp_core::config::{parse_config, RenderMode};
/// let config = parse_config("[render]\nwidth = 32\nmode = \"gray\"\n").unwrap();
/// assert_eq!(config.width, 32);
/// assert_eq!(config.mode, RenderMode::Gray);
/// ```
pub fn parse_config(content: &str) -> Result<RenderConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = RenderConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.width {
            config.width = v;
        }
        if r.height.is_some() {
            config.height = r.height;
        }
        if let Some(v) = r.mode {
            config.mode = v;
        }
        if r.charset.is_some() {
            config.charset = r.charset;
        }
        if let Some(v) = r.invert {
            config.invert = v;
        }
        if let Some(v) = r.trim_border {
            config.trim_border = v;
        }
        if let Some(v) = r.cell_aspect {
            config.cell_aspect = v;
        }
        if let Some(v) = r.color_depth {
            config.color_depth = v;
        }
        if let Some(v) = r.stretch {
            config.stretch = v;
        }
        if let Some(v) = r.alpha_threshold {
            config.alpha_threshold = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use cp_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("cellpaint.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config =
        parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))?;
    log::debug!("config chargée depuis {}", path.display());
    Ok(config)
}
