use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use cp_core::charset::{self, CHARSET_BINARY};
use cp_core::color::Rgb;
use cp_core::config::{ColorDepth, RenderConfig, RenderMode, load_config};

/// cellpaint: images et texte en art terminal coloré.
#[derive(Parser, Debug)]
#[command(name = "cellpaint", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rendre une ou plusieurs images (fichiers ou dossiers).
    Image(ImageArgs),
    /// Rendre du texte avec une police TTF/OTF.
    Text(TextArgs),
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Images PNG, JPEG, BMP, GIF, ou dossiers à parcourir.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub render: RenderArgs,
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Texte à rendre. Un saut de ligne, ou la séquence littérale `\n`,
    /// sépare les lignes.
    pub text: String,

    /// Fichier de police TTF/OTF. Défaut : DejaVu Sans Mono embarquée.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Taille de police en pixels par em.
    #[arg(long, default_value_t = cp_font::rasterizer::DEFAULT_FONT_SIZE)]
    pub font_size: u32,

    /// Couverture au-delà de laquelle un pixel est de l'encre.
    #[arg(long, default_value_t = cp_font::binarize::DEFAULT_THRESHOLD)]
    pub threshold: u8,

    /// Couleur de l'encre, `R,G,B`.
    #[arg(long, value_parser = parse_rgb, default_value = "255,255,255")]
    pub fg: Rgb,

    /// Couleur du fond, `R,G,B`.
    #[arg(long, value_parser = parse_rgb, default_value = "0,0,0")]
    pub bg: Rgb,

    /// Fond transparent (ignore --bg).
    #[arg(long)]
    pub transparent: bool,

    /// Taille du canevas, `LxH`. Défaut : caractères × taille par 2 × taille.
    #[arg(long, value_parser = parse_dims)]
    pub canvas: Option<(u32, u32)>,

    /// Position du texte sur le canevas, `X,Y`.
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true)]
    pub offset: Option<(i32, i32)>,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Options de rendu communes. Elles priment sur le fichier `--config`.
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Colonnes de sortie.
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Lignes de sortie. Défaut : déduit du ratio de la source.
    #[arg(long)]
    pub height: Option<u32>,

    /// Mode : ascii, color, gray, half-color, half-gray.
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Charset personnalisé, du plus clair au plus dense.
    #[arg(long, conflicts_with = "preset")]
    pub charset: Option<String>,

    /// Charset intégré : compact, standard, blocks, binary.
    #[arg(long)]
    pub preset: Option<String>,

    #[arg(long)]
    pub invert: bool,

    /// Rogner la bordure de couleur uniforme avant l'échantillonnage.
    #[arg(long)]
    pub trim_border: bool,

    /// Étirer l'intensité sur toute la plage.
    #[arg(long)]
    pub stretch: bool,

    /// Couleurs xterm 256 au lieu de 24 bits.
    #[arg(long)]
    pub palette256: bool,

    /// Largeur / hauteur d'une cellule du terminal.
    #[arg(long)]
    pub cell_aspect: Option<f32>,

    /// Fichier de configuration TOML (section `[render]`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl RenderArgs {
    /// Build the effective configuration: TOML file (or defaults), then flags.
    ///
    /// `default_charset` applies only when neither the file nor the flags
    /// pick one.
    ///
    /// # Errors
    /// Returns an error if the config file is unreadable, the mode or preset
    /// is unknown, or the result fails validation.
    pub fn resolve(&self, default_charset: Option<&str>) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RenderConfig::default(),
        };

        if let Some(w) = self.width {
            config.width = w;
        }
        if self.height.is_some() {
            config.height = self.height;
        }
        if let Some(mode) = &self.mode {
            config.mode = mode.parse::<RenderMode>()?;
        }
        if let Some(name) = &self.preset {
            let Some(set) = charset::preset(name) else {
                bail!("charset inconnu : {name} (compact, standard, blocks, binary)");
            };
            config.charset = Some(set.to_owned());
        } else if self.charset.is_some() {
            config.charset.clone_from(&self.charset);
        }
        if config.charset.is_none() {
            config.charset = default_charset.map(str::to_owned);
        }
        if self.invert {
            config.invert = true;
        }
        if self.trim_border {
            config.trim_border = true;
        }
        if self.stretch {
            config.stretch = true;
        }
        if self.palette256 {
            config.color_depth = ColorDepth::Palette256;
        }
        if let Some(aspect) = self.cell_aspect {
            config.cell_aspect = aspect;
        }

        config.clamp_all();
        config.validate()?;
        Ok(config)
    }
}

impl TextArgs {
    /// Le texte avec les `\n` littéraux (tels que passés par un shell)
    /// convertis en sauts de ligne.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.replace("\\n", "\n")
    }

    /// Configuration for text: the binary charset unless one is chosen.
    ///
    /// # Errors
    /// See [`RenderArgs::resolve`].
    pub fn resolve(&self) -> Result<RenderConfig> {
        self.render.resolve(Some(CHARSET_BINARY))
    }
}

/// Parse `R,G,B` (0..=255 each).
///
/// # Errors
/// Returns a message if there are not exactly three valid components.
pub fn parse_rgb(s: &str) -> Result<Rgb, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts[..] else {
        return Err(format!("couleur attendue R,G,B, reçu {s:?}"));
    };
    let channel = |v: &str| {
        v.parse::<u8>()
            .map_err(|_| format!("composante invalide {v:?} dans {s:?}"))
    };
    Ok((channel(r)?, channel(g)?, channel(b)?))
}

/// Parse `WxH`, both strictly positive.
///
/// # Errors
/// Returns a message on malformed or zero dimensions.
pub fn parse_dims(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("dimensions attendues LxH, reçu {s:?}"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("largeur invalide {w:?}"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("hauteur invalide {h:?}"))?;
    if w == 0 || h == 0 {
        return Err(format!("dimensions nulles : {s:?}"));
    }
    Ok((w, h))
}

/// Parse `X,Y` (signed).
///
/// # Errors
/// Returns a message on malformed input.
pub fn parse_offset(s: &str) -> Result<(i32, i32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("position attendue X,Y, reçu {s:?}"))?;
    let x: i32 = x.trim().parse().map_err(|_| format!("X invalide {x:?}"))?;
    let y: i32 = y.trim().parse().map_err(|_| format!("Y invalide {y:?}"))?;
    Ok((x, y))
}
