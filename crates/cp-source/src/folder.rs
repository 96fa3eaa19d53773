use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extensions image reconnues.
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// True si l'extension du chemin est une image reconnue.
#[must_use]
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_lowercase().as_str()))
}

/// Liste récursivement les images d'un dossier, triées par chemin.
///
/// # Errors
/// Retourne une erreur si le dossier n'existe pas ou ne peut être lu.
pub fn scan_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    scan_dir(dir, &mut files)?;
    files.sort();
    log::info!("{} image(s) trouvée(s) dans {}", files.len(), dir.display());
    Ok(files)
}

fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Impossible de lire {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            scan_dir(&path, files)?;
        } else if is_image(&path) {
            files.push(path);
        }
    }
    Ok(())
}
