use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use cp_core::config::RenderConfig;
use cp_core::traits::OutputSink;
use cp_render::render_source;
use cp_source::{ImageSource, scan_images};
use rayon::prelude::*;

/// Expand the CLI inputs: files are kept as given, directories are scanned
/// recursively for images (sorted).
///
/// # Errors
/// Returns an error if a directory cannot be read.
pub fn collect_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(inputs.len());
    for input in inputs {
        if input.is_dir() {
            paths.extend(scan_images(input)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

/// Render one image file.
///
/// # Errors
/// Returns an error if decoding or rendering fails.
pub fn render_file(path: &Path, config: &RenderConfig) -> Result<String> {
    let source = ImageSource::open(path)?;
    render_source(&source, config)
}

/// Render every path in parallel. Results keep the input order.
pub fn render_batch(paths: &[PathBuf], config: &RenderConfig) -> Vec<Result<String>> {
    log::info!("rendu de {} image(s) en parallèle", paths.len());
    paths
        .par_iter()
        .map(|path| render_file(path, config))
        .collect()
}

/// Write the batch results in order. Failures are logged and skipped, then
/// reported together once everything else has been written.
///
/// # Errors
/// Returns an error if writing fails or any image failed to render.
pub fn write_batch(
    paths: &[PathBuf],
    results: Vec<Result<String>>,
    sink: &mut dyn OutputSink,
) -> Result<()> {
    let mut failed = 0usize;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(text) => sink.write_rendered(&text)?,
            Err(e) => {
                log::error!("{} : {e:#}", path.display());
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} image(s) sur {} en échec", paths.len());
    }
    Ok(())
}
