use anyhow::Result;
use clap::Parser;
use cp_core::traits::OutputSink;
use cp_font::TextSource;
use cp_render::render_source;
use cp_render::sink::WriterSink;

pub mod batch;
pub mod cli;

use cli::{Command, ImageArgs, TextArgs};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Rendre
    match &cli.command {
        Command::Image(args) => run_image(args),
        Command::Text(args) => run_text(args),
    }
}

/// Une image : rendu direct. Plusieurs, ou un dossier : lot parallèle.
fn run_image(args: &ImageArgs) -> Result<()> {
    let config = args.render.resolve(None)?;
    let mut sink = WriterSink::stdout();

    if let [single] = args.paths.as_slice()
        && !single.is_dir()
    {
        let text = batch::render_file(single, &config)?;
        return sink.write_rendered(&text);
    }

    let paths = batch::collect_paths(&args.paths)?;
    if paths.is_empty() {
        anyhow::bail!("Aucune image trouvée.");
    }
    let results = batch::render_batch(&paths, &config);
    batch::write_batch(&paths, results, &mut sink)
}

fn run_text(args: &TextArgs) -> Result<()> {
    let config = args.resolve()?;
    let back = (!args.transparent).then_some(args.bg);
    let text = args.text();
    let source = match &args.font {
        Some(path) => TextSource::from_file(text, path)?,
        None => TextSource::builtin(text)?,
    };
    let mut source = source
        .with_font_size(args.font_size)
        .with_threshold(args.threshold)
        .with_colors(args.fg, back);
    if let Some((w, h)) = args.canvas {
        source = source.with_canvas(w, h);
    }
    if let Some((x, y)) = args.offset {
        source = source.with_offset(x, y);
    }
    let text = render_source(&source, &config)?;
    WriterSink::stdout().write_rendered(&text)
}
