use anyhow::{Context, Result};
use cp_ascii::Compositor;
use cp_core::config::RenderConfig;
use cp_core::error::CoreError;
use cp_core::frame::PixelBuffer;
use cp_core::traits::{OutputSink, PixelSource};

use crate::emitter::emit;

/// Render a pixel buffer to a printable string.
///
/// Pure: no I/O, no shared state. Rendering the same input twice yields
/// byte-identical output.
///
/// # Errors
/// [`CoreError::InvalidConfig`] before any sampling,
/// [`CoreError::MalformedInput`] for an empty source.
///
/// # Example
/// ```
/// use cp_core::config::{RenderConfig, RenderMode};
/// use cp_core::frame::PixelBuffer;
/// use cp_render::render;
///
/// let src = PixelBuffer::filled(4, 4, (255, 255, 255, 255));
/// let out = render(&src, &RenderConfig::new(2).with_mode(RenderMode::Ascii)).unwrap();
/// assert_eq!(out, "@@\x1b[0m");
/// ```
pub fn render(buffer: &PixelBuffer, config: &RenderConfig) -> Result<String, CoreError> {
    render_on(buffer, config, None)
}

fn render_on(
    buffer: &PixelBuffer,
    config: &RenderConfig,
    background: Option<(u8, u8, u8, u8)>,
) -> Result<String, CoreError> {
    let compositor = Compositor::new(config)?;
    let grid = compositor.render_grid_on(buffer, background)?;
    log::debug!(
        "rendu {}x{} cellules en mode {}",
        grid.width,
        grid.height,
        config.mode
    );
    Ok(emit(&grid))
}

/// Render anything that yields a pixel buffer.
///
/// `trim_border` uses the source's known background when it has one.
///
/// # Errors
/// Returns an error if the source fails or rendering fails.
pub fn render_source(source: &dyn PixelSource, config: &RenderConfig) -> Result<String> {
    let buffer = source
        .pixels()
        .with_context(|| format!("Source illisible : {}", source.name()))?;
    render_on(&buffer, config, source.background())
        .with_context(|| format!("Rendu impossible : {}", source.name()))
}

/// Render then hand the string to `sink`.
///
/// # Errors
/// Returns an error if rendering or writing fails.
///
/// # Example
/// ```
/// use cp_core::config::RenderConfig;
/// use cp_core::frame::PixelBuffer;
/// use cp_render::render_to;
/// use cp_render::sink::StringSink;
///
/// let mut sink = StringSink::default();
/// render_to(&PixelBuffer::filled(2, 2, (0, 0, 0, 255)), &RenderConfig::new(2), &mut sink).unwrap();
/// assert_eq!(sink.outputs.len(), 1);
/// ```
pub fn render_to(
    buffer: &PixelBuffer,
    config: &RenderConfig,
    sink: &mut dyn OutputSink,
) -> Result<()> {
    let text = render(buffer, config)?;
    sink.write_rendered(&text)
}

#[cfg(test)]
mod tests {
    use cp_core::config::{ColorDepth, RenderMode};

    use super::*;
    use crate::emitter::RESET;
    use crate::sink::{StringSink, WriterSink};

    fn stripes(w: u32, h: u32) -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let a = if (x + y) % 5 == 0 { 0 } else { 255 };
                data.extend_from_slice(&[(x * 13) as u8, (y * 29) as u8, 77, a]);
            }
        }
        PixelBuffer::from_rgba(w, h, data).unwrap()
    }

    /// Encre blanche sur la première ligne, fond noir déclaré.
    struct InkOnTop;

    impl PixelSource for InkOnTop {
        fn pixels(&self) -> Result<PixelBuffer> {
            let mut data = Vec::new();
            for y in 0..4u32 {
                for x in 0..4u32 {
                    let v = if y == 0 || (x, y) == (1, 2) { 255 } else { 0 };
                    data.extend_from_slice(&[v, v, v, 255]);
                }
            }
            Ok(PixelBuffer::from_rgba(4, 4, data)?)
        }

        fn name(&self) -> &str {
            "ink-on-top"
        }

        fn background(&self) -> Option<(u8, u8, u8, u8)> {
            Some((0, 0, 0, 255))
        }
    }

    #[test]
    fn source_background_drives_trim() {
        let config = RenderConfig {
            trim_border: true,
            cell_aspect: 1.0,
            ..RenderConfig::new(4).with_mode(RenderMode::Ascii)
        };
        // Trimmed against black: the ink row survives as the first line.
        let out = render_source(&InkOnTop, &config).unwrap();
        assert!(out.starts_with("@@@@"), "{out:?}");
        // Guessing from (0, 0) would take the ink row for border.
        let guessed = render(&InkOnTop.pixels().unwrap(), &config).unwrap();
        assert!(!guessed.starts_with("@@@@"), "{guessed:?}");
    }

    #[test]
    fn rendering_is_idempotent() {
        let src = stripes(33, 21);
        for mode in RenderMode::ALL {
            let config = RenderConfig::new(17).with_mode(mode);
            assert_eq!(render(&src, &config).unwrap(), render(&src, &config).unwrap());
        }
    }

    #[test]
    fn uniform_color_round_trip() {
        let (n, m) = (24, 12);
        let src = PixelBuffer::filled(n, m, (10, 180, 240, 255));
        let config = RenderConfig::new(12).with_mode(RenderMode::Color);
        let out = render(&src, &config).unwrap();
        // 12 * 12 / 24 * 0.5 = 3 lignes.
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 3);
        let expected = format!("\x1b[38;2;10;180;240m{}{RESET}", "█".repeat(12));
        for line in lines {
            assert_eq!(line, expected);
        }
    }

    #[test]
    fn line_count_matches_grid_rows_for_every_mode() {
        let src = stripes(40, 40);
        for mode in RenderMode::ALL {
            let out = render(&src, &RenderConfig::new(10).with_mode(mode)).unwrap();
            let lines: Vec<&str> = out.split('\n').collect();
            assert_eq!(lines.len(), 5, "{mode}");
            assert!(lines.iter().all(|l| l.ends_with(RESET)), "{mode}");
        }
    }

    #[test]
    fn transparent_source_emits_only_blanks_and_resets() {
        let src = PixelBuffer::filled(8, 8, (255, 0, 0, 0));
        for mode in RenderMode::ALL {
            let out = render(&src, &RenderConfig::new(4).with_mode(mode)).unwrap();
            assert_eq!(out, format!("    {RESET}\n    {RESET}"), "{mode}");
        }
    }

    #[test]
    fn half_color_vertical_split() {
        let mut data = Vec::new();
        for y in 0..2u32 {
            for _ in 0..2u32 {
                let px: [u8; 4] = if y == 0 { [255, 0, 0, 255] } else { [0, 0, 255, 255] };
                data.extend_from_slice(&px);
            }
        }
        let src = PixelBuffer::from_rgba(2, 2, data).unwrap();
        let config = RenderConfig {
            height: Some(1),
            ..RenderConfig::new(2).with_mode(RenderMode::HalfColor)
        };
        let out = render(&src, &config).unwrap();
        assert_eq!(out, format!("\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m▀▀{RESET}"));
    }

    #[test]
    fn palette_depth_emits_indexed_codes() {
        let src = PixelBuffer::filled(2, 2, (255, 0, 0, 255));
        let config = RenderConfig {
            color_depth: ColorDepth::Palette256,
            height: Some(1),
            ..RenderConfig::new(1).with_mode(RenderMode::Color)
        };
        assert_eq!(render(&src, &config).unwrap(), format!("\x1b[38;5;196m█{RESET}"));
    }

    #[test]
    fn errors_surface_to_caller() {
        let src = PixelBuffer::filled(4, 4, (0, 0, 0, 255));
        assert!(matches!(
            render(&src, &RenderConfig::new(0)),
            Err(CoreError::InvalidConfig(_))
        ));
        let empty = PixelBuffer::filled(0, 0, (0, 0, 0, 0));
        assert!(matches!(
            render(&empty, &RenderConfig::new(4)),
            Err(CoreError::MalformedInput { .. })
        ));
    }

    #[test]
    fn render_to_writes_through_sink() {
        let src = PixelBuffer::filled(2, 2, (255, 255, 255, 255));
        let config = RenderConfig::new(2).with_mode(RenderMode::Ascii);
        let mut sink = WriterSink::new(Vec::new());
        render_to(&src, &config, &mut sink).unwrap();
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, format!("@@{RESET}\n"));

        let mut strings = StringSink::default();
        render_to(&src, &config, &mut strings).unwrap();
        assert_eq!(strings.outputs, [format!("@@{RESET}")]);
    }

    #[test]
    fn render_source_uses_trait_object() {
        struct Solid;
        impl PixelSource for Solid {
            fn pixels(&self) -> Result<PixelBuffer> {
                Ok(PixelBuffer::filled(2, 2, (255, 255, 255, 255)))
            }
            fn name(&self) -> &str {
                "solid"
            }
        }
        let out = render_source(&Solid, &RenderConfig::new(2).with_mode(RenderMode::Ascii)).unwrap();
        assert_eq!(out, format!("@@{RESET}"));
    }
}
