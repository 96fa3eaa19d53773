use std::io::Write;

use anyhow::{Context, Result};
use cp_core::traits::OutputSink;

/// Sink écrivant dans n'importe quel `io::Write` (stdout, fichier, buffer).
///
/// Appends a newline after each rendered block and flushes.
///
/// # Example
/// ```
/// use cp_core::traits::OutputSink;
/// use cp_render::sink::WriterSink;
///
/// let mut sink = WriterSink::new(Vec::new());
/// sink.write_rendered("ab").unwrap();
/// assert_eq!(sink.into_inner(), b"ab\n");
/// ```
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Récupère le writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl WriterSink<std::io::Stdout> {
    /// Sink sur la sortie standard.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write_rendered(&mut self, text: &str) -> Result<()> {
        self.inner
            .write_all(text.as_bytes())
            .and_then(|()| self.inner.write_all(b"\n"))
            .and_then(|()| self.inner.flush())
            .context("Écriture de la sortie impossible")
    }
}

/// Sink mémoire, utile pour les tests et l'intégration.
#[derive(Debug, Default)]
pub struct StringSink {
    /// Blocs reçus, dans l'ordre.
    pub outputs: Vec<String>,
}

impl OutputSink for StringSink {
    fn write_rendered(&mut self, text: &str) -> Result<()> {
        self.outputs.push(text.to_owned());
        Ok(())
    }
}
