/// Sortie terminal pour cellpaint.
///
/// Serializes grids into SGR-escaped strings and hands them to injected
/// output sinks.
pub mod emitter;
pub mod pipeline;
pub mod sink;

pub use emitter::emit;
pub use pipeline::{render, render_source, render_to};
