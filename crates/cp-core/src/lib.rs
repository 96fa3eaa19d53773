/// Types, configuration et structures partagées de cellpaint.
///
/// This crate contains the pixel buffer, the output grid, the density
/// charset, color quantization and the configuration shared across the
/// cellpaint workspace.

pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use charset::Charset;
pub use color::{ColorCode, Rgb};
pub use config::{ColorDepth, RenderConfig, RenderMode};
pub use error::CoreError;
pub use frame::{Cell, Grid, PixelBuffer};
