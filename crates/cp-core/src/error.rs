use thiserror::Error;

/// Errors originating from the core rendering pipeline.
///
/// Raised before any sampling happens; rendering never falls back to a
/// default silently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid configuration value (width, height, mode, charset).
    #[error("Configuration invalide : {0}")]
    InvalidConfig(String),

    /// Source pixel buffer is empty or inconsistent with its dimensions.
    #[error("Source malformée : {width}×{height}")]
    MalformedInput {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
}
