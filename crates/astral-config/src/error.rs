//! Errors raised while persisting the effect configuration.
//!
//! The effects themselves never fail; only reading and writing `config.ron`
//! can.

/// Failure while loading, saving, or hot-reloading `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `config.ron` exists but could not be read.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// The config directory or `config.ron` could not be written.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not a valid [`Config`](crate::Config): malformed RON, or a
    /// section value of the wrong type such as `starfield: (count: -5)` or
    /// `loader: (skip_on_narrow_viewport: "yes")`. Unknown fields are ignored.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// The in-memory config could not be rendered as RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}
