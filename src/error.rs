//! Error types for the cube viewer.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the crate's [`Error`] type
pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Rejected move parameters. Nothing is mutated when one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveError {
    /// Axis outside of 0 (X), 1 (Y), 2 (Z)
    #[error("invalid axis {0}: expected 0 (X), 1 (Y) or 2 (Z)")]
    Axis(usize),

    /// Slice index outside of -1, 0, 1
    #[error("invalid slice index {0}: expected -1, 0 or 1")]
    Slice(i32),

    /// Direction other than +1 or -1
    #[error("invalid direction {0}: expected 1 or -1")]
    Direction(i32),
}

/// Fatal startup errors
#[derive(Error, Debug)]
pub(crate) enum Error {
    /// Shader override could not be read
    #[error("failed to read shader {path:?}: {source}")]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Shader is missing a required entry point
    #[error("shader {origin} is missing entry point `{entry_point}`")]
    ShaderEntryPoint {
        origin: String,
        entry_point: &'static str,
    },

    /// Environment variable holds a value that can't be used
    #[error("invalid value {value:?} for {var}: {reason}")]
    Config {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Windowing or graphics failure reported by iced
    #[error("iced error: {0}")]
    Iced(#[from] iced::Error),
}
