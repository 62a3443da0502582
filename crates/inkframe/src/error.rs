//! Error types for Inkframe operations.
//!
//! Each pipeline stage reports its own error type; [`InkframeError`] wraps
//! them for callers that drive several stages at once.

use std::io;

use thiserror::Error;

use inkframe_compiler::CompileError;

use crate::{
    postprocess::NormalizationError,
    raster::{DecodeError, EncodingError, RasterError},
    sink::SinkError,
};

/// The main error type for Inkframe operations.
///
/// # Diagnostic Variants
///
/// The `Compile` variant keeps the diagram source next to the compiler
/// error so reporters can point at the offending line.
#[derive(Debug, Error)]
pub enum InkframeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{err}")]
    Compile { err: CompileError, src: String },

    #[error(transparent)]
    Normalize(#[from] NormalizationError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl InkframeError {
    /// Create a new `Compile` error with the associated source code.
    pub fn new_compile_error(err: CompileError, src: impl Into<String>) -> Self {
        Self::Compile {
            err,
            src: src.into(),
        }
    }
}

impl From<DecodeError> for InkframeError {
    fn from(error: DecodeError) -> Self {
        Self::Raster(RasterError::Decode(error))
    }
}

impl From<EncodingError> for InkframeError {
    fn from(error: EncodingError) -> Self {
        Self::Raster(RasterError::Encoding(error))
    }
}
