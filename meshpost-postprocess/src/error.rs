//! Error types for the post-processing pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while converting, processing or exporting a mesh.
///
/// Temporary artifacts are already removed by the time one of these reaches
/// the caller.
#[derive(Error, Debug)]
pub enum PostprocessError {
    /// The input path could not be read as a mesh
    #[error("Failed to load mesh from {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: meshpost_core::Error,
    },

    /// Writing or reloading an interchange artifact failed
    #[error("Mesh conversion failed during {step}: {source}")]
    Conversion {
        step: &'static str,
        #[source]
        source: meshpost_core::Error,
    },

    /// The engine rejected the parameters or failed while running
    #[error("{step} failed: {message}")]
    Operation {
        step: &'static str,
        message: String,
        #[source]
        source: Option<meshpost_core::Error>,
    },

    /// The temporary directory could not be created
    #[error("Failed to prepare temporary directory {}: {source}", .path.display())]
    TempDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PostprocessError {
    pub(crate) fn conversion(step: &'static str, source: meshpost_core::Error) -> Self {
        Self::Conversion { step, source }
    }

    pub(crate) fn operation(step: &'static str, source: meshpost_core::Error) -> Self {
        Self::Operation {
            step,
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub(crate) fn invalid_parameter<S: Into<String>>(step: &'static str, message: S) -> Self {
        Self::Operation {
            step,
            message: message.into(),
            source: None,
        }
    }

    /// Name of the step that failed, when the error carries one
    pub fn step(&self) -> Option<&'static str> {
        match self {
            Self::Conversion { step, .. } | Self::Operation { step, .. } => Some(*step),
            Self::Load { .. } | Self::TempDir { .. } => None,
        }
    }
}

/// Result type alias for post-processing operations
pub type Result<T> = std::result::Result<T, PostprocessError>;
