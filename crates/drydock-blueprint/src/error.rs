//! Error types for blueprint import and export.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when importing or exporting blueprints.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed XML, or a block field that is not a valid number.
    #[error("error parsing blueprint: {0}")]
    Parse(String),

    /// XML serialization error.
    #[error("error writing XML: {0}")]
    Xml(String),

    /// Filesystem error while reading or writing a blueprint.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Blueprint name cannot be used as a folder name.
    #[error("invalid blueprint name: {0:?}")]
    InvalidName(String),

    /// The blueprint file was written but its thumbnail was not.
    #[error("blueprint written to {} but thumbnail failed: {source}", blueprint.display())]
    Thumbnail {
        blueprint: PathBuf,
        #[source]
        source: ThumbnailError,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the export left a partial package behind (XML without thumbnail).
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Thumbnail { .. })
    }
}

/// Errors decoding or saving a thumbnail image.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// The data URI has no `,` separating header and payload.
    #[error("data URI has no payload")]
    MissingPayload,

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Writing the image file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for blueprint operations.
pub type Result<T> = std::result::Result<T, Error>;
