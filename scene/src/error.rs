//! Scene compiler errors.

use crate::assets::AssetError;

/// Fatal scene compilation failure. No partial scene is produced.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The description is not valid JSON or has the wrong top-level shape.
    #[error("malformed scene description: {0}")]
    Json(#[from] serde_json::Error),

    /// The description has no `objects` array.
    #[error("scene description has no objects array")]
    MissingObjects,

    /// A required asset could not be read.
    #[error("missing asset {path}")]
    MissingAsset {
        path: String,
        #[source]
        source: AssetError,
    },

    /// A required asset was read but could not be decoded.
    #[error("invalid asset {path}: {reason}")]
    InvalidAsset { path: String, reason: String },
}

impl CompileError {
    pub(crate) fn missing(path: impl Into<String>, source: AssetError) -> Self {
        Self::MissingAsset {
            path: path.into(),
            source,
        }
    }
}
