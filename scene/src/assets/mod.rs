//! Asset access for the scene compiler.
//!
//! The compiler reads shader templates, helper materials and texture
//! metadata through the [`AssetStore`] trait. Two stores ship with the
//! crate:
//!
//! - [`MemoryAssetStore`] - In-memory storage for tests and embedded assets
//! - [`DirAssetStore`] - A directory on the native filesystem
//!
//! Paths use forward slashes relative to the store root; see [`normalize`].

mod dir;
mod memory;

pub use dir::DirAssetStore;
pub use memory::MemoryAssetStore;

use lumenwall_core::texture::TextureHeader;

/// Errors that can occur while reading an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The requested path was not found in the store.
    #[error("asset not found: {0}")]
    NotFound(String),
    /// An IO error occurred while reading the asset.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The path is empty or tries to leave the store root.
    #[error("invalid asset path: {0}")]
    InvalidPath(String),
    /// The asset exists but could not be decoded.
    #[error("malformed asset {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Read access to scene assets.
pub trait AssetStore {
    /// Returns the text of the asset at `path`.
    fn read_text(&self, path: &str) -> Result<String, AssetError>;

    /// Returns the metadata of the texture named `name`.
    fn texture_header(&self, name: &str) -> Result<TextureHeader, AssetError>;
}

/// Normalize an asset path.
///
/// - Replaces backslashes with forward slashes
/// - Drops empty and `.` segments
/// - Rejects `..` segments
/// - Strips leading and trailing slashes
pub fn normalize(path: &str) -> Result<String, AssetError> {
    let replaced = path.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in replaced.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return Err(AssetError::InvalidPath(format!(
                "{path}: path traversal (..) not allowed"
            )));
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        return Err(AssetError::InvalidPath("empty path".into()));
    }
    Ok(segments.join("/"))
}
