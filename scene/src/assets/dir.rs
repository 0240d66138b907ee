use std::path::PathBuf;

use lumenwall_core::texture::TextureHeader;

use super::{AssetError, AssetStore, normalize};

/// Suffix of the JSON file describing a texture next to its image data.
pub const TEXTURE_HEADER_SUFFIX: &str = ".tex.json";

/// Asset store reading from a directory on disk.
///
/// Text assets are read from `root/<path>`. Texture metadata for a texture
/// named `n` is read from `root/<n>.tex.json`, a JSON encoding of
/// [`TextureHeader`]; pixel data is never touched.
///
/// Path traversal is prevented by [`normalize`], which rejects `..`
/// segments before they reach the filesystem.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory does not need to exist yet; it is checked on read.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<(String, PathBuf), AssetError> {
        let path = normalize(path)?;
        let full = self.root.join(&path);
        Ok((path, full))
    }
}

impl AssetStore for DirAssetStore {
    fn read_text(&self, path: &str) -> Result<String, AssetError> {
        let (path, full) = self.resolve(path)?;
        std::fs::read_to_string(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path),
            _ => AssetError::Io(e),
        })
    }

    fn texture_header(&self, name: &str) -> Result<TextureHeader, AssetError> {
        let path = format!("{name}{TEXTURE_HEADER_SUFFIX}");
        let text = self.read_text(&path)?;
        serde_json::from_str(&text).map_err(|e| AssetError::Malformed {
            path,
            reason: e.to_string(),
        })
    }
}
