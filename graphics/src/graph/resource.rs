//! Render target identifiers for the frame graph.

use lumenwall_core::scene::RenderTargetDesc;

/// Index of a declared render target inside a [`FrameGraph`](super::FrameGraph).
///
/// Ids are only meaningful within the graph that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub(crate) u32);

impl TargetId {
    /// Position in the graph's target list.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A render target known to the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetInfo {
    /// Unique name.
    pub name: String,
    /// Size and sharing rules.
    pub desc: RenderTargetDesc,
}

/// Resource access type for dependency tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceAccess {
    /// Read-only access.
    Read,
    /// Write-only access.
    Write,
}

impl ResourceAccess {
    /// Check if this access includes reading.
    pub fn reads(&self) -> bool {
        matches!(self, Self::Read)
    }

    /// Check if this access includes writing.
    pub fn writes(&self) -> bool {
        matches!(self, Self::Write)
    }
}
