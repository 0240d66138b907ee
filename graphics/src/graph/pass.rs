//! Frame graph pass types.

use lumenwall_core::material::BlendMode;
use lumenwall_core::mesh::MeshId;
use lumenwall_core::scene::{NodeId, NodeTransform};

use super::resource::{ResourceAccess, TargetId};

/// Handle to a pass in the frame graph.
///
/// `PassId` is `Copy` and cheap to pass around. It is only valid within
/// the `FrameGraph` that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(pub(crate) u32);

impl PassId {
    /// Position in declaration order.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a draw takes its model transform from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformSource {
    /// World transform of a scene node.
    Node(NodeId),
    /// A transform not attached to the tree (effect passes).
    Local(NodeTransform),
}

/// What a texture slot of a draw samples.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureBinding {
    /// Nothing bound.
    Unbound,
    /// A render target of this graph.
    Target(TargetId),
    /// A scene texture by asset name.
    Texture(String),
    /// A render target name nothing declared; the slot stays unbound.
    Missing(String),
}

impl TextureBinding {
    /// The render target read through this binding, if any.
    pub fn target(&self) -> Option<TargetId> {
        match self {
            Self::Target(id) => Some(*id),
            _ => None,
        }
    }
}

/// One material sub-draw of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPass {
    /// Mesh to draw.
    pub mesh: MeshId,
    /// Sub-draw (index array and material) within the mesh.
    pub sub_draw: usize,
    /// Model transform source.
    pub transform: TransformSource,
    /// Camera name; `None` uses the scene's active camera.
    pub camera: Option<String>,
    /// One binding per material texture slot.
    pub textures: Vec<TextureBinding>,
    /// Color target; `None` means the output was never declared and the
    /// pass is skipped.
    pub output: Option<TargetId>,
    /// Blend mode for this draw.
    pub blend: BlendMode,
}

impl DrawPass {
    /// Render targets this draw samples.
    pub fn reads(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.textures.iter().filter_map(TextureBinding::target)
    }

    /// True if the draw samples the target it writes.
    pub fn reads_own_output(&self) -> bool {
        self.output
            .is_some_and(|output| self.reads().any(|read| read == output))
    }
}

/// The operation a pass performs.
#[derive(Debug, Clone, PartialEq)]
pub enum PassKind {
    /// Fill a target with a color.
    Clear { target: TargetId, color: [f32; 4] },
    /// Copy one target into another.
    Copy { source: TargetId, target: TargetId },
    /// Draw one mesh/material pair.
    Draw(DrawPass),
    /// Show a target on screen.
    Present { source: TargetId },
}

/// A pass in the frame graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    name: String,
    kind: PassKind,
}

impl Pass {
    /// Create a new pass.
    pub fn new(name: impl Into<String>, kind: PassKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Get the pass name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the pass operation.
    pub fn kind(&self) -> &PassKind {
        &self.kind
    }

    /// Get this pass as a draw, if it is one.
    pub fn as_draw(&self) -> Option<&DrawPass> {
        if let PassKind::Draw(draw) = &self.kind {
            Some(draw)
        } else {
            None
        }
    }

    /// Every render target access of this pass, reads first.
    pub fn accesses(&self) -> Vec<(TargetId, ResourceAccess)> {
        match &self.kind {
            PassKind::Clear { target, .. } => vec![(*target, ResourceAccess::Write)],
            PassKind::Copy { source, target } => vec![
                (*source, ResourceAccess::Read),
                (*target, ResourceAccess::Write),
            ],
            PassKind::Draw(draw) => {
                let mut accesses: Vec<_> =
                    draw.reads().map(|id| (id, ResourceAccess::Read)).collect();
                if let Some(output) = draw.output {
                    if draw.blend.reads_destination() {
                        accesses.push((output, ResourceAccess::Read));
                    }
                    accesses.push((output, ResourceAccess::Write));
                }
                accesses
            }
            PassKind::Present { source } => vec![(*source, ResourceAccess::Read)],
        }
    }
}
