use crate::mesh::MeshId;

use super::node::{Node, NodeId};

/// Explicit copy from one named target into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyCommand {
    /// Target read from.
    pub source: String,
    /// Target written to.
    pub target: String,
}

/// One material pass of an effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectPass {
    /// Detached node carrying the pass transform, mesh and camera.
    pub node: Node,
    /// Mesh holding the pass material.
    pub mesh: MeshId,
    /// Target the pass draws into.
    pub output: String,
}

/// One stage of an effect chain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageEffect {
    /// Ping-pong target this stage reads.
    pub input: String,
    /// Target this stage writes (the default target for the last stage).
    pub output: String,
    /// Copies executed before the passes.
    pub commands: Vec<CopyCommand>,
    /// Material passes in order.
    pub passes: Vec<EffectPass>,
}

/// The post-process chain of one image object.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEffectLayer {
    /// Image node whose draw feeds the chain.
    pub node: NodeId,
    /// Ping-pong pair; the image is first drawn into `targets[0]`.
    pub targets: [String; 2],
    /// Stages in order.
    pub effects: Vec<ImageEffect>,
}

impl ImageEffectLayer {
    /// Target the image node renders into.
    pub fn first_target(&self) -> &str {
        &self.targets[0]
    }
}
