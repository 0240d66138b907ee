//! Frame graph infrastructure.
//!
//! The frame graph describes one frame's GPU work as passes over named
//! render targets. The graph compiler automatically handles:
//!
//! - Pass ordering via a stable topological sort
//! - Render target lifetime analysis
//! - Memory aliasing of reusable targets with disjoint lifetimes
//!
//! # Architecture
//!
//! | Stage | Type | Purpose |
//! |-------|------|---------|
//! | Build | [`FrameGraph`] | Targets and passes, usually from [`build_scene_graph`] |
//! | Compile | [`CompiledFrameGraph`] | Order, lifetimes, physical assignment |
//! | Execute | [`FrameExecutor`](crate::executor::FrameExecutor) | Resolve handles, issue backend calls |
//!
//! Dependencies come from render target accesses in declaration order:
//! a read depends on the previous write (read-after-write), a write on
//! every read and the write before it (write-after-read, write-after-write).
//! Explicit edges can be added with [`FrameGraph::add_dependency`].
//!
//! # Example
//!
//! ```
//! use lumenwall_core::scene::RenderTargetDesc;
//! use lumenwall_graphics::graph::{FrameGraph, PassKind};
//!
//! let mut graph = FrameGraph::new();
//! let a = graph.declare_target("_rt_a", RenderTargetDesc::absolute(64, 64));
//! let b = graph.declare_target("_rt_b", RenderTargetDesc::absolute(64, 64));
//! graph.add_pass("clear", PassKind::Clear { target: a, color: [0.0; 4] });
//! graph.add_pass("copy", PassKind::Copy { source: a, target: b });
//!
//! let compiled = graph.compile((1920, 1080)).unwrap();
//! assert_eq!(compiled.order().len(), 2);
//! ```

mod compiler;
mod pass;
mod resource;
mod scene_builder;

use std::collections::HashMap;

use lumenwall_core::scene::RenderTargetDesc;

pub use compiler::{CompiledFrameGraph, Lifetime, PhysicalTarget};
pub use pass::{DrawPass, Pass, PassId, PassKind, TextureBinding, TransformSource};
pub use resource::{ResourceAccess, TargetId, TargetInfo};
pub use scene_builder::build_scene_graph;

/// Prefix of the targets inserted for draws that sample their own output.
pub const SCRATCH_PREFIX: &str = "_rt_scratch_";

/// One frame's passes over named render targets.
#[derive(Debug, Clone, Default)]
pub struct FrameGraph {
    targets: Vec<TargetInfo>,
    by_name: HashMap<String, TargetId>,
    passes: Vec<Pass>,
    /// Dependency edges stored as (dependent, dependency) pairs.
    edges: Vec<(PassId, PassId)>,
}

impl FrameGraph {
    /// Create a new empty frame graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a render target. Declaring a known name returns the
    /// existing id and keeps the first declaration.
    pub fn declare_target(&mut self, name: impl Into<String>, desc: RenderTargetDesc) -> TargetId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = TargetId(self.targets.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.targets.push(TargetInfo { name, desc });
        id
    }

    /// Looks up a target by name.
    pub fn target(&self, name: &str) -> Option<TargetId> {
        self.by_name.get(name).copied()
    }

    /// Target declaration.
    pub fn target_info(&self, id: TargetId) -> &TargetInfo {
        &self.targets[id.index()]
    }

    /// Every declared target.
    pub fn targets(&self) -> &[TargetInfo] {
        &self.targets
    }

    /// Adds a pass and returns its id.
    pub fn add_pass(&mut self, name: impl Into<String>, kind: PassKind) -> PassId {
        let id = PassId(self.passes.len() as u32);
        self.passes.push(Pass::new(name, kind));
        id
    }

    /// Adds a draw pass.
    ///
    /// A draw that samples its own output target first gets a copy of that
    /// target into a scratch target and samples the scratch copy instead.
    pub fn add_draw(&mut self, name: impl Into<String>, mut draw: DrawPass) -> PassId {
        let name = name.into();
        if let Some(output) = draw.output.filter(|_| draw.reads_own_output()) {
            let info = self.target_info(output).clone();
            let scratch = self.declare_target(
                format!("{SCRATCH_PREFIX}{}", info.name),
                info.desc.with_reuse(true),
            );
            self.add_pass(
                format!("{name}:scratch"),
                PassKind::Copy {
                    source: output,
                    target: scratch,
                },
            );
            for binding in &mut draw.textures {
                if binding.target() == Some(output) {
                    *binding = TextureBinding::Target(scratch);
                }
            }
        }
        self.add_pass(name, PassKind::Draw(draw))
    }

    /// Add a dependency between passes.
    ///
    /// The `dependent` pass will execute after the `dependency` pass.
    pub fn add_dependency(&mut self, dependent: PassId, dependency: PassId) {
        assert!(
            dependent.index() < self.passes.len(),
            "Invalid dependent handle"
        );
        assert!(
            dependency.index() < self.passes.len(),
            "Invalid dependency handle"
        );
        assert!(dependent != dependency, "Pass cannot depend on itself");

        let exists = self
            .edges
            .iter()
            .any(|&(d, dep)| d == dependent && dep == dependency);
        if !exists {
            self.edges.push((dependent, dependency));
        }
    }

    /// Explicit dependency edges as (dependent, dependency) pairs.
    pub fn explicit_dependencies(&self) -> &[(PassId, PassId)] {
        &self.edges
    }

    /// Get a pass.
    pub fn pass(&self, id: PassId) -> &Pass {
        &self.passes[id.index()]
    }

    /// Get all passes in declaration order.
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Get the number of passes in the graph.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Clear all passes and targets from the graph.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.by_name.clear();
        self.passes.clear();
        self.edges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumenwall_core::material::BlendMode;
    use lumenwall_core::mesh::MeshId;
    use lumenwall_core::scene::NodeTransform;

    #[test]
    fn test_declare_target_is_idempotent() {
        let mut graph = FrameGraph::new();
        let a = graph.declare_target("_rt_a", RenderTargetDesc::absolute(8, 8));
        let again = graph.declare_target("_rt_a", RenderTargetDesc::absolute(16, 16));
        assert_eq!(a, again);
        assert_eq!(graph.targets().len(), 1);
        assert_eq!(graph.target_info(a).desc, RenderTargetDesc::absolute(8, 8));
        assert_eq!(graph.target("_rt_a"), Some(a));
        assert_eq!(graph.target("_rt_b"), None);
    }

    #[test]
    fn test_self_read_inserts_scratch_copy() {
        let mut graph = FrameGraph::new();
        let out = graph.declare_target("_rt_default", RenderTargetDesc::screen(1.0));
        graph.add_draw(
            "refract",
            DrawPass {
                mesh: MeshId(0),
                sub_draw: 0,
                transform: TransformSource::Local(NodeTransform::IDENTITY),
                camera: None,
                textures: vec![TextureBinding::Target(out)],
                output: Some(out),
                blend: BlendMode::Normal,
            },
        );

        assert_eq!(graph.pass_count(), 2);
        let scratch = graph.target("_rt_scratch__rt_default").unwrap();
        assert!(graph.target_info(scratch).desc.allow_reuse);
        assert_eq!(
            graph.passes()[0].kind(),
            &PassKind::Copy {
                source: out,
                target: scratch
            }
        );
        let draw = graph.passes()[1].as_draw().unwrap();
        assert_eq!(draw.textures, vec![TextureBinding::Target(scratch)]);
        assert!(!draw.reads_own_output());
    }

    #[test]
    fn test_add_dependency() {
        let mut graph = FrameGraph::new();
        let t = graph.declare_target("_rt_t", RenderTargetDesc::absolute(1, 1));
        let first = graph.add_pass("a", PassKind::Clear { target: t, color: [0.0; 4] });
        let second = graph.add_pass("b", PassKind::Present { source: t });
        graph.add_dependency(second, first);
        graph.add_dependency(second, first);
        assert_eq!(graph.explicit_dependencies(), &[(second, first)]);
    }
}
