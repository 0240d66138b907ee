use std::collections::BTreeMap;

use crate::material::ShaderValues;
use crate::mesh::{Mesh, MeshId};
use crate::particle::ParticleSubsystem;
use crate::texture::SceneTexture;

use super::camera::Camera;
use super::node::{NodeId, NodeTree};
use super::target::RenderTargetDesc;

/// A compiled wallpaper scene.
///
/// Owns every node, mesh, camera, render target declaration, texture and
/// particle subsystem. Cross references (a node's camera, an effect's target)
/// are names or ids resolved through these tables.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Node hierarchy.
    pub nodes: NodeTree,
    /// Mesh table addressed by [`MeshId`].
    pub meshes: Vec<Mesh>,
    /// Cameras by name.
    pub cameras: BTreeMap<String, Camera>,
    /// Render target declarations by name.
    pub render_targets: BTreeMap<String, RenderTargetDesc>,
    /// Textures referenced by materials, by asset name.
    pub textures: BTreeMap<String, SceneTexture>,
    /// Particle subsystems, stepped every frame.
    pub particle_systems: Vec<ParticleSubsystem>,
    /// Name of the camera nodes use when they name none.
    pub active_camera: String,
    /// Composite target of each effect layer, by description object id.
    pub layer_links: BTreeMap<i32, String>,
    /// Color the default target is cleared to.
    pub clear_color: [f32; 3],
    /// Orthographic scene size.
    pub ortho: [u32; 2],
    /// Uniform values shared by every draw.
    pub globals: ShaderValues,
    /// Seconds of scene time elapsed.
    pub time: f32,
}

impl Scene {
    /// Creates an empty scene with the given orthographic size.
    pub fn new(ortho: [u32; 2]) -> Self {
        Self {
            nodes: NodeTree::new(),
            meshes: Vec::new(),
            cameras: BTreeMap::new(),
            render_targets: BTreeMap::new(),
            textures: BTreeMap::new(),
            particle_systems: Vec::new(),
            active_camera: String::new(),
            layer_links: BTreeMap::new(),
            clear_color: [0.0; 3],
            ortho,
            globals: ShaderValues::new(),
            time: 0.0,
        }
    }

    /// Stores a mesh and returns its id.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        debug_assert!(mesh.is_consistent() || mesh.materials.is_empty());
        self.meshes.push(mesh);
        MeshId(self.meshes.len() as u32 - 1)
    }

    /// Looks up a mesh.
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.index())
    }

    /// Looks up a mesh mutably.
    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.index())
    }

    /// Declares a render target. Returns false, keeping the existing
    /// declaration, if the name is taken.
    pub fn add_render_target(&mut self, name: impl Into<String>, desc: RenderTargetDesc) -> bool {
        let name = name.into();
        if self.render_targets.contains_key(&name) {
            return false;
        }
        self.render_targets.insert(name, desc);
        true
    }

    /// The camera nodes fall back to.
    pub fn active_camera(&self) -> Option<&Camera> {
        self.cameras.get(&self.active_camera)
    }

    /// Camera a node is drawn with: its own if named and known, else the
    /// active camera.
    pub fn camera_for(&self, node: NodeId) -> Option<&Camera> {
        self.nodes
            .get(node)
            .and_then(|n| n.camera.as_ref())
            .and_then(|name| self.cameras.get(name))
            .or_else(|| self.active_camera())
    }

    /// Steps every particle subsystem and publishes into its mesh.
    pub fn update_particles(&mut self, dt: f32) {
        for system in &mut self.particle_systems {
            system.step(dt);
            if let Some(mesh) = self.meshes.get_mut(system.mesh().index()) {
                system.publish(mesh);
            }
        }
    }

    /// Sets the scene time uploaded as `g_Time`.
    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    /// Advances scene time and particles by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.set_time(self.time + dt);
        self.update_particles(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators::generate_particle_quads;
    use crate::particle::{Emitter, EmitterShape, SceneRng};
    use crate::scene::{Camera, Node};

    #[test]
    fn test_render_target_names_unique() {
        let mut scene = Scene::new([1920, 1080]);
        assert!(scene.add_render_target("_rt_a", RenderTargetDesc::absolute(10, 10)));
        assert!(!scene.add_render_target("_rt_a", RenderTargetDesc::absolute(20, 20)));
        assert_eq!(
            scene.render_targets["_rt_a"],
            RenderTargetDesc::absolute(10, 10)
        );
    }

    #[test]
    fn test_camera_fallback() {
        let mut scene = Scene::new([100, 100]);
        scene
            .cameras
            .insert("global".into(), Camera::orthographic(100.0, 100.0, -1.0, 1.0));
        scene
            .cameras
            .insert("effect".into(), Camera::orthographic(2.0, 2.0, -1.0, 1.0));
        scene.active_camera = "global".into();
        let root = scene.nodes.root();
        let plain = scene.nodes.add_child(root, Node::new());
        let tagged = scene.nodes.add_child(root, Node::new().with_camera("effect"));
        let unknown = scene.nodes.add_child(root, Node::new().with_camera("missing"));
        assert_eq!(scene.camera_for(plain), scene.cameras.get("global"));
        assert_eq!(scene.camera_for(tagged), scene.cameras.get("effect"));
        assert_eq!(scene.camera_for(unknown), scene.cameras.get("global"));
    }

    #[test]
    fn test_advance_publishes_particles() {
        let mut scene = Scene::new([100, 100]);
        let mesh = scene.add_mesh(generate_particle_quads(16, false));
        let mut system = ParticleSubsystem::new(mesh, 16, SceneRng::seeded(0));
        system.add_emitter(Emitter::new(EmitterShape::Box, 4.0));
        scene.particle_systems.push(system);

        scene.advance(0.5);
        assert_eq!(scene.time, 0.5);
        assert_eq!(scene.mesh(mesh).unwrap().index_arrays[0].render_count(), 12);
    }
}
