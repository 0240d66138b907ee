//! Per-frame execution of a compiled frame graph.
//!
//! The [`FrameExecutor`] owns the frame graph built from a scene and maps
//! its render targets, materials and textures onto pooled GPU resources.
//! Resources are realized lazily on first reference;
//! [`prepare`](FrameExecutor::prepare) realizes everything up front so pool
//! exhaustion surfaces at load time instead of mid-frame.
//!
//! Execution never fails: a pass whose output is missing or incomplete is
//! skipped, a texture slot that cannot be resolved stays unbound, and each
//! problem is logged once.

use std::collections::{HashMap, HashSet};

use lumenwall_core::material::{Material, ShaderValues};
use lumenwall_core::math::Mat4;
use lumenwall_core::mesh::MeshId;
use lumenwall_core::scene::Scene;

use crate::backend::{BackendError, DrawCall, GpuTexture};
use crate::device::GraphicsDevice;
use crate::error::{GraphError, GraphicsError};
use crate::graph::{
    CompiledFrameGraph, DrawPass, FrameGraph, PassKind, TargetId, TextureBinding,
    TransformSource, build_scene_graph,
};
use crate::pool::{FramebufferHandle, ShaderHandle, TextureHandle};
use crate::types::{ShaderDescriptor, TextureDescriptor, TextureFormat, TextureUsage, Viewport};

/// Counters describing one executed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Passes visited.
    pub passes: usize,
    /// Draws issued.
    pub draws: usize,
    /// Copies issued.
    pub copies: usize,
    /// Clears issued.
    pub clears: usize,
    /// Passes skipped because something they need is missing.
    pub skipped: usize,
    /// The default target reached the screen.
    pub presented: bool,
}

#[derive(Debug, Clone, Copy)]
struct Storage {
    texture: TextureHandle,
    framebuffer: FramebufferHandle,
    size: (u32, u32),
}

/// GPU-side state the executor realizes on demand.
#[derive(Debug, Default)]
struct Resources {
    /// One entry per physical target of the compiled graph.
    storage: Vec<Option<Storage>>,
    /// `None` records a program that failed to build.
    shaders: HashMap<(MeshId, usize), Option<ShaderHandle>>,
    textures: HashMap<String, Option<TextureHandle>>,
    warned: HashSet<String>,
}

/// Executes a scene's frame graph on a [`GraphicsDevice`].
#[derive(Debug)]
pub struct FrameExecutor {
    graph: FrameGraph,
    compiled: CompiledFrameGraph,
    resources: Resources,
}

impl FrameExecutor {
    /// Builds and compiles the frame graph of `scene` for a surface size.
    pub fn new(scene: &Scene, surface: (u32, u32)) -> Result<Self, GraphError> {
        let graph = build_scene_graph(scene);
        let compiled = graph.compile(surface)?;
        log::info!(
            "Frame executor ready: {} passes, {} physical targets at {}x{}",
            compiled.order().len(),
            compiled.physical().len(),
            surface.0,
            surface.1
        );
        let resources = Resources {
            storage: vec![None; compiled.physical().len()],
            ..Resources::default()
        };
        Ok(Self {
            graph,
            compiled,
            resources,
        })
    }

    /// The frame graph being executed.
    pub fn graph(&self) -> &FrameGraph {
        &self.graph
    }

    /// The compiled order and target assignment.
    pub fn compiled(&self) -> &CompiledFrameGraph {
        &self.compiled
    }

    /// Current surface size.
    pub fn surface(&self) -> (u32, u32) {
        self.compiled.surface()
    }

    /// Re-derives screen-relative target sizes for a new surface size.
    ///
    /// Render target storage is released and realized again on next use.
    pub fn resize(
        &mut self,
        device: &mut GraphicsDevice,
        surface: (u32, u32),
    ) -> Result<(), GraphError> {
        if surface == self.compiled.surface() {
            return Ok(());
        }
        let compiled = self.graph.compile(surface)?;
        self.resources.release_storage(device);
        self.resources.storage = vec![None; compiled.physical().len()];
        self.compiled = compiled;
        log::info!("Frame executor resized to {}x{}", surface.0, surface.1);
        Ok(())
    }

    /// Realizes every render target, shader program and texture the graph
    /// references.
    pub fn prepare(
        &mut self,
        scene: &Scene,
        device: &mut GraphicsDevice,
    ) -> Result<(), GraphicsError> {
        for index in 0..self.compiled.physical().len() {
            self.resources
                .realize_storage(device, &self.graph, &self.compiled, index)?;
        }
        for &id in self.compiled.order() {
            let Some(draw) = self.graph.pass(id).as_draw() else {
                continue;
            };
            if let Some(material) = material(scene, draw) {
                self.resources
                    .realize_shader(device, scene, draw, material)?;
            }
            for binding in &draw.textures {
                if let TextureBinding::Texture(name) = binding {
                    self.resources.realize_texture(device, scene, name)?;
                }
            }
        }
        let (textures, shaders, framebuffers) = device.pool().counts();
        log::info!(
            "Prepared frame: {textures} textures, {shaders} shaders, {framebuffers} framebuffers"
        );
        Ok(())
    }

    /// Executes one frame.
    pub fn execute(&mut self, scene: &Scene, device: &mut GraphicsDevice) -> FrameStats {
        let Self {
            graph,
            compiled,
            resources,
        } = self;
        let mut stats = FrameStats::default();

        for &id in compiled.order() {
            stats.passes += 1;
            let pass = graph.pass(id);
            match pass.kind() {
                PassKind::Clear { target, color } => {
                    match resources.storage_for(device, graph, compiled, *target) {
                        Some(storage) => {
                            device.clear_texture(storage.texture, *color);
                            stats.clears += 1;
                        }
                        None => stats.skipped += 1,
                    }
                }
                PassKind::Copy { source, target } => {
                    if compiled.physical_index(*source) == compiled.physical_index(*target) {
                        continue;
                    }
                    let src = resources.storage_for(device, graph, compiled, *source);
                    let dst = resources.storage_for(device, graph, compiled, *target);
                    match (src, dst) {
                        (Some(src), Some(dst)) => {
                            device.copy_texture(dst.texture, src.texture);
                            stats.copies += 1;
                        }
                        _ => stats.skipped += 1,
                    }
                }
                PassKind::Draw(draw) => {
                    if resources.draw(device, graph, compiled, scene, pass.name(), draw) {
                        stats.draws += 1;
                    } else {
                        stats.skipped += 1;
                    }
                }
                PassKind::Present { source } => {
                    match resources.storage_for(device, graph, compiled, *source) {
                        Some(storage) => stats.presented = device.present(storage.texture),
                        None => stats.skipped += 1,
                    }
                }
            }
        }

        log::trace!(
            "Frame: {} passes, {} draws, {} skipped",
            stats.passes,
            stats.draws,
            stats.skipped
        );
        stats
    }

    /// Destroys every resource this executor created.
    pub fn release(&mut self, device: &mut GraphicsDevice) {
        self.resources.release_storage(device);
        for shader in self.resources.shaders.drain().filter_map(|(_, s)| s) {
            device.destroy_shader(shader);
        }
        for texture in self.resources.textures.drain().filter_map(|(_, t)| t) {
            device.destroy_texture(texture);
        }
    }
}

fn material<'s>(scene: &'s Scene, draw: &DrawPass) -> Option<&'s Material> {
    scene.mesh(draw.mesh)?.materials.get(draw.sub_draw)
}

impl Resources {
    fn warn_once(&mut self, key: String, message: impl FnOnce() -> String) {
        if self.warned.insert(key) {
            log::warn!("{}", message());
        }
    }

    fn realize_storage(
        &mut self,
        device: &mut GraphicsDevice,
        graph: &FrameGraph,
        compiled: &CompiledFrameGraph,
        index: usize,
    ) -> Result<Storage, GraphicsError> {
        if let Some(storage) = self.storage[index] {
            return Ok(storage);
        }
        let physical = &compiled.physical()[index];
        let label = physical
            .targets
            .iter()
            .map(|&t| graph.target_info(t).name.as_str())
            .collect::<Vec<_>>()
            .join("+");
        let (width, height) = physical.size;
        let texture = device
            .create_texture(&TextureDescriptor::render_target(width, height).with_label(label))?;
        let framebuffer = match device.create_framebuffer(texture) {
            Ok(Some(framebuffer)) => framebuffer,
            Ok(None) => {
                return Err(BackendError::ResourceCreationFailed(
                    "framebuffer color texture vanished".into(),
                )
                .into());
            }
            Err(e) => {
                device.destroy_texture(texture);
                return Err(e);
            }
        };
        let storage = Storage {
            texture,
            framebuffer,
            size: physical.size,
        };
        self.storage[index] = Some(storage);
        Ok(storage)
    }

    fn storage_for(
        &mut self,
        device: &mut GraphicsDevice,
        graph: &FrameGraph,
        compiled: &CompiledFrameGraph,
        target: TargetId,
    ) -> Option<Storage> {
        let index = compiled.physical_index(target)?;
        match self.realize_storage(device, graph, compiled, index) {
            Ok(storage) => Some(storage),
            Err(e) => {
                let name = &graph.target_info(target).name;
                self.warn_once(format!("storage:{name}"), || {
                    format!("Render target '{name}' has no storage: {e}")
                });
                None
            }
        }
    }

    fn realize_shader(
        &mut self,
        device: &mut GraphicsDevice,
        scene: &Scene,
        draw: &DrawPass,
        material: &Material,
    ) -> Result<Option<ShaderHandle>, GraphicsError> {
        let key = (draw.mesh, draw.sub_draw);
        if let Some(&shader) = self.shaders.get(&key) {
            return Ok(shader);
        }
        let attributes = scene
            .mesh(draw.mesh)
            .and_then(|mesh| mesh.vertex_arrays.first())
            .map(|va| va.attributes().to_vec())
            .unwrap_or_default();
        let mut descriptor =
            ShaderDescriptor::new(material.shader.vertex.as_str(), material.shader.fragment.as_str())
                .with_label(material.shader.name.as_str());
        descriptor.attributes = attributes;
        descriptor.samplers = (0..material.textures.len())
            .map(|slot| format!("g_Texture{slot}"))
            .collect();

        match device.create_shader(&descriptor) {
            Ok(shader) => {
                self.shaders.insert(key, Some(shader));
                Ok(Some(shader))
            }
            Err(GraphicsError::Backend(e)) => {
                log::warn!("Shader '{}' failed to build: {e}", material.shader.name);
                self.shaders.insert(key, None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn realize_texture(
        &mut self,
        device: &mut GraphicsDevice,
        scene: &Scene,
        name: &str,
    ) -> Result<Option<TextureHandle>, GraphicsError> {
        if let Some(&texture) = self.textures.get(name) {
            return Ok(texture);
        }
        let Some(source) = scene.textures.get(name) else {
            self.warn_once(format!("texture:{name}"), || {
                format!("Texture '{name}' is not part of the scene")
            });
            self.textures.insert(name.to_string(), None);
            return Ok(None);
        };
        let header = &source.header;
        let descriptor = TextureDescriptor::new_2d(
            header.width,
            header.height,
            TextureFormat::Rgba8Unorm,
            TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        )
        .with_label(name)
        .with_slots(header.slot_count);
        let texture = device.create_texture(&descriptor)?;
        self.textures.insert(name.to_string(), Some(texture));
        Ok(Some(texture))
    }

    fn texture_for(
        &mut self,
        device: &mut GraphicsDevice,
        graph: &FrameGraph,
        compiled: &CompiledFrameGraph,
        scene: &Scene,
        binding: &TextureBinding,
    ) -> Option<GpuTexture> {
        match binding {
            TextureBinding::Unbound | TextureBinding::Missing(_) => None,
            TextureBinding::Target(target) => {
                let storage = self.storage_for(device, graph, compiled, *target)?;
                device.active_texture(storage.texture)
            }
            TextureBinding::Texture(name) => {
                let handle = match self.realize_texture(device, scene, name) {
                    Ok(handle) => handle?,
                    Err(e) => {
                        self.warn_once(format!("texture:{name}"), || {
                            format!("Texture '{name}' could not be created: {e}")
                        });
                        self.textures.insert(name.clone(), None);
                        return None;
                    }
                };
                if let Some(sprite) = scene
                    .textures
                    .get(name)
                    .and_then(|texture| texture.header.sprite.as_ref())
                {
                    let slots = device.texture(handle).map_or(1, |t| t.slots().len());
                    device.set_texture_slot(handle, sprite.frame_at(scene.time) % slots);
                }
                device.active_texture(handle)
            }
        }
    }

    fn draw(
        &mut self,
        device: &mut GraphicsDevice,
        graph: &FrameGraph,
        compiled: &CompiledFrameGraph,
        scene: &Scene,
        label: &str,
        draw: &DrawPass,
    ) -> bool {
        let Some(output) = draw.output else {
            return false;
        };
        let Some(mesh) = scene.mesh(draw.mesh) else {
            return false;
        };
        let (Some(material), Some(indices), Some(vertices)) = (
            mesh.materials.get(draw.sub_draw),
            mesh.index_arrays.get(draw.sub_draw),
            mesh.vertex_arrays.first(),
        ) else {
            return false;
        };
        if indices.render_count() == 0 {
            return false;
        }

        let Some(storage) = self.storage_for(device, graph, compiled, output) else {
            return false;
        };
        let status = device.framebuffer_status(storage.framebuffer);
        if !status.is_complete() {
            let name = &graph.target_info(output).name;
            self.warn_once(format!("incomplete:{name}"), || {
                format!("Framebuffer for '{name}' is {status:?}; skipping its passes")
            });
            return false;
        }

        let shader = match self.realize_shader(device, scene, draw, material) {
            Ok(Some(shader)) => shader,
            Ok(None) => return false,
            Err(e) => {
                self.warn_once(format!("shader:{label}"), || {
                    format!("No shader for '{label}': {e}")
                });
                return false;
            }
        };
        let Some(gpu_shader) = device.shader(shader).map(|s| s.gpu) else {
            return false;
        };

        let textures: Vec<Option<GpuTexture>> = draw
            .textures
            .iter()
            .map(|binding| self.texture_for(device, graph, compiled, scene, binding))
            .collect();
        let uniforms = uniforms(scene, draw, material);
        let target = device.framebuffer(storage.framebuffer).map(|fb| fb.gpu);

        device.draw(&DrawCall {
            label,
            shader: gpu_shader,
            textures: &textures,
            target,
            viewport: Viewport::full(storage.size.0, storage.size.1),
            blend: draw.blend,
            attributes: vertices.attributes(),
            vertices: vertices.as_bytes(),
            indices: indices.as_bytes(),
            index_count: indices.render_count(),
            dynamic: mesh.dynamic,
            uniforms: &uniforms,
        });
        true
    }

    fn release_storage(&mut self, device: &mut GraphicsDevice) {
        for storage in self.storage.drain(..).flatten() {
            device.destroy_framebuffer(storage.framebuffer);
            device.destroy_texture(storage.texture);
        }
    }
}

/// Uniform values of one draw: scene globals, then material constants,
/// then time and the transform matrices.
fn uniforms(scene: &Scene, draw: &DrawPass, material: &Material) -> ShaderValues {
    let mut values = scene.globals.clone();
    values.extend(
        material
            .constants
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );

    let model = match draw.transform {
        TransformSource::Node(node) => scene.nodes.world_matrix(node),
        TransformSource::Local(transform) => transform.matrix(),
    };
    let camera = draw
        .camera
        .as_deref()
        .and_then(|name| scene.cameras.get(name))
        .or_else(|| scene.active_camera());
    let view_projection = camera
        .map(|camera| camera.view_projection(&scene.nodes))
        .unwrap_or_else(Mat4::identity);

    values.insert("g_Time".into(), scene.time.into());
    values.insert("g_ModelMatrix".into(), model.into());
    values.insert("g_ViewProjectionMatrix".into(), view_projection.into());
    values.insert(
        "g_ModelViewProjectionMatrix".into(),
        (view_projection * model).into(),
    );
    values
}
