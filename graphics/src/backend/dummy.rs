//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It hands out
//! sequential ids and records every call into a shared command log that
//! tests inspect through a [`DummyRecorder`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use lumenwall_core::material::BlendMode;

use crate::types::{
    FramebufferDescriptor, FramebufferStatus, ShaderDescriptor, TextureDescriptor, Viewport,
};

use super::{BackendError, DrawCall, GpuBackend, GpuFramebuffer, GpuShader, GpuTexture};

/// A call recorded by the [`DummyBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum DummyCommand {
    CreateTexture {
        texture: GpuTexture,
        label: Option<String>,
        width: u32,
        height: u32,
    },
    DestroyTexture(GpuTexture),
    CreateShader {
        shader: GpuShader,
        label: Option<String>,
    },
    DestroyShader(GpuShader),
    CreateFramebuffer {
        framebuffer: GpuFramebuffer,
        color: GpuTexture,
    },
    UpdateFramebuffer {
        framebuffer: GpuFramebuffer,
        color: GpuTexture,
    },
    DestroyFramebuffer(GpuFramebuffer),
    Copy {
        destination: GpuTexture,
        source: GpuTexture,
    },
    Clear {
        texture: GpuTexture,
        color: [f32; 4],
    },
    Draw {
        label: String,
        shader: GpuShader,
        textures: Vec<Option<GpuTexture>>,
        target: Option<GpuFramebuffer>,
        viewport: Viewport,
        blend: BlendMode,
        index_count: usize,
        uniforms: Vec<String>,
    },
    Present(GpuTexture),
}

/// Shared view of a [`DummyBackend`]'s command log.
#[derive(Debug, Clone, Default)]
pub struct DummyRecorder {
    commands: Arc<Mutex<Vec<DummyCommand>>>,
}

impl DummyRecorder {
    /// Snapshot of every recorded command.
    pub fn commands(&self) -> Vec<DummyCommand> {
        self.commands.lock().clone()
    }

    /// Recorded draws in submission order.
    pub fn draws(&self) -> Vec<DummyCommand> {
        self.commands
            .lock()
            .iter()
            .filter(|c| matches!(c, DummyCommand::Draw { .. }))
            .cloned()
            .collect()
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DummyCommand) -> bool) -> usize {
        self.commands.lock().iter().filter(|c| predicate(c)).count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.commands.lock().clear();
    }

    fn push(&self, command: DummyCommand) {
        self.commands.lock().push(command);
    }
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    next_id: u64,
    recorder: DummyRecorder,
    framebuffers: HashMap<GpuFramebuffer, GpuTexture>,
    incomplete: Vec<GpuTexture>,
    fail_shaders: bool,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the command log, valid after the backend is boxed away.
    pub fn recorder(&self) -> DummyRecorder {
        self.recorder.clone()
    }

    /// Makes every shader creation fail.
    #[must_use]
    pub fn with_failing_shaders(mut self) -> Self {
        self.fail_shaders = true;
        self
    }

    /// Reports framebuffers attached to `texture` as incomplete.
    pub fn mark_incomplete(&mut self, texture: GpuTexture) {
        self.incomplete.push(texture);
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<GpuTexture, BackendError> {
        let texture = GpuTexture(self.next());
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{})",
            descriptor.label,
            descriptor.width,
            descriptor.height
        );
        self.recorder.push(DummyCommand::CreateTexture {
            texture,
            label: descriptor.label.clone(),
            width: descriptor.width,
            height: descriptor.height,
        });
        Ok(texture)
    }

    fn destroy_texture(&mut self, texture: GpuTexture) {
        log::trace!("DummyBackend: destroying texture {:?}", texture);
        self.recorder.push(DummyCommand::DestroyTexture(texture));
    }

    fn create_shader(&mut self, descriptor: &ShaderDescriptor) -> Result<GpuShader, BackendError> {
        if self.fail_shaders {
            return Err(BackendError::ShaderCompilation(format!(
                "{:?} rejected",
                descriptor.label
            )));
        }
        let shader = GpuShader(self.next());
        log::trace!("DummyBackend: creating shader {:?}", descriptor.label);
        self.recorder.push(DummyCommand::CreateShader {
            shader,
            label: descriptor.label.clone(),
        });
        Ok(shader)
    }

    fn destroy_shader(&mut self, shader: GpuShader) {
        log::trace!("DummyBackend: destroying shader {:?}", shader);
        self.recorder.push(DummyCommand::DestroyShader(shader));
    }

    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<GpuFramebuffer, BackendError> {
        let framebuffer = GpuFramebuffer(self.next());
        log::trace!("DummyBackend: creating framebuffer {:?}", descriptor.label);
        self.framebuffers.insert(framebuffer, descriptor.color);
        self.recorder.push(DummyCommand::CreateFramebuffer {
            framebuffer,
            color: descriptor.color,
        });
        Ok(framebuffer)
    }

    fn update_framebuffer(&mut self, framebuffer: GpuFramebuffer, color: GpuTexture) {
        self.framebuffers.insert(framebuffer, color);
        self.recorder
            .push(DummyCommand::UpdateFramebuffer { framebuffer, color });
    }

    fn framebuffer_status(&self, framebuffer: GpuFramebuffer) -> FramebufferStatus {
        match self.framebuffers.get(&framebuffer) {
            None => FramebufferStatus::Unsupported,
            Some(color) if self.incomplete.contains(color) => {
                FramebufferStatus::IncompleteAttachment
            }
            Some(_) => FramebufferStatus::Complete,
        }
    }

    fn destroy_framebuffer(&mut self, framebuffer: GpuFramebuffer) {
        self.framebuffers.remove(&framebuffer);
        self.recorder
            .push(DummyCommand::DestroyFramebuffer(framebuffer));
    }

    fn copy_texture(&mut self, destination: GpuTexture, source: GpuTexture) {
        log::trace!("DummyBackend: copy {:?} -> {:?}", source, destination);
        self.recorder.push(DummyCommand::Copy {
            destination,
            source,
        });
    }

    fn clear_texture(&mut self, texture: GpuTexture, color: [f32; 4]) {
        self.recorder.push(DummyCommand::Clear { texture, color });
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        log::trace!(
            "DummyBackend: draw '{}' ({} indices)",
            call.label,
            call.index_count
        );
        self.recorder.push(DummyCommand::Draw {
            label: call.label.to_string(),
            shader: call.shader,
            textures: call.textures.to_vec(),
            target: call.target,
            viewport: call.viewport,
            blend: call.blend,
            index_count: call.index_count,
            uniforms: call.uniforms.keys().cloned().collect(),
        });
    }

    fn present(&mut self, texture: GpuTexture) {
        log::trace!("DummyBackend: present {:?}", texture);
        self.recorder.push(DummyCommand::Present(texture));
    }
}
