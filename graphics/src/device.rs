//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface for creating GPU resources.
//! It couples a [`GpuBackend`] with the [`ResourcePool`]: every create makes
//! the backend object and pools it, every destroy releases both.
//!
//! # Thread Safety
//!
//! The device takes `&mut self` everywhere and lives on the GPU-owning
//! thread. It is not designed for concurrent entry.
//!
//! # Example
//!
//! ```
//! use lumenwall_graphics::{DummyBackend, GraphicsDevice, PoolLimits, TextureDescriptor};
//!
//! let mut device = GraphicsDevice::new(Box::new(DummyBackend::new()), PoolLimits::default());
//! let texture = device
//!     .create_texture(&TextureDescriptor::render_target(64, 64).with_slots(4))
//!     .unwrap();
//! assert!(device.set_texture_slot(texture, 3));
//!
//! device.destroy_texture(texture);
//! assert!(device.texture(texture).is_none());
//! ```

use lumenwall_core::pool::PoolError;

use crate::backend::{DrawCall, GpuBackend, GpuTexture};
use crate::error::GraphicsError;
use crate::pool::{
    FramebufferEntry, FramebufferHandle, PoolLimits, ResourcePool, ShaderEntry, ShaderHandle,
    TextureEntry, TextureHandle,
};
use crate::types::{FramebufferDescriptor, FramebufferStatus, ShaderDescriptor, TextureDescriptor};

/// A backend plus the pool of resources created through it.
pub struct GraphicsDevice {
    backend: Box<dyn GpuBackend>,
    pool: ResourcePool,
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("backend", &self.backend.name())
            .field("pool", &self.pool)
            .finish()
    }
}

impl GraphicsDevice {
    /// Creates a device over `backend` with the given pool ceilings.
    pub fn new(backend: Box<dyn GpuBackend>, limits: PoolLimits) -> Self {
        log::info!(
            "Graphics device on {} (textures {}, shaders {}, framebuffers {})",
            backend.name(),
            limits.textures,
            limits.shaders,
            limits.framebuffers
        );
        Self {
            backend,
            pool: ResourcePool::new(limits),
        }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Read access to the pool.
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    // ------------------------------------------------------------------
    // Textures
    // ------------------------------------------------------------------

    /// Creates a texture with `descriptor.slot_count` slots.
    pub fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<TextureHandle, GraphicsError> {
        if !self.pool.has_texture_room() {
            return Err(PoolError::Exhausted {
                capacity: self.pool.limits().textures,
            }
            .into());
        }

        let mut slots = Vec::with_capacity(descriptor.slot_count as usize);
        for _ in 0..descriptor.slot_count.max(1) {
            match self.backend.create_texture(descriptor) {
                Ok(texture) => slots.push(texture),
                Err(e) => {
                    for texture in slots {
                        self.backend.destroy_texture(texture);
                    }
                    return Err(e.into());
                }
            }
        }
        let handle = self
            .pool
            .insert_texture(TextureEntry::new(descriptor.clone(), slots))?;
        log::debug!(
            "Created texture {} ({}x{}, {} slot(s), {} bytes each)",
            descriptor.label.as_deref().unwrap_or("<unnamed>"),
            descriptor.width,
            descriptor.height,
            descriptor.slot_count,
            descriptor.slot_size()
        );
        Ok(handle)
    }

    /// Looks up a texture.
    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureEntry> {
        self.pool.texture(handle)
    }

    /// Backend texture of the active slot.
    pub fn active_texture(&self, handle: TextureHandle) -> Option<GpuTexture> {
        self.pool.texture(handle).map(TextureEntry::active)
    }

    /// Repoints a texture's active slot without reallocating.
    pub fn set_texture_slot(&mut self, handle: TextureHandle, slot: usize) -> bool {
        self.pool
            .texture_mut(handle)
            .is_some_and(|entry| entry.set_active_slot(slot))
    }

    /// Destroys a texture. Stale handles are ignored.
    pub fn destroy_texture(&mut self, handle: TextureHandle) {
        if let Some(entry) = self.pool.remove_texture(handle) {
            for &texture in entry.slots() {
                self.backend.destroy_texture(texture);
            }
        }
    }

    // ------------------------------------------------------------------
    // Shaders
    // ------------------------------------------------------------------

    /// Compiles a shader program.
    pub fn create_shader(
        &mut self,
        descriptor: &ShaderDescriptor,
    ) -> Result<ShaderHandle, GraphicsError> {
        if !self.pool.has_shader_room() {
            return Err(PoolError::Exhausted {
                capacity: self.pool.limits().shaders,
            }
            .into());
        }
        let gpu = self.backend.create_shader(descriptor)?;
        Ok(self.pool.insert_shader(ShaderEntry {
            desc: descriptor.clone(),
            gpu,
        })?)
    }

    /// Looks up a shader.
    pub fn shader(&self, handle: ShaderHandle) -> Option<&ShaderEntry> {
        self.pool.shader(handle)
    }

    /// Destroys a shader. Stale handles are ignored.
    pub fn destroy_shader(&mut self, handle: ShaderHandle) {
        if let Some(entry) = self.pool.remove_shader(handle) {
            self.backend.destroy_shader(entry.gpu);
        }
    }

    // ------------------------------------------------------------------
    // Framebuffers
    // ------------------------------------------------------------------

    /// Creates a framebuffer rendering into `color`'s active slot.
    ///
    /// Returns `Ok(None)` if `color` is stale.
    pub fn create_framebuffer(
        &mut self,
        color: TextureHandle,
    ) -> Result<Option<FramebufferHandle>, GraphicsError> {
        let Some(texture) = self.pool.texture(color) else {
            return Ok(None);
        };
        if !self.pool.has_framebuffer_room() {
            return Err(PoolError::Exhausted {
                capacity: self.pool.limits().framebuffers,
            }
            .into());
        }
        let mut descriptor = FramebufferDescriptor::new(texture.active());
        descriptor.label = texture.desc.label.clone();
        let gpu = self.backend.create_framebuffer(&descriptor)?;
        Ok(Some(
            self.pool
                .insert_framebuffer(FramebufferEntry { color, gpu })?,
        ))
    }

    /// Looks up a framebuffer.
    pub fn framebuffer(&self, handle: FramebufferHandle) -> Option<&FramebufferEntry> {
        self.pool.framebuffer(handle)
    }

    /// Re-attaches a framebuffer to `color`'s active slot.
    pub fn update_framebuffer(&mut self, handle: FramebufferHandle, color: TextureHandle) -> bool {
        let Some(texture) = self.active_texture(color) else {
            return false;
        };
        let Some(entry) = self.pool.framebuffer_mut(handle) else {
            return false;
        };
        entry.color = color;
        let gpu = entry.gpu;
        self.backend.update_framebuffer(gpu, texture);
        true
    }

    /// Completeness of a framebuffer; stale handles report `Unsupported`.
    pub fn framebuffer_status(&self, handle: FramebufferHandle) -> FramebufferStatus {
        match self.pool.framebuffer(handle) {
            Some(entry) => self.backend.framebuffer_status(entry.gpu),
            None => FramebufferStatus::Unsupported,
        }
    }

    /// Destroys a framebuffer. Stale handles are ignored.
    pub fn destroy_framebuffer(&mut self, handle: FramebufferHandle) {
        if let Some(entry) = self.pool.remove_framebuffer(handle) {
            self.backend.destroy_framebuffer(entry.gpu);
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Copies the active slot of `source` into `destination`.
    pub fn copy_texture(&mut self, destination: TextureHandle, source: TextureHandle) -> bool {
        match (self.active_texture(destination), self.active_texture(source)) {
            (Some(dst), Some(src)) => {
                self.backend.copy_texture(dst, src);
                true
            }
            _ => false,
        }
    }

    /// Clears the active slot of a texture.
    pub fn clear_texture(&mut self, handle: TextureHandle, color: [f32; 4]) -> bool {
        match self.active_texture(handle) {
            Some(texture) => {
                self.backend.clear_texture(texture, color);
                true
            }
            None => false,
        }
    }

    /// Issues a draw.
    pub fn draw(&mut self, call: &DrawCall<'_>) {
        self.backend.draw(call);
    }

    /// Presents a texture to the screen.
    pub fn present(&mut self, handle: TextureHandle) -> bool {
        match self.active_texture(handle) {
            Some(texture) => {
                self.backend.present(texture);
                true
            }
            None => false,
        }
    }

    /// Destroys every pooled resource.
    pub fn release_all(&mut self) {
        let (textures, shaders, framebuffers) = self.pool.drain();
        for entry in framebuffers {
            self.backend.destroy_framebuffer(entry.gpu);
        }
        for entry in shaders {
            self.backend.destroy_shader(entry.gpu);
        }
        for entry in textures {
            for &texture in entry.slots() {
                self.backend.destroy_texture(texture);
            }
        }
    }
}

impl Drop for GraphicsDevice {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DummyBackend, DummyCommand, DummyRecorder};

    fn device(limits: PoolLimits) -> (GraphicsDevice, DummyRecorder) {
        let backend = DummyBackend::new();
        let recorder = backend.recorder();
        (GraphicsDevice::new(Box::new(backend), limits), recorder)
    }

    #[test]
    fn test_texture_slots_created_and_destroyed() {
        let (mut device, recorder) = device(PoolLimits::default());
        let handle = device
            .create_texture(&TextureDescriptor::render_target(4, 4).with_slots(3))
            .unwrap();
        assert_eq!(
            recorder.count(|c| matches!(c, DummyCommand::CreateTexture { .. })),
            3
        );

        device.destroy_texture(handle);
        assert_eq!(
            recorder.count(|c| matches!(c, DummyCommand::DestroyTexture(_))),
            3
        );
        assert!(device.texture(handle).is_none());
    }

    #[test]
    fn test_exhaustion_creates_nothing() {
        let (mut device, recorder) = device(PoolLimits {
            textures: 1,
            shaders: 1,
            framebuffers: 1,
        });
        device
            .create_texture(&TextureDescriptor::render_target(4, 4))
            .unwrap();
        recorder.clear();

        let err = device
            .create_texture(&TextureDescriptor::render_target(4, 4))
            .unwrap_err();
        assert_eq!(
            err,
            GraphicsError::Pool(PoolError::Exhausted { capacity: 1 })
        );
        assert!(recorder.commands().is_empty());
    }

    #[test]
    fn test_stale_handles_are_ignored() {
        let (mut device, recorder) = device(PoolLimits::default());
        let texture = device
            .create_texture(&TextureDescriptor::render_target(4, 4))
            .unwrap();
        device.destroy_texture(texture);
        recorder.clear();

        assert!(!device.clear_texture(texture, [0.0; 4]));
        assert!(!device.present(texture));
        assert_eq!(device.create_framebuffer(texture).unwrap(), None);
        device.destroy_texture(texture);
        assert!(recorder.commands().is_empty());
    }

    #[test]
    fn test_framebuffer_follows_active_slot() {
        let (mut device, recorder) = device(PoolLimits::default());
        let texture = device
            .create_texture(&TextureDescriptor::render_target(4, 4).with_slots(2))
            .unwrap();
        let fb = device.create_framebuffer(texture).unwrap().unwrap();
        assert_eq!(device.framebuffer_status(fb), FramebufferStatus::Complete);

        device.set_texture_slot(texture, 1);
        assert!(device.update_framebuffer(fb, texture));
        let second = device.texture(texture).unwrap().slots()[1];
        assert!(recorder.commands().contains(&DummyCommand::UpdateFramebuffer {
            framebuffer: device.framebuffer(fb).unwrap().gpu,
            color: second,
        }));
    }

    #[test]
    fn test_drop_releases_everything() {
        let (mut device, recorder) = device(PoolLimits::default());
        let texture = device
            .create_texture(&TextureDescriptor::render_target(4, 4))
            .unwrap();
        device.create_framebuffer(texture).unwrap();
        device
            .create_shader(&ShaderDescriptor::new("v", "f"))
            .unwrap();
        drop(device);
        assert_eq!(
            recorder.count(|c| matches!(
                c,
                DummyCommand::DestroyTexture(_)
                    | DummyCommand::DestroyShader(_)
                    | DummyCommand::DestroyFramebuffer(_)
            )),
            3
        );
    }
}
