//! GPU resource pool.
//!
//! Keeps the textures, shader programs and framebuffers the executor works
//! with behind generation-checked handles. The pool only does bookkeeping;
//! [`GraphicsDevice`](crate::device::GraphicsDevice) pairs every entry with
//! the backend object it describes.

use lumenwall_core::pool::{Handle, HandlePool, PoolError};

use crate::backend::{GpuFramebuffer, GpuShader, GpuTexture};
use crate::types::{ShaderDescriptor, TextureDescriptor};

/// Handle to a pooled texture.
pub type TextureHandle = Handle<TextureEntry>;
/// Handle to a pooled shader program.
pub type ShaderHandle = Handle<ShaderEntry>;
/// Handle to a pooled framebuffer.
pub type FramebufferHandle = Handle<FramebufferEntry>;

/// Capacity ceilings of the three resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Maximum live textures.
    pub textures: usize,
    /// Maximum live shader programs.
    pub shaders: usize,
    /// Maximum live framebuffers.
    pub framebuffers: usize,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            textures: 512,
            shaders: 256,
            framebuffers: 128,
        }
    }
}

/// A texture with one or more same-sized slots.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureEntry {
    /// Creation descriptor.
    pub desc: TextureDescriptor,
    slots: Vec<GpuTexture>,
    active_slot: usize,
}

impl TextureEntry {
    /// Wraps backend textures, one per slot. `slots` must not be empty.
    pub fn new(desc: TextureDescriptor, slots: Vec<GpuTexture>) -> Self {
        debug_assert!(!slots.is_empty());
        Self {
            desc,
            slots,
            active_slot: 0,
        }
    }

    /// The slot that is sampled and rendered to.
    pub fn active(&self) -> GpuTexture {
        self.slots[self.active_slot]
    }

    /// Index of the active slot.
    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    /// Repoints the active slot. Returns false if `slot` is out of range.
    pub fn set_active_slot(&mut self, slot: usize) -> bool {
        if slot >= self.slots.len() {
            return false;
        }
        self.active_slot = slot;
        true
    }

    /// Every backend texture owned by this entry.
    pub fn slots(&self) -> &[GpuTexture] {
        &self.slots
    }
}

/// A linked shader program.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderEntry {
    /// Creation descriptor.
    pub desc: ShaderDescriptor,
    /// Backend program.
    pub gpu: GpuShader,
}

/// A framebuffer rendering into a pooled texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferEntry {
    /// Texture whose active slot is the color attachment.
    pub color: TextureHandle,
    /// Backend framebuffer.
    pub gpu: GpuFramebuffer,
}

/// Handle pools for every resource kind.
#[derive(Debug)]
pub struct ResourcePool {
    textures: HandlePool<TextureEntry>,
    shaders: HandlePool<ShaderEntry>,
    framebuffers: HandlePool<FramebufferEntry>,
}

impl ResourcePool {
    /// Creates empty pools with the given capacities.
    pub fn new(limits: PoolLimits) -> Self {
        Self {
            textures: HandlePool::with_capacity(limits.textures),
            shaders: HandlePool::with_capacity(limits.shaders),
            framebuffers: HandlePool::with_capacity(limits.framebuffers),
        }
    }

    /// Stores a texture entry, failing when the texture pool is full.
    pub fn insert_texture(&mut self, entry: TextureEntry) -> Result<TextureHandle, PoolError> {
        self.textures.insert(entry)
    }

    /// Looks up a texture; `None` for stale handles.
    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureEntry> {
        self.textures.get(handle)
    }

    /// Looks up a texture mutably.
    pub fn texture_mut(&mut self, handle: TextureHandle) -> Option<&mut TextureEntry> {
        self.textures.get_mut(handle)
    }

    /// Frees a texture slot and returns its entry.
    pub fn remove_texture(&mut self, handle: TextureHandle) -> Option<TextureEntry> {
        self.textures.remove(handle)
    }

    /// Stores a shader entry, failing when the shader pool is full.
    pub fn insert_shader(&mut self, entry: ShaderEntry) -> Result<ShaderHandle, PoolError> {
        self.shaders.insert(entry)
    }

    /// Looks up a shader; `None` for stale handles.
    pub fn shader(&self, handle: ShaderHandle) -> Option<&ShaderEntry> {
        self.shaders.get(handle)
    }

    /// Frees a shader slot and returns its entry.
    pub fn remove_shader(&mut self, handle: ShaderHandle) -> Option<ShaderEntry> {
        self.shaders.remove(handle)
    }

    /// Stores a framebuffer entry, failing when the framebuffer pool is full.
    pub fn insert_framebuffer(
        &mut self,
        entry: FramebufferEntry,
    ) -> Result<FramebufferHandle, PoolError> {
        self.framebuffers.insert(entry)
    }

    /// Looks up a framebuffer; `None` for stale handles.
    pub fn framebuffer(&self, handle: FramebufferHandle) -> Option<&FramebufferEntry> {
        self.framebuffers.get(handle)
    }

    /// Looks up a framebuffer mutably.
    pub fn framebuffer_mut(&mut self, handle: FramebufferHandle) -> Option<&mut FramebufferEntry> {
        self.framebuffers.get_mut(handle)
    }

    /// Frees a framebuffer slot and returns its entry.
    pub fn remove_framebuffer(&mut self, handle: FramebufferHandle) -> Option<FramebufferEntry> {
        self.framebuffers.remove(handle)
    }

    /// True if one more texture fits.
    pub fn has_texture_room(&self) -> bool {
        self.textures.len() < self.textures.capacity()
    }

    /// True if one more shader fits.
    pub fn has_shader_room(&self) -> bool {
        self.shaders.len() < self.shaders.capacity()
    }

    /// True if one more framebuffer fits.
    pub fn has_framebuffer_room(&self) -> bool {
        self.framebuffers.len() < self.framebuffers.capacity()
    }

    /// Live counts as `(textures, shaders, framebuffers)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.textures.len(),
            self.shaders.len(),
            self.framebuffers.len(),
        )
    }

    /// Empties every pool, returning what was live.
    pub fn drain(&mut self) -> (Vec<TextureEntry>, Vec<ShaderEntry>, Vec<FramebufferEntry>) {
        (
            self.textures.drain(),
            self.shaders.drain(),
            self.framebuffers.drain(),
        )
    }

    /// Capacities the pools were created with.
    pub fn limits(&self) -> PoolLimits {
        PoolLimits {
            textures: self.textures.capacity(),
            shaders: self.shaders.capacity(),
            framebuffers: self.framebuffers.capacity(),
        }
    }
}
