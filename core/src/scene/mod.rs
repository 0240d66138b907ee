//! Compiled scene representation.
//!
//! A [`Scene`] is produced once by the scene compiler and then executed every
//! frame. Its structure never changes after compilation; per frame only the
//! elapsed time and the particle buffers are rewritten.
//!
//! - [`NodeTree`] / [`Node`] / [`NodeTransform`] - Arena-backed node hierarchy
//! - [`Camera`] / [`Projection`] - Named cameras, optionally owning an effect layer
//! - [`RenderTargetDesc`] / [`TargetSize`] - Named render target declarations
//! - [`ImageEffectLayer`] / [`ImageEffect`] / [`EffectPass`] - Post-process chains

mod camera;
mod effect;
mod node;
mod target;
mod types;

pub use camera::{Camera, Projection};
pub use effect::{CopyCommand, EffectPass, ImageEffect, ImageEffectLayer};
pub use node::{Node, NodeId, NodeTransform, NodeTree};
pub use target::{
    DEFAULT_TARGET, FULL_FRAME_BUFFER, LAYER_COMPOSITE_PREFIX, LINK_PREFIX,
    MIP_MAPPED_FRAME_BUFFER, RenderTargetDesc, ReservedName, TargetSize, link_target_name,
};
pub use types::Scene;
