//! CPU-side mesh types and generators.
//!
//! - [`VertexArray`] - Interleaved f32 vertex storage with named attributes
//! - [`IndexArray`] - Triangle indices with a live render count
//! - [`Mesh`] - Vertex arrays, index arrays and one material per sub-draw
//! - Generators for the card quad and the particle quad buffer

mod data;
pub mod generators;

pub use data::{IndexArray, Mesh, MeshId, VertexArray, VertexAttribute};
