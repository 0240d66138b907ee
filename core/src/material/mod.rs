//! Scene materials.
//!
//! A [`Material`] is the fully resolved draw state for one sub-draw of a
//! mesh: specialized shader sources, the texture names bound to each slot,
//! the fixed-function blend mode and the constant shader values uploaded
//! alongside the draw.
//!
//! - [`BlendMode`] - Fixed-function blend state
//! - [`ShaderValue`] / [`ShaderValues`] - Named float uniform payloads
//! - [`ShaderSource`] - Vertex and fragment source after specialization

mod types;

pub use types::{BlendMode, Material, ShaderSource, ShaderValue, ShaderValues};
