//! Mesh generators for the two shapes the scene compiler emits.
//!
//! Both produce quads wound `0, 1, 3, 1, 2, 3` with corners ordered
//! bottom-left, bottom-right, top-right, top-left.

use super::data::{IndexArray, Mesh, VertexArray, VertexAttribute};

/// Position attribute name.
pub const ATTR_POSITION: &str = "a_Position";
/// Card texture coordinate attribute name.
pub const ATTR_TEXCOORD: &str = "a_TexCoord";
/// Particle corner/size/rotation attribute name.
pub const ATTR_TEXCOORD_VEC4: &str = "a_TexCoordVec4";
/// Particle color attribute name.
pub const ATTR_COLOR: &str = "a_Color";
/// Particle sprite/trail attribute name.
pub const ATTR_TEXCOORD_VEC4_C1: &str = "a_TexCoordVec4C1";
/// Particle frame attribute name.
pub const ATTR_TEXCOORD_C2: &str = "a_TexCoordC2";

const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Generate a card quad centered on the origin.
///
/// `map_rate` scales the texture coordinates, used when a texture was padded
/// to a larger power-of-two surface and only part of it holds the image.
pub fn generate_card(width: f32, height: f32, map_rate: [f32; 2]) -> Mesh {
    let (left, right) = (-width / 2.0, width / 2.0);
    let (bottom, top) = (-height / 2.0, height / 2.0);
    #[rustfmt::skip]
    let positions = [
        left,  bottom, 0.0,
        right, bottom, 0.0,
        right, top,    0.0,
        left,  top,    0.0,
    ];
    let [tw, th] = map_rate;
    #[rustfmt::skip]
    let texcoords = [
        0.0, 0.0,
        tw,  0.0,
        tw,  th,
        0.0, th,
    ];

    let mut vertices = VertexArray::new(
        vec![
            VertexAttribute::new(ATTR_POSITION, 3),
            VertexAttribute::new(ATTR_TEXCOORD, 2),
        ],
        4,
    );
    vertices.set_attribute(ATTR_POSITION, &positions);
    vertices.set_attribute(ATTR_TEXCOORD, &texcoords);

    Mesh {
        vertex_arrays: vec![vertices],
        index_arrays: vec![IndexArray::new(QUAD_INDICES.to_vec())],
        materials: Vec::new(),
        dynamic: false,
    }
}

/// Generate the dynamic quad buffer a particle subsystem publishes into.
///
/// Holds four vertices and six indices per particle for `capacity`
/// particles. `extended` adds the `a_TexCoordVec4C1` attribute used by
/// sprite-sheet and trail renderers. Nothing is drawn until the first
/// publish sets the render count.
pub fn generate_particle_quads(capacity: usize, extended: bool) -> Mesh {
    let mut attributes = vec![
        VertexAttribute::new(ATTR_POSITION, 3),
        VertexAttribute::new(ATTR_TEXCOORD_VEC4, 4),
        VertexAttribute::new(ATTR_COLOR, 4),
    ];
    if extended {
        attributes.push(VertexAttribute::new(ATTR_TEXCOORD_VEC4_C1, 4));
    }
    attributes.push(VertexAttribute::new(ATTR_TEXCOORD_C2, 2));

    let mut indices = Vec::with_capacity(capacity * 6);
    for particle in 0..capacity as u32 {
        indices.extend(QUAD_INDICES.iter().map(|i| particle * 4 + i));
    }
    let mut index_array = IndexArray::new(indices);
    index_array.set_render_count(0);

    Mesh {
        vertex_arrays: vec![VertexArray::new(attributes, capacity * 4)],
        index_arrays: vec![index_array],
        materials: Vec::new(),
        dynamic: true,
    }
}
