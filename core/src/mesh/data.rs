use crate::material::Material;

/// Index of a mesh in [`Scene::meshes`](crate::scene::Scene::meshes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

impl MeshId {
    /// Position in the owning mesh table.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named vertex attribute of 1 to 4 f32 components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader-side attribute name, e.g. `a_Position`.
    pub name: String,
    /// Number of f32 components.
    pub components: u32,
}

impl VertexAttribute {
    /// Creates an attribute.
    pub fn new(name: impl Into<String>, components: u32) -> Self {
        debug_assert!((1..=4).contains(&components));
        Self {
            name: name.into(),
            components,
        }
    }
}

/// Interleaved f32 vertex storage.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexArray {
    attributes: Vec<VertexAttribute>,
    stride: usize,
    vertex_count: usize,
    data: Vec<f32>,
}

impl VertexArray {
    /// Creates a zero-filled array of `vertex_count` vertices.
    pub fn new(attributes: Vec<VertexAttribute>, vertex_count: usize) -> Self {
        let stride = attributes.iter().map(|a| a.components as usize).sum();
        Self {
            attributes,
            stride,
            vertex_count,
            data: vec![0.0; stride * vertex_count],
        }
    }

    /// Attribute layout in interleaving order.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Floats per vertex.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of vertices the array holds.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Float offset of an attribute inside one vertex.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for attribute in &self.attributes {
            if attribute.name == name {
                return Some(offset);
            }
            offset += attribute.components as usize;
        }
        None
    }

    /// Writes one attribute for every vertex from a tightly packed slice.
    ///
    /// Returns false if the attribute is unknown or `values` is too short.
    pub fn set_attribute(&mut self, name: &str, values: &[f32]) -> bool {
        let Some(offset) = self.offset_of(name) else {
            return false;
        };
        let Some(components) = self
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.components as usize)
        else {
            return false;
        };
        if values.len() < components * self.vertex_count {
            return false;
        }
        for (vertex, chunk) in values.chunks_exact(components).take(self.vertex_count).enumerate() {
            let start = vertex * self.stride + offset;
            self.data[start..start + components].copy_from_slice(chunk);
        }
        true
    }

    /// Interleaved vertex data.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable interleaved vertex data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Vertex data as raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

/// Triangle index list with the number of indices to draw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexArray {
    data: Vec<u32>,
    render_count: usize,
}

impl IndexArray {
    /// Creates an index array that draws every index.
    pub fn new(data: Vec<u32>) -> Self {
        let render_count = data.len();
        Self { data, render_count }
    }

    /// All indices.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Indices that are currently drawn.
    #[inline]
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Sets the number of indices to draw, clamped to the stored count.
    pub fn set_render_count(&mut self, count: usize) {
        self.render_count = count.min(self.data.len());
    }

    /// Index data as raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

/// Geometry plus one material per sub-draw.
///
/// Each index array is one sub-draw and pairs with the material at the same
/// position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex arrays.
    pub vertex_arrays: Vec<VertexArray>,
    /// Index arrays, one per sub-draw.
    pub index_arrays: Vec<IndexArray>,
    /// Materials, one per sub-draw.
    pub materials: Vec<Material>,
    /// Rewritten every frame by a particle subsystem.
    pub dynamic: bool,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sub-draws.
    #[inline]
    pub fn sub_draw_count(&self) -> usize {
        self.index_arrays.len()
    }

    /// Returns true if every sub-draw has exactly one material.
    pub fn is_consistent(&self) -> bool {
        self.materials.len() == self.index_arrays.len()
    }

    /// Appends a material for the next sub-draw.
    pub fn add_material(&mut self, material: Material) {
        self.materials.push(material);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<VertexAttribute> {
        vec![
            VertexAttribute::new("a_Position", 3),
            VertexAttribute::new("a_TexCoord", 2),
        ]
    }

    #[test]
    fn test_stride_and_offsets() {
        let va = VertexArray::new(layout(), 4);
        assert_eq!(va.stride(), 5);
        assert_eq!(va.offset_of("a_TexCoord"), Some(3));
        assert_eq!(va.offset_of("a_Color"), None);
        assert_eq!(va.data().len(), 20);
    }

    #[test]
    fn test_set_attribute_interleaves() {
        let mut va = VertexArray::new(layout(), 2);
        assert!(va.set_attribute("a_TexCoord", &[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(va.data(), &[0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 3.0, 4.0]);
    }

    #[test]
    fn test_set_attribute_rejects_short_input() {
        let mut va = VertexArray::new(layout(), 2);
        assert!(!va.set_attribute("a_Position", &[1.0, 2.0]));
        assert!(!va.set_attribute("missing", &[0.0; 8]));
    }

    #[test]
    fn test_render_count_clamped() {
        let mut ia = IndexArray::new(vec![0, 1, 2]);
        ia.set_render_count(10);
        assert_eq!(ia.render_count(), 3);
        ia.set_render_count(0);
        assert_eq!(ia.render_count(), 0);
        assert_eq!(ia.as_bytes().len(), 12);
    }
}
