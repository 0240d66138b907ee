use crate::math::{Mat4, Vec3, mat4_from_scale_rotation_translation, quat_from_euler_degrees};
use crate::mesh::MeshId;

/// Node transform decomposed into translation, Euler angles and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Translation [x, y, z].
    pub translation: [f32; 3],
    /// Euler angles in degrees [x, y, z].
    pub angles: [f32; 3],
    /// Scale [x, y, z].
    pub scale: [f32; 3],
}

impl NodeTransform {
    /// Identity transform: no translation, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        angles: [0.0, 0.0, 0.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Returns this transform with a different translation.
    #[must_use]
    pub const fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with different Euler angles.
    #[must_use]
    pub const fn with_angles(mut self, angles: [f32; 3]) -> Self {
        self.angles = angles;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Local TRS matrix.
    pub fn matrix(&self) -> Mat4 {
        mat4_from_scale_rotation_translation(
            Vec3::from(self.scale),
            quat_from_euler_degrees(self.angles),
            Vec3::from(self.translation),
        )
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Stable index of a node inside a [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node with an optional mesh and camera reference.
///
/// Nodes inside a [`NodeTree`] know their parent and children; nodes owned
/// directly by an effect pass are detached and have neither.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Object id from the scene description, `-1` for synthetic nodes.
    pub id: i32,
    /// Local transform relative to the parent.
    pub transform: NodeTransform,
    /// Mesh drawn at this node.
    pub mesh: Option<MeshId>,
    /// Camera used to draw this node; the scene's active camera if unset.
    pub camera: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Creates a detached node with identity transform.
    pub fn new() -> Self {
        Self {
            id: -1,
            transform: NodeTransform::IDENTITY,
            mesh: None,
            camera: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the description object id.
    #[must_use]
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Attach a mesh.
    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Set the camera name.
    #[must_use]
    pub fn with_camera(mut self, camera: impl Into<String>) -> Self {
        self.camera = Some(camera.into());
        self
    }

    /// Parent node, `None` for the root and for detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena of nodes with a single root.
///
/// Nodes can only be added as children of an existing node, so every node
/// but the root has exactly one parent and the hierarchy cannot form cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl NodeTree {
    /// Creates a tree holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    /// The root node id.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Adds `node` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        assert!(parent.index() < self.nodes.len(), "unknown parent {parent}");
        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Looks up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Looks up a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root always exists.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// World matrix of a node (product of its ancestors' local matrices).
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Node ids in depth-first pre-order, starting at the root.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.index()].children.iter().rev().copied());
        }
        order
    }

    /// Finds the first node carrying the given description id.
    pub fn find_by_object_id(&self, object_id: i32) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.id == object_id && n.parent.is_some())
            .map(|i| NodeId(i as u32))
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}
