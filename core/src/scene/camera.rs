use crate::math::{Mat4, orthographic_rh, perspective_rh};

use super::effect::ImageEffectLayer;
use super::node::{NodeId, NodeTree};

/// Camera projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Orthographic volume centered on the camera node.
    Orthographic {
        /// Visible width.
        width: f32,
        /// Visible height.
        height: f32,
        /// Near plane.
        near: f32,
        /// Far plane.
        far: f32,
    },
    /// Perspective frustum.
    Perspective {
        /// Vertical field of view in degrees.
        fov: f32,
        /// Width over height.
        aspect: f32,
        /// Near plane.
        near: f32,
        /// Far plane.
        far: f32,
    },
}

impl Projection {
    /// Projection matrix.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Orthographic {
                width,
                height,
                near,
                far,
            } => orthographic_rh(
                -width / 2.0,
                width / 2.0,
                -height / 2.0,
                height / 2.0,
                near,
                far,
            ),
            Self::Perspective {
                fov,
                aspect,
                near,
                far,
            } => perspective_rh(fov.to_radians(), aspect, near, far),
        }
    }
}

/// A named camera.
///
/// The view transform comes from the attached node. A camera that owns an
/// [`ImageEffectLayer`] renders its nodes into the layer's first ping-pong
/// target instead of the default target.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Projection parameters.
    pub projection: Projection,
    /// Node the view transform is taken from.
    pub node: Option<NodeId>,
    /// Effect chain rendered through this camera.
    pub effect_layer: Option<ImageEffectLayer>,
}

impl Camera {
    /// Creates an orthographic camera.
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Orthographic {
                width,
                height,
                near,
                far,
            },
            node: None,
            effect_layer: None,
        }
    }

    /// Creates a perspective camera (`fov` in degrees).
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            },
            node: None,
            effect_layer: None,
        }
    }

    /// Attach the camera to a node.
    #[must_use]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Inverse of the attached node's world matrix; identity when detached.
    pub fn view_matrix(&self, tree: &NodeTree) -> Mat4 {
        self.node
            .map(|node| tree.world_matrix(node))
            .and_then(|world| world.try_inverse())
            .unwrap_or_else(Mat4::identity)
    }

    /// Projection times view.
    pub fn view_projection(&self, tree: &NodeTree) -> Mat4 {
        self.projection.matrix() * self.view_matrix(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;
    use crate::scene::{Node, NodeTransform};

    #[test]
    fn test_view_follows_node() {
        let mut tree = NodeTree::new();
        let node = tree.add_child(
            tree.root(),
            Node::new().with_transform(NodeTransform::IDENTITY.with_translation([960.0, 540.0, 0.0])),
        );
        let camera = Camera::orthographic(1920.0, 1080.0, -5000.0, 5000.0).with_node(node);
        // The scene center maps to the clip-space origin.
        let clip = camera.view_projection(&tree) * Vec4::new(960.0, 540.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
        // The top-right scene corner maps to (1, 1).
        let corner = camera.view_projection(&tree) * Vec4::new(1920.0, 1080.0, 0.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_detached_view_is_identity() {
        let tree = NodeTree::new();
        let camera = Camera::perspective(60.0, 16.0 / 9.0, 0.01, 100.0);
        assert_eq!(camera.view_matrix(&tree), Mat4::identity());
    }
}
