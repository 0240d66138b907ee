//! Builds the frame graph of a compiled [`Scene`].

use std::collections::HashSet;

use lumenwall_core::material::Material;
use lumenwall_core::scene::{
    DEFAULT_TARGET, ImageEffectLayer, LINK_PREFIX, Node, NodeId, RenderTargetDesc, ReservedName,
    Scene,
};

use super::pass::{DrawPass, PassKind, TextureBinding, TransformSource};
use super::resource::TargetId;
use super::FrameGraph;

/// Color layer targets are cleared to before the layer draws into them.
const TRANSPARENT: [f32; 4] = [0.0; 4];

/// Translates a scene into passes.
///
/// The default target is cleared to the scene clear color, then every
/// node with a mesh is visited depth-first. Nodes drawn through a camera
/// with an effect layer render into the layer's first target, followed by
/// the layer's copy commands and effect passes; all other nodes render
/// into the default target. A final pass presents the default target.
///
/// Undeclared target names are logged once each and degrade to a missing
/// binding or a missing output.
pub fn build_scene_graph(scene: &Scene) -> FrameGraph {
    let mut builder = Builder {
        scene,
        graph: FrameGraph::new(),
        warned: HashSet::new(),
    };
    builder.build();
    builder.graph
}

struct Builder<'a> {
    scene: &'a Scene,
    graph: FrameGraph,
    warned: HashSet<String>,
}

impl Builder<'_> {
    fn build(&mut self) {
        let scene = self.scene;
        for (name, desc) in &scene.render_targets {
            self.graph.declare_target(name.as_str(), *desc);
        }
        let default = self
            .graph
            .declare_target(DEFAULT_TARGET, RenderTargetDesc::screen(1.0));

        let [r, g, b] = scene.clear_color;
        self.graph.add_pass(
            "clear default",
            PassKind::Clear {
                target: default,
                color: [r, g, b, 1.0],
            },
        );

        for id in scene.nodes.depth_first() {
            let Some(node) = scene.nodes.get(id) else {
                continue;
            };
            if node.mesh.is_none() {
                continue;
            }
            let camera = self.camera_name(node);
            let layer = camera
                .as_deref()
                .and_then(|name| scene.cameras.get(name))
                .and_then(|camera| camera.effect_layer.as_ref());

            match layer {
                Some(layer) => self.add_layer(id, node, camera, layer),
                None => self.add_node_draws(
                    &format!("node {}", node.id),
                    node,
                    TransformSource::Node(id),
                    camera,
                    Some(default),
                ),
            }
        }

        self.graph
            .add_pass("present", PassKind::Present { source: default });
    }

    fn add_layer(
        &mut self,
        id: NodeId,
        node: &Node,
        camera: Option<String>,
        layer: &ImageEffectLayer,
    ) {
        let first = self.output(layer.first_target());
        if let Some(first) = first {
            self.graph.add_pass(
                format!("clear {}", layer.first_target()),
                PassKind::Clear {
                    target: first,
                    color: TRANSPARENT,
                },
            );
        }
        self.add_node_draws(
            &format!("layer {}", node.id),
            node,
            TransformSource::Node(id),
            camera,
            first,
        );

        for (e, effect) in layer.effects.iter().enumerate() {
            for command in &effect.commands {
                let source = self.output(&command.source);
                let target = self.output(&command.target);
                if let (Some(source), Some(target)) = (source, target) {
                    self.graph.add_pass(
                        format!("layer {} effect {e} copy", node.id),
                        PassKind::Copy { source, target },
                    );
                }
            }
            for (p, pass) in effect.passes.iter().enumerate() {
                let output = self.output(&pass.output);
                let mut pass_node = pass.node.clone();
                pass_node.mesh = Some(pass.mesh);
                let camera = self.camera_name(&pass_node);
                self.add_node_draws(
                    &format!("layer {} effect {e} pass {p}", node.id),
                    &pass_node,
                    TransformSource::Local(pass.node.transform),
                    camera,
                    output,
                );
            }
        }
    }

    fn add_node_draws(
        &mut self,
        label: &str,
        node: &Node,
        transform: TransformSource,
        camera: Option<String>,
        output: Option<TargetId>,
    ) {
        let Some(mesh_id) = node.mesh else {
            return;
        };
        let scene = self.scene;
        let Some(mesh) = scene.mesh(mesh_id) else {
            log::warn!("{label}: mesh {} does not exist", mesh_id.index());
            return;
        };
        for sub_draw in 0..mesh.sub_draw_count() {
            let Some(material) = mesh.materials.get(sub_draw) else {
                log::warn!("{label}: sub-draw {sub_draw} has no material; skipped");
                continue;
            };
            let draw = DrawPass {
                mesh: mesh_id,
                sub_draw,
                transform,
                camera: camera.clone(),
                textures: self.bindings(material),
                output,
                blend: material.blend,
            };
            let name = if mesh.sub_draw_count() > 1 {
                format!("{label} draw {sub_draw}")
            } else {
                label.to_string()
            };
            self.graph.add_draw(name, draw);
        }
    }

    fn bindings(&mut self, material: &Material) -> Vec<TextureBinding> {
        material
            .textures
            .iter()
            .map(|name| self.binding(name))
            .collect()
    }

    fn binding(&mut self, name: &str) -> TextureBinding {
        if name.is_empty() {
            return TextureBinding::Unbound;
        }
        let resolved = match ReservedName::parse(name) {
            Some(ReservedName::FullFrameBuffer) => Some(DEFAULT_TARGET.to_string()),
            Some(ReservedName::MipMappedFrameBuffer) => return TextureBinding::Unbound,
            Some(ReservedName::LayerComposite(object_id)) => self.link(object_id),
            None => match name.strip_prefix(LINK_PREFIX) {
                Some(digits) => digits.parse().ok().and_then(|id| self.link(id)),
                None => Some(name.to_string()),
            },
        };

        if let Some(id) = resolved.as_deref().and_then(|n| self.graph.target(n)) {
            return TextureBinding::Target(id);
        }
        if resolved.is_some() && !name.starts_with("_rt_") {
            return TextureBinding::Texture(name.to_string());
        }
        self.warn_missing(name);
        TextureBinding::Missing(name.to_string())
    }

    fn link(&self, object_id: i32) -> Option<String> {
        self.scene.layer_links.get(&object_id).cloned()
    }

    fn output(&mut self, name: &str) -> Option<TargetId> {
        let id = self.graph.target(name);
        if id.is_none() {
            self.warn_missing(name);
        }
        id
    }

    fn camera_name(&self, node: &Node) -> Option<String> {
        node.camera
            .as_ref()
            .filter(|name| self.scene.cameras.contains_key(name.as_str()))
            .cloned()
    }

    fn warn_missing(&mut self, name: &str) {
        if self.warned.insert(name.to_string()) {
            log::warn!("Render target '{name}' is not declared; binding skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumenwall_core::mesh::generators::generate_card;
    use lumenwall_core::mesh::MeshId;
    use lumenwall_core::scene::{Camera, EffectPass, ImageEffect, NodeTransform};

    fn card(scene: &mut Scene, material: Material) -> MeshId {
        let mut mesh = generate_card(2.0, 2.0, [1.0, 1.0]);
        mesh.add_material(material);
        scene.add_mesh(mesh)
    }

    fn base_scene() -> Scene {
        let mut scene = Scene::new([100, 100]);
        scene.add_render_target(DEFAULT_TARGET, RenderTargetDesc::screen(1.0));
        scene
            .cameras
            .insert("global".into(), Camera::orthographic(100.0, 100.0, -1.0, 1.0));
        scene.active_camera = "global".into();
        scene
    }

    #[test]
    fn test_plain_node_draws_into_default() {
        let mut scene = base_scene();
        let mesh = card(&mut scene, Material::new("genericimage2").with_textures(vec!["tex".into()]));
        let root = scene.nodes.root();
        scene.nodes.add_child(root, Node::new().with_id(7).with_mesh(mesh));

        let graph = build_scene_graph(&scene);
        let default = graph.target(DEFAULT_TARGET).unwrap();
        let names: Vec<&str> = graph.passes().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["clear default", "node 7", "present"]);

        let draw = graph.passes()[1].as_draw().unwrap();
        assert_eq!(draw.output, Some(default));
        assert_eq!(draw.textures, vec![TextureBinding::Texture("tex".into())]);
        assert_eq!(draw.camera, None);
    }

    #[test]
    fn test_layer_draws_then_effects() {
        let mut scene = base_scene();
        let layer_a = "_rt_imageLayer1";
        let layer_b = "_rt_imageLayer11";
        for name in [layer_a, layer_b] {
            scene.add_render_target(name, RenderTargetDesc::absolute(50, 50).with_reuse(true));
        }
        let image = card(&mut scene, Material::new("genericimage2"));
        let blur = card(
            &mut scene,
            Material::new("blur").with_textures(vec![layer_a.into()]),
        );
        let last = card(
            &mut scene,
            Material::new("tint").with_textures(vec![layer_b.into()]),
        );

        let root = scene.nodes.root();
        let node = scene
            .nodes
            .add_child(root, Node::new().with_id(1).with_mesh(image).with_camera("layer1"));
        let mut camera = Camera::orthographic(50.0, 50.0, -1.0, 1.0);
        camera.effect_layer = Some(ImageEffectLayer {
            node,
            targets: [layer_a.into(), layer_b.into()],
            effects: vec![
                ImageEffect {
                    input: layer_a.into(),
                    output: layer_b.into(),
                    commands: Vec::new(),
                    passes: vec![EffectPass {
                        node: Node::new().with_camera("layer1"),
                        mesh: blur,
                        output: layer_b.into(),
                    }],
                },
                ImageEffect {
                    input: layer_b.into(),
                    output: DEFAULT_TARGET.into(),
                    commands: Vec::new(),
                    passes: vec![EffectPass {
                        node: Node::new().with_transform(
                            NodeTransform::IDENTITY.with_translation([10.0, 0.0, 0.0]),
                        ),
                        mesh: last,
                        output: DEFAULT_TARGET.into(),
                    }],
                },
            ],
        });
        scene.cameras.insert("layer1".into(), camera);

        let graph = build_scene_graph(&scene);
        let names: Vec<&str> = graph.passes().iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![
                "clear default",
                "clear _rt_imageLayer1",
                "layer 1",
                "layer 1 effect 0 pass 0",
                "layer 1 effect 1 pass 0",
                "present",
            ]
        );

        let a = graph.target(layer_a).unwrap();
        let b = graph.target(layer_b).unwrap();
        let image_draw = graph.passes()[2].as_draw().unwrap();
        assert_eq!(image_draw.output, Some(a));
        assert_eq!(image_draw.camera.as_deref(), Some("layer1"));

        let final_draw = graph.passes()[4].as_draw().unwrap();
        assert_eq!(final_draw.textures, vec![TextureBinding::Target(b)]);
        assert_eq!(final_draw.output, graph.target(DEFAULT_TARGET));
        assert_eq!(
            final_draw.transform,
            TransformSource::Local(NodeTransform::IDENTITY.with_translation([10.0, 0.0, 0.0]))
        );
    }

    #[test]
    fn test_reserved_and_missing_names() {
        let mut scene = base_scene();
        scene.add_render_target("_rt_imageLayer3", RenderTargetDesc::absolute(8, 8));
        scene.layer_links.insert(3, "_rt_imageLayer3".into());
        let mesh = card(
            &mut scene,
            Material::new("refract").with_textures(vec![
                "".into(),
                "_rt_link_3".into(),
                "_rt_imageLayerComposite_3_tex".into(),
                "_rt_link_9".into(),
                "_rt_undeclared".into(),
                "_rt_MipMappedFrameBuffer".into(),
            ]),
        );
        let root = scene.nodes.root();
        scene.nodes.add_child(root, Node::new().with_mesh(mesh));

        let graph = build_scene_graph(&scene);
        let layer = graph.target("_rt_imageLayer3").unwrap();
        let draw = graph.passes()[1].as_draw().unwrap();
        assert_eq!(
            draw.textures,
            vec![
                TextureBinding::Unbound,
                TextureBinding::Target(layer),
                TextureBinding::Target(layer),
                TextureBinding::Missing("_rt_link_9".into()),
                TextureBinding::Missing("_rt_undeclared".into()),
                TextureBinding::Unbound,
            ]
        );
    }

    #[test]
    fn test_full_frame_buffer_gets_scratch_copy() {
        let mut scene = base_scene();
        let mesh = card(
            &mut scene,
            Material::new("water").with_textures(vec!["_rt_FullFrameBuffer".into()]),
        );
        let root = scene.nodes.root();
        scene.nodes.add_child(root, Node::new().with_id(4).with_mesh(mesh));

        let graph = build_scene_graph(&scene);
        let names: Vec<&str> = graph.passes().iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec!["clear default", "node 4:scratch", "node 4", "present"]
        );
    }
}
