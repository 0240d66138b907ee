//! Image objects and their effect chains.

use std::collections::{BTreeMap, HashMap};

use lumenwall_core::material::{BlendMode, Material, ShaderValues};
use lumenwall_core::math::Mat4;
use lumenwall_core::mesh::generators::generate_card;
use lumenwall_core::mesh::{Mesh, MeshId};
use lumenwall_core::scene::{
    Camera, CopyCommand, DEFAULT_TARGET, EffectPass, ImageEffect, ImageEffectLayer, Node,
    NodeTransform, RenderTargetDesc,
};

use super::alignment::apply_alignment;
use super::{Builder, EFFECT_CAMERA};
use crate::description::{EffectDesc, ImageObject, MaterialDesc};
use crate::error::CompileError;

/// Helper material inserted for objects with a color blend mode.
pub const PASSTHROUGH_MATERIAL: &str = "materials/util/effectpassthrough.json";

/// Effect buffer name that refers to the stage input.
const PREVIOUS_FBO: &str = "previous";
const COPY_COMMAND: &str = "copy";

/// What every stage of one image layer shares.
struct Layer {
    name: String,
    targets: [String; 2],
    size: [f32; 2],
    fullscreen: bool,
    /// Object placement, applied by the final pass.
    transform: NodeTransform,
    /// The object's own blend mode, restored by the final pass.
    blend: BlendMode,
    /// Per-object constants.
    base: ShaderValues,
}

impl Layer {
    fn fbo_desc(&self, scale: f32) -> RenderTargetDesc {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        if self.fullscreen {
            RenderTargetDesc::screen(1.0 / scale).with_reuse(true)
        } else {
            RenderTargetDesc::absolute(
                ((self.size[0] / scale) as u32).max(1),
                ((self.size[1] / scale) as u32).max(1),
            )
            .with_reuse(true)
        }
    }
}

impl Builder<'_> {
    pub(super) fn add_image(&mut self, object: &ImageObject) -> Result<(), CompileError> {
        if !object.visible {
            return Ok(());
        }

        let mut effects: Vec<&EffectDesc> = Vec::new();
        let passthrough;
        if object.color_blend_mode != 0 {
            passthrough = self.passthrough_effect(object.color_blend_mode)?;
            effects.push(&passthrough);
        }
        effects.extend(object.effects.iter().filter(|e| e.visible));

        let compose = object.is_compose();
        let elision = self.options.elision;
        if effects.is_empty()
            && ((object.fullscreen && elision.skip_plain_fullscreen)
                || (compose && elision.skip_plain_compose))
        {
            log::debug!("Image {} has no effects; elided", object.id);
            return Ok(());
        }

        let size = object.size.0;
        let mut origin = object.origin.0;
        origin[1] = self.scene.ortho[1] as f32 - origin[1];
        apply_alignment(&mut origin, &object.alignment, size);
        let transform = NodeTransform::IDENTITY
            .with_translation(origin)
            .with_angles(object.angles.0)
            .with_scale(object.scale.0);

        let mut base = ShaderValues::new();
        base.insert("g_Alpha".into(), object.alpha.into());
        base.insert("g_Color".into(), object.color.0.into());
        base.insert("g_UserAlpha".into(), object.alpha.into());
        base.insert("g_Brightness".into(), object.brightness.into());

        let mut material = self.load_material(&object.material, &base, BTreeMap::new())?;
        let map_rate = match material.constants.get("g_Texture0Resolution") {
            Some(r) if !object.nopadding && r.len() == 4 && r.0[0] > 0.0 && r.0[1] > 0.0 => {
                [r.0[2] / r.0[0], r.0[3] / r.0[1]]
            }
            _ => [1.0, 1.0],
        };
        let image_blend = material.blend;
        if !effects.is_empty() {
            material.blend = BlendMode::Normal;
        }
        let mut mesh = generate_card(size[0], size[1], map_rate);
        mesh.add_material(material);
        let mesh = self.scene.add_mesh(mesh);

        let root = self.scene.nodes.root();
        let node = Node::new().with_id(object.id).with_mesh(mesh);
        if effects.is_empty() {
            self.scene
                .nodes
                .add_child(root, node.with_transform(transform));
            return Ok(());
        }

        let layer = self.declare_layer(object, transform, image_blend, base);
        let mut stages = Vec::with_capacity(effects.len());
        for (index, effect) in effects.iter().enumerate() {
            let last = index + 1 == effects.len();
            stages.push(self.build_effect(&layer, index, last, effect)?);
        }

        // The effect chain places the object; the image itself fills the layer.
        let node_transform = if compose {
            transform
        } else {
            NodeTransform::IDENTITY
        };
        let node = self.scene.nodes.add_child(
            root,
            node.with_transform(node_transform)
                .with_camera(layer.name.as_str()),
        );

        let mut camera = if compose {
            self.scene.active_camera().cloned().unwrap_or_else(|| {
                Camera::orthographic(size[0], size[1], -1.0, 1.0).with_node(self.effect_node)
            })
        } else {
            Camera::orthographic(size[0], size[1], -1.0, 1.0).with_node(self.effect_node)
        };
        self.scene
            .layer_links
            .insert(object.id, layer.targets[0].clone());
        camera.effect_layer = Some(ImageEffectLayer {
            node,
            targets: layer.targets,
            effects: stages,
        });
        self.scene.cameras.insert(layer.name, camera);
        Ok(())
    }

    /// The passthrough stage realizing a color blend mode.
    fn passthrough_effect(&self, mode: i32) -> Result<EffectDesc, CompileError> {
        let text = self
            .assets
            .read_text(PASSTHROUGH_MATERIAL)
            .map_err(|e| CompileError::missing(PASSTHROUGH_MATERIAL, e))?;
        let mut material: MaterialDesc =
            serde_json::from_str(&text).map_err(|e| CompileError::InvalidAsset {
                path: PASSTHROUGH_MATERIAL.into(),
                reason: e.to_string(),
            })?;
        material.combos.insert("BONECOUNT".into(), 1);
        material.combos.insert("BLENDMODE".into(), mode);
        material.blending = "disabled".into();
        Ok(EffectDesc {
            name: "passthrough".into(),
            materials: vec![material],
            ..EffectDesc::default()
        })
    }

    /// Picks a unique layer name and declares its ping-pong targets.
    fn declare_layer(
        &mut self,
        object: &ImageObject,
        transform: NodeTransform,
        blend: BlendMode,
        base: ShaderValues,
    ) -> Layer {
        let stem = format!("imageLayer{}", object.id);
        let mut name = stem.clone();
        let mut suffix = 1;
        while self.scene.cameras.contains_key(&name)
            || self.scene.render_targets.contains_key(&format!("_rt_{name}"))
        {
            name = format!("{stem}_{suffix}");
            suffix += 1;
        }

        let size = object.size.0;
        let desc = if object.fullscreen {
            RenderTargetDesc::screen(1.0).with_reuse(true)
        } else {
            RenderTargetDesc::absolute(size[0].max(1.0) as u32, size[1].max(1.0) as u32)
                .with_reuse(true)
        };
        let targets = [format!("_rt_{name}"), format!("_rt_{name}1")];
        for target in &targets {
            self.scene.add_render_target(target.as_str(), desc);
        }
        Layer {
            name,
            targets,
            size,
            fullscreen: object.fullscreen,
            transform,
            blend,
            base,
        }
    }

    /// Builds stage `index` of a layer's chain.
    fn build_effect(
        &mut self,
        layer: &Layer,
        index: usize,
        last: bool,
        effect: &EffectDesc,
    ) -> Result<ImageEffect, CompileError> {
        let input = layer.targets[index % 2].clone();
        let output = if last {
            DEFAULT_TARGET.to_string()
        } else {
            layer.targets[(index + 1) % 2].clone()
        };

        let mut fbos = HashMap::from([(PREVIOUS_FBO.to_string(), input.clone())]);
        for fbo in &effect.fbos {
            let name = format!("{}_{}", fbo.name, layer.name);
            self.scene.add_render_target(name.as_str(), layer.fbo_desc(fbo.scale));
            fbos.insert(fbo.name.clone(), name);
        }

        let mut commands = Vec::new();
        for command in &effect.commands {
            if command.command != COPY_COMMAND {
                log::warn!(
                    "Effect {}: unknown command '{}' dropped",
                    effect.name,
                    command.command
                );
                continue;
            }
            match (fbos.get(&command.source), fbos.get(&command.target)) {
                (Some(source), Some(target)) => commands.push(CopyCommand {
                    source: source.clone(),
                    target: target.clone(),
                }),
                _ => log::warn!(
                    "Effect {}: copy {} -> {} names an unknown buffer; dropped",
                    effect.name,
                    command.source,
                    command.target
                ),
            }
        }

        let mut base = layer.base.clone();
        base.insert(
            "g_EffectTextureProjectionMatrix".into(),
            Mat4::identity().into(),
        );
        base.insert(
            "g_EffectTextureProjectionMatrixInverse".into(),
            Mat4::identity().into(),
        );

        let mut passes = Vec::with_capacity(effect.materials.len());
        for (m, material_desc) in effect.materials.iter().enumerate() {
            let mut desc = material_desc.clone();
            let mut pass_output = output.clone();
            if let Some(pass) = effect.passes.get(m) {
                desc.merge_pass(pass);
                for bind in &pass.bind {
                    let Some(target) = fbos.get(&bind.name) else {
                        log::warn!("Effect {}: bind of unknown buffer '{}'", effect.name, bind.name);
                        continue;
                    };
                    if desc.textures.len() <= bind.index {
                        desc.textures.resize(bind.index + 1, None);
                    }
                    desc.textures[bind.index] = Some(target.clone());
                }
                if !pass.target.is_empty() {
                    match fbos.get(&pass.target) {
                        Some(target) => pass_output = target.clone(),
                        None => log::warn!(
                            "Effect {}: pass target '{}' is not a buffer",
                            effect.name,
                            pass.target
                        ),
                    }
                }
            }
            if desc.textures.is_empty() {
                desc.textures.push(None);
            }
            if desc.textures[0].as_deref().is_none_or(str::is_empty) {
                desc.textures[0] = Some(input.clone());
            }

            let mut material = self.load_material(&desc, &base, BTreeMap::new())?;
            let final_pass = last && m + 1 == effect.materials.len();
            let (card, node) = if final_pass && !layer.fullscreen {
                material.blend = layer.blend;
                (
                    generate_card(layer.size[0], layer.size[1], [1.0, 1.0]),
                    Node::new().with_transform(layer.transform),
                )
            } else {
                material.blend = if final_pass {
                    layer.blend
                } else {
                    BlendMode::Normal
                };
                (
                    generate_card(2.0, 2.0, [1.0, 1.0]),
                    Node::new().with_camera(EFFECT_CAMERA),
                )
            };
            let mesh = self.add_card(card, material);
            passes.push(EffectPass {
                node,
                mesh,
                output: pass_output,
            });
        }

        Ok(ImageEffect {
            input,
            output,
            commands,
            passes,
        })
    }

    fn add_card(&mut self, mut card: Mesh, material: Material) -> MeshId {
        card.add_material(material);
        self.scene.add_mesh(card)
    }
}
