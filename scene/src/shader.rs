//! Shader template specialization.
//!
//! Materials name a base shader; its raw templates live at
//! `shaders/<name>.vert` and `shaders/<name>.frag`. Before a template can be
//! handed to the GPU it goes through two steps:
//!
//! 1. [`ShaderPreprocessor::preprocess`] resolves `#include` directives and
//!    reads the annotations that describe the material-facing interface
//!    (constant aliases, default textures, combo flags) into a [`ShaderInfo`].
//! 2. [`ShaderPreprocessor::finalize`] lowers the final combo map into
//!    `#define` lines once the material has contributed its own combos.
//!
//! # Annotation syntax
//!
//! ```glsl
//! // [COMBO] {"combo":"BLENDMODE","default":0}
//! uniform float g_Brightness; // {"material":"brightness","default":1}
//! uniform sampler2D g_Texture1; // {"default":"util/noise","combo":"NOISE"}
//! uniform sampler2D g_Texture2; // {"components":[{"combo":"MASK_G"},{"combo":"MASK_B"}]}
//! ```

use std::collections::{BTreeMap, HashSet};

use lumenwall_core::material::ShaderValues;
use serde_json::Value;

use crate::assets::AssetStore;
use crate::description::FloatList;
use crate::error::CompileError;

/// Directory shader templates and includes are read from.
pub const SHADER_DIR: &str = "shaders";

const COMBO_MARKER: &str = "[COMBO]";
const SAMPLER_PREFIX: &str = "g_Texture";

/// Pipeline stage a template is specialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Template file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Vertex => "vert",
            Self::Fragment => "frag",
        }
    }

    fn define(self) -> &'static str {
        match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
        }
    }
}

/// Channel availability of the texture bound to one sampler slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureSlotInfo {
    /// A texture is bound to the slot.
    pub enabled: bool,
    /// Availability of the second to fourth components, when known.
    pub components: Option<[bool; 3]>,
}

impl TextureSlotInfo {
    /// A slot with a texture of known channel layout.
    pub fn with_components(components: [bool; 3]) -> Self {
        Self {
            enabled: true,
            components: Some(components),
        }
    }

    /// A slot bound to something whose channels are not described, such as a
    /// render target.
    pub fn bound() -> Self {
        Self {
            enabled: true,
            components: None,
        }
    }
}

/// What preprocessing learned about a shader's material interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderInfo {
    /// Material-facing constant name to uniform name.
    pub aliases: BTreeMap<String, String>,
    /// Texture a slot falls back to when the material leaves it empty.
    pub default_textures: BTreeMap<usize, String>,
    /// Combo flags and their values.
    pub combos: BTreeMap<String, i32>,
    /// Uniform defaults declared by annotations.
    pub defaults: ShaderValues,
}

/// Turns raw shader templates into specialized sources.
pub trait ShaderPreprocessor: Send + Sync {
    /// Resolves includes and collects annotations from `source` into `info`.
    ///
    /// Combos already present in `info` are kept; annotation defaults only
    /// fill combos nobody set.
    fn preprocess(
        &self,
        source: &str,
        slots: &[TextureSlotInfo],
        assets: &dyn AssetStore,
        info: &mut ShaderInfo,
    ) -> Result<String, CompileError>;

    /// Prepends the stage define and one `#define` per combo.
    fn finalize(&self, source: &str, combos: &BTreeMap<String, i32>, stage: ShaderStage)
    -> String;
}

/// The stock preprocessor for annotated GLSL templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationPreprocessor;

impl AnnotationPreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `#include "path"` directives recursively.
    fn resolve_includes(
        &self,
        source: &str,
        assets: &dyn AssetStore,
        included: &mut HashSet<String>,
    ) -> Result<String, CompileError> {
        let mut result = String::with_capacity(source.len());

        for line in source.lines() {
            let Some(path) = parse_include_directive(line.trim()) else {
                result.push_str(line);
                result.push('\n');
                continue;
            };
            if !included.insert(path.to_string()) {
                continue;
            }
            let full = format!("{SHADER_DIR}/{path}");
            let text = assets
                .read_text(&full)
                .map_err(|e| CompileError::missing(full.as_str(), e))?;
            let resolved = self.resolve_includes(&text, assets, included)?;
            result.push_str(&resolved);
            result.push('\n');
        }

        Ok(result)
    }
}

impl ShaderPreprocessor for AnnotationPreprocessor {
    fn preprocess(
        &self,
        source: &str,
        slots: &[TextureSlotInfo],
        assets: &dyn AssetStore,
        info: &mut ShaderInfo,
    ) -> Result<String, CompileError> {
        let mut included = HashSet::new();
        let resolved = self.resolve_includes(source, assets, &mut included)?;

        for line in resolved.lines() {
            let line = line.trim();
            if let Some(rest) = line
                .strip_prefix("//")
                .map(str::trim_start)
                .and_then(|rest| rest.strip_prefix(COMBO_MARKER))
            {
                read_combo(rest, info);
            } else if line.starts_with("uniform ") {
                read_uniform(line, slots, info);
            }
        }

        Ok(resolved)
    }

    fn finalize(
        &self,
        source: &str,
        combos: &BTreeMap<String, i32>,
        stage: ShaderStage,
    ) -> String {
        let mut header = String::new();
        // `#version` has to stay the first line.
        let body = match source.split_once('\n') {
            Some((first, rest)) if first.trim_start().starts_with("#version") => {
                header.push_str(first);
                header.push('\n');
                rest
            }
            _ => source,
        };
        header.push_str(&format!("#define {}\n", stage.define()));
        for (name, value) in combos {
            header.push_str(&format!("#define {name} {value}\n"));
        }
        header + body
    }
}

/// Parse a `#include "path"` directive, returning the path if found.
fn parse_include_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("#include")?.trim();
    if let Some(inner) = rest.strip_prefix('"') {
        inner.strip_suffix('"')
    } else if let Some(inner) = rest.strip_prefix('<') {
        inner.strip_suffix('>')
    } else {
        None
    }
}

fn parse_annotation(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Ignoring malformed shader annotation {text}: {e}");
            None
        }
    }
}

fn read_combo(annotation: &str, info: &mut ShaderInfo) {
    let Some(value) = parse_annotation(annotation) else {
        return;
    };
    let Some(name) = value.get("combo").and_then(Value::as_str) else {
        return;
    };
    let default = value.get("default").and_then(Value::as_i64).unwrap_or(0) as i32;
    info.combos.entry(name.to_string()).or_insert(default);
}

/// Reads `uniform <type> <name>; // {annotation}`.
fn read_uniform(line: &str, slots: &[TextureSlotInfo], info: &mut ShaderInfo) {
    let Some((declaration, annotation)) = line.split_once("//") else {
        return;
    };
    let mut words = declaration.split_whitespace().skip(1);
    let (Some(ty), Some(name)) = (words.next(), words.next()) else {
        return;
    };
    let name = name.trim_end_matches(';');
    let name = name.split('[').next().unwrap_or(name);
    let Some(value) = parse_annotation(annotation) else {
        return;
    };

    if let Some(material) = value.get("material").and_then(Value::as_str) {
        info.aliases.insert(material.to_string(), name.to_string());
    }

    if ty.starts_with("sampler") {
        let Some(slot) = name
            .strip_prefix(SAMPLER_PREFIX)
            .and_then(|digits| digits.parse::<usize>().ok())
        else {
            return;
        };
        read_sampler(slot, &value, slots.get(slot).copied().unwrap_or_default(), info);
        return;
    }

    if let Some(default) = value.get("default") {
        match serde_json::from_value::<FloatList>(default.clone()) {
            Ok(list) => {
                info.defaults.insert(name.to_string(), list.0.into());
            }
            Err(e) => log::warn!("Uniform {name}: unusable default {default}: {e}"),
        }
    }
}

fn read_sampler(slot: usize, value: &Value, bound: TextureSlotInfo, info: &mut ShaderInfo) {
    if let Some(default) = value.get("default").and_then(Value::as_str) {
        info.default_textures.insert(slot, default.to_string());
    }
    if !bound.enabled {
        return;
    }
    if let Some(combo) = value.get("combo").and_then(Value::as_str) {
        info.combos.insert(combo.to_string(), 1);
    }
    let (Some(available), Some(components)) = (
        bound.components,
        value.get("components").and_then(Value::as_array),
    ) else {
        return;
    };
    for (present, component) in available.iter().zip(components) {
        if let (true, Some(combo)) = (*present, component.get("combo").and_then(Value::as_str)) {
            info.combos.insert(combo.to_string(), 1);
        }
    }
}
