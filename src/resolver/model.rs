//! Block/item model parsing.
//!
//! Models are JSON documents forming an inheritance graph via `parent`
//! references; a usable model is the fold of its chain, root first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A parsed model from models/*.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockModel {
    /// Parent model to inherit from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Whether to use ambient occlusion.
    #[serde(default = "default_ao", rename = "ambientocclusion")]
    pub ambient_occlusion: bool,

    /// Texture variable definitions. Values are either texture locations or
    /// `#references` to other variables.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub textures: HashMap<String, String>,

    /// Model elements (cuboids).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ModelElement>,

    /// Display transforms by context (gui, ground, fixed, ...). Kept opaque;
    /// their interpretation belongs to the rendering engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<serde_json::Value>,
}

fn default_ao() -> bool {
    true
}

impl BlockModel {
    /// Resolve a texture reference (e.g., "#side") one level against this
    /// model's texture variables. Returns `None` for a dangling reference.
    pub fn resolve_texture<'a>(&'a self, reference: &'a str) -> Option<&'a str> {
        match reference.strip_prefix('#') {
            Some(key) => self.textures.get(key).map(String::as_str),
            None => Some(reference),
        }
    }

    /// Fully resolve a texture reference chain (#side -> #all -> block/stone).
    /// Dangling references are returned as-is.
    pub fn resolve_texture_chain(&self, reference: &str) -> String {
        let mut current = reference;
        // depth cap breaks reference cycles
        for _ in 0..10 {
            match current.strip_prefix('#') {
                Some(key) => match self.textures.get(key) {
                    Some(next) => current = next,
                    None => break,
                },
                None => break,
            }
        }
        current.to_string()
    }
}

/// A cuboid element within a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelElement {
    /// Minimum corner (0-16 range).
    pub from: [f32; 3],
    /// Maximum corner (0-16 range).
    pub to: [f32; 3],
    /// Optional rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<ElementRotation>,
    /// Whether this element receives shade.
    #[serde(default = "default_shade")]
    pub shade: bool,
    /// Face definitions keyed by direction name (down/up/north/south/west/east).
    #[serde(default)]
    pub faces: HashMap<String, ModelFace>,
}

fn default_shade() -> bool {
    true
}

/// Rotation of an element around an axis through an origin point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRotation {
    pub origin: [f32; 3],
    pub axis: Axis,
    pub angle: f32,
    #[serde(default)]
    pub rescale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A face of a model element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFace {
    /// UV coordinates [u1, v1, u2, v2] in 0-16 range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<[f32; 4]>,
    /// Texture reference (e.g., "#side" or "block/stone").
    pub texture: String,
    /// Neighbor direction that culls this face when opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cullface: Option<String>,
    /// UV rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub rotation: i32,
    /// Tint index for biome coloring (-1 = no tint).
    #[serde(default = "default_tint_index")]
    pub tintindex: i32,
}

fn default_tint_index() -> i32 {
    -1
}

/// Animation metadata from a texture's `.png.mcmeta` sidecar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationMeta {
    #[serde(default)]
    pub animation: AnimationSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSpec {
    #[serde(default = "default_frametime")]
    pub frametime: u32,
    #[serde(default)]
    pub interpolate: bool,
    /// Explicit frame order; indexes into the vertical frame strip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

fn default_frametime() -> u32 {
    1
}

// A missing "animation" object must carry the same defaults as an empty one.
impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            frametime: default_frametime(),
            interpolate: false,
            frames: None,
            width: None,
            height: None,
        }
    }
}
