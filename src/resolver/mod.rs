//! Typed resolution over a composed loader.
//!
//! Everything below the loader contract moves raw bytes and text; this
//! module is where parsing happens. [`AssetResolver`] wraps any
//! [`ResourceLoader`] (typically a memoized multiloader) and walks the model
//! dependency graph: blockstate, variant selection, model parent chain,
//! textures and animation metadata.

pub mod blockstate;
pub mod model;

pub use blockstate::{
    ApplyValue, BlockstateDefinition, ModelVariant, MultipartCase, MultipartCondition,
};
pub use model::{AnimationMeta, Axis, BlockModel, ElementRotation, ModelElement, ModelFace};

use log::debug;

use crate::error::{ResolverError, Result};
use crate::loader::ResourceLoader;
use crate::path::ResourceLocation;

/// Maximum depth for model inheritance to prevent infinite loops.
const MAX_INHERITANCE_DEPTH: usize = 10;

/// Resolves typed assets through a loader.
pub struct AssetResolver<L> {
    loader: L,
}

impl<L: ResourceLoader> AssetResolver<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Hands the loader back; releasing it stays the caller's job.
    pub fn into_loader(self) -> L {
        self.loader
    }

    /// Loads and parses a blockstate definition.
    pub fn blockstate(&self, location: &ResourceLocation) -> Result<BlockstateDefinition> {
        let text = self.loader.load_json(&location.blockstate_path())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Picks the representative variant of a blockstate deterministically:
    /// variant keys are ranked by the location's preference scoring, ties
    /// broken lexicographically, and the first model of the winner is used.
    pub fn default_variant(&self, location: &ResourceLocation) -> Result<ModelVariant> {
        let definition = self.blockstate(location)?;
        let variants = match definition {
            BlockstateDefinition::Variants(variants) => variants,
            BlockstateDefinition::Multipart(_) => {
                return Err(ResolverError::BlockstateResolution(format!(
                    "{} is a multipart blockstate with no default variant",
                    location
                )));
            }
        };

        let mut keys: Vec<&String> = variants.keys().collect();
        keys.sort_by(|a, b| {
            location
                .variant_sort_key(a)
                .cmp(&location.variant_sort_key(b))
                .then_with(|| a.cmp(b))
        });

        let key = keys.first().ok_or_else(|| {
            ResolverError::BlockstateResolution(format!("{} has no variants", location))
        })?;
        debug!("{}: selected variant {:?}", location, key);

        variants[*key].first().cloned().ok_or_else(|| {
            ResolverError::BlockstateResolution(format!(
                "{} variant {:?} lists no models",
                location, key
            ))
        })
    }

    /// Loads and parses a single model, no inheritance applied.
    pub fn model(&self, location: &ResourceLocation) -> Result<BlockModel> {
        let text = self.loader.load_json(&location.model_path())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Loads a model and its ancestors, root first. `builtin/` parents
    /// terminate the chain. A model missing mid-chain is reported as
    /// [`ResolverError::Unresolved`] naming every referencing model, so a
    /// broken reference is distinguishable from a merely-local miss.
    pub fn model_chain(&self, location: &ResourceLocation) -> Result<Vec<BlockModel>> {
        let mut chain = Vec::new();
        let mut visited = vec![location.to_id()];
        let mut current = Some(location.clone());

        while let Some(location) = current {
            if chain.len() >= MAX_INHERITANCE_DEPTH {
                return Err(ResolverError::ModelInheritanceTooDeep(visited.join(" -> ")));
            }

            let model = match self.model(&location) {
                Ok(model) => model,
                Err(ResolverError::NotFound(path)) => {
                    return Err(ResolverError::Unresolved {
                        path,
                        chain: visited,
                    });
                }
                Err(err) => return Err(err),
            };

            current = match &model.parent {
                Some(parent) if !parent.starts_with("builtin/") => {
                    let parent = ResourceLocation::parse(parent)?;
                    visited.push(parent.to_id());
                    Some(parent)
                }
                _ => None,
            };
            chain.push(model);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Fully compiles a model by folding its inheritance chain
    /// child-over-parent.
    pub fn compiled_model(&self, location: &ResourceLocation) -> Result<BlockModel> {
        let mut chain = self.model_chain(location)?.into_iter();
        let mut merged = chain.next().unwrap_or_default();
        for child in chain {
            merged = merge_models(&merged, &child);
        }
        Ok(merged)
    }

    /// Raw texture bytes for a location.
    pub fn texture(&self, location: &ResourceLocation) -> Result<Vec<u8>> {
        self.loader.load_texture(&location.texture_path())
    }

    /// Animation metadata for a texture, if its `.png.mcmeta` sidecar exists.
    pub fn animation_meta(&self, location: &ResourceLocation) -> Result<Option<AnimationMeta>> {
        match self.loader.load_json(&location.animation_meta_path()) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Merges a parent model into a child model; child properties win.
fn merge_models(parent: &BlockModel, child: &BlockModel) -> BlockModel {
    let mut merged = parent.clone();

    for (key, value) in &child.textures {
        merged.textures.insert(key.clone(), value.clone());
    }

    if !child.elements.is_empty() {
        merged.elements = child.elements.clone();
    }

    merged.ambient_occlusion = child.ambient_occlusion;

    // Display contexts merge per key: child contexts override, parent
    // contexts absent from the child survive. item/handheld defines
    // thirdperson views while item/generated defines the fixed view; both
    // must survive the fold.
    match (&merged.display, &child.display) {
        (Some(parent_display), Some(child_display)) => {
            if let (Some(parent_obj), Some(child_obj)) =
                (parent_display.as_object(), child_display.as_object())
            {
                let mut display = parent_obj.clone();
                for (key, value) in child_obj {
                    display.insert(key.clone(), value.clone());
                }
                merged.display = Some(serde_json::Value::Object(display));
            } else {
                merged.display = child.display.clone();
            }
        }
        (None, Some(_)) => merged.display = child.display.clone(),
        _ => {}
    }

    // the chain is folded away
    merged.parent = None;

    merged
}
