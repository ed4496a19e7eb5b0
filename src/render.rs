//! Rendering engine boundary.
//!
//! Rasterization is an external collaborator: this crate resolves assets, an
//! engine turns them into pixels. The contract here is deliberately narrow.
//! An engine is constructed with a composed [`ResourceLoader`] and an output
//! configuration, renders one target at a time, and releases only its own
//! resources. The loader's lifetime stays with the caller that composed it.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::{ResolverError, Result};
use crate::loader::ResourceLoader;
use crate::path::ResourceLocation;
use crate::resolver::AssetResolver;

/// Output configuration handed to an engine at construction.
#[derive(Debug, Clone)]
pub struct RendererOptions {
    /// Directory rendered files are written into.
    pub out_dir: PathBuf,
}

impl RendererOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

/// A rendering engine consuming a composed loader.
pub trait RenderingEngine {
    /// Renders the asset identified by namespace (and optional identifier;
    /// engines may default it to a namespace-level index) and returns the
    /// path of the written file. An asset the composed loader cannot resolve
    /// anywhere surfaces as a render failure naming the unresolved path.
    fn render_to_file(&mut self, namespace: &str, identifier: Option<&str>) -> Result<PathBuf>;

    /// Releases engine-owned resources. Does not release the loader; that is
    /// the caller's responsibility.
    fn destroy_renderer(&mut self);
}

/// Diagnostic engine that "renders" a target by writing its fully compiled
/// model JSON instead of pixels. Useful for inspecting what a real engine
/// would be fed, and for exercising the boundary without a rasterizer.
pub struct ModelDumpRenderer<L> {
    resolver: AssetResolver<L>,
    options: RendererOptions,
    destroyed: bool,
}

impl<L: ResourceLoader> ModelDumpRenderer<L> {
    pub fn new(loader: L, options: RendererOptions) -> Self {
        Self {
            resolver: AssetResolver::new(loader),
            options,
            destroyed: false,
        }
    }

    /// Hands the loader back so the caller can release it.
    pub fn into_loader(self) -> L {
        self.resolver.into_loader()
    }

    fn output_path(&self, location: &ResourceLocation) -> PathBuf {
        let file = format!("{}.json", location.path.replace('/', "_"));
        self.options.out_dir.join(&location.namespace).join(file)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                ResolverError::Bridge(format!(
                    "failed to create output directory {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }
        std::fs::write(path, content).map_err(|err| {
            ResolverError::Bridge(format!("failed to write {}: {}", path.display(), err))
        })
    }
}

impl<L: ResourceLoader> RenderingEngine for ModelDumpRenderer<L> {
    fn render_to_file(&mut self, namespace: &str, identifier: Option<&str>) -> Result<PathBuf> {
        if self.destroyed {
            return Err(ResolverError::bridge("renderer is already destroyed"));
        }

        // default identifier: the namespace-level index model
        let location = ResourceLocation::new(namespace, identifier.unwrap_or("index"))?;

        // Prefer the blockstate's representative variant; fall back to the
        // location naming a model directly (items have no blockstate).
        let model_location = match self.resolver.default_variant(&location) {
            Ok(variant) => ResourceLocation::parse(&variant.model_location())?,
            Err(err) if err.is_not_found() => location.clone(),
            Err(err) => return Err(err),
        };

        let model = self.resolver.compiled_model(&model_location)?;
        let output = self.output_path(&location);
        self.write(&output, &serde_json::to_string_pretty(&model)?)?;
        info!("rendered {} to {}", location, output.display());
        Ok(output)
    }

    fn destroy_renderer(&mut self) {
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::path::ResourcePath;
    use std::collections::HashMap;

    struct StaticLoader {
        json: HashMap<String, String>,
    }

    impl ResourceLoader for StaticLoader {
        fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
            Err(ResolverError::NotFound(path.clone()))
        }

        fn load_json(&self, path: &ResourcePath) -> Result<String> {
            self.json
                .get(&path.canonical())
                .cloned()
                .ok_or_else(|| ResolverError::NotFound(path.clone()))
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn loader() -> StaticLoader {
        let entries = [
            (
                "minecraft:blockstates/stone.json",
                r#"{ "variants": { "": { "model": "block/stone" } } }"#,
            ),
            (
                "minecraft:models/block/stone.json",
                r#"{ "textures": { "all": "block/stone" } }"#,
            ),
        ];
        StaticLoader {
            json: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_render_writes_compiled_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer =
            ModelDumpRenderer::new(loader(), RendererOptions::new(dir.path()));

        let output = renderer.render_to_file("minecraft", Some("stone")).unwrap();
        assert!(output.ends_with("minecraft/stone.json"));

        let written = std::fs::read_to_string(output).unwrap();
        assert!(written.contains("block/stone"));
    }

    #[test]
    fn test_render_failure_names_unresolved_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer =
            ModelDumpRenderer::new(loader(), RendererOptions::new(dir.path()));

        match renderer.render_to_file("minecraft", Some("missing")) {
            Err(ResolverError::Unresolved { path, .. }) => {
                assert_eq!(path.canonical(), "minecraft:models/missing.json");
            }
            other => panic!("expected Unresolved, got {:?}", other),
        }
    }

    #[test]
    fn test_destroyed_renderer_refuses_work() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer =
            ModelDumpRenderer::new(loader(), RendererOptions::new(dir.path()));

        renderer.destroy_renderer();
        renderer.destroy_renderer(); // idempotent
        assert!(renderer.render_to_file("minecraft", Some("stone")).is_err());
    }
}
