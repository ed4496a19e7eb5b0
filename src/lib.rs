//! # Minecraft Asset Resolver
//!
//! A Rust library for resolving Minecraft game assets (block/item models,
//! textures, blockstate JSON) from multiple independent sources composed
//! behind one lookup contract.
//!
//! ## Overview
//!
//! Assets are identified by a [`ResourcePath`]
//! (`namespace:objectType/identifier.suffix`). Each source implements
//! [`ResourceLoader`]: an unpacked resource tree, a pack ZIP or mod jar, a
//! loader running in another process, or the vanilla asset bundle fetched
//! from a minecraft-assets mirror. A [`Multiloader`] composes them in
//! priority order with first-success fallback. A source that merely lacks an
//! asset is fallen through; a source that malfunctions aborts resolution.
//!
//! ## Quick Start
//!
//! ```ignore
//! use minecraft_asset_resolver::{
//!     AssetCache, AssetResolver, DirectoryLoader, MemoLoader, Multiloader,
//!     RemoteAssetSource, ResourceLoader, ResourceLocation,
//! };
//!
//! // Vanilla assets, cached on disk across runs
//! let vanilla = RemoteAssetSource::fetch_all("master", "1.19.1", AssetCache::new(".cache"))?;
//!
//! // Local mod resources take precedence
//! let loader = MemoLoader::new(Multiloader::new(vec![
//!     Box::new(DirectoryLoader::new("my-mod/resources")),
//!     Box::new(vanilla),
//! ]));
//!
//! let resolver = AssetResolver::new(loader);
//! let model = resolver.compiled_model(&ResourceLocation::parse("mymod:akashic_record")?)?;
//!
//! // the composer owns the teardown
//! resolver.into_loader().close()?;
//! ```

pub mod error;
pub mod loader;
pub mod path;
pub mod remote;
pub mod render;
pub mod resolver;

// Re-export main types for convenience
pub use error::{ResolverError, Result};
pub use loader::{
    ArchiveLoader, BridgeLoader, DirectoryLoader, MemoLoader, Multiloader, ResourceLoader,
};
pub use path::{ObjectType, ResourceLocation, ResourcePath};
pub use remote::{AssetCache, RemoteAssetSource};
pub use render::{ModelDumpRenderer, RendererOptions, RenderingEngine};
pub use resolver::{AssetResolver, BlockModel, BlockstateDefinition, ModelVariant};

/// Composes loaders into one, first entry highest priority.
pub fn create_multiloader(loaders: Vec<Box<dyn ResourceLoader>>) -> Multiloader {
    Multiloader::new(loaders)
}
