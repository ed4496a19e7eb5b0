//! Versioned access to the vanilla asset bundle.
//!
//! [`RemoteAssetSource`] serves `minecraft`-namespace assets without
//! requiring the caller to ship the game: it pulls from a minecraft-assets
//! mirror, pinned to a (branch/tag, game version) pair, and persists
//! everything it fetches in an injected [`AssetCache`] so repeat runs stay
//! off the network entirely.

pub mod cache;

pub use cache::AssetCache;

use std::collections::HashMap;
use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{debug, info};
use serde::Deserialize;

use crate::error::{ResolverError, Result};
use crate::loader::ResourceLoader;
use crate::path::{ObjectType, ResourcePath};

/// Default minecraft-assets mirror.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/PrismarineJS/minecraft-assets";

const MODELS_INDEX: &str = "blocks_models.json";
const STATES_INDEX: &str = "blocks_states.json";
const TEXTURES_INDEX: &str = "texture_content.json";

/// One entry of `texture_content.json`: a texture name and its content as a
/// PNG data URI. Entries without content are skipped.
#[derive(Deserialize)]
struct TextureContent {
    name: String,
    #[serde(default)]
    texture: Option<String>,
}

enum FetchError {
    /// HTTP 404: the asset does not exist under this version pair.
    Missing,
    /// Anything else: timeout, DNS failure, unexpected status, bad body.
    Fault(String),
}

/// Cached, versioned accessor for the official game's asset bundle.
///
/// Construction via [`fetch_all`](RemoteAssetSource::fetch_all) downloads the
/// bundle's three index files (block models, blockstates, texture contents)
/// once; everything after that is answered from memory, except block textures
/// which are fetched lazily from the raw URL and persisted per canonical path
/// key. Construction is idempotent per (version, game_version): with a warm
/// cache it performs no network I/O at all.
pub struct RemoteAssetSource {
    version: String,
    game_version: String,
    base_url: String,
    cache: AssetCache,
    models: HashMap<String, serde_json::Value>,
    states: HashMap<String, serde_json::Value>,
    textures: HashMap<String, String>,
}

impl RemoteAssetSource {
    /// Fetches (or revalidates from cache) the asset bundle indexes for a
    /// (branch/tag, game version) pair.
    pub fn fetch_all(version: &str, game_version: &str, cache: AssetCache) -> Result<Self> {
        Self::fetch_all_from(DEFAULT_BASE_URL, version, game_version, cache)
    }

    /// Like [`fetch_all`](Self::fetch_all) against a different mirror.
    pub fn fetch_all_from(
        base_url: &str,
        version: &str,
        game_version: &str,
        cache: AssetCache,
    ) -> Result<Self> {
        let mut source = Self {
            version: version.to_string(),
            game_version: game_version.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            models: HashMap::new(),
            states: HashMap::new(),
            textures: HashMap::new(),
        };

        source.models = parse_index(MODELS_INDEX, &source.fetch_index(MODELS_INDEX)?)?;
        source.states = parse_index(STATES_INDEX, &source.fetch_index(STATES_INDEX)?)?;

        let entries: Vec<TextureContent> =
            serde_json::from_slice(&source.fetch_index(TEXTURES_INDEX)?).map_err(|err| {
                ResolverError::Bridge(format!("malformed index {}: {}", TEXTURES_INDEX, err))
            })?;
        source.textures = entries
            .into_iter()
            .filter_map(|entry| entry.texture.map(|texture| (entry.name, texture)))
            .collect();

        info!(
            "vanilla assets ready for {}/{}: {} models, {} blockstates, {} textures",
            source.version,
            source.game_version,
            source.models.len(),
            source.states.len(),
            source.textures.len(),
        );
        Ok(source)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn game_version(&self) -> &str {
        &self.game_version
    }

    /// Constructs a browsable URL for a raw asset key like
    /// `minecraft/block/stone.png`. Pure; performs no network I/O. Only the
    /// `minecraft` namespace is supported.
    pub fn build_url(&self, asset_key: &str) -> Result<String> {
        let rest = asset_key.strip_prefix("minecraft/").ok_or_else(|| {
            ResolverError::MalformedPath(format!(
                "unsupported namespace in asset key: {:?}",
                asset_key
            ))
        })?;

        // The bundle stores block/item textures under pluralized directories.
        let mapped = if let Some(name) = rest.strip_prefix("block/") {
            format!("blocks/{}", name)
        } else if let Some(name) = rest.strip_prefix("item/") {
            format!("items/{}", name)
        } else {
            rest.to_string()
        };

        Ok(self.raw_url(&mapped))
    }

    fn raw_url(&self, path: &str) -> String {
        format!(
            "{}/{}/data/{}/{}",
            self.base_url, self.version, self.game_version, path
        )
    }

    /// Cache-first fetch of one of the bundle's index files. Any fetch
    /// failure, 404 included, is a `Bridge` error: an index missing from the
    /// mirror means the version pair is wrong or the mirror is broken, not
    /// that some asset is absent.
    fn fetch_index(&self, file: &str) -> Result<Vec<u8>> {
        let key = format!("index/{}", file);
        if let Some(bytes) = self.cache.load(&self.version, &self.game_version, &key)? {
            debug!("index {} served from cache", file);
            return Ok(bytes);
        }

        let url = self.raw_url(file);
        let bytes = http_get(&url).map_err(|err| match err {
            FetchError::Missing => ResolverError::Bridge(format!(
                "index {} not found under {}/{}; wrong version pair?",
                file, self.version, self.game_version
            )),
            FetchError::Fault(message) => ResolverError::Bridge(message),
        })?;
        self.cache
            .store(&self.version, &self.game_version, &key, &bytes)?;
        Ok(bytes)
    }

    /// Strips the `block/`/`item/` directory prefix the indexes do not carry.
    fn index_name(identifier: &str) -> &str {
        identifier
            .strip_prefix("block/")
            .or_else(|| identifier.strip_prefix("item/"))
            .unwrap_or(identifier)
    }

    fn fetch_block_texture(&self, candidate: &ResourcePath, name: &str) -> Result<Option<Vec<u8>>> {
        let key = candidate.canonical();
        if let Some(bytes) = self.cache.load(&self.version, &self.game_version, &key)? {
            return Ok(Some(bytes));
        }

        match http_get(&self.raw_url(&format!("blocks/{}.png", name))) {
            Ok(bytes) => {
                self.cache
                    .store(&self.version, &self.game_version, &key, &bytes)?;
                Ok(Some(bytes))
            }
            Err(FetchError::Missing) => Ok(None),
            Err(FetchError::Fault(message)) => Err(ResolverError::Bridge(message)),
        }
    }
}

impl ResourceLoader for RemoteAssetSource {
    fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        // The bundle carries PNG content only; a .png.mcmeta request must not
        // come back with the texture's bytes.
        if path.namespace != "minecraft"
            || path.object_type != ObjectType::Textures
            || path.suffix != "png"
        {
            return Err(ResolverError::NotFound(path.clone()));
        }

        for candidate in path.candidates() {
            if candidate.identifier.starts_with("block/") {
                let name = Self::index_name(&candidate.identifier);
                if let Some(bytes) = self.fetch_block_texture(&candidate, name)? {
                    return Ok(bytes);
                }
            } else if let Some(data_uri) = self.textures.get(Self::index_name(&candidate.identifier))
            {
                return decode_data_uri(data_uri);
            }
        }

        Err(ResolverError::NotFound(path.clone()))
    }

    fn load_json(&self, path: &ResourcePath) -> Result<String> {
        if path.namespace != "minecraft" {
            return Err(ResolverError::NotFound(path.clone()));
        }

        let index = match path.object_type {
            ObjectType::Models => &self.models,
            ObjectType::Blockstates => &self.states,
            // The bundle carries no .mcmeta or other texture-side JSON.
            ObjectType::Textures => return Err(ResolverError::NotFound(path.clone())),
        };

        for candidate in path.candidates() {
            if let Some(value) = index.get(Self::index_name(&candidate.identifier)) {
                return serde_json::to_string(value).map_err(|err| {
                    ResolverError::Bridge(format!("failed to re-serialize {}: {}", candidate, err))
                });
            }
        }

        Err(ResolverError::NotFound(path.clone()))
    }

    fn close(&mut self) -> Result<()> {
        // Everything fetched is already persisted in the cache.
        Ok(())
    }
}

fn parse_index(file: &str, bytes: &[u8]) -> Result<HashMap<String, serde_json::Value>> {
    serde_json::from_slice(bytes)
        .map_err(|err| ResolverError::Bridge(format!("malformed index {}: {}", file, err)))
}

fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>> {
    let encoded = data_uri
        .strip_prefix("data:image/png;base64,")
        .ok_or_else(|| {
            ResolverError::bridge("texture index entry is not a PNG data URI")
        })?;
    BASE64
        .decode(encoded)
        .map_err(|err| ResolverError::Bridge(format!("invalid base64 in texture index: {}", err)))
}

fn http_get(url: &str) -> std::result::Result<Vec<u8>, FetchError> {
    match ureq::get(url).call() {
        Ok(response) => {
            let mut bytes = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut bytes)
                .map_err(|err| FetchError::Fault(format!("failed to read {}: {}", url, err)))?;
            Ok(bytes)
        }
        Err(ureq::Error::Status(404, _)) => Err(FetchError::Missing),
        Err(ureq::Error::Status(code, _)) => {
            Err(FetchError::Fault(format!("{} returned status {}", url, code)))
        }
        Err(ureq::Error::Transport(transport)) => Err(FetchError::Fault(format!(
            "transport error fetching {}: {}",
            url, transport
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Base URL that never resolves: every test below must stay off the
    /// network, proving the cache short-circuits fetching.
    const UNREACHABLE: &str = "http://127.0.0.1:1/unreachable";

    pub(crate) fn seed_cache(dir: &std::path::Path) -> AssetCache {
        let cache = AssetCache::new(dir);
        let models = serde_json::json!({
            "stone": { "parent": "block/cube_all", "textures": { "all": "block/stone" } },
            "stick": { "parent": "item/handheld", "textures": { "layer0": "item/stick" } },
        });
        let states = serde_json::json!({
            "stone": { "variants": { "": { "model": "block/stone" } } },
        });
        let textures = serde_json::json!([
            { "name": "stick", "texture": format!("data:image/png;base64,{}", BASE64.encode(b"stick-pixels")) },
            { "name": "broken", "texture": null },
        ]);

        for (file, value) in [
            (MODELS_INDEX, &models),
            (STATES_INDEX, &states),
            (TEXTURES_INDEX, &textures),
        ] {
            cache
                .store(
                    "master",
                    "1.19.1",
                    &format!("index/{}", file),
                    value.to_string().as_bytes(),
                )
                .unwrap();
        }
        cache
    }

    pub(crate) fn seeded_source(dir: &std::path::Path) -> RemoteAssetSource {
        RemoteAssetSource::fetch_all_from(UNREACHABLE, "master", "1.19.1", seed_cache(dir)).unwrap()
    }

    #[test]
    fn test_fetch_all_is_idempotent_with_warm_cache() {
        let dir = tempfile::tempdir().unwrap();
        seed_cache(dir.path());

        // Two constructions against an unroutable mirror: both must be served
        // entirely from the cache.
        for _ in 0..2 {
            let source = RemoteAssetSource::fetch_all_from(
                UNREACHABLE,
                "master",
                "1.19.1",
                AssetCache::new(dir.path()),
            )
            .unwrap();
            assert_eq!(source.models.len(), 2);
        }
    }

    #[test]
    fn test_cold_cache_without_mirror_is_bridge_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = RemoteAssetSource::fetch_all_from(
            UNREACHABLE,
            "master",
            "1.19.1",
            AssetCache::new(dir.path()),
        );
        assert!(matches!(result, Err(ResolverError::Bridge(_))));
    }

    #[test]
    fn test_load_json_from_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let source = seeded_source(dir.path());

        let model = ResourcePath::parse("minecraft:models/block/stone.json").unwrap();
        let text = source.load_json(&model).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["parent"], "block/cube_all");

        let state = ResourcePath::parse("minecraft:blockstates/stone.json").unwrap();
        assert!(source.load_json(&state).is_ok());
    }

    #[test]
    fn test_item_model_lookup_strips_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let source = seeded_source(dir.path());

        let model = ResourcePath::parse("minecraft:models/item/stick.json").unwrap();
        let text = source.load_json(&model).unwrap();
        assert!(text.contains("item/handheld"));
    }

    #[test]
    fn test_texture_from_content_index() {
        let dir = tempfile::tempdir().unwrap();
        let source = seeded_source(dir.path());

        let texture = ResourcePath::parse("minecraft:textures/item/stick.png").unwrap();
        assert_eq!(source.load_texture(&texture).unwrap(), b"stick-pixels");
    }

    #[test]
    fn test_foreign_namespace_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = seeded_source(dir.path());

        let path = ResourcePath::parse("mymod:models/block/custom.json").unwrap();
        assert!(source.load_json(&path).unwrap_err().is_not_found());
    }

    #[test]
    fn test_mcmeta_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = seeded_source(dir.path());

        let path = ResourcePath::parse("minecraft:textures/item/stick.png.mcmeta").unwrap();
        assert!(source.load_json(&path).unwrap_err().is_not_found());

        // and loadTexture must not answer it with the texture's PNG bytes;
        // block-directory sidecars stay off the network entirely
        assert!(source.load_texture(&path).unwrap_err().is_not_found());
        let block = ResourcePath::parse("minecraft:textures/block/stone.png.mcmeta").unwrap();
        assert!(source.load_texture(&block).unwrap_err().is_not_found());
    }

    #[test]
    fn test_local_pack_over_remote_fallback() {
        use crate::loader::{DirectoryLoader, Multiloader};

        let pack_dir = tempfile::tempdir().unwrap();
        let model_file = pack_dir.path().join("assets/foo/models/bar.json");
        std::fs::create_dir_all(model_file.parent().unwrap()).unwrap();
        std::fs::write(&model_file, b"{\"local\":true}").unwrap();

        let cache_dir = tempfile::tempdir().unwrap();
        let multi = Multiloader::new(vec![
            Box::new(DirectoryLoader::new(pack_dir.path())),
            Box::new(seeded_source(cache_dir.path())),
        ]);

        // present locally: the local content wins
        let local = ResourcePath::parse("foo:models/bar.json").unwrap();
        assert_eq!(multi.load_json(&local).unwrap(), "{\"local\":true}");

        // absent locally: falls through to the cached vanilla bundle
        let vanilla = ResourcePath::parse("minecraft:models/stick.json").unwrap();
        assert!(multi.load_json(&vanilla).unwrap().contains("item/handheld"));

        // absent everywhere: authoritative NotFound naming the path
        let missing = ResourcePath::parse("foo:models/missing.json").unwrap();
        match multi.load_json(&missing) {
            Err(ResolverError::NotFound(reported)) => assert_eq!(reported, missing),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_build_url_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let source = seeded_source(dir.path());

        assert_eq!(
            source.build_url("minecraft/block/stone.png").unwrap(),
            format!("{}/master/data/1.19.1/blocks/stone.png", UNREACHABLE)
        );
        assert_eq!(
            source.build_url("minecraft/item/stick.png").unwrap(),
            format!("{}/master/data/1.19.1/items/stick.png", UNREACHABLE)
        );
        assert!(matches!(
            source.build_url("mymod/block/custom.png"),
            Err(ResolverError::MalformedPath(_))
        ));
    }
}
