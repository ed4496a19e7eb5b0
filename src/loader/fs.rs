//! Local-filesystem loader.

use std::io;
use std::path::{Path, PathBuf};

use log::trace;

use crate::error::{ResolverError, Result};
use crate::loader::ResourceLoader;
use crate::path::ResourcePath;

/// Loads assets from an unpacked resource tree on disk.
///
/// The mapping is deterministic: `ns:objectType/identifier.suffix` lives at
/// `root/assets/{ns}/{objectType}/{identifier}.{suffix}`. The filesystem is
/// the cache; nothing is held in memory.
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &ResourcePath) -> PathBuf {
        self.root
            .join("assets")
            .join(&path.namespace)
            .join(path.object_type.as_str())
            .join(format!("{}.{}", path.identifier, path.suffix))
    }

    fn read(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        for candidate in path.candidates() {
            let file = self.file_path(&candidate);
            match std::fs::read(&file) {
                Ok(bytes) => {
                    trace!("read {} from {}", candidate, file.display());
                    return Ok(bytes);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    return Err(ResolverError::Bridge(format!(
                        "failed to read {}: {}",
                        file.display(),
                        err
                    )));
                }
            }
        }
        Err(ResolverError::NotFound(path.clone()))
    }
}

impl ResourceLoader for DirectoryLoader {
    fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        self.read(path)
    }

    fn load_json(&self, path: &ResourcePath) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| {
            ResolverError::Bridge(format!("{} is not valid UTF-8", self.file_path(path).display()))
        })
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ObjectType;
    use std::fs;

    fn write_asset(root: &Path, rel: &str, content: &[u8]) {
        let file = root.join(rel);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }

    #[test]
    fn test_loads_json_and_texture() {
        let dir = tempfile::tempdir().unwrap();
        write_asset(dir.path(), "assets/foo/models/bar.json", b"{\"a\":1}");
        write_asset(dir.path(), "assets/foo/textures/item/wand.png", b"\x89PNG");

        let loader = DirectoryLoader::new(dir.path());

        let model = ResourcePath::new("foo", ObjectType::Models, "bar", "json").unwrap();
        assert_eq!(loader.load_json(&model).unwrap(), "{\"a\":1}");

        let texture = ResourcePath::new("foo", ObjectType::Textures, "item/wand", "png").unwrap();
        assert_eq!(loader.load_texture(&texture).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DirectoryLoader::new(dir.path());

        let path = ResourcePath::new("foo", ObjectType::Models, "missing", "json").unwrap();
        assert!(loader.load_json(&path).unwrap_err().is_not_found());
    }

    #[test]
    fn test_variant_fallback_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_asset(dir.path(), "assets/foo/textures/block/b.png", b"second");
        write_asset(dir.path(), "assets/foo/textures/block/c.png", b"third");

        let loader = DirectoryLoader::new(dir.path());
        let path = ResourcePath::new("foo", ObjectType::Textures, "block/a", "png")
            .unwrap()
            .with_variants(vec!["block/b".into(), "block/c".into()])
            .unwrap();

        assert_eq!(loader.load_texture(&path).unwrap(), b"second");
    }

    #[test]
    fn test_invalid_utf8_json_is_bridge_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_asset(dir.path(), "assets/foo/models/bad.json", &[0xff, 0xfe, 0x00]);

        let loader = DirectoryLoader::new(dir.path());
        let path = ResourcePath::new("foo", ObjectType::Models, "bad", "json").unwrap();
        assert!(matches!(
            loader.load_json(&path),
            Err(ResolverError::Bridge(_))
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = DirectoryLoader::new(dir.path());
        loader.close().unwrap();
        loader.close().unwrap();
    }
}
