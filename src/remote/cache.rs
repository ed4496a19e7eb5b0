//! On-disk cache for remote fetches.

use std::io;
use std::path::{Path, PathBuf};

use log::trace;

use crate::error::{ResolverError, Result};

/// Explicit handle to a cache directory, injected into
/// [`RemoteAssetSource`](crate::remote::RemoteAssetSource) so sessions and
/// tests can use isolated caches instead of ambient process-wide state.
///
/// Entries are laid out as `root/{version}/{game_version}/{key}` where the
/// key is the canonical resource path string (the `:` becomes a directory
/// separator). Entries are write-once and never invalidated; bumping the
/// version pair is the only invalidation mechanism, since it addresses a new
/// subtree.
#[derive(Debug, Clone)]
pub struct AssetCache {
    root: PathBuf,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, version: &str, game_version: &str, key: &str) -> PathBuf {
        self.root
            .join(version)
            .join(game_version)
            .join(key.replace(':', "/"))
    }

    /// Returns the cached bytes for a key, or `None` on a cache miss.
    pub fn load(&self, version: &str, game_version: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(version, game_version, key);
        match std::fs::read(&path) {
            Ok(bytes) => {
                trace!("cache hit: {}", path.display());
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ResolverError::Bridge(format!(
                "failed to read cache entry {}: {}",
                path.display(),
                err
            ))),
        }
    }

    /// Persists bytes under a key. Write-once: if the entry already exists the
    /// call is a no-op and the existing content is kept. The write goes
    /// through a temp file and a rename, so a concurrent or crashed writer
    /// never leaves a partial entry visible.
    pub fn store(&self, version: &str, game_version: &str, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.entry_path(version, game_version, key);
        if path.exists() {
            return Ok(());
        }

        let parent = path
            .parent()
            .ok_or_else(|| ResolverError::bridge("cache entry has no parent directory"))?;
        std::fs::create_dir_all(parent).map_err(|err| {
            ResolverError::Bridge(format!(
                "failed to create cache directory {}: {}",
                parent.display(),
                err
            ))
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = path.with_file_name(format!("{}.tmp.{}", file_name, std::process::id()));
        std::fs::write(&tmp, bytes).map_err(|err| {
            ResolverError::Bridge(format!("failed to write {}: {}", tmp.display(), err))
        })?;
        // Rename is atomic; a racing writer can only replace a complete entry
        // with another complete one.
        std::fs::rename(&tmp, &path).map_err(|err| {
            let _ = std::fs::remove_file(&tmp);
            ResolverError::Bridge(format!("failed to commit {}: {}", path.display(), err))
        })?;
        trace!("cached: {}", path.display());
        Ok(())
    }
}
