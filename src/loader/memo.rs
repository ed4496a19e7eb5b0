//! In-memory memoization decorator.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::loader::ResourceLoader;
use crate::path::ResourcePath;

/// Wraps any loader and memoizes successful loads, keyed by the canonical
/// path string. Model graph resolution requests the same parent models and
/// textures repeatedly; memoizing at the composed-loader level keeps every
/// underlying source free of caching concerns.
///
/// Failures are deliberately not memoized: a `NotFound` from a remote source
/// mid-fetch should be retried on the next lookup, not pinned.
pub struct MemoLoader<L> {
    inner: L,
    textures: Mutex<HashMap<String, Vec<u8>>>,
    json: Mutex<HashMap<String, String>>,
}

impl<L: ResourceLoader> MemoLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            textures: Mutex::new(HashMap::new()),
            json: Mutex::new(HashMap::new()),
        }
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: ResourceLoader> ResourceLoader for MemoLoader<L> {
    fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        let key = path.canonical();
        {
            let textures = self.textures.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(bytes) = textures.get(&key) {
                return Ok(bytes.clone());
            }
        }
        let bytes = self.inner.load_texture(path)?;
        self.textures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, bytes.clone());
        Ok(bytes)
    }

    fn load_json(&self, path: &ResourcePath) -> Result<String> {
        let key = path.canonical();
        {
            let json = self.json.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(text) = json.get(&key) {
                return Ok(text.clone());
            }
        }
        let text = self.inner.load_json(path)?;
        self.json
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, text.clone());
        Ok(text)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
