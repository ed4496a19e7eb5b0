//! Loader contract and ordered-fallback composition.
//!
//! A [`ResourceLoader`] answers `loadTexture`/`loadJSON` for exactly one
//! source of assets. [`Multiloader`] composes an ordered list of them behind
//! the same contract with first-success-wins fallback, which is how a mod's
//! generated resources, local packs/jars, a bridged external loader and the
//! vanilla asset bundle become one logical source.

pub mod archive;
pub mod bridge;
pub mod fs;
pub mod memo;

pub use archive::ArchiveLoader;
pub use bridge::BridgeLoader;
pub use fs::DirectoryLoader;
pub use memo::MemoLoader;

use log::{debug, trace};

use crate::error::{ResolverError, Result};
use crate::path::ResourcePath;

/// Capability interface for a single asset source.
///
/// Content is returned raw: undecoded bytes for textures, undecoded text for
/// JSON. Parsing belongs to the consumer. A loader either returns content or
/// fails with `NotFound`; it never substitutes a placeholder. Any failure
/// that is not "this asset is absent here" must surface as
/// [`ResolverError::Bridge`] so composition does not mask a faulted source.
pub trait ResourceLoader {
    fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>>;

    fn load_json(&self, path: &ResourcePath) -> Result<String>;

    /// Releases the source. Idempotent, and safe to call even if nothing was
    /// ever loaded.
    fn close(&mut self) -> Result<()>;
}

impl<L: ResourceLoader + ?Sized> ResourceLoader for Box<L> {
    fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        (**self).load_texture(path)
    }

    fn load_json(&self, path: &ResourcePath) -> Result<String> {
        (**self).load_json(path)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// An ordered list of loaders presented as one.
///
/// List order is priority order: the first child that returns content wins
/// and lower-priority children are not consulted. A child's `NotFound` is
/// swallowed and resolution falls through; any other child error aborts
/// resolution immediately. The multiloader holds no state beyond the list
/// and does no caching of its own.
pub struct Multiloader {
    loaders: Vec<Box<dyn ResourceLoader>>,
}

impl Multiloader {
    pub fn new(loaders: Vec<Box<dyn ResourceLoader>>) -> Self {
        Self { loaders }
    }

    /// Appends a loader at the lowest priority.
    pub fn push(&mut self, loader: Box<dyn ResourceLoader>) {
        self.loaders.push(loader);
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    fn resolve<T>(
        &self,
        path: &ResourcePath,
        what: &str,
        load: impl Fn(&dyn ResourceLoader) -> Result<T>,
    ) -> Result<T> {
        for (index, loader) in self.loaders.iter().enumerate() {
            match load(loader.as_ref()) {
                Ok(content) => {
                    trace!("{} {}: hit in source #{}", what, path, index);
                    return Ok(content);
                }
                Err(err) if err.is_not_found() => {
                    debug!("{} {}: miss in source #{}", what, path, index);
                }
                Err(err) => return Err(err),
            }
        }
        Err(ResolverError::NotFound(path.clone()))
    }
}

impl ResourceLoader for Multiloader {
    fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        self.resolve(path, "loadTexture", |loader| loader.load_texture(path))
    }

    fn load_json(&self, path: &ResourcePath) -> Result<String> {
        self.resolve(path, "loadJSON", |loader| loader.load_json(path))
    }

    /// Releases every child, even when earlier releases fail. Collected
    /// failures are reported together as a single [`ResolverError::Teardown`].
    fn close(&mut self) -> Result<()> {
        let mut failures = Vec::new();
        for loader in &mut self.loaders {
            if let Err(err) = loader.close() {
                failures.push(err.to_string());
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ResolverError::Teardown(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ObjectType;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Fixed-content loader with externally observable call/close counters.
    struct StaticLoader {
        json: HashMap<String, String>,
        textures: HashMap<String, Vec<u8>>,
        calls: Rc<Cell<usize>>,
        closes: Rc<Cell<usize>>,
        bridge_fault: bool,
        close_fault: bool,
    }

    impl StaticLoader {
        fn new() -> Self {
            Self {
                json: HashMap::new(),
                textures: HashMap::new(),
                calls: Rc::new(Cell::new(0)),
                closes: Rc::new(Cell::new(0)),
                bridge_fault: false,
                close_fault: false,
            }
        }

        fn with_json(mut self, path: &ResourcePath, text: &str) -> Self {
            self.json.insert(path.canonical(), text.to_string());
            self
        }

        fn with_texture(mut self, path: &ResourcePath, bytes: &[u8]) -> Self {
            self.textures.insert(path.canonical(), bytes.to_vec());
            self
        }

        fn faulted(mut self) -> Self {
            self.bridge_fault = true;
            self
        }

        fn failing_close(mut self) -> Self {
            self.close_fault = true;
            self
        }
    }

    impl ResourceLoader for StaticLoader {
        fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            if self.bridge_fault {
                return Err(ResolverError::bridge("source is corrupted"));
            }
            self.textures
                .get(&path.canonical())
                .cloned()
                .ok_or_else(|| ResolverError::NotFound(path.clone()))
        }

        fn load_json(&self, path: &ResourcePath) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            if self.bridge_fault {
                return Err(ResolverError::bridge("source is corrupted"));
            }
            self.json
                .get(&path.canonical())
                .cloned()
                .ok_or_else(|| ResolverError::NotFound(path.clone()))
        }

        fn close(&mut self) -> Result<()> {
            self.closes.set(self.closes.get() + 1);
            if self.close_fault {
                return Err(ResolverError::bridge("release failed"));
            }
            Ok(())
        }
    }

    fn model_path(name: &str) -> ResourcePath {
        ResourcePath::new("minecraft", ObjectType::Models, name, "json").unwrap()
    }

    #[test]
    fn test_first_success_short_circuits() {
        let path = model_path("block/stone");
        let a = StaticLoader::new().with_json(&path, r#"{"from":"a"}"#);
        let b = StaticLoader::new().with_json(&path, r#"{"from":"b"}"#);
        let b_calls = Rc::clone(&b.calls);

        let multi = Multiloader::new(vec![Box::new(a), Box::new(b)]);
        assert_eq!(multi.load_json(&path).unwrap(), r#"{"from":"a"}"#);
        assert_eq!(b_calls.get(), 0, "lower priority loader was consulted");
    }

    #[test]
    fn test_falls_through_not_found() {
        let path = model_path("block/stone");
        let a = StaticLoader::new();
        let b = StaticLoader::new().with_texture(&path, b"pixels");

        let multi = Multiloader::new(vec![Box::new(a), Box::new(b)]);
        assert_eq!(multi.load_texture(&path).unwrap(), b"pixels");
    }

    #[test]
    fn test_exhaustion_reports_original_path() {
        let path = model_path("block/missing");
        let multi = Multiloader::new(vec![
            Box::new(StaticLoader::new()),
            Box::new(StaticLoader::new()),
        ]);

        match multi.load_json(&path) {
            Err(ResolverError::NotFound(reported)) => assert_eq!(reported, path),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_bridge_failure_aborts_resolution() {
        let path = model_path("block/stone");
        let a = StaticLoader::new().faulted();
        let b = StaticLoader::new().with_json(&path, "{}");
        let b_calls = Rc::clone(&b.calls);

        let multi = Multiloader::new(vec![Box::new(a), Box::new(b)]);
        match multi.load_json(&path) {
            Err(ResolverError::Bridge(_)) => {}
            other => panic!("expected Bridge, got {:?}", other.map(|_| ())),
        }
        assert_eq!(b_calls.get(), 0, "faulted source must abort resolution");
    }

    #[test]
    fn test_close_releases_every_child() {
        let a = StaticLoader::new().failing_close();
        let b = StaticLoader::new().failing_close();
        let c = StaticLoader::new();
        let c_closes = Rc::clone(&c.closes);

        let mut multi = Multiloader::new(vec![Box::new(a), Box::new(b), Box::new(c)]);
        match multi.close() {
            Err(ResolverError::Teardown(failures)) => assert_eq!(failures.len(), 2),
            other => panic!("expected Teardown, got {:?}", other),
        }
        assert_eq!(c_closes.get(), 1, "later children must still be released");
    }

    #[test]
    fn test_close_is_idempotent() {
        let a = StaticLoader::new();
        let a_closes = Rc::clone(&a.closes);

        let mut multi = Multiloader::new(vec![Box::new(a)]);
        multi.close().unwrap();
        multi.close().unwrap();
        assert_eq!(a_closes.get(), 2);
    }
}
