//! ZIP / mod jar loader.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use std::sync::Mutex;

use log::trace;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ResolverError, Result};
use crate::loader::ResourceLoader;
use crate::path::ResourcePath;

/// Loads assets out of a resource pack ZIP or a mod jar.
///
/// The archive's central directory is parsed at construction, so a corrupted
/// jar fails up front with a `Bridge` error instead of masquerading as a pile
/// of missing assets later. Entry lookups need `&mut` access to the archive
/// reader, hence the interior mutex.
pub struct ArchiveLoader<R: Read + Seek = BufReader<File>> {
    archive: Mutex<ZipArchive<R>>,
    source: String,
}

impl ArchiveLoader<BufReader<File>> {
    /// Opens an archive file (`.zip` or `.jar`).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            ResolverError::Bridge(format!("failed to open archive {}: {}", path.display(), err))
        })?;
        Self::from_reader(BufReader::new(file), path.display().to_string())
    }
}

impl ArchiveLoader<Cursor<Vec<u8>>> {
    /// Opens an archive held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data), "<memory>".to_string())
    }
}

impl<R: Read + Seek> ArchiveLoader<R> {
    fn from_reader(reader: R, source: String) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|err| {
            ResolverError::Bridge(format!("malformed archive {}: {}", source, err))
        })?;
        Ok(Self {
            archive: Mutex::new(archive),
            source,
        })
    }

    fn entry_name(path: &ResourcePath) -> String {
        format!(
            "assets/{}/{}/{}.{}",
            path.namespace, path.object_type, path.identifier, path.suffix
        )
    }

    fn read(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        let mut archive = self.archive.lock().unwrap_or_else(|err| err.into_inner());

        for candidate in path.candidates() {
            let name = Self::entry_name(&candidate);
            let mut entry = match archive.by_name(&name) {
                Ok(entry) => entry,
                Err(ZipError::FileNotFound) => continue,
                Err(err) => {
                    return Err(ResolverError::Bridge(format!(
                        "corrupted entry {} in {}: {}",
                        name, self.source, err
                    )));
                }
            };

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes).map_err(|err| {
                ResolverError::Bridge(format!(
                    "failed to decompress {} from {}: {}",
                    name, self.source, err
                ))
            })?;
            trace!("read {} from {}", candidate, self.source);
            return Ok(bytes);
        }

        Err(ResolverError::NotFound(path.clone()))
    }
}

impl<R: Read + Seek> ResourceLoader for ArchiveLoader<R> {
    fn load_texture(&self, path: &ResourcePath) -> Result<Vec<u8>> {
        self.read(path)
    }

    fn load_json(&self, path: &ResourcePath) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| {
            ResolverError::Bridge(format!(
                "{} in {} is not valid UTF-8",
                Self::entry_name(path),
                self.source
            ))
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
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_loads_from_archive() {
        let data = build_archive(&[
            ("assets/foo/models/bar.json", b"{}"),
            ("assets/foo/textures/block/custom.png", b"\x89PNG"),
        ]);
        let loader = ArchiveLoader::from_bytes(data).unwrap();

        let model = ResourcePath::new("foo", ObjectType::Models, "bar", "json").unwrap();
        assert_eq!(loader.load_json(&model).unwrap(), "{}");

        let texture =
            ResourcePath::new("foo", ObjectType::Textures, "block/custom", "png").unwrap();
        assert_eq!(loader.load_texture(&texture).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let data = build_archive(&[("assets/foo/models/bar.json", b"{}")]);
        let loader = ArchiveLoader::from_bytes(data).unwrap();

        let path = ResourcePath::new("foo", ObjectType::Models, "missing", "json").unwrap();
        assert!(loader.load_json(&path).unwrap_err().is_not_found());
    }

    #[test]
    fn test_corrupted_archive_is_bridge_failure() {
        let result = ArchiveLoader::from_bytes(b"this is not a zip file".to_vec());
        assert!(matches!(result, Err(ResolverError::Bridge(_))));
    }

    #[test]
    fn test_variant_fallback() {
        let data = build_archive(&[("assets/foo/textures/block/alt.png", b"alt")]);
        let loader = ArchiveLoader::from_bytes(data).unwrap();

        let path = ResourcePath::new("foo", ObjectType::Textures, "block/primary", "png")
            .unwrap()
            .with_variants(vec!["block/alt".into()])
            .unwrap();
        assert_eq!(loader.load_texture(&path).unwrap(), b"alt");
    }
}
