//! Resource path identity.
//!
//! Every lookup and cache in this crate is keyed by a [`ResourcePath`]: the
//! canonical, immutable identity of a single game asset
//! (`namespace:objectType/identifier.suffix`). [`ResourceLocation`] is the
//! user-facing `namespace:path` form that block and model JSON uses to refer
//! to other assets; helpers on it derive the concrete `ResourcePath`s for its
//! blockstate, model, texture and animation metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};

/// Variant properties that make for a representative render when a blockstate
/// has several to choose from. Matching keys sort first.
const PREFERRED_VARIANTS: [&str; 7] = [
    "facing=west",
    "axis=y",
    "face=wall",
    "attachment=floor",
    "lit=false",
    "powered=false",
    "shape=straight",
];

/// The recognized asset categories under `assets/{namespace}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Textures,
    Models,
    Blockstates,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Textures => "textures",
            ObjectType::Models => "models",
            ObjectType::Blockstates => "blockstates",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "textures" => Ok(ObjectType::Textures),
            "models" => Ok(ObjectType::Models),
            "blockstates" => Ok(ObjectType::Blockstates),
            other => Err(ResolverError::MalformedPath(format!(
                "unrecognized object type: {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity of a single asset file.
///
/// Immutable by convention: all transformations produce a new value. Equality
/// and hashing cover every field including the variant list, and the
/// [`Display`](fmt::Display)/[`parse`](ResourcePath::parse) pair round-trips
/// every valid value. The canonical string is the cache key and the log
/// identity throughout the crate.
///
/// Serialized field names are camelCase because this type crosses the bridge
/// loader's process boundary as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePath {
    /// Mod or domain, e.g. `minecraft`. Never empty.
    pub namespace: String,
    pub object_type: ObjectType,
    /// Slash-delimited path under the object type, no leading slash.
    pub identifier: String,
    /// File extension without the leading dot. `png.mcmeta` is the one
    /// recognized two-part suffix.
    pub suffix: String,
    /// Ordered alternate texture identifiers for the same slot. Loaders try
    /// the primary identifier first, then each variant in order.
    #[serde(default)]
    pub variants: Vec<String>,
}

impl ResourcePath {
    pub fn new(
        namespace: impl Into<String>,
        object_type: ObjectType,
        identifier: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self> {
        let namespace = namespace.into();
        let identifier = identifier.into();
        let suffix = suffix.into();

        if namespace.is_empty() || !namespace.bytes().all(is_namespace_char) {
            return Err(ResolverError::MalformedPath(format!(
                "invalid namespace: {:?}",
                namespace
            )));
        }
        if identifier.is_empty()
            || identifier.starts_with('/')
            || !identifier.bytes().all(is_path_char)
        {
            return Err(ResolverError::MalformedPath(format!(
                "invalid identifier: {:?}",
                identifier
            )));
        }
        // The one compound suffix; everything else is a single dot-free
        // extension, so the canonical form always splits back unambiguously.
        let suffix_ok = suffix == "png.mcmeta"
            || (!suffix.is_empty()
                && !suffix.contains('.')
                && suffix.bytes().all(is_namespace_char));
        if !suffix_ok {
            return Err(ResolverError::MalformedPath(format!(
                "suffix must be an extension without the dot: {:?}",
                suffix
            )));
        }

        Ok(Self {
            namespace,
            object_type,
            identifier,
            suffix,
            variants: Vec::new(),
        })
    }

    /// Returns a copy carrying the given alternate texture identifiers. Each
    /// variant is an identifier in its own right and is held to the same
    /// charset.
    pub fn with_variants(mut self, variants: Vec<String>) -> Result<Self> {
        for variant in &variants {
            if variant.is_empty() || !variant.bytes().all(is_path_char) {
                return Err(ResolverError::MalformedPath(format!(
                    "invalid variant identifier: {:?}",
                    variant
                )));
            }
        }
        self.variants = variants;
        Ok(self)
    }

    /// Canonical string form: `namespace:objectType/identifier.suffix`, with
    /// `[v1,v2]` appended when variants are present.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Parses the canonical string form back into a path.
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = || ResolverError::MalformedPath(format!("cannot parse {:?}", raw));

        let (body, variants) = match raw.split_once('[') {
            Some((body, rest)) => {
                let inner = rest.strip_suffix(']').ok_or_else(malformed)?;
                let variants = inner
                    .split(',')
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                (body, variants)
            }
            None => (raw, Vec::new()),
        };

        let (namespace, rest) = body.split_once(':').ok_or_else(malformed)?;
        let (object_type, rest) = rest.split_once('/').ok_or_else(malformed)?;
        let (identifier, suffix) = split_suffix(rest).ok_or_else(malformed)?;

        let path = Self::new(namespace, ObjectType::parse(object_type)?, identifier, suffix)?;
        path.with_variants(variants)
    }

    /// Derives a related path: same namespace, identifier and variants, but a
    /// different object type and suffix. Used to go from a model reference to
    /// its texture or JSON counterpart.
    pub fn sibling(&self, object_type: ObjectType, suffix: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            object_type,
            identifier: self.identifier.clone(),
            suffix: suffix.into(),
            variants: self.variants.clone(),
        }
    }

    /// The lookup candidates for this path, in priority order: the path
    /// itself, then one variant-free path per alternate identifier.
    pub fn candidates(&self) -> Vec<ResourcePath> {
        let mut candidates = Vec::with_capacity(1 + self.variants.len());
        let mut primary = self.clone();
        primary.variants.clear();
        candidates.push(primary);
        for variant in &self.variants {
            candidates.push(Self {
                namespace: self.namespace.clone(),
                object_type: self.object_type,
                identifier: variant.clone(),
                suffix: self.suffix.clone(),
                variants: Vec::new(),
            });
        }
        candidates
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}.{}",
            self.namespace, self.object_type, self.identifier, self.suffix
        )?;
        if !self.variants.is_empty() {
            write!(f, "[{}]", self.variants.join(","))?;
        }
        Ok(())
    }
}

/// Splits `identifier.suffix`, keeping slashes and interior dots in the
/// identifier. `png.mcmeta` is recognized as a whole suffix.
fn split_suffix(rest: &str) -> Option<(&str, &str)> {
    if let Some(identifier) = rest.strip_suffix(".png.mcmeta") {
        return Some((identifier, "png.mcmeta"));
    }
    rest.rsplit_once('.')
}

/// A `namespace:path` reference as written in blockstate and model JSON.
///
/// The namespace defaults to `minecraft` when omitted. Optionally carries
/// preferred blockstate variants that bias deterministic variant selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocation {
    pub namespace: String,
    pub path: String,
    pub preferred_variants: Vec<String>,
}

impl ResourceLocation {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let path = path.into();

        if namespace.is_empty() || !namespace.bytes().all(is_namespace_char) {
            return Err(ResolverError::MalformedPath(format!(
                "invalid namespace: {:?}",
                namespace
            )));
        }
        if path.is_empty() || !path.bytes().all(is_path_char) {
            return Err(ResolverError::MalformedPath(format!(
                "invalid location path: {:?}",
                path
            )));
        }

        Ok(Self {
            namespace,
            path,
            preferred_variants: Vec::new(),
        })
    }

    /// Parses `"ns:path"` or `"path"` (namespace defaults to `minecraft`).
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new("minecraft", raw),
        }
    }

    pub fn with_preferred_variants(mut self, variants: Vec<String>) -> Self {
        self.preferred_variants = variants;
        self
    }

    /// `namespace:path` form.
    pub fn to_id(&self) -> String {
        format!("{}:{}", self.namespace, self.path)
    }

    /// Sort key for picking a representative blockstate variant; lower sorts
    /// first. Globally preferred properties count a little, this location's
    /// own preferences count a lot.
    pub fn variant_sort_key(&self, variant: &str) -> i32 {
        let mut key = 0;
        for preferred in PREFERRED_VARIANTS {
            if variant.contains(preferred) {
                key -= 1;
            }
        }
        for preferred in &self.preferred_variants {
            if variant.contains(preferred.as_str()) {
                key -= 100;
            }
        }
        // wall-mounted blocks look best from the east
        if variant.contains("face=wall") && variant.contains("facing=east") {
            key -= 1;
        }
        key
    }

    pub fn blockstate_path(&self) -> ResourcePath {
        self.resource_path(ObjectType::Blockstates, "json")
    }

    pub fn model_path(&self) -> ResourcePath {
        self.resource_path(ObjectType::Models, "json")
    }

    pub fn texture_path(&self) -> ResourcePath {
        self.resource_path(ObjectType::Textures, "png")
    }

    pub fn animation_meta_path(&self) -> ResourcePath {
        self.resource_path(ObjectType::Textures, "png.mcmeta")
    }

    fn resource_path(&self, object_type: ObjectType, suffix: &str) -> ResourcePath {
        // Fields were validated at construction; rebuilding cannot fail.
        ResourcePath {
            namespace: self.namespace.clone(),
            object_type,
            identifier: self.path.clone(),
            suffix: suffix.to_string(),
            variants: Vec::new(),
        }
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

fn is_namespace_char(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'_' | b'-' | b'.')
}

fn is_path_char(b: u8) -> bool {
    is_namespace_char(b) || b == b'/'
}
