//! Error types for asset resolution.

use thiserror::Error;

use crate::path::ResourcePath;

/// Result type alias using ResolverError.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Main error type for asset resolution operations.
///
/// The split between [`NotFound`](ResolverError::NotFound) and
/// [`Bridge`](ResolverError::Bridge) is load-bearing: a multiloader recovers
/// from `NotFound` by falling through to the next source, while `Bridge`
/// signals a faulted source (corrupted archive, transport error, broken
/// external process) and always propagates.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Invalid input while constructing a resource path or location.
    #[error("malformed resource path: {0}")]
    MalformedPath(String),

    /// The asset is absent in the consulted source(s).
    #[error("resource not found: {0}")]
    NotFound(ResourcePath),

    /// A loader malfunctioned. Not "the asset is absent here".
    #[error("loader failure: {0}")]
    Bridge(String),

    /// Failed to parse JSON data at the resolution layer.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to resolve a blockstate to a concrete variant.
    #[error("blockstate resolution error: {0}")]
    BlockstateResolution(String),

    /// Model inheritance chain too deep (circular reference protection).
    #[error("model inheritance too deep (possible circular reference): {0}")]
    ModelInheritanceTooDeep(String),

    /// A model graph reference was exhausted in every configured source.
    #[error("could not resolve {path} (model chain: {})", .chain.join(" -> "))]
    Unresolved {
        path: ResourcePath,
        chain: Vec<String>,
    },

    /// One or more child loaders failed to release.
    #[error("loader teardown failed: {}", .0.join("; "))]
    Teardown(Vec<String>),
}

impl ResolverError {
    /// Whether this error means "absent in this source", so fallback may
    /// continue, as opposed to a fault that must abort resolution.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolverError::NotFound(_))
    }

    pub(crate) fn bridge(message: impl Into<String>) -> Self {
        ResolverError::Bridge(message.into())
    }
}
