//! Thread-safe template cache.
//!
//! This module owns the compiled templates of an application and the engine
//! that renders them.
//!
//! # Architecture
//!
//! * [`store`]: [`TemplateCache`] itself: compile, lookup and admin operations.
//! * [`render`]: the render dispatcher (lookup + delegation to the engine).
//!
//! # Consistency
//!
//! The visible contents are always either empty or the complete result of
//! one successful [`TemplateCache::compile`], possibly followed by
//! [`insert`](TemplateCache::insert), [`delete`](TemplateCache::delete) and
//! [`clear`](TemplateCache::clear). A compile builds its map without holding
//! the lock and swaps it in only on success, so readers keep serving the
//! previous templates while a recompile is running and never observe a
//! partially compiled tree.

pub mod render;
pub mod store;

use std::path::PathBuf;

pub use store::TemplateCache;

use crate::engine::{EngineError, UnknownEngine};

/// Errors reported by the cache and the compilation walker.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The requested engine is not registered.
    #[error("{0}")]
    UnsupportedEngine(UnknownEngine),

    /// The configured extension cannot match any file.
    #[error("invalid template extension '{0}': must start with '.' and contain no path separator")]
    InvalidExtension(String),

    /// A directory could not be read during compilation.
    #[error("I/O error for {path}: {source}")]
    Filesystem {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The compile root is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The engine rejected a template.
    #[error("failed to compile {path}: {source}")]
    Compile {
        /// Template that failed
        path: PathBuf,
        /// Error reported by the engine
        #[source]
        source: EngineError,
    },

    /// A matching template path cannot be turned into a key.
    #[error("cannot derive a template key from {}", .0.display())]
    InvalidPath(PathBuf),

    /// Two templates derived the same key.
    #[error("templates {} and {} both map to key '{key}'", .first.display(), .second.display())]
    KeyCollision {
        /// Shared key
        key: String,
        /// File compiled first
        first: PathBuf,
        /// File compiled second
        second: PathBuf,
    },

    /// No template is cached under the key.
    #[error("template '{0}' not found")]
    NotFound(String),

    /// The engine failed while rendering a cached template.
    #[error("failed to render template '{key}': {source}")]
    Render {
        /// Key of the template
        key: String,
        /// Error reported by the engine
        #[source]
        source: EngineError,
    },
}

impl From<UnknownEngine> for CacheError {
    fn from(err: UnknownEngine) -> Self {
        Self::UnsupportedEngine(err)
    }
}

impl CacheError {
    /// Whether this is a configuration problem rather than a template problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedEngine(_) | Self::InvalidExtension(_)
        )
    }
}
