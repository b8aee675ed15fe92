//! Directory compilation.
//!
//! This module provides functionality for:
//! - Discovering template files under a root directory
//! - Matching them against a configured extension
//! - Deriving cache keys from their relative paths
//! - Compiling each match with the active [`Engine`](crate::engine::Engine)
//!
//! # Architecture
//!
//! - [`walker`]: depth-first traversal producing a complete key → artifact map
//! - [`key`]: extension matching policy and key derivation
//!
//! # Example
//!
//! ```no_run
//! use steep::compiler::{CompileOptions, Walker};
//! use steep::engine::HtmlEngine;
//! use std::path::Path;
//!
//! let options = CompileOptions::new(".html", true);
//! let compiled = Walker::new(Path::new("templates"), options)
//!     .compile(&HtmlEngine)
//!     .unwrap();
//! println!("{} templates", compiled.len());
//! ```

pub mod key;
pub mod walker;

use serde::{Deserialize, Serialize};

pub use walker::Walker;

use crate::cache::CacheError;

/// What to do when two files derive the same key in one compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Fail the compile, naming both files.
    #[default]
    Error,
    /// Keep the file visited last and log a warning.
    LastWriteWins,
}

impl std::fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionPolicy::Error => write!(f, "error"),
            CollisionPolicy::LastWriteWins => write!(f, "last-write-wins"),
        }
    }
}

/// Options for one directory compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Full extension to match, including the leading `.`.
    pub extension: String,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Handling of duplicate keys.
    pub on_collision: CollisionPolicy,
}

impl CompileOptions {
    /// Options matching `extension`, failing on key collisions.
    #[must_use]
    pub fn new(extension: impl Into<String>, recursive: bool) -> Self {
        Self {
            extension: extension.into(),
            recursive,
            on_collision: CollisionPolicy::default(),
        }
    }

    /// Set the collision policy.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.on_collision = policy;
        self
    }

    /// Reject extensions the matcher can never match.
    pub fn validate(&self) -> Result<(), CacheError> {
        key::validate_extension(&self.extension)
    }
}
