//! Directory walker that compiles every matching template.
//!
//! # Overview
//!
//! [`Walker::compile`] traverses the root depth-first with [`walkdir`],
//! compiles each file whose full extension matches, and returns the complete
//! key → artifact map. The walk is all-or-nothing: the first listing error,
//! compile error or key collision (under [`CollisionPolicy::Error`]) aborts it
//! and no partial map is returned.
//!
//! Sibling order follows the directory listing and is not sorted.
//!
//! # Example
//!
//! ```no_run
//! use steep::compiler::{CompileOptions, Walker};
//! use steep::engine::JinjaEngine;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("templates"), CompileOptions::new(".html.j2", false));
//! for key in walker.compile(&JinjaEngine).unwrap().keys() {
//!     println!("{key}");
//! }
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::key::template_key;
use super::{CollisionPolicy, CompileOptions};
use crate::cache::CacheError;
use crate::engine::Engine;

/// Walks one template root.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root directory to compile
    root: PathBuf,
    /// Matching and recursion options
    options: CompileOptions,
}

impl Walker {
    /// Create a walker for `root`.
    #[must_use]
    pub fn new(root: &Path, options: CompileOptions) -> Self {
        Self {
            root: root.to_path_buf(),
            options,
        }
    }

    /// Compile every matching file under the root with `engine`.
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidExtension`] for an unusable extension
    /// - [`CacheError::Filesystem`] / [`CacheError::NotADirectory`] when the
    ///   root or a subdirectory cannot be listed
    /// - [`CacheError::Compile`] when the engine rejects a file
    /// - [`CacheError::InvalidPath`] for a matching path that is not UTF-8
    /// - [`CacheError::KeyCollision`] for duplicate keys under
    ///   [`CollisionPolicy::Error`]
    pub fn compile<E>(&self, engine: &E) -> Result<HashMap<String, E::Artifact>, CacheError>
    where
        E: Engine + ?Sized,
    {
        self.options.validate()?;
        self.check_root()?;

        let max_depth = if self.options.recursive { usize::MAX } else { 1 };
        let walk = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false);

        let mut compiled = HashMap::new();
        let mut origins: HashMap<String, PathBuf> = HashMap::new();

        for entry in walk {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let relative = path
                .strip_prefix(&self.root)
                .map_err(|_| CacheError::InvalidPath(path.to_path_buf()))?;
            let Some(key) = template_key(relative, &self.options.extension)? else {
                log::trace!("Skipping non-matching file: {}", path.display());
                continue;
            };

            log::trace!("Compiling {} as '{}'", path.display(), key);
            let artifact = engine
                .compile_file(path)
                .map_err(|source| CacheError::Compile {
                    path: path.to_path_buf(),
                    source,
                })?;

            match origins.entry(key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(path.to_path_buf());
                }
                Entry::Occupied(mut slot) => match self.options.on_collision {
                    CollisionPolicy::Error => {
                        return Err(CacheError::KeyCollision {
                            key,
                            first: slot.get().clone(),
                            second: path.to_path_buf(),
                        });
                    }
                    CollisionPolicy::LastWriteWins => {
                        log::warn!(
                            "Key '{}' from {} replaces {}",
                            key,
                            path.display(),
                            slot.get().display()
                        );
                        slot.insert(path.to_path_buf());
                    }
                },
            }
            compiled.insert(key, artifact);
        }

        log::debug!(
            "Compiled {} templates under {} with the {} engine",
            compiled.len(),
            self.root.display(),
            engine.name()
        );
        Ok(compiled)
    }

    /// The root must be an existing directory.
    fn check_root(&self) -> Result<(), CacheError> {
        let metadata = std::fs::metadata(&self.root).map_err(|source| CacheError::Filesystem {
            path: self.root.clone(),
            source,
        })?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(CacheError::NotADirectory(self.root.clone()))
        }
    }

    /// Convert a walkdir error into a filesystem error.
    fn walk_error(&self, err: walkdir::Error) -> CacheError {
        let path = err
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        CacheError::Filesystem { path, source }
    }
}
