//! The template cache handle.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::CacheError;
use crate::compiler::{CompileOptions, Walker};
use crate::engine::{Engine, EngineKind, Template};

/// Shared engine handle.
pub type SharedEngine<A> = Arc<dyn Engine<Artifact = A>>;

/// Engine and compiled templates, guarded together.
struct State<A: Send + Sync> {
    engine: SharedEngine<A>,
    entries: HashMap<String, Arc<A>>,
}

/// Concurrency-safe store of compiled templates.
///
/// One handle is usually created at startup and shared (by reference or in
/// an `Arc`) with every request handler. Reads take a shared lock; compile
/// commits, [`insert`](Self::insert), [`delete`](Self::delete),
/// [`clear`](Self::clear) and engine switches take the exclusive lock.
///
/// # Example
///
/// ```no_run
/// use steep::cache::TemplateCache;
/// use steep::engine::EngineKind;
///
/// let cache = TemplateCache::with_engine_kind(EngineKind::Html);
/// cache.compile("templates", &cache.default_options()).unwrap();
///
/// let mut page = Vec::new();
/// cache
///     .render(&mut page, "index", &serde_json::json!({"title": "Home"}))
///     .unwrap();
/// ```
pub struct TemplateCache<A: Send + Sync> {
    state: RwLock<State<A>>,
}

impl<A: Send + Sync> TemplateCache<A> {
    /// Create an empty cache rendering with `engine`.
    #[must_use]
    pub fn new(engine: SharedEngine<A>) -> Self {
        Self {
            state: RwLock::new(State {
                engine,
                entries: HashMap::new(),
            }),
        }
    }

    // Every critical section leaves the state consistent, so a panic in
    // another thread does not invalidate it.
    fn read(&self) -> RwLockReadGuard<'_, State<A>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State<A>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active engine.
    #[must_use]
    pub fn engine(&self) -> SharedEngine<A> {
        Arc::clone(&self.read().engine)
    }

    /// Replace the active engine.
    ///
    /// Cached templates are kept. Recompile or [`clear`](Self::clear) after
    /// switching, otherwise the new engine is asked to render artifacts it
    /// did not produce.
    pub fn set_engine(&self, engine: SharedEngine<A>) {
        let mut state = self.write();
        log::debug!(
            "Switching engine from {} to {}",
            state.engine.name(),
            engine.name()
        );
        state.engine = engine;
    }

    /// Options for the active engine: its default extension, recursive.
    #[must_use]
    pub fn default_options(&self) -> CompileOptions {
        CompileOptions::new(self.read().engine.default_extension(), true)
    }

    /// Compile `root` and replace the cache contents with the result.
    ///
    /// The directory is walked and compiled without holding the lock, so
    /// concurrent readers keep seeing the previous templates until the new
    /// map is swapped in. On error the cache is left untouched.
    ///
    /// Returns the number of compiled templates.
    pub fn compile(
        &self,
        root: impl AsRef<Path>,
        options: &CompileOptions,
    ) -> Result<usize, CacheError> {
        let root = root.as_ref();
        let engine = self.engine();
        log::info!(
            "Compiling {} templates under {}",
            options.extension,
            root.display()
        );

        let compiled = Walker::new(root, options.clone()).compile(engine.as_ref())?;
        let count = compiled.len();
        let entries = compiled
            .into_iter()
            .map(|(key, artifact)| (key, Arc::new(artifact)))
            .collect();

        let replaced = std::mem::replace(&mut self.write().entries, entries);
        log::debug!(
            "Replaced {} cached templates with {} from {}",
            replaced.len(),
            count,
            root.display()
        );
        Ok(count)
    }

    /// Compile `root` with [`default_options`](Self::default_options).
    pub fn compile_default(&self, root: impl AsRef<Path>) -> Result<usize, CacheError> {
        let options = self.default_options();
        self.compile(root, &options)
    }

    /// Compile `root`, panicking on failure.
    ///
    /// Intended for application startup, where a broken template tree should
    /// stop the process.
    ///
    /// # Panics
    ///
    /// Panics with the compile error message if [`compile`](Self::compile)
    /// fails.
    pub fn must_compile(&self, root: impl AsRef<Path>, options: &CompileOptions) -> usize {
        match self.compile(root, options) {
            Ok(count) => count,
            Err(e) => panic!("template compilation failed: {e}"),
        }
    }

    /// Cached template for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<A>> {
        self.read().entries.get(key).cloned()
    }

    /// Whether a template is cached under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().entries.contains_key(key)
    }

    /// Store `artifact` under `key`, returning the previous one.
    pub fn insert(&self, key: impl Into<String>, artifact: A) -> Option<Arc<A>> {
        self.write().entries.insert(key.into(), Arc::new(artifact))
    }

    /// Remove the template under `key`. Absent keys are a no-op.
    pub fn delete(&self, key: &str) -> Option<Arc<A>> {
        self.write().entries.remove(key)
    }

    /// Remove every template.
    pub fn clear(&self) {
        let mut state = self.write();
        log::debug!("Clearing {} cached templates", state.entries.len());
        state.entries = HashMap::new();
    }

    /// Copy of the current contents. Artifacts are shared, not cloned.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Arc<A>> {
        self.read().entries.clone()
    }

    /// Cached keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().entries.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of cached templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Engine and artifact for `key`, read under one lock.
    pub(super) fn lookup(&self, key: &str) -> Option<(SharedEngine<A>, Arc<A>)> {
        let state = self.read();
        let artifact = state.entries.get(key)?;
        Some((Arc::clone(&state.engine), Arc::clone(artifact)))
    }
}

impl TemplateCache<Template> {
    /// Create an empty cache using a built-in backend.
    #[must_use]
    pub fn with_engine_kind(kind: EngineKind) -> Self {
        Self::new(kind.engine())
    }

    /// Create an empty cache using the built-in backend called `name`.
    pub fn from_engine_name(name: &str) -> Result<Self, CacheError> {
        Ok(Self::with_engine_kind(EngineKind::from_name(name)?))
    }

    /// Switch to the built-in backend called `name`.
    ///
    /// The new engine's default extension is used by subsequent
    /// [`default_options`](Self::default_options) calls.
    pub fn select_engine(&self, name: &str) -> Result<EngineKind, CacheError> {
        let kind = EngineKind::from_name(name)?;
        self.set_engine(kind.engine());
        Ok(kind)
    }
}

impl Default for TemplateCache<Template> {
    fn default() -> Self {
        Self::with_engine_kind(EngineKind::default())
    }
}

impl<A: Send + Sync> fmt::Debug for TemplateCache<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("TemplateCache")
            .field("engine", &state.engine.name())
            .field("templates", &state.entries.len())
            .finish()
    }
}
