//! Render dispatch.
//!
//! Rendering looks the artifact up under the shared lock, releases the lock
//! and then hands artifact, data and output to the active engine. Output is
//! never cached; every call renders from the compiled artifact.

use std::io::Write;

use super::{CacheError, TemplateCache};

impl<A: Send + Sync> TemplateCache<A> {
    /// Render the template cached under `key` with `data` into `out`.
    ///
    /// # Errors
    ///
    /// - [`CacheError::NotFound`] if no template is cached under `key`;
    ///   nothing is written to `out`.
    /// - [`CacheError::Render`] wrapping the engine's error unchanged.
    pub fn render<W: Write>(
        &self,
        mut out: W,
        key: &str,
        data: &serde_json::Value,
    ) -> Result<(), CacheError> {
        let (engine, artifact) = self
            .lookup(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

        engine
            .render(&mut out, &artifact, data)
            .map_err(|source| CacheError::Render {
                key: key.to_string(),
                source,
            })
    }

    /// Render the template cached under `key` into a new string.
    pub fn render_to_string(
        &self,
        key: &str,
        data: &serde_json::Value,
    ) -> Result<String, CacheError> {
        let mut out = Vec::new();
        self.render(&mut out, key, data)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
