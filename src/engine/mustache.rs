//! Mustache backend.
//!
//! Templates are parsed with handlebars, which accepts mustache syntax:
//! `{{name}}` escapes HTML, `{{{name}}}` does not, and `{{#section}}` blocks
//! iterate lists or test values. Missing values render as empty strings.

use std::io::Write;
use std::path::Path;

use super::{read_source, Engine, EngineError, EngineKind, Template};

/// Extension compiled by default.
pub const DEFAULT_EXTENSION: &str = ".html.mustache";

/// Engine for `.html.mustache` templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MustacheEngine;

impl Engine for MustacheEngine {
    type Artifact = Template;

    fn name(&self) -> &'static str {
        EngineKind::Mustache.name()
    }

    fn default_extension(&self) -> &'static str {
        DEFAULT_EXTENSION
    }

    fn compile_file(&self, path: &Path) -> Result<Template, EngineError> {
        let source = read_source(path)?;
        Template::compile(EngineKind::Mustache, path.display().to_string(), source)
    }

    fn render(
        &self,
        out: &mut dyn Write,
        artifact: &Template,
        data: &serde_json::Value,
    ) -> Result<(), EngineError> {
        artifact.render_as(EngineKind::Mustache, out, data)
    }
}
