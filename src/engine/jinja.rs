//! Plain Jinja backend.
//!
//! Files are compiled verbatim with minijinja and rendered with HTML
//! auto-escaping. The default extension has two segments, so it only matches
//! files such as `page.html.j2`.

use std::io::Write;
use std::path::Path;

use super::{read_source, Engine, EngineError, EngineKind, Template};

/// Extension compiled by default.
pub const DEFAULT_EXTENSION: &str = ".html.j2";

/// Engine for `.html.j2` templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct JinjaEngine;

impl Engine for JinjaEngine {
    type Artifact = Template;

    fn name(&self) -> &'static str {
        EngineKind::Jinja.name()
    }

    fn default_extension(&self) -> &'static str {
        DEFAULT_EXTENSION
    }

    fn compile_file(&self, path: &Path) -> Result<Template, EngineError> {
        let source = read_source(path)?;
        Template::compile(EngineKind::Jinja, path.display().to_string(), source)
    }

    fn render(
        &self,
        out: &mut dyn Write,
        artifact: &Template,
        data: &serde_json::Value,
    ) -> Result<(), EngineError> {
        artifact.render_as(EngineKind::Jinja, out, data)
    }
}
