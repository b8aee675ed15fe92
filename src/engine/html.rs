//! HTML backend with include macros.
//!
//! Templates are minijinja templates with one extra macro that is expanded
//! before parsing:
//!
//! ```text
//! {{ include "header.html" "nav.html" }}
//! ```
//!
//! Each listed file is read relative to the including template and inlined
//! in place of the macro. Expansion is one level deep: macros inside an
//! included file are left as written. Blank lines are dropped from both the
//! template and the included files, and inlined fragments are trimmed.

use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{read_source, Engine, EngineError, EngineKind, Template};

/// Extension compiled by default.
pub const DEFAULT_EXTENSION: &str = ".html";

static INCLUDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*include\s+([^}]+?)\s*\}\}").expect("include pattern is valid")
});

/// Engine for `.html` templates with include macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEngine;

impl Engine for HtmlEngine {
    type Artifact = Template;

    fn name(&self) -> &'static str {
        EngineKind::Html.name()
    }

    fn default_extension(&self) -> &'static str {
        DEFAULT_EXTENSION
    }

    fn compile_file(&self, path: &Path) -> Result<Template, EngineError> {
        let source = drop_blank_lines(&read_source(path)?);
        let expanded = expand_includes(&source, path)?;
        Template::compile(EngineKind::Html, path.display().to_string(), expanded)
    }

    fn render(
        &self,
        out: &mut dyn Write,
        artifact: &Template,
        data: &serde_json::Value,
    ) -> Result<(), EngineError> {
        artifact.render_as(EngineKind::Html, out, data)
    }
}

/// Replace every include macro in `source` with the files it names.
///
/// `path` is the template being compiled; includes resolve against its
/// directory.
pub fn expand_includes(source: &str, path: &Path) -> Result<String, EngineError> {
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let mut expanded = String::with_capacity(source.len());
    let mut last = 0;

    for captures in INCLUDE_PATTERN.captures_iter(source) {
        let (Some(whole), Some(targets)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        push_fragment(&mut expanded, &source[last..whole.start()]);

        for target in include_targets(targets.as_str()) {
            let include = base.join(target);
            let contents =
                std::fs::read_to_string(&include).map_err(|source| EngineError::Include {
                    path: path.to_path_buf(),
                    include: include.clone(),
                    source,
                })?;
            log::trace!("Inlining {} into {}", include.display(), path.display());
            push_fragment(&mut expanded, &drop_blank_lines(&contents));
        }

        last = whole.end();
    }

    push_fragment(&mut expanded, &source[last..]);
    Ok(expanded)
}

/// File names listed in one macro, quotes removed.
fn include_targets(list: &str) -> impl Iterator<Item = &str> {
    list.split_whitespace()
        .map(|t| t.trim_matches(|c| c == '"' || c == '\''))
        .filter(|t| !t.is_empty())
}

fn push_fragment(out: &mut String, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push_str(fragment);
        out.push('\n');
    }
}

fn drop_blank_lines(text: &str) -> String {
    let mut kept = String::with_capacity(text.len());
    for line in text.lines().filter(|l| !l.is_empty()) {
        kept.push_str(line);
        kept.push('\n');
    }
    kept
}
