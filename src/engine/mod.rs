//! Pluggable template engines.
//!
//! An [`Engine`] knows how to turn one source file into a compiled artifact
//! and how to render such an artifact with data. The cache never looks inside
//! artifacts; it only stores them by key and hands them back to the engine.
//!
//! # Built-in backends
//!
//! | Name    | Default extension | Backend |
//! |---------|-------------------|---------|
//! | `html`  | `.html`           | [`HtmlEngine`]: include macros + minijinja |
//! | `jinja` | `.html.j2`        | [`JinjaEngine`]: plain minijinja |
//! | `mustache` | `.html.mustache` | [`MustacheEngine`]: mustache syntax via handlebars |
//!
//! All three produce [`Template`] artifacts tagged with the [`EngineKind`] that
//! compiled them. Use [`EngineKind::from_name`] to look a backend up by name.
//!
//! # Switching engines
//!
//! Changing the active engine of a cache does not touch artifacts that are
//! already cached. If a cache is recompiled with one engine, then switched to
//! another without recompiling or clearing, renders go to an engine that did
//! not produce the artifact. The built-in backends detect this and return
//! [`EngineError::ArtifactMismatch`]; third-party engines should do the same.

pub mod html;
pub mod jinja;
pub mod mustache;

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use handlebars::Handlebars;
use minijinja::{AutoEscape, Environment};
use serde::{Deserialize, Serialize};

pub use html::HtmlEngine;
pub use jinja::JinjaEngine;
pub use mustache::MustacheEngine;

/// Capability contract every template backend implements.
///
/// Implementations must be shareable between threads: the cache hands the
/// same engine to concurrent compile and render calls.
pub trait Engine: Send + Sync {
    /// Compiled form of a single template.
    type Artifact: Send + Sync;

    /// Registry name of the backend (e.g. `"html"`).
    fn name(&self) -> &'static str;

    /// Extension compiled when the caller does not pick one.
    fn default_extension(&self) -> &'static str;

    /// Compile the file at `path` into an artifact.
    fn compile_file(&self, path: &Path) -> Result<Self::Artifact, EngineError>;

    /// Render `artifact` with `data` into `out`.
    fn render(
        &self,
        out: &mut dyn Write,
        artifact: &Self::Artifact,
        data: &serde_json::Value,
    ) -> Result<(), EngineError>;
}

/// Errors reported by template backends.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// The template source could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file referenced by an include macro could not be read.
    #[error("cannot include {include} from {path}: {source}")]
    Include {
        /// Template containing the include macro
        path: PathBuf,
        /// Path of the included file as resolved on disk
        include: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Syntax error at compile time or evaluation error at render time.
    #[error(transparent)]
    Template(#[from] minijinja::Error),

    /// Syntax error in a mustache template.
    #[error(transparent)]
    MustacheSyntax(#[from] handlebars::TemplateError),

    /// Evaluation error while rendering a mustache template.
    #[error(transparent)]
    MustacheRender(#[from] handlebars::RenderError),

    /// The artifact was produced by a different engine.
    #[error("template compiled by the {found} engine cannot be rendered by the {expected} engine")]
    ArtifactMismatch {
        /// Engine asked to render
        expected: EngineKind,
        /// Engine that compiled the artifact
        found: EngineKind,
    },

    /// Failure reported by a third-party backend.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Identifiers of the built-in backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Include-macro HTML templates.
    #[default]
    Html,
    /// Plain Jinja templates.
    Jinja,
    /// Mustache templates.
    Mustache,
}

/// An unrecognized engine name, with the closest registered name if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEngine {
    /// Name as given by the caller
    pub name: String,
    /// Closest registered name, when similar enough to be a likely typo
    pub suggestion: Option<&'static str>,
}

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

impl EngineKind {
    /// Every registered backend, in registry order.
    pub const ALL: [EngineKind; 3] = [EngineKind::Html, EngineKind::Jinja, EngineKind::Mustache];

    /// Registry name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Jinja => "jinja",
            Self::Mustache => "mustache",
        }
    }

    /// Default file extension compiled by this backend.
    #[must_use]
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Html => html::DEFAULT_EXTENSION,
            Self::Jinja => jinja::DEFAULT_EXTENSION,
            Self::Mustache => mustache::DEFAULT_EXTENSION,
        }
    }

    /// Look a backend up by name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, UnknownEngine> {
        let wanted = name.trim().to_ascii_lowercase();
        if let Some(kind) = Self::ALL.into_iter().find(|k| k.name() == wanted) {
            return Ok(kind);
        }

        let suggestion = Self::ALL
            .into_iter()
            .map(|k| (k.name(), strsim::jaro_winkler(&wanted, k.name())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(n, _)| n);

        Err(UnknownEngine {
            name: name.to_string(),
            suggestion,
        })
    }

    /// Instantiate the backend.
    #[must_use]
    pub fn engine(self) -> Arc<dyn Engine<Artifact = Template>> {
        match self {
            Self::Html => Arc::new(HtmlEngine),
            Self::Jinja => Arc::new(JinjaEngine),
            Self::Mustache => Arc::new(MustacheEngine),
        }
    }

    /// Comma-separated list of registered names, for messages.
    #[must_use]
    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for UnknownEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "engine '{}' is not supported (supported: {})",
            self.name,
            EngineKind::supported_names()
        )?;
        if let Some(suggestion) = self.suggestion {
            write!(f, "; did you mean '{}'?", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for UnknownEngine {}

/// Compiled template produced by the built-in backends.
///
/// Carries the backend that compiled it so a mismatched render is caught
/// instead of silently misinterpreted.
#[derive(Debug, Clone)]
pub struct Template {
    kind: EngineKind,
    name: String,
    source: String,
    compiled: Compiled,
}

/// Parsed form, by template language.
#[derive(Debug, Clone)]
enum Compiled {
    Jinja(Environment<'static>),
    Mustache(Handlebars<'static>),
}

impl Template {
    /// Parse `source` under `name` for the given backend.
    ///
    /// Syntax errors surface here rather than at render time.
    pub fn compile(
        kind: EngineKind,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        let source = source.into();

        let compiled = match kind {
            EngineKind::Html | EngineKind::Jinja => {
                let mut env = Environment::new();
                env.set_auto_escape_callback(|_| AutoEscape::Html);
                env.add_template_owned(name.clone(), source.clone())?;
                Compiled::Jinja(env)
            }
            EngineKind::Mustache => {
                // Escapes HTML by default; missing values render empty
                let mut registry = Handlebars::new();
                registry.register_template_string(&name, &source)?;
                Compiled::Mustache(registry)
            }
        };

        Ok(Self {
            kind,
            name,
            source,
            compiled,
        })
    }

    /// Backend that compiled this template.
    #[must_use]
    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Template name (the source path).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source after preprocessing.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render on behalf of `engine`, rejecting artifacts from other backends.
    pub(crate) fn render_as(
        &self,
        engine: EngineKind,
        out: &mut dyn Write,
        data: &serde_json::Value,
    ) -> Result<(), EngineError> {
        if self.kind != engine {
            return Err(EngineError::ArtifactMismatch {
                expected: engine,
                found: self.kind,
            });
        }
        match &self.compiled {
            Compiled::Jinja(env) => {
                env.get_template(&self.name)?.render_to_write(data, out)?;
            }
            Compiled::Mustache(registry) => {
                registry.render_to_write(&self.name, data, out)?;
            }
        }
        Ok(())
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name && self.source == other.source
    }
}

impl Eq for Template {}

/// Read a template source into memory.
pub(crate) fn read_source(path: &Path) -> Result<String, EngineError> {
    std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}
