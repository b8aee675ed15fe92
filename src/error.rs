//! Structured error handling and exit codes.

use serde::Serialize;

use crate::cache::CacheError;
use crate::config::ConfigError;

/// Exit codes for the steep binary.
///
/// - 0: Success
/// - 1: General error (unexpected failure, unreadable input)
/// - 2: Configuration error (unknown engine, bad extension, bad config file)
/// - 3: Compile error (unreadable template tree, template syntax, key collision)
/// - 4: Template not found
/// - 5: Render error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Configuration error: the configuration cannot be used.
    ConfigError = 2,
    /// Compile error: the template tree could not be compiled.
    CompileError = 3,
    /// Not found: the requested template is not in the cache.
    NotFound = 4,
    /// Render error: the engine failed to render a template.
    RenderError = 5,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "ST000",
            Self::GeneralError => "ST001",
            Self::ConfigError => "ST002",
            Self::CompileError => "ST003",
            Self::NotFound => "ST004",
            Self::RenderError => "ST005",
        }
    }

    /// Classify an application error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(cache_err) = err.downcast_ref::<CacheError>() {
            return match cache_err {
                CacheError::UnsupportedEngine(_) | CacheError::InvalidExtension(_) => {
                    Self::ConfigError
                }
                CacheError::Filesystem { .. }
                | CacheError::NotADirectory(_)
                | CacheError::Compile { .. }
                | CacheError::InvalidPath(_)
                | CacheError::KeyCollision { .. } => Self::CompileError,
                CacheError::NotFound(_) => Self::NotFound,
                CacheError::Render { .. } => Self::RenderError,
            };
        }
        if err.downcast_ref::<ConfigError>().is_some() {
            return Self::ConfigError;
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "ST003")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Messages of the underlying causes, outermost first
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}
