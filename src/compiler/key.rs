//! Extension matching and key derivation.
//!
//! # Extension policy
//!
//! The *full extension* of a file name starts at its first `.`, ignoring a
//! leading dot. A file matches only when its full extension equals the
//! configured extension exactly:
//!
//! | File name       | Full extension | Matches `.html` |
//! |-----------------|----------------|-----------------|
//! | `index.html`    | `.html`        | yes             |
//! | `index.en.html` | `.en.html`     | no              |
//! | `page.html.j2`  | `.html.j2`     | no              |
//! | `.hidden.html`  | `.html`        | yes             |
//! | `README`        | none           | no              |
//!
//! # Keys
//!
//! A key is the file's path relative to the compile root with the full
//! extension removed. Components are joined with `/` on every platform and
//! the result is NFC-normalized, so `more/test3.html` always yields
//! `more/test3`.
//!
//! ```
//! use steep::compiler::key::{full_extension, template_key};
//! use std::path::Path;
//!
//! assert_eq!(full_extension("index.en.html"), Some(".en.html"));
//! assert_eq!(
//!     template_key(Path::new("more/more/test4.html"), ".html").unwrap(),
//!     Some("more/more/test4".to_string())
//! );
//! ```

use std::path::{Component, Path};

use unicode_normalization::UnicodeNormalization;

use crate::cache::CacheError;

/// Separator between key components.
pub const KEY_SEPARATOR: char = '/';

/// Everything from the first `.` after the first character, if any.
#[must_use]
pub fn full_extension(file_name: &str) -> Option<&str> {
    let first = file_name.chars().next()?;
    let offset = first.len_utf8();
    file_name[offset..]
        .find('.')
        .map(|i| &file_name[offset + i..])
}

/// Whether `file_name` has exactly `extension` as its full extension.
#[must_use]
pub fn matches_extension(file_name: &str, extension: &str) -> bool {
    full_extension(file_name) == Some(extension)
}

/// Check that `extension` can be matched by [`full_extension`].
pub fn validate_extension(extension: &str) -> Result<(), CacheError> {
    let valid = extension.len() > 1
        && extension.starts_with('.')
        && !extension.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidExtension(extension.to_string()))
    }
}

/// Derive the key of a file from its path relative to the compile root.
///
/// Returns `Ok(None)` when the file does not match `extension`, and
/// [`CacheError::InvalidPath`] when a matching path is not valid UTF-8 or
/// is not a plain relative path.
pub fn template_key(relative: &Path, extension: &str) -> Result<Option<String>, CacheError> {
    let Some(file_name) = relative.file_name() else {
        return Ok(None);
    };
    if !matches_extension(&file_name.to_string_lossy(), extension) {
        return Ok(None);
    }

    let invalid = || CacheError::InvalidPath(relative.to_path_buf());
    let mut key = String::new();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            return Err(invalid());
        };
        let part = part.to_str().ok_or_else(invalid)?;
        if !key.is_empty() {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(part);
    }

    key.truncate(key.len() - extension.len());
    Ok(Some(key.nfc().collect()))
}
