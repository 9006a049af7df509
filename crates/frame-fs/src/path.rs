//! Package-relative path handling
//!
//! Driver packages reference their payload with paths relative to the
//! directory holding the `INSTALL` manifest. Those references come from
//! untrusted archives, so they are validated before anything touches disk.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A validated path relative to a package root.
///
/// Internally stored with forward slashes, without `.` or empty segments.
/// Construction rejects absolute paths and any text containing `..`, so a
/// `PackagePath` can never name something above the root it is joined to
/// (symlinks aside, see [`PackagePath::contained_in`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackagePath {
    inner: String,
}

impl PackagePath {
    /// Validate a raw manifest reference.
    ///
    /// Any occurrence of `..` is rejected, whole segment or not, so
    /// `foo..bar` fails along with `../x` and `..\\x`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::unsafe_path(raw, "path is empty"));
        }
        if is_absolute_marker(raw) {
            return Err(Error::unsafe_path(raw, "absolute paths are not allowed"));
        }
        if raw.contains("..") {
            return Err(Error::unsafe_path(raw, "'..' is not allowed"));
        }

        let normalized = raw.replace('\\', "/");
        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(Error::unsafe_path(raw, "path has no file component"));
        }

        Ok(Self {
            inner: segments.join("/"),
        })
    }

    /// Get the normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a relative platform-native PathBuf.
    pub fn to_native(&self) -> PathBuf {
        self.inner.split('/').collect()
    }

    /// The last segment.
    pub fn file_name(&self) -> &str {
        self.inner.rsplit('/').next().unwrap_or(&self.inner)
    }

    /// Join onto `root` and verify the canonical result stays under the
    /// canonical `root`.
    ///
    /// Catches symlinks inside a package pointing elsewhere. The target must
    /// exist, since canonicalization resolves it.
    pub fn contained_in(&self, root: &Path) -> Result<PathBuf> {
        let joined = root.join(self.to_native());
        let canonical_root = dunce::canonicalize(root).map_err(|e| Error::io(root, e))?;
        let canonical = dunce::canonicalize(&joined).map_err(|e| Error::io(&joined, e))?;

        if !canonical.starts_with(&canonical_root) || canonical == canonical_root {
            return Err(Error::unsafe_path(
                self.inner.clone(),
                format!("resolves outside the package root ({})", canonical.display()),
            ));
        }
        Ok(joined)
    }
}

impl std::fmt::Display for PackagePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

fn is_absolute_marker(raw: &str) -> bool {
    if raw.starts_with('/') || raw.starts_with('\\') {
        return true;
    }
    // Drive-letter prefixes such as `C:` or `C:\`
    let mut chars = raw.chars();
    matches!((chars.next(), chars.next()), (Some(c), Some(':')) if c.is_ascii_alphabetic())
        || Path::new(raw).is_absolute()
}

/// Flatten a name into a single path component.
///
/// Any embedded separator becomes `_`, so two sources that differ only by
/// directory cannot land on a nested path inside a driver directory.
pub fn flatten_file_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// `path` with `suffix` appended to its file name (`config.txt` -> `config.txt.old`).
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Validate that `value` is usable as a single directory name.
///
/// Returns a human-readable message prefixed with `label` on failure.
pub fn validate_path_identifier(value: &str, label: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err(format!("{label} must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(format!("{label} '{value}' is not a valid name"));
    }
    if value.contains(['/', '\\']) {
        return Err(format!("{label} '{value}' must not contain path separators"));
    }
    if value.chars().any(char::is_control) {
        return Err(format!("{label} '{value}' must not contain control characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_dot_segments() {
        let path = PackagePath::parse("./a//b/./c.txt").unwrap();
        assert_eq!(path.as_str(), "a/b/c.txt");
        assert_eq!(path.file_name(), "c.txt");
    }

    #[test]
    fn test_parse_normalizes_backslashes() {
        let path = PackagePath::parse("a\\b.dtbo").unwrap();
        assert_eq!(path.as_str(), "a/b.dtbo");
    }

    #[test]
    fn test_parse_rejects_only_dots() {
        assert!(PackagePath::parse("./.").is_err());
    }

    #[test]
    fn test_double_dot_inside_file_name_rejected() {
        let err = PackagePath::parse("overlays/foo..bar.dtbo").unwrap_err();
        assert!(matches!(err, Error::UnsafePath { .. }));
    }

    #[test]
    fn test_sibling_with_suffix() {
        let sibling = sibling_with_suffix(Path::new("/boot/config.txt"), ".original");
        assert_eq!(sibling, PathBuf::from("/boot/config.txt.original"));
    }

    #[test]
    fn test_flatten_file_name() {
        assert_eq!(flatten_file_name("a/b\\c.txt"), "a_b_c.txt");
        assert_eq!(flatten_file_name("plain.txt"), "plain.txt");
    }

    #[test]
    fn test_validate_path_identifier() {
        assert!(validate_path_identifier("waveshare-35a", "Driver name").is_ok());
        assert!(validate_path_identifier("", "Driver name").is_err());
        assert!(validate_path_identifier("..", "Driver name").is_err());
        assert!(validate_path_identifier("a/b", "Driver name").is_err());

        let msg = validate_path_identifier("", "Driver name").unwrap_err();
        assert!(msg.starts_with("Driver name"));
    }
}
