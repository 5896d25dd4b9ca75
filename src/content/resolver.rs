//! Mapping request targets onto the sandbox.
//!
//! Containment is strict: a target whose `..` segments climb above `/`, or
//! whose canonical form (symlinks resolved) lands outside the sandbox root,
//! is rejected with [`ResolveError::Escape`] and never classified.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("target {target:?} resolves outside the sandbox root")]
    Escape { target: String },
}

/// What a resolved path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    /// Nothing exists at the path
    Missing,
    /// Devices, sockets, fifos, symlink loops and unreadable paths
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Target exactly as received
    pub target: String,
    /// Normalized form relative to the sandbox root, empty for the root itself
    pub relative: String,
    /// Filesystem path under the sandbox root; canonical unless `kind` is
    /// `Missing` or `Other`
    pub absolute: PathBuf,
    pub kind: PathKind,
}

/// The read-only root every request is served from.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Canonicalizes `root`. Fails if it does not exist.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn resolve(&self, target: &str) -> Result<ResolvedPath, ResolveError> {
        let escape = || ResolveError::Escape {
            target: target.to_string(),
        };

        let decoded = url_decode(target);
        let relative = normalize_target(&decoded).ok_or_else(escape)?;
        let joined = if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&relative)
        };

        let (absolute, kind) = match tokio::fs::canonicalize(&joined).await {
            Ok(canonical) => {
                if !canonical.starts_with(&self.root) {
                    return Err(escape());
                }
                let kind = match tokio::fs::metadata(&canonical).await {
                    Ok(meta) if meta.is_file() => PathKind::File,
                    Ok(meta) if meta.is_dir() => PathKind::Directory,
                    Ok(_) => PathKind::Other,
                    Err(e) if e.kind() == ErrorKind::NotFound => PathKind::Missing,
                    Err(_) => PathKind::Other,
                };
                (canonical, kind)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => (joined, PathKind::Missing),
            Err(e) => {
                tracing::debug!(path = %joined.display(), error = %e, "cannot canonicalize");
                (joined, PathKind::Other)
            }
        };

        Ok(ResolvedPath {
            target: target.to_string(),
            relative,
            absolute,
            kind,
        })
    }
}

/// Decodes `%XX` escapes. Malformed escapes pass through untouched and
/// invalid UTF-8 is replaced.
pub fn url_decode(target: &str) -> String {
    let url = target.as_bytes();
    let mut decoded = Vec::with_capacity(url.len());
    let mut i = 0;
    while i < url.len() {
        let c = url[i];
        if c == b'%'
            && i + 2 < url.len()
            && url[i + 1].is_ascii_hexdigit()
            && url[i + 2].is_ascii_hexdigit()
        {
            decoded.push(hex_to_digit(url[i + 1]) * 16 + hex_to_digit(url[i + 2]));
            i += 3;
        } else {
            decoded.push(c);
            i += 1;
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_to_digit(hex: u8) -> u8 {
    match hex {
        b'A'..=b'F' => hex - b'A' + 10,
        b'a'..=b'f' => hex - b'a' + 10,
        _ => hex - b'0',
    }
}

/// Resolves `//`, `/./` and `/../` in a target.
///
/// Returns the segments joined by `/` with no leading slash, or `None` if
/// the target does not start with `/` or climbs above the root.
pub fn normalize_target(target: &str) -> Option<String> {
    let rest = target.strip_prefix('/')?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s => segments.push(s),
        }
    }

    Some(segments.join("/"))
}
