//! Static frontend assets

use crate::error::{IoResultExt, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File served from the asset tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    /// Content-Type derived from the extension
    pub content_type: &'static str,
    /// File contents
    pub body: Vec<u8>,
}

/// Asset tree rooted at the frontend directory
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Serve files below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path to a file below the root. Returns `None` for paths
    /// that try to leave the root.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode(url_path);
        let mut path = self.root.clone();

        for segment in decoded.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.contains('\\') || s.contains('\0') => return None,
                s => path.push(s),
            }
        }

        if path.is_dir() {
            path.push("index.html");
        }
        Some(path)
    }

    /// Read the file behind a URL path; `Ok(None)` when it does not exist
    pub fn load(&self, url_path: &str) -> Result<Option<StaticFile>> {
        let Some(path) = self.resolve(url_path) else {
            return Ok(None);
        };

        if !path.is_file() {
            return Ok(None);
        }

        match fs::read(&path) {
            Ok(body) => Ok(Some(StaticFile {
                content_type: content_type_for(&path),
                body,
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_path(&path),
        }
    }
}

/// Content-Type by file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Percent-decode a URL path. Malformed escapes are kept as-is and invalid
/// UTF-8 is replaced.
fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}
