//! Expands command-line paths into the list of images to analyze.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

/// Options controlling directory scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional override for allowed extensions (lowercase, without dot).
    pub exts: Option<Vec<&'static str>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            exts: None,
        }
    }
}

/// Return `true` if `path` has an allowed image extension.
#[must_use]
pub fn is_supported_image(path: &Path, exts: Option<&[&str]>) -> bool {
    let default_exts: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
    let exts = exts.unwrap_or(default_exts);
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| *e == ext)
        })
}

/// Collect images from `paths`. Files are kept when their extension is
/// supported; directories are walked. The result is sorted and deduplicated.
///
/// # Errors
/// Returns [`Error::BadPath`] if any path does not exist, or [`Error::Io`] if a
/// directory cannot be read.
pub fn collect_images(paths: &[PathBuf], opts: &ScanOptions) -> Result<Vec<PathBuf>, Error> {
    let bad: Vec<_> = paths.iter().filter(|p| !p.exists()).collect();
    if !bad.is_empty() {
        let joined = bad
            .iter()
            .map(|p| p.to_string_lossy())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::BadPath(joined));
    }

    let mut out = Vec::new();
    for root in paths {
        if root.is_file() {
            if is_supported_image(root, opts.exts.as_deref()) {
                out.push(root.clone());
            }
            continue;
        }

        let mut wd = WalkDir::new(root);
        if !opts.recursive {
            wd = wd.max_depth(1);
        }
        for entry in wd.into_iter().filter_entry(|e| !should_skip_dir(e)) {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if entry.file_type().is_file() && is_supported_image(path, opts.exts.as_deref()) {
                out.push(path.to_path_buf());
            }
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}
