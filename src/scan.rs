//! Expanding command-line inputs into the screenshots to process.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::asset::AssetRef;

const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Return `true` if `path` has an extension the decoder handles.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTS.iter().any(|e| *e == ext)
        })
}

/// Turns raw inputs into screenshot references, in input order.
///
/// Files are kept whatever their extension, directories contribute their
/// supported images (sorted, hidden sub-directories skipped) and URLs pass
/// through untouched. Glob patterns the shell left alone are expanded here and
/// their matches classified the same way. Anything else is logged and dropped.
pub fn expand_inputs(inputs: &[String]) -> Vec<AssetRef> {
    let mut out = Vec::new();
    for raw in inputs {
        match AssetRef::parse(raw) {
            remote @ AssetRef::Remote(_) => out.push(remote),
            AssetRef::Local(path) if !path.exists() && is_pattern(raw) => {
                let matches = expand_pattern(raw);
                if matches.is_empty() {
                    warn!("no screenshots match {raw}");
                }
                debug!(pattern = %raw, matched = matches.len(), "expanded glob");
                for path in matches {
                    push_local(&mut out, path);
                }
            }
            AssetRef::Local(path) => push_local(&mut out, path),
        }
    }
    out
}

fn push_local(out: &mut Vec<AssetRef>, path: PathBuf) {
    if path.is_file() {
        out.push(AssetRef::Local(path));
    } else if path.is_dir() {
        let before = out.len();
        out.extend(scan_dir(&path).into_iter().map(AssetRef::Local));
        debug!(dir = %path.display(), found = out.len() - before, "scanned directory");
    } else {
        warn!("screenshot not found: {}", path.display());
    }
}

fn is_pattern(raw: &str) -> bool {
    raw.contains(['*', '?', '['])
}

fn expand_pattern(pattern: &str) -> Vec<PathBuf> {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(err) => {
            warn!("invalid pattern {pattern}: {err}");
            return Vec::new();
        }
    };
    let mut matches: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                debug!("skipping unreadable match: {err}");
                None
            }
        })
        .collect();
    matches.sort();
    matches
}

fn scan_dir(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !should_skip_dir(e))
        .flatten()
        .filter(|entry| entry.file_type().is_file() && is_supported_image(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
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
