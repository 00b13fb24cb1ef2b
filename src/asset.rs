//! Asset references for template files and screenshots.
//!
//! A reference is classified once, when it is parsed, as either a local
//! filesystem path or a remote HTTP(S) URL. Downstream code matches on the
//! variant instead of re-inspecting string prefixes.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    Local(PathBuf),
    Remote(String),
}

impl AssetRef {
    pub fn parse(raw: &str) -> Self {
        if is_url(raw) {
            Self::Remote(raw.to_string())
        } else {
            Self::Local(PathBuf::from(raw))
        }
    }

    /// Resolves `relative` against this reference, treating it as a directory.
    pub fn join(&self, relative: &str) -> Self {
        if is_url(relative) {
            return Self::Remote(relative.to_string());
        }
        match self {
            Self::Local(root) => Self::Local(root.join(relative)),
            Self::Remote(base) => Self::Remote(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                relative.trim_start_matches('/')
            )),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Self::Local(path) => Some(path),
            Self::Remote(_) => None,
        }
    }

    /// Final path or URL segment, used for naming outputs.
    pub fn file_name(&self) -> String {
        match self {
            Self::Local(path) => path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
            Self::Remote(url) => {
                let trimmed = url.split(['?', '#']).next().unwrap_or(url);
                trimmed
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            }
        }
    }

    /// Reads the raw bytes behind the reference. HTTP error statuses are
    /// reported as failures, the same as transport errors.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Local(path) => {
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))
            }
            Self::Remote(url) => {
                debug!(url = %url, "fetching remote asset");
                let client = reqwest::blocking::Client::builder()
                    .timeout(FETCH_TIMEOUT)
                    .build()
                    .context("failed to build HTTP client")?;
                let response = client
                    .get(url)
                    .send()
                    .with_context(|| format!("failed to fetch {url}"))?
                    .error_for_status()
                    .with_context(|| format!("error fetching {url}"))?;
                let bytes = response
                    .bytes()
                    .with_context(|| format!("failed to read response body from {url}"))?;
                Ok(bytes.to_vec())
            }
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

impl From<PathBuf> for AssetRef {
    fn from(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

impl From<&Path> for AssetRef {
    fn from(path: &Path) -> Self {
        Self::Local(path.to_path_buf())
    }
}

fn is_url(raw: &str) -> bool {
    let lower = raw.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_once() {
        assert_eq!(
            AssetRef::parse("https://example.com/templates"),
            AssetRef::Remote("https://example.com/templates".into())
        );
        assert_eq!(
            AssetRef::parse("templates/local"),
            AssetRef::Local(PathBuf::from("templates/local"))
        );
        assert!(AssetRef::parse("HTTP://EXAMPLE.COM/x.png").is_remote());
    }

    #[test]
    fn join_handles_both_variants() {
        let remote = AssetRef::parse("https://example.com/templates/");
        assert_eq!(
            remote.join("phone/base.png"),
            AssetRef::Remote("https://example.com/templates/phone/base.png".into())
        );
        let local = AssetRef::parse("/srv/templates");
        assert_eq!(
            local.join("phone/base.png"),
            AssetRef::Local(PathBuf::from("/srv/templates/phone/base.png"))
        );
        assert_eq!(
            local.join("https://cdn.example.com/mask.png"),
            AssetRef::Remote("https://cdn.example.com/mask.png".into())
        );
    }

    #[test]
    fn file_name_strips_query() {
        let remote = AssetRef::parse("https://example.com/shots/home.png?raw=1");
        assert_eq!(remote.file_name(), "home.png");
        let local = AssetRef::parse("shots/home.png");
        assert_eq!(local.file_name(), "home.png");
    }

    #[test]
    fn missing_local_file_fails() {
        let missing = AssetRef::parse("/definitely/not/here.png");
        assert!(missing.read_bytes().is_err());
    }
}
