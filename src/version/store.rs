//! The version file: single source of truth for "what version is this build"

use super::model::Version;
use crate::core::error::{ReleaseResult, ResultExt, VersionError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default version file name at the repository root
pub const DEFAULT_VERSION_FILE: &str = "version.txt";

/// Plain-text file holding one version line
#[derive(Debug, Clone)]
pub struct VersionFile {
  path: PathBuf,
}

impl VersionFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Read and parse the persisted version
  pub fn read(&self) -> ReleaseResult<Version> {
    let text = match fs::read_to_string(&self.path) {
      Ok(text) => text,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(
          VersionError::MissingVersionFile {
            path: self.path.clone(),
          }
          .into(),
        );
      }
      Err(e) => {
        return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
      }
    };

    let version = Version::parse(&text)?;
    log::debug!("read version {} from {}", version, self.path.display());
    Ok(version)
  }

  /// Replace the file content with `version`
  ///
  /// Writes a sibling temp file and renames it over the target, so readers
  /// see either the old or the new content, never a mix. The target keeps
  /// its permissions.
  pub fn write(&self, version: &Version) -> ReleaseResult<()> {
    let dir = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
      .with_context(|| format!("Failed to create temp file next to {}", self.path.display()))?;
    tmp
      .write_all(version.to_string().as_bytes())
      .with_context(|| format!("Failed to write {}", self.path.display()))?;
    tmp
      .as_file()
      .sync_all()
      .with_context(|| format!("Failed to sync {}", self.path.display()))?;
    if let Ok(existing) = fs::metadata(&self.path) {
      tmp
        .as_file()
        .set_permissions(existing.permissions())
        .with_context(|| format!("Failed to copy permissions of {}", self.path.display()))?;
    }
    tmp.persist(&self.path)?;

    log::debug!("wrote version {} to {}", version, self.path.display());
    Ok(())
  }
}
