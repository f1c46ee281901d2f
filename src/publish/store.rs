//! Object storage backends
//!
//! The publisher talks to storage through `ObjectStore`. Uploads run on a
//! rayon pool, so stores must be `Sync`.

use crate::core::error::{PublishError, ReleaseError, ReleaseResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A bucket that exists at resolution time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketHandle {
  pub name: String,
  /// Backend-specific id (B2 bucket id, local directory path)
  pub id: String,
}

/// Storage that can resolve buckets by name and overwrite objects by key
pub trait ObjectStore: Sync {
  /// Look a bucket up by name; `None` if it does not exist
  fn resolve_bucket(&self, name: &str) -> ReleaseResult<Option<BucketHandle>>;

  /// Upload `file` as `key`, replacing any object with the same key
  fn upload(&self, bucket: &BucketHandle, key: &str, file: &Path) -> ReleaseResult<()>;
}

/// Directory-backed store: `<root>/<bucket>/<key>`
///
/// Buckets are existing sub-directories of `root`; they are never created
/// implicitly, matching a real bucket that has to be provisioned first.
#[derive(Debug, Clone)]
pub struct LocalStore {
  root: PathBuf,
}

impl LocalStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl ObjectStore for LocalStore {
  fn resolve_bucket(&self, name: &str) -> ReleaseResult<Option<BucketHandle>> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".." {
      return Ok(None);
    }

    let dir = self.root.join(name);
    if !dir.is_dir() {
      return Ok(None);
    }

    Ok(Some(BucketHandle {
      name: name.to_string(),
      id: dir.display().to_string(),
    }))
  }

  fn upload(&self, bucket: &BucketHandle, key: &str, file: &Path) -> ReleaseResult<()> {
    if key.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
      return Err(ReleaseError::Publish(PublishError::UploadFailure {
        key: key.to_string(),
        reason: "key is not a clean relative path".to_string(),
      }));
    }

    let dest = PathBuf::from(&bucket.id).join(key);
    let parent = dest
      .parent()
      .ok_or_else(|| ReleaseError::message(format!("No parent directory for {}", dest.display())))?;
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;

    // Copy to a sibling temp file, then rename: readers never see half an object
    let tmp = NamedTempFile::new_in(parent).with_context(|| format!("Failed to stage {}", key))?;
    fs::copy(file, tmp.path()).with_context(|| format!("Failed to copy {}", file.display()))?;
    tmp.persist(&dest)?;

    Ok(())
  }
}
