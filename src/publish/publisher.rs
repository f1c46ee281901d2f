//! Artifact tree upload
//!
//! Walks a local directory and mirrors every regular file under a key prefix.
//! Keys are a pure function of `(key_prefix, relative path)`, so re-running a
//! publish overwrites the same objects instead of duplicating them.

use super::key::object_key;
use super::store::{BucketHandle, ObjectStore};
use crate::core::error::{PublishError, ReleaseError, ReleaseResult};
use crate::ui::progress::UploadProgress;
use crate::utils::path_to_key;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One local file and the key it is published under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
  pub path: PathBuf,
  pub key: String,
}

/// Uploads artifact trees to an object store
pub struct ArtifactPublisher<'a, S: ObjectStore> {
  store: &'a S,
  show_progress: bool,
}

impl<'a, S: ObjectStore> ArtifactPublisher<'a, S> {
  pub fn new(store: &'a S) -> Self {
    Self {
      store,
      show_progress: false,
    }
  }

  /// Draw an upload progress bar on stderr (only when it is a terminal)
  pub fn with_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  /// Upload every regular file under `local_root`; returns the number uploaded
  ///
  /// The bucket is resolved before anything is transferred. Uploads run in
  /// parallel and the first failure stops further uploads; objects already
  /// written stay in place.
  pub fn publish(&self, local_root: &Path, bucket: &str, key_prefix: &str) -> ReleaseResult<usize> {
    let artifacts = plan_keys(local_root, key_prefix)?;

    let handle = self.store.resolve_bucket(bucket)?.ok_or_else(|| {
      ReleaseError::Publish(PublishError::BucketNotFound {
        bucket: bucket.to_string(),
      })
    })?;

    log::debug!("publishing {} files to bucket {}", artifacts.len(), handle.name);

    let progress = if self.show_progress {
      UploadProgress::new(artifacts.len(), format!("Uploading to {}", handle.name))
    } else {
      UploadProgress::hidden()
    };

    artifacts
      .par_iter()
      .try_for_each(|artifact| self.upload_one(&handle, artifact, &progress))?;

    Ok(artifacts.len())
  }

  fn upload_one(&self, bucket: &BucketHandle, artifact: &Artifact, progress: &UploadProgress) -> ReleaseResult<()> {
    log::info!("Uploading {} to {}", artifact.path.display(), artifact.key);

    self
      .store
      .upload(bucket, &artifact.key, &artifact.path)
      .map_err(|err| match err {
        ReleaseError::Publish(_) => err,
        other => ReleaseError::Publish(PublishError::UploadFailure {
          key: artifact.key.clone(),
          reason: other.to_string(),
        }),
      })?;

    progress.inc();
    Ok(())
  }
}

/// The deterministic `(file, key)` list for a publish, without uploading
///
/// Regular files only, sorted by path; directories and symlinks are skipped.
pub fn plan_keys(local_root: &Path, key_prefix: &str) -> ReleaseResult<Vec<Artifact>> {
  if !local_root.is_dir() {
    return Err(ReleaseError::Publish(PublishError::InvalidRoot {
      path: local_root.to_path_buf(),
    }));
  }

  let mut artifacts = Vec::new();
  for entry in WalkDir::new(local_root).follow_links(false).sort_by_file_name() {
    let entry = entry?;
    if !entry.file_type().is_file() {
      continue;
    }

    let relative = entry.path().strip_prefix(local_root)?;
    let rel_key = path_to_key(relative).ok_or_else(|| {
      ReleaseError::Publish(PublishError::InvalidKey {
        path: entry.path().to_path_buf(),
      })
    })?;

    artifacts.push(Artifact {
      path: entry.path().to_path_buf(),
      key: object_key(key_prefix, &rel_key),
    });
  }

  Ok(artifacts)
}
