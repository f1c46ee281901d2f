//! Publish command: upload packaged artifacts to object storage

use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::publish::{ArtifactPublisher, B2Store, KeyPrefix, LocalStore, ObjectStore, PlatformClassifier, plan_keys};
use std::path::PathBuf;

/// Arguments of `release-rail publish`
#[derive(Debug, Clone, Default)]
pub struct PublishArgs {
  pub dir: PathBuf,
  pub bucket: Option<String>,
  pub prefix: Option<String>,
  /// Defaults to the version in the version file
  pub build_version: Option<String>,
  /// Defaults to the platform this binary runs on
  pub classifier: Option<String>,
  /// Upload into `<dir>/<bucket>/` instead of Backblaze B2
  pub local_store: Option<PathBuf>,
  pub dry_run: bool,
}

/// Run the publish command
pub fn run_publish(ctx: &RepoContext, args: PublishArgs) -> ReleaseResult<()> {
  let publish = &ctx.config.publish;
  let bucket = publish.resolve_bucket(args.bucket)?;
  let prefix = publish.resolve_prefix(args.prefix)?;

  let build_version = match args.build_version {
    Some(version) => version,
    None => ctx.version_file().read()?.to_string(),
  };
  let classifier = match args.classifier {
    Some(classifier) => PlatformClassifier::custom(classifier)?,
    None => PlatformClassifier::current(),
  };
  let key_prefix = KeyPrefix::compose(&prefix, &build_version, &classifier)?;

  let dir = if args.dir.is_absolute() {
    args.dir
  } else {
    std::env::current_dir()?.join(args.dir)
  };

  if args.dry_run {
    let artifacts = plan_keys(&dir, key_prefix.as_str())?;
    println!("📋 Publish plan: {} file(s) to bucket {}", artifacts.len(), bucket);
    println!();
    for artifact in &artifacts {
      println!("   {} → {}", artifact.path.display(), artifact.key);
    }
    println!();
    println!("🔍 Dry-run mode (nothing uploaded)");
    return Ok(());
  }

  let count = match args.local_store {
    Some(root) => upload(&LocalStore::new(root), &dir, &bucket, key_prefix.as_str())?,
    None => {
      let store = B2Store::from_env(&publish.key_id_env, &publish.key_env)?;
      upload(&store, &dir, &bucket, key_prefix.as_str())?
    }
  };

  println!("✅ Published {} file(s) to {}/{}", count, bucket, key_prefix);
  Ok(())
}

fn upload<S: ObjectStore>(store: &S, dir: &std::path::Path, bucket: &str, key_prefix: &str) -> ReleaseResult<usize> {
  ArtifactPublisher::new(store)
    .with_progress(true)
    .publish(dir, bucket, key_prefix)
}
