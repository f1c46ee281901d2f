//! Integration tests for `release-rail publish` against a directory store

use crate::helpers::{TestRepo, run_release_rail, run_release_rail_raw, run_release_rail_with_env};
use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Packaged outputs: two files, one nested, plus an empty directory
fn artifacts() -> Result<TempDir> {
  let dir = TempDir::new()?;
  fs::create_dir_all(dir.path().join("installers"))?;
  fs::create_dir_all(dir.path().join("empty"))?;
  fs::write(dir.path().join("lin-bus.zip"), "zip")?;
  fs::write(dir.path().join("installers/lin-bus.deb"), "deb")?;
  Ok(dir)
}

/// Store root with a provisioned `downloads` bucket
fn store() -> Result<TempDir> {
  let root = TempDir::new()?;
  fs::create_dir(root.path().join("downloads"))?;
  Ok(root)
}

fn count_files(dir: &Path) -> usize {
  walkdir::WalkDir::new(dir)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|e| e.file_type().is_file())
    .count()
}

#[test]
fn test_publish_to_local_store_is_idempotent() -> Result<()> {
  let repo = TestRepo::new("1.2.4-SNAPSHOT")?;
  let artifacts = artifacts()?;
  let store = store()?;
  let dir = artifacts.path().to_string_lossy().into_owned();
  let store_arg = store.path().to_string_lossy().into_owned();
  let args = [
    "publish",
    dir.as_str(),
    "--bucket",
    "downloads",
    "--prefix",
    "lin-bus",
    "--classifier",
    "linux-x86_64",
    "--local-store",
    store_arg.as_str(),
  ];

  run_release_rail(&repo.path, &args)?;
  run_release_rail(&repo.path, &args)?;

  // Build version defaults to the version file
  let base = store.path().join("downloads/lin-bus/1.2.4-SNAPSHOT/linux-x86_64");
  assert_eq!(fs::read_to_string(base.join("lin-bus.zip"))?, "zip");
  assert_eq!(fs::read_to_string(base.join("installers/lin-bus.deb"))?, "deb");
  assert_eq!(count_files(&store.path().join("downloads")), 2);
  Ok(())
}

/// Without `--classifier` the running platform names the key segment
#[test]
fn test_publish_config_and_build_version_flag() -> Result<()> {
  let repo = TestRepo::new("1.0-SNAPSHOT")?;
  repo.write_file("release.toml", "[publish]\nbucket = \"downloads\"\nprefix = \"tools/\"\n")?;
  let artifacts = artifacts()?;
  let store = store()?;
  let dir = artifacts.path().to_string_lossy().into_owned();
  let store_arg = store.path().to_string_lossy().into_owned();

  run_release_rail(
    &repo.path,
    &[
      "publish",
      &dir,
      "--build-version",
      "1.0-SNAPSHOT+42",
      "--local-store",
      &store_arg,
    ],
  )?;

  let classifier = format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH);
  let key_root = store
    .path()
    .join("downloads/tools/1.0-SNAPSHOT+42")
    .join(classifier);
  assert!(key_root.join("lin-bus.zip").is_file());
  Ok(())
}

#[test]
fn test_publish_bucket_and_prefix_from_environment() -> Result<()> {
  let repo = TestRepo::new("1.1-SNAPSHOT")?;
  repo.write_file("release.toml", "[publish]\nbucket = \"unused\"\nprefix = \"from-config\"\n")?;
  let artifacts = artifacts()?;
  let store = store()?;
  let dir = artifacts.path().to_string_lossy().into_owned();
  let store_arg = store.path().to_string_lossy().into_owned();

  let output = run_release_rail_with_env(
    &repo.path,
    &["publish", &dir, "--classifier", "linux-x86_64", "--local-store", &store_arg],
    &[("B2_BUCKET_NAME", "downloads"), ("B2_PREFIX", "lin-bus")],
  )?;

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let base = store.path().join("downloads/lin-bus/1.1-SNAPSHOT/linux-x86_64");
  assert!(base.join("lin-bus.zip").is_file());
  assert!(base.join("installers/lin-bus.deb").is_file());
  Ok(())
}

#[test]
fn test_publish_unknown_bucket_uploads_nothing() -> Result<()> {
  let repo = TestRepo::new("1.0-SNAPSHOT")?;
  let artifacts = artifacts()?;
  let store = store()?;
  let dir = artifacts.path().to_string_lossy().into_owned();
  let store_arg = store.path().to_string_lossy().into_owned();

  let output = run_release_rail_raw(
    &repo.path,
    &[
      "publish",
      &dir,
      "--bucket",
      "missing",
      "--prefix",
      "lin-bus",
      "--local-store",
      &store_arg,
    ],
  )?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("missing"));
  assert_eq!(count_files(store.path()), 0);
  Ok(())
}

#[test]
fn test_publish_requires_bucket() -> Result<()> {
  let repo = TestRepo::new("1.0-SNAPSHOT")?;
  let artifacts = artifacts()?;
  let dir = artifacts.path().to_string_lossy().into_owned();

  let output = run_release_rail_raw(&repo.path, &["publish", &dir, "--prefix", "lin-bus", "--dry-run"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("publish.bucket"));
  Ok(())
}

#[test]
fn test_publish_dry_run_lists_keys() -> Result<()> {
  let repo = TestRepo::new("2.0-SNAPSHOT")?;
  let artifacts = artifacts()?;
  let dir = artifacts.path().to_string_lossy().into_owned();

  let output = run_release_rail(
    &repo.path,
    &[
      "publish",
      &dir,
      "--bucket",
      "downloads",
      "--prefix",
      "lin-bus",
      "--classifier",
      "windows-x86_64",
      "--dry-run",
    ],
  )?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("lin-bus/2.0-SNAPSHOT/windows-x86_64/lin-bus.zip"));
  assert!(stdout.contains("lin-bus/2.0-SNAPSHOT/windows-x86_64/installers/lin-bus.deb"));
  assert!(!stdout.contains("empty"));
  Ok(())
}

#[test]
fn test_publish_missing_directory() -> Result<()> {
  let repo = TestRepo::new("1.0-SNAPSHOT")?;
  let store = store()?;
  let store_arg = store.path().to_string_lossy().into_owned();

  let output = run_release_rail_raw(
    &repo.path,
    &[
      "publish",
      "does-not-exist",
      "--bucket",
      "downloads",
      "--prefix",
      "p",
      "--local-store",
      &store_arg,
    ],
  )?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}
