//! Integration tests for the release lifecycle commands

use crate::helpers::{TestRepo, run_release_rail, run_release_rail_raw, stdout};
use anyhow::Result;

#[test]
fn test_release_full_run() -> Result<()> {
  let repo = TestRepo::new("1.2.3-SNAPSHOT")?;
  let before = repo.commit_count()?;

  run_release_rail(&repo.path, &["release"])?;

  // Version file ends on the next snapshot, no trailing newline
  assert_eq!(repo.version()?, "1.2.4-SNAPSHOT");
  assert_eq!(repo.commit_count()?, before + 2);
  assert_eq!(
    repo.git_log(2)?,
    vec!["Switch to next snapshot version 1.2.4-SNAPSHOT", "Release version 1.2.3"]
  );

  // The tag names the release commit, not the snapshot bump
  assert_eq!(repo.tags()?, vec!["v1.2.3"]);
  assert_eq!(repo.show("v1.2.3", "version.txt")?, "1.2.3");
  assert_ne!(repo.tag_commit("v1.2.3")?, repo.head()?);

  // Branch and tag reached the remote
  assert_eq!(repo.remote_tags()?, vec!["v1.2.3"]);
  assert_eq!(repo.remote_log(1)?, vec!["Switch to next snapshot version 1.2.4-SNAPSHOT"]);

  Ok(())
}

#[test]
fn test_release_single_component() -> Result<()> {
  let repo = TestRepo::new("1-SNAPSHOT")?;

  run_release_rail(&repo.path, &["release", "--no-push"])?;

  assert_eq!(repo.version()?, "2-SNAPSHOT");
  assert_eq!(repo.tags()?, vec!["v1"]);
  assert!(repo.remote_tags()?.is_empty());
  assert_eq!(repo.remote_log(1)?, vec!["Initial commit"]);

  Ok(())
}

#[test]
fn test_version_command_prints_current() -> Result<()> {
  let repo = TestRepo::new("0.9.1-SNAPSHOT")?;
  let output = run_release_rail(&repo.path, &["version"])?;
  assert_eq!(stdout(&output), "0.9.1-SNAPSHOT");
  Ok(())
}

#[test]
fn test_cut_on_released_version_is_rejected() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  let before = repo.commit_count()?;

  let output = run_release_rail_raw(&repo.path, &["cut"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("1.2.3"));

  assert_eq!(repo.version()?, "1.2.3");
  assert_eq!(repo.commit_count()?, before);
  assert!(repo.tags()?.is_empty());
  Ok(())
}

#[test]
fn test_advance_released_version() -> Result<()> {
  let repo = TestRepo::new("2")?;
  let before = repo.commit_count()?;

  run_release_rail(&repo.path, &["advance"])?;

  assert_eq!(repo.version()?, "3-SNAPSHOT");
  assert_eq!(repo.commit_count()?, before + 1);
  assert_eq!(repo.git_log(1)?, vec!["Switch to next snapshot version 3-SNAPSHOT"]);
  assert!(repo.tags()?.is_empty());
  Ok(())
}

#[test]
fn test_advance_push_without_tag_pushes_branch() -> Result<()> {
  let repo = TestRepo::new("2")?;

  let output = run_release_rail(&repo.path, &["advance", "--push", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(report["pushed"], true);
  assert_eq!(repo.version()?, "3-SNAPSHOT");
  assert_eq!(repo.remote_log(1)?, vec!["Switch to next snapshot version 3-SNAPSHOT"]);
  assert!(repo.remote_tags()?.is_empty());
  Ok(())
}

#[test]
fn test_advance_on_snapshot_is_rejected() -> Result<()> {
  let repo = TestRepo::new("1.0-SNAPSHOT")?;
  let output = run_release_rail_raw(&repo.path, &["advance"])?;
  assert_eq!(output.status.code(), Some(1));
  assert_eq!(repo.version()?, "1.0-SNAPSHOT");
  Ok(())
}

#[test]
fn test_missing_version_file() -> Result<()> {
  let repo = TestRepo::new("1.0-SNAPSHOT")?;
  std::fs::remove_file(repo.path.join("version.txt"))?;

  let output = run_release_rail_raw(&repo.path, &["release"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("version.txt"));
  Ok(())
}

#[test]
fn test_malformed_version_is_rejected() -> Result<()> {
  let repo = TestRepo::new("1.x-SNAPSHOT")?;
  let before = repo.commit_count()?;

  let output = run_release_rail_raw(&repo.path, &["release"])?;
  assert_eq!(output.status.code(), Some(1));
  assert_eq!(repo.commit_count()?, before);
  Ok(())
}

#[test]
fn test_existing_tag_blocks_cut() -> Result<()> {
  let repo = TestRepo::new("1.2.3-SNAPSHOT")?;
  crate::helpers::git(&repo.path, &["tag", "-a", "v1.2.3", "-m", "stale"])?;
  repo.write_file("NOTES.md", "after the stale tag\n")?;
  crate::helpers::git(&repo.path, &["add", "NOTES.md"])?;
  crate::helpers::git(&repo.path, &["commit", "-m", "More work"])?;
  let before = repo.commit_count()?;

  let output = run_release_rail_raw(&repo.path, &["release"])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("v1.2.3"));

  // Nothing was committed and the version file is untouched
  assert_eq!(repo.version()?, "1.2.3-SNAPSHOT");
  assert_eq!(repo.commit_count()?, before);
  Ok(())
}

#[test]
fn test_partial_release_recovery() -> Result<()> {
  let repo = TestRepo::new("1.2.3-SNAPSHOT")?;

  // Stop after the cut, as if the run died before advancing
  run_release_rail(&repo.path, &["cut"])?;
  assert_eq!(repo.version()?, "1.2.3");
  assert_eq!(repo.tags()?, vec!["v1.2.3"]);

  // A new full run must not cut again
  let output = run_release_rail_raw(&repo.path, &["release"])?;
  assert_eq!(output.status.code(), Some(4));
  assert!(String::from_utf8_lossy(&output.stderr).contains("advance --push"));
  assert_eq!(repo.version()?, "1.2.3");

  // Resume
  run_release_rail(&repo.path, &["advance", "--push"])?;
  assert_eq!(repo.version()?, "1.2.4-SNAPSHOT");
  assert_eq!(repo.remote_tags()?, vec!["v1.2.3"]);
  assert_eq!(repo.remote_log(2)?, repo.git_log(2)?);
  Ok(())
}

#[test]
fn test_release_dry_run_changes_nothing() -> Result<()> {
  let repo = TestRepo::new("4.1-SNAPSHOT")?;
  let before = repo.commit_count()?;

  let output = run_release_rail(&repo.path, &["release", "--dry-run", "--json"])?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(plan["operation_type"], "release");
  let types: Vec<_> = plan["operations"]
    .as_array()
    .unwrap()
    .iter()
    .map(|op| op["type"].as_str().unwrap().to_string())
    .collect();
  assert_eq!(
    types,
    vec![
      "write_version",
      "create_commit",
      "create_tag",
      "write_version",
      "create_commit",
      "push"
    ]
  );

  assert_eq!(repo.version()?, "4.1-SNAPSHOT");
  assert_eq!(repo.commit_count()?, before);
  assert!(repo.tags()?.is_empty());
  Ok(())
}

#[test]
fn test_status_json() -> Result<()> {
  let repo = TestRepo::new("1.2.3-SNAPSHOT")?;

  let output = run_release_rail(&repo.path, &["status", "--json"])?;
  let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(status["version"], "1.2.3-SNAPSHOT");
  assert_eq!(status["state"], "snapshot");
  assert_eq!(status["tag"], "v1.2.3");
  assert_eq!(status["next_step"], "cut_release");

  run_release_rail(&repo.path, &["cut"])?;
  let output = run_release_rail(&repo.path, &["status", "--json"])?;
  let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(status["state"], "released");
  assert_eq!(status["tag_commit"], repo.tag_commit("v1.2.3")?);
  assert_eq!(status["next_step"], "advance_snapshot");
  Ok(())
}

#[test]
fn test_release_report_json() -> Result<()> {
  let repo = TestRepo::new("1.9-SNAPSHOT")?;

  let output = run_release_rail(&repo.path, &["release", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["operation"], "release");
  assert_eq!(report["from"], "1.9-SNAPSHOT");
  assert_eq!(report["released"], "1.9");
  assert_eq!(report["to"], "1.10-SNAPSHOT");
  assert_eq!(report["tag"], "v1.9");
  assert_eq!(report["pushed"], true);
  assert_eq!(report["commits"].as_array().unwrap().len(), 2);
  Ok(())
}

#[test]
fn test_push_failure_keeps_local_release() -> Result<()> {
  let repo = TestRepo::new("1.0-SNAPSHOT")?;
  repo.write_file("release.toml", "[git]\nremote = \"nowhere\"\n")?;

  let output = run_release_rail_raw(&repo.path, &["release"])?;
  assert_eq!(output.status.code(), Some(2));

  // Local lifecycle completed; only the push is missing
  assert_eq!(repo.version()?, "1.1-SNAPSHOT");
  assert_eq!(repo.tags()?, vec!["v1.0"]);
  assert!(repo.remote_tags()?.is_empty());
  Ok(())
}

#[test]
fn test_custom_version_file_from_config() -> Result<()> {
  let repo = TestRepo::new("unused")?;
  repo.write_file("release.toml", "[version]\nfile = \"VERSION\"\n")?;
  repo.write_file("VERSION", "7.0-SNAPSHOT")?;
  crate::helpers::git(&repo.path, &["add", "VERSION", "release.toml"])?;
  crate::helpers::git(&repo.path, &["commit", "-m", "Use VERSION"])?;

  run_release_rail(&repo.path, &["release", "--no-push"])?;

  assert_eq!(std::fs::read_to_string(repo.path.join("VERSION"))?, "7.1-SNAPSHOT");
  assert_eq!(repo.version()?, "unused");
  assert_eq!(repo.tags()?, vec!["v7.0"]);
  Ok(())
}

#[test]
fn test_runs_from_subdirectory_with_c_flag() -> Result<()> {
  let repo = TestRepo::new("3.3-SNAPSHOT")?;
  let elsewhere = tempfile::TempDir::new()?;
  let repo_arg = repo.path.to_string_lossy().into_owned();

  let output = run_release_rail(elsewhere.path(), &["-C", &repo_arg, "version"])?;
  assert_eq!(stdout(&output), "3.3-SNAPSHOT");
  Ok(())
}
