//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A git repository with a version file and a bare `origin` remote
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
}

impl TestRepo {
  /// Create a repository whose version.txt holds `version`, pushed to origin/master
  pub fn new(version: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("work");
    let remote = root.path().join("origin.git");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&remote)?;

    git(&remote, &["init", "--bare", "--initial-branch=master"])?;

    git(&path, &["init", "--initial-branch=master"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgSign", "false"])?;

    std::fs::write(path.join("version.txt"), version)?;
    std::fs::write(path.join("README.md"), "# lin-bus\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    let remote_url = remote.to_string_lossy().into_owned();
    git(&path, &["remote", "add", "origin", &remote_url])?;
    git(&path, &["push", "--quiet", "origin", "master"])?;

    Ok(Self {
      _root: root,
      path,
      remote,
    })
  }

  /// Contents of version.txt in the working tree
  pub fn version(&self) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join("version.txt"))?)
  }

  /// Overwrite version.txt and commit it
  pub fn set_version(&self, version: &str) -> Result<()> {
    std::fs::write(self.path.join("version.txt"), version)?;
    git(&self.path, &["commit", "--quiet", "-am", &format!("Set version {}", version)])?;
    Ok(())
  }

  /// Write a file at the repository root without committing it
  pub fn write_file(&self, name: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(name), content)?;
    Ok(())
  }

  /// Subjects of the last `n` commits, newest first
  pub fn git_log(&self, n: usize) -> Result<Vec<String>> {
    log_subjects(&self.path, "HEAD", n)
  }

  /// Subjects of the last `n` commits on origin's master
  pub fn remote_log(&self, n: usize) -> Result<Vec<String>> {
    log_subjects(&self.remote, "master", n)
  }

  pub fn commit_count(&self) -> Result<usize> {
    Ok(stdout(&git(&self.path, &["rev-list", "--count", "HEAD"])?).parse()?)
  }

  pub fn head(&self) -> Result<String> {
    Ok(stdout(&git(&self.path, &["rev-parse", "HEAD"])?))
  }

  pub fn tags(&self) -> Result<Vec<String>> {
    list_tags(&self.path)
  }

  pub fn remote_tags(&self) -> Result<Vec<String>> {
    list_tags(&self.remote)
  }

  /// Commit a tag points at
  pub fn tag_commit(&self, tag: &str) -> Result<String> {
    Ok(stdout(&git(
      &self.path,
      &["rev-parse", &format!("refs/tags/{}^{{commit}}", tag)],
    )?))
  }

  /// A file's contents as of `rev`
  pub fn show(&self, rev: &str, file: &str) -> Result<String> {
    Ok(stdout(&git(&self.path, &["show", &format!("{}:{}", rev, file)])?))
  }
}

fn log_subjects(repo: &Path, rev: &str, n: usize) -> Result<Vec<String>> {
  let output = git(repo, &["log", &format!("-{}", n), "--format=%s", rev])?;
  Ok(String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect())
}

fn list_tags(repo: &Path) -> Result<Vec<String>> {
  let output = git(repo, &["tag", "--list"])?;
  Ok(String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect())
}

/// Trimmed stdout of a command
pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run release-rail and return its output whatever the exit status
pub fn run_release_rail_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  run_release_rail_with_env(cwd, args, &[])
}

/// Run release-rail with extra environment variables, whatever the exit status
///
/// Variables the CLI reads (`B2_BUCKET_NAME`, `B2_PREFIX`, `RUST_LOG`) are
/// cleared first so the caller's shell cannot leak into a test.
pub fn run_release_rail_with_env(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_release-rail");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .env_remove("B2_BUCKET_NAME")
    .env_remove("B2_PREFIX")
    .envs(envs.iter().copied())
    .output()
    .context("Failed to run release-rail")
}

/// Run release-rail, failing the test on a non-zero exit
pub fn run_release_rail(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_release_rail_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "release-rail command failed: release-rail {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
