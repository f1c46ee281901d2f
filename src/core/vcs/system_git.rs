//! System git backend
//!
//! Every operation is one `git` subprocess with an isolated environment.
//! Output parsing is limited to `rev-parse` and `status --porcelain`.

use super::{CommitId, SourceControl};
use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Environment variables passed through to git besides PATH and HOME
///
/// Identity overrides and the SSH agent are what CI pipelines use to commit
/// and push on behalf of a deploy key.
const PASSTHROUGH_ENV: &[&str] = &[
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
  "GIT_SSH_COMMAND",
  "SSH_AUTH_SOCK",
];

/// Git backend using system git
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,

  /// Pass `--atomic` to push so branch and tag land together
  atomic_push: bool,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ReleaseError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ReleaseError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
      atomic_push: false,
    })
  }

  /// Enable or disable `git push --atomic`
  pub fn with_atomic_push(mut self, atomic: bool) -> Self {
    self.atomic_push = atomic;
    self
  }

  /// Working tree root reported by git
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get current branch name
  pub fn current_branch(&self) -> ReleaseResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "HEAD"])
      .output()
      .context("Failed to get current branch")?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Detached HEAD
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Run a git command, mapping a non-zero exit to `CommandFailed`
  fn run(&self, args: &[&str], extra: &[PathBuf]) -> ReleaseResult<Output> {
    let mut cmd = self.git_cmd();
    cmd.args(args);
    if !extra.is_empty() {
      cmd.arg("--");
      cmd.args(extra);
    }

    let rendered = format!("git {}", args.join(" "));
    log::debug!("running {} in {}", rendered, self.repo_path.display());

    let output = cmd.output().with_context(|| format!("Failed to execute {}", rendered))?;

    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: rendered,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(output)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists PATH, HOME and the identity/SSH variables
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    // Set working directory
    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }
    for key in PASSTHROUGH_ENV {
      if let Ok(value) = std::env::var(key) {
        cmd.env(key, value);
      }
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII
    cmd.arg("-c").arg("tag.gpgSign=false");

    cmd
  }
}

impl SourceControl for SystemGit {
  fn head(&self) -> ReleaseResult<CommitId> {
    let output = self.run(&["rev-parse", "HEAD"], &[])?;
    Ok(CommitId::new(String::from_utf8_lossy(&output.stdout).trim()))
  }

  fn commit(&self, files: &[PathBuf], message: &str) -> ReleaseResult<CommitId> {
    let status = self.run(&["status", "--porcelain", "--untracked-files=no"], files)?;
    if String::from_utf8_lossy(&status.stdout).trim().is_empty() {
      return Err(ReleaseError::Git(GitError::NothingToCommit { files: files.to_vec() }));
    }

    self.run(&["commit", "--quiet", "-m", message], files)?;
    let head = self.head()?;
    log::info!("committed {} \"{}\"", head.short(), message);
    Ok(head)
  }

  fn tag(&self, name: &str, message: &str) -> ReleaseResult<()> {
    let head = self.head()?;

    if let Some(existing) = self.tag_target(name)? {
      if existing == head {
        log::info!("tag {} already points at {}, nothing to do", name, head.short());
        return Ok(());
      }
      return Err(ReleaseError::Git(GitError::TagAlreadyExists {
        name: name.to_string(),
        existing: existing.to_string(),
        head: Some(head.to_string()),
      }));
    }

    self.run(&["tag", "-a", name, "-m", message], &[])?;
    log::info!("tagged {} as {}", head.short(), name);
    Ok(())
  }

  fn tag_target(&self, name: &str) -> ReleaseResult<Option<CommitId>> {
    let spec = format!("refs/tags/{}^{{commit}}", name);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--quiet", "--verify", &spec])
      .output()
      .context("Failed to resolve tag")?;

    if !output.status.success() {
      return Ok(None);
    }

    Ok(Some(CommitId::new(String::from_utf8_lossy(&output.stdout).trim())))
  }

  fn push(&self, remote: &str, refs: &[String], include_tags: bool) -> ReleaseResult<()> {
    let mut cmd = self.git_cmd();
    cmd.args(["push", "--porcelain"]);
    if self.atomic_push {
      cmd.arg("--atomic");
    }
    if include_tags {
      cmd.arg("--tags");
    }
    cmd.arg(remote);
    cmd.args(refs);

    log::debug!("pushing {} to {}", refs.join(" "), remote);
    let output = cmd.output().context("Failed to push")?;

    if !output.status.success() {
      // --porcelain reports per-ref rejections on stdout
      let mut reason = String::from_utf8_lossy(&output.stderr).to_string();
      reason.push_str(&String::from_utf8_lossy(&output.stdout));
      return Err(ReleaseError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        refs: refs.to_vec(),
        reason,
      }));
    }

    log::info!("pushed {} to {}", refs.join(" "), remote);
    Ok(())
  }

  fn undo_commit(&self, expected: &CommitId, files: &[PathBuf]) -> ReleaseResult<()> {
    let head = self.head()?;
    if &head != expected {
      return Err(ReleaseError::with_help(
        format!("Refusing to undo {}: HEAD moved to {}", expected.short(), head.short()),
        "Inspect `git log` and restore the version file manually.",
      ));
    }

    self.run(&["reset", "--soft", "HEAD~1"], &[])?;
    self.run(&["reset", "--quiet", "HEAD"], files)?;
    log::warn!("undid commit {}", expected.short());
    Ok(())
  }
}
