pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Full SHA of a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
  pub fn new(sha: impl Into<String>) -> Self {
    Self(sha.into())
  }

  /// Abbreviated SHA for display
  pub fn short(&self) -> &str {
    &self.0[..7.min(self.0.len())]
  }
}

impl fmt::Display for CommitId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Commit/tag/push operations the release lifecycle needs from version control
///
/// `SystemGit` is the real implementation; tests substitute recording fakes.
pub trait SourceControl {
  /// Current HEAD commit
  fn head(&self) -> ReleaseResult<CommitId>;

  /// Commit tracked changes among `files` only
  ///
  /// Fails with `NothingToCommit` when none of `files` has tracked changes.
  fn commit(&self, files: &[PathBuf], message: &str) -> ReleaseResult<CommitId>;

  /// Create annotated tag `name` at HEAD
  ///
  /// Already bound to HEAD: no-op. Bound elsewhere: `TagAlreadyExists`.
  fn tag(&self, name: &str, message: &str) -> ReleaseResult<()>;

  /// Commit a tag points to, if the tag exists
  fn tag_target(&self, name: &str) -> ReleaseResult<Option<CommitId>>;

  /// Push `refs` to `remote` in one invocation. Never retried.
  fn push(&self, remote: &str, refs: &[String], include_tags: bool) -> ReleaseResult<()>;

  /// Drop the commit just made (HEAD must equal `expected`) and unstage `files`
  fn undo_commit(&self, expected: &CommitId, files: &[PathBuf]) -> ReleaseResult<()>;
}
