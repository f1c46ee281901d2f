//! Release lifecycle orchestration
//!
//! Two transitions on top of the version's own snapshot/released duality:
//!
//! ```text
//!            cut_release                    advance_snapshot
//! Snapshot ──────────────▶ Released ─────────────────────────▶ Snapshot
//!   write, commit, tag                 write, commit
//! ```
//!
//! A full `release` run is cut → advance → one push of branch + tag. If the
//! run stops after the cut, the repository sits in `Released` with its tag in
//! place; re-running `release` reports `PartialRelease` and `advance` alone is
//! the resume point. `cut_release` is never re-attempted.
//!
//! One orchestrator owns the version file and the VCS gateway for the whole
//! run. Concurrent runs against the same clone are not guarded here.

use crate::core::error::{GitError, ReleaseError, ReleaseResult, VersionError};
use crate::core::plan::{Operation, OperationType, Plan};
use crate::core::vcs::{CommitId, SourceControl};
use crate::version::transition::{release_message, snapshot_message, tag_name, to_next_snapshot, to_release};
use crate::version::{LifecycleState, Version, VersionFile};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Where a finished release is pushed
#[derive(Debug, Clone)]
pub struct PushTarget {
  pub remote: String,
  pub branch: String,
  pub atomic: bool,
}

/// Outcome of one successful orchestrator operation
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseReport {
  pub operation: OperationType,
  /// Version read at the start of the operation
  pub from: Version,
  /// Version persisted at the end of the operation
  pub to: Version,
  /// The released version, for operations that went through one
  #[serde(skip_serializing_if = "Option::is_none")]
  pub released: Option<Version>,
  pub commits: Vec<CommitId>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag: Option<String>,
  pub pushed: bool,
  pub finished_at: DateTime<Utc>,
}

/// What the next lifecycle step is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
  CutRelease,
  AdvanceSnapshot,
}

/// Read-only view of the lifecycle
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseStatus {
  pub version: Version,
  pub state: LifecycleState,
  /// Tag the current (or upcoming) release uses
  pub tag: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag_commit: Option<CommitId>,
  pub next_step: NextStep,
}

/// Sequences version file I/O, transitions and VCS calls for one release run
pub struct ReleaseOrchestrator<G: SourceControl> {
  store: VersionFile,
  git: G,
  target: PushTarget,
}

impl<G: SourceControl> ReleaseOrchestrator<G> {
  pub fn new(store: VersionFile, git: G, target: PushTarget) -> Self {
    Self { store, git, target }
  }

  /// Current version, state and tag
  pub fn status(&self) -> ReleaseResult<ReleaseStatus> {
    let version = self.store.read()?;
    let tag = tag_name(&version);
    let tag_commit = self.git.tag_target(&tag)?;
    let state = LifecycleState::of(&version);
    let next_step = match state {
      LifecycleState::Snapshot => NextStep::CutRelease,
      LifecycleState::Released => NextStep::AdvanceSnapshot,
    };

    Ok(ReleaseStatus {
      version,
      state,
      tag,
      tag_commit,
      next_step,
    })
  }

  /// Snapshot → Released: write, commit, tag (in that order)
  pub fn cut_release(&self) -> ReleaseResult<ReleaseReport> {
    let current = self.store.read()?;
    let released = to_release(&current)?;
    let tag = tag_name(&released);

    // A stale tag would only surface after the commit; refuse up front
    if let Some(existing) = self.git.tag_target(&tag)? {
      return Err(ReleaseError::Git(GitError::TagAlreadyExists {
        name: tag,
        existing: existing.to_string(),
        head: None,
      }));
    }

    let message = release_message(&released);
    let commit = self.write_and_commit(&current, &released, &message)?;

    if let Err(err) = self.git.tag(&tag, &message) {
      self.rollback_commit(&commit, &current);
      return Err(err);
    }

    log::info!("released {} ({} tagged {})", released, commit.short(), tag);

    Ok(ReleaseReport {
      operation: OperationType::CutRelease,
      from: current,
      to: released.clone(),
      released: Some(released),
      commits: vec![commit],
      tag: Some(tag),
      pushed: false,
      finished_at: Utc::now(),
    })
  }

  /// Released → Snapshot: write, commit
  pub fn advance_snapshot(&self) -> ReleaseResult<ReleaseReport> {
    let current = self.store.read()?;
    let next = to_next_snapshot(&current)?;
    let commit = self.write_and_commit(&current, &next, &snapshot_message(&next))?;

    log::info!("switched to {} ({})", next, commit.short());

    Ok(ReleaseReport {
      operation: OperationType::AdvanceSnapshot,
      from: current.clone(),
      to: next,
      released: Some(current),
      commits: vec![commit],
      tag: None,
      pushed: false,
      finished_at: Utc::now(),
    })
  }

  /// Full run: cut, advance, then (optionally) one push of branch and tag
  pub fn release(&self, push: bool) -> ReleaseResult<ReleaseReport> {
    let current = self.store.read()?;
    self.ensure_not_partial(&current)?;

    let cut = self.cut_release()?;
    let released = cut.to.clone();
    let tag = tag_name(&released);

    let advance = self.advance_snapshot().map_err(|err| ReleaseError::PartialRelease {
      version: released.to_string(),
      tag: tag.clone(),
      cause: Some(Box::new(err)),
    })?;

    if push {
      self.push_release(&released)?;
    }

    let mut commits = cut.commits;
    commits.extend(advance.commits);

    Ok(ReleaseReport {
      operation: OperationType::Release,
      from: current,
      to: advance.to,
      released: Some(released),
      commits,
      tag: Some(tag),
      pushed: push,
      finished_at: Utc::now(),
    })
  }

  /// Push the branch together with the tag of `released`
  ///
  /// The tag travels in the same push as the commits it names. A released
  /// version that was never tagged pushes the branch alone. A rejection
  /// needs a human: retrying after an unknown partial push is not safe.
  pub fn push_release(&self, released: &Version) -> ReleaseResult<()> {
    let tag = tag_name(released);
    let refs = if self.git.tag_target(&tag)?.is_some() {
      self.push_refs(released)
    } else {
      log::warn!("{} has no tag {}; pushing {} without it", released, tag, self.target.branch);
      vec![self.target.branch.clone()]
    };
    self.git.push(&self.target.remote, &refs, false)
  }

  /// Describe what `operation` would do without touching anything
  pub fn plan(&self, operation: OperationType, push: bool) -> ReleaseResult<Plan> {
    let current = self.store.read()?;
    let path = self.store.path().display().to_string();
    let mut plan = Plan::new(operation);

    match operation {
      OperationType::CutRelease => {
        let released = to_release(&current)?;
        self.add_cut_operations(&mut plan, &path, &current, &released);
        Ok(plan.with_summary(format!("   {} → {}", current, released)))
      }
      OperationType::AdvanceSnapshot => {
        let next = to_next_snapshot(&current)?;
        self.add_advance_operations(&mut plan, &path, &current, &next);
        Ok(plan.with_summary(format!("   {} → {}", current, next)))
      }
      OperationType::Release => {
        self.ensure_not_partial(&current)?;
        let released = to_release(&current)?;
        let next = to_next_snapshot(&released)?;
        self.add_cut_operations(&mut plan, &path, &current, &released);
        self.add_advance_operations(&mut plan, &path, &released, &next);
        if push {
          plan.add_operation(Operation::Push {
            remote: self.target.remote.clone(),
            refs: self.push_refs(&released),
            atomic: self.target.atomic,
          });
        }
        Ok(plan.with_summary(format!("   {} → {} → {}", current, released, next)))
      }
    }
  }

  /// A released version whose tag exists means a previous run stopped after the cut
  fn ensure_not_partial(&self, current: &Version) -> ReleaseResult<()> {
    if current.is_snapshot() {
      return Ok(());
    }

    let tag = tag_name(current);
    if self.git.tag_target(&tag)?.is_some() {
      return Err(ReleaseError::PartialRelease {
        version: current.to_string(),
        tag,
        cause: None,
      });
    }

    Err(ReleaseError::Version(VersionError::NotASnapshot {
      version: current.to_string(),
    }))
  }

  fn push_refs(&self, released: &Version) -> Vec<String> {
    vec![
      self.target.branch.clone(),
      format!("refs/tags/{}", tag_name(released)),
    ]
  }

  fn files(&self) -> Vec<PathBuf> {
    vec![self.store.path().to_path_buf()]
  }

  /// Persist `next` and commit it; on commit failure put `previous` back
  fn write_and_commit(&self, previous: &Version, next: &Version, message: &str) -> ReleaseResult<CommitId> {
    self.store.write(next)?;

    match self.git.commit(&self.files(), message) {
      Ok(commit) => Ok(commit),
      Err(err) => {
        self.restore(previous);
        Err(err)
      }
    }
  }

  /// Undo the commit just made and put `previous` back in the version file
  fn rollback_commit(&self, commit: &CommitId, previous: &Version) {
    if let Err(undo_err) = self.git.undo_commit(commit, &self.files()) {
      log::error!(
        "could not undo commit {} after a failed tag: {}; repository needs manual repair",
        commit.short(),
        undo_err
      );
      return;
    }
    self.restore(previous);
  }

  fn restore(&self, previous: &Version) {
    if let Err(restore_err) = self.store.write(previous) {
      log::error!(
        "could not restore {} to {}: {}",
        self.store.path().display(),
        previous,
        restore_err
      );
    }
  }

  fn add_cut_operations(&self, plan: &mut Plan, path: &str, current: &Version, released: &Version) {
    let message = release_message(released);
    plan.add_operation(Operation::WriteVersion {
      path: path.to_string(),
      from: current.to_string(),
      to: released.to_string(),
    });
    plan.add_operation(Operation::CreateCommit {
      message: message.clone(),
      files: vec![path.to_string()],
    });
    plan.add_operation(Operation::CreateTag {
      name: tag_name(released),
      message,
    });
  }

  fn add_advance_operations(&self, plan: &mut Plan, path: &str, current: &Version, next: &Version) {
    plan.add_operation(Operation::WriteVersion {
      path: path.to_string(),
      from: current.to_string(),
      to: next.to_string(),
    });
    plan.add_operation(Operation::CreateCommit {
      message: snapshot_message(next),
      files: vec![path.to_string()],
    });
  }
}
