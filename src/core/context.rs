//! Repository context - resolve once, pass everywhere
//!
//! ```text
//! main.rs:
//!   RepoContext::build(-C path) -> &RepoContext
//!   |
//!   v
//! commands/release.rs, publish.rs:
//!   fn run_*(ctx: &RepoContext, ...)
//! ```

use crate::core::config::ReleaseConfig;
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use crate::core::vcs::SystemGit;
use crate::release::{PushTarget, ReleaseOrchestrator};
use crate::version::VersionFile;
use std::path::{Path, PathBuf};

/// Repository root plus its loaded configuration
#[derive(Debug, Clone)]
pub struct RepoContext {
  /// Git work tree root, or the given directory outside a repository
  pub root: PathBuf,

  /// Release configuration (defaults when no release.toml exists)
  pub config: ReleaseConfig,
}

impl RepoContext {
  /// Resolve the repository root containing `path` and load its config
  ///
  /// Outside a git repository the directory itself is the root, so
  /// `version` and `publish` still work on exported source trees.
  pub fn build(path: &Path) -> ReleaseResult<Self> {
    let root = match SystemGit::open(path) {
      Ok(git) => git.work_tree().to_path_buf(),
      Err(err) => {
        log::debug!("{} is not inside a git work tree: {}", path.display(), err);
        path.to_path_buf()
      }
    };
    let config = ReleaseConfig::load(&root)?;

    Ok(Self { root, config })
  }

  pub fn version_file(&self) -> VersionFile {
    VersionFile::new(self.config.version_file_path(&self.root))
  }

  /// Orchestrator over the system git backend, configured from release.toml
  pub fn orchestrator(&self) -> ReleaseResult<ReleaseOrchestrator<SystemGit>> {
    let git = SystemGit::open(&self.root)?.with_atomic_push(self.config.git.atomic_push);

    let branch = match &self.config.git.branch {
      Some(branch) => branch.clone(),
      None => git.current_branch()?,
    };
    if branch == "HEAD" {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "git.branch (HEAD is detached)".to_string(),
      }));
    }

    let target = PushTarget {
      remote: self.config.git.remote.clone(),
      branch,
      atomic: self.config.git.atomic_push,
    };

    Ok(ReleaseOrchestrator::new(self.version_file(), git, target))
  }
}
