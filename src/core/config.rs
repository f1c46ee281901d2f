use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::version::store::DEFAULT_VERSION_FILE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for release-rail
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// Every section is optional; a repository without any config file gets the
/// defaults (version.txt, remote `origin`, current branch).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseConfig {
  #[serde(default)]
  pub version: VersionConfig,
  #[serde(default)]
  pub git: GitConfig,
  #[serde(default)]
  pub publish: PublishConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
  /// Version file path, relative to the repository root
  #[serde(default = "default_version_file")]
  pub file: PathBuf,
}

fn default_version_file() -> PathBuf {
  PathBuf::from(DEFAULT_VERSION_FILE)
}

impl Default for VersionConfig {
  fn default() -> Self {
    Self {
      file: default_version_file(),
    }
  }
}

/// Where release commits and tags are pushed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
  /// Remote name or URL (default: "origin")
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Branch to push (default: the currently checked out branch)
  #[serde(default)]
  pub branch: Option<String>,

  /// Push branch and tag with `--atomic` (default: true)
  #[serde(default = "default_atomic_push")]
  pub atomic_push: bool,
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_atomic_push() -> bool {
  true
}

impl Default for GitConfig {
  fn default() -> Self {
    Self {
      remote: default_remote(),
      branch: None,
      atomic_push: default_atomic_push(),
    }
  }
}

/// Object storage target for packaged artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
  /// Bucket name
  #[serde(default)]
  pub bucket: Option<String>,

  /// Leading key segment, e.g. the project name
  #[serde(default)]
  pub prefix: Option<String>,

  /// Environment variable holding the B2 application key id
  #[serde(default = "default_key_id_env")]
  pub key_id_env: String,

  /// Environment variable holding the B2 application key
  #[serde(default = "default_key_env")]
  pub key_env: String,
}

fn default_key_id_env() -> String {
  "B2_APPLICATION_KEY_ID".to_string()
}

fn default_key_env() -> String {
  "B2_APPLICATION_KEY".to_string()
}

impl Default for PublishConfig {
  fn default() -> Self {
    Self {
      bucket: None,
      prefix: None,
      key_id_env: default_key_id_env(),
      key_env: default_key_env(),
    }
  }
}

impl PublishConfig {
  /// Bucket from the command line, falling back to config
  pub fn resolve_bucket(&self, cli: Option<String>) -> ReleaseResult<String> {
    cli.or_else(|| self.bucket.clone()).ok_or_else(|| {
      ReleaseError::Config(ConfigError::MissingField {
        field: "publish.bucket".to_string(),
      })
    })
  }

  /// Key prefix from the command line, falling back to config
  pub fn resolve_prefix(&self, cli: Option<String>) -> ReleaseResult<String> {
    cli.or_else(|| self.prefix.clone()).ok_or_else(|| {
      ReleaseError::Config(ConfigError::MissingField {
        field: "publish.prefix".to_string(),
      })
    })
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, or defaults when no config file exists
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      log::debug!("no release.toml under {}, using defaults", path.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ReleaseConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    log::debug!("loaded config from {}", config_path.display());
    Ok(config)
  }

  /// Validate field values that serde cannot check
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.version.file.as_os_str().is_empty() {
      return Err(ReleaseError::Config(ConfigError::InvalidValue {
        field: "version.file".to_string(),
        reason: "must not be empty".to_string(),
      }));
    }

    if self.git.remote.trim().is_empty() {
      return Err(ReleaseError::Config(ConfigError::InvalidValue {
        field: "git.remote".to_string(),
        reason: "must not be empty".to_string(),
      }));
    }

    if let Some(ref bucket) = self.publish.bucket
      && bucket.trim().is_empty()
    {
      return Err(ReleaseError::Config(ConfigError::InvalidValue {
        field: "publish.bucket".to_string(),
        reason: "must not be empty".to_string(),
      }));
    }

    Ok(())
  }

  /// Absolute path of the version file for a repository root
  pub fn version_file_path(&self, repo_root: &Path) -> PathBuf {
    repo_root.join(&self.version.file)
  }
}
