//! Error types for release-rail with contextual messages and exit codes
//!
//! Errors fall into three families:
//!
//! - **input/state** errors (version file missing or malformed, wrong lifecycle
//!   state, bad config) are detected before anything is mutated
//! - **external tool** errors (git, object storage) carry the step and the
//!   resource that failed so a human can diagnose them
//! - **partial release**: the release commit and tag exist but the next
//!   snapshot was never committed; resuming with `advance` fixes it
//!
//! Nothing here is retried automatically.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for release-rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, bad version file, wrong state)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Release stopped halfway; resume with `advance`
  Partial = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for release-rail
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Version file and lifecycle errors
  Version(VersionError),

  /// Git operation errors
  Git(GitError),

  /// Artifact upload errors
  Publish(PublishError),

  /// The release commit and tag exist, the next snapshot does not
  PartialRelease {
    version: String,
    tag: String,
    cause: Option<Box<ReleaseError>>,
  },

  /// I/O errors
  Io(io::Error),

  /// A typed error with the step that hit it
  Context {
    source: Box<ReleaseError>,
    context: String,
  },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(e) => ReleaseError::Message {
        message: format!("I/O error: {}", e),
        context: Some(ctx_str),
        help: None,
      },
      ReleaseError::Context { source, context } => ReleaseError::Context {
        source,
        context: format!("{}\n{}", ctx_str, context),
      },
      other => ReleaseError::Context {
        source: Box::new(other),
        context: ctx_str,
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Version(_) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Publish(_) => ExitCode::System,
      ReleaseError::PartialRelease { .. } => ExitCode::Partial,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
      ReleaseError::Context { source, .. } => source.exit_code(),
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Version(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Publish(e) => e.help_message(),
      ReleaseError::PartialRelease { tag, .. } => Some(format!(
        "Tag {} is already in place. Run `release-rail advance --push` to switch to the next snapshot and push; do not cut the release again.",
        tag
      )),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Context { source, .. } => source.help_message(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Version(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Publish(e) => write!(f, "{}", e),
      ReleaseError::PartialRelease { version, tag, cause } => {
        write!(
          f,
          "Partial release: version {} is released and tagged {}, but the next snapshot was not committed",
          version, tag
        )?;
        if let Some(cause) = cause {
          write!(f, "\nCaused by: {}", cause)?;
        }
        Ok(())
      }
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
      ReleaseError::Context { source, context } => write!(f, "{}\n{}", source, context),
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::PartialRelease { cause: Some(cause), .. } => Some(cause.as_ref()),
      ReleaseError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<VersionError> for ReleaseError {
  fn from(err: VersionError) -> Self {
    ReleaseError::Version(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<PublishError> for ReleaseError {
  fn from(err: PublishError) -> Self {
    ReleaseError::Publish(err)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for ReleaseError {
  fn from(err: std::path::StripPrefixError) -> Self {
    ReleaseError::message(format!("Path strip prefix error: {}", err))
  }
}

impl From<walkdir::Error> for ReleaseError {
  fn from(err: walkdir::Error) -> Self {
    ReleaseError::message(format!("Directory walk error: {}", err))
  }
}

impl From<reqwest::Error> for ReleaseError {
  fn from(err: reqwest::Error) -> Self {
    ReleaseError::message(format!("HTTP error: {}", err))
  }
}

impl From<tempfile::PersistError> for ReleaseError {
  fn from(err: tempfile::PersistError) -> Self {
    ReleaseError::Io(err.error)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Missing required field (neither in release.toml nor on the command line)
  MissingField { field: String },

  /// Value present but unusable
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingField { field } => Some(format!(
        "Set `{}` in release.toml or pass it on the command line.",
        field
      )),
      ConfigError::InvalidValue { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingField { field } => {
        write!(f, "Missing required setting: {}", field)
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid value for {}: {}", field, reason)
      }
    }
  }
}

/// Version file and lifecycle errors
#[derive(Debug)]
pub enum VersionError {
  /// The version file does not exist
  MissingVersionFile { path: PathBuf },

  /// The version text does not match `N(.N)*(-SNAPSHOT)?`
  MalformedVersion { input: String, reason: String },

  /// A release transition was requested for a released version
  NotASnapshot { version: String },

  /// A next-snapshot transition was requested for a snapshot version
  AlreadySnapshot { version: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::MissingVersionFile { path } => Some(format!(
        "Create {} containing the current version, e.g. `1.0.0-SNAPSHOT`.",
        path.display()
      )),
      VersionError::MalformedVersion { .. } => {
        Some("Versions look like `1.2.3` or `1.2.3-SNAPSHOT` (numbers separated by dots).".to_string())
      }
      VersionError::NotASnapshot { .. } => {
        Some("This version is already released. Run `release-rail advance` to start the next snapshot.".to_string())
      }
      VersionError::AlreadySnapshot { .. } => {
        Some("This version is already a snapshot. Run `release-rail cut` to release it first.".to_string())
      }
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::MissingVersionFile { path } => {
        write!(f, "Version file not found: {}", path.display())
      }
      VersionError::MalformedVersion { input, reason } => {
        write!(f, "Malformed version '{}': {}", input, reason)
      }
      VersionError::NotASnapshot { version } => {
        write!(f, "Version {} is not a snapshot version", version)
      }
      VersionError::AlreadySnapshot { version } => {
        write!(f, "Version {} is already a snapshot version", version)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed (the generic VCS failure)
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// None of the given paths has tracked changes
  NothingToCommit { files: Vec<PathBuf> },

  /// Tag already names a different commit
  TagAlreadyExists {
    name: String,
    existing: String,
    head: Option<String>,
  },

  /// Push rejected by the remote
  PushFailed {
    remote: String,
    refs: Vec<String>,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("fetch first") {
          Some("The remote has commits you don't have. Resolve manually; the push is not retried automatically.".to_string())
        } else if reason.contains("Permission denied") || reason.contains("403") {
          Some("Check the SSH key or credentials available to this pipeline.".to_string())
        } else {
          Some("Inspect the remote state before pushing again; a blind retry can duplicate history.".to_string())
        }
      }
      GitError::TagAlreadyExists { name, .. } => Some(format!(
        "Release tags are never moved. Check whether {} was already released.",
        name
      )),
      GitError::NothingToCommit { .. } => {
        Some("The version file is unchanged or not tracked by git (`git add` it first).".to_string())
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run inside a git repository or pass -C <path> (looked at {}).",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::NothingToCommit { files } => {
        let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        write!(f, "Nothing to commit in: {}", names.join(", "))
      }
      GitError::TagAlreadyExists { name, existing, head } => {
        write!(f, "Tag {} already exists at {}", name, existing)?;
        if let Some(head) = head {
          write!(f, " (HEAD is {})", head)?;
        }
        Ok(())
      }
      GitError::PushFailed { remote, refs, reason } => {
        write!(f, "Push of {} to {} failed: {}", refs.join(" "), remote, reason.trim_end())
      }
    }
  }
}

/// Artifact upload errors
#[derive(Debug)]
pub enum PublishError {
  /// The bucket does not resolve to an existing bucket
  BucketNotFound { bucket: String },

  /// A single object transfer failed; the walk was aborted
  UploadFailure { key: String, reason: String },

  /// The local artifact root is missing or not a directory
  InvalidRoot { path: PathBuf },

  /// A file under the artifact root has no usable object key
  InvalidKey { path: PathBuf },
}

impl PublishError {
  fn help_message(&self) -> Option<String> {
    match self {
      PublishError::BucketNotFound { .. } => {
        Some("Check the bucket name and that the application key can list it.".to_string())
      }
      PublishError::UploadFailure { .. } => {
        Some("Re-running publish with the same inputs overwrites what was already uploaded.".to_string())
      }
      PublishError::InvalidRoot { .. } => Some("Point publish at the directory holding the packaged outputs.".to_string()),
      PublishError::InvalidKey { .. } => Some("Object keys are UTF-8; rename the file before publishing.".to_string()),
    }
  }
}

impl fmt::Display for PublishError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishError::BucketNotFound { bucket } => write!(f, "Bucket {} not found", bucket),
      PublishError::UploadFailure { key, reason } => write!(f, "Upload of {} failed: {}", key, reason),
      PublishError::InvalidRoot { path } => {
        write!(f, "Artifact directory does not exist or is not a directory: {}", path.display())
      }
      PublishError::InvalidKey { path } => write!(f, "Cannot derive an object key from {}", path.display()),
    }
  }
}

/// Result type alias for release-rail
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
