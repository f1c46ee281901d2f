//! Deterministic object keys: `<prefix>/<perBuildVersion>/<platformClassifier>/<relativePath>`
//!
//! The prefix half is composed by the caller (`KeyPrefix`); the publisher only
//! appends relative paths, so it stays platform-agnostic.

use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use crate::utils::join_key;
use std::fmt;

/// Target OS/architecture segment of an object key, e.g. `linux-x86_64`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformClassifier(String);

impl PlatformClassifier {
  /// Classifier for an explicit OS and architecture
  pub fn from_parts(os: &str, arch: &str) -> Self {
    Self(format!("{}-{}", os.trim().to_lowercase(), arch.trim().to_lowercase()))
  }

  /// Classifier of the platform this binary was built for
  pub fn current() -> Self {
    Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
  }

  /// Use a caller-provided classifier verbatim
  pub fn custom(value: impl Into<String>) -> ReleaseResult<Self> {
    let value = value.into();
    validate_segment("classifier", &value)?;
    Ok(Self(value))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PlatformClassifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Everything before the relative path in an object key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix(String);

impl KeyPrefix {
  /// `<prefix>/<build_version>/<classifier>`
  pub fn compose(prefix: &str, build_version: &str, classifier: &PlatformClassifier) -> ReleaseResult<Self> {
    validate_segment("build version", build_version)?;
    Ok(Self(join_key(&[prefix, build_version, classifier.as_str()])))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for KeyPrefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Key for one file: `key_prefix + "/" + relative_key`, or just the relative key for an empty prefix
pub fn object_key(key_prefix: &str, relative_key: &str) -> String {
  join_key(&[key_prefix, relative_key])
}

/// A single key segment must be non-empty and contain no `/`
fn validate_segment(field: &str, value: &str) -> ReleaseResult<()> {
  if value.trim().is_empty() || value.contains('/') || value == ".." || value == "." {
    return Err(ReleaseError::Config(ConfigError::InvalidValue {
      field: field.to_string(),
      reason: format!("'{}' is not a single key segment", value),
    }));
  }
  Ok(())
}
