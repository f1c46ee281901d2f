//! The project version: dotted numeric components plus an optional snapshot marker

use crate::core::error::VersionError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Reserved suffix marking a development (pre-release) version
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// A well-formed project version, e.g. `1.2.3` or `1.2.4-SNAPSHOT`
///
/// Always has at least one component. Leading zeros are rejected on parse so
/// that the text form is canonical: parsing and printing round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
  components: Vec<u64>,
  snapshot: bool,
}

impl Version {
  /// Build a version from components; `None` if `components` is empty
  pub fn new(components: Vec<u64>, snapshot: bool) -> Option<Self> {
    if components.is_empty() {
      return None;
    }
    Some(Self { components, snapshot })
  }

  /// Parse the version file grammar `N(.N)*(-SNAPSHOT)?`
  pub fn parse(input: &str) -> Result<Self, VersionError> {
    let malformed = |reason: &str| VersionError::MalformedVersion {
      input: input.to_string(),
      reason: reason.to_string(),
    };

    let text = input.trim();
    if text.is_empty() {
      return Err(malformed("version is empty"));
    }

    let (numeric, snapshot) = match text.strip_suffix(SNAPSHOT_SUFFIX) {
      Some(rest) => (rest, true),
      None => (text, false),
    };

    let mut components = Vec::new();
    for part in numeric.split('.') {
      if part.is_empty() {
        return Err(malformed("empty numeric component"));
      }
      if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(&format!("'{}' is not a non-negative integer", part)));
      }
      if part.len() > 1 && part.starts_with('0') {
        return Err(malformed(&format!("'{}' has a leading zero", part)));
      }
      let value = part
        .parse::<u64>()
        .map_err(|_| malformed(&format!("'{}' is too large", part)))?;
      components.push(value);
    }

    Ok(Self { components, snapshot })
  }

  /// Numeric components, most significant first
  pub fn components(&self) -> &[u64] {
    &self.components
  }

  pub fn is_snapshot(&self) -> bool {
    self.snapshot
  }

  /// The dotted numeric part without any marker
  pub fn numeric(&self) -> String {
    self
      .components
      .iter()
      .map(|c| c.to_string())
      .collect::<Vec<_>>()
      .join(".")
  }

  /// Same components, snapshot marker set as given
  pub(crate) fn with_snapshot(&self, snapshot: bool) -> Self {
    Self {
      components: self.components.clone(),
      snapshot,
    }
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.numeric())?;
    if self.snapshot {
      write!(f, "{}", SNAPSHOT_SUFFIX)?;
    }
    Ok(())
  }
}

impl FromStr for Version {
  type Err = VersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Version::parse(s)
  }
}

impl Serialize for Version {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

/// Lifecycle state derived from the snapshot marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
  Snapshot,
  Released,
}

impl LifecycleState {
  pub fn of(version: &Version) -> Self {
    if version.is_snapshot() {
      LifecycleState::Snapshot
    } else {
      LifecycleState::Released
    }
  }
}

impl fmt::Display for LifecycleState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LifecycleState::Snapshot => write!(f, "snapshot"),
      LifecycleState::Released => write!(f, "released"),
    }
  }
}
