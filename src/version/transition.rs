//! Pure version transitions for the release lifecycle
//!
//! ```text
//! 1.2.3-SNAPSHOT --to_release--> 1.2.3 --to_next_snapshot--> 1.2.4-SNAPSHOT
//! ```
//!
//! No I/O happens here; the orchestrator decides when to persist.

use super::model::Version;
use crate::core::error::VersionError;

/// Strip the snapshot marker, keeping every numeric component
pub fn to_release(version: &Version) -> Result<Version, VersionError> {
  if !version.is_snapshot() {
    return Err(VersionError::NotASnapshot {
      version: version.to_string(),
    });
  }
  Ok(version.with_snapshot(false))
}

/// Bump the last component by one and re-add the snapshot marker
///
/// There is no carrying: `1.9` becomes `1.10-SNAPSHOT`.
pub fn to_next_snapshot(version: &Version) -> Result<Version, VersionError> {
  if version.is_snapshot() {
    return Err(VersionError::AlreadySnapshot {
      version: version.to_string(),
    });
  }

  let overflow = || VersionError::MalformedVersion {
    input: version.to_string(),
    reason: "last component cannot be incremented".to_string(),
  };

  let mut components = version.components().to_vec();
  let last = components.last_mut().ok_or_else(overflow)?;
  *last = last.checked_add(1).ok_or_else(overflow)?;

  Version::new(components, true).ok_or_else(overflow)
}

/// Tag naming a released version: `v<version>`
pub fn tag_name(version: &Version) -> String {
  format!("v{}", version.numeric())
}

/// Commit (and tag) message for the release commit
pub fn release_message(version: &Version) -> String {
  format!("Release version {}", version)
}

/// Commit message for the switch to the next snapshot
pub fn snapshot_message(version: &Version) -> String {
  format!("Switch to next snapshot version {}", version)
}
