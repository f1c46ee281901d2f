//! Reviewable plans for release operations
//!
//! Every mutating command can describe itself as a `Plan` before execution:
//!
//! - **Dry-run mode**: show what will happen without doing it
//! - **Determinism**: same version file + config → same plan → same plan id
//! - **Auditability**: plans are JSON-serializable for CI logs
//!
//! ```text
//! Command (cut, advance, release)
//!   ↓
//! Plan (what to do)        ← --dry-run stops here
//!   ↓
//! ReleaseOrchestrator (do it)
//! ```

use crate::core::error::ReleaseResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of plan operations)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// A single step of a release
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
  /// Overwrite the version file
  WriteVersion { path: String, from: String, to: String },

  /// Create a commit of the given files
  CreateCommit { message: String, files: Vec<String> },

  /// Create an annotated tag at HEAD
  CreateTag { name: String, message: String },

  /// Push refs to a remote
  Push {
    remote: String,
    refs: Vec<String>,
    atomic: bool,
  },
}

/// Type of operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
  CutRelease,
  AdvanceSnapshot,
  Release,
}

impl fmt::Display for OperationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OperationType::CutRelease => write!(f, "cut release"),
      OperationType::AdvanceSnapshot => write!(f, "advance snapshot"),
      OperationType::Release => write!(f, "release"),
    }
  }
}

/// A plan represents a sequence of operations to perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
  /// Plan ID (content hash of the operations)
  pub id: PlanId,

  /// What operation this plan represents
  pub operation_type: OperationType,

  /// Operations to perform (in order)
  pub operations: Vec<Operation>,

  /// Human-readable summary
  pub summary: String,
}

impl Plan {
  /// Create a new plan
  pub fn new(operation_type: OperationType) -> Self {
    Self {
      id: PlanId::from_contents(&[]),
      operation_type,
      operations: Vec::new(),
      summary: String::new(),
    }
  }

  /// Add an operation to the plan
  pub fn add_operation(&mut self, operation: Operation) {
    self.operations.push(operation);
    self.recompute_id();
  }

  /// Set the summary
  pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
    self.summary = summary.into();
    self
  }

  /// Recompute plan ID based on current contents
  fn recompute_id(&mut self) {
    let json = serde_json::to_vec(&self.operations).unwrap_or_default();
    self.id = PlanId::from_contents(&json);
  }

  /// Serialize to JSON
  pub fn to_json(&self) -> ReleaseResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!("📋 Plan: {} ({})\n", self.operation_type, self.id));

    if !self.summary.is_empty() {
      output.push_str(&format!("\n{}\n", self.summary));
    }

    output.push_str(&format!("\n   Operations ({}):\n", self.operations.len()));

    for (i, op) in self.operations.iter().enumerate() {
      output.push_str(&format!("   {}. {}\n", i + 1, operation_to_string(op)));
    }

    if self.operations.iter().any(|op| matches!(op, Operation::Push { .. })) {
      output.push_str("\n⚠️  NOTE: This plan pushes to a remote; a rejected push is not retried\n");
    }

    output
  }
}

/// Convert operation to human-readable string
fn operation_to_string(op: &Operation) -> String {
  match op {
    Operation::WriteVersion { path, from, to } => format!("Write {} → {} in {}", from, to, path),
    Operation::CreateCommit { message, files } => {
      format!("Create commit: {} ({} files)", message, files.len())
    }
    Operation::CreateTag { name, .. } => format!("Create tag {}", name),
    Operation::Push { remote, refs, atomic } => {
      if *atomic {
        format!("Atomic push of {} to {}", refs.join(", "), remote)
      } else {
        format!("Push {} to {}", refs.join(", "), remote)
      }
    }
  }
}
