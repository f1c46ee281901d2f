//! Release lifecycle: the snapshot → release → next snapshot state machine
//!
//! # Core Invariants
//!
//! 1. **The version file is the only source of truth**
//!    - Read at the start of every operation, never cached across operations
//!    - Each transition writes it and then immediately commits it
//!
//! 2. **A release tag names exactly one immutable version**
//!    - Tag is `v<version>`, created right after the release commit
//!    - An existing tag on another commit is a conflict, never overwritten
//!
//! 3. **Commits are ordered around the tag**
//!    - Release commit → tag → next-snapshot commit, so the tag never
//!      includes the version bump

pub mod orchestrator;

pub use orchestrator::{NextStep, PushTarget, ReleaseOrchestrator, ReleaseReport};
