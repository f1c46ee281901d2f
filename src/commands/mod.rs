//! CLI commands for release-rail
//!
//! ## Release lifecycle
//! - **version**: print the current version
//! - **status**: version, lifecycle state and release tag
//! - **cut**: snapshot → release (commit + tag)
//! - **advance**: release → next snapshot, optionally pushing
//! - **release**: cut + advance + push in one run
//!
//! ## Artifacts
//! - **publish**: upload a packaged artifact tree to object storage
//!
//! All commands accept `&RepoContext` so the repository root and config are
//! resolved once.

pub mod publish;
pub mod release;

pub use publish::{PublishArgs, run_publish};
pub use release::{run_advance, run_cut, run_release, run_status, run_version};
