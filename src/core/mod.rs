//! Core engine for release-rail
//!
//! - **config**: release.toml parsing and validation
//! - **context**: repository root and config, resolved once in main
//! - **error**: error types with exit codes and contextual help messages
//! - **plan**: dry-run operation plans and their serialization
//! - **vcs**: source-control gateway (`SourceControl`, `SystemGit`)

pub mod config;
pub mod context;
pub mod error;
pub mod plan;
pub mod vcs;
