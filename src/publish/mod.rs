//! Artifact publishing
//!
//! - **key**: object key scheme (`<prefix>/<build version>/<classifier>/<path>`)
//! - **publisher**: walks an artifact tree and uploads it in parallel
//! - **store**: `ObjectStore` trait and the directory-backed `LocalStore`
//! - **b2**: Backblaze B2 backend

pub mod b2;
pub mod key;
pub mod publisher;
pub mod store;

pub use b2::B2Store;
pub use key::{KeyPrefix, PlatformClassifier};
pub use publisher::{ArtifactPublisher, plan_keys};
pub use store::{LocalStore, ObjectStore};
