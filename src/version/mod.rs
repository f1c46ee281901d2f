//! Version model, lifecycle transitions and the persisted version file
//!
//! - **model**: `Version` parsing/formatting and `LifecycleState`
//! - **transition**: pure snapshot/release transitions plus tag and message naming
//! - **store**: `VersionFile`, atomic read/write of the version file

pub mod model;
pub mod store;
pub mod transition;

pub use model::{LifecycleState, Version};
pub use store::VersionFile;
