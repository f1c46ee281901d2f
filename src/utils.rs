//! Utility functions for cross-platform path handling

use std::path::{Component, Path};

/// Convert a relative path to object-key format (always forward slashes)
///
/// Object keys use `/` on every platform. Returns `None` for paths that are
/// absolute, step outside their root (`..`) or are not valid UTF-8, which
/// cannot become keys.
pub fn path_to_key(path: &Path) -> Option<String> {
  let mut segments = Vec::new();
  for component in path.components() {
    match component {
      Component::Normal(part) => segments.push(part.to_str()?),
      Component::CurDir => {}
      Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
    }
  }

  if segments.is_empty() {
    return None;
  }

  Some(segments.join("/"))
}

/// Join key segments with `/`, dropping empty segments and stray slashes
///
/// `join_key(&["lin-bus/", "1.2.3", "linux-x86_64"])` is `lin-bus/1.2.3/linux-x86_64`.
pub fn join_key(segments: &[&str]) -> String {
  segments
    .iter()
    .map(|s| s.trim_matches('/'))
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("/")
}
