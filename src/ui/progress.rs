//! Progress indicators for long-running operations
//!
//! Uses `linya`, whose bars are safe to drive from rayon workers behind a
//! mutex. Bars are only drawn when stderr is a terminal, so piped output
//! and `--json` runs stay clean.

use linya::{Bar, Progress};
use std::io::IsTerminal;
use std::sync::Mutex;

/// Thread-safe progress bar for artifact uploads
pub struct UploadProgress {
  inner: Option<(Mutex<Progress>, Bar)>,
}

impl UploadProgress {
  /// Create a bar for `total` uploads (hidden when stderr is not a TTY)
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    if total == 0 || !std::io::stderr().is_terminal() {
      return Self::hidden();
    }

    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      inner: Some((Mutex::new(progress), bar)),
    }
  }

  /// A progress tracker that never draws
  pub fn hidden() -> Self {
    Self { inner: None }
  }

  /// Increment by one finished upload (callable from any thread)
  pub fn inc(&self) {
    if let Some((progress, bar)) = &self.inner
      && let Ok(mut progress) = progress.lock()
    {
      progress.inc_and_draw(bar, 1);
    }
  }
}
