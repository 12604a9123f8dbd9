//! Cooperative cancellation shared between the CLI and the pipeline.

use std::sync::Arc;

use tokio::sync::watch;

/// A clonable cancellation signal.
///
/// All clones observe the same state; once cancelled a token stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
  tx: Arc<watch::Sender<bool>>,
  rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
  fn default() -> Self {
    Self::new()
  }
}

impl CancelToken {
  pub fn new() -> Self {
    let (tx, rx) = watch::channel(false);
    Self { tx: Arc::new(tx), rx }
  }

  /// Signal cancellation to every clone of this token.
  pub fn cancel(&self) {
    self.tx.send_replace(true);
  }

  pub fn is_cancelled(&self) -> bool {
    *self.rx.borrow()
  }

  /// Wait until the token is cancelled.
  pub async fn cancelled(&self) {
    let mut rx = self.rx.clone();
    // The sender lives as long as any clone, so this only ends on cancellation.
    let _ = rx.wait_for(|cancelled| *cancelled).await;
  }
}
