use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::types::CompletionEvent;

const DEFAULT_CAPACITY: usize = 256;

/// Broadcast source of task completion events.
///
/// Every subscriber sees every event published after it subscribed. Cloning
/// the bus shares the same channel.
#[derive(Debug, Clone)]
pub struct CompletionBus {
  sender: broadcast::Sender<CompletionEvent>,
}

impl CompletionBus {
  pub fn new() -> Self {
    Self::with_capacity(DEFAULT_CAPACITY)
  }

  pub fn with_capacity(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { sender }
  }

  /// Publish an event. Returns the number of subscribers that will see it.
  pub fn publish(&self, event: CompletionEvent) -> usize {
    // No subscribers is fine; nobody is waiting.
    self.sender.send(event).unwrap_or(0)
  }

  /// Register a new listener.
  pub fn subscribe(&self) -> CompletionSubscription {
    CompletionSubscription {
      receiver: self.sender.subscribe(),
    }
  }

  /// Number of live subscriptions.
  pub fn subscriber_count(&self) -> usize {
    self.sender.receiver_count()
  }
}

impl Default for CompletionBus {
  fn default() -> Self {
    Self::new()
  }
}

/// One listener on a `CompletionBus`.
///
/// Dropping the subscription deregisters it.
#[derive(Debug)]
pub struct CompletionSubscription {
  receiver: broadcast::Receiver<CompletionEvent>,
}

impl CompletionSubscription {
  /// Wait for the next event. Returns `None` once the bus is gone.
  pub async fn next(&mut self) -> Option<CompletionEvent> {
    loop {
      match self.receiver.recv().await {
        Ok(event) => return Some(event),
        Err(RecvError::Lagged(skipped)) => {
          warn!(skipped, "completion subscription lagged, events were dropped");
        }
        Err(RecvError::Closed) => return None,
      }
    }
  }
}
