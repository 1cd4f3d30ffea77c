use async_trait::async_trait;

use crate::bus::CompletionSubscription;
use crate::error::TaskError;
use crate::types::TaskDescriptor;

/// Enumerates and executes tasks known to the host.
///
/// `execute_task` returns once the task has started. Its end, and the end of
/// every dependency it pulls in, is reported through the completion stream.
#[async_trait]
pub trait TaskRegistry: Send + Sync {
  /// All tasks, in registry order.
  async fn list_tasks(&self) -> Result<Vec<TaskDescriptor>, TaskError>;

  /// Start a task.
  async fn execute_task(&self, task: &TaskDescriptor) -> Result<(), TaskError>;

  /// Subscribe to task process completion. Drop the subscription to stop listening.
  fn on_task_process_end(&self) -> CompletionSubscription;
}
