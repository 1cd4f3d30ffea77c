//! Completion watcher: wait for the event that ends a pre-deploy run.

use std::path::Path;

use predeploy_task::{CompletionEvent, CompletionSubscription, TaskDescriptor};
use tracing::{debug, info};

use crate::error::PreDeployError;
use crate::result::TaskResult;

/// Wait until a completion event ends the run of `launched`.
///
/// Ends on the first event that is either a failure of any task scoped to
/// `deploy_path` (a dependency of the launched task may fail before the
/// launched task ever reports), or any completion of `launched` itself.
/// The subscription is consumed and dropped on return.
///
/// A registry must report `launched` once it stops running, even when a
/// dependency stopped the chain first. If this subscriber lags and the bus
/// drops the terminating event, the wait only ends when the bus closes; the
/// bus buffer is sized so one deploy's events fit.
pub(crate) async fn wait_for_task_end(
  mut subscription: CompletionSubscription,
  launched: &TaskDescriptor,
  deploy_path: &Path,
) -> Result<TaskResult, PreDeployError> {
  while let Some(event) = subscription.next().await {
    if ends_wait(&event, launched, deploy_path) {
      info!(
        task = %event.task.name,
        exit_code = ?event.exit_code,
        launched = event.task.id == launched.id,
        "pre-deploy wait resolved"
      );
      return Ok(TaskResult::completed(event.task.name, event.exit_code));
    }
    debug!(task = %event.task.name, "ignoring unrelated task completion");
  }

  Err(PreDeployError::CompletionStreamClosed)
}

fn ends_wait(event: &CompletionEvent, launched: &TaskDescriptor, deploy_path: &Path) -> bool {
  // Any failure in scope counts, not only the launched task.
  (event.task.is_scope_of(deploy_path) && event.is_failure()) || event.task.id == launched.id
}

#[cfg(test)]
mod tests {
  use super::*;
  use predeploy_task::CompletionBus;
  use std::path::PathBuf;

  fn scoped(name: &str, scope: &str) -> TaskDescriptor {
    TaskDescriptor::new(name, Some(PathBuf::from(scope)))
  }

  #[test]
  fn test_launched_task_ends_wait_on_success_or_failure() {
    let launched = scoped("build", "/proj");
    let path = Path::new("/proj");
    assert!(ends_wait(&CompletionEvent::new(launched.clone(), Some(0)), &launched, path));
    assert!(ends_wait(&CompletionEvent::new(launched.clone(), Some(1)), &launched, path));
    assert!(ends_wait(&CompletionEvent::new(launched.clone(), None), &launched, path));
  }

  #[test]
  fn test_failure_in_scope_ends_wait() {
    let launched = scoped("build", "/proj");
    let dependency = scoped("restore", "/proj");
    let path = Path::new("/proj/sub");
    assert!(ends_wait(&CompletionEvent::new(dependency.clone(), Some(2)), &launched, path));
    assert!(!ends_wait(&CompletionEvent::new(dependency, Some(0)), &launched, path));
  }

  #[test]
  fn test_failure_out_of_scope_is_ignored() {
    let launched = scoped("build", "/proj");
    let path = Path::new("/proj");
    let other = scoped("build", "/other");
    let global = TaskDescriptor::new("build", None);
    assert!(!ends_wait(&CompletionEvent::new(other, Some(1)), &launched, path));
    assert!(!ends_wait(&CompletionEvent::new(global, Some(1)), &launched, path));
  }

  #[test]
  fn test_same_name_different_identity_is_not_launched() {
    let launched = scoped("build", "/proj");
    let twin = scoped("build", "/proj");
    assert!(!ends_wait(&CompletionEvent::new(twin, Some(0)), &launched, Path::new("/proj")));
  }

  #[tokio::test]
  async fn test_wait_skips_unrelated_events() {
    let bus = CompletionBus::new();
    let launched = scoped("build", "/proj");
    let subscription = bus.subscribe();

    bus.publish(CompletionEvent::new(scoped("lint", "/other"), Some(1)));
    bus.publish(CompletionEvent::new(scoped("restore", "/proj"), Some(0)));
    bus.publish(CompletionEvent::new(launched.clone(), Some(0)));

    let result = wait_for_task_end(subscription, &launched, Path::new("/proj"))
      .await
      .unwrap();
    assert_eq!(result, TaskResult::completed("build", Some(0)));
    assert_eq!(bus.subscriber_count(), 0);
  }

  #[tokio::test]
  async fn test_wait_fails_when_stream_closes() {
    let bus = CompletionBus::new();
    let launched = scoped("build", "/proj");
    let subscription = bus.subscribe();
    drop(bus);

    let result = wait_for_task_end(subscription, &launched, Path::new("/proj")).await;
    assert!(matches!(result, Err(PreDeployError::CompletionStreamClosed)));
  }
}
