//! Task launcher: start the resolved task and hold progress open until it ends.

use std::path::Path;
use std::sync::Arc;

use predeploy_task::{TaskDescriptor, TaskRegistry};
use tracing::info;

use crate::error::PreDeployError;
use crate::result::TaskResult;
use crate::ui::{ProgressGuard, ProgressReporter};
use crate::watcher::wait_for_task_end;

/// Execute `task` and wait for the completion signal that ends the run.
///
/// The subscription is taken before the task starts so an immediate exit
/// cannot be missed. The progress notification stays open until this returns.
pub(crate) async fn run_task(
  registry: &dyn TaskRegistry,
  progress: Arc<dyn ProgressReporter>,
  task: &TaskDescriptor,
  configured_name: &str,
  deploy_path: &Path,
) -> Result<TaskResult, PreDeployError> {
  let subscription = registry.on_task_process_end();
  let _progress = ProgressGuard::start(
    progress,
    format!("Running preDeployTask \"{}\"...", configured_name),
  );

  info!(task = %task.name, task_id = %task.id, "launching pre-deploy task");
  registry.execute_task(task).await?;

  wait_for_task_end(subscription, task, deploy_path).await
}
